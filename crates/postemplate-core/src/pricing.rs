//! Base-price derivation from tax-inclusive rates.
//!
//! Rates are divided by the tax divisor in `rust_decimal` and rounded to two places, so the
//! result is exact at cent precision before it is handed back as `f64` for the output table.

use rust_decimal::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub const DECIMAL_PLACES: u32 = 2;

/// Midpoint handling when the base price lands exactly between two cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    HalfAwayFromZero,
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("tax divisor must be greater than zero, got {0}")]
pub struct InvalidTaxDivisor(pub Decimal);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    tax_divisor: Decimal,
    rounding: RoundingMode,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_divisor: default_tax_divisor(),
            rounding: RoundingMode::default(),
        }
    }
}

/// 12% tax folded into every imported rate.
pub fn default_tax_divisor() -> Decimal {
    Decimal::new(112, 2)
}

impl PricingPolicy {
    pub fn new(tax_divisor: Decimal, rounding: RoundingMode) -> Result<Self, InvalidTaxDivisor> {
        if tax_divisor <= Decimal::ZERO {
            return Err(InvalidTaxDivisor(tax_divisor));
        }
        Ok(Self {
            tax_divisor,
            rounding,
        })
    }

    pub fn tax_divisor(&self) -> Decimal {
        self.tax_divisor
    }

    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// `round(rate / divisor, 2)`; `None` only when the quotient overflows `Decimal`.
    pub fn base_price(&self, rate: Decimal) -> Option<Decimal> {
        rate.checked_div(self.tax_divisor)
            .map(|price| price.round_dp_with_strategy(DECIMAL_PLACES, self.rounding.strategy()))
    }
}

/// Parses a rate written as text (`"56"`, `" 56.00 "`, `"5.6e1"`).
pub fn parse_rate(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
