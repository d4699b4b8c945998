//! Runtime settings: built-in defaults, then an optional TOML file, then `POSTEMPLATE_*`
//! environment overrides.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::pricing::{default_tax_divisor, InvalidTaxDivisor, PricingPolicy, RoundingMode};

pub const ENV_BIND_ADDR: &str = "POSTEMPLATE_BIND_ADDR";
pub const ENV_BASIS_PATH: &str = "POSTEMPLATE_BASIS_PATH";
pub const ENV_MAX_UPLOAD_BYTES: &str = "POSTEMPLATE_MAX_UPLOAD_BYTES";
pub const ENV_DOWNLOAD_TTL_SECS: &str = "POSTEMPLATE_DOWNLOAD_TTL_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Syntax(#[from] toml::de::Error),

    #[error("environment variable {var}={value} is invalid: {message}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        message: String,
    },

    #[error("tax_divisor '{0}' is not a decimal number")]
    InvalidDivisor(String),

    #[error(transparent)]
    Pricing(#[from] InvalidTaxDivisor),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub tax_divisor: String,
    pub rounding: RoundingMode,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            tax_divisor: default_tax_divisor().to_string(),
            rounding: RoundingMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub basis_path: PathBuf,
    pub max_upload_bytes: usize,
    pub download_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub pricing: PricingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            basis_path: PathBuf::from("basis_data.csv"),
            max_upload_bytes: 16 * 1024 * 1024,
            download_ttl_secs: 600,
            sweep_interval_secs: 60,
            pricing: PricingSettings::default(),
        }
    }
}

impl Settings {
    /// Resolves settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|var| std::env::var(var).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `POSTEMPLATE_*` overrides resolved through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = parse_env(ENV_BIND_ADDR, value)?;
        }
        if let Some(value) = lookup(ENV_BASIS_PATH) {
            self.basis_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.max_upload_bytes = parse_env(ENV_MAX_UPLOAD_BYTES, value)?;
        }
        if let Some(value) = lookup(ENV_DOWNLOAD_TTL_SECS) {
            self.download_ttl_secs = parse_env(ENV_DOWNLOAD_TTL_SECS, value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::NotPositive("max_upload_bytes"));
        }
        if self.download_ttl_secs == 0 {
            return Err(ConfigError::NotPositive("download_ttl_secs"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::NotPositive("sweep_interval_secs"));
        }
        self.pricing_policy()?;
        Ok(())
    }

    pub fn pricing_policy(&self) -> Result<PricingPolicy, ConfigError> {
        let divisor: Decimal = self
            .pricing
            .tax_divisor
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidDivisor(self.pricing.tax_divisor.clone()))?;
        Ok(PricingPolicy::new(divisor, self.pricing.rounding)?)
    }

    pub fn download_ttl(&self) -> chrono::Duration {
        i64::try_from(self.download_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

fn parse_env<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(err) => Err(ConfigError::InvalidEnv {
            var,
            message: err.to_string(),
            value,
        }),
    }
}
