pub mod config;
pub mod download_cache;
pub mod error;
pub mod outputs;
pub mod pipeline;
pub mod pricing;
pub mod reference;
pub mod template;
pub mod transform;

pub use error::{PipelineError, Result, TableKind, TransformError};
pub use pipeline::{generate_template, GeneratedTemplate};
pub use transform::{enrich_items, EnrichmentOutcome, ProductId, TransformSummary};
