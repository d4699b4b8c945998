use std::sync::Arc;

use postemplate_core::config::{ConfigError, Settings};
use postemplate_core::download_cache::DownloadCache;
use postemplate_core::pricing::PricingPolicy;

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub downloads: Arc<DownloadCache>,
    pub pricing: PricingPolicy,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let pricing = settings.pricing_policy()?;
        let downloads = Arc::new(DownloadCache::new(settings.download_ttl()));

        Ok(Self {
            settings: Arc::new(settings),
            downloads,
            pricing,
        })
    }
}
