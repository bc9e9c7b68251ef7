use rust_decimal::Decimal;

use moneta_import::{currency, HttpRateSource, RateSource};
use moneta_storage::DbPool;

use crate::config::RateConfig;

pub struct AppState {
    pub pool: DbPool,
    pub rate: RateProvider,
}

/// Resolves the CAD-per-USD rate once per import request. Failures are
/// swallowed with a warning — conversion is best-effort and must never fail
/// a row, let alone the request.
pub enum RateProvider {
    Fixed(Decimal),
    Http(HttpRateSource),
}

impl RateProvider {
    pub fn from_config(config: &RateConfig) -> Self {
        if let Some(url) = &config.url {
            RateProvider::Http(HttpRateSource::new(url.clone()))
        } else {
            RateProvider::Fixed(config.fixed.unwrap_or_else(currency::default_cad_per_usd))
        }
    }

    pub async fn current(&self) -> Option<Decimal> {
        match self {
            RateProvider::Fixed(rate) => Some(*rate),
            RateProvider::Http(source) => match source.cad_per_usd().await {
                Ok(rate) => Some(rate),
                Err(e) => {
                    tracing::warn!("rate source unavailable, skipping conversion: {e}");
                    None
                }
            },
        }
    }
}
