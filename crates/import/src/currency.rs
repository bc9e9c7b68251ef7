use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use moneta_core::{round_currency, NewTransaction};

/// Fallback CAD-per-USD rate when no external source is configured.
pub fn default_cad_per_usd() -> Decimal {
    Decimal::new(135, 2)
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Rate fetch failed: {0}")]
    Fetch(String),
    #[error("Rate source returned an unusable rate: {0}")]
    Invalid(String),
}

/// Source of the CAD-per-USD exchange rate. Conversion is best-effort:
/// callers resolve the rate once per import and carry on without it when the
/// source fails.
pub trait RateSource: Send + Sync {
    fn cad_per_usd(&self) -> impl std::future::Future<Output = Result<Decimal, RateError>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub Decimal);

impl RateSource for FixedRate {
    async fn cad_per_usd(&self) -> Result<Decimal, RateError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct RateBody {
    rate: Decimal,
}

/// Fetches the rate from an HTTP endpoint returning `{"rate": 1.35}`.
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl RateSource for HttpRateSource {
    async fn cad_per_usd(&self) -> Result<Decimal, RateError> {
        let body: RateBody = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RateError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| RateError::Fetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| RateError::Invalid(e.to_string()))?;

        if body.rate <= Decimal::ZERO {
            return Err(RateError::Invalid(body.rate.to_string()));
        }
        Ok(body.rate)
    }
}

/// Populate whichever of the two amounts is missing, rounded to cents.
/// Leaves the transaction untouched when both or neither are present.
pub fn fill_missing_amount(tx: &mut NewTransaction, cad_per_usd: Decimal) {
    if cad_per_usd <= Decimal::ZERO {
        return;
    }
    match (tx.amount_cad, tx.amount_usd) {
        (Some(cad), None) => tx.amount_usd = Some(round_currency(cad / cad_per_usd)),
        (None, Some(usd)) => tx.amount_cad = Some(round_currency(usd * cad_per_usd)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use moneta_core::TransactionType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(cad: Option<&str>, usd: Option<&str>) -> NewTransaction {
        NewTransaction {
            name: "Test".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount_cad: cad.map(dec),
            amount_usd: usd.map(dec),
            category_id: None,
            notes: None,
            kind: TransactionType::Expense,
        }
    }

    #[test]
    fn fills_usd_from_cad() {
        let mut t = tx(Some("13.50"), None);
        fill_missing_amount(&mut t, dec("1.35"));
        assert_eq!(t.amount_usd, Some(dec("10.00")));
    }

    #[test]
    fn fills_cad_from_usd() {
        let mut t = tx(None, Some("10.00"));
        fill_missing_amount(&mut t, dec("1.35"));
        assert_eq!(t.amount_cad, Some(dec("13.50")));
    }

    #[test]
    fn rounds_to_two_places() {
        let mut t = tx(Some("10.00"), None);
        fill_missing_amount(&mut t, dec("1.33"));
        // 10 / 1.33 = 7.5187... → 7.52
        assert_eq!(t.amount_usd, Some(dec("7.52")));
    }

    #[test]
    fn both_present_is_untouched() {
        let mut t = tx(Some("13.50"), Some("9.99"));
        fill_missing_amount(&mut t, dec("1.35"));
        assert_eq!(t.amount_usd, Some(dec("9.99")));
    }

    #[test]
    fn nonpositive_rate_is_ignored() {
        let mut t = tx(Some("13.50"), None);
        fill_missing_amount(&mut t, Decimal::ZERO);
        assert_eq!(t.amount_usd, None);
    }

    #[tokio::test]
    async fn fixed_rate_source() {
        let rate = FixedRate(dec("1.40")).cad_per_usd().await.unwrap();
        assert_eq!(rate, dec("1.40"));
    }
}
