use chrono::NaiveDate;
use rust_decimal::Decimal;

use moneta_core::NewTransaction;

/// The slice of an already-persisted transaction that dedup compares against.
#[derive(Debug, Clone)]
pub struct ExistingTransaction {
    pub id: i64,
    pub date: NaiveDate,
    pub name: String,
    pub amount: Option<Decimal>,
}

/// Returns the id of an existing transaction the candidate duplicates, if
/// any: same date, same amount, and the same name after normalisation.
/// Exact-only on purpose — a near-match is a judgement call the user should
/// make, not the importer.
pub fn find_duplicate(candidate: &NewTransaction, existing: &[ExistingTransaction]) -> Option<i64> {
    let name = normalize(&candidate.name);
    let amount = candidate.primary_amount()?;

    existing
        .iter()
        .find(|ex| {
            ex.date == candidate.date
                && ex.amount == Some(amount)
                && normalize(&ex.name) == name
        })
        .map(|ex| ex.id)
}

/// Lowercase alphanumeric words joined by single spaces, so that
/// "AMAZON  MARKETPLACE" and "Amazon Marketplace*" compare equal.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneta_core::TransactionType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(name: &str, d: NaiveDate, cad: &str) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            date: d,
            amount_cad: Some(dec(cad)),
            amount_usd: None,
            category_id: None,
            notes: None,
            kind: TransactionType::Expense,
        }
    }

    fn existing(id: i64, name: &str, d: NaiveDate, amount: &str) -> ExistingTransaction {
        ExistingTransaction {
            id,
            date: d,
            name: name.to_string(),
            amount: Some(dec(amount)),
        }
    }

    #[test]
    fn exact_duplicate_found() {
        let cand = candidate("STARBUCKS", date(2024, 1, 15), "5.50");
        let ex = vec![existing(7, "STARBUCKS", date(2024, 1, 15), "5.50")];
        assert_eq!(find_duplicate(&cand, &ex), Some(7));
    }

    #[test]
    fn name_comparison_is_normalised() {
        let cand = candidate("Amazon Marketplace*", date(2024, 1, 15), "49.99");
        let ex = vec![existing(3, "AMAZON  MARKETPLACE", date(2024, 1, 15), "49.99")];
        assert_eq!(find_duplicate(&cand, &ex), Some(3));
    }

    #[test]
    fn different_date_is_not_duplicate() {
        let cand = candidate("STARBUCKS", date(2024, 1, 16), "5.50");
        let ex = vec![existing(7, "STARBUCKS", date(2024, 1, 15), "5.50")];
        assert_eq!(find_duplicate(&cand, &ex), None);
    }

    #[test]
    fn different_amount_is_not_duplicate() {
        let cand = candidate("STARBUCKS", date(2024, 1, 15), "5.51");
        let ex = vec![existing(7, "STARBUCKS", date(2024, 1, 15), "5.50")];
        assert_eq!(find_duplicate(&cand, &ex), None);
    }

    #[test]
    fn near_miss_name_is_not_duplicate() {
        let cand = candidate("STARBUCK", date(2024, 1, 15), "5.50");
        let ex = vec![existing(7, "STARBUCKS", date(2024, 1, 15), "5.50")];
        assert_eq!(find_duplicate(&cand, &ex), None);
    }
}
