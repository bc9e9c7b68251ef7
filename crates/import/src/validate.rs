use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use moneta_core::{parse_amount, NewTransaction, TransactionType};

use crate::category::{CategoryResolver, Resolution};
use crate::csv::{CanonicalField, ImportRow};

/// A row-level failure. Collected, never thrown; one per row at most (the
/// first failed check wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn new(row: usize, message: &str) -> Self {
        RowError {
            row,
            message: message.to_string(),
        }
    }
}

/// A normalized candidate that passed validation, still tied to its source
/// row for reporting and selection.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTransaction {
    pub row: usize,
    pub tx: NewTransaction,
    /// The raw category hint from the file, if any.
    pub category_hint: Option<String>,
    /// True when a hint was present but did not match a known category.
    /// A warning, not an error: the row imports uncategorized.
    pub category_unresolved: bool,
}

/// Validate one row. Check order is fixed and short-circuiting:
/// date, then name, then amounts; category resolution never rejects.
pub fn validate_row(
    row: &ImportRow,
    resolver: &dyn CategoryResolver,
) -> Result<ParsedTransaction, RowError> {
    let date = match row.get(CanonicalField::Date).and_then(parse_date) {
        Some(d) => d,
        None => return Err(RowError::new(row.row, "Invalid date format")),
    };

    let name = row
        .get(CanonicalField::Name)
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(RowError::new(row.row, "Name is required"));
    }

    let amount_cad = parse_optional_amount(row.get(CanonicalField::AmountCad));
    let amount_usd = parse_optional_amount(row.get(CanonicalField::AmountUsd));
    let signed = match amount_cad.or(amount_usd) {
        Some(a) => a,
        None => {
            return Err(RowError::new(
                row.row,
                "Either amountCAD or amountUSD must be provided",
            ))
        }
    };

    // Explicit type column wins; otherwise the sign decides. Amounts are
    // stored as magnitudes once the direction is known.
    let kind = row
        .get(CanonicalField::Type)
        .and_then(TransactionType::parse)
        .unwrap_or_else(|| TransactionType::infer_from_sign(signed));

    let (category_id, category_hint, category_unresolved) =
        match row.get(CanonicalField::CategoryId).map(str::trim) {
            Some(hint) if !hint.is_empty() => match resolver.resolve(hint) {
                Resolution::Matched(id) => (Some(id), Some(hint.to_string()), false),
                Resolution::Accepted => (None, Some(hint.to_string()), false),
                Resolution::Unmatched => (None, Some(hint.to_string()), true),
            },
            _ => (None, None, false),
        };

    let notes = row
        .get(CanonicalField::Notes)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ParsedTransaction {
        row: row.row,
        tx: NewTransaction {
            name: name.to_string(),
            date,
            amount_cad: amount_cad.map(|d| d.abs()),
            amount_usd: amount_usd.map(|d| d.abs()),
            category_id,
            notes,
            kind,
        },
        category_hint,
        category_unresolved,
    })
}

/// An amount cell counts as provided only when it parses to a non-zero
/// number; empty, garbage, and zero all mean "absent" for the either-amount
/// rule.
fn parse_optional_amount(field: Option<&str>) -> Option<Decimal> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| parse_amount(s).ok())
        .filter(|d| !d.is_zero())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &[
        "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}
