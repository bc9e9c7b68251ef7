use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::CategoryId;
use super::month::Month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Infer the type from the sign of an amount: negative means money going
    /// out. This rule is deliberately the only source of truth when the CSV
    /// carries no explicit type column.
    pub fn infer_from_sign(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            TransactionType::Expense
        } else {
            TransactionType::Income
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "Income"),
            TransactionType::Expense => write!(f, "Expense"),
        }
    }
}

/// A fully validated transaction candidate, ready to be persisted. Amounts
/// are stored as non-negative values; direction lives in `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub date: NaiveDate,
    pub amount_cad: Option<Decimal>,
    pub amount_usd: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub notes: Option<String>,
    pub kind: TransactionType,
}

impl NewTransaction {
    pub fn month(&self) -> Month {
        Month::from_date(self.date)
    }

    /// The amount used for matching and dedup: CAD when present, else USD.
    pub fn primary_amount(&self) -> Option<Decimal> {
        self.amount_cad.or(self.amount_usd)
    }
}

/// The durable entity. Created only through a successful import or the
/// regular create-transaction flow; the import pipeline never mutates one
/// after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub amount_cad: Option<Decimal>,
    pub amount_usd: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub notes: Option<String>,
    pub kind: TransactionType,
    pub month: Month,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
