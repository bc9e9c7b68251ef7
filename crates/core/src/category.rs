use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Income => write!(f, "Income"),
            CategoryKind::Expense => write!(f, "Expense"),
        }
    }
}

/// A budgeting category. The import pipeline only ever reads these to map
/// free-text hints onto ids; it never creates or mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub name: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(name: &str, kind: CategoryKind) -> Self {
        Category {
            id: None,
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),
}

pub const DEFAULT_CATEGORIES: &[(&str, CategoryKind)] = &[
    ("Salary", CategoryKind::Income),
    ("Freelance", CategoryKind::Income),
    ("Investments", CategoryKind::Income),
    ("Other Income", CategoryKind::Income),
    ("Rent", CategoryKind::Expense),
    ("Groceries", CategoryKind::Expense),
    ("Restaurants", CategoryKind::Expense),
    ("Transit", CategoryKind::Expense),
    ("Utilities", CategoryKind::Expense),
    ("Internet & Phone", CategoryKind::Expense),
    ("Insurance", CategoryKind::Expense),
    ("Health", CategoryKind::Expense),
    ("Entertainment", CategoryKind::Expense),
    ("Subscriptions", CategoryKind::Expense),
    ("Travel", CategoryKind::Expense),
    ("Miscellaneous", CategoryKind::Expense),
];
