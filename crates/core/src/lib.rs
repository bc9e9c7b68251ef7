pub mod amount;
pub mod category;
pub mod month;
pub mod transaction;

pub use amount::{parse_amount, round_currency, AmountError};
pub use category::{Category, CategoryId, CategoryKind, DomainError, DEFAULT_CATEGORIES};
pub use month::Month;
pub use transaction::{NewTransaction, Transaction, TransactionType};
