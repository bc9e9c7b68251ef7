pub mod db;
pub mod store;

pub use db::{
    create_db, create_memory_db, get_all_categories, get_transactions_for_user,
    seed_default_categories, DbPool, StorageError,
};
pub use store::SqliteStore;
