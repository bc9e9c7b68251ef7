use sqlx::Row;

use moneta_core::NewTransaction;
use moneta_import::{SinkError, TransactionSink};

use crate::db::DbPool;

/// SQLite-backed persister. Each row is inserted independently — a
/// referential-integrity failure on one row leaves the others committed,
/// which is what lets the import report separate success and failure counts.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl TransactionSink for SqliteStore {
    async fn insert(&self, user_id: &str, tx: &NewTransaction) -> Result<i64, SinkError> {
        let result = sqlx::query(
            "INSERT INTO transactions
               (user_id, name, date, amount_cad, amount_usd, category_id, notes, kind, month)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(user_id)
        .bind(&tx.name)
        .bind(tx.date.to_string())
        .bind(tx.amount_cad.map(|d| d.to_string()))
        .bind(tx.amount_usd.map(|d| d.to_string()))
        .bind(tx.category_id.map(|c| c.0))
        .bind(&tx.notes)
        .bind(tx.kind.to_string())
        .bind(tx.month().to_string())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.get::<i64, _>("id")),
            Err(e) => Err(classify(e)),
        }
    }
}

/// Constraint violations are per-row problems; anything else (closed pool,
/// I/O, protocol) means the store is unusable and the batch must stop.
fn classify(e: sqlx::Error) -> SinkError {
    match e {
        sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY") => {
            SinkError::Row("Category no longer exists".to_string())
        }
        sqlx::Error::Database(db) => SinkError::Row(db.message().to_string()),
        other => SinkError::Fatal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_memory_db, get_all_categories, get_transactions_for_user, seed_default_categories};
    use chrono::NaiveDate;
    use moneta_core::{CategoryId, Month, TransactionType};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tx(name: &str, category_id: Option<CategoryId>) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            amount_cad: Some(dec("45.00")),
            amount_usd: None,
            category_id,
            notes: Some("weekly".to_string()),
            kind: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let pool = create_memory_db().await.unwrap();
        seed_default_categories(&pool).await.unwrap();
        let cats = get_all_categories(&pool).await.unwrap();
        let groceries = cats.iter().find(|c| c.name == "Groceries").unwrap();

        let store = SqliteStore::new(pool.clone());
        let id = store.insert("user-1", &tx("Weekly shop", groceries.id)).await.unwrap();
        assert!(id > 0);

        let stored = get_transactions_for_user(&pool, "user-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Weekly shop");
        assert_eq!(stored[0].amount_cad, Some(dec("45.00")));
        assert_eq!(stored[0].amount_usd, None);
        assert_eq!(stored[0].category_id, groceries.id);
        assert_eq!(stored[0].kind, TransactionType::Expense);
        assert_eq!(stored[0].month, Month::new(2024, 1).unwrap());
    }

    #[tokio::test]
    async fn transactions_are_scoped_by_user() {
        let pool = create_memory_db().await.unwrap();
        let store = SqliteStore::new(pool.clone());
        store.insert("alice", &tx("A", None)).await.unwrap();
        store.insert("bob", &tx("B", None)).await.unwrap();

        let alice = get_transactions_for_user(&pool, "alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "A");
    }

    #[tokio::test]
    async fn missing_category_is_a_row_error() {
        let pool = create_memory_db().await.unwrap();
        let store = SqliteStore::new(pool);

        let err = store
            .insert("user-1", &tx("Orphan", Some(CategoryId(999))))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Row(m) if m == "Category no longer exists"));
    }

    #[tokio::test]
    async fn closed_pool_is_fatal() {
        let pool = create_memory_db().await.unwrap();
        let store = SqliteStore::new(pool.clone());
        pool.close().await;

        let err = store.insert("user-1", &tx("Late", None)).await.unwrap_err();
        assert!(matches!(err, SinkError::Fatal(_)));
    }
}
