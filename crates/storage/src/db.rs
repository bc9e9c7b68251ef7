use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use thiserror::Error;

use moneta_core::{
    Category, CategoryId, CategoryKind, Month, Transaction, TransactionType, DEFAULT_CATEGORIES,
};

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    connect(&format!("sqlite:{}?mode=rwc", path.display())).await
}

/// In-memory database, used by tests.
pub async fn create_memory_db() -> Result<DbPool, sqlx::Error> {
    connect("sqlite::memory:").await
}

async fn connect(url: &str) -> Result<DbPool, sqlx::Error> {
    // A single long-lived connection: SQLite serialises writers anyway, and
    // an in-memory database vanishes with its connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(url)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            amount_cad TEXT,
            amount_usd TEXT,
            category_id INTEGER,
            notes TEXT,
            kind TEXT NOT NULL,
            month TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_month ON transactions(user_id, month)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed_default_categories(pool: &DbPool) -> Result<(), sqlx::Error> {
    for (name, kind) in DEFAULT_CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (name, kind) VALUES (?, ?)")
            .bind(name)
            .bind(kind.to_string())
            .execute(pool)
            .await?;
    }
    Ok(())
}

pub async fn get_all_categories(pool: &DbPool) -> Result<Vec<Category>, StorageError> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, name, kind FROM categories ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, name, kind)| {
            Ok(Category {
                id: Some(CategoryId(id)),
                name,
                kind: parse_kind(&kind)?,
            })
        })
        .collect()
}

pub async fn get_transactions_for_user(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<Transaction>, StorageError> {
    type Row = (
        i64,
        String,
        String,
        Option<String>,
        Option<String>,
        Option<i64>,
        Option<String>,
        String,
        String,
    );
    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, name, date, amount_cad, amount_usd, category_id, notes, kind, created_at
         FROM transactions WHERE user_id = ? ORDER BY date, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(
            |(id, name, date, amount_cad, amount_usd, category_id, notes, kind, created_at)| {
                let date = parse_date(&date)?;
                Ok(Transaction {
                    id,
                    user_id: user_id.to_string(),
                    name,
                    date,
                    amount_cad: parse_stored_amount(amount_cad)?,
                    amount_usd: parse_stored_amount(amount_usd)?,
                    category_id: category_id.map(CategoryId),
                    notes,
                    kind: parse_tx_kind(&kind)?,
                    month: Month::from_date(date),
                    created_at: parse_timestamp(&created_at)?,
                })
            },
        )
        .collect()
}

fn parse_kind(s: &str) -> Result<CategoryKind, StorageError> {
    match s {
        "Income" => Ok(CategoryKind::Income),
        "Expense" => Ok(CategoryKind::Expense),
        other => Err(StorageError::Corrupt(format!("category kind: {other}"))),
    }
}

fn parse_tx_kind(s: &str) -> Result<TransactionType, StorageError> {
    TransactionType::parse(s).ok_or_else(|| StorageError::Corrupt(format!("transaction kind: {s}")))
}

fn parse_date(s: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| StorageError::Corrupt(format!("date: {s}")))
}

fn parse_stored_amount(s: Option<String>) -> Result<Option<Decimal>, StorageError> {
    s.map(|s| Decimal::from_str(&s).map_err(|_| StorageError::Corrupt(format!("amount: {s}"))))
        .transpose()
}

fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|_| StorageError::Corrupt(format!("timestamp: {s}")))
}
