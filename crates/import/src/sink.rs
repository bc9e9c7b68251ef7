use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;

use moneta_core::NewTransaction;

#[derive(Debug, Error)]
pub enum SinkError {
    /// This row could not be inserted (e.g. the category id no longer
    /// exists). The batch continues.
    #[error("{0}")]
    Row(String),
    /// The store itself is gone (connection lost, pool closed). Remaining
    /// rows are abandoned.
    #[error("Persistence failure: {0}")]
    Fatal(String),
}

/// Where validated transactions end up. The orchestrator only ever inserts;
/// reads and updates belong to other use cases.
pub trait TransactionSink: Send + Sync {
    fn insert(
        &self,
        user_id: &str,
        tx: &NewTransaction,
    ) -> impl Future<Output = Result<i64, SinkError>> + Send;
}

/// In-memory sink for tests and dry runs. Optionally fails specific names
/// with a row error, or goes fatal after a set number of inserts.
#[derive(Default)]
pub struct MemorySink {
    inserted: Mutex<Vec<(String, NewTransaction)>>,
    fail_names: Vec<String>,
    fatal_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects rows whose name is in `names` with a row error.
    pub fn failing_names(names: &[&str]) -> Self {
        Self {
            fail_names: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Sink that accepts `n` inserts and then fails fatally.
    pub fn fatal_after(n: usize) -> Self {
        Self {
            fatal_after: Some(n),
            ..Self::default()
        }
    }

    pub fn inserted(&self) -> Vec<(String, NewTransaction)> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }
}

impl TransactionSink for MemorySink {
    async fn insert(&self, user_id: &str, tx: &NewTransaction) -> Result<i64, SinkError> {
        if self.fail_names.iter().any(|n| n == &tx.name) {
            return Err(SinkError::Row(format!("Insert rejected: {}", tx.name)));
        }
        let mut inserted = self.inserted.lock().unwrap();
        if let Some(limit) = self.fatal_after {
            if inserted.len() >= limit {
                return Err(SinkError::Fatal("connection lost".to_string()));
            }
        }
        inserted.push((user_id.to_string(), tx.clone()));
        Ok(inserted.len() as i64)
    }
}
