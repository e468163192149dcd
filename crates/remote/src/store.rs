use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A record as the managed backend sees it: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    Eq { column: String, value: Value },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq { column: column.into(), value: value.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub column: String,
    pub descending: bool,
}

impl Ordering {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self { column: column.into(), descending: false }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self { column: column.into(), descending: true }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("decode failure: {0}")]
    Decode(String),
}

/// The relational surface of the managed backend. Row-level semantics
/// (auth policies, defaults, generated ids) live on the platform side.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Row>, StoreError>;

    async fn update(&self, table: &str, filters: &[Filter], patch: Row)
        -> Result<(), StoreError>;
}
