use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::functions::{FunctionGateway, GatewayError};
use crate::store::{DataStore, Filter, Ordering, Row, StoreError};

/// In-memory stand-in for the platform's relational store. Rows get a
/// sequential `id` when none is supplied; `fail_next_with` injects a
/// one-shot transport failure for error-path tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    next_id: RwLock<i64>,
    failure: RwLock<Option<String>>,
}

impl InMemoryStore {
    pub async fn fail_next_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().await.get(table).cloned().unwrap_or_default()
    }

    async fn take_failure(&self) -> Option<String> {
        self.failure.write().await.take()
    }
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => row.get(column) == Some(value),
    })
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        if let Some(message) = self.take_failure().await {
            return Err(StoreError::Transport(message));
        }

        let mut stored = row;
        if !stored.contains_key("id") {
            let mut next_id = self.next_id.write().await;
            *next_id += 1;
            stored.insert("id".to_string(), Value::from(*next_id));
        }

        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Row>, StoreError> {
        if let Some(message) = self.take_failure().await {
            return Err(StoreError::Transport(message));
        }

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_filters(row, filters)).cloned().collect())
            .unwrap_or_default();

        if let Some(ordering) = ordering {
            rows.sort_by(|left, right| {
                let left = left.get(&ordering.column).map(Value::to_string).unwrap_or_default();
                let right = right.get(&ordering.column).map(Value::to_string).unwrap_or_default();
                if ordering.descending {
                    right.cmp(&left)
                } else {
                    left.cmp(&right)
                }
            });
        }

        Ok(rows)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<(), StoreError> {
        if let Some(message) = self.take_failure().await {
            return Err(StoreError::Transport(message));
        }

        let mut tables = self.tables.write().await;
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches_filters(row, filters)) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
            }
        }
        Ok(())
    }
}

/// In-memory stand-in for the function gateway: canned response per
/// function name, every invocation recorded.
#[derive(Default)]
pub struct InMemoryGateway {
    responses: RwLock<HashMap<String, Value>>,
    calls: RwLock<Vec<(String, Value)>>,
    failure: RwLock<Option<String>>,
}

impl InMemoryGateway {
    pub async fn respond_with(&self, function: impl Into<String>, response: Value) {
        self.responses.write().await.insert(function.into(), response);
    }

    pub async fn fail_next_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl FunctionGateway for InMemoryGateway {
    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError> {
        self.calls.write().await.push((function.to_string(), body));

        if let Some(message) = self.failure.write().await.take() {
            return Err(GatewayError::Transport(message));
        }

        let responses = self.responses.read().await;
        responses.get(function).cloned().ok_or_else(|| GatewayError::Rejected {
            function: function.to_string(),
            status: 404,
            message: "no handler registered".to_string(),
        })
    }
}
