use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use webforge_core::config::RemoteConfig;

use crate::functions::{FunctionGateway, GatewayError};
use crate::store::{DataStore, Filter, Ordering, Row, StoreError};

/// REST adapter for the managed backend: `/rest/v1/{table}` for rows,
/// `/functions/v1/{name}` for serverless endpoints. One client, bearer
/// service key, no retries (failure policy is surface-and-hold).
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    service_key: SecretString,
}

impl RestBackend {
    pub fn from_config(config: &RemoteConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{function}", self.base_url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.service_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }
}

fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq { column, value } => (column.clone(), format!("eq.{}", literal(value))),
    }
}

// PostgREST filter literals are unquoted scalars.
fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn order_param(ordering: &Ordering) -> String {
    let direction = if ordering.descending { "desc" } else { "asc" };
    format!("{}.{direction}", ordering.column)
}

async fn rejection(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    (status, message)
}

#[async_trait]
impl DataStore for RestBackend {
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&Value::Object(row))
            .send()
            .await
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = rejection(response).await;
            return Err(StoreError::Rejected { status, message });
        }

        // The backend answers an insert with the array of created rows.
        let mut rows: Vec<Row> = response
            .json()
            .await
            .map_err(|error| StoreError::Decode(error.to_string()))?;
        rows.pop()
            .ok_or_else(|| StoreError::Decode("insert returned no representation".to_string()))
    }

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Row>, StoreError> {
        let mut query: Vec<(String, String)> = filters.iter().map(filter_param).collect();
        if let Some(ordering) = ordering {
            query.push(("order".to_string(), order_param(ordering)));
        }

        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&query)
            .send()
            .await
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = rejection(response).await;
            return Err(StoreError::Rejected { status, message });
        }

        response.json().await.map_err(|error| StoreError::Decode(error.to_string()))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<(), StoreError> {
        let query: Vec<(String, String)> = filters.iter().map(filter_param).collect();

        let response = self
            .authorized(self.client.patch(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .query(&query)
            .json(&Value::Object(patch))
            .send()
            .await
            .map_err(|error| StoreError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = rejection(response).await;
            return Err(StoreError::Rejected { status, message });
        }

        Ok(())
    }
}

#[async_trait]
impl FunctionGateway for RestBackend {
    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError> {
        let response = self
            .authorized(self.client.post(self.function_url(function)))
            .json(&body)
            .send()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                function: function.to_string(),
                status,
                message,
            });
        }

        response.json().await.map_err(|error| GatewayError::Decode(error.to_string()))
    }
}
