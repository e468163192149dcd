use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("function `{function}` rejected the request with status {status}: {message}")]
    Rejected { function: String, status: u16, message: String },
    #[error("decode failure: {0}")]
    Decode(String),
}

/// Named serverless endpoints on the managed backend: JSON in, JSON out.
#[async_trait]
pub trait FunctionGateway: Send + Sync {
    async fn invoke(&self, function: &str, body: Value) -> Result<Value, GatewayError>;
}
