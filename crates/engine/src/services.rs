//! Collaborator interfaces consumed by the engine.

use async_trait::async_trait;
use inkdeck_core::Format;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

/// Metadata filter applied to every semantic query. Only the format is
/// filtered on; inks are left open so identity selection sees the whole
/// neighbourhood of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter {
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub payload: Value,
    pub score: f32,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}

#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ServiceError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Bounds an external call. Elapsed time maps to `ServiceError::Timeout`.
pub async fn bounded<T, F>(limit_ms: u64, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(Duration::from_millis(limit_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(limit_ms)),
    }
}
