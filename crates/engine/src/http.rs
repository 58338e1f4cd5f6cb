//! HTTP clients for an Ollama-compatible model server and a Qdrant-compatible
//! vector store.

use crate::{
    Embedder, EngineConfig, SearchFilter, SearchHit, ServiceError, TextGenerator, VectorSearch,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

fn client(timeout_ms: u64) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(ServiceError::from)
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        body,
    })
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            client: client(config.search_timeout_ms)?,
            base_url: config.embed_url.trim_end_matches('/').to_string(),
            model: config.embed_model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: vec![text],
        };
        let response = checked(self.client.post(&url).json(&request).send().await?).await?;
        let body: EmbedResponse = response.json().await?;
        body.embeddings
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| ServiceError::Decode("empty embedding".to_string()))
    }
}

pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            client: client(config.generation_timeout_ms)?,
            base_url: config.generate_url.trim_end_matches('/').to_string(),
            model: config.generate_model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response = checked(self.client.post(&url).json(&request).send().await?).await?;
        let body: GenerateResponse = response.json().await?;
        debug!(model = %self.model, chars = body.response.len(), "generation finished");
        Ok(body.response)
    }
}

pub struct QdrantSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    format_field: String,
}

#[derive(Deserialize)]
struct PointsResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<Value>,
}

impl QdrantSearch {
    pub fn new(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            client: client(config.search_timeout_ms)?,
            base_url: config.search_url.trim_end_matches('/').to_string(),
            api_key: config.search_api_key.clone(),
            format_field: config.format_field.clone(),
        })
    }

    fn filter_body(&self, filter: &SearchFilter) -> Value {
        json!({
            "must": [
                { "key": self.format_field, "match": { "any": [filter.format.as_str()] } }
            ]
        })
    }
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        let url = format!("{}/collections/{collection}/points/search", self.base_url);
        let body = json!({
            "vector": vector,
            "filter": self.filter_body(filter),
            "limit": limit,
            "with_payload": true,
        });
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }
        let response = checked(request.send().await?).await?;
        let points: PointsResponse = response.json().await?;
        Ok(points
            .result
            .into_iter()
            .filter_map(|point| {
                point.payload.map(|payload| SearchHit {
                    payload,
                    score: point.score,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkdeck_core::Format;

    #[test]
    fn filter_targets_configured_field() {
        let config = EngineConfig {
            format_field: "legal_formats".to_string(),
            ..EngineConfig::default()
        };
        let search = QdrantSearch::new(&config).expect("client");
        let body = search.filter_body(&SearchFilter {
            format: Format::Infinity,
        });
        assert_eq!(body["must"][0]["key"], "legal_formats");
        assert_eq!(body["must"][0]["match"]["any"][0], "infinity");
    }

    #[test]
    fn points_response_skips_missing_payloads() {
        let raw = r#"{"result": [
            {"id": 1, "score": 0.9, "payload": {"name": "A"}},
            {"id": 2, "score": 0.5}
        ]}"#;
        let points: PointsResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(points.result.len(), 2);
        assert!(points.result[1].payload.is_none());
    }
}
