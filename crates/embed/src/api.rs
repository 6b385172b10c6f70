//! HTTP embedding providers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::{EmbedConfig, ProviderKind};
use crate::{l2_normalize_in_place, Embedder, EmbedError};

/// Embedder backed by a remote embedding service.
///
/// The whole batch goes out in one request and the response vectors are
/// paired back by position.
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    cfg: EmbedConfig,
}

impl std::fmt::Debug for ApiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiEmbedder")
            .field("url", &self.url)
            .field("provider", &self.cfg.provider)
            .field("dimension", &self.cfg.dimension)
            .finish()
    }
}

impl ApiEmbedder {
    pub fn new(cfg: EmbedConfig) -> Result<Self, EmbedError> {
        cfg.validate()?;
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| EmbedError::InvalidConfig("api_url is required".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| EmbedError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client, url, cfg })
    }

    async fn send(&self, payload: Value) -> Result<Value, EmbedError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(value) = self.cfg.api_auth_header.as_deref() {
            request = request.header(self.cfg.auth_header_name.as_str(), value);
        }

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmbedError::Request(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Request(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmbedError::Response(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = build_api_payload(self.cfg.provider, texts, &self.cfg.model_name);
        let response = self.send(payload).await?;
        let mut vectors = parse_embeddings_from_value(response)?;

        if vectors.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        for vector in vectors.iter_mut() {
            if vector.len() != self.cfg.dimension {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.cfg.dimension,
                    actual: vector.len(),
                });
            }
            if self.cfg.normalize {
                l2_normalize_in_place(vector);
            }
        }

        tracing::debug!(
            provider = ?self.cfg.provider,
            inputs = texts.len(),
            "embed_batch_completed"
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.cfg.dimension
    }
}

pub(crate) fn build_api_payload(provider: ProviderKind, texts: &[String], model: &str) -> Value {
    match provider {
        ProviderKind::HuggingFace => json!({ "inputs": texts }),
        ProviderKind::OpenAi => json!({ "input": texts, "model": model }),
        ProviderKind::Gemini => {
            let model_path = if model.starts_with("models/") {
                model.to_string()
            } else {
                format!("models/{model}")
            };
            let requests: Vec<Value> = texts
                .iter()
                .map(|text| {
                    json!({
                        "model": model_path,
                        "content": { "parts": [{ "text": text }] }
                    })
                })
                .collect();
            json!({ "requests": requests })
        }
        ProviderKind::Custom | ProviderKind::Stub => json!({ "texts": texts }),
    }
}

/// Accepts `{"embeddings": ...}`, `{"data": [{"embedding": ...}]}`, Gemini's
/// `{"embeddings": [{"values": ...}]}` and bare (nested) arrays.
pub(crate) fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, EmbedError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => parse_embedding_vector(embedding),
                            None => Err(EmbedError::Response(
                                "missing `embedding` field in data item".into(),
                            )),
                        },
                        _ => Err(EmbedError::Response(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(EmbedError::Response("unsupported API response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, EmbedError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items
                .iter()
                .all(|item| matches!(item, Value::Array(_) | Value::Object(_)))
            {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbedError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::Response("non-finite embedding value".into())),
                other => Err(EmbedError::Response(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        Value::Object(mut obj) => match obj.remove("values").or_else(|| obj.remove("embedding")) {
            Some(inner) => parse_embedding_vector(inner),
            None => Err(EmbedError::Response(
                "embedding object has no `values` field".into(),
            )),
        },
        other => Err(EmbedError::Response(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
