use serde::{Deserialize, Serialize};

use super::backend::InferenceBackend;
use super::AnalysisError;
use crate::config::{AnalyzerConfig, GenerationOptions};

/// HTTP client for a Gemini-compatible `generateContent` endpoint.
///
/// The credential travels as the `key` query parameter. No client-side
/// timeout is set; the transport default applies.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    generation: GenerationOptions,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    /// Create a client. Fails with `Configuration` when the key is blank.
    pub fn new(
        endpoint: &str,
        api_key: &str,
        generation: GenerationOptions,
    ) -> Result<Self, AnalysisError> {
        if api_key.trim().is_empty() {
            return Err(AnalysisError::Configuration);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("symptom-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalysisError::Transport {
                status: None,
                body: e.to_string(),
            })?;

        Ok(Self {
            endpoint: endpoint.trim().to_string(),
            api_key: api_key.trim().to_string(),
            generation,
            client,
        })
    }

    /// Create a client from configuration; `Configuration` when no key is set.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalysisError> {
        let api_key = config.api_key.as_deref().ok_or(AnalysisError::Configuration)?;
        Self::new(&config.endpoint, api_key, config.generation.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, options: &GenerationOptions) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
                max_output_tokens: options.max_output_tokens,
            },
        }
    }
}

/// Response body from `generateContent`; only the parts we read.
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

/// Pull the innermost text out of a `generateContent` reply envelope.
pub fn extract_reply_text(body: &str) -> Result<String, AnalysisError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::ResponseFormat(format!("reply is not JSON: {e}")))?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| {
            AnalysisError::ResponseFormat("missing candidates[0].content.parts[].text".into())
        })
}

impl InferenceBackend for GeminiClient {
    async fn generate(&self, payload: &str) -> Result<String, AnalysisError> {
        let body = GenerateRequest::new(payload, &self.generation);

        tracing::debug!(endpoint = %self.endpoint, prompt_len = payload.len(), "Sending inference request");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport {
                status: None,
                body: e.without_url().to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AnalysisError::Transport {
            status: Some(status.as_u16()),
            body: e.without_url().to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Inference backend returned an error");
            return Err(AnalysisError::Transport {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        extract_reply_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    fn envelope(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        })
    }

    #[derive(Default)]
    struct Seen {
        key: Option<String>,
        body: Option<serde_json::Value>,
    }

    /// Serve one canned (status, body) pair on an ephemeral local port.
    async fn mock_server(status: StatusCode, body: String) -> (SocketAddr, Arc<Mutex<Seen>>) {
        let seen = Arc::new(Mutex::new(Seen::default()));
        let state = (status, body, seen.clone());

        let app = Router::new()
            .route(
                "/generate",
                post(
                    |State((status, body, seen)): State<(StatusCode, String, Arc<Mutex<Seen>>)>,
                     Query(query): Query<HashMap<String, String>>,
                     Json(request): Json<serde_json::Value>| async move {
                        let mut s = seen.lock().unwrap();
                        s.key = query.get("key").cloned();
                        s.body = Some(request);
                        (status, body)
                    },
                ),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, seen)
    }

    fn client_for(addr: SocketAddr) -> GeminiClient {
        GeminiClient::new(
            &format!("http://{addr}/generate"),
            "test-key",
            GenerationOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn blank_key_is_configuration_error() {
        let result = GeminiClient::new("http://localhost", "  ", GenerationOptions::default());
        assert!(matches!(result, Err(AnalysisError::Configuration)));
    }

    #[test]
    fn from_config_without_key_is_configuration_error() {
        let result = GeminiClient::from_config(&AnalyzerConfig::default());
        assert!(matches!(result, Err(AnalysisError::Configuration)));
    }

    #[test]
    fn debug_output_redacts_key() {
        let client =
            GeminiClient::new("http://localhost", "secret-key", GenerationOptions::default())
                .unwrap();
        let shown = format!("{client:?}");
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn request_body_carries_prompt_and_generation_config() {
        let options = GenerationOptions::default();
        let body = serde_json::to_value(GenerateRequest::new("my prompt", &options)).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "my prompt");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
        assert!(body["generationConfig"]["temperature"].is_number());
        assert!(body["generationConfig"]["topP"].is_number());
    }

    #[test]
    fn extract_reply_text_reads_first_text_part() {
        let body = envelope("{\"urgencyLevel\":\"low\"}").to_string();
        assert_eq!(extract_reply_text(&body).unwrap(), "{\"urgencyLevel\":\"low\"}");
    }

    #[test]
    fn extract_reply_text_missing_candidates() {
        let result = extract_reply_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(matches!(result, Err(AnalysisError::ResponseFormat(_))));
    }

    #[test]
    fn extract_reply_text_missing_text_part() {
        let result = extract_reply_text(r#"{"candidates": [{"content": {"parts": []}}]}"#);
        assert!(matches!(result, Err(AnalysisError::ResponseFormat(_))));
    }

    #[test]
    fn extract_reply_text_non_json_body() {
        let result = extract_reply_text("<html>gateway</html>");
        assert!(matches!(result, Err(AnalysisError::ResponseFormat(_))));
    }

    #[tokio::test]
    async fn successful_round_trip_returns_inner_text() {
        let (addr, seen) =
            mock_server(StatusCode::OK, envelope("analysis text").to_string()).await;
        let client = client_for(addr);

        let text = client.generate("prompt body").await.unwrap();
        assert_eq!(text, "analysis text");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.key.as_deref(), Some("test-key"));
        let body = seen.body.as_ref().unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt body");
    }

    #[tokio::test]
    async fn error_status_is_transport_error_with_body() {
        let (addr, _) = mock_server(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"message": "quota"}}"#.to_string(),
        )
        .await;
        let client = client_for(addr);

        match client.generate("prompt").await {
            Err(AnalysisError::Transport { status, body }) => {
                assert_eq!(status, Some(429));
                assert!(body.contains("quota"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_text_is_response_format_error() {
        let (addr, _) = mock_server(StatusCode::OK, r#"{"candidates": []}"#.to_string()).await;
        let client = client_for(addr);

        let result = client.generate("prompt").await;
        assert!(matches!(result, Err(AnalysisError::ResponseFormat(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error_without_status() {
        // Bind then drop to get a port nobody is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(addr);
        match client.generate("prompt").await {
            Err(AnalysisError::Transport { status, .. }) => assert_eq!(status, None),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
