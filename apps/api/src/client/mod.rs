//! Client for the Nexus proxy — the consumer side of `POST /api/nexus`.
//!
//! Report and deep-dive requests come back as a live sequence of text chunks
//! in arrival order (single-pass, not restartable); lookups, chat turns, and
//! letter drafts resolve once to a complete value. Dropping a chunk stream
//! abandons the transfer — no cancel signal is sent to the remote side.

pub mod decode;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::models::chat::{ChatMessage, SymbiosisContext};
use crate::models::opportunity::{LiveOpportunityItem, OpportunityFeed};
use crate::models::report::{LetterRequest, ReportParameters};
use decode::Utf8Decoder;

const STREAM_CHANNEL_CAPACITY: usize = 32;

/// A live sequence of response text chunks, in arrival order.
pub type ChunkStream = ReceiverStream<Result<String, ClientError>>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    cities: Vec<String>,
}

/// Client for the Nexus action API.
#[derive(Clone)]
pub struct NexusClient {
    client: Client,
    base_url: String,
}

impl NexusClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Posts an `{action, payload}` envelope and returns the raw response.
    /// Non-success statuses are mapped to a single descriptive error, using
    /// the server's JSON error body when one is present.
    async fn post_action(
        &self,
        action: &str,
        payload: Value,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/nexus", self.base_url))
            .json(&json!({ "action": action, "payload": payload }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                format!("API request failed with status {}", status.as_u16())
            });
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Opens a streaming action and exposes the response body as decoded
    /// text chunks.
    async fn stream_action(&self, action: &str, payload: Value) -> Result<ChunkStream, ClientError> {
        let response = self.post_action(action, payload).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_chunks(response, tx));
        Ok(ReceiverStream::new(rx))
    }

    // ── Typed actions ───────────────────────────────────────────────────────

    pub async fn generate_strategic_report(
        &self,
        params: &ReportParameters,
    ) -> Result<ChunkStream, ClientError> {
        self.stream_action("generateStrategicReport", json!({ "params": params }))
            .await
    }

    pub async fn generate_analysis_stream(
        &self,
        item: &LiveOpportunityItem,
        region: &str,
    ) -> Result<ChunkStream, ClientError> {
        self.stream_action(
            "generateAnalysisStream",
            json!({ "item": item, "region": region }),
        )
        .await
    }

    pub async fn fetch_regional_cities(&self, country: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .post_action("fetchRegionalCities", json!({ "country": country }))
            .await?;
        let body: CitiesResponse = response.json().await?;
        Ok(body.cities)
    }

    pub async fn fetch_live_opportunities(&self) -> Result<OpportunityFeed, ClientError> {
        let response = self.post_action("fetchLiveOpportunities", json!({})).await?;
        let feed: OpportunityFeed = response.json().await?;
        Ok(feed)
    }

    pub async fn fetch_symbiosis_response(
        &self,
        context: &SymbiosisContext,
        history: &[ChatMessage],
    ) -> Result<String, ClientError> {
        let response = self
            .post_action(
                "fetchSymbiosisResponse",
                json!({ "context": context, "history": history }),
            )
            .await?;
        let body: TextResponse = response.json().await?;
        Ok(body.text)
    }

    pub async fn generate_outreach_letter(
        &self,
        request: &LetterRequest,
    ) -> Result<String, ClientError> {
        let response = self
            .post_action("generateOutreachLetter", json!({ "request": request }))
            .await?;
        let body: TextResponse = response.json().await?;
        Ok(body.text)
    }
}

/// Reads the chunked response body, decodes it incrementally, and forwards
/// each text chunk. Stops when the body ends, an error occurs, or the
/// receiver is dropped.
async fn pump_chunks(response: reqwest::Response, tx: mpsc::Sender<Result<String, ClientError>>) {
    use futures_util::StreamExt;

    let mut body = response.bytes_stream();
    let mut decoder = Utf8Decoder::new();

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                let text = decoder.decode(&bytes);
                if text.is_empty() {
                    continue;
                }
                if tx.send(Ok(text)).await.is_err() {
                    // Consumer abandoned the stream; discard trailing chunks.
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(ClientError::Http(e))).await;
                return;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        let _ = tx.send(Ok(tail)).await;
    }
}

/// Extracts the message from a server error body, either the structured
/// `{"error": {"message": ...}}` shape or a bare `{"error": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value["error"] {
        Value::String(message) => Some(message.clone()),
        Value::Object(detail) => detail
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_structured_body() {
        let body = r#"{"error":{"code":"LLM_ERROR","message":"An AI processing error occurred"}}"#;
        assert_eq!(
            error_message(body),
            Some("An AI processing error occurred".to_string())
        );
    }

    #[test]
    fn test_error_message_from_bare_string_body() {
        let body = r#"{"error":"Invalid action"}"#;
        assert_eq!(error_message(body), Some("Invalid action".to_string()));
    }

    #[test]
    fn test_error_message_absent_for_unparseable_body() {
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"detail":"nope"}"#), None);
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = NexusClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
