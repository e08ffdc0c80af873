/// LLM Client — the single point of entry for all Gemini API calls in Nexus.
///
/// ARCHITECTURAL RULE: No other module may call the generative API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gemini-2.5-flash (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls in Nexus.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;
const SINGLE_SHOT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// A live sequence of text fragments from the generator, in arrival order.
/// Finite and single-pass; dropping it abandons the transfer.
pub type TextStream = ReceiverStream<Result<String, LlmError>>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response wire types (Gemini v1beta generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<RequestContent<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig<'a> {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: Value,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Concatenates the text parts of the first candidate, or `None` if the
    /// response carried no text at all.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let mut out = String::new();
        for part in parts {
            if let Some(text) = &part.text {
                out.push_str(text);
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Call options
// ────────────────────────────────────────────────────────────────────────────

/// Per-call knobs. The defaults give a plain text generation with no
/// grounding tools.
#[derive(Debug, Default, Clone)]
pub struct GenerateOptions {
    pub system: Option<String>,
    /// Enables the Google Search grounding tool.
    pub search: bool,
    /// Constrains the response to JSON matching the given schema.
    pub response_schema: Option<Value>,
}

impl GenerateOptions {
    pub fn with_system(system: impl Into<String>) -> Self {
        GenerateOptions {
            system: Some(system.into()),
            ..Default::default()
        }
    }

    pub fn search(mut self) -> Self {
        self.search = true;
        self
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by all services in Nexus.
/// Wraps the Gemini generateContent API with retry logic, structured-output
/// helpers, and a chunked streaming mode.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            // No client-wide timeout: streamed generations may legitimately
            // run for minutes. Single-shot calls set a per-request timeout.
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn request_body<'a>(prompt: &'a str, opts: &'a GenerateOptions) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            system_instruction: opts.system.as_deref().map(|text| RequestContent {
                role: None,
                parts: vec![RequestPart { text }],
            }),
            generation_config: opts.response_schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(schema),
            }),
            tools: if opts.search {
                vec![Tool {
                    google_search: serde_json::json!({}),
                }]
            } else {
                vec![]
            },
        }
    }

    /// Makes a single-shot call, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn generate(
        &self,
        prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let request_body = Self::request_body(prompt, opts);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .timeout(SINGLE_SHOT_TIMEOUT)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse the structured error message
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                    usage.prompt_token_count, usage.candidates_token_count
                );
            }

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Single-shot call that must yield non-empty text.
    pub async fn generate_text(
        &self,
        prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<String, LlmError> {
        let response = self.generate(prompt, opts).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }

    /// Convenience method that calls the LLM and deserializes the text
    /// response as JSON. Pass a `response_schema` in `opts` so the model is
    /// held to the expected shape.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<T, LlmError> {
        let text = self.generate_text(prompt, opts).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Opens a streaming generation and returns the response as a sequence of
    /// text fragments in arrival order. Any failure while reading terminates
    /// the sequence with a single error item; fragments already delivered are
    /// not recalled.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<TextStream, LlmError> {
        let url = format!("{GEMINI_API_BASE}/{MODEL}:streamGenerateContent?alt=sse");
        let request_body = Self::request_body(prompt, opts);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_sse(response, tx));
        Ok(ReceiverStream::new(rx))
    }
}

/// Reads the SSE body and forwards each text fragment to the channel.
/// Stops when the body ends, an error occurs, or the receiver is dropped.
async fn pump_sse(response: reqwest::Response, tx: mpsc::Sender<Result<String, LlmError>>) {
    use futures_util::StreamExt;

    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(LlmError::Http(e))).await;
                return;
            }
        };
        buffer.extend_from_slice(&chunk);

        for line in drain_lines(&mut buffer) {
            let Some(payload) = data_payload(&line) else {
                continue;
            };
            match chunk_text(payload) {
                Ok(Some(text)) => {
                    if tx.send(Ok(text)).await.is_err() {
                        // Consumer abandoned the stream; discard the rest.
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    }
}

/// Removes and returns all complete lines from the buffer, leaving any
/// trailing partial line in place. Splitting on line boundaries keeps
/// multi-byte UTF-8 scalars intact — a newline byte can never fall inside one.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=pos).collect();
        line.pop(); // the newline itself
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
    lines
}

/// Returns the payload of an SSE `data:` line, or `None` for any other line.
fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Parses one streamed response chunk and extracts its text, if any.
fn chunk_text(payload: &str) -> Result<Option<String>, LlmError> {
    let response: LlmResponse = serde_json::from_str(payload)?;
    Ok(response.text())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
