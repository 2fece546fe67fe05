//! Google Gemini backend over server-sent events.
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` and yields the text
//! parts of each event as one chunk. The stream is lazy: the HTTP request is
//! sent on first poll.

use futures_util::StreamExt;
use serde::Deserialize;

use crate::domain::{ChunkStream, GenerationError, TextGenerator};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

/// Interpret one SSE `data:` payload.
///
/// Returns the concatenated text parts, `None` for events without text, or
/// the error the backend reported inside the stream.
fn parse_event_data(data: &str) -> Result<Option<String>, GenerationError> {
    let response: GenerateContentResponse = match serde_json::from_str(data) {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Skipping unparsable Gemini event: {}", e);
            return Ok(None);
        }
    };

    if let Some(error) = response.error {
        return Err(GenerationError::Backend(error.message));
    }

    if response.candidates.is_empty()
        && let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason)
    {
        return Err(GenerationError::Backend(format!("prompt blocked: {}", reason)));
    }

    let text: String = response
        .candidates
        .into_iter()
        .take(1)
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .collect();

    Ok((!text.is_empty()).then_some(text))
}

/// Pull every complete event (terminated by a blank line) out of `buffer`
/// and return the `data:` payloads in order.
fn drain_events(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(pos) = buffer.find("\n\n") {
        let event: String = buffer.drain(..pos + 2).collect();
        payloads.extend(data_lines(&event));
    }
    payloads
}

/// Append decoded text to `buffer` with CRLF folded to LF.
///
/// A trailing `\r` stays in the buffer until the next read shows whether a
/// `\n` follows it.
fn push_text(buffer: &mut String, text: &str) {
    buffer.push_str(text);
    if buffer.contains("\r\n") {
        *buffer = buffer.replace("\r\n", "\n");
    }
}

/// Decode the complete UTF-8 prefix of `pending`, keeping an incomplete
/// trailing sequence for the next network chunk.
fn take_utf8(pending: &mut Vec<u8>) -> String {
    let valid = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => {
            let text = String::from_utf8_lossy(pending).into_owned();
            pending.clear();
            return text;
        }
    };
    let rest = pending.split_off(valid);
    let text = String::from_utf8_lossy(pending).into_owned();
    *pending = rest;
    text
}

fn data_lines(event: &str) -> Vec<String> {
    event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.trim_start().to_string())
        .filter(|data| !data.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the generator at another endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, question: &str) -> ChunkStream {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let endpoint = self.endpoint();
        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": question }] }]
        });

        Box::pin(async_stream::stream! {
            let response = match client
                .post(&endpoint)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Err(GenerationError::Request(e.to_string()));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorEnvelope>(&text)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or(text);
                yield Err(GenerationError::Status {
                    status: status.as_u16(),
                    message,
                });
                return;
            }

            let mut byte_stream = response.bytes_stream();
            let mut pending = Vec::new();
            let mut buffer = String::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(GenerationError::Interrupted(e.to_string()));
                        return;
                    }
                };
                pending.extend_from_slice(&bytes);
                push_text(&mut buffer, &take_utf8(&mut pending));

                for data in drain_events(&mut buffer) {
                    match parse_event_data(&data) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            // The last event may lack its terminating blank line.
            for data in data_lines(&buffer) {
                match parse_event_data(&data) {
                    Ok(Some(text)) => yield Ok(text),
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }
}
