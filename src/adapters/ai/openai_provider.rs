//! OpenAI Provider - GenerationClient over the chat completions API.
//!
//! Works against OpenAI and any server speaking the same protocol
//! (set `base_url`).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events. Bytes are buffered until a full line is available
//! (chunks from the network do not respect line or UTF-8 boundaries), each
//! `data:` line is parsed, and content deltas are yielded as fragments until
//! the `[DONE]` marker. A body that ends before `[DONE]` or a `finish_reason`
//! ends the stream with a network error.

use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

use super::relay::{relay, DEFAULT_STREAM_BUFFER};
use crate::ports::{
    FragmentStream, GenerationClient, GenerationContext, GenerationError, GenerationRequest,
};

/// Placeholder replaced by the request subject inside a system instruction.
pub const SUBJECT_PLACEHOLDER: &str = "{theme}";

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout (covers the whole streamed response).
    pub timeout: Duration,
    /// Capacity of the fragment relay channel.
    pub stream_buffer: usize,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
            stream_buffer: DEFAULT_STREAM_BUFFER,
            temperature: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the relay channel capacity.
    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Timeout in whole seconds, saturating at `u32::MAX`.
    fn timeout_secs(&self) -> u32 {
        u32::try_from(self.timeout.as_secs()).unwrap_or(u32::MAX)
    }
}

/// OpenAI API provider implementation.
#[derive(Clone)]
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts a generation request to OpenAI's format.
    fn to_openai_request(&self, request: &GenerationRequest) -> OpenAIRequest {
        let mut messages = vec![OpenAIMessage {
            role: "system".to_string(),
            content: render_instruction(&request.system_instruction, request.subject.as_deref()),
        }];

        match &request.context {
            GenerationContext::Text(text) => messages.push(OpenAIMessage {
                role: "user".to_string(),
                content: text.clone(),
            }),
            // Prior turns alternate interviewer / interviewee, interviewer first.
            GenerationContext::Sequence(turns) => {
                for (i, turn) in turns.iter().enumerate() {
                    let role = if i % 2 == 0 { "assistant" } else { "user" };
                    messages.push(OpenAIMessage {
                        role: role.to_string(),
                        content: turn.clone(),
                    });
                }
            }
        }

        OpenAIRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            stream: true,
        }
    }

    async fn send_streaming_request(
        client: Client,
        url: String,
        api_key: String,
        body: OpenAIRequest,
        timeout_secs: u32,
    ) -> Result<Response, GenerationError> {
        client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout { timeout_secs }
                } else if e.is_connect() {
                    GenerationError::network(format!("Connection failed: {}", e))
                } else {
                    GenerationError::network(e.to_string())
                }
            })
    }

    /// Maps a non-success HTTP status to a generation error.
    async fn handle_response_status(response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        warn!(status = %status, "generation backend rejected request");

        match status.as_u16() {
            401 | 403 => Err(GenerationError::AuthenticationFailed),
            429 => Err(GenerationError::rate_limited(parse_retry_after(&error_body))),
            400 | 404 | 422 => Err(GenerationError::InvalidRequest(error_body)),
            500..=599 => Err(GenerationError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(GenerationError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

impl GenerationClient for OpenAIProvider {
    fn generate(&self, request: GenerationRequest) -> FragmentStream {
        let body = self.to_openai_request(&request);
        let client = self.client.clone();
        let url = self.completions_url();
        let api_key = self.config.api_key().to_string();
        let timeout_secs = self.config.timeout_secs();

        relay(self.config.stream_buffer, async move {
            debug!(model = %body.model, "starting streamed completion");
            let response =
                Self::send_streaming_request(client, url, api_key, body, timeout_secs).await?;
            let response = Self::handle_response_status(response).await?;
            Ok::<_, GenerationError>(sse_fragments(response.bytes_stream()))
        })
    }
}

/// Substitutes the subject into the instruction.
///
/// Instructions without a placeholder get the subject appended on its own line.
fn render_instruction(instruction: &str, subject: Option<&str>) -> String {
    match subject {
        Some(subject) if instruction.contains(SUBJECT_PLACEHOLDER) => {
            instruction.replace(SUBJECT_PLACEHOLDER, subject)
        }
        Some(subject) => format!("{}\n\nInterview theme: {}", instruction, subject),
        None => instruction.to_string(),
    }
}

/// Parses retry-after from an error response body, defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
            let rest = &message[message.find("try again in ")? + "try again in ".len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}

/// Turns the raw SSE byte stream into content fragments.
///
/// The stream only ends cleanly once the backend signalled completion, either
/// with `[DONE]` or a terminal `finish_reason`. Upstream EOF before that is a
/// network error.
fn sse_fragments<B, C, E>(bytes: B) -> impl Stream<Item = Result<String, GenerationError>> + Send
where
    B: Stream<Item = Result<C, E>> + Send + 'static,
    C: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        completed: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(chunk.as_ref());
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(GenerationError::network(format!("Stream error: {}", e))));
                    state.finished = true;
                }
                None => {
                    let events = state.decoder.finish();
                    state.absorb(events);
                    if !state.completed && !state.finished {
                        warn!("generation stream ended before completion");
                        state.pending.push_back(Err(GenerationError::network(
                            "stream ended before completion",
                        )));
                    }
                    state.finished = true;
                }
            }
        }
    })
}

struct SseState<B> {
    bytes: std::pin::Pin<Box<B>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, GenerationError>>,
    completed: bool,
    finished: bool,
}

impl<B> SseState<B> {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            if self.finished {
                return;
            }
            match event {
                SseEvent::Fragment(text) => self.pending.push_back(Ok(text)),
                SseEvent::Finished => self.completed = true,
                SseEvent::Done => {
                    self.completed = true;
                    self.finished = true;
                }
                SseEvent::Failed(err) => {
                    self.pending.push_back(Err(err));
                    self.finished = true;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Fragment(String),
    /// A choice reported a normal `finish_reason`.
    Finished,
    Done,
    Failed(GenerationError),
}

/// Line-buffering SSE decoder.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            events.extend(parse_sse_line(line.trim_end()));
        }
        events
    }

    /// Parses whatever is left in the buffer as a final, unterminated line.
    fn finish(&mut self) -> Vec<SseEvent> {
        let line: Vec<u8> = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&line);
        parse_sse_line(line.trim_end())
    }
}

fn parse_sse_line(line: &str) -> Vec<SseEvent> {
    let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
        return Vec::new();
    };
    if data.is_empty() {
        return Vec::new();
    }
    if data == "[DONE]" {
        return vec![SseEvent::Done];
    }

    let chunk = match serde_json::from_str::<StreamResponseChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return vec![SseEvent::Failed(GenerationError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))]
        }
    };

    if let Some(error) = chunk.error {
        return vec![SseEvent::Failed(GenerationError::unavailable(error.message))];
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Vec::new();
    };
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return vec![SseEvent::Failed(GenerationError::content_filtered(
            "completion stopped by content filter",
        ))];
    }

    let mut events: Vec<SseEvent> = choice
        .delta
        .content
        .filter(|content| !content.is_empty())
        .map(SseEvent::Fragment)
        .into_iter()
        .collect();
    if choice.finish_reason.is_some() {
        events.push(SseEvent::Finished);
    }
    events
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: String,
}
