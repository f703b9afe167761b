//! Generation backends.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LlmError, LlmResult};

/// Structured JSON generation.
pub trait LlmClient: Send + Sync {
    /// Send a prompt with an output schema and return the raw JSON text.
    fn generate_json(&self, prompt: &str, schema: &Value) -> LlmResult<String>;
}

impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    fn generate_json(&self, prompt: &str, schema: &Value) -> LlmResult<String> {
        (**self).generate_json(prompt, schema)
    }
}

/// Default public endpoint for the Gemini REST API.
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> LlmResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl LlmClient for GeminiClient {
    fn generate_json(&self, prompt: &str, schema: &Value) -> LlmResult<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        tracing::debug!(model = %self.model, "Sending structured generation request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        parsed.into_text().ok_or(LlmError::EmptyResponse)
    }
}

/// Canned reply for [`MockLlmClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

impl MockReply {
    fn to_result(&self) -> LlmResult<String> {
        match self {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail(reason) => Err(LlmError::Http(reason.clone())),
        }
    }
}

/// Scripted client for tests and offline use.
///
/// Replies are chosen by the first rule whose needle appears in the prompt,
/// then by the queue of one-shot replies, then by the default reply.
pub struct MockLlmClient {
    default: MockReply,
    rules: Vec<(String, MockReply)>,
    queued: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// Always reply with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            default: MockReply::Text(response.to_string()),
            rules: Vec::new(),
            queued: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail as if the service were down.
    pub fn failing(reason: &str) -> Self {
        Self {
            default: MockReply::Fail(reason.to_string()),
            ..Self::new("")
        }
    }

    /// Reply with `reply` whenever the prompt contains `needle`.
    pub fn with_rule(mut self, needle: &str, reply: MockReply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    /// Queue a one-shot reply used before the default.
    pub fn with_queued(self, reply: MockReply) -> Self {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl LlmClient for MockLlmClient {
    fn generate_json(&self, prompt: &str, _schema: &Value) -> LlmResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        if let Some((_, reply)) = self.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            return reply.to_result();
        }

        let queued = self
            .queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match queued {
            Some(reply) => reply.to_result(),
            None => self.default.to_result(),
        }
    }
}
