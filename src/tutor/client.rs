//! Generative-language API client.
//!
//! # Responsibilities
//! - Build one `generateContent` request per question
//! - Extract the first candidate's text
//! - Convert every failure into the fallback reply
//!
//! # Design Decisions
//! - Single attempt, no retries: the learner can simply ask again
//! - Raw error detail is logged, never returned to the caller

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::TutorConfig;
use crate::observability::metrics;

pub const FALLBACK_REPLY: &str = "Sorry, I am having trouble connecting to my brain right now.";
pub const EMPTY_REPLY: &str = "I couldn't generate an answer. Try rephrasing!";
pub const GREETING: &str =
    "Hi! I am your API Gateway Tutor. Ask me anything about rate limiting, auth, or gateway architecture!";

/// The remote call failed.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("tutor is disabled")]
    Disabled,

    #[error("no API key in environment variable {0}")]
    MissingApiKey(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Model,
    Empty,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorReply {
    pub text: String,
    pub source: ReplySource,
}

impl TutorReply {
    fn fallback() -> Self {
        Self {
            text: FALLBACK_REPLY.to_string(),
            source: ReplySource::Fallback,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone)]
pub struct TutorClient {
    http: reqwest::Client,
    url: Url,
    api_key: Option<String>,
    api_key_env: String,
    system_instruction: String,
    enabled: bool,
}

impl TutorClient {
    /// Build a client with an explicit API key.
    pub fn new(config: &TutorConfig, api_key: Option<String>) -> Result<Self, TutorError> {
        let url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        ))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url,
            api_key,
            api_key_env: config.api_key_env.clone(),
            system_instruction: config.system_instruction.clone(),
            enabled: config.enabled,
        })
    }

    /// Build a client reading the API key from the configured environment variable.
    pub fn from_env(config: &TutorConfig) -> Result<Self, TutorError> {
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() && config.enabled {
            tracing::warn!(var = %config.api_key_env, "Tutor API key not set; replies will use the fallback");
        }
        Self::new(config, api_key)
    }

    /// Ask one question. Never fails: errors become the fallback reply.
    pub async fn ask(&self, question: &str) -> TutorReply {
        match self.generate(question).await {
            Ok(Some(text)) => {
                metrics::record_tutor_request("ok");
                TutorReply {
                    text,
                    source: ReplySource::Model,
                }
            }
            Ok(None) => {
                metrics::record_tutor_request("empty");
                TutorReply {
                    text: EMPTY_REPLY.to_string(),
                    source: ReplySource::Empty,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Tutor request failed");
                metrics::record_tutor_request("error");
                TutorReply::fallback()
            }
        }
    }

    async fn generate(&self, question: &str) -> Result<Option<String>, TutorError> {
        if !self.enabled {
            return Err(TutorError::Disabled);
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TutorError::MissingApiKey(self.api_key_env.clone()))?;

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part { text: &self.system_instruction }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: question }],
            }],
        };

        let response = self
            .http
            .post(self.url.clone())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TutorError::Status(status));
        }

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.text())
    }
}
