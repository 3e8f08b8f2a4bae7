use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Shown in place of an answer whenever the payload shape is not understood
pub const FALLBACK_ANSWER: &str = "Invalid response format from server";

/// Substituted when a failed response's body cannot be read
const NO_ERROR_BODY: &str = "No error body";

#[derive(Serialize)]
struct RecommendRequest<'a> {
    text: &'a str,
}

/// Everything that can go wrong between sending a query and having an answer.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("API error {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request ended without a response")]
    Aborted,
}

/// The answer part of a response, by the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// `{ "response": "..." }`
    Field(String),
    /// The whole payload was a JSON string
    Bare(String),
    Unrecognized,
}

impl Answer {
    pub fn text(&self) -> &str {
        match self {
            Answer::Field(s) | Answer::Bare(s) => s,
            Answer::Unrecognized => FALLBACK_ANSWER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub answer: Answer,
    pub sources: Vec<String>,
    pub retrieved_count: Option<u64>,
}

impl Recommendation {
    /// Interpret any JSON payload. Never fails; unknown shapes degrade to
    /// `Answer::Unrecognized`.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let answer = match map.get("response") {
                    Some(Value::String(s)) => Answer::Field(s.clone()),
                    other => {
                        debug!(response = ?other, "response field missing or not a string");
                        Answer::Unrecognized
                    }
                };

                let sources = match map.get("sources") {
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                Self {
                    answer,
                    sources,
                    retrieved_count: map.get("retrieved_count").and_then(Value::as_u64),
                }
            }
            Value::String(s) => Self {
                answer: Answer::Bare(s),
                sources: Vec::new(),
                retrieved_count: None,
            },
            other => {
                debug!(payload = %other, "unrecognized payload shape");
                Self {
                    answer: Answer::Unrecognized,
                    sources: Vec::new(),
                    retrieved_count: None,
                }
            }
        }
    }
}

/// HTTP client for the recipe recommendation service
#[derive(Clone)]
pub struct RecommendClient {
    client: Client,
    endpoint: String,
}

impl RecommendClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Client that ignores proxy settings, for talking to a local mock service
    #[cfg(test)]
    pub fn direct(endpoint: &str) -> Self {
        Self {
            client: Client::builder().no_proxy().build().expect("build reqwest client"),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn recommend(&self, query: &str) -> Result<Recommendation, DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RecommendRequest { text: query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| NO_ERROR_BODY.to_string());
            return Err(DispatchError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        Ok(Recommendation::from_value(payload))
    }
}
