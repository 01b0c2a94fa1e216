use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::config::{env_vars, ClientConfig};
use crate::error::{classify_response, ErrorKind, Result, VisionError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One part of a multimodal user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl Message {
    // Example format:
    // {
    //   "role": "user",
    //   "content": [
    //     {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,..."}},
    //     {"type": "text", "text": "What's in this image?"}
    //   ]
    // }
    pub fn user_with_image(data_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url.into(),
                    },
                },
                ContentPart::Text { text: text.into() },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_id: String,
}

impl ChatRequest {
    /// Copy of the request with inline image payloads replaced by their size, for logging.
    fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for message in &mut copy.messages {
            for part in &mut message.content {
                if let ContentPart::ImageUrl { image_url } = part {
                    image_url.url = format!("<data url, {} bytes>", image_url.url.len());
                }
            }
        }
        copy
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderError {
    #[serde(deserialize_with = "deserialize_code")]
    pub code: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderResponse {
    pub id: String,
    pub created: Option<i64>,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub error: Option<ProviderError>,
}

impl ProviderResponse {
    pub fn first_content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("")
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

// The provider sends `code` as a number on some endpoints and as a numeric string on others.
fn deserialize_code<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Why a single attempt failed, and whether the pipeline may try again.
#[derive(Debug)]
enum AttemptFailure {
    Transport(VisionError),
    RateLimited(VisionError),
    Terminal(VisionError),
}

fn transport_failure(err: reqwest::Error) -> AttemptFailure {
    let vision_err = VisionError::connection(err.to_string());
    if err.is_connect() || err.is_timeout() {
        AttemptFailure::Transport(vision_err)
    } else {
        AttemptFailure::Terminal(vision_err)
    }
}

/// HTTP client for the Z.ai chat completions endpoint with bounded retries.
pub struct ZaiClient {
    client: Client,
    config: ClientConfig,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ZaiClient {
    /// Build a client. Fails with an authentication error when the API key is empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(VisionError::authentication(format!(
                "{} is not set",
                env_vars::API_KEY
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| VisionError::connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            policy: RetryPolicy::with_max_retries(config.max_retries),
            config,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    pub fn build_request(
        &self,
        model: Option<&str>,
        message: Message,
        max_tokens: u32,
        temperature: f32,
    ) -> ChatRequest {
        ChatRequest {
            model: model.unwrap_or(&self.config.model_name).to_string(),
            messages: vec![message],
            max_tokens,
            temperature,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Send a request, retrying rate limits and transport failures per the retry policy.
    pub async fn create_chat_completion(&self, request: &ChatRequest) -> Result<ProviderResponse> {
        let mut attempt: u32 = 0;

        loop {
            let failure = match self.send_once(request).await {
                Ok(response) => {
                    tracing::debug!(
                        request_id = %request.request_id,
                        attempts = attempt + 1,
                        "Chat completion succeeded"
                    );
                    return Ok(response);
                }
                Err(failure) => failure,
            };

            let (err, delay) = match failure {
                AttemptFailure::Terminal(err) => {
                    tracing::error!(request_id = %request.request_id, error = %err, "Request failed");
                    return Err(err);
                }
                AttemptFailure::RateLimited(err) => (err, self.policy.rate_limit_backoff),
                AttemptFailure::Transport(err) => (err, self.policy.connection_backoff(attempt)),
            };

            if !self.policy.can_retry(attempt) {
                tracing::error!(
                    request_id = %request.request_id,
                    attempts = attempt + 1,
                    error = %err,
                    "Giving up after retries"
                );
                return Err(err);
            }

            tracing::warn!(
                request_id = %request.request_id,
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        request: &ChatRequest,
    ) -> std::result::Result<ProviderResponse, AttemptFailure> {
        if self.config.debug {
            let body = serde_json::to_string(&request.redacted()).unwrap_or_default();
            tracing::debug!(request_id = %request.request_id, body = %body, "Request body");
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;

        if self.config.debug {
            tracing::debug!(
                request_id = %request.request_id,
                status = status.as_u16(),
                body = %body,
                "Response body"
            );
        }

        let parsed = serde_json::from_str::<ProviderResponse>(&body).ok();
        let body_error = parsed.as_ref().and_then(|r| r.error.clone());

        if !status.is_success() || body_error.is_some() {
            let (code, message) = match body_error {
                Some(e) if !e.message.is_empty() => (e.code, e.message),
                Some(e) => (e.code, status_message(status, &body)),
                None => (None, status_message(status, &body)),
            };
            let err = classify_response(status, code, &message);
            return Err(match err.kind() {
                ErrorKind::RateLimit => AttemptFailure::RateLimited(err),
                _ => AttemptFailure::Terminal(err),
            });
        }

        let response = parsed.ok_or_else(|| {
            AttemptFailure::Terminal(VisionError::Processing {
                message: "malformed response body".to_string(),
                details: Some(body.chars().take(200).collect()),
                code: None,
            })
        })?;

        if response.choices.is_empty() {
            return Err(AttemptFailure::Terminal(VisionError::processing(
                "response contained no choices",
            )));
        }

        Ok(response)
    }
}

fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}
