use crate::{
    config::Config,
    constants::USER_AGENT,
    errors::{ChatError, ChatResult},
    logging::log_api_call,
    models::{ApiCallLog, PromptRequest, PromptResponse},
};
use chrono::Utc;
use reqwest::{Client, Url};
use std::time::{Duration, Instant};

const SUMMARY_CHARS: usize = 60;

/// HTTP client for the chat backend.
///
/// The underlying client keeps a cookie store, so session cookies set by the
/// backend are sent with every later prompt.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    prompt_url: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> ChatResult<Self> {
        let mut builder = Client::builder().cookie_store(true).user_agent(USER_AGENT);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http = builder
            .build()
            .map_err(|e| ChatError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            prompt_url: config.prompt_url()?,
        })
    }

    pub fn prompt_url(&self) -> &Url {
        &self.prompt_url
    }

    /// Posts one prompt and decodes the answer.
    pub async fn send_prompt(&self, message: &str) -> ChatResult<PromptResponse> {
        let payload = PromptRequest {
            message: message.to_string(),
        };
        let start_time = Instant::now();

        let response = self
            .http
            .post(self.prompt_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("Request to {} failed: {}", self.prompt_url, e);
                ChatError::from(e)
            })?;

        let status = response.status();
        log_api_call(&ApiCallLog {
            timestamp: Utc::now(),
            endpoint: self.prompt_url.to_string(),
            request_summary: summarize(message),
            response_status: status.as_u16(),
            response_time_ms: start_time.elapsed().as_millis(),
        });

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Backend returned {}: {}", status, body);
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: PromptResponse = serde_json::from_slice(&body).map_err(|e| {
            log::warn!("Malformed backend response: {}", e);
            ChatError::malformed(format!("{} in {}", e, String::from_utf8_lossy(&body)))
        })?;

        log::debug!(
            "Received {} chars{}",
            parsed.message.len(),
            if parsed.judge_data.is_some() {
                " with judge data"
            } else {
                ""
            }
        );
        Ok(parsed)
    }
}

fn summarize(message: &str) -> String {
    let mut summary: String = message.chars().take(SUMMARY_CHARS).collect();
    if message.chars().count() > SUMMARY_CHARS {
        summary.push_str("...");
    }
    format!("prompt \"{}\"", summary)
}
