// src/models.rs

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Recipient,
}

/// Evaluation attached to a backend answer by its reviewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResponse {
    pub verdict: String,
    pub score: f64,
    pub overall_feedback: String,
    pub recommended_changes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Mid,
    High,
}

impl JudgeResponse {
    /// Parses judge output that may be wrapped in a ```json fence. Falls back to
    /// a neutral approval when the text is not a valid verdict.
    pub fn from_json(raw: &str) -> JudgeResponse {
        match Self::parse_fenced(raw) {
            Ok(judge) => judge,
            Err(e) => {
                log::warn!("Judge data could not be parsed ({}): {}", e, raw);
                Self::parse_failed()
            }
        }
    }

    /// Neutral approval used when the reviewer's output is unusable.
    pub fn parse_failed() -> JudgeResponse {
        JudgeResponse {
            verdict: "APPROVED".to_string(),
            score: 5.0,
            overall_feedback: "Judge response parsing failed".to_string(),
            recommended_changes: "None".to_string(),
        }
    }

    pub fn parse_fenced(raw: &str) -> Result<JudgeResponse, serde_json::Error> {
        let mut body = raw.trim();
        if let Some(rest) = body.strip_prefix("```json") {
            body = rest;
        }
        if let Some(rest) = body.strip_suffix("```") {
            body = rest;
        }
        serde_json::from_str(body.trim())
    }

    /// Score as shown to the user, e.g. `7/10` or `6.5/10`.
    pub fn score_label(&self) -> String {
        if self.score.fract() == 0.0 {
            format!("{:.0}/10", self.score)
        } else {
            format!("{:.1}/10", self.score)
        }
    }

    pub fn score_band(&self) -> ScoreBand {
        if self.score < 4.0 {
            ScoreBand::Low
        } else if self.score < 7.0 {
            ScoreBand::Mid
        } else {
            ScoreBand::High
        }
    }
}

/// A single entry in the session transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    text: String,
    sender: Sender,
    judge_data: Option<JudgeResponse>,
    sent_at: DateTime<Local>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            judge_data: None,
            sent_at: Local::now(),
        }
    }

    pub fn recipient(text: impl Into<String>, judge_data: Option<JudgeResponse>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Recipient,
            judge_data,
            sent_at: Local::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn judge_data(&self) -> Option<&JudgeResponse> {
        self.judge_data.as_ref()
    }

    pub fn sent_at(&self) -> DateTime<Local> {
        self.sent_at
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Body of `POST /prompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub message: String,
}

/// Body returned by `POST /prompt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptResponse {
    pub message: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_judge_data"
    )]
    pub judge_data: Option<JudgeResponse>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawJudgeData {
    Structured(JudgeResponse),
    Text(String),
    Other(serde_json::Value),
}

// Accepts the verdict as an object or as (possibly fenced) JSON text.
fn deserialize_judge_data<'de, D>(deserializer: D) -> Result<Option<JudgeResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<RawJudgeData>::deserialize(deserializer)?.map(|raw| match raw {
            RawJudgeData::Structured(judge) => judge,
            RawJudgeData::Text(text) => JudgeResponse::from_json(&text),
            RawJudgeData::Other(value) => {
                log::warn!("Judge data has an unexpected shape: {}", value);
                JudgeResponse::parse_failed()
            }
        }),
    )
}

/// One backend round trip, recorded for the log file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}
