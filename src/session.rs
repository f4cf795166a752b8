//! The chat session controller.
//!
//! `ChatSession` owns the transcript, the draft prompt and the in-flight flag.
//! It never performs I/O itself: `submit` hands back a [`PendingPrompt`] that the
//! caller dispatches, and the outcome is fed back through [`ChatSession::complete`]
//! or [`ChatSession::fail`]. At most one prompt is outstanding at any time.

use crate::api::BackendClient;
use crate::errors::{ChatError, ChatResult};
use crate::models::{JudgeResponse, Message, PromptResponse};

/// A prompt accepted by the session and waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    payload: String,
}

impl PendingPrompt {
    /// The trimmed text that goes on the wire.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Last request failure, kept so the user can retry it.
#[derive(Debug)]
pub struct FailedPrompt {
    pub payload: String,
    pub error: ChatError,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    prompt: String,
    waiting: bool,
    in_flight: Option<String>,
    failed: Option<FailedPrompt>,
    revision: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
    }

    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Bumped on every change to the message list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.failed.as_ref().map(|f| &f.error)
    }

    pub fn can_retry(&self) -> bool {
        !self.waiting
            && self
                .failed
                .as_ref()
                .is_some_and(|f| f.error.is_retryable())
    }

    /// Most recent recipient message carrying a verdict.
    pub fn last_judged(&self) -> Option<&JudgeResponse> {
        self.messages.iter().rev().find_map(|m| m.judge_data())
    }

    /// Submits the current draft.
    pub fn submit(&mut self) -> Option<PendingPrompt> {
        let text = self.prompt.clone();
        self.submit_text(&text)
    }

    /// Accepts `text` as the next prompt. Returns `None` for blank text or while
    /// a request is outstanding; otherwise the raw text joins the transcript and
    /// the trimmed text is returned for dispatch.
    pub fn submit_text(&mut self, text: &str) -> Option<PendingPrompt> {
        if self.waiting {
            log::debug!("Ignoring submit while a request is outstanding");
            return None;
        }
        let payload = text.trim();
        if payload.is_empty() {
            return None;
        }

        self.push(Message::user(text));
        self.prompt.clear();
        self.failed = None;
        Some(self.begin(payload.to_string()))
    }

    /// Resends the last failed prompt without adding another user message.
    pub fn retry(&mut self) -> Option<PendingPrompt> {
        if !self.can_retry() {
            return None;
        }
        let failed = self.failed.take()?;
        log::info!("Retrying prompt after: {}", failed.error);
        Some(self.begin(failed.payload))
    }

    pub fn complete(&mut self, response: PromptResponse) {
        if self.in_flight.take().is_none() {
            log::warn!("Dropping response with no outstanding request");
            return;
        }
        self.push(Message::recipient(response.message, response.judge_data));
        self.waiting = false;
    }

    pub fn fail(&mut self, error: ChatError) {
        let Some(payload) = self.in_flight.take() else {
            log::warn!("Dropping failure with no outstanding request: {}", error);
            return;
        };
        log::error!("Prompt failed: {}", error);
        self.failed = Some(FailedPrompt { payload, error });
        self.waiting = false;
    }

    /// Applies the outcome of a dispatched prompt.
    pub fn resolve(&mut self, outcome: ChatResult<PromptResponse>) {
        match outcome {
            Ok(response) => self.complete(response),
            Err(error) => self.fail(error),
        }
    }

    fn begin(&mut self, payload: String) -> PendingPrompt {
        self.waiting = true;
        self.in_flight = Some(payload.clone());
        PendingPrompt { payload }
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }
}

/// Sends one pending prompt to the backend.
pub async fn dispatch(
    client: &BackendClient,
    pending: PendingPrompt,
) -> ChatResult<PromptResponse> {
    client.send_prompt(pending.payload()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    fn reply(text: &str) -> PromptResponse {
        PromptResponse {
            message: text.to_string(),
            judge_data: None,
        }
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut session = ChatSession::new();
        session.set_prompt("   \n\t ");
        assert!(session.submit().is_none());
        assert!(session.messages().is_empty());
        assert!(!session.is_waiting());
        assert_eq!(session.revision(), 0);
        assert_eq!(session.prompt(), "   \n\t ");
    }

    #[test]
    fn test_submit_appends_raw_text_and_sends_trimmed() {
        let mut session = ChatSession::new();
        session.set_prompt("  hello  ");
        let pending = session.submit().unwrap();

        assert_eq!(pending.payload(), "hello");
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text(), "  hello  ");
        assert_eq!(session.messages()[0].sender(), Sender::User);
        assert_eq!(session.prompt(), "");
        assert!(session.is_waiting());
    }

    #[test]
    fn test_complete_appends_recipient_message() {
        let mut session = ChatSession::new();
        session.submit_text("hello").unwrap();
        session.complete(reply("world"));

        let texts: Vec<_> = session.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["hello", "world"]);
        assert_eq!(session.messages()[1].sender(), Sender::Recipient);
        assert!(!session.is_waiting());
        assert_eq!(session.revision(), 2);
    }

    #[test]
    fn test_submit_while_waiting_is_ignored() {
        let mut session = ChatSession::new();
        session.submit_text("first").unwrap();
        session.set_prompt("second");

        assert!(session.submit().is_none());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.prompt(), "second");
    }

    #[test]
    fn test_judge_data_is_kept_verbatim() {
        let judge = JudgeResponse {
            verdict: "REJECTED".to_string(),
            score: 1.5,
            overall_feedback: "Off topic".to_string(),
            recommended_changes: "Answer the question".to_string(),
        };
        let mut session = ChatSession::new();
        session.submit_text("q").unwrap();
        session.complete(PromptResponse {
            message: "a".to_string(),
            judge_data: Some(judge.clone()),
        });

        assert_eq!(session.messages()[1].judge_data(), Some(&judge));
        assert_eq!(session.last_judged(), Some(&judge));
    }

    #[test]
    fn test_order_is_preserved_across_cycles() {
        let mut session = ChatSession::new();
        for i in 0..5 {
            session.submit_text(&format!("q{}", i)).unwrap();
            session.complete(reply(&format!("a{}", i)));
        }

        let texts: Vec<_> = session.messages().iter().map(|m| m.text()).collect();
        assert_eq!(
            texts,
            vec!["q0", "a0", "q1", "a1", "q2", "a2", "q3", "a3", "q4", "a4"]
        );
    }

    #[test]
    fn test_failure_resets_waiting_and_allows_retry() {
        let mut session = ChatSession::new();
        session.submit_text(" hello ").unwrap();
        session.fail(ChatError::request_failed("connection refused"));

        assert!(!session.is_waiting());
        assert_eq!(session.messages().len(), 1);
        assert!(session.last_error().is_some());
        assert!(session.can_retry());

        let pending = session.retry().unwrap();
        assert_eq!(pending.payload(), "hello");
        assert!(session.is_waiting());
        assert!(session.last_error().is_none());
        assert_eq!(session.messages().len(), 1);

        session.complete(reply("world"));
        let texts: Vec<_> = session.messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec![" hello ", "world"]);
    }

    #[test]
    fn test_retry_without_failure_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.retry().is_none());
        session.submit_text("hello").unwrap();
        assert!(session.retry().is_none());
    }

    #[test]
    fn test_new_submit_discards_failed_prompt() {
        let mut session = ChatSession::new();
        session.submit_text("one").unwrap();
        session.fail(ChatError::Api {
            status: 503,
            body: String::new(),
        });
        session.submit_text("two").unwrap();
        assert!(session.last_error().is_none());
        session.complete(reply("ok"));
        assert!(session.retry().is_none());
    }

    #[test]
    fn test_stray_outcomes_are_dropped() {
        let mut session = ChatSession::new();
        session.complete(reply("unexpected"));
        session.fail(ChatError::request_failed("late"));
        assert!(session.messages().is_empty());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_resolve_routes_outcomes() {
        let mut session = ChatSession::new();
        session.submit_text("a").unwrap();
        session.resolve(Err(ChatError::malformed("eof")));
        assert!(session.can_retry());

        session.retry().unwrap();
        session.resolve(Ok(reply("b")));
        assert_eq!(session.messages().len(), 2);
    }
}
