//! Reply service contract and the stub implementation.

use std::time::Duration;

use async_trait::async_trait;
use xeno_mentor_proto::ChatMessage;

use crate::config::ReplyConfig;
use crate::error::{MentorError, Result};

/// Produces assistant replies to user text.
///
/// No retries and no cancellation: once called, a reply either arrives or the
/// caller's timeout fires.
#[async_trait]
pub trait ReplyService: Send + Sync + 'static {
	/// Returns an assistant message answering `text`.
	async fn reply(&self, text: &str) -> Result<ChatMessage>;
}

/// Canned replies after a fixed delay. Never fails.
#[derive(Debug, Clone)]
pub struct StubReplyService {
	delay: Duration,
}

impl StubReplyService {
	/// Creates a stub that answers after `delay`.
	pub fn new(delay: Duration) -> Self {
		Self { delay }
	}

	/// Creates a stub using the configured delay.
	pub fn from_config(config: &ReplyConfig) -> Self {
		Self::new(config.delay())
	}
}

#[async_trait]
impl ReplyService for StubReplyService {
	async fn reply(&self, text: &str) -> Result<ChatMessage> {
		tokio::time::sleep(self.delay).await;
		Ok(ChatMessage::assistant(format!(
			"Good question: \"{text}\". Before I answer, what do you already know about it, and where does your understanding stop?"
		)))
	}
}

/// Calls `service` bounded by `timeout`.
///
/// Failures and timeouts become an assistant message describing the problem,
/// so the caller always has exactly one entry to deliver.
pub async fn reply_or_failure(service: &dyn ReplyService, text: &str, timeout: Duration) -> ChatMessage {
	let err = match tokio::time::timeout(timeout, service.reply(text)).await {
		Ok(Ok(mut message)) => {
			message.is_user = false;
			return message;
		}
		Ok(Err(err)) => err,
		Err(_) => MentorError::ReplyTimeout(timeout),
	};
	tracing::warn!(error = %err, "mentor.reply.failed");
	ChatMessage::assistant(format!("Sorry, I couldn't answer that ({err}). Please try again."))
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Failing;

	#[async_trait]
	impl ReplyService for Failing {
		async fn reply(&self, _text: &str) -> Result<ChatMessage> {
			Err(MentorError::ReplyFailed("backend unavailable".into()))
		}
	}

	struct Echoing;

	#[async_trait]
	impl ReplyService for Echoing {
		async fn reply(&self, text: &str) -> Result<ChatMessage> {
			Ok(ChatMessage::user(text))
		}
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn stub_waits_then_quotes_input() {
		let stub = StubReplyService::new(Duration::from_secs(1));
		let start = tokio::time::Instant::now();
		let message = stub.reply("what is a closure").await.unwrap();
		assert!(start.elapsed() >= Duration::from_secs(1));
		assert!(message.text.contains("what is a closure"));
		assert!(!message.is_user);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn timeout_becomes_failure_message() {
		let stub = StubReplyService::new(Duration::from_secs(30));
		let message = reply_or_failure(&stub, "hi", Duration::from_secs(5)).await;
		assert!(!message.is_user);
		assert!(message.text.contains("timed out"), "got: {}", message.text);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn service_error_becomes_failure_message() {
		let message = reply_or_failure(&Failing, "hi", Duration::from_secs(5)).await;
		assert!(!message.is_user);
		assert!(message.text.contains("backend unavailable"), "got: {}", message.text);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn replies_are_always_assistant_authored() {
		let message = reply_or_failure(&Echoing, "hi", Duration::from_secs(5)).await;
		assert!(!message.is_user);
		assert_eq!(message.text, "hi");
	}
}
