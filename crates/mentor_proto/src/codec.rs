//! JSON framing for channel messages.
//!
//! Decoding is discriminator-aware: a frame whose `command` is not part of the
//! receiving side's taxonomy decodes to `Ok(None)` so callers can ignore it,
//! while a known command with a bad payload is a hard [`CodecError::Malformed`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// A message type that travels over one direction of the channel.
pub trait Message: Serialize + DeserializeOwned + Send + 'static {
	/// Every `command` value this type can decode.
	const COMMANDS: &'static [&'static str];

	/// Discriminator of this message.
	fn command(&self) -> &'static str;
}

/// Errors produced while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
	/// Frame is not valid JSON, or could not be serialized.
	#[error("invalid JSON frame: {0}")]
	Json(#[from] serde_json::Error),

	/// Frame has no string `command` field.
	#[error("frame has no `command` discriminator")]
	MissingCommand,

	/// Known command with a payload that does not match its schema.
	#[error("malformed `{command}` payload: {source}")]
	Malformed {
		/// Discriminator of the rejected frame.
		command: String,
		/// Underlying deserialization error.
		source: serde_json::Error,
	},
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Serializes a message into a single JSON frame.
pub fn encode<M: Message>(message: &M) -> Result<String> {
	Ok(serde_json::to_string(message)?)
}

/// Parses a frame, returning `Ok(None)` for commands outside `M`'s taxonomy.
pub fn decode<M: Message>(raw: &str) -> Result<Option<M>> {
	let value: Value = serde_json::from_str(raw)?;
	let Some(command) = value.get("command").and_then(Value::as_str) else {
		return Err(CodecError::MissingCommand);
	};
	if !M::COMMANDS.contains(&command) {
		return Ok(None);
	}
	let command = command.to_owned();
	serde_json::from_value(value)
		.map(Some)
		.map_err(|source| CodecError::Malformed { command, source })
}
