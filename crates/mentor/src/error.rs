//! Error types for the mentor panel.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use xeno_mentor_proto::CodecError;

/// Errors surfaced by the panel controller and its collaborators.
///
/// None of these cross the message channel: the protocol boundary only ever
/// drops or converts failures into chat entries.
#[derive(Debug, Error)]
pub enum MentorError {
	/// An operation needed a live surface and none exists.
	#[error("no mentor panel is open")]
	NoPanel,

	/// A frame could not be encoded or decoded.
	#[error(transparent)]
	Codec(#[from] CodecError),

	/// The reply service did not answer in time.
	#[error("reply service timed out after {0:?}")]
	ReplyTimeout(Duration),

	/// The reply service reported a failure.
	#[error("reply service failed: {0}")]
	ReplyFailed(String),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Config {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Configuration file is not valid TOML for [`crate::MentorConfig`].
	#[error("invalid mentor config: {0}")]
	ConfigParse(#[from] toml::de::Error),
}

/// Result type for mentor operations.
pub type Result<T> = std::result::Result<T, MentorError>;
