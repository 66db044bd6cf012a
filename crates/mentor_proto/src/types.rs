//! Wire types for the mentor panel message channel.
//!
//! Field names follow the surface's JSON conventions (`camelCase`), and both
//! message enums are internally tagged by `command`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::codec::Message;

/// One entry in the surface's chat log.
///
/// The log is append-only; insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
	/// Message body.
	pub text: String,
	/// True when the user typed this entry.
	pub is_user: bool,
	/// ISO-8601 creation time (UTC, millisecond precision).
	pub timestamp: String,
}

impl ChatMessage {
	/// Creates a user-authored entry stamped with the current time.
	pub fn user(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			is_user: true,
			timestamp: now_iso8601(),
		}
	}

	/// Creates an assistant-authored entry stamped with the current time.
	pub fn assistant(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			is_user: false,
			timestamp: now_iso8601(),
		}
	}
}

fn now_iso8601() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Diagnostic code as reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FindingCode {
	/// Numeric code (e.g. `2304`).
	Number(i64),
	/// Textual code (e.g. `"E0382"`).
	Text(String),
}

/// A single analysis finding, positioned for humans.
///
/// Line and column are 1-based. Findings are derived on demand from the host's
/// 0-based diagnostics and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFinding {
	/// Analyzer message.
	pub message: String,
	/// Analyzer code, serialized as `null` when absent.
	pub code: Option<FindingCode>,
	/// 1-based line.
	pub line: u32,
	/// 1-based column.
	pub column: u32,
	/// Document text covered by the finding's range.
	pub source_text: String,
}

impl ErrorFinding {
	/// Builds a finding from a 0-based host position.
	pub fn from_zero_based(
		message: impl Into<String>,
		code: Option<FindingCode>,
		line: u32,
		column: u32,
		source_text: impl Into<String>,
	) -> Self {
		Self {
			message: message.into(),
			code,
			line: line.saturating_add(1),
			column: column.saturating_add(1),
			source_text: source_text.into(),
		}
	}
}

/// Surface tab selection.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tab {
	/// Conversational view.
	#[default]
	Chat,
	/// Learning journal view.
	Journal,
}

/// How the assistant should shape its answers.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseMode {
	/// Plain prose answers.
	#[default]
	Text,
	/// Diagram-oriented answers.
	Visual,
}

/// Messages sent by the surface to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum InboundMessage {
	/// User submitted chat text.
	SendMessage {
		/// Raw user input.
		text: String,
	},
	/// User switched response mode.
	ToggleMode {
		/// Newly selected mode.
		mode: ResponseMode,
	},
	/// User opened the learning journal tab.
	OpenLearningJournal,
}

impl Message for InboundMessage {
	const COMMANDS: &'static [&'static str] = &["sendMessage", "toggleMode", "openLearningJournal"];

	fn command(&self) -> &'static str {
		match self {
			Self::SendMessage { .. } => "sendMessage",
			Self::ToggleMode { .. } => "toggleMode",
			Self::OpenLearningJournal => "openLearningJournal",
		}
	}
}

/// Messages sent by the controller to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
	/// Append an entry to the chat log.
	ReceiveMessage {
		/// Entry to append.
		message: ChatMessage,
	},
	/// Show or hide the "explain error" affordance.
	UpdateDiagnostics {
		/// Whether the active document has at least one finding.
		has_errors: bool,
	},
	/// Append a synthesized explanation of a finding.
	ExplainError {
		/// Finding to explain.
		error: ErrorFinding,
	},
	/// Switch to the journal tab without notifying the controller.
	ShowLearningJournal,
}

impl Message for OutboundMessage {
	const COMMANDS: &'static [&'static str] = &[
		"receiveMessage",
		"updateDiagnostics",
		"explainError",
		"showLearningJournal",
	];

	fn command(&self) -> &'static str {
		match self {
			Self::ReceiveMessage { .. } => "receiveMessage",
			Self::UpdateDiagnostics { .. } => "updateDiagnostics",
			Self::ExplainError { .. } => "explainError",
			Self::ShowLearningJournal => "showLearningJournal",
		}
	}
}

/// Surface-local state that survives a hide/show cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
	/// Chat log in display order.
	pub messages: Vec<ChatMessage>,
	/// Selected tab.
	pub active_tab: Tab,
	/// Selected response mode.
	pub response_mode: ResponseMode,
}
