//! Mentor panel configuration.
//!
//! Configuration is read from `$XDG_CONFIG_HOME/xeno/mentor.toml` (or
//! `~/.config/xeno/mentor.toml`). Every field is optional:
//!
//! ```toml
//! [reply]
//! delay-ms = 1000
//! timeout-ms = 10000
//!
//! [panel]
//! title = "Code Mentor"
//! placement = "beside"
//!
//! [explain]
//! ready-timeout-ms = 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{MentorError, Result};
use crate::host::Placement;

/// Parsed mentor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MentorConfig {
	/// Reply service timing.
	pub reply: ReplyConfig,
	/// Panel presentation.
	pub panel: PanelConfig,
	/// `explain-error` action tuning.
	pub explain: ExplainConfig,
}

/// Reply service timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReplyConfig {
	/// Artificial delay of the stub reply service.
	pub delay_ms: u64,
	/// Upper bound on any reply service call.
	pub timeout_ms: u64,
}

impl Default for ReplyConfig {
	fn default() -> Self {
		Self {
			delay_ms: 1_000,
			timeout_ms: 10_000,
		}
	}
}

impl ReplyConfig {
	/// Stub reply delay.
	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}

	/// Reply timeout.
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

/// Panel presentation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PanelConfig {
	/// Surface title.
	pub title: String,
	/// Default placement for `open-mentor` and `reveal`.
	pub placement: Placement,
}

impl Default for PanelConfig {
	fn default() -> Self {
		Self {
			title: "Code Mentor".to_string(),
			placement: Placement::default(),
		}
	}
}

/// `explain-error` action tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ExplainConfig {
	/// How long to wait for a freshly created surface to report ready.
	pub ready_timeout_ms: u64,
}

impl Default for ExplainConfig {
	fn default() -> Self {
		Self { ready_timeout_ms: 2_000 }
	}
}

impl ExplainConfig {
	/// Ready-signal timeout.
	pub fn ready_timeout(&self) -> Duration {
		Duration::from_millis(self.ready_timeout_ms)
	}
}

impl MentorConfig {
	/// Parse a TOML string.
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|error| MentorError::Config {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&content)
	}

	/// Default config file location.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("xeno").join("mentor.toml"))
	}

	/// Loads `path` (or [`Self::default_path`]) and falls back to defaults when the file is absent.
	///
	/// A file that exists but fails to parse is still an error.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
			return Ok(Self::default());
		};
		if !path.exists() {
			tracing::debug!(path = %path.display(), "mentor config not found, using defaults");
			return Ok(Self::default());
		}
		Self::load(&path)
	}
}
