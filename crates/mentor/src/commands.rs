//! Host-invoked entry points.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::controller::{ExplainOutcome, ShowOutcome};

/// Actions the host can trigger, keyed by stable command ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum MentorAction {
	/// Create the panel, or focus it if it already exists.
	OpenMentor,
	/// Explain the first finding of the active document, opening the panel if needed.
	ExplainError,
}

impl MentorAction {
	/// Stable command id.
	pub fn id(self) -> &'static str {
		self.into()
	}
}

/// Result of [`crate::PanelController::run_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
	/// `open-mentor` finished.
	Shown(ShowOutcome),
	/// `explain-error` finished.
	Explained(ExplainOutcome),
}
