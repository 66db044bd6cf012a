//! Headless reference surface.
//!
//! Implements the surface half of the protocol without rendering: chat log,
//! tab state machine, response mode, the explain-error affordance, and the
//! persisted-state snapshot. Terminal frontends and tests drive it directly.

use xeno_mentor_proto::{
	ChatMessage, ErrorFinding, FindingCode, InboundMessage, OutboundMessage, PersistedState, ResponseMode, Tab,
};

use crate::host::SurfacePort;

/// Full surface state, including the parts that are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
	/// Chat log in display order.
	pub messages: Vec<ChatMessage>,
	/// Selected tab.
	pub active_tab: Tab,
	/// Selected response mode.
	pub response_mode: ResponseMode,
	/// Whether the "explain error" affordance is shown.
	pub has_errors: bool,
}

impl SurfaceState {
	/// Snapshot of the state that survives a hide/show cycle.
	pub fn persist(&self) -> PersistedState {
		PersistedState {
			messages: self.messages.clone(),
			active_tab: self.active_tab,
			response_mode: self.response_mode,
		}
	}

	/// Rebuilds state from a snapshot. The affordance starts hidden until the
	/// controller pushes diagnostics again.
	pub fn restore(persisted: PersistedState) -> Self {
		Self {
			messages: persisted.messages,
			active_tab: persisted.active_tab,
			response_mode: persisted.response_mode,
			has_errors: false,
		}
	}
}

/// A surface with no rendering, driven through method calls.
pub struct HeadlessSurface {
	port: SurfacePort,
	state: SurfaceState,
	/// Chat log length at the last `hide`, while hidden.
	hidden_at: Option<usize>,
}

impl HeadlessSurface {
	/// Creates an empty surface on `port`.
	pub fn new(port: SurfacePort) -> Self {
		Self::restore(port, PersistedState::default())
	}

	/// Creates a surface on `port` from a persisted snapshot.
	pub fn restore(port: SurfacePort, persisted: PersistedState) -> Self {
		Self {
			port,
			state: SurfaceState::restore(persisted),
			hidden_at: None,
		}
	}

	/// Reports initial render complete.
	pub fn mark_ready(&self) {
		self.port.mark_ready();
	}

	/// Current state.
	pub fn state(&self) -> &SurfaceState {
		&self.state
	}

	/// Snapshot for a hide/show cycle.
	pub fn persist(&self) -> PersistedState {
		self.state.persist()
	}

	/// Replaces local state with a snapshot, keeping the affordance flag.
	pub fn restore_state(&mut self, persisted: PersistedState) {
		let has_errors = self.state.has_errors;
		self.state = SurfaceState::restore(persisted);
		self.state.has_errors = has_errors;
	}

	/// Whether the surface is currently shown.
	pub fn is_visible(&self) -> bool {
		self.hidden_at.is_none()
	}

	/// Hides the surface and returns the snapshot to restore on [`Self::show`].
	///
	/// Messages keep arriving while hidden.
	pub fn hide(&mut self) -> PersistedState {
		if self.hidden_at.is_none() {
			self.hidden_at = Some(self.state.messages.len());
		}
		self.persist()
	}

	/// Shows the surface, restoring `snapshot` when one was kept.
	///
	/// Chat entries delivered while hidden are appended after the restored log.
	pub fn show(&mut self, snapshot: Option<PersistedState>) {
		let Some(hidden_at) = self.hidden_at.take() else {
			return;
		};
		let Some(snapshot) = snapshot else {
			return;
		};
		let arrived = self.state.messages.split_off(hidden_at.min(self.state.messages.len()));
		self.restore_state(snapshot);
		self.state.messages.extend(arrived);
	}

	/// True once the controller side has closed the channel.
	pub fn is_closed(&self) -> bool {
		self.port.closer().is_closed()
	}

	/// User submitted `text`: log it and forward it to the controller.
	///
	/// Blank input is ignored.
	pub fn submit(&mut self, text: &str) -> bool {
		let text = text.trim();
		if text.is_empty() {
			return false;
		}
		self.state.messages.push(ChatMessage::user(text));
		self.port.outlet().send(&InboundMessage::SendMessage { text: text.to_string() })
	}

	/// User selected `tab`.
	///
	/// Only a user-initiated switch to the journal notifies the controller.
	pub fn select_tab(&mut self, tab: Tab) -> bool {
		if self.state.active_tab == tab {
			return false;
		}
		self.state.active_tab = tab;
		if tab == Tab::Journal {
			self.port.outlet().send(&InboundMessage::OpenLearningJournal);
		}
		true
	}

	/// User picked a response mode.
	pub fn set_response_mode(&mut self, mode: ResponseMode) -> bool {
		if self.state.response_mode == mode {
			return false;
		}
		self.state.response_mode = mode;
		self.port.outlet().send(&InboundMessage::ToggleMode { mode });
		true
	}

	/// Applies a controller message to local state.
	///
	/// Never sends anything back, so message-driven transitions cannot echo.
	pub fn apply(&mut self, message: &OutboundMessage) {
		match message {
			OutboundMessage::ReceiveMessage { message } => self.state.messages.push(message.clone()),
			OutboundMessage::UpdateDiagnostics { has_errors } => self.state.has_errors = *has_errors,
			OutboundMessage::ExplainError { error } => {
				self.state.messages.push(ChatMessage::assistant(explanation_text(error)));
			}
			OutboundMessage::ShowLearningJournal => self.state.active_tab = Tab::Journal,
		}
	}

	/// Waits for the next controller message, applies it, and returns it.
	///
	/// Returns `None` once the controller has closed the channel.
	pub async fn next_message(&mut self) -> Option<OutboundMessage> {
		let message = self.port.inlet_mut().recv().await?;
		self.apply(&message);
		Some(message)
	}

	/// Applies and returns every already-queued controller message.
	pub fn drain(&mut self) -> Vec<OutboundMessage> {
		let mut applied = Vec::new();
		while let Some(message) = self.port.inlet_mut().try_recv() {
			self.apply(&message);
			applied.push(message);
		}
		applied
	}

	/// Closes the surface, as when the user dismisses it.
	pub fn close(self) {
		self.port.close();
	}
}

/// Chat entry synthesized for an `explainError` message.
pub fn explanation_text(error: &ErrorFinding) -> String {
	let code = match &error.code {
		Some(FindingCode::Number(n)) => format!(" [{n}]"),
		Some(FindingCode::Text(s)) => format!(" [{s}]"),
		None => String::new(),
	};
	let mut text = format!(
		"Let's look at the error on line {}, column {}{code}: {}",
		error.line, error.column, error.message
	);
	if !error.source_text.is_empty() {
		text.push_str(&format!("\nThe code involved is `{}`.", error.source_text));
	}
	text.push_str("\nWhat do you think the analyzer expected to find here?");
	text
}
