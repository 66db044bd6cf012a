//! Panel controller: singleton lifecycle and message routing.
//!
//! # Purpose
//!
//! - Own the one permitted mentor surface and mediate every message to and from it.
//! - Translate host diagnostics changes into `updateDiagnostics` pushes and host actions into surface traffic.
//! - Exclude UI content: the controller never caches chat history, tab, or mode. The surface owns that state.
//!
//! # Mental model
//!
//! - [`PanelController`] holds an optional [`PanelSlot`] behind one mutex. `create_or_show` is a single check-and-set under that lock, so concurrent callers can never create two surfaces.
//! - Each created surface gets a fresh generation. A per-panel pump task reads inbound messages and diagnostics events for that generation only.
//! - Disposal takes the slot out under the lock first, then tears it down outside the lock: pump cancelled, channel closed, host view disposed, diagnostics listener dropped.
//! - Replies run as detached tasks bound to the outlet of the panel that asked. If that panel is gone, the send fails silently.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`PanelController`] | Cloneable controller handle | MUST be the only writer of the singleton slot | `PanelController::new` |
//! | [`PanelSlot`] | The live surface and its subscriptions | At most one exists; dropped exactly once | `PanelController::create_or_show`, `PanelController::dispose` |
//! | [`ShowOutcome`] | Whether `create_or_show` created or revealed | Carries the generation | `PanelController::create_or_show` |
//! | [`ExplainOutcome`] | Result of an explain attempt | Only `Sent` implies an outbound message | `PanelController::explain_current_error` |
//!
//! # Invariants
//!
//! 1. At most one surface exists; repeated `create_or_show` calls keep the same generation until disposal.
//!    - Enforced in: `PanelController::create_or_show`
//!    - Tested by: `tests/controller.rs::repeated_open_reuses_one_surface`
//! 2. Disposal is idempotent and releases the slot before subordinate subscriptions.
//!    - Enforced in: `PanelController::dispose`, `PanelSlot::drop`
//!    - Tested by: `tests/controller.rs::dispose_is_idempotent_and_releases_listener`, `tests/controller.rs::dispose_releases_slot_before_subscriptions`
//! 3. A surface close only disposes the panel of the matching generation.
//!    - Enforced in: `PanelController::dispose_generation`
//!    - Tested by: `tests/controller.rs::surface_close_disposes_panel`
//! 4. `openLearningJournal` yields exactly one `showLearningJournal` and nothing else.
//!    - Enforced in: `PanelController::handle_inbound`
//!    - Tested by: `tests/protocol.rs::journal_round_trip_has_no_echo`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use xeno_mentor_proto::{InboundMessage, Message, OutboundMessage};

use crate::channel::{self, ChannelCloser, Inlet, Outlet};
use crate::commands::{ActionOutcome, MentorAction};
use crate::config::MentorConfig;
use crate::diagnostics::{DiagnosticsAdapter, DiagnosticsEventReceiver, DiagnosticsListener};
use crate::error::{MentorError, Result};
use crate::host::{Host, Placement, SurfacePort, SurfaceSpec, SurfaceView};
use crate::reply::{self, ReplyService};
use crate::task::{self, TaskClass};

/// Result of [`PanelController::create_or_show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
	/// A new surface was created with this generation.
	Created(u64),
	/// The existing surface was brought to the foreground.
	Revealed(u64),
}

impl ShowOutcome {
	/// Generation of the surface that is now shown.
	pub fn generation(self) -> u64 {
		match self {
			Self::Created(generation) | Self::Revealed(generation) => generation,
		}
	}
}

/// Result of an explain attempt. Only [`ExplainOutcome::Sent`] sends a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainOutcome {
	/// An `explainError` message was sent.
	Sent,
	/// No document is focused.
	NoDocument,
	/// The active document has no findings.
	NoFindings,
	/// No surface exists to receive the explanation.
	NoPanel,
	/// The surface never reported ready (closed or timed out).
	NotReady,
}

struct PanelSlot {
	generation: u64,
	view: Box<dyn SurfaceView>,
	outlet: Outlet<OutboundMessage>,
	closer: ChannelCloser,
	ready: watch::Receiver<bool>,
	pump: CancellationToken,
	_listener: DiagnosticsListener,
}

impl Drop for PanelSlot {
	fn drop(&mut self) {
		self.pump.cancel();
		self.closer.close();
		self.view.dispose();
		tracing::debug!(generation = self.generation, "mentor.panel.disposed");
	}
}

struct ControllerInner {
	host: Arc<dyn Host>,
	diagnostics: DiagnosticsAdapter,
	replies: Arc<dyn ReplyService>,
	config: MentorConfig,
	current: Mutex<Option<PanelSlot>>,
	generations: AtomicU64,
}

/// Owner of the single mentor surface.
#[derive(Clone)]
pub struct PanelController {
	inner: Arc<ControllerInner>,
}

impl PanelController {
	/// Creates a controller with no surface.
	pub fn new(
		host: Arc<dyn Host>,
		diagnostics: DiagnosticsAdapter,
		replies: Arc<dyn ReplyService>,
		config: MentorConfig,
	) -> Self {
		Self {
			inner: Arc::new(ControllerInner {
				host,
				diagnostics,
				replies,
				config,
				current: Mutex::new(None),
				generations: AtomicU64::new(0),
			}),
		}
	}

	fn upgrade(inner: &Weak<ControllerInner>) -> Option<Self> {
		inner.upgrade().map(|inner| Self { inner })
	}

	/// Configuration in effect.
	pub fn config(&self) -> &MentorConfig {
		&self.inner.config
	}

	/// True while a surface exists.
	pub fn has_panel(&self) -> bool {
		self.inner.current.lock().is_some()
	}

	/// Generation of the live surface, if any.
	pub fn current_generation(&self) -> Option<u64> {
		self.inner.current.lock().as_ref().map(|slot| slot.generation)
	}

	/// Creates the surface, or reveals the existing one at `placement`.
	pub fn create_or_show(&self, placement: Placement) -> ShowOutcome {
		let generation = {
			let mut current = self.inner.current.lock();
			if let Some(slot) = current.as_mut() {
				slot.view.reveal(placement);
				tracing::debug!(generation = slot.generation, %placement, "mentor.panel.revealed");
				return ShowOutcome::Revealed(slot.generation);
			}

			let generation = self.inner.generations.fetch_add(1, Ordering::AcqRel) + 1;
			let (controller_end, surface_end) = channel::duplex();
			let (ready_tx, ready_rx) = watch::channel(false);
			let spec = SurfaceSpec {
				title: self.inner.config.panel.title.clone(),
				placement,
				generation,
			};
			let view = self.inner.host.open_surface(spec, SurfacePort::new(surface_end, ready_tx));

			let (listener, events) = self.inner.diagnostics.subscribe();
			let (outlet, inlet, closer) = controller_end.into_parts();
			let pump = CancellationToken::new();
			task::spawn(
				TaskClass::Interactive,
				run_panel(Arc::downgrade(&self.inner), generation, inlet, events, pump.clone()),
			);

			*current = Some(PanelSlot {
				generation,
				view,
				outlet,
				closer,
				ready: ready_rx,
				pump,
				_listener: listener,
			});
			generation
		};

		tracing::debug!(generation, %placement, "mentor.panel.created");
		self.update_diagnostics();
		ShowOutcome::Created(generation)
	}

	/// Brings the existing surface to the foreground.
	pub fn reveal(&self) -> Result<()> {
		let mut current = self.inner.current.lock();
		let slot = current.as_mut().ok_or(MentorError::NoPanel)?;
		slot.view.reveal(self.inner.config.panel.placement);
		Ok(())
	}

	/// Sends the first finding of the active document to the surface.
	///
	/// Every outcome other than [`ExplainOutcome::Sent`] is a silent no-op.
	pub fn explain_current_error(&self) -> ExplainOutcome {
		let Some(document) = self.inner.host.active_document() else {
			tracing::trace!("mentor.explain.no_document");
			return ExplainOutcome::NoDocument;
		};
		let Some(error) = self.inner.diagnostics.first_finding(&document) else {
			tracing::trace!(%document, "mentor.explain.no_findings");
			return ExplainOutcome::NoFindings;
		};
		tracing::debug!(%document, line = error.line, column = error.column, "mentor.explain");
		if self.post(&OutboundMessage::ExplainError { error }) {
			ExplainOutcome::Sent
		} else {
			ExplainOutcome::NoPanel
		}
	}

	/// Pushes the active document's "has findings" flag to the surface.
	///
	/// Cheap and idempotent; safe to call on every diagnostics change.
	pub fn update_diagnostics(&self) -> bool {
		let has_errors = self
			.inner
			.host
			.active_document()
			.is_some_and(|document| self.inner.diagnostics.has_findings(&document));
		tracing::trace!(has_errors, "mentor.diagnostics.update");
		self.post(&OutboundMessage::UpdateDiagnostics { has_errors })
	}

	/// Drops the surface. Returns `false` if there was none.
	pub fn dispose(&self) -> bool {
		let slot = self.inner.current.lock().take();
		slot.is_some()
	}

	fn dispose_generation(&self, generation: u64) -> bool {
		let slot = {
			let mut current = self.inner.current.lock();
			if current.as_ref().is_some_and(|slot| slot.generation == generation) {
				current.take()
			} else {
				None
			}
		};
		slot.is_some()
	}

	/// Runs a host-invoked action.
	pub async fn run_action(&self, action: MentorAction) -> ActionOutcome {
		tracing::debug!(action = action.id(), "mentor.action");
		match action {
			MentorAction::OpenMentor => ActionOutcome::Shown(self.create_or_show(self.inner.config.panel.placement)),
			MentorAction::ExplainError => ActionOutcome::Explained(self.explain_error().await),
		}
	}

	/// Explains the current error, creating the surface first if needed.
	///
	/// A freshly created surface is given until `explain.ready-timeout-ms` to
	/// report ready; if it does not, or it was replaced meanwhile, nothing is
	/// sent.
	pub async fn explain_error(&self) -> ExplainOutcome {
		if !self.has_panel() {
			self.create_or_show(self.inner.config.panel.placement);
		}
		let Some((generation, mut ready)) = self.ready_signal() else {
			return ExplainOutcome::NoPanel;
		};

		let timeout = self.inner.config.explain.ready_timeout();
		let became_ready = tokio::time::timeout(timeout, ready.wait_for(|ready| *ready))
			.await
			.map(|result| result.is_ok());
		match became_ready {
			Ok(true) if self.current_generation() != Some(generation) => {
				tracing::debug!(generation, "mentor.explain.panel_replaced");
				ExplainOutcome::NotReady
			}
			Ok(true) => self.explain_current_error(),
			Ok(false) => {
				tracing::debug!("mentor.explain.surface_closed_before_ready");
				ExplainOutcome::NotReady
			}
			Err(_) => {
				tracing::debug!(?timeout, "mentor.explain.ready_timeout");
				ExplainOutcome::NotReady
			}
		}
	}

	fn ready_signal(&self) -> Option<(u64, watch::Receiver<bool>)> {
		self.inner
			.current
			.lock()
			.as_ref()
			.map(|slot| (slot.generation, slot.ready.clone()))
	}

	fn current_outlet(&self) -> Option<Outlet<OutboundMessage>> {
		self.inner.current.lock().as_ref().map(|slot| slot.outlet.clone())
	}

	fn post(&self, message: &OutboundMessage) -> bool {
		self.current_outlet().is_some_and(|outlet| outlet.send(message))
	}

	fn handle_inbound(&self, generation: u64, message: InboundMessage) {
		tracing::debug!(generation, command = message.command(), "mentor.panel.inbound");
		match message {
			InboundMessage::SendMessage { text } => self.request_reply(text),
			InboundMessage::ToggleMode { mode } => self.inner.host.mode_changed(mode),
			InboundMessage::OpenLearningJournal => {
				self.post(&OutboundMessage::ShowLearningJournal);
			}
		}
	}

	fn request_reply(&self, text: String) {
		let Some(outlet) = self.current_outlet() else {
			return;
		};
		let replies = Arc::clone(&self.inner.replies);
		let timeout = self.inner.config.reply.timeout();
		task::spawn(TaskClass::Background, async move {
			let message = reply::reply_or_failure(replies.as_ref(), &text, timeout).await;
			if !outlet.send(&OutboundMessage::ReceiveMessage { message }) {
				tracing::debug!("mentor.reply.no_recipient");
			}
		});
	}
}

async fn run_panel(
	inner: Weak<ControllerInner>,
	generation: u64,
	mut inlet: Inlet<InboundMessage>,
	mut events: DiagnosticsEventReceiver,
	stop: CancellationToken,
) {
	let mut listening = true;
	loop {
		tokio::select! {
			biased;
			_ = stop.cancelled() => break,
			message = inlet.recv() => {
				let Some(controller) = PanelController::upgrade(&inner) else { break };
				match message {
					Some(message) => controller.handle_inbound(generation, message),
					None => {
						controller.dispose_generation(generation);
						break;
					}
				}
			}
			event = events.recv(), if listening => match event {
				Some(event) => {
					let Some(controller) = PanelController::upgrade(&inner) else { break };
					tracing::trace!(document = %event.document, count = event.count, "mentor.diagnostics.changed");
					controller.update_diagnostics();
				}
				None => listening = false,
			},
		}
	}
	tracing::trace!(generation, "mentor.panel.pump_exit");
}
