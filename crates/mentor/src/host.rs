//! Seams between the controller and the embedding editor.

use serde::Deserialize;
use strum_macros::{Display, EnumString, IntoStaticStr};
use tokio::sync::watch;
use xeno_mentor_proto::{InboundMessage, OutboundMessage, ResponseMode};

use crate::channel::{ChannelCloser, Inlet, Outlet, SurfaceEndpoint};
use crate::diagnostics::DocumentId;

/// Where the host should place a surface when showing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Placement {
	/// Next to the active editor.
	#[default]
	Beside,
	/// In place of the active editor.
	Active,
}

/// Parameters for a new surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSpec {
	/// Panel title.
	pub title: String,
	/// Requested placement.
	pub placement: Placement,
	/// Monotonic panel generation, unique per created surface.
	pub generation: u64,
}

/// Everything a surface needs to talk to the controller.
///
/// Dropping the port (or calling [`SurfacePort::close`]) is how a surface
/// reports that the user closed it.
pub struct SurfacePort {
	endpoint: SurfaceEndpoint,
	ready: watch::Sender<bool>,
}

impl SurfacePort {
	pub(crate) fn new(endpoint: SurfaceEndpoint, ready: watch::Sender<bool>) -> Self {
		Self { endpoint, ready }
	}

	/// Signals that the surface finished its initial render.
	///
	/// Idempotent.
	pub fn mark_ready(&self) {
		self.ready.send_replace(true);
	}

	/// Sender for messages to the controller.
	pub fn outlet(&self) -> &Outlet<InboundMessage> {
		self.endpoint.outlet()
	}

	/// Receiver for messages from the controller.
	pub fn inlet_mut(&mut self) -> &mut Inlet<OutboundMessage> {
		self.endpoint.inlet_mut()
	}

	/// Closes the channel, as when the user closes the surface.
	pub fn close(&self) {
		self.endpoint.closer().close();
	}

	/// Handle that observes or triggers channel closure.
	pub fn closer(&self) -> ChannelCloser {
		self.endpoint.closer()
	}
}

/// Host-side handle to a live surface.
pub trait SurfaceView: Send + 'static {
	/// Brings the surface to the foreground.
	fn reveal(&mut self, placement: Placement);

	/// Releases host resources for the surface. Called once, after the
	/// controller has dropped its singleton reference.
	fn dispose(&mut self) {}
}

/// The embedding editor, as seen by the controller.
///
/// Implementations MUST NOT call back into the controller synchronously from
/// [`Host::open_surface`]; it runs while the singleton slot is locked.
pub trait Host: Send + Sync + 'static {
	/// Document in the focused editor, if any.
	fn active_document(&self) -> Option<DocumentId>;

	/// Creates and shows a surface wired to `port`.
	fn open_surface(&self, spec: SurfaceSpec, port: SurfacePort) -> Box<dyn SurfaceView>;

	/// The user switched response mode in the surface.
	fn mode_changed(&self, mode: ResponseMode);
}
