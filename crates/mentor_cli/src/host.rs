//! Terminal implementation of the editor seams.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use xeno_mentor::proto::ResponseMode;
use xeno_mentor::{DocumentId, Host, Placement, SurfacePort, SurfaceSpec, SurfaceView};

/// A surface the controller asked the host to open.
pub type OpenedSurface = (SurfaceSpec, SurfacePort);

/// Hands new surfaces to the session loop and tracks the active document.
pub struct TerminalHost {
	active: Mutex<Option<DocumentId>>,
	opened: mpsc::UnboundedSender<OpenedSurface>,
}

impl TerminalHost {
	pub fn new(document: DocumentId) -> (Self, mpsc::UnboundedReceiver<OpenedSurface>) {
		let (opened, rx) = mpsc::unbounded_channel();
		let host = Self {
			active: Mutex::new(Some(document)),
			opened,
		};
		(host, rx)
	}

	pub fn set_active(&self, document: DocumentId) {
		*self.active.lock() = Some(document);
	}
}

impl Host for TerminalHost {
	fn active_document(&self) -> Option<DocumentId> {
		self.active.lock().clone()
	}

	fn open_surface(&self, spec: SurfaceSpec, port: SurfacePort) -> Box<dyn SurfaceView> {
		let generation = spec.generation;
		// A closed session drops the port, which the controller sees as a close.
		if self.opened.send((spec, port)).is_err() {
			tracing::debug!(generation, "mentor.host.session_gone");
		}
		Box::new(TerminalView { generation })
	}

	fn mode_changed(&self, mode: ResponseMode) {
		println!("(response mode: {mode})");
	}
}

struct TerminalView {
	generation: u64,
}

impl SurfaceView for TerminalView {
	fn reveal(&mut self, placement: Placement) {
		println!("(mentor panel {} focused, {placement})", self.generation);
	}

	fn dispose(&mut self) {
		tracing::debug!(generation = self.generation, "mentor.host.view_disposed");
	}
}
