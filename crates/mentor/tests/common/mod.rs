//! Common test utilities and helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use parking_lot::Mutex;
use xeno_mentor::proto::ResponseMode;
use xeno_mentor::{
	DiagnosticsAdapter, DocumentId, HeadlessSurface, Host, MentorConfig, PanelController, Placement, ReplyService,
	StubReplyService, SurfacePort, SurfaceSpec, SurfaceView,
};

type DisposeHook = Box<dyn FnMut() + Send>;

/// Everything the host observed from the controller.
#[derive(Default)]
pub struct HostRecord {
	pub opened: Mutex<Vec<SurfaceSpec>>,
	pub reveals: Mutex<Vec<Placement>>,
	pub modes: Mutex<Vec<ResponseMode>>,
	pub disposed: AtomicUsize,
	/// Runs inside every view's `dispose`.
	pub on_dispose: Mutex<Option<DisposeHook>>,
}

impl HostRecord {
	pub fn opened_count(&self) -> usize {
		self.opened.lock().len()
	}

	pub fn disposed_count(&self) -> usize {
		self.disposed.load(Ordering::SeqCst)
	}
}

struct TestView {
	record: Arc<HostRecord>,
}

impl SurfaceView for TestView {
	fn reveal(&mut self, placement: Placement) {
		self.record.reveals.lock().push(placement);
	}

	fn dispose(&mut self) {
		self.record.disposed.fetch_add(1, Ordering::SeqCst);
		if let Some(hook) = self.record.on_dispose.lock().as_mut() {
			hook();
		}
	}
}

/// A host that parks surface ports for the test to pick up.
#[derive(Default)]
pub struct TestHost {
	active: Mutex<Option<DocumentId>>,
	ports: Mutex<VecDeque<SurfacePort>>,
	pub record: Arc<HostRecord>,
}

impl TestHost {
	pub fn set_active(&self, document: Option<DocumentId>) {
		*self.active.lock() = document;
	}

	pub fn take_port(&self) -> Option<SurfacePort> {
		self.ports.lock().pop_front()
	}

	/// Wraps the oldest opened port in a headless surface.
	pub fn take_surface(&self) -> HeadlessSurface {
		HeadlessSurface::new(self.take_port().expect("no surface was opened"))
	}

	/// Yields until the controller has opened a surface.
	pub async fn wait_for_port(&self) -> SurfacePort {
		loop {
			if let Some(port) = self.take_port() {
				return port;
			}
			tokio::task::yield_now().await;
		}
	}
}

impl Host for TestHost {
	fn active_document(&self) -> Option<DocumentId> {
		self.active.lock().clone()
	}

	fn open_surface(&self, spec: SurfaceSpec, port: SurfacePort) -> Box<dyn SurfaceView> {
		self.record.opened.lock().push(spec);
		self.ports.lock().push_back(port);
		Box::new(TestView {
			record: Arc::clone(&self.record),
		})
	}

	fn mode_changed(&self, mode: ResponseMode) {
		self.record.modes.lock().push(mode);
	}
}

pub struct Harness {
	pub host: Arc<TestHost>,
	pub diagnostics: DiagnosticsAdapter,
	pub controller: PanelController,
}

pub fn harness() -> Harness {
	let config = MentorConfig::default();
	let replies = Arc::new(StubReplyService::from_config(&config.reply));
	harness_with(replies, config)
}

pub fn harness_with(replies: Arc<dyn ReplyService>, config: MentorConfig) -> Harness {
	let host = Arc::new(TestHost::default());
	let diagnostics = DiagnosticsAdapter::new();
	let controller = PanelController::new(host.clone(), diagnostics.clone(), replies, config);
	Harness {
		host,
		diagnostics,
		controller,
	}
}

pub fn doc() -> DocumentId {
	DocumentId::from("file:///src/main.rs")
}

pub const MAIN_RS: &str = "fn main() {\n    let s = String::new();\n    let t = s;\n    println!(\"{s}\");\n    drop(undefined_thing);\n}\n";

/// Zero-based LSP error diagnostic on a single line.
pub fn diag(line: u32, character: u32, end_character: u32, message: &str) -> Diagnostic {
	Diagnostic {
		range: Range::new(Position::new(line, character), Position::new(line, end_character)),
		severity: Some(DiagnosticSeverity::ERROR),
		message: message.into(),
		..Diagnostic::default()
	}
}
