//! Diagnostics adapter over the host's live analysis results.
//!
//! The host feeds LSP diagnostics and document text in; the adapter answers
//! "which findings does this document have" as 1-based [`ErrorFinding`]s and
//! broadcasts a change event for every update to any document. Filtering by
//! active document happens at the consumer.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use lsp_types::{Diagnostic, NumberOrString, Position, Range};
use parking_lot::{Mutex, RwLock};
use ropey::Rope;
use tokio::sync::mpsc;
use xeno_mentor_proto::{ErrorFinding, FindingCode};

/// Host identifier for a document (typically its URI).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(String);

impl DocumentId {
	/// Creates an identifier from a URI or any stable host key.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for DocumentId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for DocumentId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Event emitted when diagnostics change for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsEvent {
	/// Document whose diagnostics changed.
	pub document: DocumentId,
	/// Number of findings after the change.
	pub count: usize,
}

/// Receiver for diagnostics change events.
pub type DiagnosticsEventReceiver = mpsc::UnboundedReceiver<DiagnosticsEvent>;

#[derive(Default)]
struct DocumentEntry {
	text: Rope,
	diagnostics: Vec<Diagnostic>,
}

#[derive(Default)]
struct AdapterInner {
	documents: RwLock<HashMap<DocumentId, DocumentEntry>>,
	listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<DiagnosticsEvent>>>,
	next_listener: AtomicU64,
}

/// Shared handle to the host's diagnostics state.
#[derive(Clone, Default)]
pub struct DiagnosticsAdapter {
	inner: Arc<AdapterInner>,
}

impl DiagnosticsAdapter {
	/// Creates an empty adapter.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the diagnostics of `document` and notifies listeners.
	pub fn publish(&self, document: DocumentId, diagnostics: Vec<Diagnostic>) {
		let count = diagnostics.len();
		self.inner.documents.write().entry(document.clone()).or_default().diagnostics = diagnostics;
		tracing::trace!(%document, count, "mentor.diagnostics.publish");
		self.notify(DiagnosticsEvent { document, count });
	}

	/// Removes all diagnostics of `document` and notifies listeners.
	pub fn clear(&self, document: DocumentId) {
		self.publish(document, Vec::new());
	}

	/// Forgets `document` entirely, notifying listeners if it had findings.
	pub fn remove(&self, document: &DocumentId) {
		let removed = self.inner.documents.write().remove(document);
		if removed.is_some_and(|entry| !entry.diagnostics.is_empty()) {
			self.notify(DiagnosticsEvent {
				document: document.clone(),
				count: 0,
			});
		}
	}

	/// Replaces the text used to resolve each finding's `sourceText`.
	pub fn set_text(&self, document: DocumentId, text: &str) {
		self.inner.documents.write().entry(document).or_default().text = Rope::from_str(text);
	}

	/// Findings for `document` in host order. Empty when none are known.
	pub fn findings(&self, document: &DocumentId) -> Vec<ErrorFinding> {
		let documents = self.inner.documents.read();
		let Some(entry) = documents.get(document) else {
			return Vec::new();
		};
		entry
			.diagnostics
			.iter()
			.map(|diag| finding_from_diagnostic(diag, &entry.text))
			.collect()
	}

	/// First finding for `document`. No severity ordering is applied.
	pub fn first_finding(&self, document: &DocumentId) -> Option<ErrorFinding> {
		let documents = self.inner.documents.read();
		let entry = documents.get(document)?;
		entry.diagnostics.first().map(|diag| finding_from_diagnostic(diag, &entry.text))
	}

	/// True when `document` has at least one finding.
	pub fn has_findings(&self, document: &DocumentId) -> bool {
		self.inner
			.documents
			.read()
			.get(document)
			.is_some_and(|entry| !entry.diagnostics.is_empty())
	}

	/// Registers a change listener.
	///
	/// The returned guard unsubscribes synchronously when dropped.
	pub fn subscribe(&self) -> (DiagnosticsListener, DiagnosticsEventReceiver) {
		let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
		let (tx, rx) = mpsc::unbounded_channel();
		self.inner.listeners.lock().insert(id, tx);
		let listener = DiagnosticsListener {
			id,
			adapter: Arc::downgrade(&self.inner),
		};
		(listener, rx)
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.listeners.lock().len()
	}

	fn notify(&self, event: DiagnosticsEvent) {
		self.inner
			.listeners
			.lock()
			.retain(|_, tx| tx.send(event.clone()).is_ok());
	}
}

/// Subscription guard returned by [`DiagnosticsAdapter::subscribe`].
#[must_use = "dropping the listener unsubscribes immediately"]
pub struct DiagnosticsListener {
	id: u64,
	adapter: Weak<AdapterInner>,
}

impl Drop for DiagnosticsListener {
	fn drop(&mut self) {
		if let Some(adapter) = self.adapter.upgrade() {
			adapter.listeners.lock().remove(&self.id);
		}
	}
}

/// Converts a 0-based LSP diagnostic into a 1-based finding.
pub fn finding_from_diagnostic(diag: &Diagnostic, text: &Rope) -> ErrorFinding {
	let code = diag.code.as_ref().map(|code| match code {
		NumberOrString::Number(n) => FindingCode::Number(i64::from(*n)),
		NumberOrString::String(s) => FindingCode::Text(s.clone()),
	});
	ErrorFinding::from_zero_based(
		diag.message.clone(),
		code,
		diag.range.start.line,
		diag.range.start.character,
		range_text(text, &diag.range),
	)
}

fn range_text(text: &Rope, range: &Range) -> String {
	let start = position_to_char(text, range.start);
	let end = position_to_char(text, range.end).max(start);
	text.slice(start..end).to_string()
}

/// Maps an LSP position (UTF-16 column) to a char index, never past the
/// line's content.
fn position_to_char(text: &Rope, pos: Position) -> usize {
	let line = pos.line as usize;
	if line >= text.len_lines() {
		return text.len_chars();
	}
	let line_start = text.line_to_char(line);
	let slice = text.line(line);
	let mut content_len = slice.len_chars();
	while content_len > 0 && matches!(slice.char(content_len - 1), '\n' | '\r') {
		content_len -= 1;
	}
	let utf16_col = (pos.character as usize).min(slice.len_utf16_cu());
	line_start + slice.utf16_cu_to_char(utf16_col).min(content_len)
}

#[cfg(test)]
mod tests;
