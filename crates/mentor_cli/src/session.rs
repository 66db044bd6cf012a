//! Stdin-driven session loop.

use std::collections::HashMap;
use std::sync::Arc;

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use xeno_mentor::proto::{OutboundMessage, PersistedState, Tab};
use xeno_mentor::{DiagnosticsAdapter, DocumentId, HeadlessSurface, MentorAction, PanelController};

use crate::command::Command;
use crate::host::{OpenedSurface, TerminalHost};

struct Panel {
	generation: u64,
	surface: HeadlessSurface,
	/// Snapshot taken on `:hide`.
	hidden: Option<PersistedState>,
	shown_errors: Option<bool>,
}

/// Text and findings typed in for one document.
#[derive(Debug, Default)]
struct Buffer {
	text: String,
	findings: Vec<Diagnostic>,
}

/// Per-document buffers; switching documents keeps the others intact.
#[derive(Debug, Default)]
struct Buffers(HashMap<DocumentId, Buffer>);

impl Buffers {
	/// Appends `line` and returns the document's full text.
	fn append_text(&mut self, document: &DocumentId, line: &str) -> &str {
		let buffer = self.0.entry(document.clone()).or_default();
		buffer.text.push_str(line);
		buffer.text.push('\n');
		&buffer.text
	}

	/// Adds a finding and returns the document's full finding list.
	fn push_finding(&mut self, document: &DocumentId, finding: Diagnostic) -> Vec<Diagnostic> {
		let buffer = self.0.entry(document.clone()).or_default();
		buffer.findings.push(finding);
		buffer.findings.clone()
	}

	fn clear_findings(&mut self, document: &DocumentId) {
		if let Some(buffer) = self.0.get_mut(document) {
			buffer.findings.clear();
		}
	}
}

pub struct Session {
	controller: PanelController,
	host: Arc<TerminalHost>,
	diagnostics: DiagnosticsAdapter,
	document: DocumentId,
	buffers: Buffers,
	panel: Option<Panel>,
}

impl Session {
	pub fn new(
		controller: PanelController,
		host: Arc<TerminalHost>,
		diagnostics: DiagnosticsAdapter,
		document: DocumentId,
	) -> Self {
		Self {
			controller,
			host,
			diagnostics,
			document,
			buffers: Buffers::default(),
			panel: None,
		}
	}

	pub async fn run(mut self, mut surfaces: mpsc::UnboundedReceiver<OpenedSurface>) -> anyhow::Result<()> {
		let mut lines = BufReader::new(tokio::io::stdin()).lines();
		println!("xeno-mentor: type :open to start, chat text to talk, EOF to quit");

		loop {
			tokio::select! {
				line = lines.next_line() => {
					let Some(line) = line? else { break };
					match Command::parse(&line) {
						Ok(command) => self.execute(command).await,
						Err(err) => println!("error: {err:#}"),
					}
				}
				Some((spec, port)) = surfaces.recv() => {
					let surface = HeadlessSurface::new(port);
					surface.mark_ready();
					println!("== {} (panel {}) ==", spec.title, spec.generation);
					self.panel = Some(Panel {
						generation: spec.generation,
						surface,
						hidden: None,
						shown_errors: None,
					});
				}
				message = next_message(&mut self.panel) => match message {
					Some(message) => self.render(&message),
					None => {
						if let Some(panel) = self.panel.take() {
							println!("(mentor panel {} closed)", panel.generation);
						}
					}
				},
			}
		}
		Ok(())
	}

	async fn execute(&mut self, command: Command) {
		match command {
			Command::Empty => {}
			Command::Open => {
				self.controller.run_action(MentorAction::OpenMentor).await;
			}
			Command::Explain => {
				// The action waits for the surface to report ready, which only
				// happens once this loop picks up the new port.
				let controller = self.controller.clone();
				tokio::spawn(async move {
					let outcome = controller.run_action(MentorAction::ExplainError).await;
					tracing::debug!(?outcome, "mentor.cli.explain");
				});
			}
			Command::Journal => self.with_surface(|surface| {
				surface.select_tab(Tab::Journal);
			}),
			Command::Chat => self.with_surface(|surface| {
				if surface.select_tab(Tab::Chat) {
					println!("[chat]");
				}
			}),
			Command::Mode(mode) => self.with_surface(|surface| {
				surface.set_response_mode(mode);
			}),
			Command::Close => match self.panel.take() {
				Some(panel) => {
					panel.surface.close();
					println!("(mentor panel {} closed)", panel.generation);
				}
				None => println!("(no mentor panel)"),
			},
			Command::Hide => {
				if let Some(panel) = self.panel.as_mut()
					&& panel.surface.is_visible()
				{
					panel.hidden = Some(panel.surface.hide());
					println!("(mentor panel hidden)");
				}
			}
			Command::Show => self.show(),
			Command::Doc(document) => {
				self.host.set_active(document.clone());
				self.document = document;
				self.controller.update_diagnostics();
			}
			Command::Text(line) => {
				let text = self.buffers.append_text(&self.document, &line);
				self.diagnostics.set_text(self.document.clone(), text);
			}
			Command::Diag { line, column, message } => {
				let findings = self.buffers.push_finding(&self.document, finding(line, column, message));
				self.diagnostics.publish(self.document.clone(), findings);
			}
			Command::Clear => {
				self.buffers.clear_findings(&self.document);
				self.diagnostics.clear(self.document.clone());
			}
			Command::Say(text) => self.with_surface(|surface| {
				surface.submit(&text);
			}),
		}
	}

	fn with_surface(&mut self, f: impl FnOnce(&mut HeadlessSurface)) {
		match self.panel.as_mut() {
			Some(panel) => f(&mut panel.surface),
			None => println!("(no mentor panel, use :open)"),
		}
	}

	fn show(&mut self) {
		if let Err(err) = self.controller.reveal() {
			println!("error: {err}");
			return;
		}
		let Some(panel) = self.panel.as_mut() else {
			return;
		};
		if panel.surface.is_visible() {
			return;
		}
		panel.surface.show(panel.hidden.take());
		let state = panel.surface.state();
		println!(
			"(restored {} messages, tab {}, mode {})",
			state.messages.len(),
			state.active_tab,
			state.response_mode
		);
	}

	fn render(&mut self, message: &OutboundMessage) {
		let Some(panel) = self.panel.as_mut() else {
			return;
		};
		if !panel.surface.is_visible() {
			return;
		}
		match message {
			OutboundMessage::ReceiveMessage { message } => println!("mentor> {}", message.text),
			OutboundMessage::UpdateDiagnostics { has_errors } => {
				if panel.shown_errors != Some(*has_errors) {
					panel.shown_errors = Some(*has_errors);
					if *has_errors {
						println!("[explain error available]");
					} else {
						println!("[no errors]");
					}
				}
			}
			OutboundMessage::ExplainError { .. } => {
				if let Some(entry) = panel.surface.state().messages.last() {
					println!("mentor> {}", entry.text);
				}
			}
			OutboundMessage::ShowLearningJournal => println!("[journal]"),
		}
	}
}

/// Error finding from `column` to the end of `line`.
fn finding(line: u32, column: u32, message: String) -> Diagnostic {
	Diagnostic {
		range: Range::new(Position::new(line, column), Position::new(line, u32::MAX)),
		severity: Some(DiagnosticSeverity::ERROR),
		source: Some("xeno-mentor".into()),
		message,
		..Diagnostic::default()
	}
}

async fn next_message(panel: &mut Option<Panel>) -> Option<OutboundMessage> {
	match panel {
		Some(panel) => panel.surface.next_message().await,
		None => std::future::pending().await,
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn findings_survive_document_switch() {
		let mut buffers = Buffers::default();
		let main = DocumentId::from("file:///main.rs");
		let lib = DocumentId::from("file:///lib.rs");

		buffers.push_finding(&main, finding(0, 0, "first".into()));
		buffers.push_finding(&lib, finding(1, 2, "elsewhere".into()));
		let findings = buffers.push_finding(&main, finding(3, 4, "second".into()));

		let messages: Vec<_> = findings.iter().map(|d| d.message.as_str()).collect();
		assert_eq!(messages, vec!["first", "second"]);
	}

	#[test]
	fn text_accumulates_per_document() {
		let mut buffers = Buffers::default();
		let main = DocumentId::from("file:///main.rs");
		let lib = DocumentId::from("file:///lib.rs");

		buffers.append_text(&main, "fn main() {");
		buffers.append_text(&lib, "pub mod x;");
		assert_eq!(buffers.append_text(&main, "}"), "fn main() {\n}\n");

		buffers.clear_findings(&lib);
		assert_eq!(buffers.append_text(&lib, ""), "pub mod x;\n\n");
	}
}
