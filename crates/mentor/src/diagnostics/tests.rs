use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};
use pretty_assertions::assert_eq;
use xeno_mentor_proto::FindingCode;

use super::*;

fn diag(line: u32, character: u32, end_character: u32, message: &str) -> Diagnostic {
	Diagnostic {
		range: Range::new(Position::new(line, character), Position::new(line, end_character)),
		severity: Some(DiagnosticSeverity::ERROR),
		message: message.into(),
		..Diagnostic::default()
	}
}

fn doc() -> DocumentId {
	DocumentId::from("file:///main.rs")
}

#[test]
fn translates_zero_based_positions() {
	let adapter = DiagnosticsAdapter::new();
	adapter.set_text(doc(), "a\nb\nc\nd\nlet x = foo(y);\n");
	adapter.publish(doc(), vec![diag(4, 9, 12, "cannot find function `foo`")]);

	let finding = adapter.first_finding(&doc()).unwrap();
	assert_eq!(finding.line, 5);
	assert_eq!(finding.column, 10);
	assert_eq!(finding.message, "cannot find function `foo`");
	assert_eq!(finding.source_text, "oo(");
}

#[test]
fn source_text_spans_lines_and_clamps() {
	let text = Rope::from_str("fn main() {\n    let v = 1;\n}\n");
	let mut multi = diag(0, 3, 0, "spans");
	multi.range.end = Position::new(1, 7);
	assert_eq!(finding_from_diagnostic(&multi, &text).source_text, "main() {\n    let");

	let past_eol = diag(2, 0, 99, "eol");
	assert_eq!(finding_from_diagnostic(&past_eol, &text).source_text, "}");

	let past_eof = diag(40, 0, 3, "eof");
	assert_eq!(finding_from_diagnostic(&past_eof, &text).source_text, "");
}

#[test]
fn columns_are_utf16_code_units() {
	let text = Rope::from_str("let s = \"\u{1F600}\"; foo();\n");
	// The emoji is one char but two UTF-16 code units.
	let call = diag(0, 14, 17, "cannot find function `foo`");
	let finding = finding_from_diagnostic(&call, &text);
	assert_eq!(finding.source_text, "foo");
	assert_eq!(finding.column, 15);

	let past_eol = diag(0, 14, 400, "eol");
	assert_eq!(finding_from_diagnostic(&past_eol, &text).source_text, "foo();");
}

#[test]
fn missing_text_yields_empty_source() {
	let adapter = DiagnosticsAdapter::new();
	adapter.publish(doc(), vec![diag(0, 0, 4, "x")]);
	assert_eq!(adapter.findings(&doc())[0].source_text, "");
}

#[test]
fn converts_codes() {
	let text = Rope::new();
	let mut numeric = diag(0, 0, 0, "n");
	numeric.code = Some(NumberOrString::Number(2304));
	assert_eq!(finding_from_diagnostic(&numeric, &text).code, Some(FindingCode::Number(2304)));

	let mut textual = diag(0, 0, 0, "s");
	textual.code = Some(NumberOrString::String("E0425".into()));
	assert_eq!(
		finding_from_diagnostic(&textual, &text).code,
		Some(FindingCode::Text("E0425".into()))
	);
	assert_eq!(finding_from_diagnostic(&diag(0, 0, 0, "none"), &text).code, None);
}

#[test]
fn first_finding_keeps_host_order() {
	let adapter = DiagnosticsAdapter::new();
	let mut warning = diag(8, 0, 1, "unused variable");
	warning.severity = Some(DiagnosticSeverity::WARNING);
	adapter.publish(doc(), vec![warning, diag(2, 0, 1, "mismatched types")]);

	assert_eq!(adapter.first_finding(&doc()).unwrap().message, "unused variable");
	assert_eq!(adapter.findings(&doc()).len(), 2);
}

#[test]
fn unknown_document_has_no_findings() {
	let adapter = DiagnosticsAdapter::new();
	assert!(adapter.findings(&doc()).is_empty());
	assert!(adapter.first_finding(&doc()).is_none());
	assert!(!adapter.has_findings(&doc()));
}

#[test]
fn notifies_for_every_document() {
	let adapter = DiagnosticsAdapter::new();
	let (_listener, mut events) = adapter.subscribe();

	adapter.publish(DocumentId::from("file:///other.rs"), vec![diag(0, 0, 1, "x")]);
	adapter.clear(doc());

	assert_eq!(
		events.try_recv().unwrap(),
		DiagnosticsEvent {
			document: DocumentId::from("file:///other.rs"),
			count: 1
		}
	);
	assert_eq!(
		events.try_recv().unwrap(),
		DiagnosticsEvent {
			document: doc(),
			count: 0
		}
	);
}

#[test]
fn set_text_does_not_notify() {
	let adapter = DiagnosticsAdapter::new();
	let (_listener, mut events) = adapter.subscribe();
	adapter.set_text(doc(), "fn main() {}");
	assert!(events.try_recv().is_err());
}

#[test]
fn remove_notifies_only_when_findings_existed() {
	let adapter = DiagnosticsAdapter::new();
	let (_listener, mut events) = adapter.subscribe();

	adapter.set_text(doc(), "x");
	adapter.remove(&doc());
	assert!(events.try_recv().is_err());

	adapter.publish(doc(), vec![diag(0, 0, 1, "x")]);
	let _ = events.try_recv();
	adapter.remove(&doc());
	assert_eq!(events.try_recv().unwrap().count, 0);
	assert!(!adapter.has_findings(&doc()));
}

#[test]
fn dropping_listener_unsubscribes_synchronously() {
	let adapter = DiagnosticsAdapter::new();
	let (first, _rx1) = adapter.subscribe();
	let (_second, _rx2) = adapter.subscribe();
	assert_eq!(adapter.listener_count(), 2);

	drop(first);
	assert_eq!(adapter.listener_count(), 1);
}

#[test]
fn dropped_receivers_are_pruned_on_notify() {
	let adapter = DiagnosticsAdapter::new();
	let (_listener, rx) = adapter.subscribe();
	drop(rx);
	adapter.clear(doc());
	assert_eq!(adapter.listener_count(), 0);
}

#[test]
fn listener_outliving_adapter_is_harmless() {
	let adapter = DiagnosticsAdapter::new();
	let (listener, _rx) = adapter.subscribe();
	drop(adapter);
	drop(listener);
}
