//! Xeno mentor terminal host.
//!
//! Drives the mentor panel from stdin: host actions, a headless surface, and
//! hand-published diagnostics. Surface updates are printed to stdout; logs go
//! to stderr or to `XENO_LOG_DIR`.

mod cli;
mod command;
mod host;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cli::Args;
use host::TerminalHost;
use tracing::info;
use xeno_mentor::{DiagnosticsAdapter, DocumentId, MentorConfig, PanelController, StubReplyService};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = MentorConfig::load_or_default(args.config.as_deref())?;
	info!(title = %config.panel.title, placement = %config.panel.placement, "starting xeno-mentor");

	let document = DocumentId::new(args.document);
	let (host, surfaces) = TerminalHost::new(document.clone());
	let host = Arc::new(host);
	let diagnostics = DiagnosticsAdapter::new();
	let replies = Arc::new(StubReplyService::from_config(&config.reply));
	let controller = PanelController::new(host.clone(), diagnostics.clone(), replies, config);

	let result = session::Session::new(controller.clone(), host, diagnostics, document)
		.run(surfaces)
		.await;
	controller.dispose();
	result
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("xeno_mentor=trace,debug")
			} else {
				EnvFilter::new("xeno_mentor=debug,info")
			}
		})
	};

	// Stdout belongs to the surface; logs go to a file or stderr.
	if let Some(log_dir) = std::env::var("XENO_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("xeno-mentor.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "mentor tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
