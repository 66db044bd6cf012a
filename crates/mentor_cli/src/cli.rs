use std::path::PathBuf;

use clap::Parser;

/// Mentor host command line arguments.
#[derive(Parser, Debug)]
#[command(name = "xeno-mentor")]
#[command(about = "Terminal host for the xeno code mentor panel")]
#[command(version)]
pub struct Args {
	/// Config file (defaults to $XDG_CONFIG_HOME/xeno/mentor.toml)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// Initially active document id
	#[arg(short, long, value_name = "ID", default_value = "untitled:scratch")]
	pub document: String,
}
