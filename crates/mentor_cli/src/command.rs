//! Stdin command grammar.

use anyhow::{Context, bail};
use xeno_mentor::DocumentId;
use xeno_mentor_proto::ResponseMode;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Open,
	Explain,
	Journal,
	Chat,
	Mode(ResponseMode),
	Close,
	Hide,
	Show,
	/// Switch the active document.
	Doc(DocumentId),
	/// Append a line to the active document's text.
	Text(String),
	/// Publish a 0-based finding on the active document.
	Diag {
		line: u32,
		column: u32,
		message: String,
	},
	Clear,
	/// Plain chat input.
	Say(String),
	Empty,
}

impl Command {
	pub fn parse(line: &str) -> anyhow::Result<Self> {
		let Some(rest) = line.strip_prefix(':') else {
			return Ok(if line.trim().is_empty() {
				Self::Empty
			} else {
				Self::Say(line.to_string())
			});
		};
		let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));

		Ok(match name {
			"open" => Self::Open,
			"explain" => Self::Explain,
			"journal" => Self::Journal,
			"chat" => Self::Chat,
			"mode" => {
				let mode = args.trim();
				Self::Mode(
					mode.parse()
						.with_context(|| format!("unknown mode `{mode}` (expected text or visual)"))?,
				)
			}
			"close" => Self::Close,
			"hide" => Self::Hide,
			"show" => Self::Show,
			"doc" => {
				let id = args.trim();
				if id.is_empty() {
					bail!("usage: :doc <id>");
				}
				Self::Doc(DocumentId::from(id))
			}
			"text" => Self::Text(args.to_string()),
			"diag" => parse_diag(args)?,
			"clear" => Self::Clear,
			other => bail!("unknown command `:{other}`"),
		})
	}
}

fn parse_diag(args: &str) -> anyhow::Result<Command> {
	const USAGE: &str = "usage: :diag <line> <col> <message>";
	let mut parts = args.trim_start().splitn(3, ' ');
	let line = parts.next().filter(|s| !s.is_empty()).context(USAGE)?;
	let column = parts.next().context(USAGE)?;
	let message = parts.next().map(str::trim).filter(|s| !s.is_empty()).context(USAGE)?;
	Ok(Command::Diag {
		line: line.parse().with_context(|| format!("bad line `{line}`"))?,
		column: column.parse().with_context(|| format!("bad column `{column}`"))?,
		message: message.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn plain_lines_are_chat() {
		assert_eq!(
			Command::parse("what is a lifetime?").unwrap(),
			Command::Say("what is a lifetime?".into())
		);
		assert_eq!(Command::parse("   ").unwrap(), Command::Empty);
	}

	#[test]
	fn parses_bare_commands() {
		assert_eq!(Command::parse(":open").unwrap(), Command::Open);
		assert_eq!(Command::parse(":explain").unwrap(), Command::Explain);
		assert_eq!(Command::parse(":journal").unwrap(), Command::Journal);
		assert_eq!(Command::parse(":hide").unwrap(), Command::Hide);
		assert_eq!(Command::parse(":clear").unwrap(), Command::Clear);
	}

	#[test]
	fn parses_mode() {
		assert_eq!(Command::parse(":mode visual").unwrap(), Command::Mode(ResponseMode::Visual));
		assert!(Command::parse(":mode loud").is_err());
	}

	#[test]
	fn text_keeps_leading_whitespace() {
		assert_eq!(
			Command::parse(":text     let x = 1;").unwrap(),
			Command::Text("    let x = 1;".into())
		);
		assert_eq!(Command::parse(":text").unwrap(), Command::Text(String::new()));
	}

	#[test]
	fn parses_diag() {
		assert_eq!(
			Command::parse(":diag 4 9 cannot find value `x` in this scope").unwrap(),
			Command::Diag {
				line: 4,
				column: 9,
				message: "cannot find value `x` in this scope".into(),
			}
		);
		assert!(Command::parse(":diag 4 nine oops").is_err());
		assert!(Command::parse(":diag 4 9").is_err());
	}

	#[test]
	fn rejects_unknown_commands() {
		assert!(Command::parse(":quit").is_err());
		assert!(Command::parse(":doc").is_err());
	}
}
