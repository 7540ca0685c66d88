//! Output rendering shared by all commands.
//!
//! Commands produce serializable records. `json` prints one pretty document,
//! `ndjson` one compact line per record, and `text` a human-oriented line per
//! record via [`TextRecord`].

#[cfg(test)]
mod tests;

use std::io::{self, Write};

use devbridge_protocol::PathSegment;
use serde::Serialize;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty-printed JSON (default)
	#[default]
	Json,
	/// Newline-delimited JSON, one record per line
	Ndjson,
	/// Human-readable text
	Text,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// A record that knows its plain-text rendering.
pub trait TextRecord {
	fn text_lines(&self) -> Vec<String>;
}

/// Renders `records` in `format` into `out`.
///
/// In `json` mode a single record is printed bare; several are printed as an
/// array.
pub fn write_records<T, W>(out: &mut W, records: &[T], format: OutputFormat) -> io::Result<()>
where
	T: Serialize + TextRecord,
	W: Write,
{
	match format {
		OutputFormat::Json => {
			let json = match records {
				[single] => serde_json::to_string_pretty(single)?,
				_ => serde_json::to_string_pretty(records)?,
			};
			writeln!(out, "{json}")
		}
		OutputFormat::Ndjson => {
			for record in records {
				writeln!(out, "{}", serde_json::to_string(record)?)?;
			}
			Ok(())
		}
		OutputFormat::Text => {
			for record in records {
				for line in record.text_lines() {
					writeln!(out, "{line}")?;
				}
			}
			Ok(())
		}
	}
}

/// Renders `records` to stdout.
pub fn print_records<T>(records: &[T], format: OutputFormat) -> io::Result<()>
where
	T: Serialize + TextRecord,
{
	let mut stdout = io::stdout().lock();
	write_records(&mut stdout, records, format)
}

/// Dotted rendering of a path; the root is `<root>`.
pub fn display_path(path: &[PathSegment]) -> String {
	if path.is_empty() {
		return "<root>".to_string();
	}
	path.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(".")
}
