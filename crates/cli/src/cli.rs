use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "devbridge")]
#[command(about = "devbridge - sanitize payloads and decode wire captures offline")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Sanitize a JSON document the way an outgoing event payload is
	Sanitize(SanitizeArgs),
	/// Hydrate a capture of wire messages into what subscribers would see
	Decode(DecodeArgs),
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Sanitize(_) => "sanitize",
			Commands::Decode(_) => "decode",
		}
	}
}

#[derive(Args, Debug)]
pub struct SanitizeArgs {
	/// JSON document to read (stdin when omitted or `-`)
	pub input: Option<PathBuf>,

	/// Bridge configuration file (JSON); flags below override its limits
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Deepest container level copied before truncation
	#[arg(long, value_name = "N")]
	pub max_depth: Option<usize>,

	/// Longest string, in characters, kept verbatim
	#[arg(long, value_name = "N")]
	pub max_string_len: Option<usize>,

	/// Emit a wire `event` message with this name instead of `{data, cleaned}`
	#[arg(long, value_name = "NAME")]
	pub event: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
	/// Capture to read (stdin when omitted or `-`)
	pub input: Option<PathBuf>,

	/// Input is 4-byte little-endian length-prefixed frames instead of NDJSON
	#[arg(long)]
	pub framed: bool,

	/// Only show these events (repeatable)
	#[arg(long = "event", value_name = "NAME")]
	pub events: Vec<String>,

	/// Fail on the first malformed message instead of skipping it
	#[arg(long)]
	pub strict: bool,
}
