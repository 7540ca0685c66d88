//! `devbridge decode`: turn a capture of wire messages back into what the
//! receiving side sees.
//!
//! Events (single or batched) are hydrated exactly as delivered to
//! subscribers; `inspect` requests are listed as-is and `callback` responses
//! are hydrated with their prototype attached.

use devbridge_protocol::{CallbackId, EventPayload, Message, Path, hydrate};
use devbridge_runtime::{decode_frame, read_frame};
use serde::Serialize;
use serde_json::Value;

use super::read_input;
use crate::cli::DecodeArgs;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, TextRecord, display_path};

/// One decoded wire entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Decoded {
	Event { evt: String, data: Value },
	Inspect { id: String, path: Path, callback: CallbackId },
	Callback { id: CallbackId, value: Value },
}

impl TextRecord for Decoded {
	fn text_lines(&self) -> Vec<String> {
		let line = match self {
			Decoded::Event { evt, data } => format!("{evt} {data}"),
			Decoded::Inspect { id, path, callback } => {
				format!("inspect #{callback} {id} {}", display_path(path))
			}
			Decoded::Callback { id, value } => format!("callback #{id} {value}"),
		};
		vec![line]
	}
}

pub async fn run(args: DecodeArgs, format: OutputFormat) -> Result<()> {
	let input = read_input(args.input.as_deref()).await?;
	let messages = if args.framed {
		read_frames(input, args.strict).await?
	} else {
		read_lines(&input, args.strict)?
	};

	let decoded: Vec<Decoded> = messages
		.into_iter()
		.flat_map(decode_message)
		.filter(|entry| keep(entry, &args.events))
		.collect();
	tracing::info!(entries = decoded.len(), "Decoded capture");

	output::print_records(&decoded, format)?;
	Ok(())
}

/// Expands one message into decoded entries; `many-events` yields one per event.
pub fn decode_message(message: Message) -> Vec<Decoded> {
	match message {
		Message::Event(payload) => vec![decode_event(payload)],
		Message::ManyEvents { events } => events.into_iter().map(decode_event).collect(),
		Message::Inspect { id, path, callback } => vec![Decoded::Inspect { id, path, callback }],
		Message::Callback { id, args } => vec![Decoded::Callback {
			id,
			value: args.into_hydrated(),
		}],
		Message::Unknown => {
			tracing::debug!("Skipping message of unknown type");
			Vec::new()
		}
	}
}

fn decode_event(payload: EventPayload) -> Decoded {
	let EventPayload {
		evt,
		mut data,
		cleaned,
	} = payload;
	if let Some(cleaned) = &cleaned {
		hydrate(&mut data, cleaned);
	}
	Decoded::Event { evt, data }
}

fn keep(entry: &Decoded, events: &[String]) -> bool {
	match entry {
		Decoded::Event { evt, .. } => events.is_empty() || events.contains(evt),
		_ => events.is_empty(),
	}
}

/// Parses NDJSON, one wire message per non-blank line.
pub fn read_lines(input: &[u8], strict: bool) -> Result<Vec<Message>> {
	let text = String::from_utf8_lossy(input);
	let mut messages = Vec::new();
	for (index, line) in text.lines().enumerate() {
		if line.trim().is_empty() {
			continue;
		}
		match serde_json::from_str::<Message>(line) {
			Ok(message) => messages.push(message),
			Err(source) if strict => {
				return Err(CliError::InvalidMessage {
					line: index + 1,
					source,
				});
			}
			Err(e) => tracing::warn!(line = index + 1, "Skipping invalid wire message: {}", e),
		}
	}
	Ok(messages)
}

/// Reads length-prefixed frames with the pipe transport's framing.
///
/// The capture must end on a frame boundary; a cut-off frame is reported
/// under `strict` and otherwise ends the capture.
pub async fn read_frames(input: Vec<u8>, strict: bool) -> Result<Vec<Message>> {
	let mut reader = std::io::Cursor::new(input);
	let mut messages = Vec::new();
	let mut index = 0;
	loop {
		let body = match read_frame(&mut reader).await {
			Ok(Some(body)) => body,
			Ok(None) => break,
			Err(e) if strict => return Err(CliError::MalformedFrame(e)),
			Err(e) => {
				tracing::warn!(frame = index + 1, "Stopping at truncated frame: {}", e);
				break;
			}
		};
		index += 1;

		let value = match decode_frame(&body) {
			Ok(value) => value,
			Err(e) if strict => return Err(CliError::MalformedFrame(e)),
			Err(e) => {
				tracing::warn!(frame = index, "Skipping frame: {}", e);
				continue;
			}
		};
		match serde_json::from_value::<Message>(value) {
			Ok(message) => messages.push(message),
			Err(source) if strict => return Err(CliError::InvalidMessage { line: index, source }),
			Err(e) => tracing::warn!(frame = index, "Skipping invalid wire message: {}", e),
		}
	}
	Ok(messages)
}
