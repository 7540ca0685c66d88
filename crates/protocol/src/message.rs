//! Wire messages exchanged between the two bridge endpoints.
//!
//! Every message is a JSON object tagged by `type`:
//!
//! | type          | fields                                   |
//! |---------------|------------------------------------------|
//! | `inspect`     | `id`, `path`, `callback`                 |
//! | `callback`    | `id`, `args: [value, cleaned, proto, protoCleaned]` |
//! | `event`       | `evt`, `data`, `cleaned`                 |
//! | `many-events` | `events: [event...]`                     |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::PROTO_KEY;
use crate::hydrate::hydrate;
use crate::path::Path;

/// Correlation id pairing an `inspect` request with its `callback`.
pub type CallbackId = u64;

/// Discriminated union of bridge messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message {
	/// Ask the remote side for the value at `path` under root `id`.
	Inspect {
		/// Root id the value was registered under.
		id: String,
		/// Path from the root to the requested value.
		path: Path,
		/// Correlation id the response must echo.
		callback: CallbackId,
	},
	/// Response to an [`Inspect`](Self::Inspect) request.
	Callback {
		/// Echo of the request's `callback` field.
		id: CallbackId,
		args: CallbackArgs,
	},
	/// A single named event.
	Event(EventPayload),
	/// A batch of events flushed together, in send order.
	ManyEvents { events: Vec<EventPayload> },
	/// Unrecognized `type` (forward-compatible catch-all).
	#[serde(other)]
	Unknown,
}

impl Message {
	/// Returns the wire `type` tag.
	pub fn kind(&self) -> &'static str {
		match self {
			Message::Inspect { .. } => "inspect",
			Message::Callback { .. } => "callback",
			Message::Event(_) => "event",
			Message::ManyEvents { .. } => "many-events",
			Message::Unknown => "unknown",
		}
	}
}

/// Named event with a sanitized payload.
///
/// Entries of `many-events` are written without a `type` tag; one sent by a
/// peer is ignored when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
	/// Event name subscribers are keyed by.
	pub evt: String,
	/// Sanitized payload.
	#[serde(default)]
	pub data: Value,
	/// Paths in `data` replaced by descriptors, if any.
	#[serde(default)]
	pub cleaned: Option<Vec<Path>>,
}

impl EventPayload {
	pub fn new(evt: impl Into<String>, data: Value, cleaned: Vec<Path>) -> Self {
		Self {
			evt: evt.into(),
			data,
			cleaned: Some(cleaned),
		}
	}
}

/// Arguments of a `callback` message.
///
/// Serialized as the positional array
/// `[value, cleaned, proto, protoCleaned]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackArgs(
	/// Sanitized own fields of the inspected value.
	pub Value,
	/// Replaced paths within the value fields.
	pub Vec<Path>,
	/// Sanitized prototype fields, `null` when none were emitted.
	pub Option<Value>,
	/// Replaced paths within the prototype fields.
	pub Vec<Path>,
);

impl CallbackArgs {
	/// Response for a value that could not be resolved.
	pub fn empty() -> Self {
		Self(Value::Object(Default::default()), Vec::new(), None, Vec::new())
	}

	/// Hydrates value and prototype and attaches the prototype under
	/// [`PROTO_KEY`], producing what the requester hands to its caller.
	pub fn into_hydrated(self) -> Value {
		let CallbackArgs(mut value, cleaned, proto, proto_cleaned) = self;
		hydrate(&mut value, &cleaned);
		if let Some(mut proto) = proto {
			hydrate(&mut proto, &proto_cleaned);
			if let Value::Object(map) = &mut value {
				map.insert(PROTO_KEY.to_string(), proto);
			}
		}
		value
	}
}
