//! Resolver side of the inspection protocol.
//!
//! Answers "give me the value at `path` under root `id`" with the sanitized own
//! fields of that value plus one level of its prototype. Unknown roots and
//! absent paths yield an empty response rather than an error.

use devbridge_protocol::{CallbackArgs, PROTO_KEY, Path, PathSegment};
use serde_json::{Map, Value};

use crate::registry::InspectableRegistry;
use crate::sanitize::Sanitizer;
use crate::value::{HostObject, HostValue, Shape};

/// Own properties of function values that expose call-stack state.
const CALL_STACK_PROPERTIES: [&str; 3] = ["arguments", "callee", "caller"];

/// Builds `callback` responses for `inspect` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectionService {
	sanitizer: Sanitizer,
}

impl InspectionService {
	pub fn new(sanitizer: Sanitizer) -> Self {
		Self { sanitizer }
	}

	/// Resolves `path` under root `id` into `[value, cleaned, proto, protoCleaned]`.
	pub fn resolve(
		&self,
		registry: &InspectableRegistry,
		id: &str,
		path: &[PathSegment],
	) -> CallbackArgs {
		let Some(root) = registry.get(id) else {
			tracing::debug!(id, "Inspect against unknown root (empty response)");
			return CallbackArgs::empty();
		};
		let Some(HostValue::Object(object)) = root.get_in(path) else {
			tracing::debug!(id, ?path, "Inspect path did not resolve to an object");
			return CallbackArgs::empty();
		};

		let fields = self.own_fields(&*object);
		let (proto, proto_cleaned) = match object.prototype() {
			Some(prototype) if !fields.shadows_prototype => {
				let proto = self.own_fields(&*prototype);
				(Some(proto.value), proto.cleaned)
			}
			_ => (None, Vec::new()),
		};

		CallbackArgs(fields.value, fields.cleaned, proto, proto_cleaned)
	}

	fn own_fields(&self, object: &dyn HostObject) -> OwnFields {
		let skip_call_stack = object.shape() == Shape::Function;
		let mut map = Map::new();
		let mut cleaned = Vec::new();
		let mut shadows_prototype = false;

		for name in object.own_property_names() {
			let key = name.to_key();
			if key == PROTO_KEY {
				shadows_prototype = true;
			}
			if skip_call_stack && CALL_STACK_PROPERTIES.contains(&key.as_str()) {
				continue;
			}
			let member = object.get(&name).unwrap_or_default();
			let sanitized = self
				.sanitizer
				.sanitize_at(&member, &mut vec![name], &mut cleaned, 0);
			map.insert(key, sanitized);
		}

		OwnFields {
			value: Value::Object(map),
			cleaned,
			shadows_prototype,
		}
	}
}

struct OwnFields {
	value: Value,
	cleaned: Vec<Path>,
	/// An own property already occupies the prototype key.
	shadows_prototype: bool,
}
