//! Stand-ins for values that cannot cross the transport verbatim.
//!
//! The producing side emits a [`Descriptor`] in place of a function, a class
//! instance, or a subtree that is nested too deeply. The receiving side turns
//! each descriptor into an inert [`Placeholder`] during hydration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property under which an inspect response carries the prototype fields.
pub const PROTO_KEY: &str = "__proto__";

/// Fixed replacement for framework fragments.
pub const FRAGMENT_PLACEHOLDER: &str = "A react fragment";

/// Marker appended to strings cut by the sanitizer.
pub const ELLIPSIS: &str = "...";

/// Value of the wire `type` field on descriptors and placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorKind {
	Function,
	Object,
	Array,
}

/// Container kind of a depth-truncated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
	Array,
	Object,
}

/// Transport-safe stand-in for a replaced subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
	/// A callable; `name` may be empty.
	Function { name: String },
	/// An instance of a class other than the plain structure class.
	Instance { name: String },
	/// A container below the depth budget.
	Truncated {
		kind: ContainerKind,
		name: String,
		length: Option<usize>,
	},
}

#[derive(Serialize)]
struct WireDescriptor<'a> {
	#[serde(rename = "type")]
	kind: DescriptorKind,
	name: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	length: Option<usize>,
}

impl Descriptor {
	/// Display name (function or constructor name).
	pub fn name(&self) -> &str {
		match self {
			Descriptor::Function { name }
			| Descriptor::Instance { name }
			| Descriptor::Truncated { name, .. } => name,
		}
	}

	/// Wire `type` tag.
	pub fn kind(&self) -> DescriptorKind {
		match self {
			Descriptor::Function { .. } => DescriptorKind::Function,
			Descriptor::Instance { .. } => DescriptorKind::Object,
			Descriptor::Truncated {
				kind: ContainerKind::Array,
				..
			} => DescriptorKind::Array,
			Descriptor::Truncated {
				kind: ContainerKind::Object,
				..
			} => DescriptorKind::Object,
		}
	}

	/// Length or size of a truncated container, when it has one.
	pub fn length(&self) -> Option<usize> {
		match self {
			Descriptor::Truncated { length, .. } => *length,
			_ => None,
		}
	}

	/// Converts to the wire representation.
	pub fn to_value(&self) -> Value {
		// Serializing a struct of primitives into a Value cannot fail.
		serde_json::to_value(self).unwrap_or(Value::Null)
	}
}

impl Serialize for Descriptor {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		WireDescriptor {
			kind: self.kind(),
			name: self.name(),
			length: self.length(),
		}
		.serialize(serializer)
	}
}

impl From<Descriptor> for Value {
	fn from(descriptor: Descriptor) -> Self {
		descriptor.to_value()
	}
}

/// Hydrated form of a descriptor.
///
/// `inspected` starts out `false` and is flipped by the consumer once the node
/// has been expanded through an inspect round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: DescriptorKind,
	pub inspected: bool,
}

impl Placeholder {
	/// Reads `name` and `type` from a wire descriptor.
	///
	/// Missing or malformed fields fall back to an empty name and `"object"`.
	pub fn from_wire(value: &Value) -> Self {
		let name = value
			.get("name")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_string();
		let kind = value
			.get("type")
			.cloned()
			.and_then(|t| serde_json::from_value(t).ok())
			.unwrap_or(DescriptorKind::Object);
		Self {
			name,
			kind,
			inspected: false,
		}
	}

	/// Converts to the wire representation.
	pub fn to_value(&self) -> Value {
		serde_json::to_value(self).unwrap_or(Value::Null)
	}
}
