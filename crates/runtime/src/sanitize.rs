//! Conversion of host values into transport-safe JSON.
//!
//! The sanitizer walks a [`HostValue`] and produces a structural copy that can
//! cross the transport. Functions, class instances and subtrees nested beyond
//! the depth budget are replaced by [`Descriptor`]s, and the path of every
//! replacement is recorded so the receiving side can [`hydrate`] them.
//!
//! Rules, in precedence order:
//!
//! 1. functions become a function descriptor
//! 2. primitives pass through; long strings are cut
//! 3. fragments become a fixed string
//! 4. containers past the depth budget become a truncated descriptor
//! 5. arrays are sanitized element by element
//! 6. non-plain instances become an instance descriptor
//! 7. plain objects are sanitized field by field
//!
//! [`hydrate`]: devbridge_protocol::hydrate

use devbridge_protocol::{
	ContainerKind, Descriptor, ELLIPSIS, FRAGMENT_PLACEHOLDER, Path, PathSegment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::{HostObject, HostValue, Shape};

/// Size guards applied during sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeLimits {
	/// Deepest recursion level still copied; containers below it are truncated.
	pub max_depth: usize,
	/// Longest string, in characters, sent verbatim.
	pub max_string_len: usize,
}

impl Default for SanitizeLimits {
	fn default() -> Self {
		Self {
			max_depth: 2,
			max_string_len: 500,
		}
	}
}

/// Output of one sanitize pass over a root value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
	/// Transport-safe copy.
	pub value: Value,
	/// Paths replaced by descriptors. Disjoint: no entry lies below another.
	pub cleaned: Vec<Path>,
}

/// Stateless sanitizer parameterized by [`SanitizeLimits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
	limits: SanitizeLimits,
}

impl Sanitizer {
	pub fn new(limits: SanitizeLimits) -> Self {
		Self { limits }
	}

	pub fn limits(&self) -> SanitizeLimits {
		self.limits
	}

	/// Sanitizes a root value at depth 0.
	pub fn sanitize(&self, value: &HostValue) -> Sanitized {
		let mut cleaned = Vec::new();
		let value = self.sanitize_at(value, &mut Vec::new(), &mut cleaned, 0);
		Sanitized { value, cleaned }
	}

	/// Sanitizes `value` located at `path`, `level` containers below the root.
	///
	/// Replaced paths are appended to `cleaned`. `path` is restored to its
	/// original contents before returning.
	pub fn sanitize_at(
		&self,
		value: &HostValue,
		path: &mut Vec<PathSegment>,
		cleaned: &mut Vec<Path>,
		level: usize,
	) -> Value {
		let object = match value {
			HostValue::Object(object) => object,
			primitive => return self.primitive(primitive),
		};

		match object.shape() {
			Shape::Function => {
				cleaned.push(path.clone());
				Descriptor::Function {
					name: object.class_name().to_string(),
				}
				.into()
			}
			Shape::Fragment => Value::String(FRAGMENT_PLACEHOLDER.to_string()),
			_ if level > self.limits.max_depth => {
				cleaned.push(path.clone());
				truncated(&**object).into()
			}
			Shape::Array => Value::Array(
				object
					.enumerable_fields()
					.into_iter()
					.map(|(key, item)| self.child(&item, key, path, cleaned, level))
					.collect(),
			),
			Shape::Instance => {
				cleaned.push(path.clone());
				Descriptor::Instance {
					name: object.class_name().to_string(),
				}
				.into()
			}
			Shape::Plain => {
				let mut map = Map::new();
				for (key, field) in object.enumerable_fields() {
					let name = key.to_key();
					let sanitized = self.child(&field, key, path, cleaned, level);
					map.insert(name, sanitized);
				}
				Value::Object(map)
			}
		}
	}

	fn child(
		&self,
		value: &HostValue,
		key: PathSegment,
		path: &mut Vec<PathSegment>,
		cleaned: &mut Vec<Path>,
		level: usize,
	) -> Value {
		path.push(key);
		let sanitized = self.sanitize_at(value, path, cleaned, level + 1);
		path.pop();
		sanitized
	}

	fn primitive(&self, value: &HostValue) -> Value {
		match value {
			HostValue::Undefined | HostValue::Null => Value::Null,
			HostValue::Bool(b) => Value::Bool(*b),
			HostValue::Number(n) => number(n),
			HostValue::String(s) => Value::String(self.truncate(s)),
			// Objects are handled by the caller.
			HostValue::Object(_) => Value::Null,
		}
	}

	fn truncate(&self, s: &str) -> String {
		match s.char_indices().nth(self.limits.max_string_len) {
			Some((cut, _)) => format!("{}{ELLIPSIS}", &s[..cut]),
			None => s.to_string(),
		}
	}
}

/// Sanitizes a root value with the default limits.
pub fn sanitize(value: &HostValue) -> Sanitized {
	Sanitizer::default().sanitize(value)
}

fn truncated(object: &dyn HostObject) -> Descriptor {
	let kind = if object.shape() == Shape::Array {
		ContainerKind::Array
	} else {
		ContainerKind::Object
	};
	Descriptor::Truncated {
		kind,
		name: object.class_name().to_string(),
		length: object.length(),
	}
}

/// Integral values keep their integer wire form; NaN and infinities become null.
/// Integral floats are written as integers; integers pass through untouched.
fn number(n: &serde_json::Number) -> Value {
	match n.as_f64() {
		Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
		_ => Value::Number(n.clone()),
	}
}
