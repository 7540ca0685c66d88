//! Paths into nested values.
//!
//! A [`Path`] is a root-relative list of [`PathSegment`]s. On the wire it is a
//! JSON array mixing strings (property keys) and non-negative integers (array
//! indices), e.g. `["props", "children", 0]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root-relative location inside a nested value.
pub type Path = Vec<PathSegment>;

/// One step of a [`Path`]: a property key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
	/// Array index.
	Index(usize),
	/// Property key.
	Key(String),
}

impl PathSegment {
	/// Returns the segment as an array index.
	///
	/// String keys that spell a decimal index (`"3"`) resolve as indices too,
	/// since the inspect request sends every segment as a string.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			PathSegment::Index(i) => Some(*i),
			PathSegment::Key(k) => k.parse().ok(),
		}
	}

	/// Returns the segment as a property key.
	pub fn to_key(&self) -> String {
		match self {
			PathSegment::Index(i) => i.to_string(),
			PathSegment::Key(k) => k.clone(),
		}
	}

	/// Looks the segment up in a wire value.
	pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
		match value {
			Value::Array(items) => self.as_index().and_then(|i| items.get(i)),
			Value::Object(map) => match self {
				PathSegment::Key(k) => map.get(k),
				PathSegment::Index(i) => map.get(&i.to_string()),
			},
			_ => None,
		}
	}

	/// Mutable variant of [`get`](Self::get).
	pub fn get_mut<'a>(&self, value: &'a mut Value) -> Option<&'a mut Value> {
		match value {
			Value::Array(items) => self.as_index().and_then(move |i| items.get_mut(i)),
			Value::Object(map) => match self {
				PathSegment::Key(k) => map.get_mut(k),
				PathSegment::Index(i) => map.get_mut(&i.to_string()),
			},
			_ => None,
		}
	}
}

impl fmt::Display for PathSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathSegment::Index(i) => write!(f, "{i}"),
			PathSegment::Key(k) => f.write_str(k),
		}
	}
}

impl From<usize> for PathSegment {
	fn from(index: usize) -> Self {
		PathSegment::Index(index)
	}
}

impl From<&str> for PathSegment {
	fn from(key: &str) -> Self {
		PathSegment::Key(key.to_string())
	}
}

impl From<String> for PathSegment {
	fn from(key: String) -> Self {
		PathSegment::Key(key)
	}
}

/// Walks `path` from `root`, returning `None` at the first absent segment.
pub fn get_in<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
	path.iter().try_fold(root, |value, segment| segment.get(value))
}

/// Mutable variant of [`get_in`].
pub fn get_in_mut<'a>(root: &'a mut Value, path: &[PathSegment]) -> Option<&'a mut Value> {
	path.iter().try_fold(root, |value, segment| segment.get_mut(value))
}

/// Builds a [`Path`] from mixed keys and indices.
///
/// ```ignore
/// let p = path!["items", 0, "name"];
/// ```
#[macro_export]
macro_rules! path {
	($($seg:expr),* $(,)?) => {
		vec![$($crate::PathSegment::from($seg)),*]
	};
}
