//! Host value model.
//!
//! Values living in the inspected context are exposed to the bridge through
//! [`HostValue`]. Leaves are plain primitives; everything else is a shared
//! handle to a [`HostObject`], the field-provider capability a host type
//! implements so the sanitizer and the inspector can walk it.
//!
//! [`HostNode`] is a ready-made [`HostObject`] covering functions, arrays, plain
//! objects, class instances and fragments, and is what JSON input converts to.

use std::fmt;
use std::sync::Arc;

use devbridge_protocol::PathSegment;
use downcast_rs::{DowncastSync, impl_downcast};
use indexmap::IndexMap;
use serde_json::Value;

/// Class name reported by plain structured objects.
pub const PLAIN_CLASS: &str = "Object";

/// JSON objects carrying a truthy value under this key convert to a fragment.
pub const FRAGMENT_MARKER: &str = "_reactFragment";

/// Runtime category of a [`HostObject`], driving how it is sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
	/// Callable value. Always replaced by a function descriptor.
	Function,
	/// Ordered sequence whose fields are its elements.
	Array,
	/// Plain structured object; sanitized field by field.
	Plain,
	/// Instance of a non-plain class; replaced by an instance descriptor.
	Instance,
	/// Opaque framework fragment; replaced by a fixed string.
	Fragment,
}

/// Field provider for a value in the inspected context.
pub trait HostObject: DowncastSync {
	fn shape(&self) -> Shape;

	/// Constructor name; the function name for [`Shape::Function`].
	fn class_name(&self) -> &str;

	/// Length or size, for containers that have one.
	fn length(&self) -> Option<usize> {
		None
	}

	/// Own enumerable fields in iteration order (elements for arrays).
	fn enumerable_fields(&self) -> Vec<(PathSegment, HostValue)>;

	/// All own property names, including non-enumerable ones.
	fn own_property_names(&self) -> Vec<PathSegment> {
		self.enumerable_fields()
			.into_iter()
			.map(|(key, _)| key)
			.collect()
	}

	/// Own property lookup.
	fn get(&self, key: &PathSegment) -> Option<HostValue>;

	/// One-level base field set, if the value has one.
	fn prototype(&self) -> Option<Arc<dyn HostObject>> {
		None
	}
}
impl_downcast!(sync HostObject);

/// A value in the inspected context.
///
/// Cloning shares the underlying object: two clones of an `Object` are the
/// same identity (see [`same_object`](Self::same_object)).
#[derive(Clone, Default)]
pub enum HostValue {
	#[default]
	Undefined,
	Null,
	Bool(bool),
	/// Integers keep their exact value; non-finite floats have no representation.
	Number(serde_json::Number),
	String(String),
	Object(Arc<dyn HostObject>),
}

impl HostValue {
	pub fn function(name: impl Into<String>) -> Self {
		HostNode::function(name).into()
	}

	pub fn array(items: impl IntoIterator<Item = HostValue>) -> Self {
		HostNode::array(items).into()
	}

	pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, HostValue)>) -> Self {
		HostNode::object(fields).into()
	}

	pub fn instance<K: Into<String>>(
		class_name: impl Into<String>,
		fields: impl IntoIterator<Item = (K, HostValue)>,
	) -> Self {
		HostNode::instance(class_name, fields).into()
	}

	pub fn fragment() -> Self {
		HostNode::fragment().into()
	}

	/// Wraps a custom [`HostObject`].
	pub fn from_object(object: impl HostObject) -> Self {
		HostValue::Object(Arc::new(object))
	}

	pub fn as_object(&self) -> Option<&Arc<dyn HostObject>> {
		match self {
			HostValue::Object(object) => Some(object),
			_ => None,
		}
	}

	/// Downcasts an object value to its concrete host type.
	pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
		self.as_object().and_then(|object| (**object).downcast_ref::<T>())
	}

	/// Returns true if both values are the same object.
	pub fn same_object(&self, other: &HostValue) -> bool {
		match (self, other) {
			(HostValue::Object(a), HostValue::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}

	/// Own property lookup; primitives have none.
	pub fn get(&self, key: &PathSegment) -> Option<HostValue> {
		self.as_object().and_then(|object| object.get(key))
	}

	/// Walks `path`, returning `None` at the first absent segment.
	pub fn get_in(&self, path: &[PathSegment]) -> Option<HostValue> {
		path.iter()
			.try_fold(self.clone(), |value, segment| value.get(segment))
	}

	/// Root id carried by the value's own `id` field.
	///
	/// String ids are used verbatim; integral numbers in decimal.
	pub fn root_id(&self) -> Option<String> {
		match self.get(&PathSegment::Key("id".into()))? {
			HostValue::String(id) => Some(id),
			HostValue::Number(n) => match n.as_f64() {
				Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
					Some(format!("{}", f as i64))
				}
				_ => Some(n.to_string()),
			},
			_ => None,
		}
	}
}

impl fmt::Debug for HostValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			HostValue::Undefined => f.write_str("Undefined"),
			HostValue::Null => f.write_str("Null"),
			HostValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			HostValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
			HostValue::String(s) => f.debug_tuple("String").field(s).finish(),
			HostValue::Object(object) => f
				.debug_struct("Object")
				.field("shape", &object.shape())
				.field("class", &object.class_name())
				.finish(),
		}
	}
}

impl From<bool> for HostValue {
	fn from(b: bool) -> Self {
		HostValue::Bool(b)
	}
}

/// NaN and the infinities become [`HostValue::Null`].
impl From<f64> for HostValue {
	fn from(n: f64) -> Self {
		serde_json::Number::from_f64(n).map_or(HostValue::Null, HostValue::Number)
	}
}

impl From<i64> for HostValue {
	fn from(n: i64) -> Self {
		HostValue::Number(n.into())
	}
}

impl From<u64> for HostValue {
	fn from(n: u64) -> Self {
		HostValue::Number(n.into())
	}
}

impl From<&str> for HostValue {
	fn from(s: &str) -> Self {
		HostValue::String(s.to_string())
	}
}

impl From<String> for HostValue {
	fn from(s: String) -> Self {
		HostValue::String(s)
	}
}

impl From<HostNode> for HostValue {
	fn from(node: HostNode) -> Self {
		HostValue::Object(Arc::new(node))
	}
}

impl From<Value> for HostValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => HostValue::Null,
			Value::Bool(b) => HostValue::Bool(b),
			Value::Number(n) => HostValue::Number(n),
			Value::String(s) => HostValue::String(s),
			Value::Array(items) => HostValue::array(items.into_iter().map(HostValue::from)),
			Value::Object(map)
				if map
					.get(FRAGMENT_MARKER)
					.is_some_and(|marker| !matches!(marker, Value::Null | Value::Bool(false))) =>
			{
				HostValue::fragment()
			}
			Value::Object(map) => {
				HostValue::object(map.into_iter().map(|(k, v)| (k, HostValue::from(v))))
			}
		}
	}
}

/// General-purpose [`HostObject`] built from owned fields.
pub struct HostNode {
	shape: Shape,
	class_name: String,
	items: Vec<HostValue>,
	fields: IndexMap<String, HostValue>,
	hidden: IndexMap<String, HostValue>,
	prototype: Option<Arc<dyn HostObject>>,
}

impl HostNode {
	fn with_shape(shape: Shape, class_name: impl Into<String>) -> Self {
		Self {
			shape,
			class_name: class_name.into(),
			items: Vec::new(),
			fields: IndexMap::new(),
			hidden: IndexMap::new(),
			prototype: None,
		}
	}

	/// A function; its name is also exposed as a non-enumerable `name` property.
	pub fn function(name: impl Into<String>) -> Self {
		let name = name.into();
		Self::with_shape(Shape::Function, name.clone()).with_hidden("name", HostValue::String(name))
	}

	pub fn array(items: impl IntoIterator<Item = HostValue>) -> Self {
		Self {
			items: items.into_iter().collect(),
			..Self::with_shape(Shape::Array, "Array")
		}
	}

	pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, HostValue)>) -> Self {
		Self::instance(PLAIN_CLASS, fields)
	}

	/// An instance of `class_name`; a class name of `"Object"` yields a plain object.
	pub fn instance<K: Into<String>>(
		class_name: impl Into<String>,
		fields: impl IntoIterator<Item = (K, HostValue)>,
	) -> Self {
		let class_name = class_name.into();
		let shape = if class_name == PLAIN_CLASS {
			Shape::Plain
		} else {
			Shape::Instance
		};
		Self {
			fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
			..Self::with_shape(shape, class_name)
		}
	}

	pub fn fragment() -> Self {
		Self::with_shape(Shape::Fragment, PLAIN_CLASS)
	}

	/// Adds a non-enumerable own property.
	pub fn with_hidden(mut self, key: impl Into<String>, value: HostValue) -> Self {
		self.hidden.insert(key.into(), value);
		self
	}

	/// Sets the one-level base field set.
	pub fn with_prototype(mut self, prototype: impl HostObject) -> Self {
		self.prototype = Some(Arc::new(prototype));
		self
	}
}

impl HostObject for HostNode {
	fn shape(&self) -> Shape {
		self.shape
	}

	fn class_name(&self) -> &str {
		&self.class_name
	}

	fn length(&self) -> Option<usize> {
		(self.shape == Shape::Array).then_some(self.items.len())
	}

	fn enumerable_fields(&self) -> Vec<(PathSegment, HostValue)> {
		if self.shape == Shape::Array {
			return self
				.items
				.iter()
				.enumerate()
				.map(|(i, v)| (PathSegment::Index(i), v.clone()))
				.collect();
		}
		self.fields
			.iter()
			.map(|(k, v)| (PathSegment::Key(k.clone()), v.clone()))
			.collect()
	}

	fn own_property_names(&self) -> Vec<PathSegment> {
		let mut names: Vec<PathSegment> = self
			.enumerable_fields()
			.into_iter()
			.map(|(key, _)| key)
			.collect();
		names.extend(self.hidden.keys().cloned().map(PathSegment::Key));
		names
	}

	fn get(&self, key: &PathSegment) -> Option<HostValue> {
		if self.shape == Shape::Array {
			if let Some(item) = key.as_index().and_then(|i| self.items.get(i)) {
				return Some(item.clone());
			}
		}
		let key = key.to_key();
		self.fields
			.get(&key)
			.or_else(|| self.hidden.get(&key))
			.cloned()
	}

	fn prototype(&self) -> Option<Arc<dyn HostObject>> {
		self.prototype.clone()
	}
}
