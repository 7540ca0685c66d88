//! Registry of inspectable roots by id.
//!
//! Uses [`DashMap`] so the flush path and the inspect responder can touch it
//! without a shared lock. Entries are inserted whenever a sanitize pass over a
//! root replaced at least one subtree, and live until [`forget`] is called;
//! nothing is evicted implicitly.
//!
//! [`forget`]: InspectableRegistry::forget

use std::sync::Arc;

use dashmap::DashMap;

use crate::value::HostValue;

/// Map from caller-chosen root id to the original, unsanitized root.
#[derive(Default)]
pub struct InspectableRegistry {
	roots: DashMap<Arc<str>, HostValue>,
}

impl InspectableRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `value` under `id`, replacing any previous root.
	pub fn insert(&self, id: &str, value: HostValue) {
		self.roots.insert(Arc::from(id), value);
	}

	/// Evicts `id`. Returns whether it was present.
	pub fn forget(&self, id: &str) -> bool {
		self.roots.remove(id).is_some()
	}

	/// Synchronous lookup.
	pub fn get(&self, id: &str) -> Option<HostValue> {
		self.roots.get(id).map(|r| r.value().clone())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.roots.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.roots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}
}
