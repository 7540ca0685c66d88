//! Correlation of inspect requests with their responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use devbridge_protocol::{CallbackArgs, CallbackId};
use parking_lot::Mutex;

/// Pending continuation awaiting a `callback` message.
pub type Continuation = Box<dyn FnOnce(CallbackArgs) + Send>;

/// Pending continuations keyed by correlation id.
///
/// Ids are minted sequentially from 0 and never reused. Each continuation runs
/// at most once: it is removed from the map before being invoked.
#[derive(Default)]
pub struct CallbackRegistry {
	last_id: AtomicU64,
	pending: Mutex<HashMap<CallbackId, Continuation>>,
}

impl CallbackRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `continuation` and returns its correlation id.
	pub fn register<F>(&self, continuation: F) -> CallbackId
	where
		F: FnOnce(CallbackArgs) + Send + 'static,
	{
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		self.pending.lock().insert(id, Box::new(continuation));
		id
	}

	/// Removes and invokes the continuation for `id`.
	///
	/// Returns `false` for ids that are unknown or already resolved (replayed
	/// or duplicated responses); those are logged and otherwise ignored.
	pub fn resolve(&self, id: CallbackId, args: CallbackArgs) -> bool {
		let continuation = self.pending.lock().remove(&id);
		match continuation {
			Some(continuation) => {
				continuation(args);
				true
			}
			None => {
				tracing::debug!(id, "Callback for unknown id (ignored)");
				false
			}
		}
	}

	/// Number of requests still waiting for a response.
	pub fn len(&self) -> usize {
		self.pending.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.lock().is_empty()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::AtomicUsize;

	use serde_json::json;

	use super::*;

	#[test]
	fn test_ids_increment_from_zero() {
		let registry = CallbackRegistry::new();
		assert_eq!(registry.register(|_| {}), 0);
		assert_eq!(registry.register(|_| {}), 1);
		assert_eq!(registry.register(|_| {}), 2);
		assert_eq!(registry.len(), 3);
	}

	#[test]
	fn test_resolve_runs_once() {
		let registry = CallbackRegistry::new();
		let calls = Arc::new(AtomicUsize::new(0));
		let seen = Arc::clone(&calls);
		let id = registry.register(move |args| {
			assert_eq!(args.0, json!({"a": 1}));
			seen.fetch_add(1, Ordering::SeqCst);
		});

		let args = CallbackArgs(json!({"a": 1}), vec![], None, vec![]);
		assert!(registry.resolve(id, args.clone()));
		assert!(!registry.resolve(id, args));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(registry.is_empty());
	}

	#[test]
	fn test_unknown_id_is_ignored() {
		let registry = CallbackRegistry::new();
		assert!(!registry.resolve(99, CallbackArgs::empty()));
	}

	#[test]
	fn test_continuation_may_register_again() {
		let registry = Arc::new(CallbackRegistry::new());
		let inner = Arc::clone(&registry);
		let id = registry.register(move |_| {
			inner.register(|_| {});
		});
		assert!(registry.resolve(id, CallbackArgs::empty()));
		assert_eq!(registry.len(), 1);
	}
}
