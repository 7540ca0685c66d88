//! Receiving-side rehydration of replaced subtrees.

use serde_json::Value;

use crate::descriptor::Placeholder;
use crate::path::{Path, get_in_mut};

/// Replaces every descriptor at `cleaned` in `root` with a [`Placeholder`].
///
/// Paths are independent of each other: sanitization never lists a path below
/// another replaced path. A path whose parent is absent, or whose final slot
/// is absent, is skipped.
pub fn hydrate(root: &mut Value, cleaned: &[Path]) {
	for path in cleaned {
		let Some((last, parents)) = path.split_last() else {
			// The root itself was replaced.
			*root = Placeholder::from_wire(root).to_value();
			continue;
		};
		let Some(slot) = get_in_mut(root, parents).and_then(|parent| last.get_mut(parent)) else {
			continue;
		};
		if slot.is_null() {
			continue;
		}
		*slot = Placeholder::from_wire(slot).to_value();
	}
}
