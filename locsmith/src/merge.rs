//! Merge/reconciliation of freshly translated keys into the existing
//! target representation.
//!
//! The merged map iterates the *current source* key set, so keys removed
//! from the source drop out of the target, arrays truncate to their new
//! length, and output key order always follows the source. Untouched keys
//! keep their previous translated value byte-for-byte.

use crate::debug::debug;
use crate::flatten::FlatMap;

/// Overlay `fresh` translations onto `previous_target`, scoped to the keys
/// of `source`. Keys with neither a fresh nor a previous value (for
/// example, keys whose translation stayed unresolved on a brand-new file)
/// are omitted rather than blanked.
pub fn merge_flat_maps(
    source: &FlatMap,
    previous_target: Option<&FlatMap>,
    fresh: &FlatMap,
) -> FlatMap {
    let mut merged = FlatMap::new();

    for key in source.keys() {
        let fresh_value = fresh.get(key);
        let previous_value = previous_target.and_then(|prev| prev.get(key));

        match (fresh_value, previous_value) {
            (Some(new), Some(old)) if new != old => {
                // Current-run data wins on conflict.
                debug(format!("merge: `{}` replaced by current run", key));
                merged.insert(key.clone(), new.clone());
            }
            (Some(new), _) => {
                merged.insert(key.clone(), new.clone());
            }
            (None, Some(old)) => {
                merged.insert(key.clone(), old.clone());
            }
            (None, None) => {}
        }
    }

    merged
}
