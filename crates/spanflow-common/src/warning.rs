//! Deduplicated warnings routed through the `log` facade.
//!
//! The layout engine clamps bad input instead of failing (negative widths,
//! cursor positions past the end of the text). Those clamps can happen on
//! every frame, so each distinct message is only logged once.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log a warning once per unique `component`/`message` pair.
///
/// Returns `true` if the warning was emitted, `false` if it was a repeat.
///
/// # Example
/// ```
/// use spanflow_common::warning::warn_once;
///
/// let first = warn_once("flow", "negative max_width clamped to 0");
/// let again = warn_once("flow", "negative max_width clamped to 0");
/// assert!(first);
/// assert!(!again);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let is_new = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if is_new {
        log::warn!(target: "spanflow", "[{component}] {message}");
    }
    is_new
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates_per_component() {
        assert!(warn_once("test-a", "dedup message"));
        assert!(!warn_once("test-a", "dedup message"));
        // Same text under another component is a different warning.
        assert!(warn_once("test-b", "dedup message"));
    }
}
