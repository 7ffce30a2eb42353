//! Scope tags: identity tokens that match a suspend request to the
//! continuation that must honor it.

use core::fmt;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};

/// Next tag id. Starts at 1 so ids fit in a `NonZeroU64`.
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity token for a continuation family.
///
/// Two tags compare equal only if one is a copy of the other; every call to
/// [`ScopeTag::new`] produces a tag distinct from all tags created before it
/// in this process.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeTag {
    id: NonZeroU64,
}

impl ScopeTag {
    /// Create a fresh tag.
    pub fn new() -> Self {
        let raw = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        // 2^64 tags would have to be minted for this to wrap
        let id = NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN);
        Self { id }
    }
}

impl Default for ScopeTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeTag(#{})", self.id)
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tags_are_unique() {
        let tags: HashSet<ScopeTag> = (0..1000).map(|_| ScopeTag::new()).collect();
        assert_eq!(tags.len(), 1000);
    }

    #[test]
    fn test_copies_compare_equal() {
        let tag = ScopeTag::new();
        let copy = tag;
        assert_eq!(tag, copy);
        assert_ne!(tag, ScopeTag::new());
    }

    #[test]
    fn test_display_shows_id_only() {
        let tag = ScopeTag::new();
        let shown = tag.to_string();
        assert!(shown.starts_with('#'));
        assert_eq!(format!("{tag:?}"), format!("ScopeTag({shown})"));
    }
}
