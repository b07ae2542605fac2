//! Identity keys for context elements.
//!
//! A [`Key`] ties a context-element kind to the bridge that understands it.
//! Keys are compared by identity: two keys created with the same name are
//! still distinct. The name exists only for diagnostics.

use core::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// A process-wide identity token for one kind of context element.
///
/// Keys are cheap to copy and usable as map keys across unrelated element
/// types. Equality and hashing use the allocation identity, never the name.
#[derive(Clone, Copy)]
pub struct Key {
    id: u64,
    name: &'static str,
}

impl Key {
    /// Allocates a fresh key.
    ///
    /// Every call returns a distinct identity, including calls that pass
    /// the same `name`. Create each key once, at startup, and share it.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let id = NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed);
        Self { id, name }
    }

    /// The diagnostic name supplied at creation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}:{})", self.name, self.id)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(key: Key) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn keys_compare_by_identity_not_name() {
        let a = Key::new("same");
        let b = Key::new("same");

        assert_ne!(a, b);
        assert_ne!(hash_of(a), hash_of(b));
        assert_eq!(a, a);
    }

    #[test]
    fn copies_share_identity() {
        let a = Key::new("copied");
        let b = a;

        assert_eq!(a, b);
        assert_eq!(hash_of(a), hash_of(b));
    }

    #[test]
    fn name_is_preserved_for_diagnostics() {
        let key = Key::new("mdc");
        assert_eq!(key.name(), "mdc");
        assert_eq!(key.to_string(), "mdc");
    }
}
