//! Process-wide identifier interning.
//!
//! A [`Uid`] is an interned, identity-comparable token for a string. Two
//! `Uid`s produced from equal strings are the *same* entry, so equality and
//! hashing work on the entry address instead of the bytes. Entries live in a
//! lazily-initialized global table and are never destroyed; the table owns
//! the canonical string storage for the lifetime of the process.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use serde::{Serialize, Serializer};

/// Interned identifier. `Copy`, compared by identity.
#[derive(Clone, Copy)]
pub struct Uid(&'static UidEntry);

struct UidEntry {
    string: &'static str,
}

struct UidTable {
    entries: RwLock<HashMap<&'static str, &'static UidEntry>>,
}

static TABLE: OnceLock<UidTable> = OnceLock::new();

fn table() -> &'static UidTable {
    TABLE.get_or_init(|| UidTable {
        entries: RwLock::new(HashMap::new()),
    })
}

impl Uid {
    /// Interns `string`, returning its canonical identifier.
    ///
    /// Idempotent and thread-safe: interning the same string from any number
    /// of threads yields identifiers that compare equal by identity. The
    /// empty string interns like any other and acts as the sentinel
    /// identifier for empty input.
    pub fn intern(string: &str) -> Uid {
        let table = table();

        if let Some(entry) = table.entries.read().unwrap().get(string) {
            return Uid(entry);
        }

        // First insertion for this string. The write lock arbitrates racing
        // threads: exactly one allocates, the rest find the winner's entry.
        let mut entries = table.entries.write().unwrap();
        if let Some(entry) = entries.get(string) {
            return Uid(entry);
        }

        let owned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let entry: &'static UidEntry = Box::leak(Box::new(UidEntry { string: owned }));
        entries.insert(owned, entry);
        Uid(entry)
    }

    /// The exact byte sequence this identifier was interned from. The
    /// returned string is stable for the process lifetime.
    pub fn as_str(&self) -> &'static str {
        self.0.string
    }

    /// Length of the interned string in bytes.
    pub fn len(&self) -> usize {
        self.0.string.len()
    }

    /// Whether this is the sentinel (empty-string) identifier.
    pub fn is_empty(&self) -> bool {
        self.0.string.is_empty()
    }
}

/// Shorthand for [`Uid::intern`].
pub fn uid(string: &str) -> Uid {
    Uid::intern(string)
}

impl PartialEq for Uid {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Uid {}

impl std::hash::Hash for Uid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.0 as *const UidEntry as usize).hash(state);
    }
}

// Equal strings intern to the same entry, so ordering by string content is
// consistent with identity equality. Used for deterministic dumps.
impl PartialOrd for Uid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl std::fmt::Debug for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Uid({:?})", self.as_str())
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
