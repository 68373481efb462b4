use std::collections::HashSet;

use parking_lot::Mutex;

/// Which write the backend should receive for a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// First write to this key this run.
    Insert,
    /// The key has already been claimed by an earlier insert.
    Update,
}

/// Shared "written at least once" set coordinating insert-vs-update
/// decisions across concurrent workers.
///
/// The key is marked *before* the insert is attempted, so a concurrent
/// writer racing on the same key sees it as existing and issues an
/// update instead of a duplicate insert. Consequence: a failed insert
/// still leaves the key marked, and later writes to it become updates.
/// That is the intended trade-off, not a bookkeeping bug.
pub struct KeyExistenceSet {
    written: Mutex<HashSet<u64>>,
}

impl KeyExistenceSet {
    pub fn new() -> Self {
        Self {
            written: Mutex::new(HashSet::new()),
        }
    }

    /// Decide insert vs update for `id`. Check-then-mark is one critical
    /// section; two workers can never both see the same key as new.
    pub fn classify_write(&self, id: u64) -> WriteKind {
        if self.written.lock().insert(id) {
            WriteKind::Insert
        } else {
            WriteKind::Update
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.written.lock().contains(&id)
    }
}

impl Default for KeyExistenceSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_inserts_then_updates() {
        let set = KeyExistenceSet::new();
        assert_eq!(set.classify_write(7), WriteKind::Insert);
        assert_eq!(set.classify_write(7), WriteKind::Update);
        assert_eq!(set.classify_write(7), WriteKind::Update);
        assert_eq!(set.classify_write(8), WriteKind::Insert);
        assert!(set.contains(7));
        assert!(!set.contains(9));
    }

    #[test]
    fn concurrent_claims_yield_exactly_one_insert() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU64, Ordering};

        let set = Arc::new(KeyExistenceSet::new());
        let inserts = Arc::new(AtomicU64::new(0));
        std::thread::scope(|s| {
            for _ in 0..32 {
                let set = set.clone();
                let inserts = inserts.clone();
                s.spawn(move || {
                    if set.classify_write(42) == WriteKind::Insert {
                        inserts.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(inserts.load(Ordering::Relaxed), 1);
    }
}
