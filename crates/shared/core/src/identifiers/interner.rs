//! Append-only string interning shared by the identifier types.

use std::sync::Arc;

use dashmap::DashSet;

/// An append-only pool of reference-counted strings.
///
/// Interning the same content twice yields handles to the same allocation,
/// so identifier copies are a pointer bump and equality can short-circuit
/// on pointer identity. Entries are never removed while the process lives.
pub struct Interner {
    pool: DashSet<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            pool: DashSet::new(),
        }
    }

    /// Intern `value`, returning the pooled allocation.
    pub fn intern(&self, value: &str) -> Arc<str> {
        if let Some(existing) = self.pool.get(value) {
            return (*existing).clone();
        }
        let entry: Arc<str> = Arc::from(value);
        self.pool.insert(entry.clone());
        // A concurrent insert may have won the race; hand out whichever
        // allocation the pool retained.
        self.pool
            .get(value)
            .map(|pooled| (*pooled).clone())
            .unwrap_or(entry)
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
