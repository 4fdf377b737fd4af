//! Statistics tracking for the index.

use core::sync::atomic::{AtomicUsize, Ordering};

/// Statistics for an index.
///
/// The tree is rebuilt wholesale by `load`, so the row count is only ever
/// set or cleared, never adjusted incrementally.
#[derive(Debug, Default)]
pub struct IndexStats {
    /// Total number of rows in the index.
    total_rows: AtomicUsize,
}

impl IndexStats {
    /// Creates a new empty stats instance.
    pub fn new() -> Self {
        Self {
            total_rows: AtomicUsize::new(0),
        }
    }

    /// Returns the total number of rows.
    pub fn total_rows(&self) -> usize {
        self.total_rows.load(Ordering::Relaxed)
    }

    /// Sets the total row count.
    pub fn set_total_rows(&self, count: usize) {
        self.total_rows.store(count, Ordering::Relaxed);
    }

    /// Resets the row count to zero.
    pub fn clear(&self) {
        self.total_rows.store(0, Ordering::Relaxed);
    }
}

impl Clone for IndexStats {
    fn clone(&self) -> Self {
        Self {
            total_rows: AtomicUsize::new(self.total_rows.load(Ordering::Relaxed)),
        }
    }
}
