//! Tanoak Index - a bulk-loaded B+Tree index.
//!
//! The tree is static: `load` builds every level bottom-up from a complete
//! key/value batch, and `get_vals` answers half-open range queries
//! `[lower, upper)` by descending to the correct leaf and scanning forward
//! across the leaf chain. There is no incremental insertion or deletion;
//! a second `load` replaces the tree wholesale.
//!
//! # Example
//!
//! ```rust
//! use tanoak_index::BTreeIndex;
//!
//! let mut tree = BTreeIndex::default();
//! let keys: Vec<i64> = (0..10).map(|i| i * 5).collect();
//! let values: Vec<u64> = (0..10).collect();
//! tree.load(&keys, &values).unwrap();
//!
//! // Values for keys in [5, 11): keys 5 and 10.
//! assert_eq!(tree.get_vals(5, 11).unwrap(), vec![1, 2]);
//! ```

#![no_std]

extern crate alloc;

pub mod btree;
pub mod error;
pub mod stats;

pub use btree::{BTreeIndex, Key, Node, NodeId, NodePayload, RowId, DEFAULT_FAN_OUT, NULL_NODE};
pub use error::{IndexError, Result};
pub use stats::IndexStats;
