//! Bulk-loaded B+Tree index.
//!
//! The tree is built bottom-up from a complete sorted batch and answers
//! half-open range queries over a sibling-linked leaf chain.

mod node;
mod tree;

pub use node::{Key, Node, NodePayload, NodeId, RowId, NULL_NODE};
pub use tree::{log_node, BTreeIndex, DEFAULT_FAN_OUT};
