//! B+Tree node definitions and the in-node lower-bound search.

use alloc::vec;
use alloc::vec::Vec;

/// Key type stored in the tree.
pub type Key = i64;

/// Row identifier stored in leaf nodes.
pub type RowId = u64;

/// Node identifier in the B+Tree arena.
pub type NodeId = usize;

/// Sentinel value for empty child slots.
pub const NULL_NODE: NodeId = usize::MAX;

/// Per-kind payload of a node.
///
/// Both variants carry `fan_out + 1` slots: an internal node addresses one
/// more child than it has keys (the rightmost edge slot), and a leaf keeps
/// the same physical capacity.
#[derive(Clone, Debug)]
pub enum NodePayload {
    /// Row IDs associated with each key slot.
    Leaf(Vec<RowId>),
    /// Child node IDs; slots without a child hold [`NULL_NODE`].
    Internal(Vec<NodeId>),
}

/// A node in the B+Tree.
///
/// `keys` is zero-initialized with one spare slot beyond the fan-out: the
/// lower-bound search is called with `high == count` and may probe the slot
/// at `count`, which must stay in bounds even on a full node.
#[derive(Clone, Debug)]
pub struct Node {
    /// Key slots; `keys[0..count]` are populated.
    pub keys: Vec<Key>,
    /// Values (leaf) or child IDs (internal).
    pub payload: NodePayload,
    /// Number of populated key slots.
    pub count: usize,
    /// Previous sibling on the same level.
    pub prev: Option<NodeId>,
    /// Next sibling on the same level.
    pub next: Option<NodeId>,
    /// Whether this node is the tree root.
    pub is_root: bool,
}

impl Node {
    /// Creates a new empty leaf node.
    pub fn leaf(fan_out: usize) -> Self {
        Self {
            keys: vec![0; fan_out + 1],
            payload: NodePayload::Leaf(vec![0; fan_out + 1]),
            count: 0,
            prev: None,
            next: None,
            is_root: false,
        }
    }

    /// Creates a new empty internal node.
    pub fn internal(fan_out: usize) -> Self {
        Self {
            keys: vec![0; fan_out + 1],
            payload: NodePayload::Internal(vec![NULL_NODE; fan_out + 1]),
            count: 0,
            prev: None,
            next: None,
            is_root: false,
        }
    }

    /// Returns true if this is a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self.payload, NodePayload::Leaf(_))
    }

    /// Row ID slots of a leaf; empty for an internal node.
    pub fn values(&self) -> &[RowId] {
        match &self.payload {
            NodePayload::Leaf(values) => values,
            NodePayload::Internal(_) => &[],
        }
    }

    /// Mutable row ID slots of a leaf.
    pub fn values_mut(&mut self) -> &mut [RowId] {
        match &mut self.payload {
            NodePayload::Leaf(values) => values,
            NodePayload::Internal(_) => &mut [],
        }
    }

    /// Child ID slots of an internal node; empty for a leaf.
    pub fn children(&self) -> &[NodeId] {
        match &self.payload {
            NodePayload::Internal(children) => children,
            NodePayload::Leaf(_) => &[],
        }
    }

    /// Mutable child ID slots of an internal node.
    pub fn children_mut(&mut self) -> &mut [NodeId] {
        match &mut self.payload {
            NodePayload::Internal(children) => children,
            NodePayload::Leaf(_) => &mut [],
        }
    }

    /// A recursive binary search over the keys in a node. Returns the
    /// position of the highest lower bound, e.g. for `[2, 4, 6]` a search
    /// for key 5 returns 1.
    ///
    /// Callers pass `high == count`, not `count - 1`. An exact match wins
    /// immediately, even when equal keys exist further left; a key below
    /// every populated key returns position 0, so callers that need a true
    /// lower bound must compare the stored key against the search key.
    /// Returns `None` only when the range inverts (empty search range).
    pub fn binary_search(&self, low: usize, high: usize, key: Key) -> Option<usize> {
        if low > high {
            // Lower bound not found.
            return None;
        }
        let mid = low + (high - low) / 2;
        log::trace!("binary search mid {}", mid);
        if self.keys[mid] == key {
            Some(mid)
        } else if mid == high && mid > 0 && self.keys[mid - 1] <= key {
            // Top of the current half: the slot below is the lower bound.
            Some(mid - 1)
        } else if self.keys[mid] > key {
            if mid == 0 {
                Some(mid)
            } else if self.keys[mid - 1] < key {
                Some(mid - 1)
            } else {
                self.binary_search(low, mid - 1, key)
            }
        } else {
            self.binary_search(mid + 1, high, key)
        }
    }
}
