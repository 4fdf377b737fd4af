//! Bulk-loaded B+Tree: construction and range queries.

use super::node::{Key, Node, NodeId, NodePayload, RowId, NULL_NODE};
use crate::error::{IndexError, Result};
use crate::stats::IndexStats;
use alloc::vec::Vec;

/// Default fan-out (maximum keys per node).
pub const DEFAULT_FAN_OUT: usize = 80;

/// A bulk-loaded B+Tree index for half-open range queries.
///
/// The tree is static: [`BTreeIndex::load`] sorts the batch, packs the leaf
/// chain, then builds internal levels bottom-up until a single root remains.
/// Queries are read-only; a second `load` discards the previous tree
/// entirely rather than grafting new data in.
#[derive(Debug)]
pub struct BTreeIndex {
    /// Arena of all nodes.
    arena: Vec<Node>,
    /// Root node ID; `None` until a non-empty batch is loaded.
    root: Option<NodeId>,
    /// Maximum number of keys per node.
    fan_out: usize,
    /// Statistics for this index.
    stats: IndexStats,
}

impl BTreeIndex {
    /// Creates a new empty index with the given fan-out.
    ///
    /// # Panics
    ///
    /// Panics if `fan_out < 3`: internal nodes spill at `fan_out - 1` keys,
    /// so each level must hold at least two entries per node for the build
    /// loop to terminate.
    pub fn new(fan_out: usize) -> Self {
        assert!(fan_out >= 3, "fan-out must be at least 3");
        Self {
            arena: Vec::new(),
            root: None,
            fan_out,
            stats: IndexStats::new(),
        }
    }

    /// Returns the fan-out this index was built with.
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Returns the statistics for this index.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Returns the number of entries in the index.
    pub fn len(&self) -> usize {
        self.stats.total_rows()
    }

    /// Returns true if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of nodes in the tree, all levels included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Allocates a new node in the arena and returns its ID.
    fn alloc_node(arena: &mut Vec<Node>, node: Node) -> NodeId {
        let id = arena.len();
        arena.push(node);
        id
    }

    /// Loads the index with the given keys and values. The batches must
    /// have the same length and do not need to be sorted; equal keys keep
    /// their relative input order. Any previously loaded tree is replaced,
    /// and kept untouched if loading fails.
    pub fn load(&mut self, keys: &[Key], values: &[RowId]) -> Result<()> {
        if keys.len() != values.len() {
            return Err(IndexError::length_mismatch(keys.len(), values.len()));
        }

        // Sort both batches through a key-driven permutation; the stable
        // sort keeps duplicate keys in input order.
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by_key(|&i| keys[i]);
        let sorted_keys: Vec<Key> = order.iter().map(|&i| keys[i]).collect();
        let sorted_values: Vec<RowId> = order.iter().map(|&i| values[i]).collect();

        if sorted_keys.is_empty() {
            self.arena = Vec::new();
            self.root = None;
            self.stats.clear();
            return Ok(());
        }

        // Build into a fresh arena so the previous tree survives a failure.
        let mut arena = Vec::new();
        let mut head = Self::build_leaves(&mut arena, self.fan_out, &sorted_keys, &sorted_values)?;
        log_node(&arena[head]);

        loop {
            let (layer_head, nodes_in_layer) = Self::build_layer(&mut arena, self.fan_out, head)?;
            log::debug!("nodes in layer: {}", nodes_in_layer);
            head = layer_head;
            if nodes_in_layer == 0 {
                arena[head].is_root = true;
                break;
            }
        }

        self.arena = arena;
        self.root = Some(head);
        self.stats.set_total_rows(sorted_keys.len());
        Ok(())
    }

    /// Builds the leaf chain for a sorted batch and returns the head leaf.
    ///
    /// Entries are packed in order, `fan_out` per leaf; when a leaf fills,
    /// a fresh one is allocated and linked via `next`.
    fn build_leaves(
        arena: &mut Vec<Node>,
        fan_out: usize,
        keys: &[Key],
        values: &[RowId],
    ) -> Result<NodeId> {
        let mut curr = Self::alloc_node(arena, Node::leaf(fan_out));
        let head = curr;

        let mut slot = 0;
        for (&key, &value) in keys.iter().zip(values) {
            // Allocate the successor only when an entry needs it, so a
            // batch that is an exact multiple of the fan-out does not leave
            // an empty leaf at the end of the chain.
            if slot == fan_out {
                slot = 0;
                let next = Self::alloc_node(arena, Node::leaf(fan_out));
                arena[curr].next = Some(next);
                curr = next;
            }

            if arena[curr].count > fan_out {
                return Err(IndexError::node_overflow(fan_out));
            }
            let node = &mut arena[curr];
            node.keys[slot] = key;
            node.values_mut()[slot] = value;
            node.count += 1;
            slot += 1;
        }

        Ok(head)
    }

    /// Builds one internal level over a linked node chain.
    ///
    /// Returns the head of the new parent chain and the number of parents
    /// created beyond the first; zero tells the caller the head is the root.
    fn build_layer(arena: &mut Vec<Node>, fan_out: usize, head: NodeId) -> Result<(NodeId, usize)> {
        let mut curr = Self::alloc_node(arena, Node::internal(fan_out));
        let first = curr;
        let mut nodes_in_layer = 0;

        let mut slot = 0;
        let mut walk = Some(head);
        while let Some(input) = walk {
            if arena[curr].count > fan_out {
                return Err(IndexError::node_overflow(fan_out));
            }
            if arena[curr].count == fan_out - 1 {
                // The spare child slot keeps the incoming node's own sibling
                // link; queries never read it.
                let stash = arena[input].next.unwrap_or(NULL_NODE);
                arena[curr].children_mut()[fan_out] = stash;

                let next = Self::alloc_node(arena, Node::internal(fan_out));
                arena[next].prev = Some(curr);
                arena[curr].next = Some(next);
                curr = next;
                slot = 0;
                nodes_in_layer += 1;
            }

            let separator = arena[input].keys[0];
            let sibling = arena[input].next;
            let node = &mut arena[curr];
            node.children_mut()[slot] = input;
            node.keys[slot] = separator;
            node.count += 1;
            slot += 1;
            walk = sibling;
        }

        Ok((first, nodes_in_layer))
    }

    /// Gets values for keys in range `[lower, upper)`; note that `upper` is
    /// non-inclusive. Values come back in ascending key order, with
    /// duplicate keys in their original input order.
    pub fn get_vals(&self, lower: Key, upper: Key) -> Result<Vec<RowId>> {
        let mut result = Vec::new();
        let Some(root) = self.root else {
            return Ok(result);
        };

        // Descend to the leftmost leaf that could contain `lower`.
        let mut node_id = root;
        while !self.arena[node_id].is_leaf() {
            let node = &self.arena[node_id];
            let Some(mut idx) = node.binary_search(0, node.count, lower) else {
                log::error!("node binary search failed");
                return Err(IndexError::SearchFailed);
            };
            // Duplicate separators can point past the earliest matching
            // child; walk back to the first subtree that could hold `lower`.
            while idx > 0 && node.keys[idx] >= lower {
                idx -= 1;
            }
            node_id = node.children()[idx];
        }

        let leaf = &self.arena[node_id];
        let Some(mut idx) = leaf.binary_search(0, leaf.count, lower) else {
            log::error!("node binary search failed");
            return Err(IndexError::SearchFailed);
        };
        // Needs idx > 0 before looking at the slot below.
        while idx > 0 && leaf.keys[idx - 1] >= lower {
            idx -= 1;
        }

        // The lower bound falls past the rightmost leaf's last key: no key
        // in the tree is in range. The search position alone cannot decide
        // this; it points at the rightmost key at or below `lower`, and
        // larger in-range keys may still sit later in the leaf.
        if leaf.next.is_none() && leaf.keys[leaf.count - 1] < lower {
            return Ok(result);
        }

        let mut walk = Some(node_id);
        while let Some(id) = walk {
            let node = &self.arena[id];
            let values = node.values();
            for i in idx..node.count {
                let key = node.keys[i];
                if key >= lower && key < upper {
                    result.push(values[i]);
                }
            }
            // Once a leaf's maximum key reaches `upper` no later leaf can
            // match.
            if node.count > 0 && node.keys[node.count - 1] >= upper {
                log::trace!(
                    "range scan stopping, {} >= {}",
                    node.keys[node.count - 1],
                    upper
                );
                break;
            }
            log::trace!("range scan traversing right");
            walk = node.next;
            idx = 0;
        }

        Ok(result)
    }

    /// Inserts a single key/value pair.
    ///
    /// Not yet supported: the tree is rebuilt wholesale with
    /// [`BTreeIndex::load`].
    pub fn insert(&mut self, _key: Key, _value: RowId) -> Result<()> {
        Err(IndexError::unsupported("insert"))
    }

    /// Traverses the tree breadth-first, applying `visit` to every node
    /// reachable from the root: each node exactly once, parents before
    /// children, left to right within a level. Intended for diagnostics.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&Node),
    {
        let Some(root) = self.root else {
            return;
        };

        let mut queue: Vec<NodeId> = Vec::new();
        queue.push(root);
        let mut curr = 0;
        while curr < queue.len() {
            let node = &self.arena[queue[curr]];
            if let NodePayload::Internal(children) = &node.payload {
                // `count` keys imply `count + 1` child slots; unset slots
                // are skipped.
                for &child in children.iter().take(node.count + 1) {
                    if child != NULL_NODE {
                        queue.push(child);
                    }
                }
            }
            curr += 1;
            visit(node);
        }
    }
}

impl Default for BTreeIndex {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_OUT)
    }
}

/// Logs a node's metadata and populated slots at debug level.
pub fn log_node(node: &Node) {
    if node.is_leaf() {
        log::debug!(
            "META: is_leaf {}, count: {}, keys: {:?}, vals: {:?}",
            node.is_leaf(),
            node.count,
            &node.keys[..node.count],
            &node.values()[..node.count],
        );
    } else {
        log::debug!(
            "META: is_leaf {}, count: {}, keys: {:?}, pointers: {:?}",
            node.is_leaf(),
            node.count,
            &node.keys[..node.count],
            &node.children()[..node.count],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn load_multiples_of_five(count: usize) -> BTreeIndex {
        let keys: Vec<Key> = (0..count).map(|i| (i * 5) as Key).collect();
        let values: Vec<RowId> = (0..count).map(|i| i as RowId).collect();
        let mut tree = BTreeIndex::default();
        tree.load(&keys, &values).unwrap();
        tree
    }

    #[test]
    fn test_empty_batch() {
        let mut tree = BTreeIndex::default();
        tree.load(&[], &[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.get_vals(0, 100).unwrap(), Vec::<RowId>::new());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let mut tree = BTreeIndex::default();
        let err = tree.load(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert_eq!(err, IndexError::length_mismatch(3, 2));
    }

    #[test]
    fn test_single_node_tree() {
        let tree = load_multiples_of_five(10);

        assert_eq!(tree.get_vals(5, 6).unwrap(), vec![1]);
        assert_eq!(tree.get_vals(5, 10).unwrap(), vec![1]);
        assert_eq!(tree.get_vals(5, 11).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_two_level_tree() {
        let tree = load_multiples_of_five(200);
        assert_eq!(tree.get_vals(50, 56).unwrap(), vec![10, 11]);
    }

    #[test]
    fn test_big_tree() {
        let tree = load_multiples_of_five(100_000);

        assert_eq!(tree.get_vals(5, 6).unwrap(), vec![1]);

        let expected: Vec<RowId> = (0..21).collect();
        assert_eq!(tree.get_vals(0, 101).unwrap(), expected);
    }

    #[test]
    fn test_keys_across_leaves() {
        let tree = load_multiples_of_five(100_000);

        // Fan-out of 80, so keys 0-395 sit in the leftmost leaf.
        let expected: Vec<RowId> = (60..101).collect();
        assert_eq!(tree.get_vals(300, 501).unwrap(), expected);
    }

    #[test]
    fn test_unsorted_input() {
        let mut tree = BTreeIndex::default();
        tree.load(&[30, 10, 20, 0, 40], &[3, 1, 2, 0, 4]).unwrap();
        assert_eq!(tree.get_vals(Key::MIN, Key::MAX).unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(tree.get_vals(10, 31).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_keys_keep_input_order() {
        let mut tree = BTreeIndex::default();
        tree.load(&[5, 3, 5, 3, 5], &[0, 1, 2, 3, 4]).unwrap();

        assert_eq!(tree.get_vals(5, 6).unwrap(), vec![0, 2, 4]);
        assert_eq!(tree.get_vals(3, 4).unwrap(), vec![1, 3]);
        assert_eq!(tree.get_vals(3, 6).unwrap(), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_empty_ranges() {
        let tree = load_multiples_of_five(10);

        // upper <= lower
        assert_eq!(tree.get_vals(10, 10).unwrap(), Vec::<RowId>::new());
        assert_eq!(tree.get_vals(20, 10).unwrap(), Vec::<RowId>::new());
        // gap between stored keys
        assert_eq!(tree.get_vals(6, 9).unwrap(), Vec::<RowId>::new());
        // entirely below and entirely above the stored keys
        assert_eq!(tree.get_vals(-100, 0).unwrap(), Vec::<RowId>::new());
        assert_eq!(tree.get_vals(1000, 2000).unwrap(), Vec::<RowId>::new());
    }

    #[test]
    fn test_gap_in_last_leaf() {
        // The lower bound misses key 1 but key 3 further along the
        // rightmost leaf is still in range.
        let mut tree = BTreeIndex::default();
        tree.load(&[1, 3], &[0, 1]).unwrap();
        assert_eq!(tree.get_vals(2, 4).unwrap(), vec![1]);
    }

    #[test]
    fn test_gap_in_last_leaf_multi_level() {
        let keys: Vec<Key> = (0..100).map(|i| i * 5).collect();
        let values: Vec<RowId> = (0..100).collect();
        let mut tree = BTreeIndex::new(4);
        tree.load(&keys, &values).unwrap();

        // 491 falls between 490 and 495 in the rightmost leaf.
        assert_eq!(tree.get_vals(491, 496).unwrap(), vec![99]);
    }

    #[test]
    fn test_full_range() {
        let tree = load_multiples_of_five(1000);
        let expected: Vec<RowId> = (0..1000).collect();
        assert_eq!(tree.get_vals(Key::MIN, Key::MAX).unwrap(), expected);
    }

    #[test]
    fn test_query_idempotent() {
        let tree = load_multiples_of_five(500);
        let first = tree.get_vals(100, 900).unwrap();
        let second = tree.get_vals(100, 900).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_point_queries() {
        let tree = load_multiples_of_five(100);
        for i in 0..100u64 {
            let key = (i * 5) as Key;
            assert_eq!(tree.get_vals(key, key + 1).unwrap(), vec![i]);
        }
    }

    #[test]
    fn test_reload_replaces_tree() {
        let mut tree = load_multiples_of_five(100);
        assert_eq!(tree.len(), 100);

        tree.load(&[1, 2, 3], &[10, 20, 30]).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get_vals(Key::MIN, Key::MAX).unwrap(), vec![10, 20, 30]);
        // Keys from the first load are gone.
        assert_eq!(tree.get_vals(4, 1000).unwrap(), Vec::<RowId>::new());
    }

    #[test]
    fn test_failed_load_preserves_tree() {
        let mut tree = load_multiples_of_five(10);
        assert!(tree.load(&[1, 2], &[1]).is_err());
        assert_eq!(tree.len(), 10);
        assert_eq!(tree.get_vals(5, 6).unwrap(), vec![1]);
    }

    #[test]
    fn test_insert_unsupported() {
        let mut tree = BTreeIndex::default();
        assert_eq!(
            tree.insert(1, 1).unwrap_err(),
            IndexError::unsupported("insert")
        );
    }

    #[test]
    #[should_panic(expected = "fan-out must be at least 3")]
    fn test_fan_out_too_small() {
        let _ = BTreeIndex::new(2);
    }

    #[test]
    fn test_small_fan_out() {
        let keys: Vec<Key> = (0..100).map(|i| i * 3).collect();
        let values: Vec<RowId> = (0..100).collect();
        let mut tree = BTreeIndex::new(4);
        tree.load(&keys, &values).unwrap();

        let expected: Vec<RowId> = (10..=20).collect();
        assert_eq!(tree.get_vals(30, 61).unwrap(), expected);

        let all: Vec<RowId> = (0..100).collect();
        assert_eq!(tree.get_vals(Key::MIN, Key::MAX).unwrap(), all);
    }

    #[test]
    fn test_negative_keys() {
        let mut tree = BTreeIndex::new(4);
        let keys: Vec<Key> = (-50..50).collect();
        let values: Vec<RowId> = (0..100).collect();
        tree.load(&keys, &values).unwrap();

        assert_eq!(tree.get_vals(-50, -48).unwrap(), vec![0, 1]);
        let expected: Vec<RowId> = (45..55).collect();
        assert_eq!(tree.get_vals(-5, 5).unwrap(), expected);
    }

    #[test]
    fn test_batch_size_multiple_of_fan_out() {
        // 160 entries fill two leaves exactly; no empty leaf is left on
        // the chain and queries into the last leaf still resolve.
        let tree = load_multiples_of_five(160);

        let expected: Vec<RowId> = (0..160).collect();
        assert_eq!(tree.get_vals(Key::MIN, Key::MAX).unwrap(), expected);
        assert_eq!(tree.get_vals(795, 800).unwrap(), vec![159]);
        assert_eq!(tree.get_vals(400, 501).unwrap(), (80..101).collect::<Vec<_>>());

        // 2 full leaves + 1 root.
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_traverse_visits_every_node() {
        let tree = load_multiples_of_five(200);

        let mut visited = 0;
        let mut roots = 0;
        let mut leaf_entries = 0;
        tree.traverse(|node| {
            visited += 1;
            if node.is_root {
                roots += 1;
            }
            if node.is_leaf() {
                leaf_entries += node.count;
            }
        });

        assert_eq!(visited, tree.node_count());
        assert_eq!(roots, 1);
        assert_eq!(leaf_entries, 200);
    }

    #[test]
    fn test_traverse_parents_first() {
        let tree = load_multiples_of_five(200);

        let mut kinds = Vec::new();
        tree.traverse(|node| kinds.push(node.is_leaf()));
        // Root first, then the leaf level.
        assert_eq!(kinds, vec![false, true, true, true]);
    }

    #[test]
    fn test_traverse_empty_tree() {
        let tree = BTreeIndex::default();
        let mut visited = 0;
        tree.traverse(|_| visited += 1);
        assert_eq!(visited, 0);
    }
}
