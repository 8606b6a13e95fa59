//! Structural diff algorithm.
//!
//! [`DiffEngine`] compares two [`Node`] trees and produces the minimal
//! [`Delta`] that turns the first into the second, or `None` when they are
//! equal. Objects are diffed key by key. Arrays are diffed by trimming the
//! common head and tail, running a longest-common-subsequence pass over the
//! middle, and pairing leftover removals with additions of matching items
//! into moves. Containers still unmatched at the same index are then diffed
//! in place.
//!
//! # Examples
//!
//! ```
//! use jdelta::{diff, parse_json, ArrayKey, Delta};
//!
//! let old = parse_json("[1, 2, 3]").unwrap();
//! let new = parse_json("[1, 3, 2]").unwrap();
//!
//! match diff(&old, &new) {
//!     Some(Delta::Array(entries)) => {
//!         assert_eq!(entries.len(), 1);
//!         assert!(matches!(entries[&ArrayKey::Old(2)], Delta::Moved { to: 1, .. }));
//!     }
//!     other => panic!("expected an array delta, got {:?}", other),
//! }
//! ```

use crate::delta::{ArrayKey, Delta};
use crate::tree::Node;
use std::collections::BTreeMap;

/// Configuration for the diff algorithm.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Turn a removal and an addition of matching array items into a move
    pub detect_moves: bool,
    /// Carry the moved value inside move entries
    pub include_value_on_move: bool,
    /// Containers at the same array index are matched and diffed in place
    pub match_by_position: bool,
    /// Object field identifying array items (e.g. "id")
    pub object_hash: Option<String>,
    /// Normalize whitespace in strings (trim and collapse multiple spaces)
    pub ignore_whitespace: bool,
    /// Treat null as equivalent to a missing key
    pub treat_null_as_missing: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            detect_moves: true,
            include_value_on_move: false,
            match_by_position: true,
            object_hash: None,
            ignore_whitespace: false,
            treat_null_as_missing: false,
        }
    }
}

/// Computes deltas between JSON trees.
///
/// The engine only holds its configuration, so one instance can be shared
/// across threads and reused for any number of calls.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

/// Computes the delta between two nodes with the default configuration.
///
/// ```
/// use jdelta::{diff, Node};
///
/// assert!(diff(&Node::int(1), &Node::int(1)).is_none());
/// assert!(diff(&Node::int(1), &Node::int(2)).is_some());
/// ```
pub fn diff(old: &Node, new: &Node) -> Option<Delta> {
    DiffEngine::default().diff(old, new)
}

/// Computes the delta between two nodes with an explicit configuration.
pub fn compute_delta(old: &Node, new: &Node, config: &DiffConfig) -> Option<Delta> {
    DiffEngine::new(config.clone()).diff(old, new)
}

impl DiffEngine {
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Returns the delta turning `old` into `new`, or `None` if they are equal.
    pub fn diff(&self, old: &Node, new: &Node) -> Option<Delta> {
        if self.values_equal(old, new) {
            return None;
        }

        match (old, new) {
            (Node::Object(old_map), Node::Object(new_map)) => self.diff_objects(old_map, new_map),
            (Node::Array(old_arr), Node::Array(new_arr)) => self.diff_arrays(old_arr, new_arr),
            _ => Some(Delta::Modified {
                old: old.clone(),
                new: new.clone(),
            }),
        }
    }

    fn diff_objects(
        &self,
        old_map: &BTreeMap<String, Node>,
        new_map: &BTreeMap<String, Node>,
    ) -> Option<Delta> {
        let mut entries = BTreeMap::new();

        for (key, old_value) in old_map {
            let delta = match new_map.get(key) {
                Some(new_value) => self.diff(old_value, new_value),
                None if self.counts_as_missing(old_value) => None,
                None => Some(Delta::Removed(old_value.clone())),
            };
            if let Some(delta) = delta {
                log::trace!("key {:?} changed", key);
                entries.insert(key.clone(), delta);
            }
        }

        for (key, new_value) in new_map {
            if !old_map.contains_key(key) && !self.counts_as_missing(new_value) {
                log::trace!("key {:?} added", key);
                entries.insert(key.clone(), Delta::Added(new_value.clone()));
            }
        }

        (!entries.is_empty()).then_some(Delta::Object(entries))
    }

    fn diff_arrays(&self, old: &[Node], new: &[Node]) -> Option<Delta> {
        let mut entries = BTreeMap::new();
        let (old_len, new_len) = (old.len(), new.len());

        let mut head = 0;
        while head < old_len && head < new_len && self.items_match(&old[head], &new[head]) {
            self.insert_nested(&mut entries, head, &old[head], &new[head]);
            head += 1;
        }

        let mut tail = 0;
        while head + tail < old_len
            && head + tail < new_len
            && self.items_match(&old[old_len - 1 - tail], &new[new_len - 1 - tail])
        {
            let (i, j) = (old_len - 1 - tail, new_len - 1 - tail);
            self.insert_nested(&mut entries, j, &old[i], &new[j]);
            tail += 1;
        }

        let old_end = old_len - tail;
        let new_end = new_len - tail;

        if head == old_end {
            for (j, item) in new.iter().enumerate().take(new_end).skip(head) {
                entries.insert(ArrayKey::New(j), Delta::Added(item.clone()));
            }
        } else if head == new_end {
            for (i, item) in old.iter().enumerate().take(old_end).skip(head) {
                entries.insert(ArrayKey::Old(i), Delta::Removed(item.clone()));
            }
        } else {
            self.diff_array_middle(old, new, head, old_end, new_end, &mut entries);
        }

        log::debug!(
            "array diff {}x{}: common head {}, common tail {}, {} entries",
            old_len,
            new_len,
            head,
            tail,
            entries.len()
        );

        (!entries.is_empty()).then_some(Delta::Array(entries))
    }

    /// Diffs `old[head..old_end]` against `new[head..new_end]`.
    fn diff_array_middle(
        &self,
        old: &[Node],
        new: &[Node],
        head: usize,
        old_end: usize,
        new_end: usize,
        entries: &mut BTreeMap<ArrayKey, Delta>,
    ) {
        let pairs = self.longest_common_subsequence(old, new, head, old_end, new_end);

        let mut old_in_lcs = vec![false; old_end - head];
        let mut new_in_lcs = vec![false; new_end - head];
        for &(i, j) in &pairs {
            old_in_lcs[i - head] = true;
            new_in_lcs[j - head] = true;
            self.insert_nested(entries, j, &old[i], &new[j]);
        }

        let mut removed: Vec<usize> = (head..old_end)
            .filter(|&i| !old_in_lcs[i - head])
            .collect();
        let mut unmatched = Vec::new();
        let mut moves = 0;

        for j in (head..new_end).filter(|&j| !new_in_lcs[j - head]) {
            let source = if self.config.detect_moves {
                removed
                    .iter()
                    .position(|&i| self.items_match(&old[i], &new[j]))
            } else {
                None
            };

            match source {
                Some(position) => {
                    let i = removed.remove(position);
                    let value = self.config.include_value_on_move.then(|| old[i].clone());
                    entries.insert(ArrayKey::Old(i), Delta::Moved { to: j, value });
                    self.insert_nested(entries, j, &old[i], &new[j]);
                    moves += 1;
                }
                None => unmatched.push(j),
            }
        }

        let mut in_place = 0;
        for j in unmatched {
            let paired = removed
                .iter()
                .position(|&i| i == j && self.pairs_by_position(&old[i], &new[j], j, &pairs));

            match paired {
                Some(position) => {
                    removed.remove(position);
                    self.insert_nested(entries, j, &old[j], &new[j]);
                    in_place += 1;
                }
                None => {
                    entries.insert(ArrayKey::New(j), Delta::Added(new[j].clone()));
                }
            }
        }

        for i in removed {
            entries.insert(ArrayKey::Old(i), Delta::Removed(old[i].clone()));
        }

        log::debug!(
            "array middle {}x{}: lcs length {}, {} moves, {} diffed in place",
            old_end - head,
            new_end - head,
            pairs.len(),
            moves,
            in_place
        );
    }

    /// Returns matched `(old, new)` index pairs of the LCS of the two ranges, in order.
    ///
    /// Ties are broken the way jsondiffpatch breaks them so both produce the
    /// same deltas: when dropping an old or a new item gives equally long
    /// subsequences, the old item is dropped.
    fn longest_common_subsequence(
        &self,
        old: &[Node],
        new: &[Node],
        head: usize,
        old_end: usize,
        new_end: usize,
    ) -> Vec<(usize, usize)> {
        let rows = old_end - head;
        let cols = new_end - head;
        let width = cols + 1;

        let mut matched = vec![false; rows * cols];
        let mut lengths = vec![0usize; (rows + 1) * width];

        for r in 1..=rows {
            for c in 1..=cols {
                let is_match = self.items_match(&old[head + r - 1], &new[head + c - 1]);
                matched[(r - 1) * cols + (c - 1)] = is_match;
                lengths[r * width + c] = if is_match {
                    lengths[(r - 1) * width + (c - 1)] + 1
                } else {
                    lengths[(r - 1) * width + c].max(lengths[r * width + (c - 1)])
                };
            }
        }

        let mut pairs = Vec::with_capacity(lengths[rows * width + cols]);
        let (mut r, mut c) = (rows, cols);
        while r > 0 && c > 0 {
            if matched[(r - 1) * cols + (c - 1)] {
                pairs.push((head + r - 1, head + c - 1));
                r -= 1;
                c -= 1;
            } else if lengths[r * width + (c - 1)] > lengths[(r - 1) * width + c] {
                c -= 1;
            } else {
                r -= 1;
            }
        }
        pairs.reverse();
        pairs
    }

    fn insert_nested(
        &self,
        entries: &mut BTreeMap<ArrayKey, Delta>,
        new_index: usize,
        old_item: &Node,
        new_item: &Node,
    ) {
        if let Some(delta) = self.diff(old_item, new_item) {
            entries.insert(ArrayKey::New(new_index), delta);
        }
    }

    /// Decides whether two array items are the same logical item: equal, or
    /// objects carrying the same `object_hash` field.
    fn items_match(&self, old_item: &Node, new_item: &Node) -> bool {
        self.values_equal(old_item, new_item)
            || self.hashes_match(old_item, new_item).unwrap_or(false)
    }

    /// Decides whether an unmatched removal and addition at the same `index`
    /// are diffed in place.
    ///
    /// Only containers without an `object_hash` verdict pair up, and only when
    /// the pair keeps its order relative to every LCS pair, so the in-place
    /// item still lands at `index` once removals and additions are applied.
    fn pairs_by_position(
        &self,
        old_item: &Node,
        new_item: &Node,
        index: usize,
        lcs: &[(usize, usize)],
    ) -> bool {
        if !self.config.match_by_position
            || !old_item.is_container()
            || !new_item.is_container()
            || self.hashes_match(old_item, new_item).is_some()
        {
            return false;
        }
        let before_old = lcs.iter().filter(|&&(i, _)| i < index).count();
        let before_new = lcs.iter().filter(|&&(_, j)| j < index).count();
        before_old == before_new
    }

    /// Compares the `object_hash` field of two objects, if both carry it.
    fn hashes_match(&self, old_item: &Node, new_item: &Node) -> Option<bool> {
        let field = self.config.object_hash.as_deref()?;
        match (old_item, new_item) {
            (Node::Object(a), Node::Object(b)) => {
                let (ha, hb) = (a.get(field)?, b.get(field)?);
                Some(self.values_equal(ha, hb))
            }
            _ => None,
        }
    }

    /// Deep equality honoring `ignore_whitespace` and `treat_null_as_missing`.
    fn values_equal(&self, old: &Node, new: &Node) -> bool {
        match (old, new) {
            (Node::String(a), Node::String(b)) if self.config.ignore_whitespace => {
                normalize_whitespace(a) == normalize_whitespace(b)
            }
            (Node::Object(a), Node::Object(b)) if self.config.treat_null_as_missing => {
                let null = Node::Null;
                a.keys().chain(b.keys()).all(|key| {
                    let left = a.get(key).unwrap_or(&null);
                    let right = b.get(key).unwrap_or(&null);
                    self.values_equal(left, right)
                })
            }
            (Node::Object(a), Node::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|v| self.values_equal(value, v)))
            }
            (Node::Array(a), Node::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(item_a, item_b)| self.values_equal(item_a, item_b))
            }
            _ => old.semantic_equals(new),
        }
    }

    fn counts_as_missing(&self, value: &Node) -> bool {
        self.config.treat_null_as_missing && matches!(value, Node::Null)
    }
}

/// Normalizes whitespace in a string (trim and collapse multiple spaces).
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
