//! Shared helpers for integration tests.
//!
//! The library deliberately has no patch operation; `apply` exists only so the
//! tests can check that a delta really turns the left tree into the right one.

#![allow(dead_code)]

use jdelta::{ArrayKey, Delta, Node};
use proptest::prelude::*;

pub fn node(value: serde_json::Value) -> Node {
    Node::from(value)
}

/// Applies a delta the way jsondiffpatch patches: removals and moves are
/// taken out by old index, then additions and moved items are inserted by
/// new index, then nested changes are applied in place.
pub fn apply(target: &Node, delta: &Delta) -> Node {
    match delta {
        Delta::Added(value) => value.clone(),
        Delta::Modified { new, .. } => new.clone(),
        Delta::Removed(_) | Delta::Moved { .. } => {
            panic!("removals and moves only appear inside containers")
        }
        Delta::Object(entries) => {
            let mut map = match target {
                Node::Object(map) => map.clone(),
                other => panic!("object delta applied to {}", other.type_name()),
            };
            for (key, nested) in entries {
                match nested {
                    Delta::Removed(_) => {
                        map.remove(key);
                    }
                    Delta::Added(value) => {
                        map.insert(key.clone(), value.clone());
                    }
                    other => {
                        let current = map.get(key).cloned().unwrap_or(Node::Null);
                        map.insert(key.clone(), apply(&current, other));
                    }
                }
            }
            Node::Object(map)
        }
        Delta::Array(entries) => {
            let mut items = match target {
                Node::Array(items) => items.clone(),
                other => panic!("array delta applied to {}", other.type_name()),
            };

            let mut inserts = Vec::new();
            for (key, nested) in entries.iter().rev() {
                if let ArrayKey::Old(i) = key {
                    let item = items.remove(*i);
                    if let Delta::Moved { to, .. } = nested {
                        inserts.push((*to, item));
                    }
                }
            }
            for (key, nested) in entries {
                if let (ArrayKey::New(j), Delta::Added(value)) = (key, nested) {
                    inserts.push((*j, value.clone()));
                }
            }
            inserts.sort_by_key(|(index, _)| *index);
            for (index, item) in inserts {
                items.insert(index, item);
            }

            for (key, nested) in entries {
                match (key, nested) {
                    (ArrayKey::New(_), Delta::Added(_)) | (ArrayKey::Old(_), _) => {}
                    (ArrayKey::New(j), other) => items[*j] = apply(&items[*j], other),
                }
            }
            Node::Array(items)
        }
    }
}

/// Small JSON trees over tiny alphabets, so equal items and moves are common.
pub fn arb_node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Bool),
        (-3i64..4).prop_map(Node::int),
        "[ab]{0,2}".prop_map(Node::String),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Array),
            prop::collection::btree_map("_t|[a-c]", inner, 0..4).prop_map(Node::Object),
        ]
    })
}

/// A small array or object, the kind of item that can be diffed in place.
pub fn arb_container() -> impl Strategy<Value = Node> {
    prop_oneof![
        prop::collection::vec(arb_node(), 0..3).prop_map(Node::Array),
        prop::collection::btree_map("_t|[a-c]", arb_node(), 0..3).prop_map(Node::Object),
    ]
}

/// Arrays of small objects sharing an "id" field.
pub fn arb_records() -> impl Strategy<Value = Node> {
    prop::collection::vec((0i64..5, 0i64..3), 0..7).prop_map(|rows| {
        Node::Array(
            rows.into_iter()
                .map(|(id, v)| node(serde_json::json!({"id": id, "v": v})))
                .collect(),
        )
    })
}
