//! Delta representation and its JSON wire format.
//!
//! A [`Delta`] describes the edit that turns one JSON tree into another. It
//! serializes to the jsondiffpatch delta format:
//!
//! | Delta                | JSON                                   |
//! |----------------------|----------------------------------------|
//! | `Added(v)`           | `[v]`                                  |
//! | `Modified{old,new}`  | `[old, new]`                           |
//! | `Removed(v)`         | `[v, 0, 0]`                            |
//! | `Moved{to, value}`   | `["", to, 3]` or `[value, to, 3]`      |
//! | `Object(m)`          | `{"key": delta, ...}`                  |
//! | `Array(m)`           | `{"_t": "a", "1": delta, "_0": delta}` |
//!
//! # Examples
//!
//! ```
//! use jdelta::{diff, parse_json};
//!
//! let old = parse_json(r#"{"a": 1}"#).unwrap();
//! let new = parse_json(r#"{"a": 2, "b": true}"#).unwrap();
//! let delta = diff(&old, &new).unwrap();
//!
//! assert_eq!(
//!     delta.to_value(),
//!     serde_json::json!({"a": [1, 2], "b": [true]})
//! );
//! ```

use crate::error::DeltaFormatError;
use crate::tree::Node;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Marker value of the `_t` key identifying an array delta.
pub const ARRAY_MARKER: &str = "a";

const REMOVED_OP: u64 = 0;
const TEXT_DIFF_OP: u64 = 2;
const MOVED_OP: u64 = 3;

/// Position of an entry inside an array delta.
///
/// `New` indexes into the right-hand array and holds additions or nested
/// changes. `Old` indexes into the left-hand array and holds removals or moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArrayKey {
    New(usize),
    Old(usize),
}

impl ArrayKey {
    pub fn index(&self) -> usize {
        match self {
            ArrayKey::New(i) | ArrayKey::Old(i) => *i,
        }
    }

    /// Parses `"3"` or `"_3"`.
    pub fn parse(key: &str) -> Option<ArrayKey> {
        match key.strip_prefix('_') {
            Some(rest) => rest.parse().ok().map(ArrayKey::Old),
            None => key.parse().ok().map(ArrayKey::New),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::New(i) => write!(f, "{}", i),
            ArrayKey::Old(i) => write!(f, "_{}", i),
        }
    }
}

/// A change at one position of a JSON tree.
///
/// Empty `Object` and `Array` deltas are never produced by the engine; the
/// absence of a delta means the two trees are equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    Added(Node),
    Removed(Node),
    Modified { old: Node, new: Node },
    Moved { to: usize, value: Option<Node> },
    Object(BTreeMap<String, Delta>),
    Array(BTreeMap<ArrayKey, Delta>),
}

impl Delta {
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Delta::Object(_) | Delta::Array(_))
    }

    /// Encodes the delta in the jsondiffpatch format.
    pub fn to_value(&self) -> Value {
        match self {
            Delta::Added(value) => json!([value.to_json()]),
            Delta::Modified { old, new } => json!([old.to_json(), new.to_json()]),
            Delta::Removed(value) => json!([value.to_json(), REMOVED_OP, REMOVED_OP]),
            Delta::Moved { to, value } => {
                let carried = value.as_ref().map_or(json!(""), Node::to_json);
                json!([carried, to, MOVED_OP])
            }
            Delta::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, delta)| (key.clone(), delta.to_value()))
                    .collect(),
            ),
            Delta::Array(entries) => {
                let mut map = Map::new();
                map.insert("_t".to_string(), json!(ARRAY_MARKER));
                for (key, delta) in entries {
                    map.insert(key.to_string(), delta.to_value());
                }
                Value::Object(map)
            }
        }
    }

    /// Decodes a jsondiffpatch delta. `{}` decodes to `None`.
    ///
    /// A moved entry carrying `""` as its value is read as a move without a
    /// value. The format has no way to tell that apart from a carried empty
    /// string, so `Moved { value: Some("") }` decodes as `Moved { value: None }`.
    ///
    /// # Errors
    ///
    /// Returns `DeltaFormatError` for shapes outside the format, including
    /// text diffs (`[patch, 0, 2]`), which this crate never emits.
    pub fn from_value(value: &Value) -> Result<Option<Delta>, DeltaFormatError> {
        if let Value::Object(map) = value {
            if map.is_empty() {
                return Ok(None);
            }
        }
        decode(value, "").map(Some)
    }

    /// Flattens the delta into its leaf changes, in key order.
    pub fn changes(&self) -> Vec<Change> {
        let mut changes = Vec::new();
        collect_changes(self, &mut Vec::new(), &mut changes);
        changes
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn decode(value: &Value, path: &str) -> Result<Delta, DeltaFormatError> {
    match value {
        Value::Array(items) => decode_leaf(items, path),
        Value::Object(map) if map.is_empty() => {
            Err(DeltaFormatError::new(display_path(path), "empty nested delta"))
        }
        // Object deltas only hold arrays and objects, so a string `_t` can
        // only be the array marker; any other `_t` is an ordinary key.
        Value::Object(map) => match map.get("_t") {
            Some(Value::String(marker)) if marker == ARRAY_MARKER => decode_array(map, path),
            Some(Value::String(marker)) => Err(DeltaFormatError::new(
                display_path(&format!("{}/_t", path)),
                format!("unsupported container marker {:?}", marker),
            )),
            _ => {
                let mut entries = BTreeMap::new();
                for (key, nested) in map {
                    let nested_path = format!("{}/{}", path, key);
                    entries.insert(key.clone(), decode(nested, &nested_path)?);
                }
                Ok(Delta::Object(entries))
            }
        },
        other => Err(DeltaFormatError::new(
            display_path(path),
            format!("expected an array or object, found {}", other),
        )),
    }
}

fn decode_leaf(items: &[Value], path: &str) -> Result<Delta, DeltaFormatError> {
    match items {
        [added] => Ok(Delta::Added(Node::from(added.clone()))),
        [old, new] => Ok(Delta::Modified {
            old: Node::from(old.clone()),
            new: Node::from(new.clone()),
        }),
        [old, Value::Number(zero), Value::Number(op)]
            if op.as_u64() == Some(REMOVED_OP) && zero.as_u64() == Some(REMOVED_OP) =>
        {
            Ok(Delta::Removed(Node::from(old.clone())))
        }
        [carried, Value::Number(to), Value::Number(op)] if op.as_u64() == Some(MOVED_OP) => {
            let to = to.as_u64().ok_or_else(|| {
                DeltaFormatError::new(display_path(path), "move target must be an index")
            })?;
            let value = match carried {
                Value::String(s) if s.is_empty() => None,
                other => Some(Node::from(other.clone())),
            };
            Ok(Delta::Moved {
                to: to as usize,
                value,
            })
        }
        [_, _, Value::Number(op)] if op.as_u64() == Some(TEXT_DIFF_OP) => Err(
            DeltaFormatError::new(display_path(path), "text diffs are not supported"),
        ),
        _ => Err(DeltaFormatError::new(
            display_path(path),
            format!("unrecognized leaf delta with {} elements", items.len()),
        )),
    }
}

fn decode_array(map: &Map<String, Value>, path: &str) -> Result<Delta, DeltaFormatError> {
    let mut entries = BTreeMap::new();
    for (key, nested) in map {
        if key == "_t" {
            continue;
        }
        let nested_path = format!("{}/{}", path, key);
        let array_key = ArrayKey::parse(key).ok_or_else(|| {
            DeltaFormatError::new(display_path(&nested_path), "invalid array index")
        })?;
        let delta = decode(nested, &nested_path)?;
        let valid = match array_key {
            ArrayKey::Old(_) => matches!(delta, Delta::Removed(_) | Delta::Moved { .. }),
            ArrayKey::New(_) => !matches!(delta, Delta::Removed(_) | Delta::Moved { .. }),
        };
        if !valid {
            return Err(DeltaFormatError::new(
                display_path(&nested_path),
                "removals and moves must use \"_\"-prefixed indices",
            ));
        }
        entries.insert(array_key, delta);
    }
    if entries.is_empty() {
        return Err(DeltaFormatError::new(display_path(path), "empty array delta"));
    }
    Ok(Delta::Array(entries))
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// The kind of a leaf change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Value exists in new but not old
    Added,
    /// Value exists in old but not new
    Removed,
    /// Value exists in both but differs
    Modified,
    /// Array item changed position
    Moved,
}

/// A single leaf change of a delta.
///
/// The path holds object keys and array indices; indices are written as
/// `"[i]"`. For removals and moves the index refers to the old array, for
/// everything else to the new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub path: Vec<String>,
    pub change_type: ChangeType,
    /// Old value (None for Added changes and moves without a value)
    pub old_value: Option<Node>,
    /// New value (None for Removed and Moved changes)
    pub new_value: Option<Node>,
    /// Destination index of a move
    pub moved_to: Option<usize>,
}

/// Renders an array index as a path segment.
pub fn index_segment(index: usize) -> String {
    format!("[{}]", index)
}

fn leaf(
    path: &[String],
    change_type: ChangeType,
    old_value: Option<Node>,
    new_value: Option<Node>,
    moved_to: Option<usize>,
) -> Change {
    Change {
        path: path.to_vec(),
        change_type,
        old_value,
        new_value,
        moved_to,
    }
}

fn collect_changes(delta: &Delta, path: &mut Vec<String>, out: &mut Vec<Change>) {
    match delta {
        Delta::Added(value) => out.push(leaf(
            path,
            ChangeType::Added,
            None,
            Some(value.clone()),
            None,
        )),
        Delta::Removed(value) => out.push(leaf(
            path,
            ChangeType::Removed,
            Some(value.clone()),
            None,
            None,
        )),
        Delta::Modified { old, new } => out.push(leaf(
            path,
            ChangeType::Modified,
            Some(old.clone()),
            Some(new.clone()),
            None,
        )),
        Delta::Moved { to, value } => out.push(leaf(
            path,
            ChangeType::Moved,
            value.clone(),
            None,
            Some(*to),
        )),
        Delta::Object(entries) => {
            for (key, nested) in entries {
                path.push(key.clone());
                collect_changes(nested, path, out);
                path.pop();
            }
        }
        Delta::Array(entries) => {
            for (key, nested) in entries {
                path.push(index_segment(key.index()));
                collect_changes(nested, path, out);
                path.pop();
            }
        }
    }
}

/// Counts of leaf changes in a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeltaStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub moved: usize,
}

impl DeltaStats {
    pub fn from_delta(delta: Option<&Delta>) -> Self {
        let mut stats = Self::default();
        for change in delta.map(Delta::changes).unwrap_or_default() {
            match change.change_type {
                ChangeType::Added => stats.added += 1,
                ChangeType::Removed => stats.removed += 1,
                ChangeType::Modified => stats.modified += 1,
                ChangeType::Moved => stats.moved += 1,
            }
        }
        stats
    }

    /// Returns the total number of changes.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified + self.moved
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}
