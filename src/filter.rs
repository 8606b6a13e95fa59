//! Path filtering for deltas.
//!
//! Glob-style patterns select which parts of a delta are kept, allowing
//! users to ignore volatile fields or focus on particular areas.
//!
//! # Pattern Syntax
//!
//! - `foo` - matches literal segment "foo"
//! - `*` - matches any single path segment
//! - `**` - matches any number of path segments (including zero)
//! - `foo.bar` - matches nested path "foo.bar"
//! - `items.0.id` - array indices are plain segments
//!
//! Array entries are matched by the index they are stored under, which is
//! the old index for removals and moves and the new index for everything
//! else. Both render as `[i]`, so `items.1` covers the removal of old item 1
//! and the addition at new index 1 alike, even though they are different
//! elements.
//!
//! # Examples
//!
//! ```
//! use jdelta::filter::PathPattern;
//!
//! let pattern = PathPattern::parse("**.version");
//! assert!(pattern.matches(&["package".to_string(), "version".to_string()]));
//!
//! let pattern = PathPattern::parse("items.*.id");
//! assert!(pattern.matches(&["items".to_string(), "[3]".to_string(), "id".to_string()]));
//! ```

use crate::delta::{index_segment, ArrayKey, Delta};
use std::collections::BTreeMap;

/// A single segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches an exact string
    Literal(String),
    /// Matches any single path segment (*)
    SingleWildcard,
    /// Matches any number of path segments (**)
    DoubleWildcard,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub segments: Vec<PatternSegment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('.')
            .map(|s| match s {
                "**" => PatternSegment::DoubleWildcard,
                "*" => PatternSegment::SingleWildcard,
                _ => PatternSegment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Matches a path whose array indices are written as `"[i]"`.
    pub fn matches(&self, path: &[String]) -> bool {
        matches_from(&self.segments, path)
    }
}

fn segment_matches(literal: &str, segment: &str) -> bool {
    literal == segment
        || segment
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .is_some_and(|index| index == literal)
}

fn matches_from(pattern: &[PatternSegment], path: &[String]) -> bool {
    match (pattern.first(), path.first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        (Some(_), None) => pattern
            .iter()
            .all(|s| matches!(s, PatternSegment::DoubleWildcard)),
        (Some(seg), Some(path_seg)) => match seg {
            PatternSegment::Literal(lit) => {
                segment_matches(lit, path_seg) && matches_from(&pattern[1..], &path[1..])
            }
            PatternSegment::SingleWildcard => matches_from(&pattern[1..], &path[1..]),
            PatternSegment::DoubleWildcard => {
                matches_from(&pattern[1..], path) || matches_from(pattern, &path[1..])
            }
        },
    }
}

/// Configuration for filtering deltas.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Patterns for paths to drop
    pub ignore_patterns: Vec<PathPattern>,
    /// Patterns for paths to keep (if non-empty, only these are kept)
    pub only_patterns: Vec<PathPattern>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.ignore_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn only(mut self, pattern: &str) -> Self {
        self.only_patterns.push(PathPattern::parse(pattern));
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.ignore_patterns.is_empty() || !self.only_patterns.is_empty()
    }

    /// Decides whether a leaf change at `path` is kept.
    ///
    /// A pattern matching an ancestor covers everything below it.
    pub fn should_include(&self, path: &[String]) -> bool {
        let covered = |pattern: &PathPattern| (0..=path.len()).any(|n| pattern.matches(&path[..n]));

        if self.ignore_patterns.iter().any(covered) {
            return false;
        }

        self.only_patterns.is_empty() || self.only_patterns.iter().any(covered)
    }
}

/// Prunes a delta down to the changes allowed by `config`.
///
/// Containers left empty are removed; `None` means nothing survived.
pub fn filter_delta(delta: Option<Delta>, config: &FilterConfig) -> Option<Delta> {
    if !config.has_filters() {
        return delta;
    }
    prune(delta?, &mut Vec::new(), config)
}

fn prune(delta: Delta, path: &mut Vec<String>, config: &FilterConfig) -> Option<Delta> {
    match delta {
        Delta::Object(entries) => {
            let kept: BTreeMap<String, Delta> = entries
                .into_iter()
                .filter_map(|(key, nested)| {
                    path.push(key.clone());
                    let kept = prune(nested, path, config);
                    path.pop();
                    kept.map(|d| (key, d))
                })
                .collect();
            (!kept.is_empty()).then_some(Delta::Object(kept))
        }
        Delta::Array(entries) => {
            let kept: BTreeMap<ArrayKey, Delta> = entries
                .into_iter()
                .filter_map(|(key, nested)| {
                    path.push(index_segment(key.index()));
                    let kept = prune(nested, path, config);
                    path.pop();
                    kept.map(|d| (key, d))
                })
                .collect();
            (!kept.is_empty()).then_some(Delta::Array(kept))
        }
        leaf => config.should_include(path).then_some(leaf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn delta(value: serde_json::Value) -> Option<Delta> {
        Delta::from_value(&value).unwrap()
    }

    #[test]
    fn test_literal_and_wildcards() {
        assert!(PathPattern::parse("a.b").matches(&path(&["a", "b"])));
        assert!(!PathPattern::parse("a.b").matches(&path(&["a", "c"])));
        assert!(PathPattern::parse("a.*").matches(&path(&["a", "x"])));
        assert!(!PathPattern::parse("a.*").matches(&path(&["a", "x", "y"])));
        assert!(PathPattern::parse("**.id").matches(&path(&["id"])));
        assert!(PathPattern::parse("**.id").matches(&path(&["a", "b", "id"])));
        assert!(PathPattern::parse("**").matches(&path(&[])));
    }

    #[test]
    fn test_index_segments() {
        let pattern = PathPattern::parse("items.1");
        assert!(pattern.matches(&path(&["items", "[1]"])));
        assert!(!pattern.matches(&path(&["items", "[10]"])));
    }

    #[test]
    fn test_should_include_covers_descendants() {
        let config = FilterConfig::new().ignore("metadata");
        assert!(!config.should_include(&path(&["metadata", "timestamp"])));
        assert!(config.should_include(&path(&["data"])));

        let config = FilterConfig::new().only("user");
        assert!(config.should_include(&path(&["user", "name"])));
        assert!(!config.should_include(&path(&["other"])));
    }

    #[test]
    fn test_no_filters_passes_through() {
        let original = delta(json!({"a": [1]}));
        assert_eq!(filter_delta(original.clone(), &FilterConfig::new()), original);
    }

    #[test]
    fn test_filter_prunes_empty_containers() {
        let original = delta(json!({
            "meta": {"updated": ["t1", "t2"]},
            "user": {"name": ["A", "B"]},
        }));
        let filtered = filter_delta(original, &FilterConfig::new().ignore("meta.updated"));
        assert_eq!(
            filtered.unwrap().to_value(),
            json!({"user": {"name": ["A", "B"]}})
        );
    }

    #[test]
    fn test_filter_inside_arrays() {
        let original = delta(json!({
            "items": {"_t": "a", "0": {"stamp": [1, 2], "v": [1, 2]}, "_3": [9, 0, 0]},
        }));
        let filtered = filter_delta(original, &FilterConfig::new().ignore("items.*.stamp"));
        assert_eq!(
            filtered.unwrap().to_value(),
            json!({"items": {"_t": "a", "0": {"v": [1, 2]}, "_3": [9, 0, 0]}})
        );
    }

    #[test]
    fn test_filter_everything_gives_none() {
        let original = delta(json!({"a": [1]}));
        assert_eq!(filter_delta(original, &FilterConfig::new().only("b")), None);
    }

    #[test]
    fn test_filter_root_leaf() {
        let original = delta(json!(["a", 1]));
        assert!(filter_delta(original.clone(), &FilterConfig::new().only("**")).is_some());
        assert!(filter_delta(original, &FilterConfig::new().ignore("x")).is_some());
    }
}
