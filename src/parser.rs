//! Document parsing.
//!
//! JSON documents passed on the command line are parsed with [`parse_document`].
//! When documents come from files, [`parse_file`] detects the format from the
//! extension (.json, .yaml, .yml, .toml) and falls back to JSON then YAML.
//!
//! # Examples
//!
//! ```
//! use jdelta::parser::parse_document;
//!
//! let node = parse_document(r#"{"name": "Alice"}"#, "left document").unwrap();
//! assert_eq!(node.type_name(), "object");
//! ```

use crate::error::ParseError;
use crate::tree::Node;
use serde_json::Number;
use std::fs;
use std::path::Path;

/// Parses JSON text into a Node, labelling errors with `source_name`.
///
/// # Errors
///
/// Returns `ParseError::JsonError` if the text is not a single valid JSON value.
pub fn parse_document(content: &str, source_name: &str) -> Result<Node, ParseError> {
    parse_json(content).map_err(|e| ParseError::json_error(source_name, e))
}

/// Parses a JSON string into a Node.
///
/// ```
/// use jdelta::parser::parse_json;
///
/// let node = parse_json("[1, 2, 3]").unwrap();
/// assert_eq!(node.type_name(), "array");
/// ```
pub fn parse_json(content: &str) -> Result<Node, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(Node::from(value))
}

/// Parses a YAML string into a Node.
pub fn parse_yaml(content: &str) -> Result<Node, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_node(value))
}

/// Parses a TOML string into a Node.
pub fn parse_toml(content: &str) -> Result<Node, toml::de::Error> {
    let value: toml::Value = toml::from_str(content)?;
    Ok(toml_to_node(value))
}

/// Parses a file into a Node.
///
/// # Errors
///
/// This function will return an error if:
/// - The file does not exist (`ParseError::FileNotFound`)
/// - The file cannot be read (`ParseError::ReadError`)
/// - The file contains invalid JSON, YAML or TOML for its extension
/// - The extension is unknown and the content is neither JSON nor YAML
pub fn parse_file(path: &Path) -> Result<Node, ParseError> {
    let display = path.to_string_lossy().to_string();

    if !path.exists() {
        return Err(ParseError::file_not_found(display));
    }

    let content = fs::read_to_string(path).map_err(|e| ParseError::read_error(&display, e))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase());

    log::debug!("parsing {} (extension {:?})", display, extension);

    match extension.as_deref() {
        Some("json") => parse_document(&content, &display),
        Some("yaml") | Some("yml") => {
            parse_yaml(&content).map_err(|e| ParseError::yaml_error(&display, e))
        }
        Some("toml") => parse_toml(&content).map_err(|e| ParseError::toml_error(&display, e)),
        _ => parse_json(&content)
            .or_else(|_| parse_yaml(&content))
            .map_err(|_| ParseError::unknown_format(display)),
    }
}

fn float_node(f: f64) -> Node {
    Number::from_f64(f).map_or(Node::Null, Node::Number)
}

/// Converts a serde_yaml::Value to a Node.
///
/// Non-string keys are stringified; tags are dropped and their values kept.
fn yaml_to_node(value: serde_yaml::Value) -> Node {
    use serde_yaml::Value;

    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Node::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Node::Number(u.into())
            } else {
                n.as_f64().map_or(Node::Null, float_node)
            }
        }
        Value::String(s) => Node::String(s),
        Value::Sequence(seq) => Node::Array(seq.into_iter().map(yaml_to_node).collect()),
        Value::Mapping(map) => Node::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let key = match k {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        Value::Null => "null".to_string(),
                        other => format!("{:?}", other),
                    };
                    (key, yaml_to_node(v))
                })
                .collect(),
        ),
        Value::Tagged(tagged) => yaml_to_node(tagged.value),
    }
}

/// Converts a toml::Value to a Node. Datetimes become strings.
fn toml_to_node(value: toml::Value) -> Node {
    use toml::Value;

    match value {
        Value::String(s) => Node::String(s),
        Value::Integer(i) => Node::Number(i.into()),
        Value::Float(f) => float_node(f),
        Value::Boolean(b) => Node::Bool(b),
        Value::Datetime(dt) => Node::String(dt.to_string()),
        Value::Array(arr) => Node::Array(arr.into_iter().map(toml_to_node).collect()),
        Value::Table(table) => Node::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_node(v)))
                .collect(),
        ),
    }
}
