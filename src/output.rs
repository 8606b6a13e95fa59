//! Output formatting for deltas.
//!
//! A delta can be printed as jsondiffpatch JSON (pretty or compact) for other
//! programs, or as a line-per-change listing for humans (colored or plain).
//!
//! # Examples
//!
//! ```
//! use jdelta::{diff, format_delta, parse_json, OutputFormat, OutputOptions};
//!
//! let old = parse_json(r#"{"age": 42}"#).unwrap();
//! let new = parse_json(r#"{"age": 43}"#).unwrap();
//! let delta = diff(&old, &new);
//!
//! let output = format_delta(delta.as_ref(), OutputFormat::Plain, &OutputOptions::default()).unwrap();
//! assert!(output.contains("age: 42 → 43"));
//! ```

use crate::delta::{Change, ChangeType, Delta, DeltaStats};
use crate::error::OutputError;
use crate::tree::Node;
use colored::*;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed delta JSON
    #[default]
    Json,
    /// Single-line delta JSON
    Compact,
    /// Colored change listing with ANSI escape codes
    Terminal,
    /// Change listing without colors (suitable for piping)
    Plain,
}

/// Options for the human-readable formats.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Show full values instead of previews for containers
    pub show_values: bool,
    /// Maximum length for displayed values (truncate if longer)
    pub max_value_length: usize,
    /// Append the summary line
    pub show_summary: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            show_values: false,
            max_value_length: 80,
            show_summary: true,
        }
    }
}

/// Formats a delta according to the specified format and options.
///
/// `None` (no differences) renders as `{}` in the JSON formats.
///
/// # Errors
///
/// Returns `OutputError::JsonSerializationError` if JSON encoding fails.
pub fn format_delta(
    delta: Option<&Delta>,
    format: OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => format_json(delta, true),
        OutputFormat::Compact => format_json(delta, false),
        OutputFormat::Terminal => Ok(format_listing(delta, options, true)),
        OutputFormat::Plain => Ok(format_listing(delta, options, false)),
    }
}

fn format_json(delta: Option<&Delta>, pretty: bool) -> Result<String, OutputError> {
    let value = delta.map_or_else(|| serde_json::json!({}), Delta::to_value);
    let encoded = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    encoded.map_err(|e| OutputError::JsonSerializationError { source: e })
}

/// Lists changes one per line, followed by a summary.
///
/// Color scheme:
/// - Added: green
/// - Removed: red
/// - Modified: yellow
/// - Moved: cyan
fn format_listing(delta: Option<&Delta>, options: &OutputOptions, with_color: bool) -> String {
    let changes = delta.map(Delta::changes).unwrap_or_default();

    if changes.is_empty() {
        let message = "No changes detected.";
        return if with_color {
            message.dimmed().to_string()
        } else {
            message.to_string()
        };
    }

    let mut output = String::new();
    for change in &changes {
        let line = if with_color {
            format_change_terminal(change, options)
        } else {
            format_change_plain(change, options)
        };
        output.push_str(&line);
        output.push('\n');
    }

    if options.show_summary {
        output.push('\n');
        output.push_str(&format_summary(&DeltaStats::from_delta(delta)));
    }

    output
}

fn format_change_terminal(change: &Change, options: &OutputOptions) -> String {
    let path = format_path(&change.path);

    match change.change_type {
        ChangeType::Added => {
            let value = format_value(change.new_value.as_ref(), options);
            format!("{} {}: {}", "+".bright_green(), path.green(), value.green())
        }
        ChangeType::Removed => {
            let value = format_value(change.old_value.as_ref(), options);
            format!("{} {}: {}", "-".bright_red(), path.red(), value.red())
        }
        ChangeType::Modified => {
            let old_value = format_value(change.old_value.as_ref(), options);
            let new_value = format_value(change.new_value.as_ref(), options);
            format!(
                "{} {}: {} {} {}",
                "•".bright_yellow(),
                path.yellow(),
                old_value.yellow(),
                "→".bright_yellow(),
                new_value.yellow()
            )
        }
        ChangeType::Moved => format!(
            "{} {}: {}",
            "↷".bright_cyan(),
            path.cyan(),
            describe_move(change, options).cyan()
        ),
    }
}

fn format_change_plain(change: &Change, options: &OutputOptions) -> String {
    let path = format_path(&change.path);

    match change.change_type {
        ChangeType::Added => {
            format!("+ {}: {}", path, format_value(change.new_value.as_ref(), options))
        }
        ChangeType::Removed => {
            format!("- {}: {}", path, format_value(change.old_value.as_ref(), options))
        }
        ChangeType::Modified => format!(
            "• {}: {} → {}",
            path,
            format_value(change.old_value.as_ref(), options),
            format_value(change.new_value.as_ref(), options)
        ),
        ChangeType::Moved => format!("↷ {}: {}", path, describe_move(change, options)),
    }
}

fn describe_move(change: &Change, options: &OutputOptions) -> String {
    let target = change.moved_to.unwrap_or_default();
    match &change.old_value {
        Some(value) => format!(
            "{} moved to index {}",
            format_value(Some(value), options),
            target
        ),
        None => format!("moved to index {}", target),
    }
}

/// Converts a path vector to a readable string.
///
/// - `["user", "name"]` → `"user.name"`
/// - `["items", "[0]", "id"]` → `"items[0].id"`
/// - `[]` → `"(root)"`
fn format_path(path: &[String]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }

    let mut result = String::new();
    for (i, component) in path.iter().enumerate() {
        if !component.starts_with('[') && i > 0 {
            result.push('.');
        }
        result.push_str(component);
    }
    result
}

fn format_value(node: Option<&Node>, options: &OutputOptions) -> String {
    match node {
        Some(node) if options.show_values => node.render(options.max_value_length),
        Some(node) => node.preview(options.max_value_length),
        None => String::new(),
    }
}

fn format_summary(stats: &DeltaStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let mut parts = Vec::new();
    if stats.added > 0 {
        parts.push(format!("{} added", stats.added));
    }
    if stats.removed > 0 {
        parts.push(format!("{} removed", stats.removed));
    }
    if stats.modified > 0 {
        parts.push(format!("{} modified", stats.modified));
    }
    if stats.moved > 0 {
        parts.push(format!("{} moved", stats.moved));
    }

    format!("Summary: {}", parts.join(", "))
}
