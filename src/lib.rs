//! jdelta - structural diff for JSON documents.
//!
//! This library compares two JSON trees and produces a delta describing the
//! minimal edit from the first to the second: object keys added, removed or
//! modified, and array items inserted, deleted or moved. Deltas serialize to
//! the jsondiffpatch format.
//!
//! # Example
//!
//! ```
//! use jdelta::{diff, format_delta, parse_document, OutputFormat, OutputOptions};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_document(r#"{"tags": [1, 2, 3]}"#, "left")?;
//! let new = parse_document(r#"{"tags": [1, 3, 2], "x": 1}"#, "right")?;
//!
//! let delta = diff(&old, &new);
//!
//! let output = format_delta(delta.as_ref(), OutputFormat::Compact, &OutputOptions::default())?;
//! assert_eq!(output, r#"{"tags":{"_2":["",1,3],"_t":"a"},"x":[1]}"#);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod delta;
pub mod diff;
pub mod error;
pub mod filter;
pub mod output;
pub mod parser;
pub mod tree;

// Re-export commonly used types for convenience
pub use delta::{ArrayKey, Change, ChangeType, Delta, DeltaStats};
pub use diff::{compute_delta, diff, DiffConfig, DiffEngine};
pub use error::{DeltaFormatError, JdeltaError, OutputError, ParseError};
pub use filter::{filter_delta, FilterConfig, PathPattern};
pub use output::{format_delta, OutputFormat, OutputOptions};
pub use parser::{parse_document, parse_file, parse_json, parse_toml, parse_yaml};
pub use tree::Node;
