//! Custom error types for jdelta.

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid JSON in {source_name}: {source}")]
    JsonError {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not detect file format for {path}")]
    UnknownFormat { path: String },
}

/// A serialized delta that does not follow the delta wire format.
#[derive(Debug, thiserror::Error)]
#[error("Malformed delta at {path}: {message}")]
pub struct DeltaFormatError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum JdeltaError {
    #[error("Expected exactly {expected} JSON arguments, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ParseError {
    pub fn json_error(source_name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonError {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn yaml_error(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlError {
            path: path.into(),
            source,
        }
    }

    pub fn toml_error(path: impl Into<String>, source: toml::de::Error) -> Self {
        Self::TomlError {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_format(path: impl Into<String>) -> Self {
        Self::UnknownFormat { path: path.into() }
    }
}

impl DeltaFormatError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
