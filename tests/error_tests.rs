use jdelta::{parse_document, Delta, JdeltaError, ParseError};

#[test]
fn test_parse_error_names_document() {
    let err = parse_document("[1,", "left document").unwrap_err();
    assert!(matches!(err, ParseError::JsonError { .. }));
    assert!(err.to_string().contains("left document"));
}

#[test]
fn test_unknown_format_error() {
    let err = ParseError::unknown_format("/path/to/file.txt");
    assert!(err.to_string().contains("Could not detect file format"));
    assert!(err.to_string().contains("/path/to/file.txt"));
}

#[test]
fn test_jdelta_error_wraps_parse_error() {
    let err: JdeltaError = ParseError::file_not_found("test.json").into();
    assert!(matches!(err, JdeltaError::Parse(_)));
    assert_eq!(err.to_string(), "File not found: test.json");
}

#[test]
fn test_delta_format_error_names_path() {
    let err = Delta::from_value(&serde_json::json!({"a": 1})).unwrap_err();
    assert_eq!(err.path, "/a");
    assert!(err.to_string().starts_with("Malformed delta at /a"));
}

#[test]
fn test_argument_count_error() {
    let err = JdeltaError::ArgumentCount {
        expected: 2,
        found: 0,
    };
    assert!(err.to_string().contains("got 0"));
}
