//! Loading the recorded event source from disk

use crate::domain::event::{Event, EventSequence};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that prevent the event source from loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse JSON: expected a top-level array of events, found {found}")]
    NotASequence { found: &'static str },
}

/// Holds the immutable event sequence loaded at startup
#[derive(Debug, Clone)]
pub struct EventStore {
    events: EventSequence,
}

impl EventStore {
    /// Read and parse the whole source file. Either every event loads or
    /// none does.
    #[instrument(fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, LoadError> {
        let content = tokio::fs::read(path).await.map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_slice(&content)?;
        debug!(events = store.len(), "Event source loaded");
        Ok(store)
    }

    /// Parse an in-memory source document
    pub fn from_slice(content: &[u8]) -> Result<Self, LoadError> {
        match serde_json::from_slice::<Value>(content)? {
            Value::Array(items) => Ok(Self {
                events: items.into_iter().map(Event::from).collect::<Vec<_>>().into(),
            }),
            other => Err(LoadError::NotASequence {
                found: json_kind(&other),
            }),
        }
    }

    pub fn events(&self) -> EventSequence {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_preserves_source_order() {
        let file = source_file(r#"[{"a":1},{"a":2},{"a":3}]"#);

        let store = EventStore::load(file.path()).await.unwrap();

        let values: Vec<_> = store.events().iter().map(|e| e.as_value().clone()).collect();
        assert_eq!(values, vec![json!({"a":1}), json!({"a":2}), json!({"a":3})]);
    }

    #[tokio::test]
    async fn test_load_accepts_mixed_values() {
        let file = source_file(r#"[1, "two", null, [3], {"four": 4}, true]"#);

        let store = EventStore::load(file.path()).await.unwrap();

        assert_eq!(store.len(), 6);
        assert_eq!(store.events().get(1).map(Event::as_value), Some(&json!("two")));
    }

    #[tokio::test]
    async fn test_load_empty_array() {
        let file = source_file("[]");

        let store = EventStore::load(file.path()).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");

        let err = EventStore::load(&missing).await.unwrap_err();

        assert!(matches!(err, LoadError::Read { ref path, .. } if *path == missing));
        assert!(err.to_string().starts_with("failed to read file"));
    }

    #[rstest]
    #[case(r#"{"a":1}"#, "an object")]
    #[case("42", "a number")]
    #[case(r#""events""#, "a string")]
    #[case("null", "null")]
    fn test_rejects_non_array_top_level(#[case] content: &str, #[case] kind: &str) {
        let err = EventStore::from_slice(content.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::NotASequence { found } if found == kind));
    }

    #[rstest]
    #[case(r#"[{"a":1},{"a":"#)]
    #[case("")]
    #[case("[1,,2]")]
    fn test_rejects_malformed_json(#[case] content: &str) {
        let err = EventStore::from_slice(content.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let err = EventStore::from_slice(b"[\"\xff\xfe\"]").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
        ]
    }

    fn json_value() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_loaded_sequence_matches_source(values in prop::collection::vec(json_value(), 0..16)) {
            let content = serde_json::to_vec(&values).unwrap();

            let store = EventStore::from_slice(&content).unwrap();

            prop_assert_eq!(store.len(), values.len());
            for (event, expected) in store.events().iter().zip(&values) {
                prop_assert_eq!(event.as_value(), expected);
            }
        }
    }
}
