//! Chat corpus documents.
//!
//! Documents are persisted as a JSON list of [`DocumentRecord`]s and turned
//! into immutable [`Document`]s once at startup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// A corpus document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Map::new(),
        }
    }
}

/// On-disk form of a document.
///
/// `id` may be a string, a number, or absent; absent ids are derived from the
/// content hash so they stay stable across restarts. `meta` is accepted as an
/// alias for `metadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRecord {
    #[serde(default)]
    pub id: Option<Value>,
    pub content: String,
    #[serde(default, alias = "meta")]
    pub metadata: Option<Map<String, Value>>,
}

impl DocumentRecord {
    pub fn into_document(self) -> Document {
        let id = match self.id {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => content_id(&self.content),
        };
        Document {
            id,
            content: self.content,
            metadata: self.metadata.unwrap_or_default(),
        }
    }
}

/// Hex SHA-256 of the document content.
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Document {
        serde_json::from_str::<DocumentRecord>(json)
            .unwrap()
            .into_document()
    }

    #[test]
    fn test_string_and_numeric_ids() {
        assert_eq!(parse(r#"{"id": "doc-7", "content": "x"}"#).id, "doc-7");
        assert_eq!(parse(r#"{"id": 1, "content": "x"}"#).id, "1");
    }

    #[test]
    fn test_missing_id_uses_content_hash() {
        let a = parse(r#"{"content": "churn risk high"}"#);
        let b = parse(r#"{"content": "churn risk high", "id": null}"#);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 64);
        assert_eq!(a.id, content_id("churn risk high"));
    }

    #[test]
    fn test_meta_alias() {
        let doc = parse(r#"{"id": "a", "content": "x", "meta": {"customerID": "0001"}}"#);
        assert_eq!(doc.metadata["customerID"], "0001");
    }
}
