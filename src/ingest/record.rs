//! Search documents built by the normalizer

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Field carrying an explicit document identifier
pub const ID_FIELD: &str = "id_archivo";

/// A search document: a stable identifier plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl DocumentRecord {
    /// Builds a record, deriving its identifier from the fields or the source key
    pub fn new(fields: Map<String, Value>, source_key: &str) -> Self {
        let id = derive_id(&fields, source_key);
        Self { id, fields }
    }
}

/// Derives a stable identifier for a record
///
/// A non-empty string or numeric `id_archivo` field is used as is. Otherwise
/// the identifier is the SHA-256 hex digest of the source key (the file's
/// path relative to the listing root), so the same file always maps to the
/// same document and same-named files in different folders stay distinct.
///
/// # Examples
///
/// ```
/// use regdoc::ingest::derive_id;
/// use serde_json::json;
///
/// let fields = json!({"id_archivo": 42}).as_object().unwrap().clone();
/// assert_eq!(derive_id(&fields, "r.json"), "42");
///
/// let empty = serde_json::Map::new();
/// assert_eq!(derive_id(&empty, "r.json").len(), 64);
/// ```
pub fn derive_id(fields: &Map<String, Value>, source_key: &str) -> String {
    match fields.get(ID_FIELD) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            let mut hasher = Sha256::new();
            hasher.update(source_key.as_bytes());
            hex::encode(hasher.finalize())
        }
    }
}
