//! Search request building and response parsing

use crate::index::traits::SearchError;
use serde::Serialize;
use serde_json::{json, Value};

/// Pseudo-field selecting the weighted multi-field query
pub const ALL_FIELDS: &str = "_all";

/// Fields searched for `_all`, with boosts
pub const WEIGHTED_FIELDS: &[&str] = &[
    "texto_completo",
    "numero_resolución^3",
    "nombre_proyecto^2",
    "empresa^2",
    "descripcion^2",
    "numero_expediente",
    "radicados",
];

pub const DEFAULT_SEARCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub field: String,
    pub size: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            field: ALL_FIELDS.to_string(),
            size: DEFAULT_SEARCH_SIZE,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// Builds the request body of a search
///
/// Aggregations always ask for results per year, the top ten companies and
/// the top ten infraction types.
pub fn build_search_body(query: &SearchQuery) -> Result<Value, SearchError> {
    let text = query.text.trim();
    if text.is_empty() {
        return Err(SearchError::InvalidQuery(
            "search text must not be empty".to_string(),
        ));
    }

    let field = query.field.trim();
    let clause = if field.is_empty() || field == ALL_FIELDS {
        json!({ "multi_match": { "query": text, "fields": WEIGHTED_FIELDS } })
    } else {
        json!({ "match": { field: text } })
    };

    Ok(json!({
        "query": clause,
        "size": query.size,
        "aggs": {
            "resoluciones_por_anio": {
                "date_histogram": {
                    "field": "fecha_resolución",
                    "calendar_interval": "year"
                }
            },
            "resoluciones_por_empresa": {
                "terms": { "field": "empresa.keyword", "size": 10 }
            },
            "resoluciones_por_infraccion": {
                "terms": { "field": "tipos_infraccion", "size": 10 }
            }
        }
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: Option<f64>,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<SearchHit>,
    pub aggregations: Value,
}

impl SearchResult {
    /// Reads a raw `_search` response
    pub fn from_response(response: &Value) -> Result<Self, SearchError> {
        let hits = response
            .get("hits")
            .ok_or_else(|| SearchError::InvalidResponse("search response without hits".into()))?;

        // The engine reports either {"value": n} or a bare number
        let total = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
            None => 0,
        };

        let hits = hits
            .get("hits")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .map(|hit| SearchHit {
                        id: hit
                            .get("_id")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                        score: hit.get("_score").and_then(Value::as_f64),
                        source: hit.get("_source").cloned().unwrap_or(Value::Null),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            total,
            hits,
            aggregations: response
                .get("aggregations")
                .cloned()
                .unwrap_or_else(|| json!({})),
        })
    }
}
