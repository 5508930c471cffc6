//! Elasticsearch REST adapter

use crate::config::SearchConfig;
use crate::index::traits::{BackendResult, BulkItem, IndexInfo, SearchBackend, SearchError};
use crate::ingest::DocumentRecord;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "ELASTIC_API_KEY";

#[derive(Debug, Clone)]
enum Auth {
    None,
    ApiKey(String),
    Basic {
        username: String,
        password: Option<String>,
    },
}

/// Search backend speaking the Elasticsearch REST API
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    base_url: String,
    auth: Auth,
    timeout: Duration,
}

impl ElasticClient {
    /// Creates a client from the search configuration
    ///
    /// An API key takes precedence over basic authentication; when neither
    /// `api-key` nor a username is configured, `ELASTIC_API_KEY` is used if set.
    pub fn new(client: Client, config: &SearchConfig) -> Self {
        let configured_key = config.api_key.clone().filter(|key| !key.trim().is_empty());
        let auth = if let Some(key) = configured_key {
            Auth::ApiKey(key)
        } else if let Some(username) = &config.username {
            Auth::Basic {
                username: username.clone(),
                password: config.password.clone(),
            }
        } else {
            match std::env::var(API_KEY_ENV) {
                Ok(key) if !key.trim().is_empty() => Auth::ApiKey(key),
                _ => Auth::None,
            }
        };

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            auth,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url).timeout(self.timeout);
        match &self.auth {
            Auth::None => builder,
            Auth::ApiKey(key) => builder.header("Authorization", format!("ApiKey {}", key)),
            Auth::Basic { username, password } => builder.basic_auth(username, password.as_ref()),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> BackendResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))
    }

    /// Turns auth failures and other non-2xx statuses into errors
    async fn check(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Auth(status.as_u16()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(SearchError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn json(response: Response) -> BackendResult<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))
    }
}

/// Columns requested from the cat indices API
const CAT_INDICES_PATH: &str = "_cat/indices?format=json&h=index,docs.count,store.size,health,status";

fn doc_path(index: &str, id: &str) -> String {
    format!("{}/_doc/{}", index, urlencoding::encode(id))
}

/// Builds the NDJSON body of a bulk request
fn bulk_body(index: &str, docs: &[DocumentRecord]) -> BackendResult<String> {
    let mut body = String::new();
    for doc in docs {
        let action = json!({ "index": { "_index": index, "_id": doc.id } });
        let source = serde_json::to_string(&doc.fields)
            .map_err(|e| SearchError::InvalidQuery(e.to_string()))?;
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(&source);
        body.push('\n');
    }
    Ok(body)
}

/// Reads per-document outcomes from a bulk response
fn parse_bulk_items(response: &Value) -> BackendResult<Vec<BulkItem>> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::InvalidResponse("bulk response without items".into()))?;

    Ok(items
        .iter()
        .filter_map(|item| item.as_object()?.values().next())
        .map(|result| {
            let error = result.get("error").map(|e| match e.get("reason") {
                Some(Value::String(reason)) => reason.clone(),
                _ => e.to_string(),
            });
            BulkItem {
                id: result
                    .get("_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                status: result.get("status").and_then(Value::as_u64).unwrap_or(0) as u16,
                error,
            }
        })
        .collect())
}

/// Reads a cat indices response; closed indices report no count or size
fn parse_indices(response: &Value) -> BackendResult<Vec<IndexInfo>> {
    let rows = response
        .as_array()
        .ok_or_else(|| SearchError::InvalidResponse("cat indices did not return a list".into()))?;

    let text = |row: &Value, key: &str, default: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };

    let mut indices: Vec<IndexInfo> = rows
        .iter()
        .map(|row| IndexInfo {
            name: text(row, "index", ""),
            doc_count: match row.get("docs.count") {
                Some(Value::String(count)) => count.parse().unwrap_or(0),
                Some(count) => count.as_u64().unwrap_or(0),
                None => 0,
            },
            size: text(row, "store.size", "0b"),
            health: text(row, "health", "unknown"),
            status: text(row, "status", "unknown"),
        })
        .collect();
    indices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(indices)
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn ping(&self) -> BackendResult<()> {
        let response = self.send(self.request(Method::GET, "/")).await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_index(&self, index: &str, body: &Value) -> BackendResult<bool> {
        let response = self
            .send(self.request(Method::PUT, index).json(body))
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = Self::json(response).await?;
            let kind = body
                .pointer("/error/type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if kind == "resource_already_exists_exception" {
                return Ok(false);
            }
            return Err(SearchError::Http {
                status: 400,
                body: body.to_string(),
            });
        }

        Self::check(response).await?;
        Ok(true)
    }

    async fn list_indices(&self) -> BackendResult<Vec<IndexInfo>> {
        let response = self.send(self.request(Method::GET, CAT_INDICES_PATH)).await?;
        parse_indices(&Self::json(Self::check(response).await?).await?)
    }

    async fn delete_index(&self, index: &str) -> BackendResult<bool> {
        let response = self.send(self.request(Method::DELETE, index)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    async fn bulk_index(
        &self,
        index: &str,
        docs: &[DocumentRecord],
    ) -> BackendResult<Vec<BulkItem>> {
        let body = bulk_body(index, docs)?;
        let response = self
            .send(
                self.request(Method::POST, "_bulk")
                    .header("Content-Type", "application/x-ndjson")
                    .body(body),
            )
            .await?;
        let response = Self::check(response).await?;
        parse_bulk_items(&Self::json(response).await?)
    }

    async fn search(&self, index: &str, body: &Value) -> BackendResult<Value> {
        let response = self
            .send(self.request(Method::POST, &format!("{}/_search", index)).json(body))
            .await?;
        Self::json(Self::check(response).await?).await
    }

    async fn get(&self, index: &str, id: &str) -> BackendResult<Option<Value>> {
        let response = self.send(self.request(Method::GET, &doc_path(index, id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::json(Self::check(response).await?).await?;
        Ok(body.get("_source").cloned())
    }

    async fn put(&self, index: &str, id: &str, doc: &Value) -> BackendResult<()> {
        let response = self
            .send(self.request(Method::PUT, &doc_path(index, id)).json(doc))
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, index: &str, id: &str, partial: &Value) -> BackendResult<bool> {
        let path = format!("{}/_update/{}", index, urlencoding::encode(id));
        let response = self
            .send(
                self.request(Method::POST, &path)
                    .json(&json!({ "doc": partial })),
            )
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    async fn delete(&self, index: &str, id: &str) -> BackendResult<bool> {
        let response = self
            .send(self.request(Method::DELETE, &doc_path(index, id)))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }
}
