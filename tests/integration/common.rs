//! Shared fixtures

use async_trait::async_trait;
use regdoc::config::{parse_config, Config};
use regdoc::index::{BackendResult, BulkItem, IndexInfo, SearchBackend};
use regdoc::ingest::DocumentRecord;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// Builds a validated configuration pointing at the given mock servers and directory
pub fn test_config(site_uri: &str, search_uri: &str, dir: &Path) -> Config {
    let toml = format!(
        r#"
[crawler]
seed-url = "{site}/Normativa/"
listing-extensions = ["aspx"]
document-extensions = ["pdf"]
max-iterations = 5
request-timeout-secs = 5

[storage]
link-store-path = "{dir}/links.json"

[download]
destination-dir = "{dir}/uploads"
timeout-secs = 5

[ingest]
ocr-enabled = false

[search]
url = "{search}"
index = "anla_resoluciones"
bulk-chunk-size = 2
timeout-secs = 5
"#,
        site = site_uri,
        search = search_uri,
        dir = dir.display()
    );
    parse_config(&toml).expect("test config must be valid")
}

/// Listing page with the given anchors inside the content container
pub fn listing_page(hrefs: &[String]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();
    format!(
        r#"<html><body>
        <div class="menu"><a href="/Normativa/menu.aspx">Menu</a></div>
        <div class="containerblanco"><ul>{}</ul></div>
        </body></html>"#,
        anchors
    )
}

/// In-memory search backend keyed by index, then document id
#[derive(Default)]
pub struct MemoryBackend {
    indices: Mutex<BTreeMap<String, BTreeMap<String, Value>>>,
}

impl MemoryBackend {
    pub fn count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map_or(0, |docs| docs.len())
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn ping(&self) -> BackendResult<()> {
        Ok(())
    }

    async fn create_index(&self, index: &str, _body: &Value) -> BackendResult<bool> {
        let mut indices = self.indices.lock().unwrap();
        if indices.contains_key(index) {
            return Ok(false);
        }
        indices.insert(index.to_string(), BTreeMap::new());
        Ok(true)
    }

    async fn list_indices(&self) -> BackendResult<Vec<IndexInfo>> {
        Ok(self
            .indices
            .lock()
            .unwrap()
            .iter()
            .map(|(name, docs)| IndexInfo {
                name: name.clone(),
                doc_count: docs.len() as u64,
                size: "0b".to_string(),
                health: "green".to_string(),
                status: "open".to_string(),
            })
            .collect())
    }

    async fn delete_index(&self, index: &str) -> BackendResult<bool> {
        Ok(self.indices.lock().unwrap().remove(index).is_some())
    }

    async fn bulk_index(
        &self,
        index: &str,
        docs: &[DocumentRecord],
    ) -> BackendResult<Vec<BulkItem>> {
        let mut indices = self.indices.lock().unwrap();
        let target = indices.entry(index.to_string()).or_default();
        Ok(docs
            .iter()
            .map(|doc| {
                let created = target
                    .insert(doc.id.clone(), Value::Object(doc.fields.clone()))
                    .is_none();
                BulkItem {
                    id: doc.id.clone(),
                    status: if created { 201 } else { 200 },
                    error: None,
                }
            })
            .collect())
    }

    async fn search(&self, _index: &str, _body: &Value) -> BackendResult<Value> {
        Ok(serde_json::json!({ "hits": { "total": { "value": 0 }, "hits": [] } }))
    }

    async fn get(&self, index: &str, id: &str) -> BackendResult<Option<Value>> {
        Ok(self
            .indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn put(&self, index: &str, id: &str, doc: &Value) -> BackendResult<()> {
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), doc.clone());
        Ok(())
    }

    async fn update(&self, index: &str, id: &str, partial: &Value) -> BackendResult<bool> {
        let mut indices = self.indices.lock().unwrap();
        let Some(Value::Object(doc)) = indices.get_mut(index).and_then(|docs| docs.get_mut(id))
        else {
            return Ok(false);
        };
        if let Value::Object(fields) = partial {
            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }
        }
        Ok(true)
    }

    async fn delete(&self, index: &str, id: &str) -> BackendResult<bool> {
        Ok(self
            .indices
            .lock()
            .unwrap()
            .get_mut(index)
            .map_or(false, |docs| docs.remove(id).is_some()))
    }
}
