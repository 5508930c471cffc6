//! Integration tests for the Elasticsearch adapter and bulk indexer

use regdoc::config::SearchConfig;
use regdoc::index::{
    index_batch, regulatory_mapping, run_search, ElasticClient, SearchBackend, SearchQuery,
};
use regdoc::ingest::DocumentRecord;
use serde_json::{json, Map, Value};
use wiremock::matchers::{
    body_json, body_partial_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = "anla_resoluciones";

fn search_config(url: &str) -> SearchConfig {
    SearchConfig {
        url: url.to_string(),
        index: INDEX.to_string(),
        api_key: Some("secret".to_string()),
        username: None,
        password: None,
        timeout_secs: 5,
        bulk_chunk_size: 500,
    }
}

fn client(server: &MockServer) -> ElasticClient {
    ElasticClient::new(reqwest::Client::new(), &search_config(&server.uri()))
}

fn record(id: &str) -> DocumentRecord {
    let mut fields = Map::new();
    fields.insert("id_archivo".to_string(), Value::from(id));
    fields.insert("empresa".to_string(), Value::from("ACME"));
    DocumentRecord {
        id: id.to_string(),
        fields,
    }
}

fn bulk_items(ids: &[&str]) -> Value {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "index": { "_id": id, "status": 201 } }))
        .collect();
    json!({ "errors": false, "items": items })
}

#[tokio::test]
async fn test_bulk_reports_per_document_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(header("authorization", "ApiKey secret"))
        .and(header("content-type", "application/x-ndjson"))
        .and(body_string_contains(r#""_id":"R-1""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": true,
            "items": [
                { "index": { "_id": "R-1", "status": 201 } },
                { "index": { "_id": "R-2", "status": 400,
                    "error": { "type": "mapper_parsing_exception",
                               "reason": "failed to parse field [fecha_resolución]" } } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = index_batch(&client(&server), &[record("R-1"), record("R-2")], INDEX, 500).await;

    assert!(report.success);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.rejection_details[0].id, "R-2");
    assert_eq!(report.rejection_details[0].status, 400);
    assert!(report.rejection_details[0].reason.contains("fecha_resolución"));
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_bulk_is_chunked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(body_string_contains(r#""_id":"c""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(bulk_items(&["c"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bulk_items(&["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;

    let records = vec![record("a"), record("b"), record("c")];
    let report = index_batch(&client(&server), &records, INDEX, 2).await;

    assert!(report.success);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, 0);
}

#[tokio::test]
async fn test_auth_failure_rejects_whole_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let records = vec![record("a"), record("b"), record("c")];
    let report = index_batch(&client(&server), &records, INDEX, 500).await;

    assert!(!report.success);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.rejected, 3);
    assert!(report.error.unwrap().contains("401"));
}

#[tokio::test]
async fn test_unreachable_engine_fails_batch() {
    let config = search_config("http://127.0.0.1:9");
    let backend = ElasticClient::new(reqwest::Client::new(), &config);

    let report = index_batch(&backend, &[record("a")], INDEX, 500).await;
    assert!(!report.success);
    assert_eq!(report.rejected, 1);
    assert!(report.error.is_some());
}

#[tokio::test]
async fn test_search_builds_query_and_parses_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/_search", INDEX)))
        .and(body_partial_json(json!({
            "size": 100,
            "query": { "multi_match": { "query": "licencia" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [ { "_id": "R-1", "_score": 2.0, "_source": { "empresa": "ACME" } } ]
            },
            "aggregations": {
                "resoluciones_por_empresa": { "buckets": [ { "key": "ACME", "doc_count": 1 } ] }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run_search(&client(&server), INDEX, &SearchQuery::new("licencia"))
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.hits[0].id, "R-1");
    assert_eq!(result.hits[0].source["empresa"], "ACME");
    assert_eq!(
        result.aggregations["resoluciones_por_empresa"]["buckets"][0]["doc_count"],
        1
    );
}

#[tokio::test]
async fn test_document_operations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/_doc/R-1", INDEX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "R-1", "found": true, "_source": { "empresa": "ACME" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/_doc/missing", INDEX)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "found": false })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}/_doc/R-2", INDEX)))
        .and(body_partial_json(json!({ "empresa": "Nueva" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{}/_doc/missing", INDEX)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "result": "not_found" })))
        .mount(&server)
        .await;

    let backend = client(&server);
    assert_eq!(
        backend.get(INDEX, "R-1").await.unwrap(),
        Some(json!({ "empresa": "ACME" }))
    );
    assert_eq!(backend.get(INDEX, "missing").await.unwrap(), None);
    backend
        .put(INDEX, "R-2", &json!({ "empresa": "Nueva" }))
        .await
        .unwrap();
    assert!(!backend.delete(INDEX, "missing").await.unwrap());
}

#[tokio::test]
async fn test_create_index_existing_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{}", INDEX)))
        .and(body_partial_json(json!({
            "mappings": { "properties": { "empresa_normalizada": { "type": "keyword" } } }
        })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "resource_already_exists_exception", "reason": "exists" },
            "status": 400
        })))
        .mount(&server)
        .await;

    let created = client(&server)
        .create_index(INDEX, &regulatory_mapping())
        .await
        .unwrap();
    assert!(!created);
}

#[tokio::test]
async fn test_ping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": { "number": "8.11.0" }
        })))
        .mount(&server)
        .await;

    assert!(client(&server).ping().await.is_ok());

    let unreachable = ElasticClient::new(
        reqwest::Client::new(),
        &search_config("http://127.0.0.1:9"),
    );
    assert!(unreachable.ping().await.is_err());
}

#[tokio::test]
async fn test_list_indices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .and(query_param("format", "json"))
        .and(query_param("h", "index,docs.count,store.size,health,status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "index": INDEX, "docs.count": "1520", "store.size": "48.1mb",
              "health": "yellow", "status": "open" },
            { "index": "archivo_2019", "docs.count": null, "store.size": null,
              "health": "red", "status": "close" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let indices = client(&server).list_indices().await.unwrap();

    assert_eq!(indices.len(), 2);
    assert_eq!(indices[0].name, INDEX);
    assert_eq!(indices[0].doc_count, 1520);
    assert_eq!(indices[0].size, "48.1mb");
    assert_eq!(indices[0].health, "yellow");
    assert_eq!(indices[1].name, "archivo_2019");
    assert_eq!(indices[1].doc_count, 0);
    assert_eq!(indices[1].status, "close");
}

#[tokio::test]
async fn test_delete_index() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{}", INDEX)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception" }, "status": 404
        })))
        .mount(&server)
        .await;

    let backend = client(&server);
    assert!(backend.delete_index(INDEX).await.unwrap());
    assert!(!backend.delete_index("missing").await.unwrap());
}

#[tokio::test]
async fn test_partial_update() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/_update/R-1", INDEX)))
        .and(body_json(json!({ "doc": { "estado": "archivado" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "updated" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/_update/missing", INDEX)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "document_missing_exception" }, "status": 404
        })))
        .mount(&server)
        .await;

    let backend = client(&server);
    let partial = json!({ "estado": "archivado" });
    assert!(backend.update(INDEX, "R-1", &partial).await.unwrap());
    assert!(!backend.update(INDEX, "missing", &partial).await.unwrap());
}
