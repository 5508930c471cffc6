//! Integration tests for the crawler

use crate::common::listing_page;
use regdoc::config::UserAgentConfig;
use regdoc::crawler::{build_http_client, CrawlSettings, Crawler};
use regdoc::storage::{JsonLinkStore, Link, LinkSet, LinkStore};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> CrawlSettings {
    CrawlSettings {
        container_selector: "div.containerblanco".to_string(),
        listing_extensions: vec!["aspx".to_string()],
        base_prefix: None,
    }
}

fn extensions() -> Vec<String> {
    vec!["pdf".to_string(), "aspx".to_string()]
}

async fn mount_page(server: &MockServer, page: &str, hrefs: Vec<String>, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&hrefs))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_breadth_first_crawl_accumulates_unique_documents() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());

    Mock::given(method("GET"))
        .and(path("/Normativa/"))
        .and(header("user-agent", "regdoc-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            format!("{}/p1.aspx", base),
            format!("{}/a.pdf", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/Normativa/p1.aspx",
        vec![
            "p2.aspx".to_string(),
            "b.pdf".to_string(),
            format!("{}/a.pdf", base),
        ],
        1,
    )
    .await;
    mount_page(
        &server,
        "/Normativa/p2.aspx",
        vec!["c.PDF".to_string(), "p1.aspx".to_string(), "d.docx".to_string()],
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let user_agent = UserAgentConfig {
        value: "regdoc-test/1.0".to_string(),
    };
    let client = build_http_client(&user_agent, Duration::from_secs(5)).unwrap();
    let crawler = Crawler::new(&client, &store, settings());

    let outcome = crawler
        .crawl(&format!("{}/", base), &extensions(), 5)
        .await
        .unwrap();

    assert_eq!(outcome.fetches, 2);
    assert!(!outcome.iteration_limit_reached);
    assert!(outcome.failed_pages.is_empty());

    let urls: Vec<_> = outcome.links.iter().map(|l| l.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/p1.aspx", base),
            format!("{}/a.pdf", base),
            format!("{}/p2.aspx", base),
            format!("{}/b.pdf", base),
            format!("{}/c.PDF", base),
        ]
    );
    assert_eq!(outcome.links.of_type("pdf").count(), 3);

    // Persisted set matches what was returned
    assert_eq!(store.load().unwrap(), outcome.links);
}

#[tokio::test]
async fn test_iteration_limit_stops_crawl() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());

    mount_page(&server, "/Normativa/", vec!["p1.aspx".to_string()], 1).await;
    mount_page(&server, "/Normativa/p1.aspx", vec!["p2.aspx".to_string()], 1).await;
    mount_page(&server, "/Normativa/p2.aspx", vec!["x.pdf".to_string()], 0).await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let client = reqwest::Client::new();
    let crawler = Crawler::new(&client, &store, settings());

    let outcome = crawler
        .crawl(&format!("{}/", base), &extensions(), 1)
        .await
        .unwrap();

    assert_eq!(outcome.fetches, 1);
    assert!(outcome.iteration_limit_reached);
    assert!(outcome.links.contains(&format!("{}/p2.aspx", base)));
    assert!(!outcome.links.contains(&format!("{}/x.pdf", base)));
    assert!(store.path().exists());
}

#[tokio::test]
async fn test_resume_skips_seed_and_never_duplicates() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());

    mount_page(&server, "/Normativa/", vec![], 0).await;
    mount_page(
        &server,
        "/Normativa/p1.aspx",
        vec!["a.pdf".to_string(), "new.pdf".to_string()],
        2,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    store
        .save(&LinkSet::from_links(vec![
            Link::new(format!("{}/p1.aspx", base), "aspx"),
            Link::new(format!("{}/a.pdf", base), "pdf"),
        ]))
        .unwrap();

    let client = reqwest::Client::new();
    let crawler = Crawler::new(&client, &store, settings());

    let first = crawler
        .crawl(&format!("{}/", base), &extensions(), 5)
        .await
        .unwrap();
    assert_eq!(first.links.len(), 3);
    assert_eq!(first.fetches, 1);

    let second = crawler
        .crawl(&format!("{}/", base), &extensions(), 5)
        .await
        .unwrap();
    assert_eq!(second.links, first.links);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let entries = raw["links"].as_array().unwrap();
    let unique: HashSet<_> = entries.iter().map(|e| e["url"].as_str().unwrap()).collect();
    assert_eq!(unique.len(), entries.len());
}

#[tokio::test]
async fn test_zero_iterations_makes_no_requests() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());
    mount_page(&server, "/Normativa/", vec![], 0).await;
    mount_page(&server, "/Normativa/p1.aspx", vec![], 0).await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let persisted = LinkSet::from_links(vec![
        Link::new(format!("{}/p1.aspx", base), "aspx"),
        Link::new(format!("{}/a.pdf", base), "pdf"),
    ]);
    store.save(&persisted).unwrap();

    let client = reqwest::Client::new();
    let outcome = Crawler::new(&client, &store, settings())
        .crawl(&format!("{}/", base), &extensions(), 0)
        .await
        .unwrap();

    assert_eq!(outcome.links, persisted);
    assert_eq!(outcome.fetches, 0);
}

#[tokio::test]
async fn test_links_outside_prefix_or_extension_never_output() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());
    mount_page(
        &server,
        "/Normativa/",
        vec![
            format!("{}/Otros/x.pdf", server.uri()),
            "https://other.example/Normativa/y.pdf".to_string(),
            "z.doc".to_string(),
            "ok.pdf".to_string(),
            "mailto:info@example.gov".to_string(),
        ],
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let client = reqwest::Client::new();
    let outcome = Crawler::new(&client, &store, settings())
        .crawl(&format!("{}/", base), &extensions(), 5)
        .await
        .unwrap();

    assert_eq!(
        outcome.links.into_links(),
        vec![Link::new(format!("{}/ok.pdf", base), "pdf")]
    );
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let server = MockServer::start().await;
    let base = format!("{}/Normativa", server.uri());
    mount_page(
        &server,
        "/Normativa/",
        vec!["broken.aspx".to_string(), "fine.aspx".to_string()],
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/Normativa/broken.aspx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/Normativa/fine.aspx", vec!["doc.pdf".to_string()], 1).await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let client = reqwest::Client::new();
    let outcome = Crawler::new(&client, &store, settings())
        .crawl(&format!("{}/", base), &extensions(), 5)
        .await
        .unwrap();

    assert_eq!(outcome.fetches, 2);
    assert_eq!(outcome.failed_pages.len(), 1);
    assert!(outcome.failed_pages[0].error.starts_with("500"));
    assert!(outcome.links.contains(&format!("{}/doc.pdf", base)));
}

#[tokio::test]
async fn test_failing_seed_yields_empty_traversal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Normativa/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = JsonLinkStore::new(dir.path().join("links.json"));
    let client = reqwest::Client::new();
    let outcome = Crawler::new(&client, &store, settings())
        .crawl(&format!("{}/Normativa/", server.uri()), &extensions(), 5)
        .await
        .unwrap();

    assert!(outcome.links.is_empty());
    assert_eq!(outcome.fetches, 0);
    assert_eq!(outcome.failed_pages.len(), 1);
    assert!(store.load().unwrap().is_empty());
}
