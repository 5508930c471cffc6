//! Integration tests for unpacking, normalization and ingestion

use crate::common::{test_config, MemoryBackend};
use regdoc::context::AppContext;
use regdoc::index::SearchBackend;
use regdoc::ingest::IngestMethod;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const INDEX: &str = "anla_resoluciones";

fn context(dir: &Path, backend: Arc<MemoryBackend>) -> AppContext {
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir);
    AppContext::with_search_backend(config, backend).unwrap()
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[tokio::test]
async fn test_json_ingest_skips_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("r1.json"),
        r#"{"id_archivo": "R-001", "empresa": "Minera S.A.", "fecha_resolución": "2021-03-04"}"#,
    )
    .unwrap();
    std::fs::write(data.join("r2.json"), r#"{"id_archivo": "R-002", "#).unwrap();

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend.clone());
    let summary = ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.records, 1);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].path.ends_with("r2.json"));
    assert!(summary.index.success);
    assert_eq!(summary.index.accepted, 1);

    let stored = backend.get(INDEX, "R-001").await.unwrap().unwrap();
    assert_eq!(stored["empresa"], "Minera S.A.");
}

#[tokio::test]
async fn test_reingesting_same_batch_keeps_document_count() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    for i in 0..3 {
        std::fs::write(
            data.join(format!("r{}.json", i)),
            format!(r#"{{"numero_resolución": "{}"}}"#, i),
        )
        .unwrap();
    }

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend.clone());

    ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();
    assert_eq!(backend.count(INDEX), 3);

    let again = ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();
    assert!(again.index.success);
    assert_eq!(again.index.accepted, 3);
    assert_eq!(backend.count(INDEX), 3);
}

#[tokio::test]
async fn test_unpack_then_ingest() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("upload.zip");
    write_zip(
        &zip_path,
        &[
            ("lote/a.json", r#"{"id_archivo": 7, "empresa": "ACME"}"#),
            ("lote/b.json", r#"{"empresa": "Otra"}"#),
            ("lote/c.exe", "MZ"),
        ],
    );

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend.clone());
    let dest = dir.path().join("unpacked");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("leftover.json"), "{}").unwrap();

    let files = ctx.unpack(&zip_path, &dest).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.folder == "lote"));
    assert!(!dest.join("leftover.json").exists());

    let summary = ctx.ingest(&dest, IngestMethod::Json, INDEX).await.unwrap();
    assert_eq!(summary.records, 2);
    assert!(backend.get(INDEX, "7").await.unwrap().is_some());
    assert_eq!(backend.count(INDEX), 2);
}

#[tokio::test]
async fn test_text_ingest_from_txt_files() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("resolucion.txt"),
        b"Por la cual se impone una medida preventiva y se adoptan otras determinaciones en el expediente LAM1234.\n",
    )
    .unwrap();
    // Latin-1 encoded
    std::fs::write(
        data.join("latin.txt"),
        b"Resoluci\xf3n sobre la licencia ambiental otorgada a la compa\xf1\xeda para el proyecto vial.",
    )
    .unwrap();
    std::fs::write(data.join("corto.txt"), "demasiado corto").unwrap();

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend.clone());
    let summary = ctx.ingest(&data, IngestMethod::Text, INDEX).await.unwrap();

    assert_eq!(summary.files, 3);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(backend.count(INDEX), 2);
}

#[tokio::test]
async fn test_empty_directory_reports_nothing_to_index() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("empty");
    std::fs::create_dir_all(&data).unwrap();

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend);
    let summary = ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();

    assert!(!summary.index.success);
    assert_eq!(summary.index.error.as_deref(), Some("no documents to index"));
}

#[tokio::test]
async fn test_same_file_name_in_different_folders_indexed_separately() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    for year in ["2020", "2021"] {
        std::fs::create_dir_all(data.join(year)).unwrap();
        std::fs::write(
            data.join(year).join("resolucion.json"),
            format!(r#"{{"anio": "{}"}}"#, year),
        )
        .unwrap();
    }

    let backend = Arc::new(MemoryBackend::default());
    let ctx = context(dir.path(), backend.clone());
    let summary = ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.index.accepted, 2);
    assert_eq!(backend.count(INDEX), 2);

    // Stable across runs
    ctx.ingest(&data, IngestMethod::Json, INDEX).await.unwrap();
    assert_eq!(backend.count(INDEX), 2);
}
