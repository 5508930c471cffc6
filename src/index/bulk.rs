//! Bulk indexer

use crate::index::traits::SearchBackend;
use crate::ingest::DocumentRecord;
use serde::Serialize;

/// A document the engine refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub id: String,
    pub status: u16,
    pub reason: String,
}

/// Outcome of indexing one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub success: bool,
    pub accepted: usize,
    pub rejected: usize,
    pub rejection_details: Vec<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IndexReport {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Indexes a batch of records, `chunk_size` documents per bulk request
///
/// Each record is written under its identifier, so indexing the same batch
/// twice leaves the document count unchanged. Per-document rejections are
/// reported without failing the batch. A transport or authentication failure
/// stops submission; every record not yet accepted is then counted rejected
/// and the report carries the error.
///
/// # Arguments
///
/// * `backend` - The search engine to write to
/// * `records` - The batch, consumed in order
/// * `index` - Target index name
/// * `chunk_size` - Maximum documents per bulk request (at least 1)
pub async fn index_batch(
    backend: &dyn SearchBackend,
    records: &[DocumentRecord],
    index: &str,
    chunk_size: usize,
) -> IndexReport {
    if records.is_empty() {
        tracing::warn!("No documents to index");
        return IndexReport::failed("no documents to index");
    }

    let mut report = IndexReport {
        success: true,
        ..IndexReport::default()
    };
    let mut submitted = 0;

    for chunk in records.chunks(chunk_size.max(1)) {
        match backend.bulk_index(index, chunk).await {
            Ok(items) => {
                for item in &items {
                    if item.is_accepted() {
                        report.accepted += 1;
                    } else {
                        report.rejected += 1;
                        report.rejection_details.push(Rejection {
                            id: item.id.clone(),
                            status: item.status,
                            reason: item.error.clone().unwrap_or_default(),
                        });
                    }
                }

                let missing = chunk.len().saturating_sub(items.len());
                if missing > 0 {
                    tracing::warn!("{} document(s) missing from bulk response", missing);
                    for record in &chunk[items.len()..] {
                        report.rejected += 1;
                        report.rejection_details.push(Rejection {
                            id: record.id.clone(),
                            status: 0,
                            reason: "missing from bulk response".to_string(),
                        });
                    }
                }
                submitted += chunk.len();
                tracing::debug!("Submitted {}/{} documents", submitted, records.len());
            }
            Err(e) => {
                tracing::error!("Bulk indexing into {} failed: {}", index, e);
                report.rejected += records.len() - submitted;
                report.success = false;
                report.error = Some(e.to_string());
                break;
            }
        }
    }

    tracing::info!(
        "Indexed into {}: {} accepted, {} rejected",
        index,
        report.accepted,
        report.rejected
    );
    report
}
