//! Local file handling: ZIP unpacking, directory listing and wiping
//!
//! Everything downstream of a download or an upload works from a manifest of
//! `FetchedFile`s produced here.

use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while handling local files
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error on {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("Invalid ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

fn io_error(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// A file present on local disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedFile {
    /// Parent directory relative to the root, or "root" for top-level files
    pub folder: String,
    pub name: String,
    pub path: PathBuf,
    /// Lowercase, without leading dot
    pub extension: String,
}

impl FetchedFile {
    /// Path relative to the listing root, '/'-separated
    ///
    /// Top-level files are keyed by their bare name.
    pub fn source_key(&self) -> String {
        if self.folder == "root" {
            self.name.clone()
        } else {
            format!("{}/{}", self.folder, self.name)
        }
    }

    fn new(root: &Path, path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let extension = lowercase_extension(&path)?;
        let folder = path
            .parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            .filter(|rel| !rel.is_empty())
            .unwrap_or_else(|| "root".to_string());

        Some(Self {
            folder,
            name,
            path,
            extension,
        })
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn allowed(extension: &str, allow_list: &[String]) -> bool {
    allow_list.iter().any(|a| a.eq_ignore_ascii_case(extension))
}

/// Extracts the allowed entries of a ZIP archive
///
/// Directory entries and entries outside the allow-list are skipped. Entries
/// whose path would escape `destination` (absolute or containing `..`) are
/// skipped with a warning.
///
/// # Arguments
///
/// * `zip_path` - The archive to read
/// * `destination` - Extraction root, created if missing
/// * `allow_list` - Lowercase extensions to keep
///
/// # Returns
///
/// The extracted files, sorted by path
pub fn unpack_archive(
    zip_path: &Path,
    destination: &Path,
    allow_list: &[String],
) -> Result<Vec<FetchedFile>, ArchiveError> {
    let file = File::open(zip_path).map_err(|e| io_error(zip_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;
    fs::create_dir_all(destination).map_err(|e| io_error(destination, e))?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping archive entry with unsafe path: {}", entry.name());
            continue;
        };

        match lowercase_extension(&relative) {
            Some(ext) if allowed(&ext, allow_list) => {}
            _ => {
                tracing::debug!("Skipping archive entry {}", relative.display());
                continue;
            }
        }

        let out_path = destination.join(&relative);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| io_error(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_error(&out_path, e))?;

        if let Some(fetched) = FetchedFile::new(destination, out_path) {
            extracted.push(fetched);
        }
    }

    extracted.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(
        "Extracted {} file(s) from {} into {}",
        extracted.len(),
        zip_path.display(),
        destination.display()
    );
    Ok(extracted)
}

/// Lists the regular files under `dir` with an allowed extension, sorted by path
pub fn list_files(dir: &Path, extensions: &[String]) -> Result<Vec<FetchedFile>, ArchiveError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        match lowercase_extension(&path) {
            Some(ext) if allowed(&ext, extensions) => {}
            _ => continue,
        }
        if let Some(fetched) = FetchedFile::new(dir, path) {
            files.push(fetched);
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Empties a directory (files, symlinks and subdirectories), creating it if missing
pub fn clear_directory(dir: &Path) -> io::Result<()> {
    if fs::symlink_metadata(dir).is_ok() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    }
    fs::create_dir_all(dir)
}
