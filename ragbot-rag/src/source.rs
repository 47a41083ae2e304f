//! Loading documents from a folder of text files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document::{Document, TYPE_KEY};
use crate::error::{RagError, Result};

/// File extensions loaded as plain text, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// `type` metadata value for documents read from disk.
pub const TEXT_FILE_TYPE: &str = "text_file";

/// Recursively loads `.txt` and `.md` files under a root folder.
///
/// Each file becomes one [`Document`] whose `source` is the file path and
/// whose `type` is [`TEXT_FILE_TYPE`]. Files with other extensions are
/// skipped, as are files that cannot be read as UTF-8.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The folder this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every supported file, sorted by path.
    ///
    /// A missing root yields no documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SourceError`] if the root exists but is not a
    /// directory, or if the directory tree cannot be walked.
    pub fn load(&self) -> Result<Vec<Document>> {
        if !self.root.exists() {
            info!(root = %self.root.display(), "document folder does not exist");
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(RagError::SourceError {
                path: self.root.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| RagError::SourceError {
                path: e.path().unwrap_or(self.root.as_path()).display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if is_supported(entry.path()) {
                paths.push(entry.into_path());
            } else {
                debug!(path = %entry.path().display(), "skipped unsupported file");
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => documents.push(
                    Document::new(content, path.display().to_string())
                        .with_metadata(TYPE_KEY, TEXT_FILE_TYPE),
                ),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to read file"),
            }
        }

        info!(root = %self.root.display(), document_count = documents.len(), "loaded documents");
        Ok(documents)
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}
