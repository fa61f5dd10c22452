// file: src/reader/scanner.rs
// description: Directory walking and pdf discovery for batch runs
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct DocumentScanner {
    config: PipelineConfig,
}

#[derive(Debug, Clone)]
pub struct ScannedDocument {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
}

impl DocumentScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// PDFs under `root`, sorted by relative path.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedDocument>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let max_size = (self.config.max_file_size_mb as u64) * 1024 * 1024;
        let mut documents = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            if !Validator::is_pdf(path) || self.should_skip(&relative_path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let size = metadata.len();

            if max_size > 0 && size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            documents.push(ScannedDocument {
                path: path.to_path_buf(),
                relative_path,
                size,
            });
        }

        documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        info!("Found {} PDF documents", documents.len());
        Ok(documents)
    }

    /// `*.ext` matches a suffix, `dir/*` a path segment, anything else a
    /// substring of the relative path.
    fn should_skip(&self, relative_path: &str) -> bool {
        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                relative_path.ends_with(suffix)
            } else if let Some(dir) = pattern.strip_suffix('*') {
                relative_path.starts_with(dir) || relative_path.contains(&format!("/{}", dir))
            } else {
                relative_path.contains(pattern.as_str())
            }
        })
    }
}
