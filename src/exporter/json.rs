// file: src/exporter/json.rs
// description: writes chronology entries, json records and batch manifests to disk

use crate::error::{ChronologyError, Result};
use crate::models::{ChronologyRecord, combined_chronology};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BATCH_CHRONOLOGY_FILE: &str = "chronology.txt";
pub const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_STEM: &str = "manifest";

#[derive(Debug, Clone)]
pub struct ChronologyExporter {
    output_dir: PathBuf,
    pretty: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub total_documents: usize,
    pub files: Vec<String>,
}

impl ChronologyExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty: bool) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| ChronologyError::FileOperation {
            path: output_dir.clone(),
            message: "Failed to create output directory".to_string(),
            source,
        })?;
        Ok(Self { output_dir, pretty })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Plain-text entry saved as `chronology_{unix}.txt`.
    pub fn export_entry(&self, entry: &str) -> Result<PathBuf> {
        let name = format!("chronology_{}.txt", Utc::now().timestamp());
        let path = self.output_dir.join(name);
        self.write(&path, entry)?;
        info!("Chronology entry written to {}", path.display());
        Ok(path)
    }

    /// Full record saved as `{stem}.json`, named after the source PDF.
    pub fn export_record(&self, record: &ChronologyRecord) -> Result<PathBuf> {
        self.write_record(record, &record_stem(record))
    }

    fn write_record(&self, record: &ChronologyRecord, stem: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.json", stem));
        let json = self.to_json(record)?;
        self.write(&path, &json)?;
        info!("Record written to {}", path.display());
        Ok(path)
    }

    /// Ordered entries in `chronology.txt`, one json file per record and a
    /// manifest listing everything written.
    pub fn export_batch(&self, records: &[ChronologyRecord]) -> Result<ExportManifest> {
        info!("Starting batch export to {:?}", self.output_dir);

        let chronology = combined_chronology(records);
        self.write(&self.output_dir.join(BATCH_CHRONOLOGY_FILE), &chronology)?;

        let mut files = vec![BATCH_CHRONOLOGY_FILE.to_string()];
        let mut used_stems: HashSet<String> = HashSet::from([MANIFEST_STEM.to_string()]);
        for record in records {
            let stem = unique_stem(record, &mut used_stems);
            let path = self.write_record(record, &stem)?;
            if let Some(name) = path.file_name() {
                files.push(name.to_string_lossy().to_string());
            }
        }

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            total_documents: records.len(),
            files,
        };
        let json = self.to_json(&manifest)?;
        self.write(&self.output_dir.join(MANIFEST_FILE), &json)?;

        info!(
            "Export complete: {} documents exported",
            manifest.total_documents
        );
        Ok(manifest)
    }

    fn to_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).map_err(|source| ChronologyError::FileOperation {
            path: path.to_path_buf(),
            message: "Failed to write export file".to_string(),
            source,
        })
    }
}

fn record_stem(record: &ChronologyRecord) -> String {
    Path::new(&record.source_file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| record.id.clone())
}

/// Scanned folders can hold several PDFs with the same file name; later
/// ones get a content-hash suffix, then the record id.
fn unique_stem(record: &ChronologyRecord, used: &mut HashSet<String>) -> String {
    let stem = record_stem(record);
    let hash_prefix: String = record.content_hash.chars().take(8).collect();

    let candidates = [
        stem.clone(),
        format!("{}_{}", stem, hash_prefix),
        format!("{}_{}", stem, record.id),
    ];
    let chosen = candidates
        .into_iter()
        .find(|c| !used.contains(&c.to_lowercase()))
        .unwrap_or_else(|| record.id.clone());

    used.insert(chosen.to_lowercase());
    chosen
}
