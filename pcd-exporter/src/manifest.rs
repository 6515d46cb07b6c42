use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::renderer::ExportError;

/// Summary of one pipeline run, written next to the exported chunks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunManifest {
    pub source: String,
    pub chunk_count: usize,
    pub chunks: Vec<ChunkRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub index: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub total_points: usize,
    pub ground_points: usize,
    pub object_points: usize,
    pub ground_threshold: f64,
    pub content_path: String,
}

pub fn write_manifest(output_dir: &Path, manifest: &RunManifest) -> Result<(), ExportError> {
    let path = output_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).map_err(|source| ExportError::Io { path, source })
}
