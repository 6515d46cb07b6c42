pub mod manifest;
pub mod renderer;

pub use manifest::{write_manifest, ChunkRecord, RunManifest};
pub use renderer::{ply_file_name, ChunkRenderer, ExportError, PlyChunkExporter};
