use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use pcd_core::pointcloud::chunk::SegmentedChunk;
use pcd_core::pointcloud::point::Point;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Visualization boundary of the pipeline. The production implementation
/// writes colored PLY files; tests plug in an in-memory fake.
pub trait ChunkRenderer {
    fn display(&self, chunk: &SegmentedChunk, title: &str) -> Result<(), ExportError>;
}

const GROUND_COLOR: [u8; 3] = [200, 200, 200];

/// Writes one ASCII PLY file per segmented chunk: ground points in a fixed
/// neutral gray, object points colored by height.
pub struct PlyChunkExporter {
    pub output_dir: PathBuf,
}

impl ChunkRenderer for PlyChunkExporter {
    fn display(&self, chunk: &SegmentedChunk, title: &str) -> Result<(), ExportError> {
        let path = self.output_dir.join(ply_file_name(title));
        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let file = File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        write_ply(&mut writer, chunk, title).map_err(|source| ExportError::Io { path, source })
    }
}

/// File name for a chunk title: lowercased, each non-alphanumeric character
/// replaced by an underscore.
pub fn ply_file_name(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}.ply", slug)
}

fn write_ply(
    writer: &mut impl Write,
    chunk: &SegmentedChunk,
    title: &str,
) -> std::io::Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment {}", title)?;
    writeln!(writer, "comment gray = ground, colored = objects")?;
    writeln!(writer, "element vertex {}", chunk.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    writeln!(writer, "property uchar red")?;
    writeln!(writer, "property uchar green")?;
    writeln!(writer, "property uchar blue")?;
    writeln!(writer, "end_header")?;

    for p in &chunk.ground {
        write_vertex(writer, p, GROUND_COLOR)?;
    }

    let (min_z, max_z) = height_range(&chunk.objects);
    for p in &chunk.objects {
        write_vertex(writer, p, height_to_rgb(normalize(p.z, min_z, max_z)))?;
    }

    Ok(())
}

fn write_vertex(writer: &mut impl Write, p: &Point, rgb: [u8; 3]) -> std::io::Result<()> {
    writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, rgb[0], rgb[1], rgb[2])
}

fn height_range(points: &[Point]) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for p in points {
        min = min.min(p.z);
        max = max.max(p.z);
    }
    (min, max)
}

fn normalize(z: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        return 0.5;
    }
    (z - min) / (max - min)
}

// Turbo-style ramp sampled at six anchors, linearly interpolated.
const RAMP: [[u8; 3]; 6] = [
    [48, 18, 59],
    [57, 122, 251],
    [26, 228, 182],
    [149, 250, 60],
    [251, 154, 41],
    [122, 4, 3],
];

fn height_to_rgb(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (RAMP.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(RAMP.len() - 1);
    let frac = scaled - lo as f64;

    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let a = RAMP[lo][i] as f64;
        let b = RAMP[hi][i] as f64;
        *channel = (a + frac * (b - a)).round() as u8;
    }
    rgb
}
