use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use thiserror::Error;

use pcd_core::config::{ConfigError, PipelineConfig};
use pcd_core::pointcloud::chunk::Chunk;
use pcd_core::pointcloud::point::PointCloud;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot extract chunks from an empty point cloud")]
    EmptyInput,
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

pub trait ChunkExtractor {
    fn extract(&self, cloud: &PointCloud) -> Result<Vec<Chunk>, ExtractError>;
}

/// Slides a square window of side `2 * radius` over the horizontal extent of
/// the cloud at `step` intervals and emits one chunk per window that holds at
/// least `min_points` points.
pub struct SlidingWindowExtractor {
    pub radius: f64,
    pub step: f64,
    pub min_points: usize,
}

impl SlidingWindowExtractor {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            radius: config.window_radius,
            step: config.step_size,
            min_points: config.min_points_per_chunk,
        })
    }
}

impl ChunkExtractor for SlidingWindowExtractor {
    fn extract(&self, cloud: &PointCloud) -> Result<Vec<Chunk>, ExtractError> {
        // Fields are pub, so revalidate here: a non-positive step would make
        // the center sequence never terminate.
        if !(self.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(self.radius).into());
        }
        if !(self.step > 0.0) {
            return Err(ConfigError::NonPositiveStep(self.step).into());
        }
        if cloud.is_empty() {
            return Err(ExtractError::EmptyInput);
        }

        let bounds = &cloud.metadata.bounding_volume;
        let xs = window_centers(bounds.min[0], bounds.max[0], self.step);
        let ys = window_centers(bounds.min[1], bounds.max[1], self.step);

        // Grid order: outer loop over x centers, inner over y. The parallel
        // collect preserves this order for the ranking tie-break.
        let centers: Vec<(f64, f64)> = xs
            .iter()
            .flat_map(|&cx| ys.iter().map(move |&cy| (cx, cy)))
            .collect();

        let chunks: Vec<Chunk> = centers
            .par_iter()
            .filter_map(|&(cx, cy)| {
                let selected: Vec<_> = cloud
                    .points
                    .iter()
                    .filter(|p| (p.x - cx).abs() < self.radius && (p.y - cy).abs() < self.radius)
                    .copied()
                    .collect();

                if selected.len() >= self.min_points {
                    Some(Chunk::new(cx, cy, selected))
                } else {
                    None
                }
            })
            .collect();

        Ok(chunks)
    }
}

/// Arithmetic sequence `min + i * step` for all values strictly below `max`.
/// A zero-width extent yields no centers, and therefore no chunks.
fn window_centers(min: f64, max: f64, step: f64) -> Vec<f64> {
    (0..)
        .map(|i| min + i as f64 * step)
        .take_while(|&c| c < max)
        .collect()
}
