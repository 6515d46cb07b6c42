use rand::seq::index::sample;
use rand::Rng;
use thiserror::Error;

use pcd_core::pointcloud::chunk::{Chunk, SegmentedChunk};
use pcd_core::pointcloud::point::Point;

use crate::percentile::percentile;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("cannot segment an empty chunk")]
    EmptyChunk,
    #[error("ground percentile must be within [0, 100], got {0}")]
    PercentileOutOfRange(f64),
}

/// Splits a chunk into ground and above-ground points.
///
/// Order matters: downsample, then recenter, then threshold, so that the
/// centroid and the percentile reflect the point set that is actually
/// rendered. The random source is injected so a seeded rng reproduces the
/// same split.
pub struct HeightPercentileSegmenter {
    pub max_points: usize,
    pub ground_percentile: f64,
}

impl HeightPercentileSegmenter {
    pub fn segment<R: Rng + ?Sized>(
        &self,
        chunk: Chunk,
        rng: &mut R,
    ) -> Result<SegmentedChunk, SegmentError> {
        if !(0.0..=100.0).contains(&self.ground_percentile) {
            return Err(SegmentError::PercentileOutOfRange(self.ground_percentile));
        }

        let Chunk {
            center_x,
            center_y,
            points,
        } = chunk;

        let points = self.downsample(points, rng);
        if points.is_empty() {
            return Err(SegmentError::EmptyChunk);
        }

        let points = recenter(points);

        let mut heights: Vec<f64> = points.iter().map(|p| p.z).collect();
        heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let ground_threshold = percentile(&heights, self.ground_percentile);

        // Ties on the threshold go to ground.
        let (ground, objects): (Vec<Point>, Vec<Point>) =
            points.into_iter().partition(|p| p.z <= ground_threshold);

        Ok(SegmentedChunk {
            center_x,
            center_y,
            ground,
            objects,
            ground_threshold,
        })
    }

    /// Uniform sample without replacement down to `max_points`, preserving
    /// the original point order.
    fn downsample<R: Rng + ?Sized>(&self, points: Vec<Point>, rng: &mut R) -> Vec<Point> {
        if points.len() <= self.max_points {
            return points;
        }

        let mut indices = sample(rng, points.len(), self.max_points).into_vec();
        indices.sort_unstable();
        indices.into_iter().map(|i| points[i]).collect()
    }
}

/// Ego-centric normalization: translate the set so its centroid is the origin.
fn recenter(mut points: Vec<Point>) -> Vec<Point> {
    let n = points.len() as f64;
    let (mut mx, mut my, mut mz) = (0.0, 0.0, 0.0);
    for p in &points {
        mx += p.x;
        my += p.y;
        mz += p.z;
    }
    mx /= n;
    my /= n;
    mz /= n;

    for p in &mut points {
        p.x -= mx;
        p.y -= my;
        p.z -= mz;
    }
    points
}
