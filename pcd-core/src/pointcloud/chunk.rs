use crate::pointcloud::point::Point;

/// The subset of a capture that falls inside one sliding window, together
/// with the window center that generated it. Windows overlap, so the same
/// point may belong to several chunks.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub center_x: f64,
    pub center_y: f64,
    pub points: Vec<Point>,
}

impl Chunk {
    pub fn new(center_x: f64, center_y: f64, points: Vec<Point>) -> Self {
        Self {
            center_x,
            center_y,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A chunk after recentering and the ground/object split. `ground` and
/// `objects` are disjoint and together cover the (possibly downsampled)
/// chunk; points with z equal to the threshold land in `ground`.
#[derive(Debug, Clone)]
pub struct SegmentedChunk {
    pub center_x: f64,
    pub center_y: f64,
    pub ground: Vec<Point>,
    pub objects: Vec<Point>,
    pub ground_threshold: f64,
}

impl SegmentedChunk {
    pub fn len(&self) -> usize {
        self.ground.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground.is_empty() && self.objects.is_empty()
    }
}
