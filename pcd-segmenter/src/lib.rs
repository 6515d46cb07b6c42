pub mod percentile;
pub mod segmenter;

pub use segmenter::{HeightPercentileSegmenter, SegmentError};
