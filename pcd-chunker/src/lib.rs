pub mod extractor;
pub mod ranker;

pub use extractor::{ChunkExtractor, ExtractError, SlidingWindowExtractor};
pub use ranker::rank_by_density;
