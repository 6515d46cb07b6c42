use pcd_core::pointcloud::chunk::Chunk;

/// Returns the `limit` densest chunks in descending point count. The sort is
/// stable, so ties keep their extraction (grid) order.
pub fn rank_by_density(mut chunks: Vec<Chunk>, limit: usize) -> Vec<Chunk> {
    chunks.sort_by(|a, b| b.len().cmp(&a.len()));
    chunks.truncate(limit);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcd_core::pointcloud::point::Point;

    fn chunk_with(center_x: f64, count: usize) -> Chunk {
        let points = (0..count)
            .map(|i| Point::new(i as f64, 0.0, 0.0))
            .collect();
        Chunk::new(center_x, 0.0, points)
    }

    #[test]
    fn orders_by_descending_cardinality() {
        let chunks = vec![chunk_with(0.0, 2), chunk_with(1.0, 5), chunk_with(2.0, 3)];
        let ranked = rank_by_density(chunks, 3);
        let counts: Vec<_> = ranked.iter().map(Chunk::len).collect();
        assert_eq!(counts, vec![5, 3, 2]);
    }

    #[test]
    fn ties_keep_extraction_order() {
        let chunks = vec![
            chunk_with(0.0, 4),
            chunk_with(1.0, 4),
            chunk_with(2.0, 7),
            chunk_with(3.0, 4),
        ];
        let ranked = rank_by_density(chunks, 4);
        assert_eq!(ranked[0].center_x, 2.0);
        assert_eq!(ranked[1].center_x, 0.0);
        assert_eq!(ranked[2].center_x, 1.0);
        assert_eq!(ranked[3].center_x, 3.0);
    }

    #[test]
    fn limit_larger_than_available_returns_all() {
        let chunks = vec![chunk_with(0.0, 1), chunk_with(1.0, 2)];
        let ranked = rank_by_density(chunks, 10);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn zero_limit_returns_empty() {
        let chunks = vec![chunk_with(0.0, 1)];
        assert!(rank_by_density(chunks, 0).is_empty());
    }
}
