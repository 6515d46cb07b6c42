//! End-to-end pipeline test: parse a synthetic scene, extract and rank
//! chunks, segment each one, and render through both a recording fake and
//! the PLY exporter.

use std::cell::RefCell;
use std::io::Write as _;

use rand::rngs::StdRng;
use rand::SeedableRng;

use pcd_chunker::{rank_by_density, ChunkExtractor, SlidingWindowExtractor};
use pcd_core::pointcloud::chunk::SegmentedChunk;
use pcd_exporter::{write_manifest, ChunkRecord, ChunkRenderer, ExportError, PlyChunkExporter, RunManifest};
use pcd_exporter::ply_file_name;
use pcd_parser::parsers::csv::CsvParser;
use pcd_parser::parsers::Parser as _;
use pcd_segmenter::HeightPercentileSegmenter;

#[derive(Default)]
struct RecordingRenderer {
    calls: RefCell<Vec<(String, usize)>>,
}

impl ChunkRenderer for RecordingRenderer {
    fn display(&self, chunk: &SegmentedChunk, title: &str) -> Result<(), ExportError> {
        self.calls.borrow_mut().push((title.to_string(), chunk.len()));
        Ok(())
    }
}

/// 40x40 lattice with a flat floor and a raised block in one corner.
fn write_scene_csv() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "x,y,z").unwrap();
    for x in 0..40 {
        for y in 0..40 {
            let z = if x < 10 && y < 10 { 3.0 } else { 0.0 };
            writeln!(file, "{}.0,{}.0,{}", x, y, z).unwrap();
        }
    }
    file
}

#[test]
fn pipeline_runs_end_to_end() {
    let scene = write_scene_csv();
    let parser = CsvParser {
        filenames: vec![scene.path().to_path_buf()],
    };
    let cloud = parser.parse().unwrap();
    assert_eq!(cloud.len(), 1600);

    let extractor = SlidingWindowExtractor {
        radius: 10.0,
        step: 8.0,
        min_points: 150,
    };
    let chunks = extractor.extract(&cloud).unwrap();
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.len() >= 150);
    }

    let max_chunks = 4;
    let ranked = rank_by_density(chunks, max_chunks);
    assert!(ranked.len() <= max_chunks);
    for pair in ranked.windows(2) {
        assert!(pair[0].len() >= pair[1].len());
    }

    let segmenter = HeightPercentileSegmenter {
        max_points: 300,
        ground_percentile: 20.0,
    };

    let renderer = RecordingRenderer::default();
    let out_dir = tempfile::tempdir().unwrap();
    let exporter = PlyChunkExporter {
        output_dir: out_dir.path().to_path_buf(),
    };

    let mut manifest = RunManifest {
        source: "synthetic".to_string(),
        chunk_count: ranked.len(),
        chunks: Vec::new(),
    };

    for (i, chunk) in ranked.into_iter().enumerate() {
        let total_before = chunk.len().min(300);
        let (center_x, center_y) = (chunk.center_x, chunk.center_y);

        let mut rng = StdRng::seed_from_u64(99 + i as u64);
        let segmented = segmenter.segment(chunk, &mut rng).unwrap();

        // Ground and objects are disjoint by construction; exhaustiveness is
        // the part worth asserting after downsampling.
        assert_eq!(segmented.len(), total_before);
        for p in &segmented.ground {
            assert!(p.z <= segmented.ground_threshold);
        }
        for p in &segmented.objects {
            assert!(p.z > segmented.ground_threshold);
        }

        let title = format!("Local Perception Chunk {}", i + 1);
        renderer.display(&segmented, &title).unwrap();
        exporter.display(&segmented, &title).unwrap();

        manifest.chunks.push(ChunkRecord {
            index: i,
            center_x,
            center_y,
            total_points: segmented.len(),
            ground_points: segmented.ground.len(),
            object_points: segmented.objects.len(),
            ground_threshold: segmented.ground_threshold,
            content_path: ply_file_name(&title),
        });
    }

    write_manifest(out_dir.path(), &manifest).unwrap();

    let calls = renderer.calls.borrow();
    assert_eq!(calls.len(), manifest.chunk_count);
    for record in &manifest.chunks {
        assert!(out_dir.path().join(&record.content_path).exists());
    }
    assert!(out_dir.path().join("manifest.json").exists());
}
