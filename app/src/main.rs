use std::ffi::OsStr;
use std::io::Write;
use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{RngCore as _, SeedableRng as _};
use rayon::iter::{IndexedParallelIterator as _, IntoParallelIterator as _, ParallelIterator as _};

use pcd_chunker::{rank_by_density, ChunkExtractor as _, ExtractError, SlidingWindowExtractor};
use pcd_core::config::{ConfigError, PipelineConfig};
use pcd_exporter::{
    ply_file_name, write_manifest, ChunkRecord, ChunkRenderer as _, ExportError, PlyChunkExporter,
    RunManifest,
};
use pcd_parser::parsers::csv::CsvParserProvider;
use pcd_parser::parsers::ply::PlyParserProvider;
use pcd_parser::parsers::{
    get_extension, Extension, ParseError, Parser as _, ParserProvider as _,
};
use pcd_segmenter::{HeightPercentileSegmenter, SegmentError};

#[derive(Parser, Debug)]
#[command(
    name = "Point Chunker",
    about = "A tool for splitting point cloud scenes into local perception chunks",
    version = "0.0.1"
)]
struct Cli {
    /// Point cloud file, or a directory to scan for one.
    #[arg(short, long, required = true, value_name = "PATH")]
    input: String,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: String,

    /// Half-width of each square sampling window, meters.
    #[arg(long, default_value_t = 20.0)]
    radius: f64,

    /// Distance between neighboring window centers, meters.
    #[arg(long, default_value_t = 15.0)]
    step: f64,

    /// Windows with fewer points are discarded as noise.
    #[arg(long, default_value_t = 800)]
    min_points: usize,

    /// Number of top-ranked chunks to export.
    #[arg(long, default_value_t = 8)]
    max_chunks: usize,

    /// Per-chunk point budget before export.
    #[arg(long, default_value_t = 180_000)]
    max_render_points: usize,

    /// Height percentile used as the ground threshold.
    #[arg(long, default_value_t = 20.0)]
    percentile: f64,

    /// Seed for downsampling; drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("no point cloud file found under {}", .0.display())]
    NoSceneFound(PathBuf),
    #[error("unrecognized point cloud extension: {}", .0.display())]
    UnrecognizedExtension(PathBuf),
    #[error("loaded point cloud has no points")]
    EmptyCloud,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn extension_of(path: &Path) -> Option<Extension> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)
        .and_then(|ext| get_extension(&ext))
}

/// Resolves the scene to process: a file is used as-is; a directory is
/// scanned for recognized extensions and the first file in lexicographic
/// order wins.
fn find_scene_file(input: &Path) -> Result<(PathBuf, Extension), AppError> {
    if input.is_file() {
        let extension = extension_of(input)
            .ok_or_else(|| AppError::UnrecognizedExtension(input.to_path_buf()))?;
        return Ok((input.to_path_buf(), extension));
    }

    let entries = fs::read_dir(input).map_err(|source| AppError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && extension_of(path).is_some())
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .map(|path| {
            let extension = extension_of(&path).unwrap();
            (path, extension)
        })
        .ok_or_else(|| AppError::NoSceneFound(input.to_path_buf()))
}

fn run(args: Cli) -> Result<(), AppError> {
    let config = PipelineConfig {
        window_radius: args.radius,
        step_size: args.step,
        min_points_per_chunk: args.min_points,
        max_chunks_to_show: args.max_chunks,
        max_render_points: args.max_render_points,
        ground_percentile: args.percentile,
    };
    config.validate()?;

    let output_path = PathBuf::from(&args.output);
    fs::create_dir_all(&output_path).map_err(|source| AppError::Io {
        path: output_path.clone(),
        source,
    })?;

    let (scene_path, extension) = find_scene_file(Path::new(&args.input))?;
    log::info!("scene file: {:?}", scene_path);

    log::info!("start parsing...");
    let start_local = std::time::Instant::now();
    let filenames = vec![scene_path.clone()];
    let parser = match extension {
        Extension::Ply => PlyParserProvider { filenames }.get_parser(),
        Extension::Csv | Extension::Txt => CsvParserProvider { filenames }.get_parser(),
    };
    let point_cloud = parser.parse()?;
    log::info!(
        "finish parsing {} points in {:?}",
        point_cloud.len(),
        start_local.elapsed()
    );

    if point_cloud.is_empty() {
        return Err(AppError::EmptyCloud);
    }

    log::info!("start chunk extraction...");
    let start_local = std::time::Instant::now();
    let extractor = SlidingWindowExtractor::from_config(&config)?;
    let chunks = extractor.extract(&point_cloud)?;
    log::info!(
        "generated {} local scene chunks in {:?}",
        chunks.len(),
        start_local.elapsed()
    );

    let ranked = rank_by_density(chunks, config.max_chunks_to_show);
    log::info!("selected top {} chunks by point count", ranked.len());

    let base_seed = args.seed.unwrap_or_else(|| StdRng::from_entropy().next_u64());
    log::info!("downsampling seed: {}", base_seed);

    let segmenter = HeightPercentileSegmenter {
        max_points: config.max_render_points,
        ground_percentile: config.ground_percentile,
    };
    let exporter = PlyChunkExporter {
        output_dir: output_path.clone(),
    };

    log::info!("start segmenting and exporting...");
    let start_local = std::time::Instant::now();
    let chunk_count = ranked.len();
    let records: Vec<ChunkRecord> = ranked
        .into_par_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let (center_x, center_y) = (chunk.center_x, chunk.center_y);

            // Per-chunk derived seed keeps parallel runs reproducible.
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let segmented = segmenter.segment(chunk, &mut rng)?;

            let title = format!("Local Perception Chunk {}", i + 1);
            exporter.display(&segmented, &title)?;

            Ok(ChunkRecord {
                index: i,
                center_x,
                center_y,
                total_points: segmented.len(),
                ground_points: segmented.ground.len(),
                object_points: segmented.objects.len(),
                ground_threshold: segmented.ground_threshold,
                content_path: ply_file_name(&title),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    log::info!("finish exporting chunks in {:?}", start_local.elapsed());

    let manifest = RunManifest {
        source: scene_path.to_string_lossy().into_owned(),
        chunk_count,
        chunks: records,
    };
    write_manifest(&output_path, &manifest)?;
    log::info!("write manifest: {:?}", output_path.join("manifest.json"));

    Ok(())
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();

    log::info!("input: {}", args.input);
    log::info!("output folder: {}", args.output);
    log::info!("window radius: {}", args.radius);
    log::info!("step size: {}", args.step);
    log::info!("min points per chunk: {}", args.min_points);
    log::info!("max chunks to show: {}", args.max_chunks);
    log::info!("max render points: {}", args.max_render_points);
    log::info!("ground percentile: {}", args.percentile);

    let start = std::time::Instant::now();
    log::info!("start processing...");

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}
