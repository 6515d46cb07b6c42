use std::path::PathBuf;

use thiserror::Error;

use pcd_core::pointcloud::point::PointCloud;

pub mod csv;
pub mod ply;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {details}", path.display())]
    Malformed { path: PathBuf, details: String },
    #[error("{} has no 'vertex' element", path.display())]
    MissingVertexElement { path: PathBuf },
    #[error("missing required field '{field}' in {}", path.display())]
    MissingField { path: PathBuf, field: &'static str },
}

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Ply,
    Csv,
    Txt,
}

/// Maps a lowercase file extension to a recognized point-cloud format.
pub fn get_extension(ext: &str) -> Option<Extension> {
    match ext {
        "ply" => Some(Extension::Ply),
        "csv" => Some(Extension::Csv),
        "txt" => Some(Extension::Txt),
        _ => None,
    }
}
