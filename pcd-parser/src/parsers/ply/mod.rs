use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use ply_rs::parser;
use ply_rs::ply::{DefaultElement, Property};

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{ParseError, Parser, ParserProvider};

pub struct PlyParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for PlyParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(PlyParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct PlyParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for PlyParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let mut points = Vec::new();
        for path in &self.filenames {
            parse_one(path, &mut points)?;
        }
        Ok(PointCloud::new(points))
    }
}

fn parse_one(path: &PathBuf, points: &mut Vec<Point>) -> Result<(), ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let ply_parser = parser::Parser::<DefaultElement>::new();
    let ply = ply_parser
        .read_ply(&mut reader)
        .map_err(|e| ParseError::Malformed {
            path: path.clone(),
            details: e.to_string(),
        })?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| ParseError::MissingVertexElement { path: path.clone() })?;

    points.reserve(vertices.len());
    for vertex in vertices {
        let x = property_as_f64(vertex.get("x")).ok_or(ParseError::MissingField {
            path: path.clone(),
            field: "x",
        })?;
        let y = property_as_f64(vertex.get("y")).ok_or(ParseError::MissingField {
            path: path.clone(),
            field: "y",
        })?;
        let z = property_as_f64(vertex.get("z")).ok_or(ParseError::MissingField {
            path: path.clone(),
            field: "z",
        })?;
        points.push(Point::new(x, y, z));
    }

    Ok(())
}

fn property_as_f64(property: Option<&Property>) -> Option<f64> {
    match property {
        Some(Property::Float(v)) => Some(*v as f64),
        Some(Property::Double(v)) => Some(*v),
        Some(Property::Int(v)) => Some(*v as f64),
        Some(Property::UInt(v)) => Some(*v as f64),
        Some(Property::Short(v)) => Some(*v as f64),
        Some(Property::UShort(v)) => Some(*v as f64),
        Some(Property::Char(v)) => Some(*v as f64),
        Some(Property::UChar(v)) => Some(*v as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_ascii_vertices() {
        let file = write_fixture(
            "ply\n\
             format ascii 1.0\n\
             element vertex 3\n\
             property float x\n\
             property float y\n\
             property float z\n\
             end_header\n\
             0.0 0.0 0.0\n\
             1.5 -2.0 3.25\n\
             -4.0 5.0 -6.5\n",
        );

        let parser = PlyParser {
            filenames: vec![file.path().to_path_buf()],
        };
        let cloud = parser.parse().unwrap();

        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.points[1], Point::new(1.5, -2.0, 3.25));
        assert_eq!(cloud.metadata.bounding_volume.min, [-4.0, -2.0, -6.5]);
    }

    #[test]
    fn missing_vertex_element_is_an_error() {
        let file = write_fixture(
            "ply\n\
             format ascii 1.0\n\
             element face 1\n\
             property float nx\n\
             property float ny\n\
             property float nz\n\
             end_header\n\
             0.0 0.0 1.0\n",
        );

        let parser = PlyParser {
            filenames: vec![file.path().to_path_buf()],
        };
        assert!(matches!(
            parser.parse(),
            Err(ParseError::MissingVertexElement { .. })
        ));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let parser = PlyParser {
            filenames: vec![PathBuf::from("/nonexistent/scene.ply")],
        };
        assert!(matches!(parser.parse(), Err(ParseError::Io { .. })));
    }
}
