use std::{collections::HashMap, path::PathBuf};

use csv::ReaderBuilder;

use pcd_core::pointcloud::point::{Point, PointCloud};

use super::{ParseError, Parser, ParserProvider};

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<PointCloud, ParseError> {
        let mut points = Vec::new();
        for path in &self.filenames {
            parse_one(path, &mut points)?;
        }
        Ok(PointCloud::new(points))
    }
}

fn parse_one(path: &PathBuf, points: &mut Vec<Point>) -> Result<(), ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| map_csv_error(path, e))?;

    let mut records = reader.records();

    let first = match records.next() {
        Some(record) => record.map_err(|e| map_csv_error(path, e))?,
        None => return Ok(()),
    };

    // Headerless files map x, y, z positionally and keep the first row as data.
    let mapping = match field_mapping_from_headers(&first) {
        Some(mapping) => mapping,
        None => {
            points.push(parse_record(path, &first, &positional_mapping())?);
            positional_mapping()
        }
    };

    for record in records {
        let record = record.map_err(|e| map_csv_error(path, e))?;
        points.push(parse_record(path, &record, &mapping)?);
    }

    Ok(())
}

fn field_mapping_from_headers(headers: &csv::StringRecord) -> Option<HashMap<&'static str, usize>> {
    let mut mapping = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "x" => mapping.insert("x", index),
            "y" => mapping.insert("y", index),
            "z" => mapping.insert("z", index),
            _ => None,
        };
    }
    if mapping.len() == 3 {
        Some(mapping)
    } else {
        None
    }
}

fn positional_mapping() -> HashMap<&'static str, usize> {
    HashMap::from([("x", 0), ("y", 1), ("z", 2)])
}

fn parse_record(
    path: &PathBuf,
    record: &csv::StringRecord,
    mapping: &HashMap<&'static str, usize>,
) -> Result<Point, ParseError> {
    let mut coords = [0.0_f64; 3];
    for (i, field) in ["x", "y", "z"].into_iter().enumerate() {
        let index = mapping[field];
        let raw = record.get(index).ok_or(ParseError::MissingField {
            path: path.clone(),
            field,
        })?;
        coords[i] = raw.trim().parse().map_err(|_| ParseError::Malformed {
            path: path.clone(),
            details: format!("failed to parse '{}' value: {:?}", field, raw),
        })?;
    }
    Ok(Point::new(coords[0], coords[1], coords[2]))
}

fn map_csv_error(path: &PathBuf, e: csv::Error) -> ParseError {
    ParseError::Malformed {
        path: path.clone(),
        details: e.to_string(),
    }
}
