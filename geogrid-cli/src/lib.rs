//! Shared plumbing of the `geogrid-elev` and `geogrid-query` drivers:
//! command line arguments, points file parsing and output handling.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
};

use clap::{Arg, Command};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Points file or output file I/O failure
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A points file line is not a coordinate pair/triplet
    #[error("points line {line}: \"{content}\" is not a coordinate pair or triplet")]
    PointsFormat { line: usize, content: String },
    /// Failure reported by the query engine
    #[error(transparent)]
    Engine(#[from] geogrid::prelude::Error),
}

/// Arguments shared by both drivers.
pub fn common_args(command: Command) -> Command {
    command
        .arg_required_else_help(true)
        .arg(
            Arg::new("models")
                .short('m')
                .long("models")
                .required(true)
                .value_delimiter(',')
                .help("Model containers to consult, in priority order"),
        )
        .arg(
            Arg::new("input-crs")
                .short('c')
                .long("input-crs")
                .default_value("EPSG:4326")
                .help("CRS of the points handed to the engine"),
        )
        .arg(
            Arg::new("points")
                .short('p')
                .long("points")
                .required(true)
                .help("Points file, \"-\" for stdin: one x y [z] triplet per line"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file, stdout when omitted"),
        )
}

/// Parses a points file: whitespace separated x y [z] columns, `#`
/// comments and blank lines skipped, z defaulting to 0.
pub fn read_points(reader: impl BufRead) -> Result<Vec<[f64; 3]>, Error> {
    let mut points = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let malformed = || Error::PointsFormat {
            line: index + 1,
            content: content.to_string(),
        };
        let columns = content
            .split_whitespace()
            .map(|column| column.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| malformed())?;
        match columns.as_slice() {
            [x, y] => points.push([*x, *y, 0.0]),
            [x, y, z] => points.push([*x, *y, *z]),
            _ => return Err(malformed()),
        }
    }
    Ok(points)
}

/// Opens the points source, `-` meaning stdin.
pub fn points_reader(path: &str) -> Result<Box<dyn BufRead>, Error> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Opens the output sink, stdout when no path was given.
pub fn output_writer(path: Option<&String>) -> Result<Box<dyn Write>, Error> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

#[cfg(test)]
mod test {
    use super::{read_points, Error};

    #[test]
    fn points_parsing() {
        let content = "\
# lat lon z
37.75  -122.25  -4000.0

37.80  -122.20
  # trailing comment line
37.85\t-122.15\t-250.0
";
        let points = read_points(content.as_bytes()).unwrap();
        assert_eq!(
            points,
            vec![
                [37.75, -122.25, -4000.0],
                [37.80, -122.20, 0.0],
                [37.85, -122.15, -250.0],
            ]
        );
    }

    #[test]
    fn points_parsing_rejects_garbage() {
        let error = read_points("37.75 not-a-number".as_bytes()).unwrap_err();
        match error {
            Error::PointsFormat { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {:?}", other),
        }

        let error = read_points("1.0 2.0 3.0 4.0".as_bytes()).unwrap_err();
        assert!(matches!(error, Error::PointsFormat { line: 1, .. }));
    }
}
