//! General Utilities

use crate::error::{BocpdError, Result};
use crate::run_length_matrix::RunLengthMatrix;
use crate::vecops::argmax;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, prelude::*, BufReader, BufWriter};
use std::path::Path;

/// Parse a series with one value per record. The first comma-separated
/// field of every non-blank line is read as an `f64`.
///
/// # Errors
/// `Io` if reading fails, `Parse` with the one-based line number if a field
/// is not a float.
pub fn parse_series<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let field = line.split(',').next().unwrap_or_default().trim();
        let value = field.parse::<f64>().map_err(|_| BocpdError::Parse {
            line: i + 1,
            value: field.to_string(),
        })?;
        data.push(value);
    }
    Ok(data)
}

/// Read a series from `path`. See [`parse_series`].
///
/// # Errors
/// If the file cannot be opened or a record cannot be parsed.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let f = File::open(path)?;
    parse_series(BufReader::new(f))
}

/// Write one value per line, preserving order.
///
/// # Errors
/// If data cannot be written.
pub fn write_series_to<W: Write, T: Display>(
    writer: W,
    values: &[T],
) -> io::Result<()> {
    let mut w = BufWriter::new(writer);
    values.iter().try_for_each(|v| writeln!(w, "{v}"))?;
    w.flush()
}

/// Write `values` to `path`, one per line.
///
/// # Errors
/// If data cannot be written to disk, an error is returned.
pub fn write_series<P: AsRef<Path>, T: Display>(
    path: P,
    values: &[T],
) -> Result<()> {
    let f = File::create(path)?;
    write_series_to(f, values)?;
    Ok(())
}

/// Write the run-length matrix as CSV, one matrix row per line.
///
/// # Errors
/// If data cannot be written to disk, an error is returned.
pub fn write_matrix<P: AsRef<Path>>(
    path: P,
    matrix: &RunLengthMatrix,
) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for (i, row) in matrix.as_array().outer_iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .map(|p| {
                if !p.is_finite() {
                    tracing::warn!(
                        target: "bocpd",
                        row = i,
                        "non-finite value in output"
                    );
                }
                p.to_string()
            })
            .collect();
        writeln!(w, "{}", line.join(","))?;
    }
    w.flush()?;
    Ok(())
}

//    0 1 2 3 4 5 6 7
// 0 [1]                  | s = 0 DONE
// 1 [0 1]                |
// 2 [0 0 1]              |
// 3 [0 0 0 1]            | s = 3, argmax = 3, s -> s - 3 = 0, CPs: [7, 4, 0]
// 4 [1] - Change         | s = 4, argmax = 0, s -> s - 1 = 3, CPs: [7, 4]
// 5 [0 1]                |
// 6 [0 0 1]              | s = 6, argmax = 2, s -> s - 2 = 4, CPs: [7, 4]
// 7 [1] - Change         | s = 7, argmax = 0, s -> s - 1 = 6, CPs: [7]
// 8 [0 1]                | s = 8, argmax = 1, s -> s - 1 = 7, CPs: [7]

/// Maximum a posteriori change points
///
/// This reverse walks through the run-length distribution sequence (one
/// distribution per observation) and only takes the most likely set of
/// change-points.
#[must_use]
pub fn map_changepoints(r: &[Vec<f64>]) -> Vec<usize> {
    let Some(mut s) = r.len().checked_sub(1) else {
        return Vec::new();
    };
    let mut change_points: Vec<usize> = vec![];
    while s != 0 {
        match argmax(&r[s]).unwrap_or(0) {
            0 => {
                if change_points.last().is_some_and(|&last| last != s) {
                    change_points.push(s);
                }
                s -= 1;
            }
            run_length => {
                s = s.saturating_sub(run_length);
                change_points.push(s);
            }
        }
    }
    change_points.reverse();
    change_points
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn simple_map() {
        let r: [Vec<f64>; 9] = [
            vec![1.],
            vec![0., 1.],
            vec![0., 0., 1.],
            vec![0., 0., 0., 1.],
            vec![1.],
            vec![0., 1.],
            vec![0., 0., 1.],
            vec![1.],
            vec![0., 1.],
        ];

        assert_eq!(map_changepoints(&r), vec![0, 4, 7]);
    }

    #[test]
    fn consecutive_map() {
        let r: [Vec<f64>; 9] = [
            vec![1.],
            vec![0., 1.],
            vec![0., 0., 1.],
            vec![0., 0., 0., 1.],
            vec![1.],
            vec![1.],
            vec![1.],
            vec![1.],
            vec![0., 1.],
        ];

        assert_eq!(map_changepoints(&r), vec![0, 4, 5, 6, 7]);
    }

    #[test]
    fn empty_map() {
        assert!(map_changepoints(&[]).is_empty());
        assert!(map_changepoints(&[vec![1.0]]).is_empty());
    }

    #[test]
    fn parse_first_field_and_skip_blanks() {
        let input = "0.5\n\n-1.25,ignored\n  3e2 \n";
        let data = parse_series(Cursor::new(input)).unwrap();
        assert_eq!(data, vec![0.5, -1.25, 300.0]);
    }

    #[test]
    fn parse_error_reports_line() {
        let err = parse_series(Cursor::new("1.0\nabc\n")).unwrap_err();
        match err {
            BocpdError::Parse { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn series_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        let values = [0.5, 0.3, -0.8, 1e-12];
        write_series(&path, &values).unwrap();
        assert_eq!(read_series(&path).unwrap(), values.to_vec());

        let maxes: Vec<usize> = vec![0, 1, 2, 1];
        let path = dir.path().join("maxes.csv");
        write_series(&path, &maxes).unwrap();
        assert_eq!(read_series(&path).unwrap(), vec![0.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_series(dir.path().join("nope.csv")),
            Err(BocpdError::Io(_))
        ));
    }

    #[test]
    fn matrix_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.csv");
        let mut m = RunLengthMatrix::new(1);
        m.replace_column_range(1, 0, &[0.25, 0.75]).unwrap();
        write_matrix(&path, &m).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1,0.25\n0,0.75\n");
    }
}
