use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{EngineError, Result};

use super::model::RawMatrix;

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// Field separator of a sample file. Files never mix the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Candidates in the order they are tried.
    const CANDIDATES: [Delimiter; 2] = [Delimiter::Comma, Delimiter::Tab];

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }

    pub fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

/// Where the numeric data starts and how its fields are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFormat {
    /// Lines skipped before the first fully numeric line.
    pub header_lines: usize,
    pub delimiter: Delimiter,
}

/// Scan `path` line by line for the first row whose fields all parse as
/// numbers, splitting on comma first and tab second.
///
/// Header lines are never decoded, so they may use any encoding.
pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let reader = BufReader::new(file);

    for (idx, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        if let Some(delimiter) = numeric_delimiter(&line) {
            return Ok(FileFormat {
                header_lines: idx,
                delimiter,
            });
        }
    }
    Err(EngineError::parse(path, None, "no numeric data rows found"))
}

fn detect_in_bytes(path: &Path, bytes: &[u8]) -> Result<FileFormat> {
    bytes
        .split(|&b| b == b'\n')
        .enumerate()
        .find_map(|(idx, line)| {
            numeric_delimiter(line).map(|delimiter| FileFormat {
                header_lines: idx,
                delimiter,
            })
        })
        .ok_or_else(|| EngineError::parse(path, None, "no numeric data rows found"))
}

/// The delimiter under which every field of `line` is a number, if any.
///
/// Lines that are not valid UTF-8 are never numeric.
fn numeric_delimiter(line: &[u8]) -> Option<Delimiter> {
    let line = std::str::from_utf8(line).ok()?;
    Delimiter::CANDIDATES.into_iter().find(|d| {
        line.split(d.as_char())
            .all(|field| field.trim().parse::<f64>().is_ok())
    })
}

// ---------------------------------------------------------------------------
// Matrix loading
// ---------------------------------------------------------------------------

/// Load a delimited text file into a [`RawMatrix`].
///
/// Layout:
/// * zero or more header lines (anything that is not all-numeric)
/// * numeric rows, `x<sep>ch0<sep>ch1...`, separator `,` or `\t`
///
/// Blank lines inside the data block are skipped. Every other row must have
/// the same number of numeric fields as the first one.
pub fn load(path: &Path) -> Result<RawMatrix> {
    load_with_format(path).map(|(matrix, _)| matrix)
}

/// [`load`], also returning the detected layout.
pub fn load_with_format(path: &Path) -> Result<(RawMatrix, FileFormat)> {
    let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
    let format = detect_in_bytes(path, &bytes)?;
    log::debug!(
        "{}: {} header lines, {} delimited",
        path.display(),
        format.header_lines,
        format.delimiter
    );

    let body = skip_lines(&bytes, format.header_lines);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(format.delimiter.as_byte())
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width: Option<usize> = None;

    for result in reader.byte_records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize + format.header_lines);
            EngineError::parse(path, line, e.to_string())
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize + format.header_lines);

        if record.len() == 1 && record.get(0).is_some_and(<[u8]>::is_empty) {
            continue;
        }

        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(EngineError::parse(
                path,
                line,
                format!("expected {expected} fields, found {}", record.len()),
            ));
        }

        let row = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                let field = std::str::from_utf8(field).map_err(|_| {
                    EngineError::parse(path, line, format!("column {col}: not valid UTF-8"))
                })?;
                field.parse::<f64>().map_err(|_| {
                    EngineError::parse(path, line, format!("column {col}: '{field}' is not a number"))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let matrix =
        RawMatrix::from_rows(&rows).map_err(|e| EngineError::parse(path, None, e.to_string()))?;
    Ok((matrix, format))
}

/// Slice of `bytes` starting after its first `n` lines.
fn skip_lines(bytes: &[u8], n: usize) -> &[u8] {
    let offset: usize = bytes
        .split_inclusive(|&b| b == b'\n')
        .take(n)
        .map(<[u8]>::len)
        .sum();
    &bytes[offset..]
}

fn io_error(path: &Path, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use std::path::PathBuf;

    fn fixture(body: &str) -> (tempfile::TempDir, PathBuf) {
        fixture_bytes(body.as_bytes())
    }

    fn fixture_bytes(body: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.dat");
        let mut f = File::create(&path).unwrap();
        f.write_all(body).unwrap();
        (dir, path)
    }

    #[test]
    fn detects_tab_without_header() {
        let (_dir, path) = fixture("1000\t0.1\t0.2\n999\t0.15\t0.25\n");
        let format = detect_format(&path).unwrap();
        assert_eq!(
            format,
            FileFormat {
                header_lines: 0,
                delimiter: Delimiter::Tab
            }
        );
    }

    #[test]
    fn detects_comma_after_header_lines() {
        let (_dir, path) = fixture("# IR run 12\nwavenumber,A,B\n\n4000, 0.1, 0.2\n3998, 0.2, 0.3\n");
        let format = detect_format(&path).unwrap();
        assert_eq!(format.header_lines, 3);
        assert_eq!(format.delimiter, Delimiter::Comma);
    }

    #[test]
    fn detection_fails_on_text_only_file() {
        let (_dir, path) = fixture("title\nno numbers here\n");
        assert_eq!(detect_format(&path).unwrap_err().kind(), ErrorKind::Parse);

        let (_dir, empty) = fixture("");
        assert_eq!(load(&empty).unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn loads_matrix_after_header() {
        let (_dir, path) = fixture("wn\tA\tB\n1000\t0.1\t0.2\n999\t0.15\t0.25\n998\t0.12\t0.22\n");
        let m = load(&path).unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m.x(), &[1000.0, 999.0, 998.0]);
        assert_eq!(m.channel(0).unwrap(), &[0.1, 0.15, 0.12]);
    }

    #[test]
    fn crlf_and_trailing_blank_lines_are_accepted() {
        let (_dir, path) = fixture("1,2,3\r\n4,5,6\r\n\r\n\n");
        let m = load(&path).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.channel(1).unwrap(), &[3.0, 6.0]);
    }

    #[test]
    fn ragged_row_reports_its_line() {
        let (_dir, path) = fixture("header\n1,2,3\n4,5\n");
        match load(&path).unwrap_err() {
            EngineError::Parse { line, reason, .. } => {
                assert_eq!(line, Some(3));
                assert!(reason.contains("expected 3 fields"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_field_is_parse_error() {
        let (_dir, path) = fixture("1\t2\n3\tabc\n");
        let err = load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn latin1_header_line_is_skipped() {
        // 0xb5 is MICRO SIGN in Latin-1 and not valid UTF-8 on its own.
        let (_dir, path) = fixture_bytes(b"Wavenumber (cm-1)\tA\xb5\n1000\t0.1\n999\t0.2\n998\t0.3\n");
        assert_eq!(
            detect_format(&path).unwrap(),
            FileFormat {
                header_lines: 1,
                delimiter: Delimiter::Tab
            }
        );
        let m = load(&path).unwrap();
        assert_eq!(m.x(), &[1000.0, 999.0, 998.0]);
        assert_eq!(m.channel(0).unwrap(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn non_utf8_data_field_is_parse_error() {
        let (_dir, path) = fixture_bytes(b"1\t2\n3\t\xb5\n");
        match load(&path).unwrap_err() {
            EngineError::Parse { line, reason, .. } => {
                assert_eq!(line, Some(2));
                assert!(reason.contains("UTF-8"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_column_is_parse_error() {
        let (_dir, path) = fixture("1\n2\n3\n");
        assert_eq!(load(&path).unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(Path::new("/definitely/not/here.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
