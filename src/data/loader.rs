use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};

use super::model::Matrix;
use super::path::validate_csv_path;
use crate::config::{DatasetOptions, LoaderKind};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Load options and result
// ---------------------------------------------------------------------------

/// Options that affect how a file is read.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub loader: LoaderKind,
    pub fillna: bool,
    pub fillna_value: f64,
    /// Lines starting with this marker are ignored; it is also stripped from
    /// the header line.
    pub comments: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions::from(&DatasetOptions::default())
    }
}

impl From<&DatasetOptions> for LoadOptions {
    fn from(o: &DatasetOptions) -> Self {
        LoadOptions {
            delimiter: o.delimiter,
            loader: o.loader,
            fillna: o.fillna,
            fillna_value: o.fillna_value,
            comments: o.comments.clone(),
        }
    }
}

/// A parsed file: the full numeric table (timestamp column included) and
/// one header name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub matrix: Matrix,
    pub header: Vec<String>,
    /// `false` when line one was read as data: either the file has no
    /// header or the header-skipping parse failed and the retry succeeded.
    pub header_skipped: bool,
    /// `true` when the first line held numbers and names were generated.
    pub header_synthesized: bool,
}

// ---------------------------------------------------------------------------
// TableParser – interchangeable numeric backends
// ---------------------------------------------------------------------------

/// Parses delimited text into a numeric table.
///
/// Implementations receive text with comment and blank lines already
/// removed, and must reject records whose field count differs from the
/// first record's.
pub trait TableParser {
    fn parse(&self, body: &str, cells: &CellPolicy) -> std::result::Result<Matrix, String>;
}

/// How a single text cell becomes a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPolicy {
    pub delimiter: u8,
    pub fill: Option<f64>,
}

impl CellPolicy {
    /// Empty or unparseable cells become the fill value, or NaN without one.
    pub fn convert(&self, cell: Option<&str>) -> f64 {
        cell.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or_else(|| self.fill.unwrap_or(f64::NAN))
    }
}

/// Backend built on the `csv` crate's record reader.
pub struct DelimitedParser;

impl TableParser for DelimitedParser {
    fn parse(&self, body: &str, cells: &CellPolicy) -> std::result::Result<Matrix, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(cells.delimiter)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(|e| format!("CSV row {row_no}: {e}"))?;
            rows.push(record.iter().map(|c| cells.convert(Some(c))).collect());
        }
        Matrix::from_rows(rows).map_err(|e| e.to_string())
    }
}

/// Backend built on Arrow's CSV reader. Every column is read as text and
/// converted afterwards, so unparseable cells follow the fill policy
/// instead of failing the batch.
pub struct ArrowParser;

impl TableParser for ArrowParser {
    fn parse(&self, body: &str, cells: &CellPolicy) -> std::result::Result<Matrix, String> {
        if body.trim().is_empty() {
            return Ok(Matrix::empty(0));
        }

        let format = Format::default()
            .with_header(false)
            .with_delimiter(cells.delimiter);
        let (inferred, _) = format
            .infer_schema(Cursor::new(body.as_bytes()), Some(1))
            .map_err(|e| e.to_string())?;
        let schema = Schema::new(
            inferred
                .fields()
                .iter()
                .map(|f| Field::new(f.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let width = schema.fields().len();

        let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema))
            .with_header(false)
            .with_delimiter(cells.delimiter)
            .build(Cursor::new(body.as_bytes()))
            .map_err(|e| e.to_string())?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| e.to_string())?;
            let columns: Vec<_> = batch
                .columns()
                .iter()
                .map(|c| c.as_string::<i32>())
                .collect();
            for row in 0..batch.num_rows() {
                let mut values = Vec::with_capacity(width);
                for col in &columns {
                    let cell = (!col.is_null(row)).then(|| col.value(row));
                    values.push(cells.convert(cell));
                }
                rows.push(values);
            }
        }
        Matrix::from_rows(rows).map_err(|e| e.to_string())
    }
}

impl LoaderKind {
    pub fn parser(self) -> Box<dyn TableParser> {
        match self {
            LoaderKind::Csv => Box::new(DelimitedParser),
            LoaderKind::Arrow => Box::new(ArrowParser),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a delimited file into a numeric table plus header.
///
/// The first physical line is the header. The numeric parse skips it; if
/// that fails the whole file is parsed once more without skipping. A file
/// whose first line is entirely numeric has no header: the table starts at
/// line one and names are generated as `time, wave1, wave2, …`.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    let path = validate_csv_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| DataError::csv_read(path, e))?;

    let first_line = text.lines().next().unwrap_or("");
    let raw_header = split_header(first_line, options);
    let headerless = !raw_header.is_empty()
        && raw_header
            .iter()
            .all(|field| !field.is_empty() && field.parse::<f64>().is_ok());

    let parser = options.loader.parser();
    let cells = CellPolicy {
        delimiter: options.delimiter,
        fill: options.fillna.then_some(options.fillna_value),
    };

    let (matrix, header_skipped) = if headerless {
        let matrix = parser
            .parse(&table_body(&text, 0, &options.comments), &cells)
            .map_err(|cause| DataError::csv_read(path, cause))?;
        (matrix, false)
    } else {
        match parser.parse(&table_body(&text, 1, &options.comments), &cells) {
            Ok(matrix) => (matrix, true),
            // The unskipped body contains the skipped one, so a structural
            // error there repeats here and this retry rarely succeeds.
            Err(_) => {
                let matrix = parser
                    .parse(&table_body(&text, 0, &options.comments), &cells)
                    .map_err(|cause| DataError::csv_read(path, cause))?;
                (matrix, false)
            }
        }
    };

    if matrix.is_empty() {
        return Err(DataError::csv_read(path, "empty"));
    }
    if matrix.is_all_nan() {
        return Err(DataError::csv_read(path, "all-missing"));
    }

    let header = if headerless {
        synthesized_header(matrix.cols())
    } else {
        fit_header(raw_header, matrix.cols())
    };

    Ok(LoadedTable {
        matrix,
        header,
        header_skipped,
        header_synthesized: headerless,
    })
}

/// Split the raw first line into trimmed header fields.
fn split_header(line: &str, options: &LoadOptions) -> Vec<String> {
    let line = line.trim_start_matches('\u{feff}');
    let marker = options.comments.trim();
    let line = if marker.is_empty() {
        line
    } else {
        line.trim_start().strip_prefix(marker).unwrap_or(line)
    };
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split(options.delimiter as char)
        .map(|f| f.trim().to_string())
        .collect()
}

/// The text handed to a parser: `skip` physical lines dropped, then blank
/// and comment lines removed.
fn table_body(text: &str, skip: usize, comments: &str) -> String {
    let marker = comments.trim();
    let mut body = String::with_capacity(text.len());
    for line in text.lines().skip(skip) {
        let trimmed = line.trim();
        if trimmed.is_empty() || (!marker.is_empty() && trimmed.starts_with(marker)) {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }
    body
}

fn synthesized_header(cols: usize) -> Vec<String> {
    std::iter::once("time".to_string())
        .chain((1..cols).map(|i| format!("wave{i}")))
        .collect()
}

/// Pad with generated names or drop surplus names so there is one per column.
fn fit_header(mut header: Vec<String>, cols: usize) -> Vec<String> {
    if header.len() > cols {
        header.truncate(cols);
    }
    while header.len() < cols {
        let i = header.len();
        header.push(if i == 0 {
            "time".to_string()
        } else {
            format!("wave{i}")
        });
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn opts(loader: LoaderKind) -> LoadOptions {
        LoadOptions {
            loader,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn loads_header_and_matrix() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.csv", "t,x,y\n0,1,2\n1,3,4\n");
        for loader in [LoaderKind::Csv, LoaderKind::Arrow] {
            let table = load_csv(&path, &opts(loader)).unwrap();
            assert_eq!(table.header, vec!["t", "x", "y"]);
            assert_eq!(table.matrix.rows(), 2);
            assert_eq!(table.matrix.row(0), &[0.0, 1.0, 2.0]);
            assert_eq!(table.matrix.row(1), &[1.0, 3.0, 4.0]);
            assert!(table.header_skipped);
            assert!(!table.header_synthesized);
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "h.csv", "t,x,y\n");
        for loader in [LoaderKind::Csv, LoaderKind::Arrow] {
            let err = load_csv(&path, &opts(loader)).unwrap_err();
            assert!(
                matches!(err, DataError::CsvRead { ref cause, .. } if cause == "empty"),
                "{loader}: {err}"
            );
        }
    }

    #[test]
    fn all_missing_without_fill() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "m.csv", "t,x\na,b\nc,\n");
        for loader in [LoaderKind::Csv, LoaderKind::Arrow] {
            let options = LoadOptions {
                fillna: false,
                ..opts(loader)
            };
            let err = load_csv(&path, &options).unwrap_err();
            assert!(
                matches!(err, DataError::CsvRead { ref cause, .. } if cause == "all-missing"),
                "{loader}: {err}"
            );
        }
    }

    #[test]
    fn fill_policy_replaces_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "f.csv", "t,x,y\n0,,2\n1,abc,4\n");

        let filled = load_csv(
            &path,
            &LoadOptions {
                fillna_value: -1.0,
                ..LoadOptions::default()
            },
        )
        .unwrap();
        assert_eq!(filled.matrix.column(1), Some(vec![-1.0, -1.0]));

        let raw = load_csv(
            &path,
            &LoadOptions {
                fillna: false,
                ..LoadOptions::default()
            },
        )
        .unwrap();
        assert!(raw.matrix.column(1).unwrap().iter().all(|v| v.is_nan()));
        assert_eq!(raw.matrix.column(2), Some(vec![2.0, 4.0]));
    }

    #[test]
    fn backends_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "b.csv",
            "time;a;b\n0.0; 1.5;-2\n0.5;;3e2\n\n1.0;7;x\n",
        );
        let mut options = LoadOptions {
            delimiter: b';',
            fillna: false,
            ..LoadOptions::default()
        };
        let csv_table = load_csv(&path, &options).unwrap();
        options.loader = LoaderKind::Arrow;
        let arrow_table = load_csv(&path, &options).unwrap();

        assert_eq!(csv_table.header, arrow_table.header);
        assert_eq!(csv_table.matrix.rows(), 3);
        for (a, b) in csv_table
            .matrix
            .iter_rows()
            .flatten()
            .zip(arrow_table.matrix.iter_rows().flatten())
        {
            assert!(a == b || (a.is_nan() && b.is_nan()), "{a} != {b}");
        }
        assert_eq!(csv_table.matrix.row(0), &[0.0, 1.5, -2.0]);
        assert_eq!(csv_table.matrix.get(1, 2), Some(300.0));
    }

    #[test]
    fn headerless_file_gets_generated_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "n.csv", "0,1,2\n1,3,4\n");
        let table = load_csv(&path, &LoadOptions::default()).unwrap();
        assert!(table.header_synthesized);
        assert_eq!(table.header, vec!["time", "wave1", "wave2"]);
        assert_eq!(table.matrix.rows(), 2);
    }

    #[test]
    fn comment_prefixed_header_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "c.csv", "# t,x,y,synthetic wave\n0,1,2,3\n");
        let table = load_csv(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.header, vec!["t", "x", "y", "synthetic wave"]);
        assert_eq!(table.matrix.row(0), &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn header_is_fitted_to_column_count() {
        assert_eq!(
            fit_header(vec!["t".into()], 3),
            vec!["t", "wave1", "wave2"]
        );
        assert_eq!(fit_header(vec!["t".into(), "x".into(), "y".into()], 2), vec!["t", "x"]);
    }

    #[test]
    fn ragged_rows_fail_both_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "r.csv", "t,x,y\n0,1,2\n1,3\n");
        for loader in [LoaderKind::Csv, LoaderKind::Arrow] {
            let err = load_csv(&path, &opts(loader)).unwrap_err();
            assert!(matches!(err, DataError::CsvRead { .. }), "{loader}: {err}");
        }
    }

    #[test]
    fn short_header_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.csv", "title\n0,1\n1,2\n");
        let table = load_csv(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.header, vec!["title", "wave1"]);
        assert_eq!(table.matrix.rows(), 2);
    }

    #[test]
    fn validation_runs_first() {
        let err = load_csv(Path::new("nope.txt"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::InvalidFileType { .. }));
        let err = load_csv(Path::new("/no/such/file.csv"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }
}
