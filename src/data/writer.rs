use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::format::NumberFormat;
use super::model::Matrix;
use crate::config::DatasetOptions;
use crate::error::{DataError, Result};

/// Options that affect how a table is written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub delimiter: u8,
    pub format: NumberFormat,
    /// Prefix for the header line, `"# "` by default.
    pub comments: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions::from(&DatasetOptions::default())
    }
}

impl From<&DatasetOptions> for WriteOptions {
    fn from(o: &DatasetOptions) -> Self {
        WriteOptions {
            delimiter: o.delimiter,
            format: o.fmt.clone(),
            comments: o.comments.clone(),
        }
    }
}

/// What [`write_table`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows: usize,
    /// Parent directory created for the file, if it did not exist.
    pub created_dir: Option<PathBuf>,
}

/// Write `matrix` to `path` as delimited text.
///
/// The first line is `{comments}{header}`; each following line is one row
/// with every value rendered by `options.format`. Missing parent
/// directories are created and an existing file is overwritten.
pub fn write_table(
    path: &Path,
    matrix: &Matrix,
    header: &str,
    options: &WriteOptions,
) -> Result<WriteSummary> {
    let created_dir = ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}{}", options.comments, header).map_err(|e| DataError::io(path, e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .from_writer(out);
    for row in matrix.iter_rows() {
        writer
            .write_record(row.iter().map(|&v| options.format.format(v)))
            .map_err(|e| DataError::io(path, e.into()))?;
    }
    writer.flush().map_err(|e| DataError::io(path, e))?;

    Ok(WriteSummary {
        rows: matrix.rows(),
        created_dir,
    })
}

/// Create the parent directory of `path` when missing. Returns the directory
/// only if it was created by this call.
fn ensure_parent_dir(path: &Path) -> Result<Option<PathBuf>> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(|e| DataError::io(dir, e))?;
            Ok(Some(dir.to_path_buf()))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Matrix {
        Matrix::from_rows(vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.5, 3.0, 4.0, 7.0]]).unwrap()
    }

    #[test]
    fn writes_comment_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let summary =
            write_table(&path, &table(), "t,x,y,synthetic wave", &WriteOptions::default()).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.created_dir, None);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# t,x,y,synthetic wave\n0,1,2,3\n0.5,3,4,7\n");
    }

    #[test]
    fn creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("sub").join("result.csv");
        let summary = write_table(&path, &table(), "h", &WriteOptions::default()).unwrap();
        assert_eq!(summary.created_dir, Some(dir.path().join("out").join("sub")));
        assert!(path.exists());

        // Second write: directory already there, file overwritten.
        let summary = write_table(&path, &Matrix::empty(4), "h2", &WriteOptions::default()).unwrap();
        assert_eq!(summary.created_dir, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# h2\n");
    }

    #[test]
    fn honours_delimiter_format_and_comment_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semi.csv");
        let options = WriteOptions {
            delimiter: b';',
            format: NumberFormat::parse("%.2f").unwrap(),
            comments: "#".to_string(),
        };
        write_table(&path, &table(), "t;x;y;s", &options).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "#t;x;y;s\n0.00;1.00;2.00;3.00\n0.50;3.00;4.00;7.00\n"
        );
    }

    #[test]
    fn surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file.
        let err = write_table(dir.path(), &table(), "h", &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
