use std::path::Path;

use crate::error::{DataError, Result};

/// The only extension accepted for input tables (case-sensitive).
pub const CSV_EXTENSION: &str = ".csv";

/// Check that `path` names an existing `.csv` file.
///
/// The extension is checked first, without touching the filesystem.
pub fn validate_csv_path(path: &Path) -> Result<&Path> {
    let has_csv_suffix = path
        .to_str()
        .map(|s| s.ends_with(CSV_EXTENSION))
        .unwrap_or(false);
    if !has_csv_suffix {
        return Err(DataError::InvalidFileType {
            path: path.to_path_buf(),
        });
    }
    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_extension_is_rejected_before_existence() {
        let err = validate_csv_path(Path::new("/definitely/not/here/data.txt")).unwrap_err();
        assert!(matches!(err, DataError::InvalidFileType { .. }));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let err = validate_csv_path(Path::new("DATA.CSV")).unwrap_err();
        assert!(matches!(err, DataError::InvalidFileType { .. }));
    }

    #[test]
    fn missing_csv_is_not_found() {
        let err = validate_csv_path(Path::new("/definitely/not/here/data.csv")).unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }

    #[test]
    fn existing_csv_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "t,x\n0,1\n").unwrap();
        assert_eq!(validate_csv_path(&path).unwrap(), path.as_path());
    }
}
