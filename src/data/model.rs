use std::fmt;

// ---------------------------------------------------------------------------
// Matrix – dense row-major numeric table
// ---------------------------------------------------------------------------

/// A dense `rows × cols` table of `f64`, stored row-major.
///
/// The column count is fixed at construction; every row has exactly
/// `cols` values. Missing cells are represented as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

/// Returned by [`Matrix::from_rows`] when the rows disagree on width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedRow {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for RaggedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} has {} fields, expected {}",
            self.row, self.found, self.expected
        )
    }
}

impl std::error::Error for RaggedRow {}

impl Matrix {
    /// An empty table with a known column count.
    pub fn empty(cols: usize) -> Self {
        Matrix {
            rows: 0,
            cols,
            values: Vec::new(),
        }
    }

    /// Build a matrix from row vectors. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RaggedRow> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RaggedRow {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Matrix {
            rows: rows.len(),
            cols,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// Borrow one row. Panics if `i >= rows`, like slice indexing.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics, and a zero-width table has nothing to yield anyway
        let chunk = self.cols.max(1);
        self.values
            .chunks_exact(chunk)
            .take(if self.cols == 0 { 0 } else { self.rows })
    }

    /// Copy out one column.
    pub fn column(&self, j: usize) -> Option<Vec<f64>> {
        (j < self.cols).then(|| self.iter_rows().map(|r| r[j]).collect())
    }

    /// `true` when the table has at least one cell and every cell is NaN.
    pub fn is_all_nan(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|v| v.is_nan())
    }

    /// Split off column 0 (timestamps) from the remaining columns.
    pub fn split_first_column(&self) -> (Vec<f64>, Matrix) {
        if self.cols == 0 {
            return (Vec::new(), Matrix::empty(0));
        }
        let first = self.iter_rows().map(|r| r[0]).collect();
        let rest_cols = self.cols - 1;
        let mut values = Vec::with_capacity(self.rows * rest_cols);
        for row in self.iter_rows() {
            values.extend_from_slice(&row[1..]);
        }
        (
            first,
            Matrix {
                rows: self.rows,
                cols: rest_cols,
                values,
            },
        )
    }

    /// New matrix with `column` inserted before column 0.
    ///
    /// `column.len()` must equal `rows`.
    pub fn with_leading_column(&self, column: &[f64]) -> Matrix {
        debug_assert_eq!(column.len(), self.rows);
        let cols = self.cols + 1;
        let mut values = Vec::with_capacity(self.rows * cols);
        for (row, &lead) in self.iter_rows().zip(column) {
            values.push(lead);
            values.extend_from_slice(row);
        }
        if self.cols == 0 {
            values.extend_from_slice(column);
        }
        Matrix {
            rows: self.rows,
            cols,
            values,
        }
    }

    /// New matrix with `column` appended after the last column.
    ///
    /// `column.len()` must equal `rows`.
    pub fn with_trailing_column(&self, column: &[f64]) -> Matrix {
        debug_assert_eq!(column.len(), self.rows);
        let cols = self.cols + 1;
        let mut values = Vec::with_capacity(self.rows * cols);
        if self.cols == 0 {
            values.extend_from_slice(column);
        } else {
            for (row, &tail) in self.iter_rows().zip(column) {
                values.extend_from_slice(row);
                values.push(tail);
            }
        }
        Matrix {
            rows: self.rows,
            cols,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(vec![vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 4.0]]).unwrap()
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn split_first_column_separates_timestamps() {
        let (ts, rest) = sample().split_first_column();
        assert_eq!(ts, vec![0.0, 1.0]);
        assert_eq!(rest.cols(), 2);
        assert_eq!(rest.row(0), &[1.0, 2.0]);
        assert_eq!(rest.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn leading_and_trailing_columns() {
        let (ts, rest) = sample().split_first_column();
        assert_eq!(rest.with_leading_column(&ts), sample());

        let appended = rest.with_trailing_column(&[9.0, 8.0]);
        assert_eq!(appended.cols(), 3);
        assert_eq!(appended.column(2), Some(vec![9.0, 8.0]));
    }

    #[test]
    fn zero_width_matrix_grows_a_column() {
        let (_, rest) = Matrix::from_rows(vec![vec![5.0], vec![6.0]])
            .unwrap()
            .split_first_column();
        assert_eq!(rest.cols(), 0);
        assert_eq!(rest.rows(), 2);
        let grown = rest.with_trailing_column(&[1.0, 2.0]);
        assert_eq!(grown.column(0), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn all_nan_detection() {
        let m = Matrix::from_rows(vec![vec![f64::NAN, f64::NAN]]).unwrap();
        assert!(m.is_all_nan());
        assert!(!sample().is_all_nan());
        assert!(!Matrix::empty(3).is_all_nan());
    }
}
