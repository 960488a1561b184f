use super::model::Matrix;
use crate::error::{DataError, Result};

/// Append the row-wise sum of the selected columns as a new last column.
///
/// `targets = None` sums every column. Listed indices are summed as given,
/// so a repeated index counts twice. NaN cells propagate into the sum.
pub fn append_row_sum(matrix: &Matrix, targets: Option<&[usize]>) -> Result<Matrix> {
    if let Some(targets) = targets {
        if let Some(&index) = targets.iter().find(|&&i| i >= matrix.cols()) {
            return Err(DataError::ColumnOutOfRange {
                index,
                columns: matrix.cols(),
            });
        }
    }

    let sums: Vec<f64> = matrix
        .iter_rows()
        .map(|row| match targets {
            None => row.iter().sum(),
            Some(targets) => targets.iter().map(|&j| row[j]).sum(),
        })
        .collect();

    // iter_rows yields nothing for a zero-width table
    let sums = if matrix.cols() == 0 {
        vec![0.0; matrix.rows()]
    } else {
        sums
    };

    Ok(matrix.with_trailing_column(&sums))
}
