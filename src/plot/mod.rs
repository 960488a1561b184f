//! Stacked, time-aligned line plots.
//!
//! [`StackedPlot`] validates and labels the data once; [`render`] writes it
//! to an image and [`crate::app`] shows it in a window.

pub mod render;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::color::{generate_palette, SeriesColor};
use crate::data::model::Matrix;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("The number of rows in the data ({rows}) must match the number of timestamps ({timestamps})")]
    LengthMismatch { rows: usize, timestamps: usize },

    #[error("Got {labels} labels for {columns} columns. Use sparse labels to name specific columns")]
    LabelCount { labels: usize, columns: usize },

    #[error("Label index {index} is out of range for {columns} columns")]
    LabelIndex { index: isize, columns: usize },

    #[error("Nothing to plot: the data has no columns")]
    NoSeries,

    #[error("Failed to render plot: {0}")]
    Render(String),
}

/// How each plotted column is named.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Labels {
    /// `wave1`, `wave2`, …
    #[default]
    Auto,
    /// One label per column.
    List(Vec<String>),
    /// Labels for some columns; negative indices count from the end.
    /// Columns without an entry fall back to `waveN`.
    Sparse(BTreeMap<isize, String>),
}

/// One plotted column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub color: SeriesColor,
}

/// Columns of a table plotted one above the other against shared timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedPlot {
    pub title: String,
    pub xlabel: String,
    pub timestamps: Vec<f64>,
    pub series: Vec<Series>,
}

impl StackedPlot {
    pub fn new(
        table: &Matrix,
        timestamps: &[f64],
        labels: Labels,
        title: impl Into<String>,
        xlabel: impl Into<String>,
    ) -> Result<Self, PlotError> {
        if table.rows() != timestamps.len() {
            return Err(PlotError::LengthMismatch {
                rows: table.rows(),
                timestamps: timestamps.len(),
            });
        }
        if table.cols() == 0 {
            return Err(PlotError::NoSeries);
        }

        let labels = resolve_labels(labels, table.cols())?;
        let colors = generate_palette(table.cols());
        let series = labels
            .into_iter()
            .zip(colors)
            .enumerate()
            .map(|(j, (label, color))| Series {
                label,
                values: table.column(j).unwrap_or_default(),
                color,
            })
            .collect();

        Ok(StackedPlot {
            title: title.into(),
            xlabel: xlabel.into(),
            timestamps: timestamps.to_vec(),
            series,
        })
    }

    /// Shared x range over all finite timestamps.
    pub fn x_range(&self) -> (f64, f64) {
        padded_range(&self.timestamps, 0.0)
    }
}

/// Turn a [`Labels`] choice into exactly `columns` names.
pub fn resolve_labels(labels: Labels, columns: usize) -> Result<Vec<String>, PlotError> {
    let auto = || (1..=columns).map(|i| format!("wave{i}")).collect::<Vec<_>>();
    match labels {
        Labels::Auto => Ok(auto()),
        Labels::List(list) => {
            if list.len() != columns {
                return Err(PlotError::LabelCount {
                    labels: list.len(),
                    columns,
                });
            }
            Ok(list)
        }
        Labels::Sparse(map) => {
            let mut names = auto();
            for (index, label) in map {
                let resolved = if index < 0 {
                    columns.checked_sub(index.unsigned_abs())
                } else {
                    Some(index as usize).filter(|&i| i < columns)
                };
                let slot = resolved.ok_or(PlotError::LabelIndex { index, columns })?;
                names[slot] = label;
            }
            Ok(names)
        }
    }
}

/// `(min, max)` of the finite values, widened by `margin` × span on both
/// sides. Flat or empty data still yields a non-empty range.
pub fn padded_range(values: &[f64], margin: f64) -> (f64, f64) {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.1 };
        return (min - half, max + half);
    }
    (min - span * margin, max + span * margin)
}

/// Split a line into runs of finite points so NaN leaves a gap.
pub fn finite_segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in xs.iter().zip(ys) {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combined() -> Matrix {
        Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 7.0]]).unwrap()
    }

    #[test]
    fn builds_one_series_per_column() {
        let plot = StackedPlot::new(&combined(), &[0.0, 1.0], Labels::Auto, "Plot", "Time").unwrap();
        assert_eq!(plot.series.len(), 3);
        assert_eq!(plot.series[2].values, vec![3.0, 7.0]);
        assert_eq!(plot.series[0].label, "wave1");
        assert_ne!(plot.series[0].color, plot.series[1].color);
        assert_eq!(plot.x_range(), (0.0, 1.0));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = StackedPlot::new(&combined(), &[0.0], Labels::Auto, "Plot", "Time").unwrap_err();
        assert!(matches!(
            err,
            PlotError::LengthMismatch {
                rows: 2,
                timestamps: 1
            }
        ));
    }

    #[test]
    fn label_list_must_match() {
        let err = resolve_labels(Labels::List(vec!["a".into()]), 3).unwrap_err();
        assert!(matches!(err, PlotError::LabelCount { labels: 1, columns: 3 }));
        let ok = resolve_labels(Labels::List(vec!["a".into(), "b".into()]), 2).unwrap();
        assert_eq!(ok, vec!["a", "b"]);
    }

    #[test]
    fn sparse_labels_fill_gaps() {
        let map = BTreeMap::from([(0, "first".to_string()), (-1, "last".to_string())]);
        let names = resolve_labels(Labels::Sparse(map), 4).unwrap();
        assert_eq!(names, vec!["first", "wave2", "wave3", "last"]);

        let bad = BTreeMap::from([(-5, "x".to_string())]);
        assert!(matches!(
            resolve_labels(Labels::Sparse(bad), 4),
            Err(PlotError::LabelIndex { index: -5, .. })
        ));
        let bad = BTreeMap::from([(4, "x".to_string())]);
        assert!(resolve_labels(Labels::Sparse(bad), 4).is_err());
    }

    #[test]
    fn padded_range_handles_flat_and_missing_data() {
        assert_eq!(padded_range(&[0.0, 10.0], 0.2), (-2.0, 12.0));
        assert_eq!(padded_range(&[0.0, 0.0], 0.2), (-0.5, 0.5));
        assert_eq!(padded_range(&[f64::NAN], 0.2), (0.0, 1.0));
        let (lo, hi) = padded_range(&[5.0, f64::NAN, 5.0], 0.2);
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn nan_breaks_segments() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, f64::NAN, 2.0, 3.0, f64::NAN];
        let segments = finite_segments(&xs, &ys);
        assert_eq!(segments, vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
    }
}
