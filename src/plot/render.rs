//! Static image output for a [`StackedPlot`], drawn with plotters.
//!
//! Layout: a title on top, then one panel per series stacked vertically
//! with a shared x range. Only the bottom panel carries x tick labels and
//! the x axis description. Each panel has its own y range (20% margin) and
//! a one-entry legend in the upper right corner.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use super::{finite_segments, padded_range, PlotError, StackedPlot};

const WIDTH: u32 = 1000;
const PANEL_HEIGHT: u32 = 110;
const TITLE_HEIGHT: u32 = 40;
const X_AXIS_HEIGHT: u32 = 45;
const Y_MARGIN: f64 = 0.2;
const FONT: &str = "sans-serif";

/// `name` + `ext`, adding the leading dot when `ext` lacks one.
pub fn image_path(name: &str, ext: &str) -> PathBuf {
    if ext.starts_with('.') {
        PathBuf::from(format!("{name}{ext}"))
    } else {
        PathBuf::from(format!("{name}.{ext}"))
    }
}

/// Save `plot` as `name` + `ext` (e.g. `.png`) and return the written path.
pub fn save_plot(plot: &StackedPlot, name: &str, ext: &str) -> Result<PathBuf, PlotError> {
    let path = image_path(name, ext);
    render_to_file(plot, &path)?;
    log::info!("Plot image saved to '{}'", path.display());
    Ok(path)
}

/// Render `plot` to `path`; the image format follows the extension.
pub fn render_to_file(plot: &StackedPlot, path: &Path) -> Result<(), PlotError> {
    if plot.series.is_empty() {
        return Err(PlotError::NoSeries);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(render_err)?;
    }

    let n = plot.series.len();
    let height = TITLE_HEIGHT + X_AXIS_HEIGHT + PANEL_HEIGHT * n as u32;
    let root = BitMapBackend::new(path, (WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let body = root
        .titled(&plot.title, (FONT, 22))
        .map_err(render_err)?;

    let panels = body.split_evenly((n, 1));

    let (x0, x1) = plot.x_range();
    for (i, (area, series)) in panels.iter().zip(&plot.series).enumerate() {
        let last = i + 1 == n;
        let (y0, y1) = padded_range(&series.values, Y_MARGIN);
        let color = series.color.to_plotters();

        let mut chart = ChartBuilder::on(area)
            .margin_left(10)
            .margin_right(20)
            .x_label_area_size(if last { X_AXIS_HEIGHT } else { 0 })
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(render_err)?;

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .y_labels(4)
            .label_style((FONT, 12));
        if last {
            mesh.x_desc(plot.xlabel.as_str());
        } else {
            mesh.x_labels(0);
        }
        mesh.draw().map_err(render_err)?;

        for (k, segment) in finite_segments(&plot.timestamps, &series.values)
            .into_iter()
            .enumerate()
        {
            let drawn = chart
                .draw_series(LineSeries::new(segment, color.stroke_width(1)))
                .map_err(render_err)?;
            if k == 0 {
                drawn
                    .label(series.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 12))
            .draw()
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}
