use std::path::Path;

use crate::plot::{render, StackedPlot};

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The plot being shown.
    pub plot: StackedPlot,

    /// One flag per series; hidden series get no panel.
    pub visible: Vec<bool>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(plot: StackedPlot) -> Self {
        let visible = vec![true; plot.series.len()];
        Self {
            plot,
            visible,
            status_message: None,
        }
    }

    /// Indices of the series that currently get a panel.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, &shown)| shown.then_some(i))
            .collect()
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(flag) = self.visible.get_mut(index) {
            *flag = !*flag;
        }
    }

    pub fn show_all(&mut self) {
        self.visible.fill(true);
    }

    pub fn hide_all(&mut self) {
        self.visible.fill(false);
    }

    /// The plot restricted to the visible series.
    pub fn visible_plot(&self) -> StackedPlot {
        StackedPlot {
            title: self.plot.title.clone(),
            xlabel: self.plot.xlabel.clone(),
            timestamps: self.plot.timestamps.clone(),
            series: self
                .visible_indices()
                .into_iter()
                .map(|i| self.plot.series[i].clone())
                .collect(),
        }
    }

    /// Render the visible series to `path` and record the outcome in the
    /// status line.
    pub fn save_image(&mut self, path: &Path) {
        let name = path.with_extension("");
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());

        match render::save_plot(&self.visible_plot(), &name.to_string_lossy(), &ext) {
            Ok(written) => {
                self.status_message = Some(format!("Saved {}", written.display()));
            }
            Err(e) => {
                log::error!("Failed to save image: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
