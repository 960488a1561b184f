use anyhow::anyhow;
use eframe::egui;

use crate::plot::StackedPlot;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WaveViewerApp {
    pub state: ViewerState,
}

impl WaveViewerApp {
    pub fn new(plot: StackedPlot) -> Self {
        Self {
            state: ViewerState::new(plot),
        }
    }
}

impl eframe::App for WaveViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: channel toggles ----
        egui::SidePanel::left("channel_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: stacked plots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::stacked_plots(ui, &self.state);
        });
    }
}

/// Open the viewer and block until its window is closed.
pub fn show(plot: StackedPlot) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = format!("Wavesum – {}", plot.title);
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(WaveViewerApp::new(plot)))),
    )
    .map_err(|e| anyhow!("Viewer failed: {e}"))
}
