use eframe::egui::{self, Id, Ui, Vec2b};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};

use crate::plot::finite_segments;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Stacked plots (central panel)
// ---------------------------------------------------------------------------

const MIN_PANEL_HEIGHT: f32 = 80.0;

/// Render one plot per visible series, stacked with a shared x axis.
pub fn stacked_plots(ui: &mut Ui, state: &ViewerState) {
    let shown = state.visible_indices();
    if shown.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No channels selected");
        });
        return;
    }

    let group = Id::new("stacked_x");
    let spacing = ui.spacing().item_spacing.y;
    let height = ((ui.available_height() - spacing * shown.len() as f32)
        / shown.len() as f32)
        .max(MIN_PANEL_HEIGHT);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (k, &i) in shown.iter().enumerate() {
                let series = &state.plot.series[i];
                let last = k + 1 == shown.len();
                let color = series.color.to_egui();

                let mut plot = Plot::new(("panel", i))
                    .height(height)
                    .legend(Legend::default().position(Corner::RightTop))
                    .link_axis(group, Vec2b::new(true, false))
                    .link_cursor(group, Vec2b::new(true, false))
                    .show_axes([last, true])
                    .allow_boxed_zoom(true)
                    .allow_drag(true)
                    .allow_scroll(true)
                    .allow_zoom(true);
                if last {
                    plot = plot.x_axis_label(state.plot.xlabel.clone());
                }

                plot.show(ui, |plot_ui| {
                    for segment in finite_segments(&state.plot.timestamps, &series.values) {
                        let points: PlotPoints =
                            segment.into_iter().map(|(x, y)| [x, y]).collect();
                        plot_ui.line(
                            Line::new(points)
                                .name(&series.label)
                                .color(color)
                                .width(1.5),
                        );
                    }
                });
            }
        });
}
