use egui::{Color32, Direction, Layout, RichText, Ui};
use egui_plot::{Legend, Line, PlotPoints, Points};

use crate::dashboard::{ChartView, LapChart};

use super::style::{Stylesheet, color};

/// Lap time chart of the driver picked for the graph
pub struct LapChartPanel {
    chart: Option<LapChart>,
    // bumped on every redraw so the plot starts from fresh bounds
    generation: u64,
    line_color: Color32,
    average_color: Color32,
    marker_radius: f32,
}

impl LapChartPanel {
    pub fn new(stylesheet: &Stylesheet) -> Self {
        Self {
            chart: None,
            generation: 0,
            line_color: color(stylesheet.accent),
            average_color: Color32::LIGHT_GRAY,
            marker_radius: stylesheet.marker_radius,
        }
    }

    pub fn chart(&self) -> Option<&LapChart> {
        self.chart.as_ref()
    }

    pub fn show(&self, ui: &mut Ui) {
        let Some(chart) = &self.chart else {
            ui.with_layout(Layout::centered_and_justified(Direction::TopDown), |ui| {
                ui.label(RichText::new("Pick a driver and press \"Set Driver for Graph\"").weak());
            });
            return;
        };

        ui.vertical_centered(|ui| {
            ui.heading(chart.title.as_str());
        });

        egui_plot::Plot::new(("lap_times", self.generation))
            .legend(Legend::default())
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .show_background(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(chart.title.clone(), PlotPoints::new(chart.points.clone()))
                        .color(self.line_color),
                );
                plot_ui.points(
                    Points::new("Laps", PlotPoints::new(chart.points.clone()))
                        .color(self.line_color)
                        .radius(self.marker_radius),
                );
                if let Some(average) = &chart.rolling_average {
                    plot_ui.line(
                        Line::new("Rolling average", PlotPoints::new(average.clone()))
                            .color(self.average_color),
                    );
                }
            });
    }
}

impl ChartView for LapChartPanel {
    fn redraw(&mut self, chart: LapChart) {
        self.chart = Some(chart);
        self.generation += 1;
    }
}
