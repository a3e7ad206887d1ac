use egui::{Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::dashboard::{LapRow, TableView};

/// Lap table of the selected driver
pub struct LapTablePanel {
    rows: Vec<LapRow>,
    row_height: f32,
}

impl LapTablePanel {
    pub fn new(row_height: f32) -> Self {
        Self {
            rows: Vec::new(),
            row_height,
        }
    }

    pub fn rows(&self) -> &[LapRow] {
        &self.rows
    }

    pub fn show(&self, ui: &mut Ui) {
        if self.rows.is_empty() {
            ui.with_layout(Layout::centered_and_justified(egui::Direction::TopDown), |ui| {
                ui.label(RichText::new("No laps to show").weak());
            });
            return;
        }

        TableBuilder::new(ui)
            .id_salt("lap_table")
            .striped(true)
            .resizable(false)
            .cell_layout(Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(120.))
            .column(Column::remainder())
            .header(self.row_height, |mut header| {
                header.col(|ui| {
                    ui.strong("Lap Number");
                });
                header.col(|ui| {
                    ui.strong("Lap Time");
                });
            })
            .body(|body| {
                body.rows(self.row_height, self.rows.len(), |mut row| {
                    let lap = &self.rows[row.index()];
                    row.col(|ui| {
                        ui.label(lap.lap_number.as_str());
                    });
                    row.col(|ui| {
                        ui.label(lap.lap_time.as_str());
                    });
                });
            });
    }
}

impl TableView for LapTablePanel {
    fn set_rows(&mut self, rows: Vec<LapRow>) {
        self.rows = rows;
    }
}
