pub mod chart_panel;
pub mod config;
mod placeholders;
pub mod style;
pub mod table_panel;

use std::{sync::Arc, time::Duration};

use egui::{Align, Color32, Layout, RichText, Ui};
use egui_dropdown::DropDownBox;
use itertools::Itertools;
use log::{error, info};

use crate::{
    LapDashError,
    dashboard::{DashboardController, FetchPurpose, SessionFetcher},
    provider::JsonlSessionProvider,
    session::{DriverId, SessionType},
    writer,
};

use chart_panel::LapChartPanel;
use config::AppConfig;
use style::{Stylesheet, color};
use table_panel::LapTablePanel;

const REFRESH_RATE_MS: u64 = 100;

pub type Controller = DashboardController<LapTablePanel, LapChartPanel>;

/// `DashboardApp` is the lap time dashboard window.
///
/// Dropdown and button events update the controller's selection and queue session
/// fetches; completed fetches are rendered into the table and chart on the next frame.
pub struct DashboardApp {
    controller: Controller,
    fetcher: SessionFetcher,
    app_config: AppConfig,
    stylesheet: Stylesheet,
    year_text: String,
    race_text: String,
    session_text: String,
    driver_text: String,
    chart_driver: Option<DriverId>,
}

impl DashboardApp {
    pub fn new(
        controller: Controller,
        app_config: AppConfig,
        stylesheet: Stylesheet,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        stylesheet.apply(&cc.egui_ctx);

        let key = controller.selection().key.clone();
        let driver_text = controller
            .selection()
            .driver
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default();

        let mut app = Self {
            controller,
            fetcher: SessionFetcher::default(),
            app_config,
            stylesheet,
            year_text: key.year.to_string(),
            race_text: key.race.clone(),
            session_text: key.session_type.to_string(),
            driver_text,
            chart_driver: None,
        };
        if let Some(driver) = app.controller.selection().driver.clone() {
            app.request(FetchPurpose::LapTable(driver));
        }
        app
    }

    fn request(&mut self, purpose: FetchPurpose) {
        self.fetcher.request(
            self.controller.provider(),
            self.controller.selection().key.clone(),
            purpose,
        );
    }

    fn process_fetches(&mut self) {
        for outcome in self.fetcher.poll() {
            let is_drivers = outcome.purpose == FetchPurpose::Drivers;
            if matches!(self.controller.apply_fetch(outcome), Ok(true)) && is_drivers {
                let selected = self.controller.selection().driver.clone();
                self.driver_text = selected.as_ref().map(|d| d.to_string()).unwrap_or_default();
                if let Some(driver) = selected {
                    self.request(FetchPurpose::LapTable(driver));
                }
            }
        }
    }

    fn show_session_selectors(&mut self, ui: &mut Ui) {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.label("Year:");
            let year_response = ui.add(
                DropDownBox::from_iter(
                    self.app_config.years.iter().map(|y| y.to_string()).collect_vec(),
                    "year_dropbox",
                    &mut self.year_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
            ui.label("Race:");
            let race_response = ui.add(
                DropDownBox::from_iter(
                    &self.app_config.races,
                    "race_dropbox",
                    &mut self.race_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
            ui.label("Session:");
            ui.add(
                DropDownBox::from_iter(
                    SessionType::ALL.iter().map(|t| t.code()),
                    "session_dropbox",
                    &mut self.session_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );

            // typed values are committed when they match an option or the field loses focus
            let current = self.controller.selection().key.clone();
            let mut key_changed = false;
            match self.year_text.trim().parse::<i32>() {
                Ok(year)
                    if year != current.year
                        && (self.app_config.years.contains(&year) || year_response.lost_focus()) =>
                {
                    self.controller.select_year(year);
                    key_changed = true;
                }
                Err(e) if year_response.lost_focus() => self.controller.report_error(
                    "select year",
                    LapDashError::InvalidUserInput {
                        field: "year".to_string(),
                        reason: e.to_string(),
                    },
                ),
                _ => {}
            }

            let race = self.race_text.trim();
            if !race.is_empty()
                && !race.eq_ignore_ascii_case(&current.race)
                && (self
                    .app_config
                    .races
                    .iter()
                    .any(|r| r.eq_ignore_ascii_case(race))
                    || race_response.lost_focus())
            {
                self.controller.select_race(race);
                key_changed = true;
            }

            if let Ok(session_type) = self.session_text.parse::<SessionType>()
                && session_type != current.session_type
            {
                self.controller.select_session_type(session_type);
                key_changed = true;
            }

            if key_changed {
                // table and chart fetches in flight belong to the previous session
                self.fetcher.retire_all();
                self.request(FetchPurpose::Drivers);
            }

            ui.separator();
            if ui.button("📂 Open sessions file").clicked() {
                self.open_sessions_file();
            }
            if ui.button("💾 Export session").clicked() {
                self.export_session();
            }
        });
    }

    fn show_driver_row(&mut self, ui: &mut Ui) {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            let previous_driver = self.driver_text.clone();
            ui.label(RichText::new("Select Driver:").heading());
            ui.add(
                DropDownBox::from_iter(
                    self.controller.drivers().iter().map(|d| d.as_str()),
                    "driver_dropbox",
                    &mut self.driver_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );

            if previous_driver != self.driver_text
                && let Some(driver) = self
                    .controller
                    .drivers()
                    .iter()
                    .find(|d| d.as_str() == self.driver_text)
                    .cloned()
            {
                self.controller.select_driver(driver.clone());
                self.request(FetchPurpose::LapTable(driver));
            }

            if ui.button("Set Driver for Graph").clicked() && !self.driver_text.trim().is_empty() {
                let driver = DriverId::new(self.driver_text.trim());
                self.chart_driver = Some(driver.clone());
                self.request(FetchPurpose::LapChart(driver));
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("More Info for Track").clicked() {
                    self.controller.on_track_info_requested();
                }
            });
        });
    }

    fn show_chart_options(&mut self, ui: &mut Ui) {
        let mut options = self.controller.chart_options();
        let previous = options;
        ui.horizontal(|ui| {
            ui.checkbox(&mut options.quick_laps_only, "Quick laps only");
            ui.checkbox(&mut options.show_rolling_average, "Rolling average");
        });
        if options != previous {
            self.controller.set_chart_options(options);
            if let Some(driver) = self.chart_driver.clone() {
                self.request(FetchPurpose::LapChart(driver));
            }
        }
    }

    fn show_status_bar(&self, ui: &mut Ui) {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.label(
                RichText::new(format!(
                    "{} · {}",
                    self.controller.provider().name(),
                    self.controller.selection().key
                ))
                .small(),
            );
            if self.fetcher.is_loading() {
                ui.spinner();
            }
            if let Some(message) = self.controller.last_error() {
                ui.separator();
                ui.label(RichText::new(message).color(color(self.stylesheet.error)).small());
            }
        });
    }

    fn open_sessions_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Sessions", &["jsonl", "json"])
            .pick_file()
        else {
            return;
        };
        match JsonlSessionProvider::from_file(&path) {
            Ok(provider) => {
                self.controller.set_provider(Arc::new(provider));
                self.fetcher.retire_all();
                self.request(FetchPurpose::Drivers);
            }
            Err(e) => self.controller.report_error("open sessions file", e),
        }
    }

    fn export_session(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Sessions", &["jsonl"])
            .set_file_name("sessions.jsonl")
            .save_file()
        else {
            return;
        };
        let key = self.controller.selection().key.clone();
        let result = self
            .controller
            .provider()
            .load_session(&key)
            .and_then(|session| writer::write_sessions(&path, &[session], true));
        match result {
            Ok(()) => info!("Exported {} to {:?}", key, path),
            Err(e) => self.controller.report_error("export session", e),
        }
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.app_config.last_session = self.controller.selection().key.clone();
        self.app_config.chart_options = self.controller.chart_options();

        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_fetches();
        if let Some(inner_rect) = ctx.input(|is| is.viewport().inner_rect) {
            self.app_config.window_size = inner_rect.size().into();
        }

        egui::TopBottomPanel::top("session_selectors")
            .frame(egui::Frame::new().inner_margin(6))
            .show(ctx, |ui| {
                self.show_session_selectors(ui);
                ui.add_space(4.);
                self.show_driver_row(ui);
            });

        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::new().inner_margin(4))
            .show(ctx, |ui| self.show_status_bar(ui));

        egui::SidePanel::left("lap_times")
            .resizable(true)
            .default_width(ctx.available_rect().width() * 0.4)
            .show(ctx, |ui| {
                egui::TopBottomPanel::bottom("interval")
                    .frame(egui::Frame::new().inner_margin(4))
                    .show_inside(ui, |ui| {
                        ui.vertical_centered_justified(|ui| {
                            if ui.button("Change Interval to Distance from Leader").clicked() {
                                self.controller.on_interval_mode_toggle();
                            }
                        });
                        placeholders::interval_panel(ui);
                    });
                self.controller.table().show(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::TopBottomPanel::bottom("radio_messages")
                .resizable(true)
                .default_height(180.)
                .frame(egui::Frame::new().inner_margin(4).fill(Color32::TRANSPARENT))
                .show_inside(ui, placeholders::radio_messages_panel);
            self.show_chart_options(ui);
            self.controller.chart().show(ui);
        });

        if self.fetcher.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(REFRESH_RATE_MS));
        }
    }
}
