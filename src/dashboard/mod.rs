pub mod chart;
pub mod fetcher;
pub mod views;

use std::sync::Arc;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::{
    LapDashError,
    provider::SessionProvider,
    session::{DriverId, Session, SessionKey, SessionType},
};

pub use chart::{ChartOptions, build_lap_chart};
pub use fetcher::{FetchOutcome, FetchPurpose, SessionFetcher};
pub use views::{ChartView, LapChart, LapRow, TableView};

/// Dashboard features that are accepted but not built
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubFeature {
    IntervalToLeader,
    TrackInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubResponse {
    NotImplemented(StubFeature),
}

/// The session and driver currently picked in the dashboard
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub key: SessionKey,
    pub driver: Option<DriverId>,
}

/// Wires dashboard selections to the session provider and pushes results into the
/// table and chart views.
///
/// A failed operation is logged and remembered as the last error, the views keep
/// showing the last successful render.
pub struct DashboardController<T: TableView, C: ChartView> {
    provider: Arc<dyn SessionProvider>,
    table: T,
    chart: C,
    selection: SelectionState,
    drivers: Vec<DriverId>,
    chart_options: ChartOptions,
    last_error: Option<String>,
}

impl<T: TableView, C: ChartView> DashboardController<T, C> {
    pub fn new(provider: Arc<dyn SessionProvider>, table: T, chart: C, selection: SelectionState) -> Self {
        Self {
            provider,
            table,
            chart,
            selection,
            drivers: Vec::new(),
            chart_options: ChartOptions::default(),
            last_error: None,
        }
    }

    pub fn provider(&self) -> Arc<dyn SessionProvider> {
        self.provider.clone()
    }

    /// Swap the data source. The driver list belongs to the old source and is cleared.
    pub fn set_provider(&mut self, provider: Arc<dyn SessionProvider>) {
        info!("Switching session provider to {}", provider.name());
        self.provider = provider;
        self.drivers.clear();
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn drivers(&self) -> &[DriverId] {
        &self.drivers
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn chart_options(&self) -> ChartOptions {
        self.chart_options
    }

    pub fn set_chart_options(&mut self, options: ChartOptions) {
        self.chart_options = options;
    }

    pub fn select_year(&mut self, year: i32) {
        if self.selection.key.year != year {
            self.selection.key.year = year;
            self.drivers.clear();
        }
    }

    pub fn select_race(&mut self, race: &str) {
        if self.selection.key.race != race {
            self.selection.key.race = race.to_string();
            self.drivers.clear();
        }
    }

    pub fn select_session_type(&mut self, session_type: SessionType) {
        if self.selection.key.session_type != session_type {
            self.selection.key.session_type = session_type;
            self.drivers.clear();
        }
    }

    pub fn select_driver(&mut self, driver: DriverId) {
        self.selection.driver = Some(driver);
    }

    fn load_current_session(&self) -> Result<Session, LapDashError> {
        self.provider.load_session(&self.selection.key)
    }

    /// Load the selected session and fill the driver selector
    pub fn initialize(&mut self) -> Result<&[DriverId], LapDashError> {
        let result = self.load_current_session().map(|s| self.show_drivers(&s));
        self.track("load drivers", result)?;
        Ok(&self.drivers)
    }

    pub fn render_lap_table(&mut self, driver: &DriverId) -> Result<(), LapDashError> {
        let result = self
            .load_current_session()
            .and_then(|s| self.show_lap_table(&s, driver));
        self.track("render lap table", result)
    }

    pub fn render_lap_chart(&mut self, driver: &DriverId) -> Result<(), LapDashError> {
        let result = self
            .load_current_session()
            .and_then(|s| self.show_lap_chart(&s, driver));
        self.track("render lap chart", result)
    }

    pub fn present_drivers(&mut self, session: &Session) {
        self.show_drivers(session);
        self.last_error = None;
    }

    pub fn present_lap_table(&mut self, session: &Session, driver: &DriverId) -> Result<(), LapDashError> {
        let result = self.show_lap_table(session, driver);
        self.track("render lap table", result)
    }

    pub fn present_lap_chart(&mut self, session: &Session, driver: &DriverId) -> Result<(), LapDashError> {
        let result = self.show_lap_chart(session, driver);
        self.track("render lap chart", result)
    }

    /// Render a completed background fetch into the view it was requested for.
    ///
    /// Returns `Ok(false)` without touching any view when the fetch was made for a
    /// session other than the one currently selected.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> Result<bool, LapDashError> {
        if !outcome.key.matches(&self.selection.key) {
            debug!(
                "Dropping fetch {} for {}, selection is now {}",
                outcome.ticket, outcome.key, self.selection.key
            );
            return Ok(false);
        }
        let session = match outcome.result {
            Ok(session) => session,
            Err(e) => return self.track(&format!("load {}", outcome.key), Err(e)),
        };
        match &outcome.purpose {
            FetchPurpose::Drivers => self.present_drivers(&session),
            FetchPurpose::LapTable(driver) => self.present_lap_table(&session, driver)?,
            FetchPurpose::LapChart(driver) => self.present_lap_chart(&session, driver)?,
        }
        Ok(true)
    }

    /// Record a failure of a dashboard action that does not go through the controller
    pub fn report_error(&mut self, operation: &str, error: LapDashError) {
        error!("Could not {}: {}", operation, error);
        self.last_error = Some(error.to_string());
    }

    pub fn on_interval_mode_toggle(&self) -> StubResponse {
        info!("Changing interval to distance from leader is not implemented");
        StubResponse::NotImplemented(StubFeature::IntervalToLeader)
    }

    pub fn on_track_info_requested(&self) -> StubResponse {
        info!("Showing more info for the track is not implemented");
        StubResponse::NotImplemented(StubFeature::TrackInfo)
    }

    fn show_drivers(&mut self, session: &Session) {
        self.drivers = session.drivers.clone();
        let keep_driver = self
            .selection
            .driver
            .as_ref()
            .is_some_and(|d| self.drivers.contains(d));
        if !keep_driver {
            self.selection.driver = self.drivers.first().cloned();
        }
        info!("{} has {} drivers", session.key, self.drivers.len());
    }

    fn show_lap_table(&mut self, session: &Session, driver: &DriverId) -> Result<(), LapDashError> {
        let laps = session.pick_driver(driver)?;
        self.table.set_rows(LapRow::rows_for(&laps));
        Ok(())
    }

    fn show_lap_chart(&mut self, session: &Session, driver: &DriverId) -> Result<(), LapDashError> {
        let laps = session.pick_driver(driver)?;
        self.chart
            .redraw(build_lap_chart(driver, &laps, self.chart_options));
        Ok(())
    }

    fn track<R>(&mut self, operation: &str, result: Result<R, LapDashError>) -> Result<R, LapDashError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                error!("Could not {}: {}", operation, e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::monza_session;

    #[derive(Default)]
    struct RecordingTable {
        rows: Vec<LapRow>,
        updates: usize,
    }

    impl TableView for RecordingTable {
        fn set_rows(&mut self, rows: Vec<LapRow>) {
            self.rows = rows;
            self.updates += 1;
        }
    }

    #[derive(Default)]
    struct RecordingChart {
        chart: Option<LapChart>,
        redraws: usize,
    }

    impl ChartView for RecordingChart {
        fn redraw(&mut self, chart: LapChart) {
            self.chart = Some(chart);
            self.redraws += 1;
        }
    }

    struct StaticProvider(Session);

    impl SessionProvider for StaticProvider {
        fn load_session(&self, key: &SessionKey) -> Result<Session, LapDashError> {
            if self.0.key.matches(key) {
                Ok(self.0.clone())
            } else {
                Err(LapDashError::SessionNotFound { key: key.to_string() })
            }
        }

        fn name(&self) -> String {
            "static".to_string()
        }
    }

    fn controller() -> DashboardController<RecordingTable, RecordingChart> {
        DashboardController::new(
            Arc::new(StaticProvider(monza_session())),
            RecordingTable::default(),
            RecordingChart::default(),
            SelectionState::default(),
        )
    }

    fn row(lap_number: &str, lap_time: &str) -> LapRow {
        LapRow {
            lap_number: lap_number.to_string(),
            lap_time: lap_time.to_string(),
        }
    }

    #[test]
    fn test_initialize_populates_drivers() {
        let mut controller = controller();
        let drivers = controller.initialize().unwrap().to_vec();
        assert_eq!(drivers, monza_session().drivers);
        assert_eq!(controller.selection().driver, Some(DriverId::from("VER")));
    }

    #[test]
    fn test_initialize_propagates_provider_errors() {
        let mut controller = controller();
        controller.select_year(2019);
        assert!(matches!(
            controller.initialize(),
            Err(LapDashError::SessionNotFound { .. })
        ));
        assert!(controller.drivers().is_empty());
        assert!(controller.last_error().is_some());
    }

    #[test]
    fn test_render_lap_table() {
        let mut controller = controller();
        controller.render_lap_table(&DriverId::from("VER")).unwrap();
        assert_eq!(
            controller.table().rows,
            vec![row("1", "92.5"), row("2", "91.8"), row("3", "N/A")]
        );
    }

    #[test]
    fn test_render_lap_table_for_driver_without_laps_clears_rows() {
        let mut controller = controller();
        controller.render_lap_table(&DriverId::from("VER")).unwrap();
        controller.render_lap_table(&DriverId::from("SAI")).unwrap();
        assert!(controller.table().rows.is_empty());
        assert_eq!(controller.table().updates, 2);
    }

    #[test]
    fn test_render_lap_chart() {
        let mut controller = controller();
        controller.render_lap_chart(&DriverId::from("VER")).unwrap();
        let chart = controller.chart().chart.clone().unwrap();
        assert_eq!(chart.xs(), vec![1.0, 2.0]);
        assert_eq!(chart.ys(), vec![92.5, 91.8]);
        assert_eq!(chart.title, "Lap Times for VER");
    }

    #[test]
    fn test_render_chart_for_other_driver_replaces_contents() {
        let mut controller = controller();
        controller.render_lap_chart(&DriverId::from("VER")).unwrap();
        controller.render_lap_chart(&DriverId::from("PER")).unwrap();
        let chart = controller.chart().chart.clone().unwrap();
        assert_eq!(chart.points, vec![[1.0, 93.1]]);
        assert_eq!(chart.title, "Lap Times for PER");
    }

    #[test]
    fn test_unknown_driver_keeps_previous_render() {
        let mut controller = controller();
        controller.render_lap_table(&DriverId::from("VER")).unwrap();
        controller.render_lap_chart(&DriverId::from("VER")).unwrap();

        let table_result = controller.render_lap_table(&DriverId::from("HAM"));
        let chart_result = controller.render_lap_chart(&DriverId::from("HAM"));

        assert!(matches!(table_result, Err(LapDashError::DriverNotFound { .. })));
        assert!(matches!(chart_result, Err(LapDashError::DriverNotFound { .. })));
        assert_eq!(controller.table().updates, 1);
        assert_eq!(controller.chart().redraws, 1);
        assert_eq!(controller.table().rows.len(), 3);
        assert_eq!(
            controller.last_error(),
            Some("Driver HAM not found in session 2023 Monza R")
        );

        controller.render_lap_table(&DriverId::from("PER")).unwrap();
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_fetches_use_selected_session() {
        let mut controller = controller();
        controller.select_session_type(SessionType::Q);
        assert!(matches!(
            controller.render_lap_table(&DriverId::from("VER")),
            Err(LapDashError::SessionNotFound { key }) if key == "2023 Monza Q"
        ));
    }

    #[test]
    fn test_changing_session_clears_driver_list() {
        let mut controller = controller();
        controller.initialize().unwrap();
        controller.select_race("Monza");
        assert_eq!(controller.drivers().len(), 3);
        controller.select_race("Spa");
        assert!(controller.drivers().is_empty());
    }

    #[test]
    fn test_stubs_have_no_effect() {
        let mut controller = controller();
        controller.initialize().unwrap();
        controller.render_lap_table(&DriverId::from("VER")).unwrap();
        let selection = controller.selection().clone();

        assert_eq!(
            controller.on_interval_mode_toggle(),
            StubResponse::NotImplemented(StubFeature::IntervalToLeader)
        );
        assert_eq!(
            controller.on_track_info_requested(),
            StubResponse::NotImplemented(StubFeature::TrackInfo)
        );
        assert_eq!(controller.selection(), &selection);
        assert_eq!(controller.table().updates, 1);
        assert_eq!(controller.chart().redraws, 0);
    }

    #[test]
    fn test_apply_fetch_routes_to_view() {
        let mut controller = controller();
        let session = Arc::new(monza_session());
        controller
            .apply_fetch(FetchOutcome {
                ticket: 1,
                key: SessionKey::default(),
                purpose: FetchPurpose::LapChart(DriverId::from("VER")),
                result: Ok(session.clone()),
            })
            .unwrap();
        assert_eq!(controller.chart().redraws, 1);
        assert_eq!(controller.table().updates, 0);

        let failed = controller.apply_fetch(FetchOutcome {
            ticket: 2,
            key: SessionKey::default(),
            purpose: FetchPurpose::LapTable(DriverId::from("VER")),
            result: Err(LapDashError::SessionNotFound {
                key: "2023 Monza R".to_string(),
            }),
        });
        assert!(failed.is_err());
        assert_eq!(controller.table().updates, 0);
        assert_eq!(controller.last_error(), Some("Session not found: 2023 Monza R"));
    }

    #[test]
    fn test_report_error_is_cleared_by_next_success() {
        let mut controller = controller();
        controller.report_error(
            "select year",
            LapDashError::InvalidUserInput {
                field: "year".to_string(),
                reason: "invalid digit found in string".to_string(),
            },
        );
        assert_eq!(
            controller.last_error(),
            Some("Invalid user input: year - invalid digit found in string")
        );

        controller.render_lap_table(&DriverId::from("VER")).unwrap();
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_apply_fetch_drops_outcomes_for_previous_selection() {
        let mut controller = controller();
        controller.select_race("Spa");
        controller.select_session_type(SessionType::Q);

        let applied = controller
            .apply_fetch(FetchOutcome {
                ticket: 3,
                key: SessionKey::default(),
                purpose: FetchPurpose::LapTable(DriverId::from("VER")),
                result: Ok(Arc::new(monza_session())),
            })
            .unwrap();

        assert!(!applied);
        assert_eq!(controller.table().updates, 0);
        assert!(controller.table().rows.is_empty());

        let failed = controller.apply_fetch(FetchOutcome {
            ticket: 4,
            key: SessionKey::default(),
            purpose: FetchPurpose::Drivers,
            result: Err(LapDashError::SessionNotFound {
                key: "2023 Monza R".to_string(),
            }),
        });
        assert!(matches!(failed, Ok(false)));
        assert!(controller.last_error().is_none());
        assert!(controller.drivers().is_empty());
    }
}
