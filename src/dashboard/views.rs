use crate::session::{DriverLaps, lap_time::format_lap_time};

pub const CHART_X_LABEL: &str = "Lap Number";
pub const CHART_Y_LABEL: &str = "Lap Time (seconds)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LapRow {
    pub lap_number: String,
    pub lap_time: String,
}

impl LapRow {
    pub fn rows_for(laps: &DriverLaps) -> Vec<LapRow> {
        laps.iter()
            .map(|l| LapRow {
                lap_number: l.lap_number.to_string(),
                lap_time: format_lap_time(l.lap_time.as_ref()),
            })
            .collect()
    }
}

/// Everything a chart surface needs to draw one driver's lap times from scratch.
#[derive(Clone, Debug, PartialEq)]
pub struct LapChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// `[lap number, lap time in seconds]`, untimed laps excluded
    pub points: Vec<[f64; 2]>,
    pub rolling_average: Option<Vec<[f64; 2]>>,
}

impl LapChart {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }
}

/// Surface showing the lap table
pub trait TableView {
    /// Replace every row of the table
    fn set_rows(&mut self, rows: Vec<LapRow>);
}

/// Surface showing the lap time chart
pub trait ChartView {
    /// Clear the chart and draw `chart`
    fn redraw(&mut self, chart: LapChart);
}
