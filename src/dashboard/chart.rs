use serde::{Deserialize, Serialize};
use simple_moving_average::{SMA, SumTreeSMA};

use super::views::{CHART_X_LABEL, CHART_Y_LABEL, LapChart};
use crate::session::{DriverId, DriverLaps, QUICKLAP_THRESHOLD};

pub const ROLLING_AVERAGE_LAPS: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub quick_laps_only: bool,
    pub show_rolling_average: bool,
}

pub fn chart_title(driver: &DriverId) -> String {
    format!("Lap Times for {}", driver)
}

pub fn build_lap_chart(driver: &DriverId, laps: &DriverLaps, options: ChartOptions) -> LapChart {
    let laps = if options.quick_laps_only {
        laps.pick_quicklaps(QUICKLAP_THRESHOLD)
    } else {
        laps.clone()
    };

    let points: Vec<[f64; 2]> = laps
        .iter()
        .filter_map(|l| l.lap_time_s().map(|s| [l.lap_number as f64, s]))
        .collect();

    let rolling_average = options
        .show_rolling_average
        .then(|| rolling_average(&points));

    LapChart {
        title: chart_title(driver),
        x_label: CHART_X_LABEL,
        y_label: CHART_Y_LABEL,
        points,
        rolling_average,
    }
}

/// Mean of the last `ROLLING_AVERAGE_LAPS` plotted laps, starting once the window is full
fn rolling_average(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut window: SumTreeSMA<f64, f64, ROLLING_AVERAGE_LAPS> = SumTreeSMA::new();
    let mut averages = Vec::new();
    for point in points {
        window.add_sample(point[1]);
        if window.get_num_samples() == ROLLING_AVERAGE_LAPS {
            averages.push([point[0], window.get_average()]);
        }
    }
    averages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Laps, tests::lap};
    use proptest::prelude::*;

    fn ver_laps(times: &[Option<f64>]) -> DriverLaps {
        Laps::new(
            times
                .iter()
                .enumerate()
                .map(|(i, t)| lap("VER", i as u32 + 1, *t))
                .collect(),
        )
        .pick_driver(&DriverId::from("VER"))
    }

    #[test]
    fn test_untimed_laps_are_not_plotted() {
        let laps = ver_laps(&[Some(92.5), Some(91.8), None]);
        let chart = build_lap_chart(&DriverId::from("VER"), &laps, ChartOptions::default());

        assert_eq!(chart.xs(), vec![1.0, 2.0]);
        assert_eq!(chart.ys(), vec![92.5, 91.8]);
        assert_eq!(chart.title, "Lap Times for VER");
        assert_eq!(chart.x_label, "Lap Number");
        assert_eq!(chart.y_label, "Lap Time (seconds)");
        assert!(chart.rolling_average.is_none());
    }

    #[test]
    fn test_quick_laps_only() {
        let laps = ver_laps(&[Some(120.0), Some(90.0), Some(91.0), None]);
        let options = ChartOptions {
            quick_laps_only: true,
            ..Default::default()
        };
        let chart = build_lap_chart(&DriverId::from("VER"), &laps, options);
        assert_eq!(chart.xs(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_rolling_average_starts_with_full_window() {
        let laps = ver_laps(&[
            Some(90.0),
            Some(91.0),
            None,
            Some(92.0),
            Some(93.0),
            Some(94.0),
            Some(100.0),
        ]);
        let options = ChartOptions {
            show_rolling_average: true,
            ..Default::default()
        };
        let chart = build_lap_chart(&DriverId::from("VER"), &laps, options);
        let averages = chart.rolling_average.unwrap();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0][0], 6.0);
        assert!((averages[0][1] - 92.0).abs() < 1e-9);
        assert_eq!(averages[1][0], 7.0);
        assert!((averages[1][1] - 94.0).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_chart_has_one_point_per_timed_lap(
            times in proptest::collection::vec(proptest::option::of(60.0f64..150.0), 0..70),
        ) {
            let laps = ver_laps(&times);
            let chart = build_lap_chart(&DriverId::from("VER"), &laps, ChartOptions::default());
            let timed = times.iter().filter(|t| t.is_some()).count();
            prop_assert_eq!(chart.points.len(), timed);
            for (i, t) in times.iter().enumerate() {
                let plotted = chart.points.iter().any(|p| p[0] == (i + 1) as f64);
                prop_assert_eq!(plotted, t.is_some());
            }
        }
    }
}
