use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lapdash::dashboard::{ChartOptions, LapRow, build_lap_chart};
use lapdash::session::{DriverId, LapRecord, Laps, Session, SessionKey, SessionLap};
use std::time::Duration;

const DRIVERS: [&str; 20] = [
    "VER", "PER", "LEC", "SAI", "HAM", "RUS", "NOR", "PIA", "ALO", "STR", "GAS", "OCO", "ALB",
    "SAR", "TSU", "RIC", "BOT", "ZHO", "HUL", "MAG",
];

fn create_race(laps_per_driver: u32) -> Session {
    let mut laps = Vec::new();
    // laps arrive grouped by lap number, as the timing feed reports them
    for lap_number in (1..=laps_per_driver).rev() {
        for (i, driver) in DRIVERS.iter().enumerate() {
            let lap_time_s = if lap_number % 17 == 0 {
                None
            } else {
                Some(90.0 + i as f64 * 0.1 + (lap_number % 7) as f64 * 0.35)
            };
            laps.push(SessionLap {
                driver: DriverId::from(*driver),
                record: LapRecord::new(lap_number, lap_time_s),
            });
        }
    }
    Session::new(
        SessionKey::default(),
        DRIVERS.iter().map(|d| DriverId::from(*d)).collect(),
        Laps::new(laps),
    )
}

fn bench_pick_driver(c: &mut Criterion) {
    let mut group = c.benchmark_group("lap_selection");
    group.measurement_time(Duration::from_secs(5));

    let session = create_race(70);
    let driver = DriverId::from("LEC");

    group.bench_function("pick_driver_70_laps", |b| {
        b.iter(|| black_box(session.pick_driver(&driver)));
    });

    group.bench_function("lap_rows_70_laps", |b| {
        let laps = session.pick_driver(&driver).unwrap();
        b.iter(|| black_box(LapRow::rows_for(&laps)));
    });

    group.finish();
}

fn bench_chart_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_series");

    let session = create_race(70);
    let driver = DriverId::from("VER");
    let laps = session.pick_driver(&driver).unwrap();

    group.bench_function("plain", |b| {
        b.iter(|| black_box(build_lap_chart(&driver, &laps, ChartOptions::default())));
    });

    group.bench_function("quick_laps_with_rolling_average", |b| {
        let options = ChartOptions {
            quick_laps_only: true,
            show_rolling_average: true,
        };
        b.iter(|| black_box(build_lap_chart(&driver, &laps, options)));
    });

    group.finish();
}

criterion_group!(benches, bench_pick_driver, bench_chart_series);
criterion_main!(benches);
