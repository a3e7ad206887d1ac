pub mod lap_time;

use std::{collections::HashSet, fmt, str::FromStr};

use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};
use uom::si::f64::Time;

use crate::LapDashError;

/// Laps slower than this factor of the fastest timed lap are not quick laps.
pub const QUICKLAP_THRESHOLD: f64 = 1.07;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    FP1,
    FP2,
    FP3,
    Q,
    R,
}

impl SessionType {
    pub const ALL: [SessionType; 5] = [
        SessionType::FP1,
        SessionType::FP2,
        SessionType::FP3,
        SessionType::Q,
        SessionType::R,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SessionType::FP1 => "FP1",
            SessionType::FP2 => "FP2",
            SessionType::FP3 => "FP3",
            SessionType::Q => "Q",
            SessionType::R => "R",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionType {
    type Err = LapDashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionType::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LapDashError::InvalidUserInput {
                field: "session".to_string(),
                reason: format!("unknown session type '{}', expected one of FP1, FP2, FP3, Q, R", s),
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub year: i32,
    pub race: String,
    pub session_type: SessionType,
}

impl SessionKey {
    pub fn new(year: i32, race: impl Into<String>, session_type: SessionType) -> Self {
        Self {
            year,
            race: race.into(),
            session_type,
        }
    }

    /// Race identifiers are compared case-insensitively.
    pub fn matches(&self, other: &SessionKey) -> bool {
        self.year == other.year
            && self.session_type == other.session_type
            && self.race.trim().eq_ignore_ascii_case(other.race.trim())
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new(2023, "Monza", SessionType::R)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.race, self.session_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriverId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap_number: u32,
    /// Undefined for incomplete or untimed laps
    #[serde(default, rename = "lap_time_s", with = "lap_time::optional_seconds")]
    pub lap_time: Option<Time>,
}

impl LapRecord {
    pub fn new(lap_number: u32, lap_time_s: Option<f64>) -> Self {
        Self {
            lap_number,
            lap_time: lap_time_s
                .filter(|s| s.is_finite())
                .map(lap_time::from_seconds),
        }
    }

    pub fn lap_time_s(&self) -> Option<f64> {
        self.lap_time.as_ref().map(lap_time::to_seconds)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionLap {
    pub driver: DriverId,
    #[serde(flatten)]
    pub record: LapRecord,
}

/// Lap records of every driver in a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Laps(Vec<SessionLap>);

impl Laps {
    pub fn new(laps: Vec<SessionLap>) -> Self {
        Self(laps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionLap> {
        self.0.iter()
    }

    /// Laps of one driver ordered by lap number. Does not check the driver takes part in the session.
    pub fn pick_driver(&self, driver: &DriverId) -> DriverLaps {
        let mut seen = HashSet::new();
        let records = self
            .0
            .iter()
            .filter(|l| &l.driver == driver)
            .filter(|l| {
                if l.record.lap_number == 0 {
                    warn!("Ignoring lap 0 for driver {}", driver);
                    return false;
                }
                if !seen.insert(l.record.lap_number) {
                    warn!(
                        "Ignoring duplicate lap {} for driver {}",
                        l.record.lap_number, driver
                    );
                    return false;
                }
                true
            })
            .map(|l| l.record.clone())
            .sorted_by_key(|r| r.lap_number)
            .collect();
        DriverLaps(records)
    }
}

/// The ordered laps of a single driver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverLaps(Vec<LapRecord>);

impl DriverLaps {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LapRecord> {
        self.0.iter()
    }

    pub fn fastest_lap_s(&self) -> Option<f64> {
        self.0
            .iter()
            .filter_map(LapRecord::lap_time_s)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Keeps timed laps no slower than `threshold` times the fastest lap.
    pub fn pick_quicklaps(&self, threshold: f64) -> DriverLaps {
        let Some(fastest) = self.fastest_lap_s() else {
            return DriverLaps::default();
        };
        let cutoff = fastest * threshold;
        DriverLaps(
            self.0
                .iter()
                .filter(|r| r.lap_time_s().is_some_and(|s| s <= cutoff))
                .cloned()
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    pub drivers: Vec<DriverId>,
    pub laps: Laps,
}

impl Session {
    pub fn new(key: SessionKey, drivers: Vec<DriverId>, laps: Laps) -> Self {
        Self { key, drivers, laps }
    }

    pub fn has_driver(&self, driver: &DriverId) -> bool {
        self.drivers.contains(driver)
    }

    pub fn pick_driver(&self, driver: &DriverId) -> Result<DriverLaps, LapDashError> {
        if !self.has_driver(driver) {
            return Err(LapDashError::DriverNotFound {
                driver: driver.to_string(),
                session: self.key.to_string(),
            });
        }
        Ok(self.laps.pick_driver(driver))
    }
}
