use std::{collections::HashMap, time::Duration};

use itertools::Itertools;
use log::{debug, info, warn};
use reqwest::{StatusCode, blocking::Client};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    LapDashError,
    session::{DriverId, LapRecord, Laps, Session, SessionKey, SessionLap, SessionType},
};

use super::SessionProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";
pub const DEFAULT_TIMEOUT_S: u64 = 30;

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct SessionEntry {
    pub session_key: u32,
    pub session_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub circuit_short_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub meeting_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct DriverEntry {
    pub driver_number: u32,
    #[serde(default)]
    pub name_acronym: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct LapEntry {
    pub driver_number: u32,
    pub lap_number: u32,
    #[serde(default)]
    pub lap_duration: Option<f64>,
}

/// Name OpenF1 uses for each session type
pub(crate) fn session_name(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::FP1 => "Practice 1",
        SessionType::FP2 => "Practice 2",
        SessionType::FP3 => "Practice 3",
        SessionType::Q => "Qualifying",
        SessionType::R => "Race",
    }
}

fn race_matches(entry: &SessionEntry, race: &str) -> bool {
    let race = race.trim().to_lowercase();
    [
        &entry.location,
        &entry.circuit_short_name,
        &entry.country_name,
        &entry.meeting_name,
    ]
    .into_iter()
    .flatten()
    .any(|name| {
        let name = name.to_lowercase();
        name == race
            || name
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == race)
    })
}

/// Picks the OpenF1 session matching the key out of all sessions of the year
pub(crate) fn find_session<'a>(
    sessions: &'a [SessionEntry],
    key: &SessionKey,
) -> Option<&'a SessionEntry> {
    let wanted = session_name(key.session_type);
    sessions
        .iter()
        .filter(|s| s.session_name == wanted)
        .find(|s| race_matches(s, &key.race))
}

/// Builds a session out of the OpenF1 driver and lap listings.
/// Drivers keep the order of the listing, identified by their acronym.
pub(crate) fn build_session(key: &SessionKey, drivers: Vec<DriverEntry>, laps: Vec<LapEntry>) -> Session {
    let acronyms: HashMap<u32, DriverId> = drivers
        .iter()
        .unique_by(|d| d.driver_number)
        .map(|d| {
            let id = d
                .name_acronym
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| d.driver_number.to_string());
            (d.driver_number, DriverId::new(id))
        })
        .collect();

    let driver_ids = drivers
        .iter()
        .unique_by(|d| d.driver_number)
        .filter_map(|d| acronyms.get(&d.driver_number).cloned())
        .collect_vec();

    let session_laps = laps
        .into_iter()
        .filter_map(|l| match acronyms.get(&l.driver_number) {
            Some(driver) => Some(SessionLap {
                driver: driver.clone(),
                record: LapRecord::new(l.lap_number, l.lap_duration),
            }),
            None => {
                warn!(
                    "Skipping lap {} of unknown driver number {}",
                    l.lap_number, l.driver_number
                );
                None
            }
        })
        .collect_vec();

    Session::new(key.clone(), driver_ids, Laps::new(session_laps))
}

/// Session provider backed by the OpenF1 REST API
pub struct OpenF1Provider {
    client: Client,
    base_url: String,
}

impl OpenF1Provider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LapDashError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LapDashError::ProviderRequest {
                url: base_url.to_string(),
                source: e,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches a listing. OpenF1 answers 404 when a query has no results.
    fn fetch<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Vec<T>, LapDashError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| LapDashError::ProviderRequest {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(LapDashError::ProviderResponse {
                url,
                status: status.as_u16(),
            });
        }
        response
            .json::<Vec<T>>()
            .map_err(|e| LapDashError::ProviderRequest { url, source: e })
    }
}

impl SessionProvider for OpenF1Provider {
    fn load_session(&self, key: &SessionKey) -> Result<Session, LapDashError> {
        let sessions: Vec<SessionEntry> = self.fetch("sessions", &[("year", key.year.to_string())])?;
        let entry = find_session(&sessions, key).ok_or_else(|| LapDashError::SessionNotFound {
            key: key.to_string(),
        })?;

        let session_key = entry.session_key.to_string();
        let drivers: Vec<DriverEntry> = self.fetch("drivers", &[("session_key", session_key.clone())])?;
        let laps: Vec<LapEntry> = self.fetch("laps", &[("session_key", session_key)])?;

        let session = build_session(key, drivers, laps);
        info!(
            "Loaded {} from OpenF1 session {}: {} drivers, {} laps",
            key,
            entry.session_key,
            session.drivers.len(),
            session.laps.len()
        );
        Ok(session)
    }

    fn name(&self) -> String {
        format!("OpenF1 ({})", self.base_url)
    }
}
