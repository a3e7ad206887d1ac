use std::path::{Path, PathBuf};

use log::info;

use super::SessionProvider;
use crate::{
    LapDashError,
    session::{Session, SessionKey},
};

/// Offline provider serving sessions from a JSON lines file, one session per line.
pub struct JsonlSessionProvider {
    source_file: PathBuf,
    sessions: Vec<Session>,
}

impl JsonlSessionProvider {
    pub fn from_file(source_file: &Path) -> Result<Self, LapDashError> {
        if !source_file.exists() {
            return Err(LapDashError::InvalidSessionFile {
                path: format!("{:?}", source_file),
            });
        }

        let sessions = serde_jsonlines::json_lines(source_file)
            .map_err(|e| LapDashError::SessionLoaderError { source: e })?
            .collect::<Result<Vec<Session>, std::io::Error>>()
            .map_err(|e| LapDashError::SessionLoaderError { source: e })?;

        info!(
            "Loaded {:?}, found {} sessions with a total of {} laps",
            source_file,
            sessions.len(),
            sessions.iter().map(|s| s.laps.len()).sum::<usize>()
        );
        Ok(Self {
            source_file: source_file.to_path_buf(),
            sessions,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &SessionKey> {
        self.sessions.iter().map(|s| &s.key)
    }
}

impl SessionProvider for JsonlSessionProvider {
    fn load_session(&self, key: &SessionKey) -> Result<Session, LapDashError> {
        self.sessions
            .iter()
            .find(|s| s.key.matches(key))
            .cloned()
            .ok_or_else(|| LapDashError::SessionNotFound {
                key: key.to_string(),
            })
    }

    fn name(&self) -> String {
        format!("{}", self.source_file.display())
    }
}
