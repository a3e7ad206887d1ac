// On-disk session cache wrapping another provider

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};

use crate::LapDashError;
use crate::session::{Session, SessionKey};

use super::SessionProvider;

static NEXT_TEMP_FILE: AtomicU64 = AtomicU64::new(0);

/// Provider that stores every loaded session as a JSON file and serves it from disk
/// on the next request for the same key.
pub struct CachedProvider<P: SessionProvider> {
    inner: P,
    cache_path: PathBuf,
}

impl<P: SessionProvider> CachedProvider<P> {
    /// Create a cache in `cache_path`, creating the directory if needed
    pub fn new(inner: P, cache_path: PathBuf) -> Result<Self, LapDashError> {
        if !cache_path.exists() {
            fs::create_dir_all(&cache_path).map_err(|e| LapDashError::CacheIOError { source: e })?;
        }

        Ok(Self { inner, cache_path })
    }

    /// Create the cache in the default application cache directory
    pub fn new_default(inner: P) -> Result<Self, LapDashError> {
        let cache_path = Self::default_cache_path()?;
        Self::new(inner, cache_path)
    }

    pub fn default_cache_path() -> Result<PathBuf, LapDashError> {
        let cache_dir = dirs::cache_dir().ok_or(LapDashError::NoConfigDir)?;
        Ok(cache_dir.join("lapdash").join("sessions"))
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    fn file_path_for_key(&self, key: &SessionKey) -> PathBuf {
        let filename = format!(
            "{}_{}_{}.json",
            key.year,
            Self::normalize_race_name(&key.race),
            key.session_type.code().to_lowercase()
        );
        self.cache_path.join(filename)
    }

    /// Normalize race name for consistent file naming
    fn normalize_race_name(race: &str) -> String {
        race.trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn load_from_file(&self, file_path: &Path) -> Result<Session, LapDashError> {
        let content =
            fs::read_to_string(file_path).map_err(|e| LapDashError::CacheIOError { source: e })?;
        serde_json::from_str(&content).map_err(|e| LapDashError::CacheSerializeError { source: e })
    }

    /// Writes to a temporary file next to the cache entry and renames it into place,
    /// so concurrent readers never see a partially written session.
    fn save_to_file(&self, session: &Session) -> Result<(), LapDashError> {
        let file_path = self.file_path_for_key(&session.key);
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| LapDashError::CacheSerializeError { source: e })?;

        let temp_path = file_path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            NEXT_TEMP_FILE.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp_path, content).map_err(|e| LapDashError::CacheIOError { source: e })?;
        fs::rename(&temp_path, &file_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LapDashError::CacheIOError { source: e }
        })
    }

    /// Delete every cached session
    pub fn clear_cache(&self) -> Result<usize, LapDashError> {
        let entries =
            fs::read_dir(&self.cache_path).map_err(|e| LapDashError::CacheIOError { source: e })?;
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).map_err(|e| LapDashError::CacheIOError { source: e })?;
                removed += 1;
            }
        }
        info!("Removed {} cached sessions from {:?}", removed, self.cache_path);
        Ok(removed)
    }
}

impl<P: SessionProvider> SessionProvider for CachedProvider<P> {
    fn load_session(&self, key: &SessionKey) -> Result<Session, LapDashError> {
        let file_path = self.file_path_for_key(key);
        if file_path.exists() {
            match self.load_from_file(&file_path) {
                Ok(session) if session.key.matches(key) => {
                    debug!("Loaded {} from cache {:?}", key, file_path);
                    return Ok(session);
                }
                Ok(session) => {
                    warn!(
                        "Cache file {:?} holds {} instead of {}, refetching",
                        file_path, session.key, key
                    );
                }
                Err(e) => {
                    warn!("Discarding unreadable cache file {:?}: {}", file_path, e);
                    if let Err(e) = fs::remove_file(&file_path) {
                        warn!("Could not remove cache file {:?}: {}", file_path, e);
                    }
                }
            }
        }

        let session = self.inner.load_session(key)?;
        if let Err(e) = self.save_to_file(&session) {
            warn!("Could not cache {}: {}", key, e);
        }
        Ok(session)
    }

    fn name(&self) -> String {
        format!("{} (cached)", self.inner.name())
    }
}
