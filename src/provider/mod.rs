// Session data providers
// Load sessions, drivers and lap records from a timing data source

pub mod cache;
pub mod jsonl;
pub mod openf1;

pub use cache::CachedProvider;
pub use jsonl::JsonlSessionProvider;
pub use openf1::OpenF1Provider;

use crate::{
    LapDashError,
    session::{Session, SessionKey},
};

/// Trait implemented by every source of session data
pub trait SessionProvider: Send + Sync {
    /// Load the drivers and lap records of the session identified by `key`.
    ///
    /// Returns `SessionNotFound` when the source has no session for the key.
    fn load_session(&self, key: &SessionKey) -> Result<Session, LapDashError>;

    /// Short human readable name of the source, shown in the status bar
    fn name(&self) -> String;
}
