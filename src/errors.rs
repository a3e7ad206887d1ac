// Error types for lapdash

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum LapDashError {
    // Errors returned by session data providers
    #[snafu(display("Session not found: {key}"))]
    SessionNotFound { key: String },
    #[snafu(display("Driver {driver} not found in session {session}"))]
    DriverNotFound { driver: String, session: String },
    #[snafu(display("Error requesting timing data from {url}"))]
    ProviderRequest { url: String, source: reqwest::Error },
    #[snafu(display("Timing provider returned status {status} for {url}"))]
    ProviderResponse { url: String, status: u16 },

    // Session cache errors
    #[snafu(display("Error accessing session cache"))]
    CacheIOError { source: io::Error },
    #[snafu(display("Error serializing cached session"))]
    CacheSerializeError { source: serde_json::Error },

    // Offline session files and exports
    #[snafu(display("Invalid session file: {path}"))]
    InvalidSessionFile { path: String },
    #[snafu(display("Error loading session file"))]
    SessionLoaderError { source: io::Error },
    #[snafu(display("Error writing session file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing session for export"))]
    WriterSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // UI errors
    #[snafu(display("Could not load stylesheet {path}"))]
    StylesheetMissing { path: String, source: io::Error },
    #[snafu(display("Invalid stylesheet {path}"))]
    InvalidStylesheet {
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("Session fetch worker disconnected"))]
    FetchWorkerDisconnected,
    #[snafu(display("Session fetch worker panicked while loading {key}"))]
    FetchWorkerPanicked { key: String },
    #[snafu(display("Could not start dashboard window: {reason}"))]
    UiError { reason: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}
