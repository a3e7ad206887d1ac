// Library interface for lapdash
// This allows integration tests to access internal modules

pub mod dashboard;
pub mod errors;
pub mod provider;
pub mod session;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use dashboard::{DashboardController, SelectionState, StubFeature, StubResponse};
pub use errors::LapDashError;
pub use provider::SessionProvider;
pub use session::{DriverId, LapRecord, Session, SessionKey, SessionType};
