pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::VotePulseError;
pub use types::*;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
