//! # Leaderboard Service
//!
//! Keeps a competition leaderboard current. The service polls a row source
//! (an HTTP endpoint or a local JSON payload in the `{headers, data}` sheet
//! shape), recomputes standings with `leaderboard-engine`, and publishes the
//! result to subscribers together with the set of teams whose rank changed.

pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod render;
pub mod signals;
pub mod source;

#[cfg(test)]
mod test_support;

pub use config::{LoggingConfig, PollConfig, ServiceConfig, SourceConfig};
pub use error::{Result, ServiceError};
pub use logging::initialize_logging;
pub use poller::{LeaderboardPoller, LeaderboardView};
pub use render::render_table;
pub use signals::shutdown_signal;
pub use source::{build_source, CachedRowSource, FileRowSource, HttpRowSource, RowSource};

/// Seconds between leaderboard refreshes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// How long changed teams stay highlighted
pub const DEFAULT_HIGHLIGHT_MS: u64 = 1500;

/// How long a fetched sheet is reused before going upstream again
pub const DEFAULT_CACHE_TTL_MS: u64 = 5000;

/// Current version of the leaderboard service
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
