//! Error types for the decision maker core

use std::path::PathBuf;

/// Errors surfaced by the decision maker core.
///
/// Per-process read failures are never represented here: they are logged
/// and the process is skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The process table root could not be listed.
    #[error("failed to read process table root {}: {source}", path.display())]
    DiscoveryRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A Prometheus collector could not be built or registered.
    #[error("metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),

    /// The blocking discovery task did not run to completion.
    #[error("discovery task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
