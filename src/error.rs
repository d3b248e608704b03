use thiserror::Error;

/// Failures of a detection pass. The classifier is consumed as a black box;
/// when it fails, the pass that invoked it is abandoned and the tracked set
/// left untouched. Expected steady-state conditions (stale nodes, missing
/// icons) are not errors anywhere in the engine.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("form predictor failed: {0}")]
    Predictor(String),
}

/// Failures of the background message port. The content script cannot
/// operate without its background worker, so these surface at the lifecycle
/// boundary and trigger a controlled destroy rather than a retry loop.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("background port is disconnected")]
    Disconnected,

    #[error("extension context invalidated: {0}")]
    Invalidated(String),
}

/// Failures loading a serialized page snapshot (CLI input, fixtures).
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid page snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
