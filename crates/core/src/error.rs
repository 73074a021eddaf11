/// Result alias that carries the custom [`PolySweepError`] type.
pub type Result<T> = std::result::Result<T, PolySweepError>;

/// Common error type for the core crate.
///
/// Only malformed inputs are surfaced here. Geometry that simply has nothing
/// to report (parallel edges, too few copies, degenerate stars) yields empty
/// sets instead.
#[derive(Debug, thiserror::Error)]
pub enum PolySweepError {
    /// The polygon description cannot produce a ring of vertices.
    #[error("invalid polygon spec {{n: {sides}, k: {skip}, radius: {radius}}}: {reason}")]
    InvalidPolygonSpec {
        sides: u32,
        skip: i32,
        radius: f64,
        reason: &'static str,
    },
    /// An [`EngineConfig`](crate::EngineConfig) value is out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    /// A thread panicked while holding the shared engine lock.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config json: {0}")]
    Json(#[from] serde_json::Error),
}

impl PolySweepError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<&str> for PolySweepError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PolySweepError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
