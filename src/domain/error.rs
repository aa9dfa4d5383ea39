//! Domain error types.

/// Top-level error type for valueduel.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    #[error("data fetch failed: {reason}")]
    DataFetch { reason: String },

    #[error("insufficient data for {symbol}: no observations in the requested period")]
    InsufficientData { symbol: String },

    #[error("no comparable dates remain after aligning the series")]
    EmptyAlignedRange,

    #[error("malformed series {symbol}: {reason}")]
    MalformedSeries { symbol: String, reason: String },

    #[error("invalid allocation: {reason}")]
    InvalidAllocation { reason: String },

    #[error("invalid tax drag rate for {symbol}: {rate}")]
    InvalidTaxRate { symbol: String, rate: f64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DuelError {
    /// Whether the caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DuelError::DataFetch { .. })
    }
}

impl From<&DuelError> for std::process::ExitCode {
    fn from(err: &DuelError) -> Self {
        let code: u8 = match err {
            DuelError::Io(_) => 1,
            DuelError::ConfigParse { .. }
            | DuelError::ConfigInvalid { .. } => 2,
            DuelError::DataFetch { .. } => 3,
            DuelError::InvalidAllocation { .. } | DuelError::InvalidTaxRate { .. } => 4,
            DuelError::InsufficientData { .. }
            | DuelError::EmptyAlignedRange
            | DuelError::MalformedSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
