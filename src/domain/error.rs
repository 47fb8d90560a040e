//! Domain error types.

/// Top-level error type for algodesk.
#[derive(Debug, thiserror::Error)]
pub enum AlgodeskError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("position index {index} out of range ({len} open positions)")]
    OutOfRange { index: usize, len: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("feed error: {reason}")]
    Feed { reason: String },

    #[error("no market data for {symbol}")]
    NoData { symbol: String },

    #[error("engine halted by panic exit")]
    EngineHalted,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlgodeskError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        AlgodeskError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AlgodeskError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&AlgodeskError> for std::process::ExitCode {
    fn from(err: &AlgodeskError) -> Self {
        let code: u8 = match err {
            AlgodeskError::Io(_) => 1,
            AlgodeskError::ConfigParse { .. }
            | AlgodeskError::ConfigMissing { .. }
            | AlgodeskError::ConfigInvalid { .. } => 2,
            AlgodeskError::Feed { .. } | AlgodeskError::NoData { .. } => 3,
            AlgodeskError::InvalidArgument { .. } | AlgodeskError::OutOfRange { .. } => 4,
            AlgodeskError::EngineHalted => 5,
        };
        std::process::ExitCode::from(code)
    }
}
