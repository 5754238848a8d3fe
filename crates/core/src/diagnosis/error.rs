use crate::domain::indicators::IndicatorError;
use std::fmt;

/// Failure of a single diagnosis run, already classified for the user.
#[derive(Debug)]
pub enum DiagnoseError {
    /// Every candidate symbol returned an empty series.
    NoData { code: String },
    /// Data exists but is too short (or degenerate) for MA20.
    InsufficientHistory {
        symbol: String,
        source: IndicatorError,
    },
    Unexpected(anyhow::Error),
}

impl DiagnoseError {
    /// The single line shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoData { code } => format!("❌ Unable to fetch data for code '{code}'."),
            Self::InsufficientHistory { symbol, source } => {
                format!("❌ Cannot compute indicators for {symbol}: {source}.")
            }
            Self::Unexpected(err) => format!("An error occurred during analysis: {err:#}"),
        }
    }
}

impl fmt::Display for DiagnoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData { code } => write!(f, "no data found for code {code}"),
            Self::InsufficientHistory { symbol, source } => {
                write!(f, "insufficient history for {symbol}: {source}")
            }
            Self::Unexpected(err) => write!(f, "diagnosis failed: {err:#}"),
        }
    }
}

impl std::error::Error for DiagnoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoData { .. } => None,
            Self::InsufficientHistory { source, .. } => Some(source),
            Self::Unexpected(err) => Some(&**err),
        }
    }
}

impl From<anyhow::Error> for DiagnoseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(err)
    }
}
