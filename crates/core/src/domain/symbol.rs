use serde::{Deserialize, Serialize};

/// Taiwan Stock Exchange (listed) suffix; tried first for numeric codes.
pub const PRIMARY_SUFFIX: &str = ".TW";
/// Taipei Exchange (OTC) suffix; tried when the listed symbol has no data.
pub const ALTERNATE_SUFFIX: &str = ".TWO";

/// A normalized user-entered stock code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolQuery {
    code: String,
}

impl SymbolQuery {
    /// Trims and uppercases `raw`. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return None;
        }
        Some(Self { code })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_numeric(&self) -> bool {
        self.code.chars().all(|c| c.is_ascii_digit())
    }

    /// Provider symbols to try, in order. Non-numeric codes are taken verbatim.
    pub fn candidates(&self) -> Vec<String> {
        if self.is_numeric() {
            vec![
                format!("{}{PRIMARY_SUFFIX}", self.code),
                format!("{}{ALTERNATE_SUFFIX}", self.code),
            ]
        } else {
            vec![self.code.clone()]
        }
    }
}
