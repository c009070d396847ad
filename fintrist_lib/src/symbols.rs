//! Symbol normalization: one bare symbol or an ordered list of symbols.

use std::fmt;

use crate::error::FintristError;

pub const MAX_SYMBOL_LENGTH: usize = 20;

/// The symbols a caller asked for.
///
/// `Single` remembers that the caller passed one bare symbol, so the result
/// can be handed back without the symbol level. A one-element `Many` keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSpec {
    Single(String),
    Many(Vec<String>),
}

impl SymbolSpec {
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Canonical list: trimmed, uppercased, validated, first occurrence wins.
    pub fn to_list(&self) -> Result<Vec<String>, FintristError> {
        let raw: Vec<&str> = match self {
            Self::Single(symbol) => vec![symbol.as_str()],
            Self::Many(symbols) => symbols.iter().map(String::as_str).collect(),
        };
        if raw.is_empty() {
            return Err(no_symbols());
        }
        let mut out: Vec<String> = Vec::with_capacity(raw.len());
        for symbol in raw {
            let symbol = validate_symbol(symbol)?;
            if !out.contains(&symbol) {
                out.push(symbol);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for SymbolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(symbol) => write!(f, "{}", symbol),
            Self::Many(symbols) => write!(f, "[{}]", symbols.join(", ")),
        }
    }
}

impl From<&str> for SymbolSpec {
    fn from(symbol: &str) -> Self {
        Self::Single(symbol.to_string())
    }
}

impl From<String> for SymbolSpec {
    fn from(symbol: String) -> Self {
        Self::Single(symbol)
    }
}

impl From<Vec<String>> for SymbolSpec {
    fn from(symbols: Vec<String>) -> Self {
        Self::Many(symbols)
    }
}

impl From<Vec<&str>> for SymbolSpec {
    fn from(symbols: Vec<&str>) -> Self {
        Self::Many(symbols.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SymbolSpec {
    fn from(symbols: &[&str]) -> Self {
        Self::Many(symbols.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SymbolSpec {
    fn from(symbols: [&str; N]) -> Self {
        Self::Many(symbols.iter().map(|s| s.to_string()).collect())
    }
}

fn no_symbols() -> FintristError {
    FintristError::InvalidInput("At least one symbol must be supplied.".to_string())
}

/// Validate a ticker: trim, uppercase, allow letters, digits, `.` and `-`.
pub fn validate_symbol(input: &str) -> Result<String, FintristError> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(no_symbols());
    }
    if symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(FintristError::InvalidInput(format!(
            "symbol exceeds maximum length of {} characters",
            MAX_SYMBOL_LENGTH
        )));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(FintristError::InvalidInput(format!(
            "invalid symbol '{}'",
            input.trim()
        )));
    }
    Ok(symbol)
}
