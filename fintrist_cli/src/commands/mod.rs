//! CLI subcommand implementations.

pub mod daily;
pub mod intraday;
pub mod session;

use fintrist_lib::SymbolSpec;

/// One symbol on the command line is a bare symbol; more make a list.
fn symbol_spec(symbols: &[String]) -> SymbolSpec {
    match symbols {
        [one] => SymbolSpec::Single(one.clone()),
        many => SymbolSpec::Many(many.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_argument_is_bare_symbol() {
        assert!(symbol_spec(&["AAPL".to_string()]).is_single());
        assert!(!symbol_spec(&["AAPL".to_string(), "MSFT".to_string()]).is_single());
    }
}
