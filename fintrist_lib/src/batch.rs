//! Normalizes multi-ticker responses into per-symbol record lists.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tiingo_api::types::PriceRecord;

use crate::error::FintristError;

const PRICE_DATA_KEYS: [&str; 3] = ["priceData", "data", "prices"];

/// Groups batch entries by uppercased ticker.
///
/// Entries come either as `{ticker, priceData: [...]}` or as flat records
/// carrying their own `ticker` and `date`. Repeated tickers accumulate.
pub fn group_batch_payload(
    entries: Vec<Value>,
) -> Result<BTreeMap<String, Vec<PriceRecord>>, FintristError> {
    let mut grouped: BTreeMap<String, Vec<PriceRecord>> = BTreeMap::new();
    for entry in entries {
        let Value::Object(mut entry) = entry else {
            return Err(FintristError::Payload(
                "batch response contained an invalid record".to_string(),
            ));
        };
        let ticker = take_ticker(&mut entry).ok_or_else(|| {
            FintristError::Payload("batch response missing ticker identifier".to_string())
        })?;
        let records = take_records(entry)?;
        grouped.entry(ticker).or_default().extend(records);
    }
    Ok(grouped)
}

fn take_ticker(entry: &mut Map<String, Value>) -> Option<String> {
    let ticker = ["ticker", "symbol"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())?;
    entry.remove("ticker");
    entry.remove("symbol");
    Some(ticker)
}

/// Takes the first non-empty price list. Empty lists and nulls fall
/// through to the next key and finally to the flat-record shape.
fn take_records(mut entry: Map<String, Value>) -> Result<Vec<PriceRecord>, FintristError> {
    let mut nested = None;
    for key in PRICE_DATA_KEYS {
        match entry.remove(key) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) if items.is_empty() => {}
            Some(value) => {
                if nested.is_none() {
                    nested = Some(value);
                }
            }
        }
    }
    match nested {
        Some(Value::Array(items)) => serde_json::from_value(Value::Array(items))
            .map_err(|e| FintristError::Payload(format!("invalid price record: {}", e))),
        Some(_) => Err(FintristError::Payload(
            "batch response price data was not a list".to_string(),
        )),
        None if entry.contains_key("date") => {
            let record = serde_json::from_value(Value::Object(entry))
                .map_err(|e| FintristError::Payload(format!("invalid price record: {}", e)))?;
            Ok(vec![record])
        }
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_price_data_grouped_by_uppercase_ticker() {
        let grouped = group_batch_payload(vec![
            json!({"ticker": "aapl", "priceData": [{"date": "2024-01-02", "close": 185.64}]}),
            json!({"ticker": "MSFT", "data": [{"date": "2024-01-02", "close": 370.87}]}),
            json!({"symbol": "spy", "prices": []}),
        ])
        .unwrap();
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["AAPL", "MSFT", "SPY"]);
        assert_eq!(grouped["AAPL"][0].close, Some(185.64));
        assert!(grouped["SPY"].is_empty());
    }

    #[test]
    fn flat_records_accumulate() {
        let grouped = group_batch_payload(vec![
            json!({"ticker": "AAPL", "date": "2024-01-02", "close": 1.0}),
            json!({"ticker": "aapl", "date": "2024-01-03", "close": 2.0}),
        ])
        .unwrap();
        let rows = &grouped["AAPL"];
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].extra.contains_key("ticker"));
    }

    #[test]
    fn entry_without_prices_or_date_has_no_rows() {
        let grouped = group_batch_payload(vec![json!({"ticker": "AAPL", "note": "n/a"})]).unwrap();
        assert!(grouped["AAPL"].is_empty());
    }

    #[test]
    fn empty_price_list_falls_through() {
        let grouped = group_batch_payload(vec![
            json!({"ticker": "AAPL", "priceData": [], "data": [{"date": "2024-01-02", "close": 1.0}]}),
            json!({"ticker": "MSFT", "priceData": [], "date": "2024-01-02", "close": 2.0}),
            json!({"ticker": "SPY", "priceData": [], "prices": null}),
        ])
        .unwrap();
        assert_eq!(grouped["AAPL"].len(), 1);
        assert_eq!(grouped["AAPL"][0].close, Some(1.0));
        assert_eq!(grouped["MSFT"].len(), 1);
        assert!(!grouped["MSFT"][0].extra.contains_key("priceData"));
        assert!(grouped["SPY"].is_empty());
    }

    #[test]
    fn non_object_entry_rejected() {
        let err = group_batch_payload(vec![json!("AAPL")]).unwrap_err();
        assert!(err.to_string().contains("invalid record"));
    }

    #[test]
    fn missing_ticker_rejected() {
        let err = group_batch_payload(vec![json!({"priceData": []})]).unwrap_err();
        assert!(err.to_string().contains("missing ticker identifier"));
    }

    #[test]
    fn scalar_price_data_rejected() {
        let err = group_batch_payload(vec![json!({"ticker": "AAPL", "priceData": 3})]).unwrap_err();
        assert!(err.to_string().contains("was not a list"));
    }
}
