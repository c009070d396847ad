use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One price bar as returned by the daily or IEX endpoints.
///
/// Daily bars carry `adjClose`, `divCash`, `splitFactor` and friends; IEX
/// bars only the requested columns. Anything beyond OHLCV is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PriceRecord {
    /// The bar's time key: `date`, falling back to a `timestamp` field.
    pub fn time_key(&self) -> Option<&str> {
        self.date
            .as_deref()
            .or_else(|| self.extra.get("timestamp").and_then(Value::as_str))
    }
}
