//! Query builder for the IEX intraday endpoints (`/iex/...`).

use url::Url;

use super::common::{Query, QueryCommon};

/// Bar size used when none is requested.
pub const DEFAULT_RESAMPLE_FREQ: &str = "5min";

/// Columns requested from the IEX endpoint by default.
pub const DEFAULT_IEX_COLUMNS: &[&str] = &["open", "high", "low", "close", "volume"];

/// Query for intraday IEX bars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IexQuery {
    pub common: QueryCommon,
    /// Bar size, e.g. `5min` or `1hour`. Sent as `resampleFreq`.
    pub resample_freq: String,
    /// Columns to return. Sent comma-joined as `columns`.
    pub columns: Vec<String>,
    /// Include pre/post market bars. Sent as `afterHours`.
    pub after_hours: Option<bool>,
    /// Fill bars with no trades from the previous close. Sent as `forceFill`.
    pub force_fill: Option<bool>,
}

impl Default for IexQuery {
    fn default() -> Self {
        Self {
            common: QueryCommon::default(),
            resample_freq: DEFAULT_RESAMPLE_FREQ.to_string(),
            columns: DEFAULT_IEX_COLUMNS.iter().map(|c| c.to_string()).collect(),
            after_hours: None,
            force_fill: None,
        }
    }
}

impl IexQuery {
    pub fn with_resample_freq(mut self, freq: &str) -> Self {
        self.resample_freq = freq.to_string();
        self
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_after_hours(mut self, after_hours: bool) -> Self {
        self.after_hours = Some(after_hours);
        self
    }

    pub fn with_force_fill(mut self, force_fill: bool) -> Self {
        self.force_fill = Some(force_fill);
        self
    }
}

impl Query for IexQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        url.query_pairs_mut()
            .append_pair("resampleFreq", &self.resample_freq);
        if !self.columns.is_empty() {
            url.query_pairs_mut()
                .append_pair("columns", &self.columns.join(","));
        }
        if let Some(after_hours) = self.after_hours {
            url.query_pairs_mut()
                .append_pair("afterHours", &after_hours.to_string());
        }
        if let Some(force_fill) = self.force_fill {
            url.query_pairs_mut()
                .append_pair("forceFill", &force_fill.to_string());
        }
        url
    }

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }
}

/// Checks a resample frequency of the form `<n>min`, `<n>hour` or `<n>day`
/// with `n > 0`.
pub fn is_valid_resample_freq(freq: &str) -> bool {
    let freq = freq.trim().to_ascii_lowercase();
    let digits_end = freq
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(freq.len());
    let (count, unit) = freq.split_at(digits_end);
    let count_ok = count.parse::<u32>().map(|n| n > 0).unwrap_or(false);
    count_ok && matches!(unit, "min" | "hour" | "day")
}
