//! Shared query infrastructure: the [`Query`] trait and [`QueryCommon`] fields.

use chrono::NaiveDate;
use url::Url;

/// Date format Tiingo expects for `startDate` / `endDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait implemented by all query builders. Provides URL serialization and
/// shared builder methods for the date range.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Returns the common query fields.
    fn common(&self) -> &QueryCommon;

    /// True when `startDate` or `endDate` will be sent.
    fn has_date_filter(&self) -> bool {
        self.common().has_date_filter()
    }

    /// Sets the first date (inclusive) of the requested range.
    fn with_start_date(mut self, start_date: NaiveDate) -> Self
    where
        Self: Sized,
    {
        self.get_common().start_date = Some(start_date);
        self
    }

    /// Sets the last date (inclusive) of the requested range.
    fn with_end_date(mut self, end_date: NaiveDate) -> Self
    where
        Self: Sized,
    {
        self.get_common().end_date = Some(end_date);
        self
    }

    /// Sets both ends of the requested range.
    fn with_date_range(self, start_date: NaiveDate, end_date: NaiveDate) -> Self
    where
        Self: Sized,
    {
        self.with_start_date(start_date).with_end_date(end_date)
    }

    /// Clears any date filter, letting Tiingo return its default window.
    fn without_dates(mut self) -> Self
    where
        Self: Sized,
    {
        let common = self.get_common();
        common.start_date = None;
        common.end_date = None;
        self
    }
}

/// Fields shared by all query types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryCommon {
    /// First date of the range, sent as `startDate`.
    pub start_date: Option<NaiveDate>,
    /// Last date of the range, sent as `endDate`.
    pub end_date: Option<NaiveDate>,
}

impl QueryCommon {
    pub fn has_date_filter(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Appends the date range and `format=json` to the URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(start_date) = self.start_date {
            url.query_pairs_mut()
                .append_pair("startDate", &start_date.format(DATE_FORMAT).to_string());
        }
        if let Some(end_date) = self.end_date {
            url.query_pairs_mut()
                .append_pair("endDate", &end_date.format(DATE_FORMAT).to_string());
        }
        url.query_pairs_mut().append_pair("format", "json");
        url
    }
}
