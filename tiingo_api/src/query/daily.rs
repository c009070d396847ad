use url::Url;

use super::common::{Query, QueryCommon};

/// Query for the end-of-day price endpoints (`/tiingo/daily/...`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyQuery {
    pub common: QueryCommon,
}

impl Query for DailyQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        self.common.add_to_url(url)
    }

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }
}
