mod common;
pub use self::common::{Query, QueryCommon, DATE_FORMAT};

mod daily;
pub use self::daily::DailyQuery;

mod iex;
pub use self::iex::{is_valid_resample_freq, IexQuery, DEFAULT_IEX_COLUMNS, DEFAULT_RESAMPLE_FREQ};
