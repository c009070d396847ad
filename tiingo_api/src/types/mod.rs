//! Response records for the Tiingo price endpoints.

mod price;
pub use self::price::PriceRecord;
