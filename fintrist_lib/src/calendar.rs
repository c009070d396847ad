//! NYSE trading calendar.
//!
//! Regular sessions run 09:30-16:00 America/New_York, with 13:00 early
//! closes around Independence Day, Thanksgiving and Christmas. Only the
//! recurring holiday rules are modelled.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::{America::New_York, Tz};

use crate::error::FintristError;

/// How far back [`latest_market_day`] looks for a session.
pub const LOOKBACK_DAYS: u64 = 7;

/// One trading session with UTC bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketSession {
    /// Trading date in New York.
    pub date: NaiveDate,
    pub open: DateTime<Utc>,
    pub close: DateTime<Utc>,
}

impl MarketSession {
    /// True while the session is trading, open inclusive and close exclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.open <= at && at < self.close
    }
}

/// A session with bounds converted to a display timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSession {
    pub date: NaiveDate,
    pub open: DateTime<Tz>,
    pub close: DateTime<Tz>,
}

/// Source of trading sessions.
pub trait MarketCalendar {
    /// Sessions whose dates fall in `start..=end`, in date order.
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Vec<MarketSession>;
}

/// New York Stock Exchange calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct NyseCalendar;

impl NyseCalendar {
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        holidays(date.year()).contains(&date)
    }

    pub fn is_early_close(&self, date: NaiveDate) -> bool {
        let year = date.year();
        let day_after_thanksgiving = thanksgiving(year).and_then(|d| d.succ_opt());
        let mon_to_thu = date.weekday().num_days_from_monday() <= Weekday::Thu.num_days_from_monday();
        Some(date) == day_after_thanksgiving
            || (mon_to_thu && (date.month(), date.day()) == (7, 3))
            || (mon_to_thu && (date.month(), date.day()) == (12, 24))
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    fn session(&self, date: NaiveDate) -> Option<MarketSession> {
        if !self.is_trading_day(date) {
            return None;
        }
        let close_time = if self.is_early_close(date) {
            NaiveTime::from_hms_opt(13, 0, 0)?
        } else {
            NaiveTime::from_hms_opt(16, 0, 0)?
        };
        Some(MarketSession {
            date,
            open: new_york_instant(date, NaiveTime::from_hms_opt(9, 30, 0)?)?,
            close: new_york_instant(date, close_time)?,
        })
    }
}

impl MarketCalendar for NyseCalendar {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Vec<MarketSession> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter_map(|d| self.session(d))
            .collect()
    }
}

/// Sessions in `start..=end` with bounds shown in `tz`.
pub fn market_schedule<C: MarketCalendar + ?Sized>(
    calendar: &C,
    start: NaiveDate,
    end: NaiveDate,
    tz: Tz,
) -> Vec<LocalSession> {
    calendar
        .schedule(start, end)
        .into_iter()
        .map(|s| LocalSession {
            date: s.date,
            open: s.open.with_timezone(&tz),
            close: s.close.with_timezone(&tz),
        })
        .collect()
}

/// Most recent session that had opened by `now`.
pub fn latest_market_day<C: MarketCalendar + ?Sized>(
    calendar: &C,
    now: DateTime<Utc>,
) -> Result<MarketSession, FintristError> {
    let today = now.with_timezone(&New_York).date_naive();
    let start = today
        .checked_sub_days(Days::new(LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN);
    calendar
        .schedule(start, today)
        .into_iter()
        .rev()
        .find(|s| s.open <= now)
        .ok_or_else(|| {
            FintristError::Calendar(format!(
                "no market session in the {} days before {}",
                LOOKBACK_DAYS, now
            ))
        })
}

/// Whether `now` falls inside a trading session.
pub fn market_open<C: MarketCalendar + ?Sized>(calendar: &C, now: DateTime<Utc>) -> bool {
    let today = now.with_timezone(&New_York).date_naive();
    calendar
        .schedule(today, today)
        .iter()
        .any(|s| s.contains(now))
}

/// True when no session has traded between `last` and `now`, meaning data
/// fetched at `last` is still current.
pub fn market_current<C: MarketCalendar + ?Sized>(
    calendar: &C,
    last: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    let start = last.with_timezone(&New_York).date_naive();
    let end = now.with_timezone(&New_York).date_naive();
    if end < start {
        return true;
    }
    !calendar
        .schedule(start, end)
        .iter()
        .any(|s| s.open < now && s.close > last)
}

/// 23:59:59 New York time on `date`.
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    new_york_instant(date, NaiveTime::from_hms_opt(23, 59, 59)?)
}

fn new_york_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    New_York
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Saturday holidays close the Friday before, Sunday holidays the Monday after.
fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

fn thanksgiving(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Thu, 4)
}

fn holidays(year: i32) -> Vec<NaiveDate> {
    let ymd = |m, d| NaiveDate::from_ymd_opt(year, m, d);
    let nth = |m, wd, n| NaiveDate::from_weekday_of_month_opt(year, m, wd, n);

    let new_year = ymd(1, 1).and_then(|d| match d.weekday() {
        Weekday::Sat => None,
        _ => observed(d),
    });
    let memorial = nth(5, Weekday::Mon, 5).or_else(|| nth(5, Weekday::Mon, 4));
    let juneteenth = if year >= 2022 { ymd(6, 19).and_then(observed) } else { None };

    [
        new_year,
        nth(1, Weekday::Mon, 3),
        nth(2, Weekday::Mon, 3),
        easter(year).and_then(|d| d.checked_sub_days(Days::new(2))),
        memorial,
        juneteenth,
        ymd(7, 4).and_then(observed),
        nth(9, Weekday::Mon, 1),
        thanksgiving(year),
        ymd(12, 25).and_then(observed),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Easter Sunday (anonymous Gregorian algorithm).
fn easter(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
