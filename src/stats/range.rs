use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::constants::{MAX_CONSUME_YEAR, MIN_CONSUME_YEAR};
use crate::stats::StatsError;

/// 闭区间日期范围，`start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StatsError> {
        ensure_supported_year("startDate", start)?;
        ensure_supported_year("endDate", end)?;
        if start > end {
            return Err(StatsError::invalid(
                "startDate",
                format!("start date {start} is after end date {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 覆盖的自然日数，含首尾
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// 存储键按四位年份排序，超出 1..=9999 的日期无法参与范围扫描
fn ensure_supported_year(field: &'static str, date: NaiveDate) -> Result<(), StatsError> {
    if !(MIN_CONSUME_YEAR..=MAX_CONSUME_YEAR).contains(&date.year()) {
        return Err(StatsError::invalid(
            field,
            format!("year of {date} is outside {MIN_CONSUME_YEAR}..={MAX_CONSUME_YEAR}"),
        ));
    }
    Ok(())
}

/// 未给出开始日期时，从结束日期往前回溯的窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultWindow {
    /// 自然月回溯，日号超出目标月天数时取月末
    Months(u32),
    Days(u64),
}

impl DefaultWindow {
    fn start_from(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            DefaultWindow::Months(months) => anchor.checked_sub_months(Months::new(months)),
            DefaultWindow::Days(days) => anchor.checked_sub_days(Days::new(days)),
        }
    }
}

/// 把请求里的可选起止日期解析成具体区间。
///
/// 结束日期缺省为 `today`；开始日期缺省为 `结束日期 - window`，
/// 因此只给出过去的结束日期时得到的是以它为终点的窗口，结果可以为空但不会报错。
/// 显式给出的倒序区间报错；`max_days` 为 `Some` 时超长区间也报错。
pub fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    window: DefaultWindow,
    today: NaiveDate,
    max_days: Option<u32>,
) -> Result<DateRange, StatsError> {
    let end = end.unwrap_or(today);
    ensure_supported_year("endDate", end)?;
    let start = match start {
        Some(start) => start,
        None => window
            .start_from(end)
            .ok_or_else(|| StatsError::invalid("startDate", "default window underflows"))?,
    };

    let range = DateRange::new(start, end)?;
    if let Some(max_days) = max_days {
        if range.num_days() > i64::from(max_days) {
            return Err(StatsError::invalid(
                "endDate",
                format!(
                    "range spans {} days, at most {} allowed",
                    range.num_days(),
                    max_days
                ),
            ));
        }
    }
    Ok(range)
}

/// 某年某月的第一天与最后一天
pub fn month_bounds(year: i32, month: u32) -> Result<DateRange, StatsError> {
    if !(1..=12).contains(&month) {
        return Err(StatsError::invalid(
            "month",
            format!("month must be within 1..=12, got {month}"),
        ));
    }
    if !(MIN_CONSUME_YEAR..=MAX_CONSUME_YEAR).contains(&year) {
        return Err(StatsError::invalid(
            "year",
            format!("year must be within {MIN_CONSUME_YEAR}..={MAX_CONSUME_YEAR}, got {year}"),
        ));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| StatsError::invalid("year", format!("unsupported year {year}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| StatsError::invalid("year", format!("unsupported year {year}")))?;
    Ok(DateRange {
        start: first,
        end: last,
    })
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, StatsError> {
    month_bounds(year, month).map(|bounds| bounds.end.day())
}
