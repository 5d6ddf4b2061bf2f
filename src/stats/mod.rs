//! 统计聚合引擎。
//!
//! 输入是某个用户 [`ConsumptionRecord`] 的一份快照，这里的函数不做 I/O，
//! 调用之间也不保留状态，同样的输入总是得到同样的结果，可以并发调用。
//!
//! [`ConsumptionRecord`]: crate::store::operations::records::ConsumptionRecord

pub mod brands;
pub mod calendar;
pub mod range;
pub mod summary;
pub mod trends;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

pub use brands::{compute_brand_breakdown, BrandBreakdownEntry, BrandBreakdownResult};
pub use calendar::{compute_calendar_month, CalendarDay, CalendarMonthResult};
pub use range::{resolve_range, DateRange, DefaultWindow};
pub use summary::{compute_summary, SummaryResult};
pub use trends::{compute_trends, GroupBy, TrendPoint, TrendSeries, TrendsResult};

/// 所有金额输出的小数位数
pub const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("invalid argument `{field}`: {message}")]
    InvalidArgument { field: &'static str, message: String },
}

impl StatsError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}

/// `0.00`
pub fn zero_money() -> Decimal {
    Decimal::new(0, MONEY_SCALE)
}

/// 四舍五入（远离零）到两位小数，输出固定两位
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

pub(crate) fn mean_rating(rating_sum: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        rating_sum as f64 / count as f64
    }
}
