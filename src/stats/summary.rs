use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::stats::range::DateRange;
use crate::stats::{mean_rating, to_money, zero_money};
use crate::store::operations::records::ConsumptionRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total_count: u64,
    /// 有消费的自然日数，同一天多杯只算一天
    pub total_distinct_days: u64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub max_amount: Decimal,
    pub min_amount: Decimal,
    pub average_rating: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// 计算基础统计，`records` 已由调用方限定在 `range` 内
pub fn compute_summary(records: &[ConsumptionRecord], range: DateRange) -> SummaryResult {
    let mut total_amount = zero_money();
    let mut max_amount: Option<Decimal> = None;
    let mut min_amount: Option<Decimal> = None;
    let mut rating_sum = 0u64;
    let mut dates = HashSet::new();

    for record in records {
        total_amount += record.price;
        max_amount = Some(max_amount.map_or(record.price, |max| max.max(record.price)));
        min_amount = Some(min_amount.map_or(record.price, |min| min.min(record.price)));
        rating_sum += u64::from(record.rating);
        dates.insert(record.consume_date);
    }

    let total_count = records.len() as u64;
    let average_amount = if total_count > 0 {
        to_money(total_amount / Decimal::from(total_count))
    } else {
        zero_money()
    };

    SummaryResult {
        total_count,
        total_distinct_days: dates.len() as u64,
        total_amount: to_money(total_amount),
        average_amount,
        max_amount: max_amount.map_or_else(zero_money, to_money),
        min_amount: min_amount.map_or_else(zero_money, to_money),
        average_rating: mean_rating(rating_sum, total_count),
        start_date: range.start,
        end_date: range.end,
    }
}
