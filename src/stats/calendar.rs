use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::stats::range::month_bounds;
use crate::stats::{to_money, zero_money, StatsError};
use crate::store::operations::records::ConsumptionRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub count: u32,
    pub amount: Decimal,
    pub has_consumption: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonthResult {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub total_cups: u64,
    pub total_amount: Decimal,
    pub consume_days: u64,
}

/// 当月每天一条，无消费的日子补零，按日期升序。
///
/// 不在该月的记录直接忽略。
pub fn compute_calendar_month(
    records: &[ConsumptionRecord],
    year: i32,
    month: u32,
) -> Result<CalendarMonthResult, StatsError> {
    let bounds = month_bounds(year, month)?;

    let mut by_date: BTreeMap<NaiveDate, (u32, Decimal)> = BTreeMap::new();
    for record in records.iter().filter(|r| bounds.contains(r.consume_date)) {
        let slot = by_date
            .entry(record.consume_date)
            .or_insert_with(|| (0, zero_money()));
        slot.0 += 1;
        slot.1 += record.price;
    }

    let days: Vec<CalendarDay> = bounds
        .start
        .iter_days()
        .take_while(|date| *date <= bounds.end)
        .map(|date| {
            let (count, amount) = by_date
                .get(&date)
                .copied()
                .unwrap_or_else(|| (0, zero_money()));
            CalendarDay {
                date,
                count,
                amount: to_money(amount),
                has_consumption: count > 0,
            }
        })
        .collect();

    let total_cups = by_date.values().map(|(count, _)| u64::from(*count)).sum();
    let total_amount = by_date
        .values()
        .fold(zero_money(), |acc, (_, amount)| acc + *amount);

    Ok(CalendarMonthResult {
        year,
        month,
        days,
        total_cups,
        total_amount: to_money(total_amount),
        consume_days: by_date.len() as u64,
    })
}
