use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stats::range::DateRange;
use crate::stats::{to_money, zero_money, StatsError};
use crate::store::keys::DATE_FORMAT;
use crate::store::operations::records::ConsumptionRecord;

/// 趋势分组粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl GroupBy {
    /// 缺省或空白视为 [`GroupBy::Day`]，无法识别的取值报错
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, StatsError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(GroupBy::Day),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }

    /// `date` 所在分组的第一天：按日为当天，按周为当周周一，按月为当月一号
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::Day => date,
            GroupBy::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset)).unwrap_or(date)
            }
            GroupBy::Month => date.with_day(1).unwrap_or(date),
        }
    }

    fn next_bucket(self, bucket_start: NaiveDate) -> Option<NaiveDate> {
        match self {
            GroupBy::Day => bucket_start.succ_opt(),
            GroupBy::Week => bucket_start.checked_add_days(Days::new(7)),
            GroupBy::Month => bucket_start.checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for GroupBy {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "day" => Ok(GroupBy::Day),
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            other => Err(StatsError::invalid(
                "groupBy",
                format!("expected one of day, week, month; got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub bucket_key: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub cups_trend: Vec<TrendPoint>,
    pub amount_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsResult {
    pub group_by: GroupBy,
    pub series: TrendSeries,
    pub start_date: String,
    pub end_date: String,
}

/// 以分组起始日为键、保持插入顺序的分组表
#[derive(Default)]
struct Buckets {
    order: Vec<(NaiveDate, u64, Decimal)>,
    index: HashMap<NaiveDate, usize>,
}

impl Buckets {
    fn slot(&mut self, key: NaiveDate) -> usize {
        let order = &mut self.order;
        *self.index.entry(key).or_insert_with(|| {
            order.push((key, 0, zero_money()));
            order.len() - 1
        })
    }

    fn add(&mut self, key: NaiveDate, amount: Decimal) {
        let slot = self.slot(key);
        let bucket = &mut self.order[slot];
        bucket.1 += 1;
        bucket.2 += amount;
    }
}

/// 按分组统计 `range` 内每个周期的杯数与金额。
///
/// 先从 `range.start` 所在分组开始逐个预置与区间相交的周期，空周期输出为零，
/// 顺序即时间顺序。未被预置的分组只可能来自区间外的记录，追加在末尾。
pub fn compute_trends(
    records: &[ConsumptionRecord],
    range: DateRange,
    group_by: GroupBy,
) -> TrendsResult {
    let mut buckets = Buckets::default();

    let mut cursor = Some(group_by.bucket_start(range.start));
    while let Some(bucket_start) = cursor.filter(|date| *date <= range.end) {
        buckets.slot(bucket_start);
        cursor = group_by.next_bucket(bucket_start);
    }

    for record in records {
        buckets.add(group_by.bucket_start(record.consume_date), record.price);
    }

    let mut cups_trend = Vec::with_capacity(buckets.order.len());
    let mut amount_trend = Vec::with_capacity(buckets.order.len());
    for (key, count, amount) in buckets.order {
        let bucket_key = key.format(DATE_FORMAT).to_string();
        cups_trend.push(TrendPoint {
            bucket_key: bucket_key.clone(),
            value: Decimal::from(count),
        });
        amount_trend.push(TrendPoint {
            bucket_key,
            value: to_money(amount),
        });
    }

    TrendsResult {
        group_by,
        series: TrendSeries {
            cups_trend,
            amount_trend,
        },
        start_date: range.start.format(DATE_FORMAT).to_string(),
        end_date: range.end.format(DATE_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(price: Decimal, date: NaiveDate) -> ConsumptionRecord {
        let now = Utc::now();
        ConsumptionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            brand_id: 1,
            brand_name: "A".to_string(),
            category: "奶茶".to_string(),
            sweetness: "标准".to_string(),
            ice_level: "正常冰".to_string(),
            price,
            rating: 7,
            comment: None,
            consume_date: date,
            created_at: now,
            updated_at: now,
        }
    }

    fn keys(points: &[TrendPoint]) -> Vec<&str> {
        points.iter().map(|p| p.bucket_key.as_str()).collect()
    }

    #[test]
    fn group_by_parsing() {
        assert_eq!(GroupBy::parse_optional(None).unwrap(), GroupBy::Day);
        assert_eq!(GroupBy::parse_optional(Some("")).unwrap(), GroupBy::Day);
        assert_eq!(GroupBy::parse_optional(Some("Week")).unwrap(), GroupBy::Week);
        assert_eq!(GroupBy::parse_optional(Some(" month ")).unwrap(), GroupBy::Month);
        let err = GroupBy::parse_optional(Some("year")).unwrap_err();
        assert!(matches!(err, StatsError::InvalidArgument { field: "groupBy", .. }));
    }

    #[test]
    fn bucket_start_rules() {
        // 2025-11-05 是周三
        assert_eq!(GroupBy::Day.bucket_start(d(2025, 11, 5)), d(2025, 11, 5));
        assert_eq!(GroupBy::Week.bucket_start(d(2025, 11, 5)), d(2025, 11, 3));
        assert_eq!(GroupBy::Week.bucket_start(d(2025, 11, 3)), d(2025, 11, 3));
        assert_eq!(GroupBy::Week.bucket_start(d(2025, 11, 9)), d(2025, 11, 3));
        assert_eq!(GroupBy::Month.bucket_start(d(2025, 11, 30)), d(2025, 11, 1));
        // 跨年的一周
        assert_eq!(GroupBy::Week.bucket_start(d(2026, 1, 1)), d(2025, 12, 29));
    }

    #[test]
    fn daily_series_over_thirty_days() {
        let range = DateRange::new(d(2025, 11, 1), d(2025, 11, 30)).unwrap();
        let records: Vec<_> = range
            .start
            .iter_days()
            .take(30)
            .map(|date| record(dec!(10.00), date))
            .collect();

        let trends = compute_trends(&records, range, GroupBy::Day);
        assert_eq!(trends.series.cups_trend.len(), 30);
        assert_eq!(trends.series.amount_trend.len(), 30);
        assert!(trends.series.cups_trend.iter().all(|p| p.value == dec!(1)));
        assert_eq!(trends.series.cups_trend[0].bucket_key, "2025-11-01");
        assert_eq!(trends.series.cups_trend[29].bucket_key, "2025-11-30");
        assert_eq!(trends.start_date, "2025-11-01");
        assert_eq!(trends.end_date, "2025-11-30");
        assert_eq!(trends.group_by, GroupBy::Day);
    }

    #[test]
    fn empty_days_are_zero_filled() {
        let range = DateRange::new(d(2025, 11, 1), d(2025, 11, 3)).unwrap();
        let records = vec![record(dec!(18.00), d(2025, 11, 1)), record(dec!(15.00), d(2025, 11, 3))];
        let trends = compute_trends(&records, range, GroupBy::Day);

        assert_eq!(keys(&trends.series.cups_trend), vec!["2025-11-01", "2025-11-02", "2025-11-03"]);
        let amounts: Vec<Decimal> = trends.series.amount_trend.iter().map(|p| p.value).collect();
        assert_eq!(amounts, vec![dec!(18.00), dec!(0.00), dec!(15.00)]);
        assert_eq!(trends.series.amount_trend[1].value.to_string(), "0.00");
    }

    #[test]
    fn weekly_walk_covers_trailing_week() {
        // 周三到下周一，跨两个自然周
        let range = DateRange::new(d(2025, 11, 5), d(2025, 11, 10)).unwrap();
        let records = vec![record(dec!(12.00), d(2025, 11, 10)), record(dec!(8.00), d(2025, 11, 6))];
        let trends = compute_trends(&records, range, GroupBy::Week);

        assert_eq!(keys(&trends.series.cups_trend), vec!["2025-11-03", "2025-11-10"]);
        let cups: Vec<Decimal> = trends.series.cups_trend.iter().map(|p| p.value).collect();
        assert_eq!(cups, vec![dec!(1), dec!(1)]);
        assert_eq!(keys(&trends.series.amount_trend), keys(&trends.series.cups_trend));
    }

    #[test]
    fn monthly_walk_from_month_end_covers_every_month() {
        let range = DateRange::new(d(2025, 1, 31), d(2025, 3, 1)).unwrap();
        let records = vec![record(dec!(20.00), d(2025, 3, 1)), record(dec!(5.00), d(2025, 2, 14))];
        let trends = compute_trends(&records, range, GroupBy::Month);

        assert_eq!(
            keys(&trends.series.cups_trend),
            vec!["2025-01-01", "2025-02-01", "2025-03-01"]
        );
        let amounts: Vec<Decimal> = trends.series.amount_trend.iter().map(|p| p.value).collect();
        assert_eq!(amounts, vec![dec!(0.00), dec!(5.00), dec!(20.00)]);
    }

    #[test]
    fn out_of_range_record_appends_trailing_bucket() {
        let range = DateRange::new(d(2025, 11, 1), d(2025, 11, 2)).unwrap();
        let records = vec![record(dec!(9.00), d(2025, 11, 20))];
        let trends = compute_trends(&records, range, GroupBy::Day);
        assert_eq!(
            keys(&trends.series.cups_trend),
            vec!["2025-11-01", "2025-11-02", "2025-11-20"]
        );
    }

    #[test]
    fn group_by_serializes_lowercase() {
        let json = serde_json::to_value(GroupBy::Week).unwrap();
        assert_eq!(json, serde_json::json!("week"));
    }
}
