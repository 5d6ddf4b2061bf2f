use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::stats::{mean_rating, to_money, zero_money};
use crate::store::operations::records::ConsumptionRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandBreakdownEntry {
    pub brand_id: i64,
    pub brand_name: String,
    pub count: u64,
    pub amount: Decimal,
    pub average_rating: f64,
    /// 占总杯数的百分比，0..=100，不做舍入
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandBreakdownResult {
    pub statistics: Vec<BrandBreakdownEntry>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

struct BrandGroup<'a> {
    brand_id: i64,
    // 品牌名取 (consume_date, updated_at) 最新的一条
    name_source: &'a ConsumptionRecord,
    count: u64,
    amount: Decimal,
    rating_sum: u64,
}

impl<'a> BrandGroup<'a> {
    fn new(record: &'a ConsumptionRecord) -> Self {
        Self {
            brand_id: record.brand_id,
            name_source: record,
            count: 0,
            amount: zero_money(),
            rating_sum: 0,
        }
    }

    fn add(&mut self, record: &'a ConsumptionRecord) {
        self.count += 1;
        self.amount += record.price;
        self.rating_sum += u64::from(record.rating);
        if recency(record) > recency(self.name_source) {
            self.name_source = record;
        }
    }
}

fn recency(record: &ConsumptionRecord) -> (NaiveDate, DateTime<Utc>) {
    (record.consume_date, record.updated_at)
}

/// 按品牌汇总，杯数降序，杯数相同按品牌ID升序
pub fn compute_brand_breakdown(records: &[ConsumptionRecord]) -> Vec<BrandBreakdownEntry> {
    let total_count = records.len() as u64;

    // `groups` 保持首次出现顺序，`index` 记录品牌所在下标
    let mut groups: Vec<BrandGroup<'_>> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for record in records {
        let slot = *index.entry(record.brand_id).or_insert_with(|| {
            groups.push(BrandGroup::new(record));
            groups.len() - 1
        });
        groups[slot].add(record);
    }

    let mut entries: Vec<BrandBreakdownEntry> = groups
        .into_iter()
        .map(|group| BrandBreakdownEntry {
            brand_id: group.brand_id,
            brand_name: group.name_source.brand_name.clone(),
            count: group.count,
            amount: to_money(group.amount),
            average_rating: mean_rating(group.rating_sum, group.count),
            percentage: if total_count > 0 {
                group.count as f64 / total_count as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.brand_id.cmp(&b.brand_id)));
    entries
}
