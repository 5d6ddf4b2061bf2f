use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::services::statistics::RecordSource;
use crate::stats::range::month_bounds;
use crate::store::keys;
use crate::store::{map_transaction_error, Store, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    pub id: String,
    pub user_id: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub category: String,
    pub sweetness: String,
    pub ice_level: String,
    pub price: Decimal,
    pub rating: u8,
    pub comment: Option<String>,
    pub consume_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 记录列表筛选条件，所有字段可选。
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub brand_id: Option<i64>,
    pub category: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &ConsumptionRecord) -> bool {
        if self.date.is_some_and(|date| record.consume_date != date) {
            return false;
        }
        if self.start_date.is_some_and(|start| record.consume_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| record.consume_date > end) {
            return false;
        }
        if self.brand_id.is_some_and(|brand_id| record.brand_id != brand_id) {
            return false;
        }
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => record.category.contains(category),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<ConsumptionRecord>,
    pub total: usize,
}

impl Store {
    pub fn create_record(&self, record: &ConsumptionRecord) -> Result<(), StoreError> {
        let primary_key = keys::record_key(&record.user_id, record.consume_date, &record.id)?;
        let id_key = keys::record_id_key(&record.id)?;
        let bytes = Self::serialize(record)?;

        (&self.records, &self.record_ids)
            .transaction(|(tx_records, tx_ids)| {
                tx_records.insert(primary_key.as_bytes(), bytes.as_slice())?;
                tx_ids.insert(id_key.as_bytes(), primary_key.as_bytes())?;
                Ok(())
            })
            .map_err(map_transaction_error)
    }

    pub fn get_record(&self, record_id: &str) -> Result<Option<ConsumptionRecord>, StoreError> {
        let id_key = keys::record_id_key(record_id)?;
        let Some(primary_key) = self.record_ids.get(id_key.as_bytes())? else {
            return Ok(None);
        };
        match self.records.get(&primary_key)? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => {
                tracing::warn!(record_id, "Dangling record id index entry");
                Ok(None)
            }
        }
    }

    /// Replaces a stored record. A changed `consume_date` moves the primary key.
    pub fn update_record(&self, record: &ConsumptionRecord) -> Result<(), StoreError> {
        let new_key = keys::record_key(&record.user_id, record.consume_date, &record.id)?;
        let id_key = keys::record_id_key(&record.id)?;
        let bytes = Self::serialize(record)?;

        (&self.records, &self.record_ids)
            .transaction(|(tx_records, tx_ids)| {
                let Some(old_key) = tx_ids.get(id_key.as_bytes())? else {
                    return sled::transaction::abort(StoreError::NotFound {
                        entity: "record".to_string(),
                        key: record.id.clone(),
                    });
                };
                if old_key.as_ref() != new_key.as_bytes() {
                    tx_records.remove(old_key)?;
                    tx_ids.insert(id_key.as_bytes(), new_key.as_bytes())?;
                }
                tx_records.insert(new_key.as_bytes(), bytes.as_slice())?;
                Ok(())
            })
            .map_err(map_transaction_error)
    }

    /// Returns `false` when the id is unknown.
    pub fn delete_record(&self, record_id: &str) -> Result<bool, StoreError> {
        let id_key = keys::record_id_key(record_id)?;

        (&self.records, &self.record_ids)
            .transaction(|(tx_records, tx_ids)| {
                let Some(primary_key) = tx_ids.remove(id_key.as_bytes())? else {
                    return Ok(false);
                };
                tx_records.remove(primary_key)?;
                Ok(true)
            })
            .map_err(map_transaction_error)
    }

    /// Newest consume date first, filtered, then paginated.
    pub fn list_user_records(
        &self,
        user_id: &str,
        filter: &RecordFilter,
        limit: usize,
        offset: usize,
    ) -> Result<RecordPage, StoreError> {
        let prefix = keys::record_prefix(user_id)?;
        let mut records = Vec::new();
        let mut total = 0usize;

        for item in self.records.scan_prefix(prefix.as_bytes()).rev() {
            let (_, value) = item?;
            let record: ConsumptionRecord = Self::deserialize(&value)?;
            if !filter.matches(&record) {
                continue;
            }
            if total >= offset && records.len() < limit {
                records.push(record);
            }
            total += 1;
        }

        Ok(RecordPage { records, total })
    }

    /// Inclusive on both ends, ascending by consume date.
    pub fn get_user_records_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConsumptionRecord>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        let (lower, upper) = keys::record_date_bounds(user_id, start, end)?;
        let mut records = Vec::new();
        for item in self.records.range(lower.as_bytes()..upper.as_bytes()) {
            let (_, value) = item?;
            records.push(Self::deserialize::<ConsumptionRecord>(&value)?);
        }
        Ok(records)
    }

    pub fn get_user_records_in_month(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ConsumptionRecord>, StoreError> {
        let bounds = month_bounds(year, month)
            .map_err(|error| StoreError::Validation(error.to_string()))?;
        self.get_user_records_between(user_id, bounds.start, bounds.end)
    }

    /// Distinct consume dates in range, read from keys only.
    pub fn count_user_distinct_dates(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, StoreError> {
        if start > end {
            return Ok(0);
        }
        let (lower, upper) = keys::record_date_bounds(user_id, start, end)?;
        let mut dates = BTreeSet::new();
        for item in self.records.range(lower.as_bytes()..upper.as_bytes()) {
            let (key, _) = item?;
            if let Some(date) = keys::date_from_record_key(&key) {
                dates.insert(date);
            }
        }
        Ok(dates.len() as u64)
    }
}

impl RecordSource for Store {
    fn fetch_by_owner_and_date_range(
        &self,
        owner: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConsumptionRecord>, StoreError> {
        self.get_user_records_between(owner, start, end)
    }

    fn fetch_by_owner_year_month(
        &self,
        owner: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ConsumptionRecord>, StoreError> {
        self.get_user_records_in_month(owner, year, month)
    }

    fn count_distinct_dates(
        &self,
        owner: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, StoreError> {
        self.count_user_distinct_dates(owner, start, end)
    }
}
