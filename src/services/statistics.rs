use chrono::NaiveDate;
use thiserror::Error;

use crate::config::StatsConfig;
use crate::stats::range::month_bounds;
use crate::stats::{
    compute_brand_breakdown, compute_calendar_month, compute_summary, compute_trends,
    resolve_range, BrandBreakdownResult, CalendarMonthResult, DateRange, DefaultWindow, GroupBy,
    StatsError, SummaryResult, TrendsResult,
};
use crate::store::operations::records::ConsumptionRecord;
use crate::store::StoreError;

/// Read side of the record store consumed by the statistics service.
pub trait RecordSource {
    /// Records of `owner` dated within `start..=end`.
    fn fetch_by_owner_and_date_range(
        &self,
        owner: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ConsumptionRecord>, StoreError>;

    fn fetch_by_owner_year_month(
        &self,
        owner: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ConsumptionRecord>, StoreError>;

    fn count_distinct_dates(
        &self,
        owner: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, StoreError>;
}

#[derive(Debug, Error)]
pub enum StatisticsError {
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves ranges, fetches one snapshot per call and hands it to the engine.
pub struct StatisticsService<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    config: &'a StatsConfig,
}

impl<'a, S: RecordSource + ?Sized> StatisticsService<'a, S> {
    pub fn new(source: &'a S, config: &'a StatsConfig) -> Self {
        Self { source, config }
    }

    /// Summary and brands do no per-day seeding, so no range limit applies.
    fn summary_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<DateRange, StatsError> {
        resolve_range(
            start,
            end,
            DefaultWindow::Months(self.config.summary_window_months),
            today,
            None,
        )
    }

    fn fetch_range(&self, owner: &str, range: DateRange) -> Result<Vec<ConsumptionRecord>, StoreError> {
        self.source
            .fetch_by_owner_and_date_range(owner, range.start, range.end)
    }

    pub fn summary(
        &self,
        owner: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<SummaryResult, StatisticsError> {
        let range = self.summary_range(start, end, today)?;
        let records = self.fetch_range(owner, range)?;
        tracing::debug!(owner, start = %range.start, end = %range.end, records = records.len(), "Computing summary");
        Ok(compute_summary(&records, range))
    }

    pub fn brands(
        &self,
        owner: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<BrandBreakdownResult, StatisticsError> {
        let range = self.summary_range(start, end, today)?;
        let records = self.fetch_range(owner, range)?;
        tracing::debug!(owner, start = %range.start, end = %range.end, records = records.len(), "Computing brand breakdown");
        Ok(BrandBreakdownResult {
            statistics: compute_brand_breakdown(&records),
            start_date: range.start,
            end_date: range.end,
        })
    }

    pub fn calendar(
        &self,
        owner: &str,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonthResult, StatisticsError> {
        // Reject bad months before touching the store.
        month_bounds(year, month)?;
        let records = self.source.fetch_by_owner_year_month(owner, year, month)?;
        tracing::debug!(owner, year, month, records = records.len(), "Computing calendar month");
        Ok(compute_calendar_month(&records, year, month)?)
    }

    pub fn trends(
        &self,
        owner: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        group_by: Option<&str>,
        today: NaiveDate,
    ) -> Result<TrendsResult, StatisticsError> {
        let group_by = GroupBy::parse_optional(group_by)?;
        let range = resolve_range(
            start,
            end,
            DefaultWindow::Days(u64::from(self.config.trend_window_days)),
            today,
            Some(self.config.max_range_days),
        )?;
        let records = self.fetch_range(owner, range)?;
        tracing::debug!(owner, %group_by, start = %range.start, end = %range.end, records = records.len(), "Computing trends");
        Ok(compute_trends(&records, range, group_by))
    }
}
