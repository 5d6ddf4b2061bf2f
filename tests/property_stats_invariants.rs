mod common;

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use common::fixtures::{build_record, date};
use teatrack_backend::stats::range::days_in_month;
use teatrack_backend::stats::{
    compute_brand_breakdown, compute_calendar_month, compute_summary, compute_trends, DateRange,
    GroupBy,
};
use teatrack_backend::store::operations::records::ConsumptionRecord;

fn base() -> NaiveDate {
    date(2025, 1, 1)
}

fn record_strategy() -> impl Strategy<Value = ConsumptionRecord> {
    (1i64..6, 0i64..100_000, 0u8..=10, 0u64..90).prop_map(|(brand_id, cents, rating, offset)| {
        build_record(
            "prop-user",
            brand_id,
            &format!("brand-{brand_id}"),
            Decimal::new(cents, 2),
            rating,
            base().checked_add_days(Days::new(offset)).unwrap(),
        )
    })
}

fn full_range() -> DateRange {
    DateRange::new(base(), base().checked_add_days(Days::new(89)).unwrap()).unwrap()
}

fn group_by_strategy() -> impl Strategy<Value = GroupBy> {
    prop_oneof![Just(GroupBy::Day), Just(GroupBy::Week), Just(GroupBy::Month)]
}

proptest! {
    #[test]
    fn pt_brand_breakdown_partitions_records(records in prop::collection::vec(record_strategy(), 0..60)) {
        let entries = compute_brand_breakdown(&records);
        let summary = compute_summary(&records, full_range());

        let count: u64 = entries.iter().map(|e| e.count).sum();
        let amount: Decimal = entries.iter().map(|e| e.amount).sum();
        prop_assert_eq!(count, summary.total_count);
        prop_assert_eq!(amount, summary.total_amount);

        if !records.is_empty() {
            let pct: f64 = entries.iter().map(|e| e.percentage).sum();
            prop_assert!((pct - 100.0).abs() < 1e-6);
        }

        // count desc, brand_id asc on ties
        for pair in entries.windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].brand_id < pair[1].brand_id)
            );
        }
    }

    #[test]
    fn pt_summary_bounds_hold(records in prop::collection::vec(record_strategy(), 1..60)) {
        let summary = compute_summary(&records, full_range());
        prop_assert!(summary.min_amount <= summary.average_amount);
        prop_assert!(summary.average_amount <= summary.max_amount);
        prop_assert!(summary.total_distinct_days <= summary.total_count);
        prop_assert!((0.0..=10.0).contains(&summary.average_rating));
        prop_assert_eq!(summary.total_amount.scale(), 2);
    }

    #[test]
    fn pt_calendar_covers_whole_month(
        records in prop::collection::vec(record_strategy(), 0..60),
        month in 1u32..=3,
    ) {
        let calendar = compute_calendar_month(&records, 2025, month).unwrap();
        let expected_days = days_in_month(2025, month).unwrap() as usize;
        prop_assert_eq!(calendar.days.len(), expected_days);
        prop_assert!(calendar.days.windows(2).all(|w| w[0].date < w[1].date));

        let in_month = records.iter().filter(|r| r.consume_date.month() == month).count() as u64;
        prop_assert_eq!(calendar.total_cups, in_month);
        let with_cups = calendar.days.iter().filter(|d| d.has_consumption).count() as u64;
        prop_assert_eq!(calendar.consume_days, with_cups);
        for day in &calendar.days {
            prop_assert_eq!(day.has_consumption, day.count > 0);
        }
    }

    #[test]
    fn pt_trend_keys_increase_and_sum_up(
        records in prop::collection::vec(record_strategy(), 0..60),
        group_by in group_by_strategy(),
    ) {
        let trends = compute_trends(&records, full_range(), group_by);
        let cups = &trends.series.cups_trend;
        let amounts = &trends.series.amount_trend;

        prop_assert_eq!(cups.len(), amounts.len());
        prop_assert!(cups.windows(2).all(|w| w[0].bucket_key < w[1].bucket_key));
        for (c, a) in cups.iter().zip(amounts.iter()) {
            prop_assert_eq!(&c.bucket_key, &a.bucket_key);
        }

        let total_cups: Decimal = cups.iter().map(|p| p.value).sum();
        prop_assert_eq!(total_cups, Decimal::from(records.len() as u64));

        let total_amount: Decimal = amounts.iter().map(|p| p.value).sum();
        let summary = compute_summary(&records, full_range());
        prop_assert_eq!(total_amount, summary.total_amount);
    }

    #[test]
    fn pt_daily_trend_has_one_point_per_day(
        records in prop::collection::vec(record_strategy(), 0..30),
        span in 0u64..90,
    ) {
        let range = DateRange::new(base(), base().checked_add_days(Days::new(span)).unwrap()).unwrap();
        let in_range: Vec<_> = records.into_iter().filter(|r| range.contains(r.consume_date)).collect();
        let trends = compute_trends(&in_range, range, GroupBy::Day);
        prop_assert_eq!(trends.series.cups_trend.len() as u64, span + 1);
    }

    #[test]
    fn pt_aggregation_is_deterministic(records in prop::collection::vec(record_strategy(), 0..40)) {
        prop_assert_eq!(compute_brand_breakdown(&records), compute_brand_breakdown(&records));
        prop_assert_eq!(
            compute_trends(&records, full_range(), GroupBy::Week),
            compute_trends(&records, full_range(), GroupBy::Week)
        );
    }
}
