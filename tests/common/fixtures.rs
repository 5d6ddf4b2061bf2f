use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use teatrack_backend::store::operations::records::ConsumptionRecord;
use teatrack_backend::store::Store;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn build_record(
    user_id: &str,
    brand_id: i64,
    brand_name: &str,
    price: Decimal,
    rating: u8,
    consume_date: NaiveDate,
) -> ConsumptionRecord {
    let now = Utc::now();
    ConsumptionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        brand_id,
        brand_name: brand_name.to_string(),
        category: "奶茶".to_string(),
        sweetness: "半糖".to_string(),
        ice_level: "少冰".to_string(),
        price,
        rating,
        comment: None,
        consume_date,
        created_at: now,
        updated_at: now,
    }
}

/// 直接写入 store，绕过 HTTP 校验
pub fn seed_record(
    store: &Store,
    user_id: &str,
    brand_id: i64,
    brand_name: &str,
    price: Decimal,
    rating: u8,
    consume_date: NaiveDate,
) -> ConsumptionRecord {
    let record = build_record(user_id, brand_id, brand_name, price, rating, consume_date);
    store.create_record(&record).expect("seed record");
    record
}
