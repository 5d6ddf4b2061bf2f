//! 消费记录输入校验，供创建 / 更新路由共用。
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{
    MAX_ATTRIBUTE_CHARS, MAX_BRAND_NAME_CHARS, MAX_COMMENT_CHARS, MAX_CONSUME_YEAR,
    MAX_PRICE_CENTS, MAX_RATING, MIN_CONSUME_YEAR,
};
use crate::stats::MONEY_SCALE;

pub fn validate_brand_id(brand_id: i64) -> Result<i64, &'static str> {
    if brand_id <= 0 {
        return Err("品牌ID必须为正整数");
    }
    Ok(brand_id)
}

/// 品牌名：去除首尾空白后 1-100 个字符
pub fn validate_brand_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    let count = trimmed.chars().count();
    if count == 0 {
        return Err("品牌名称不能为空");
    }
    if count > MAX_BRAND_NAME_CHARS {
        return Err("品牌名称不能超过100个字符");
    }
    Ok(trimmed.to_string())
}

/// 品类、甜度、冰量：去除首尾空白后 1-50 个字符
pub fn validate_attribute(label: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    let count = trimmed.chars().count();
    if count == 0 {
        return Err(format!("{label}不能为空"));
    }
    if count > MAX_ATTRIBUTE_CHARS {
        return Err(format!("{label}不能超过{MAX_ATTRIBUTE_CHARS}个字符"));
    }
    Ok(trimmed.to_string())
}

/// 价格归一化为两位小数（四舍五入），范围 0 ~ 99999999.99
pub fn validate_price(price: Decimal) -> Result<Decimal, &'static str> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("价格不能为负数");
    }
    let mut normalized =
        price.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    normalized.rescale(MONEY_SCALE);
    if normalized > Decimal::new(MAX_PRICE_CENTS, MONEY_SCALE) {
        return Err("价格超出允许范围");
    }
    Ok(normalized)
}

pub fn validate_rating(rating: i64) -> Result<u8, &'static str> {
    u8::try_from(rating)
        .ok()
        .filter(|r| *r <= MAX_RATING)
        .ok_or("评分需在0到10之间")
}

/// 空白备注视为未填写
pub fn validate_comment(comment: Option<&str>) -> Result<Option<String>, &'static str> {
    let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err("备注不能超过500个字符");
    }
    Ok(Some(comment.to_string()))
}

/// 存储键使用四位年份，超出范围的日期会打乱键序
pub fn validate_consume_date(date: NaiveDate) -> Result<NaiveDate, &'static str> {
    if !(MIN_CONSUME_YEAR..=MAX_CONSUME_YEAR).contains(&date.year()) {
        return Err("消费日期年份需在1到9999之间");
    }
    Ok(date)
}
