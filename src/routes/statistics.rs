use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::extractors::QueryParams;
use crate::response::{ok, AppError};
use crate::services::statistics::StatisticsService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/brands", get(get_brands))
        .route("/trends", get(get_trends))
        .route("/calendar/:year/:month", get(get_calendar))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendsQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    group_by: Option<String>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn get_summary(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(q): QueryParams<RangeQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let service = StatisticsService::new(state.store(), &state.config().stats);
    let summary = service.summary(&auth.user_id, q.start_date, q.end_date, today())?;
    Ok(ok(summary))
}

async fn get_brands(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(q): QueryParams<RangeQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let service = StatisticsService::new(state.store(), &state.config().stats);
    let brands = service.brands(&auth.user_id, q.start_date, q.end_date, today())?;
    Ok(ok(brands))
}

async fn get_trends(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(q): QueryParams<TrendsQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let service = StatisticsService::new(state.store(), &state.config().stats);
    let trends = service.trends(
        &auth.user_id,
        q.start_date,
        q.end_date,
        q.group_by.as_deref(),
        today(),
    )?;
    Ok(ok(trends))
}

async fn get_calendar(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    // 路径段手动解析，非数字也返回 INVALID_ARGUMENT
    let year: i32 = year
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request("INVALID_ARGUMENT", "年份格式无效"))?;
    let month: u32 = month
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request("INVALID_ARGUMENT", "月份格式无效"))?;

    let service = StatisticsService::new(state.store(), &state.config().stats);
    let calendar = service.calendar(&auth.user_id, year, month)?;
    Ok(ok(calendar))
}
