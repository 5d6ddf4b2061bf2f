use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::constants::MAX_BATCH_DELETE;
use crate::extractors::{JsonBody, QueryParams};
use crate::response::{created, ok, paginated, AppError};
use crate::state::AppState;
use crate::store::operations::records::{ConsumptionRecord, RecordFilter};
use crate::store::Store;
use crate::validation::{
    validate_attribute, validate_brand_id, validate_brand_name, validate_comment,
    validate_consume_date, validate_price, validate_rating,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/batch-delete", post(batch_delete_records))
        .route(
            "/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

fn invalid(message: impl AsRef<str>) -> AppError {
    AppError::bad_request("VALIDATION_ERROR", message.as_ref())
}

/// 读取记录并校验归属：不存在 404，他人记录 403
fn load_owned_record(
    store: &Store,
    user_id: &str,
    record_id: &str,
) -> Result<ConsumptionRecord, AppError> {
    let record = store
        .get_record(record_id)?
        .ok_or_else(|| AppError::not_found("记录不存在"))?;
    if record.user_id != user_id {
        tracing::warn!(user_id, record_id, "Record access denied");
        return Err(AppError::forbidden("无权访问该记录"));
    }
    Ok(record)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListRecordsQuery {
    page: Option<u64>,
    per_page: Option<u64>,
    date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    brand_id: Option<i64>,
    category: Option<String>,
}

async fn list_records(
    auth: AuthUser,
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ListRecordsQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let pagination = &state.config().pagination;
    let page = q.page.unwrap_or(1).max(1);
    let per_page = q
        .per_page
        .unwrap_or(pagination.default_size)
        .clamp(1, pagination.max_size);
    let offset = page.saturating_sub(1).saturating_mul(per_page);

    let filter = RecordFilter {
        date: q.date,
        start_date: q.start_date,
        end_date: q.end_date,
        brand_id: q.brand_id,
        category: q.category.map(|c| c.trim().to_string()),
    };

    let result = state.store().list_user_records(
        &auth.user_id,
        &filter,
        per_page as usize,
        usize::try_from(offset).unwrap_or(usize::MAX),
    )?;
    Ok(paginated(result.records, result.total as u64, page, per_page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRecordRequest {
    brand_id: i64,
    brand_name: String,
    category: String,
    sweetness: String,
    ice_level: String,
    price: Decimal,
    rating: i64,
    comment: Option<String>,
    consume_date: Option<NaiveDate>,
}

async fn create_record(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRecordRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let now = Utc::now();
    let record = ConsumptionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: auth.user_id,
        brand_id: validate_brand_id(req.brand_id).map_err(invalid)?,
        brand_name: validate_brand_name(&req.brand_name).map_err(invalid)?,
        category: validate_attribute("品类", &req.category).map_err(invalid)?,
        sweetness: validate_attribute("甜度", &req.sweetness).map_err(invalid)?,
        ice_level: validate_attribute("冰量", &req.ice_level).map_err(invalid)?,
        price: validate_price(req.price).map_err(invalid)?,
        rating: validate_rating(req.rating).map_err(invalid)?,
        comment: validate_comment(req.comment.as_deref()).map_err(invalid)?,
        consume_date: validate_consume_date(req.consume_date.unwrap_or_else(|| now.date_naive()))
            .map_err(invalid)?,
        created_at: now,
        updated_at: now,
    };

    state.store().create_record(&record)?;
    tracing::info!(
        user_id = %record.user_id,
        record_id = %record.id,
        brand_id = record.brand_id,
        consume_date = %record.consume_date,
        "Record created"
    );
    Ok(created(record))
}

async fn get_record(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = load_owned_record(state.store(), &auth.user_id, &id)?;
    Ok(ok(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRecordRequest {
    brand_id: Option<i64>,
    brand_name: Option<String>,
    category: Option<String>,
    sweetness: Option<String>,
    ice_level: Option<String>,
    price: Option<Decimal>,
    rating: Option<i64>,
    comment: Option<String>,
    consume_date: Option<NaiveDate>,
}

impl UpdateRecordRequest {
    fn apply(self, record: &mut ConsumptionRecord) -> Result<(), AppError> {
        if let Some(brand_id) = self.brand_id {
            record.brand_id = validate_brand_id(brand_id).map_err(invalid)?;
        }
        if let Some(name) = self.brand_name {
            record.brand_name = validate_brand_name(&name).map_err(invalid)?;
        }
        if let Some(category) = self.category {
            record.category = validate_attribute("品类", &category).map_err(invalid)?;
        }
        if let Some(sweetness) = self.sweetness {
            record.sweetness = validate_attribute("甜度", &sweetness).map_err(invalid)?;
        }
        if let Some(ice_level) = self.ice_level {
            record.ice_level = validate_attribute("冰量", &ice_level).map_err(invalid)?;
        }
        if let Some(price) = self.price {
            record.price = validate_price(price).map_err(invalid)?;
        }
        if let Some(rating) = self.rating {
            record.rating = validate_rating(rating).map_err(invalid)?;
        }
        if let Some(comment) = self.comment {
            record.comment = validate_comment(Some(&comment)).map_err(invalid)?;
        }
        if let Some(date) = self.consume_date {
            record.consume_date = validate_consume_date(date).map_err(invalid)?;
        }
        Ok(())
    }
}

async fn update_record(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateRecordRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let mut record = load_owned_record(state.store(), &auth.user_id, &id)?;
    req.apply(&mut record)?;
    record.updated_at = Utc::now();

    state.store().update_record(&record)?;
    tracing::info!(user_id = %auth.user_id, record_id = %record.id, "Record updated");
    Ok(ok(record))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted_count: usize,
}

async fn delete_record(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = load_owned_record(state.store(), &auth.user_id, &id)?;
    let deleted = state.store().delete_record(&record.id)?;
    tracing::info!(user_id = %auth.user_id, record_id = %record.id, "Record deleted");
    Ok(ok(DeleteResponse {
        deleted_count: usize::from(deleted),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchDeleteRequest {
    ids: Vec<String>,
}

async fn batch_delete_records(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<BatchDeleteRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let ids: BTreeSet<String> = req
        .ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        return Err(invalid("ids 不能为空"));
    }
    if ids.len() > MAX_BATCH_DELETE {
        return Err(invalid(format!("单次最多删除{MAX_BATCH_DELETE}条记录")));
    }

    // 先全部校验归属，任何一条失败都不删除
    for id in &ids {
        load_owned_record(state.store(), &auth.user_id, id)?;
    }

    let mut deleted_count = 0;
    for id in &ids {
        if state.store().delete_record(id)? {
            deleted_count += 1;
        }
    }

    tracing::info!(user_id = %auth.user_id, deleted_count, "Records batch deleted");
    Ok(ok(DeleteResponse { deleted_count }))
}
