use super::resource::{required_param, Service};
use crate::error::AppError;
use crate::model::Good;
use crate::response::{success, ApiResponse};
use crate::store::Store;
use axum::{
    extract::{Query, State},
    Json,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

fn decimal_param(params: &HashMap<String, String>, key: &str) -> Result<Decimal, AppError> {
    let raw = required_param(params, key)?;
    Decimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("invalid {}: {}", key, raw)))
}

/// GET /api/goods/byPrice?minPrice=&maxPrice=
pub async fn by_price<S: Store>(
    State(svc): Service<Good, S>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<Good>>>, AppError> {
    let min = decimal_param(&params, "minPrice")?;
    let max = decimal_param(&params, "maxPrice")?;
    Ok(success(svc.by_price_range(min, max).await?))
}
