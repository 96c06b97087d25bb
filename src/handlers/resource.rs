//! Handlers shared by every resource: create, read, page, update, delete, search.
//! Each is generic over the entity and mounted once per resource with that resource's service.

use crate::error::AppError;
use crate::extractors::{EntityId, ValidJson};
use crate::response::{success, success_empty, ApiResponse, PageData};
use crate::service::{EntityService, Resource};
use crate::store::Store;
use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

pub type Service<E, S> = State<Arc<EntityService<E, S>>>;

/// Optional numeric query parameter; unparsable values fall back to the default.
fn number_param(params: &HashMap<String, String>, key: &str) -> Option<u32> {
    params.get(key).and_then(|v| v.trim().parse().ok())
}

pub(crate) fn required_param<'a>(
    params: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, AppError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::BadRequest(format!("missing query parameter: {}", key)))
}

pub async fn create<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    ValidJson(body): ValidJson<E::Create>,
) -> Result<Json<ApiResponse<E>>, AppError> {
    Ok(success(svc.create(body).await?))
}

pub async fn read<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<E>>, AppError> {
    Ok(success(svc.get(id).await?))
}

pub async fn page<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageData<E>>>, AppError> {
    let page = number_param(&params, "page");
    let size = number_param(&params, "size");
    Ok(success(svc.page(page, size).await?))
}

pub async fn update<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    EntityId(id): EntityId,
    ValidJson(body): ValidJson<E::Update>,
) -> Result<Json<ApiResponse<E>>, AppError> {
    Ok(success(svc.update(id, body).await?))
}

pub async fn delete<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    EntityId(id): EntityId,
) -> Result<Json<ApiResponse<()>>, AppError> {
    svc.delete(id).await?;
    Ok(success_empty())
}

pub async fn search<E: Resource, S: Store>(
    State(svc): Service<E, S>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<Vec<E>>>, AppError> {
    let keyword = required_param(&params, "keyword")?;
    Ok(success(svc.search(keyword).await?))
}

/// Envelope for paths no route matches.
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
