//! User lookups by handle, role and status.

use super::resource::Service;
use crate::error::AppError;
use crate::model::User;
use crate::response::{success, ApiResponse};
use crate::store::Store;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn by_username<S: Store>(
    State(svc): Service<User, S>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    Ok(success(svc.by_username(&username).await?))
}

pub async fn by_role<S: Store>(
    State(svc): Service<User, S>,
    Path(role): Path<String>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    Ok(success(svc.by_role(&role).await?))
}

pub async fn by_status<S: Store>(
    State(svc): Service<User, S>,
    Path(status): Path<String>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let status: i32 = status
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid status: {}", status)))?;
    Ok(success(svc.by_status(status).await?))
}
