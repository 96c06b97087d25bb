use super::resource::Service;
use crate::error::AppError;
use crate::model::Category;
use crate::response::{success, ApiResponse};
use crate::store::Store;
use axum::{extract::State, Json};

/// GET /api/categories/sorted
pub async fn sorted<S: Store>(
    State(svc): Service<Category, S>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    Ok(success(svc.sorted().await?))
}
