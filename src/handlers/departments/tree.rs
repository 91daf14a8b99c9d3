use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::DepartmentService;

/// GET /api/departments/:id/tree - the department and all descendants,
/// each with level and ancestry path. An unknown id yields an empty list.
pub async fn get(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let service = DepartmentService::new().await?;
    let rows = service.subtree(id).await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}
