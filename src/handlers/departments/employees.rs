use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::DepartmentService;

/// GET /api/departments/:id/employees - employees of the department and
/// every descendant department
pub async fn get(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let service = DepartmentService::new().await?;
    let employees = service.subtree_employees(id).await?;

    Ok(Json(json!({ "success": true, "data": employees })))
}
