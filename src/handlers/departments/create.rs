use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::services::DepartmentService;

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
    /// Absent or `0` means a new root-level department.
    pub parent_id: Option<i64>,
}

/// POST /api/departments - create a department with an allocated id
pub async fn post(
    Json(req): Json<DepartmentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let service = DepartmentService::new().await?;
    let id = service.create(&req.name, req.parent_id).await?;

    info!(id, parent_id = ?req.parent_id, "created department");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": { "id": id } })),
    ))
}
