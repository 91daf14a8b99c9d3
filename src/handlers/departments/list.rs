use axum::Json;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Department;
use crate::error::ApiError;

/// GET /api/departments - list all departments
pub async fn get() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, parent_id, name FROM departments ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": departments })))
}
