use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Department;
use crate::error::ApiError;

/// GET /api/departments/:id - show single department
pub async fn get(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let department = sqlx::query_as::<_, Department>(
        "SELECT id, parent_id, name FROM departments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Department not found"))?;

    Ok(Json(json!({ "success": true, "data": department })))
}
