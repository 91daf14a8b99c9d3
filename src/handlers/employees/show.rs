use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Employee;
use crate::error::ApiError;

/// GET /api/employees/:id - show single employee
pub async fn get(Path(id): Path<i64>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, name, department_id, position, hire_date, employee_number, large_text \
         FROM employees WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    Ok(Json(json!({ "success": true, "data": employee })))
}
