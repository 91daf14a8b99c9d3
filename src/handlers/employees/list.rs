use axum::Json;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Employee;
use crate::error::ApiError;

/// GET /api/employees - list all employees
pub async fn get() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, name, department_id, position, hire_date, employee_number, large_text \
         FROM employees ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": employees })))
}
