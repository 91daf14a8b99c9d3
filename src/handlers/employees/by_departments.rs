use axum::Json;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::Employee;
use crate::error::ApiError;

/// POST /api/employees/by-departments - employees for a set of department
/// ids, body is a JSON array of ids
pub async fn post(Json(department_ids): Json<Vec<i64>>) -> Result<Json<Value>, ApiError> {
    if department_ids.is_empty() {
        return Ok(Json(json!({ "success": true, "data": [] })));
    }

    let pool = DatabaseManager::pool().await?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, name, department_id, position, hire_date, employee_number, large_text \
         FROM employees WHERE department_id = ANY($1) ORDER BY department_id, id",
    )
    .bind(&department_ids)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": employees })))
}
