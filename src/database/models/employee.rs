use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub position: String,
    pub hire_date: NaiveDate,
    pub employee_number: String,
    pub large_text: Option<String>,
}
