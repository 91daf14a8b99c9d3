use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use crate::tree::ids::DepartmentId;

/// One row of the departments table as the tree core sees it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DepartmentRow {
    pub id: DepartmentId,
    pub parent_id: Option<DepartmentId>,
    pub name: String,
}

/// Errors from the department store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("department id {0} already exists")]
    UniqueViolation(DepartmentId),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Narrow persistence seam consulted by the allocator and materializer.
///
/// Injected rather than reached through a global handle so both components
/// stay testable against the in-memory fake in `crate::testing`.
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Fetch a single department, `None` when absent.
    async fn node(&self, id: DepartmentId) -> Result<Option<DepartmentRow>, StoreError>;

    /// The subset of `candidates` present in the table, ascending.
    async fn existing_ids(
        &self,
        candidates: &[DepartmentId],
    ) -> Result<Vec<DepartmentId>, StoreError>;

    /// Largest id in the table, or `None` when the table is empty.
    async fn max_id(&self) -> Result<Option<DepartmentId>, StoreError>;

    /// All departments whose `parent_id` is one of `parents`.
    async fn children_of(
        &self,
        parents: &[DepartmentId],
    ) -> Result<Vec<DepartmentRow>, StoreError>;

    /// Insert a department with a pre-allocated id. A primary-key clash
    /// surfaces as [`StoreError::UniqueViolation`]; the creation path treats
    /// that as a lost allocation race and retries.
    async fn insert(
        &self,
        id: DepartmentId,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> Result<DepartmentId, StoreError>;
}

/// Postgres-backed store over a shared connection pool.
pub struct PgDepartmentStore {
    pool: PgPool,
}

impl PgDepartmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentStore for PgDepartmentStore {
    async fn node(&self, id: DepartmentId) -> Result<Option<DepartmentRow>, StoreError> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, parent_id, name FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn existing_ids(
        &self,
        candidates: &[DepartmentId],
    ) -> Result<Vec<DepartmentId>, StoreError> {
        let ids = sqlx::query_scalar::<_, DepartmentId>(
            "SELECT id FROM departments WHERE id = ANY($1) ORDER BY id",
        )
        .bind(candidates)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn max_id(&self) -> Result<Option<DepartmentId>, StoreError> {
        let max = sqlx::query_scalar::<_, Option<DepartmentId>>(
            "SELECT max(id) FROM departments",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(max)
    }

    async fn children_of(
        &self,
        parents: &[DepartmentId],
    ) -> Result<Vec<DepartmentRow>, StoreError> {
        let rows = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, parent_id, name FROM departments WHERE parent_id = ANY($1) ORDER BY id",
        )
        .bind(parents)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(
        &self,
        id: DepartmentId,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> Result<DepartmentId, StoreError> {
        let inserted = sqlx::query_scalar::<_, DepartmentId>(
            "INSERT INTO departments (id, name, parent_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(id)
        .bind(name)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::UniqueViolation(id),
            _ => StoreError::Sqlx(e),
        })?;
        Ok(inserted)
    }
}
