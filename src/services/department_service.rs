use sqlx::PgPool;

use crate::config::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Employee;
use crate::tree::{
    self, CreateError, DepartmentId, PgDepartmentStore, StoreError, SubtreeMaterializer,
    SubtreeRow,
};

/// Department operations that go through the tree core: id allocation on
/// create and subtree materialization on read.
pub struct DepartmentService {
    store: PgDepartmentStore,
    pool: PgPool,
}

impl DepartmentService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self::with_pool(pool))
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            store: PgDepartmentStore::new(pool.clone()),
            pool,
        }
    }

    /// Allocate an id for the new department and insert it, retrying a
    /// bounded number of times when concurrent creation contends for the
    /// same slot.
    pub async fn create(
        &self,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> Result<DepartmentId, CreateError> {
        let max_attempts = config().allocator.max_insert_attempts;
        tree::create_node(&self.store, name, parent_id, max_attempts).await
    }

    /// The department and all of its descendants, with level and ancestry
    /// path. Empty when the department does not exist.
    pub async fn subtree(&self, root: DepartmentId) -> Result<Vec<SubtreeRow>, StoreError> {
        SubtreeMaterializer::new(&self.store).materialize(root).await
    }

    /// Employees of the department and every descendant department,
    /// ordered by `(department_id, name)`.
    pub async fn subtree_employees(
        &self,
        root: DepartmentId,
    ) -> Result<Vec<Employee>, StoreError> {
        let rows = self.subtree(root).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DepartmentId> = rows.iter().map(|r| r.id).collect();

        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, department_id, position, hire_date, employee_number, large_text \
             FROM employees WHERE department_id = ANY($1) ORDER BY department_id, name",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }
}
