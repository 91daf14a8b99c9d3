//! In-memory [`DepartmentStore`] fake for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::tree::ids::DepartmentId;
use crate::tree::store::{DepartmentRow, DepartmentStore, StoreError};

#[derive(Default)]
struct Inner {
    rows: BTreeMap<DepartmentId, DepartmentRow>,
    forced_conflicts: u32,
    insert_calls: u32,
}

/// A departments table held in a `BTreeMap`, with a knob to simulate a
/// concurrent writer stealing the next allocated id.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Insert a row directly, bypassing allocation.
    pub fn seed(&self, id: DepartmentId, parent_id: Option<DepartmentId>, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.rows.insert(
            id,
            DepartmentRow {
                id,
                parent_id,
                name: name.to_string(),
            },
        );
    }

    /// Make the next `insert` behave as if a concurrent caller had just
    /// taken the same id: the row appears under a competitor's name and
    /// the call reports a uniqueness violation.
    pub fn fail_next_insert_with_conflict(&self) {
        self.inner.lock().unwrap().forced_conflicts += 1;
    }

    /// How many times `insert` has been called.
    pub fn insert_calls(&self) -> u32 {
        self.inner.lock().unwrap().insert_calls
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn node(&self, id: DepartmentId) -> Result<Option<DepartmentRow>, StoreError> {
        Ok(self.inner.lock().unwrap().rows.get(&id).cloned())
    }

    async fn existing_ids(
        &self,
        candidates: &[DepartmentId],
    ) -> Result<Vec<DepartmentId>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut found: Vec<DepartmentId> = candidates
            .iter()
            .copied()
            .filter(|id| inner.rows.contains_key(id))
            .collect();
        found.sort_unstable();
        Ok(found)
    }

    async fn max_id(&self) -> Result<Option<DepartmentId>, StoreError> {
        Ok(self.inner.lock().unwrap().rows.keys().next_back().copied())
    }

    async fn children_of(
        &self,
        parents: &[DepartmentId],
    ) -> Result<Vec<DepartmentRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .values()
            .filter(|row| row.parent_id.is_some_and(|p| parents.contains(&p)))
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        id: DepartmentId,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> Result<DepartmentId, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.insert_calls += 1;

        if inner.forced_conflicts > 0 {
            inner.forced_conflicts -= 1;
            inner.rows.insert(
                id,
                DepartmentRow {
                    id,
                    parent_id,
                    name: "competitor".to_string(),
                },
            );
            return Err(StoreError::UniqueViolation(id));
        }

        if inner.rows.contains_key(&id) {
            return Err(StoreError::UniqueViolation(id));
        }
        inner.rows.insert(
            id,
            DepartmentRow {
                id,
                parent_id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }
}
