use thiserror::Error;
use tracing::debug;

use crate::tree::ids::{self, DepartmentId, MAX_ID};
use crate::tree::store::{DepartmentStore, StoreError};

/// Allocation failures. The first three are terminal for the request; a
/// store error carries whatever the database reported.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("parent id {0} has no trailing zero digit and cannot have children")]
    InvalidParent(DepartmentId),

    #[error("parent id {0} already has the maximum number of children")]
    SlotsExhausted(DepartmentId),

    #[error("computed id {0} is outside the valid id range")]
    OutOfRange(DepartmentId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes the next available department id in a parent's sparse child
/// keyspace, or the next top-level bucket when no parent is given.
///
/// Stateless apart from the probes it issues; the caller performs the
/// insert and owns conflict retry (see [`crate::tree::create_node`]).
pub struct IdAllocator<'a, S: DepartmentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DepartmentStore + ?Sized> IdAllocator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Allocate an id under `parent`, or at the root level when `parent`
    /// is `None`. The returned id is not reserved: concurrent callers can
    /// compute the same one, and the store's uniqueness constraint picks
    /// the winner at insert time.
    pub async fn allocate(
        &self,
        parent: Option<DepartmentId>,
    ) -> Result<DepartmentId, AllocError> {
        // A parent of 0 means root level, same as no parent at all.
        let id = match parent.filter(|&p| p != 0) {
            Some(parent) => self.allocate_child(parent).await?,
            None => self.allocate_root().await?,
        };

        if id == 0 || id >= MAX_ID {
            return Err(AllocError::OutOfRange(id));
        }
        Ok(id)
    }

    /// Walk the parent's eight candidate slots in lock-step with the
    /// sorted existing-id probe. The first candidate missing from the
    /// probe result is the answer, so gaps left by deletions are refilled
    /// before anything is appended at the tail.
    async fn allocate_child(&self, parent: DepartmentId) -> Result<DepartmentId, AllocError> {
        if parent < 0 {
            return Err(AllocError::InvalidParent(parent));
        }
        let candidates =
            ids::child_candidates(parent).ok_or(AllocError::InvalidParent(parent))?;

        let existing = self.store.existing_ids(&candidates).await?;
        let mut taken = existing.into_iter().peekable();

        for candidate in candidates {
            match taken.peek() {
                Some(&id) if id == candidate => {
                    taken.next();
                }
                _ => {
                    debug!(parent, candidate, "allocated child slot");
                    return Ok(candidate);
                }
            }
        }

        Err(AllocError::SlotsExhausted(parent))
    }

    /// Round the current maximum id up to the start of the next
    /// leading-digit bucket; an empty table starts at a fixed first root.
    async fn allocate_root(&self) -> Result<DepartmentId, AllocError> {
        let id = match self.store.max_id().await?.filter(|&max| max > 0) {
            Some(max) => ids::next_root_bucket(max),
            None => ids::FIRST_ROOT_ID,
        };
        debug!(id, "allocated root bucket");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn rejects_parent_without_trailing_zero() {
        let store = MemoryStore::default();
        store.seed(2345, None, "ops");

        let err = IdAllocator::new(&store).allocate(Some(2345)).await.unwrap_err();
        assert!(matches!(err, AllocError::InvalidParent(2345)));
    }

    #[tokio::test]
    async fn rejects_negative_parent() {
        let store = MemoryStore::default();

        let err = IdAllocator::new(&store).allocate(Some(-900)).await.unwrap_err();
        assert!(matches!(err, AllocError::InvalidParent(-900)));
    }

    #[tokio::test]
    async fn zero_parent_allocates_at_root_level() {
        let store = MemoryStore::default();
        store.seed(2345, None, "hq");

        let id = IdAllocator::new(&store).allocate(Some(0)).await.unwrap();
        assert_eq!(id, 3000);
    }

    #[tokio::test]
    async fn first_child_takes_first_slot() {
        let store = MemoryStore::default();
        store.seed(900, None, "eng");

        let id = IdAllocator::new(&store).allocate(Some(900)).await.unwrap();
        assert_eq!(id, 910);
    }

    #[tokio::test]
    async fn fills_lowest_gap_before_appending() {
        let store = MemoryStore::default();
        store.seed(900, None, "eng");
        store.seed(910, Some(900), "backend");
        store.seed(930, Some(900), "frontend");

        let id = IdAllocator::new(&store).allocate(Some(900)).await.unwrap();
        assert_eq!(id, 920);
    }

    #[tokio::test]
    async fn appends_at_tail_when_contiguous() {
        let store = MemoryStore::default();
        store.seed(900, None, "eng");
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            store.seed(910 + 10 * i as i64, Some(900), name);
        }

        let id = IdAllocator::new(&store).allocate(Some(900)).await.unwrap();
        assert_eq!(id, 940);
    }

    #[tokio::test]
    async fn fails_when_all_slots_taken() {
        let store = MemoryStore::default();
        store.seed(900, None, "eng");
        for i in 1..=8 {
            store.seed(900 + 10 * i, Some(900), "team");
        }

        let err = IdAllocator::new(&store).allocate(Some(900)).await.unwrap_err();
        assert!(matches!(err, AllocError::SlotsExhausted(900)));
    }

    #[tokio::test]
    async fn root_allocation_rounds_to_next_bucket() {
        let store = MemoryStore::default();
        store.seed(2345, None, "hq");

        let id = IdAllocator::new(&store).allocate(None).await.unwrap();
        assert_eq!(id, 3000);
    }

    #[tokio::test]
    async fn root_allocation_on_empty_store_uses_first_root() {
        let store = MemoryStore::default();

        let id = IdAllocator::new(&store).allocate(None).await.unwrap();
        assert_eq!(id, ids::FIRST_ROOT_ID);
    }

    #[tokio::test]
    async fn root_allocation_past_range_fails() {
        let store = MemoryStore::default();
        store.seed(9000, None, "hq");

        let err = IdAllocator::new(&store).allocate(None).await.unwrap_err();
        assert!(matches!(err, AllocError::OutOfRange(10_000)));
    }

    #[tokio::test]
    async fn deep_child_increment_follows_trailing_zeros() {
        let store = MemoryStore::default();
        store.seed(1000, None, "hq");
        store.seed(1100, Some(1000), "eng");
        store.seed(1110, Some(1100), "backend");

        let alloc = IdAllocator::new(&store);
        assert_eq!(alloc.allocate(Some(1000)).await.unwrap(), 1200);
        assert_eq!(alloc.allocate(Some(1100)).await.unwrap(), 1120);
        assert_eq!(alloc.allocate(Some(1110)).await.unwrap(), 1111);
    }
}
