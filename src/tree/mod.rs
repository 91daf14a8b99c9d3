//! Department tree core: sparse id allocation with gap-filling and the
//! subtree closure used to materialize a whole branch in one pass.

pub mod alloc;
pub mod closure;
pub mod ids;
pub mod store;

use thiserror::Error;
use tracing::warn;

pub use alloc::{AllocError, IdAllocator};
pub use closure::{SubtreeMaterializer, SubtreeRow};
pub use ids::DepartmentId;
pub use store::{DepartmentRow, DepartmentStore, PgDepartmentStore, StoreError};

/// Failures from the allocate-then-insert creation path.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Store(StoreError),

    #[error("gave up creating department after {attempts} contended attempts")]
    Contended { attempts: u32 },
}

/// Allocate an id and insert the department, retrying the whole sequence
/// when a concurrent caller wins the same slot.
///
/// The allocator's probe and the insert are not atomic; the table's
/// primary-key constraint arbitrates races, and a uniqueness violation
/// here just means re-probe. Anything else aborts immediately.
pub async fn create_node<S: DepartmentStore + ?Sized>(
    store: &S,
    name: &str,
    parent: Option<DepartmentId>,
    max_attempts: u32,
) -> Result<DepartmentId, CreateError> {
    // parent_id 0 in a request means "root level", same as absent.
    let parent = parent.filter(|&p| p != 0);

    let allocator = IdAllocator::new(store);
    for attempt in 1..=max_attempts {
        let id = allocator.allocate(parent).await?;
        match store.insert(id, name, parent).await {
            Ok(id) => return Ok(id),
            Err(StoreError::UniqueViolation(id)) => {
                warn!(id, attempt, max_attempts, "lost allocation race, retrying");
            }
            Err(e) => return Err(CreateError::Store(e)),
        }
    }

    Err(CreateError::Contended {
        attempts: max_attempts,
    })
}
