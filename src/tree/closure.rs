use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::tree::ids::DepartmentId;
use crate::tree::store::{DepartmentStore, StoreError};

/// One department in a materialized subtree, annotated with its depth
/// below the requested root and its comma-joined ancestry path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtreeRow {
    pub id: DepartmentId,
    pub name: String,
    pub parent_id: Option<DepartmentId>,
    pub level: u32,
    pub path: String,
}

/// Materializes the full descendant set of a root department in one pass.
///
/// Expansion is an iterative fixpoint over `children_of`: each round fetches
/// the children of everything discovered in the previous round and stops
/// when a round discovers nothing new, so traversal is bounded by the
/// actual tree depth.
pub struct SubtreeMaterializer<'a, S: DepartmentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DepartmentStore + ?Sized> SubtreeMaterializer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Return the root and every descendant, one row per id, ordered by
    /// `(level, parent_id, id)`. An absent root yields an empty sequence.
    ///
    /// If the parent graph is malformed and a node is reachable by more
    /// than one path, only the occurrence with the lexicographically
    /// smallest path string is kept; an already-seen node is never
    /// re-expanded, which also keeps cyclic graphs from looping forever.
    pub async fn materialize(
        &self,
        root: DepartmentId,
    ) -> Result<Vec<SubtreeRow>, StoreError> {
        let Some(root_row) = self.store.node(root).await? else {
            return Ok(Vec::new());
        };

        let mut rows: BTreeMap<DepartmentId, SubtreeRow> = BTreeMap::new();
        rows.insert(
            root,
            SubtreeRow {
                id: root,
                name: root_row.name,
                parent_id: root_row.parent_id,
                level: 0,
                path: root.to_string(),
            },
        );

        let mut frontier = vec![root];
        while !frontier.is_empty() {
            let children = self.store.children_of(&frontier).await?;
            let mut next = Vec::new();

            for child in children {
                let Some(parent_id) = child.parent_id else {
                    continue;
                };
                let Some(parent) = rows.get(&parent_id) else {
                    continue;
                };
                let row = SubtreeRow {
                    id: child.id,
                    name: child.name,
                    parent_id: child.parent_id,
                    level: parent.level + 1,
                    path: format!("{},{}", parent.path, child.id),
                };

                match rows.entry(child.id) {
                    Entry::Vacant(slot) => {
                        slot.insert(row);
                        next.push(child.id);
                    }
                    Entry::Occupied(mut slot) => {
                        // Duplicate reachability: keep the smallest path.
                        if row.path < slot.get().path {
                            slot.insert(row);
                        }
                    }
                }
            }

            frontier = next;
        }

        let mut out: Vec<SubtreeRow> = rows.into_values().collect();
        out.sort_by_key(|r| (r.level, r.parent_id.unwrap_or(0), r.id));
        Ok(out)
    }
}
