//! Decimal identifier arithmetic for the department tree.
//!
//! Department ids encode tree depth positionally: a node's children occupy
//! ids obtained by adding multiples of `10^(z-1)` to the parent id, where
//! `z` is the parent's trailing-zero count. An id whose last digit is
//! non-zero has no digit position left for children.

pub type DepartmentId = i64;

/// Ids must stay strictly below this bound (four decimal digits).
pub const MAX_ID: DepartmentId = 10_000;

/// Each parent has exactly this many candidate child slots.
pub const MAX_CHILD_SLOTS: usize = 8;

/// Root id handed out when the table is empty. The digit-bucket formula is
/// undefined for an empty table, so the first root is pinned here; it
/// leaves three levels of child keyspace below every root within [`MAX_ID`].
pub const FIRST_ROOT_ID: DepartmentId = 1_000;

/// Count of trailing zero digits in the decimal representation of `id`.
pub fn trailing_zeros(id: DepartmentId) -> u32 {
    debug_assert!(id > 0);
    let mut n = id;
    let mut zeros = 0;
    while n % 10 == 0 {
        n /= 10;
        zeros += 1;
    }
    zeros
}

/// Decimal digit count of `id`.
pub fn digits(id: DepartmentId) -> u32 {
    debug_assert!(id > 0);
    let mut n = id;
    let mut count = 0;
    while n > 0 {
        n /= 10;
        count += 1;
    }
    count
}

/// Spacing between sibling child ids under `parent`, or `None` when the
/// parent's last digit is non-zero and it cannot have children at all.
pub fn child_increment(parent: DepartmentId) -> Option<DepartmentId> {
    let z = trailing_zeros(parent);
    if z == 0 {
        return None;
    }
    Some(10_i64.pow(z - 1))
}

/// The ordered candidate child ids for `parent`: `parent + i * increment`
/// for `i` in `1..=MAX_CHILD_SLOTS`.
pub fn child_candidates(parent: DepartmentId) -> Option<Vec<DepartmentId>> {
    let increment = child_increment(parent)?;
    Some(
        (1..=MAX_CHILD_SLOTS as i64)
            .map(|i| parent + i * increment)
            .collect(),
    )
}

/// Round `max_id` up to the start of the next leading-digit bucket:
/// `2345 -> 3000`, `999 -> 1000`, `1000 -> 2000`.
pub fn next_root_bucket(max_id: DepartmentId) -> DepartmentId {
    let scale = 10_i64.pow(digits(max_id) - 1);
    (max_id / scale) * scale + scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_trailing_zeros() {
        assert_eq!(trailing_zeros(900), 2);
        assert_eq!(trailing_zeros(1000), 3);
        assert_eq!(trailing_zeros(1230), 1);
        assert_eq!(trailing_zeros(7), 0);
    }

    #[test]
    fn child_increment_scales_with_depth() {
        assert_eq!(child_increment(1000), Some(100));
        assert_eq!(child_increment(900), Some(10));
        assert_eq!(child_increment(910), Some(1));
        assert_eq!(child_increment(911), None);
        assert_eq!(child_increment(2345), None);
    }

    #[test]
    fn candidates_are_eight_evenly_spaced_slots() {
        let cands = child_candidates(900).unwrap();
        assert_eq!(cands, vec![910, 920, 930, 940, 950, 960, 970, 980]);
        assert!(child_candidates(901).is_none());
    }

    #[test]
    fn root_bucket_rounds_to_next_leading_digit() {
        assert_eq!(next_root_bucket(2345), 3000);
        assert_eq!(next_root_bucket(999), 1000);
        assert_eq!(next_root_bucket(1000), 2000);
        assert_eq!(next_root_bucket(9), 10);
        assert_eq!(next_root_bucket(9000), 10_000);
    }
}
