//! User Visits - visits of one user in commit order
//!
//! Holds shared references to the visits stored in the primary map, so a
//! visit is never copied into the index.

use crate::store::Visit;
use std::sync::Arc;

/// Ordered visits of a single user
///
/// Order is the order in which visits were committed to the store, not
/// `visited_at` order.
#[derive(Debug, Clone, Default)]
pub struct UserVisits {
    visits: Vec<Arc<Visit>>,
}

impl UserVisits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, visit: Arc<Visit>) {
        self.visits.push(visit);
    }

    pub fn as_slice(&self) -> &[Arc<Visit>] {
        &self.visits
    }

    pub fn to_vec(&self) -> Vec<Arc<Visit>> {
        self.visits.clone()
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(id: u32, visited_at: i64) -> Arc<Visit> {
        Arc::new(Visit {
            id,
            location: 1,
            user: 1,
            visited_at,
            mark: 3,
        })
    }

    #[test]
    fn test_keeps_commit_order() {
        let mut visits = UserVisits::new();
        assert!(visits.is_empty());

        visits.push(visit(3, 1_200_000_000));
        visits.push(visit(1, 1_000_000_000));
        visits.push(visit(2, 1_100_000_000));

        let ids: Vec<u32> = visits.as_slice().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(visits.len(), 3);
    }

    #[test]
    fn test_shares_visits() {
        let shared = visit(1, 1_000_000_000);
        let mut visits = UserVisits::new();
        visits.push(Arc::clone(&shared));

        assert!(Arc::ptr_eq(&visits.to_vec()[0], &shared));
    }
}
