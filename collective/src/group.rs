//! Participant identity and fixed group membership.
//!
//! Roles are assigned once by whoever provisions the run and are never
//! inferred afterwards; ids are deterministic functions of the role.

use std::num::NonZeroUsize;

use crate::error::{CollectiveError, Result};

/// The id under which the coordinator appears in every group.
pub const COORDINATOR_ID: &str = "Coordinator";

const WORKER_PREFIX: &str = "Worker_";

/// Explicit role assignment for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Worker { index: usize },
}

impl Role {
    /// Stable string identifier for this participant.
    pub fn id(&self) -> String {
        match self {
            Role::Coordinator => COORDINATOR_ID.to_string(),
            Role::Worker { index } => format!("{WORKER_PREFIX}{index}"),
        }
    }
}

/// The fixed set of participants sharing a group for one run's duration.
#[derive(Debug, Clone)]
pub struct GroupMembership {
    worker_num: NonZeroUsize,
}

impl GroupMembership {
    /// Creates a membership of one coordinator and `worker_num` workers.
    ///
    /// # Errors
    /// `EmptyGroup` if `worker_num` is zero.
    pub fn new(worker_num: usize) -> Result<Self> {
        match NonZeroUsize::new(worker_num) {
            Some(worker_num) => Ok(Self { worker_num }),
            None => Err(CollectiveError::EmptyGroup),
        }
    }

    pub fn worker_num(&self) -> usize {
        self.worker_num.get()
    }

    /// Resolves a joining participant id to its worker slot.
    pub fn worker_index(&self, id: &str) -> Option<usize> {
        let index: usize = id.strip_prefix(WORKER_PREFIX)?.parse().ok()?;
        (index < self.worker_num.get()).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_are_stable() {
        assert_eq!(Role::Coordinator.id(), COORDINATOR_ID);
        assert_eq!(Role::Worker { index: 0 }.id(), "Worker_0");
        assert_eq!(Role::Worker { index: 12 }.id(), "Worker_12");
    }

    #[test]
    fn membership_requires_workers() {
        assert!(matches!(
            GroupMembership::new(0),
            Err(CollectiveError::EmptyGroup)
        ));
    }

    #[test]
    fn worker_index_resolution() {
        let membership = GroupMembership::new(2).unwrap();
        assert_eq!(membership.worker_index("Worker_0"), Some(0));
        assert_eq!(membership.worker_index("Worker_1"), Some(1));
        assert_eq!(membership.worker_index("Worker_2"), None);
        assert_eq!(membership.worker_index(COORDINATOR_ID), None);
        assert_eq!(membership.worker_index("Worker_x"), None);
    }
}
