//! Domain model for task lifecycle management.
//!
//! The task aggregate owns its state machine and date invariants; the
//! relationship graph is modelled as directed, typed edges with a total
//! inverse mapping so every logical link is stored as a symmetric pair.

mod ids;
mod relation;
mod task;

pub use ids::TaskId;
pub use relation::{ParseRelationKindError, RelationKind, TaskRelation};
pub use task::{NewTaskData, ParseTaskStateError, PersistedTaskData, Task, TaskState};

use crate::membership::Membership;

/// Membership row binding a user to a task.
pub type TaskMembership = Membership<TaskId>;
