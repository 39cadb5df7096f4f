//! Domain model for project lifecycle management.
//!
//! The project aggregate owns its state machine and date invariants while
//! keeping persistence and permission lookups outside the domain boundary.

mod ids;
mod project;

pub use ids::ProjectId;
pub use project::{ParseProjectStateError, PersistedProjectData, Project, ProjectState};

use crate::membership::Membership;

/// Membership row binding a user to a project.
pub type ProjectMembership = Membership<ProjectId>;
