//! Taskforge: project and task management backend core.
//!
//! This crate implements the access-control and state-transition core of a
//! project/task tracker: users own or participate in projects, projects
//! contain tasks, tasks relate to one another (sub-task, blocking, related),
//! and every membership mutation is governed by a role model.
//!
//! # Architecture
//!
//! Taskforge follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`access`]: Roles, actions, and the static permission table
//! - [`membership`]: Generic (entity, user, role) registry shared by both
//!   bounded contexts
//! - [`project`]: Project lifecycle, membership, and creation factory
//! - [`task`]: Task lifecycle, membership, and the relationship graph

pub mod access;
pub mod error;
pub mod ids;
pub mod membership;
pub mod project;
pub mod task;
