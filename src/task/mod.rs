//! Task lifecycle management and the task relationship graph.
//!
//! Task creation is gated by project-level permission and atomically grants
//! the author Owner membership on the task. Tasks carry a five-state
//! lifecycle machine and relate to one another through typed, paired edges
//! (parent/sub, blocking/blocked-by, related) whose inverse counterpart is
//! always written and removed together. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
