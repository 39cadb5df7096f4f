//! Project lifecycle management.
//!
//! Projects are created through a factory that atomically persists the row
//! and grants the creator Owner membership, then mutated only through intent
//! methods: state transitions over {Active, Inactive, Archived}, start/end
//! date tracking, and membership management. The module follows hexagonal
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
