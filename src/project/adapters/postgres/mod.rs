//! `PostgreSQL` adapters for project lifecycle persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresProjectRepository, ProjectPgPool};
