//! Unit tests for the task bounded context.

mod domain_tests;
mod relation_tests;
