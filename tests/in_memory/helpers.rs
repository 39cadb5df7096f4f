//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskforge::ids::UserId;
use taskforge::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::Project,
    services::{CreateProjectRequest, ProjectService},
};
use taskforge::task::{
    adapters::memory::InMemoryTaskRepository, domain::Task, services::CreateTaskRequest,
    services::TaskService,
};

/// Project service type used by the in-memory suite.
pub type TestProjectService = ProjectService<InMemoryProjectRepository, DefaultClock>;

/// Task service type used by the in-memory suite.
pub type TestTaskService =
    TaskService<InMemoryTaskRepository, InMemoryProjectRepository, DefaultClock>;

/// Both services wired over a shared project repository.
pub struct Services {
    /// Project lifecycle service.
    pub projects: TestProjectService,
    /// Task lifecycle service.
    pub tasks: TestTaskService,
}

/// Provides fresh services backed by empty in-memory repositories.
#[fixture]
pub fn services() -> Services {
    let project_repo = Arc::new(InMemoryProjectRepository::new());
    let clock = Arc::new(DefaultClock);
    Services {
        projects: ProjectService::new(Arc::clone(&project_repo), Arc::clone(&clock)),
        tasks: TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            project_repo,
            clock,
        ),
    }
}

/// Creates a project owned by `owner`.
///
/// # Errors
///
/// Returns an error when project creation fails.
pub async fn create_project(services: &Services, owner: UserId) -> eyre::Result<Project> {
    Ok(services
        .projects
        .create(CreateProjectRequest::new("Integration host", owner))
        .await?)
}

/// Creates a task under `project` authored by `author`.
///
/// # Errors
///
/// Returns an error when task creation fails.
pub async fn create_task(
    services: &Services,
    project: &Project,
    author: UserId,
    title: &str,
) -> eyre::Result<Task> {
    Ok(services
        .tasks
        .create(CreateTaskRequest::new(project.id(), author, title))
        .await?)
}
