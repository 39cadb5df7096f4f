//! End-to-end scenarios spanning the project and task services.

use super::helpers::{Services, create_task, services};
use eyre::ensure;
use rstest::rstest;
use taskforge::access::Action;
use taskforge::error::DomainError;
use taskforge::ids::UserId;
use taskforge::project::domain::ProjectState;
use taskforge::project::services::{CreateProjectRequest, ProjectServiceError};
use taskforge::task::domain::TaskState;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_and_task_setup_walkthrough(services: Services) -> eyre::Result<()> {
    let founder = UserId::new();
    let visitor = UserId::new();

    let project = services
        .projects
        .create(
            CreateProjectRequest::new("Launch plan", founder)
                .with_description("Q4 release checklist"),
        )
        .await?;

    let owners = services.projects.owners(project.id()).await?;
    ensure!(owners.len() == 1);
    ensure!(owners.iter().all(|m| m.user() == founder));

    services.projects.add_guest(project.id(), visitor).await?;
    ensure!(
        services
            .projects
            .has_access(project.id(), visitor, Action::ViewTasks)
            .await?
    );

    let task = create_task(&services, &project, founder, "Draft the announcement").await?;
    ensure!(task.state() == TaskState::Opened);
    let task_owners = services.tasks.owners(task.id()).await?;
    ensure!(task_owners.len() == 1);
    ensure!(task_owners.iter().all(|m| m.user() == founder));

    let sub = create_task(&services, &project, founder, "Collect quotes").await?;
    services.tasks.add_sub_task(task.id(), sub.id()).await?;
    let parents = services.tasks.parent_tasks(sub.id()).await?;
    ensure!(parents.iter().any(|t| t.id() == task.id()));

    services.projects.archive(project.id()).await?;
    let second_attempt = services.projects.archive(project.id()).await;
    ensure!(matches!(
        second_attempt,
        Err(ProjectServiceError::Domain(DomainError::InvalidArgument(_)))
    ));
    let fetched = services.projects.find_by_id(project.id()).await?;
    ensure!(fetched.is_some_and(|p| p.state() == ProjectState::Archived));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delegation_chain_grows_the_project_roster(services: Services) -> eyre::Result<()> {
    let founder = UserId::new();
    let engineer = UserId::new();
    let reviewer = UserId::new();

    let project = services
        .projects
        .create(CreateProjectRequest::new("Delegation", founder))
        .await?;

    // Assigning a stranger makes them a project participant.
    let task = services
        .tasks
        .create(
            taskforge::task::services::CreateTaskRequest::new(
                project.id(),
                founder,
                "Build the pipeline",
            )
            .with_assignee(engineer),
        )
        .await?;

    // The engineer, now a participant, can author their own task and invite
    // a reviewer onto it, which in turn adds the reviewer to the project.
    let review_task = create_task(&services, &project, engineer, "Review the pipeline").await?;
    services.tasks.add_guest(review_task.id(), reviewer).await?;

    let roster = services.projects.memberships(project.id()).await?;
    let users: Vec<_> = roster.iter().map(|m| m.user()).collect();
    ensure!(users.contains(&founder));
    ensure!(users.contains(&engineer));
    ensure!(users.contains(&reviewer));

    // Blocked work is tracked through the relation graph.
    services
        .tasks
        .mark_blocked_by(review_task.id(), task.id())
        .await?;
    let blockers = services.tasks.blocked_by_tasks(review_task.id()).await?;
    ensure!(blockers.iter().any(|t| t.id() == task.id()));

    services.tasks.close(task.id()).await?;
    services
        .tasks
        .remove_relation(
            review_task.id(),
            task.id(),
            taskforge::task::domain::RelationKind::BlockedBy,
        )
        .await?;
    ensure!(
        services
            .tasks
            .blocked_by_tasks(review_task.id())
            .await?
            .is_empty()
    );
    Ok(())
}
