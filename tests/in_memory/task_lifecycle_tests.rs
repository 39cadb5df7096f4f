//! Integration tests for task creation gating and lifecycle operations.

use super::helpers::{Services, create_project, create_task, services};
use eyre::ensure;
use rstest::rstest;
use taskforge::access::{Action, Role};
use taskforge::error::DomainError;
use taskforge::ids::UserId;
use taskforge::task::domain::TaskState;
use taskforge::task::services::{CreateTaskRequest, TaskServiceError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn author_owns_the_task_they_create(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;

    let task = create_task(&services, &project, owner, "Ship the feature").await?;

    ensure!(task.state() == TaskState::Opened);
    let owners = services.tasks.owners(task.id()).await?;
    ensure!(owners.len() == 1);
    ensure!(owners.iter().all(|m| m.user() == owner));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn guests_cannot_create_tasks(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let guest = UserId::new();
    let project = create_project(&services, owner).await?;
    services.projects.add_guest(project.id(), guest).await?;

    let result = create_task(&services, &project, guest, "Denied").await;

    ensure!(
        result
            .err()
            .map(|e| e.to_string())
            .is_some_and(|msg| msg.contains("permission denied"))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignment_pulls_the_assignee_into_the_project(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let assignee = UserId::new();
    let project = create_project(&services, owner).await?;

    let task = services
        .tasks
        .create(
            CreateTaskRequest::new(project.id(), owner, "Handover")
                .with_assignee(assignee)
                .with_estimated_hours(6),
        )
        .await?;

    ensure!(task.assignee() == Some(assignee));
    ensure!(
        services.tasks.find_access_for(task.id(), assignee).await?
            == Some(Role::Participant)
    );
    ensure!(
        services
            .projects
            .find_access_for(project.id(), assignee)
            .await?
            == Some(Role::Participant)
    );
    // The new participant can now create tasks of their own.
    create_task(&services, &project, assignee, "Follow-up").await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_tasks_must_be_unblocked_before_review(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let task = create_task(&services, &project, owner, "Review path").await?;

    services.tasks.block(task.id()).await?;
    let result = services.tasks.request_review(task.id()).await;
    ensure!(matches!(
        result,
        Err(TaskServiceError::Domain(DomainError::InvalidOperation(_)))
    ));

    services.tasks.unblock(task.id()).await?;
    let reviewed = services.tasks.request_review(task.id()).await?;
    ensure!(reviewed.state() == TaskState::ReviewPending);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closing_from_review_and_reopening(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let task = create_task(&services, &project, owner, "Close path").await?;

    services.tasks.request_review(task.id()).await?;
    let closed = services.tasks.close(task.id()).await?;
    ensure!(closed.state() == TaskState::Closed);

    let reopened = services.tasks.reopen(task.id()).await?;
    ensure!(reopened.state() == TaskState::Opened);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unarchiving_returns_the_task_to_opened(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let task = create_task(&services, &project, owner, "Archive path").await?;

    services.tasks.block(task.id()).await?;
    services.tasks.archive(task.id()).await?;
    let restored = services.tasks.unarchive(task.id()).await?;

    ensure!(restored.state() == TaskState::Opened);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn effort_and_dates_accumulate_across_operations(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let task = create_task(&services, &project, owner, "Tracked work").await?;

    services.tasks.start(task.id()).await?;
    services.tasks.log_hours(task.id(), 5).await?;
    services.tasks.log_hours(task.id(), 2).await?;
    let ended = services.tasks.end(task.id()).await?;

    ensure!(ended.hours_spent() == 7);
    ensure!(ended.started_on().is_some());
    ensure!(ended.ended_on().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_membership_checks_use_the_same_permission_table(
    services: Services,
) -> eyre::Result<()> {
    let owner = UserId::new();
    let helper = UserId::new();
    let project = create_project(&services, owner).await?;
    let task = create_task(&services, &project, owner, "Shared work").await?;

    services.tasks.add_participant(task.id(), helper).await?;

    ensure!(services.tasks.has_access(task.id(), helper, Action::ViewDetails).await?);
    ensure!(!services.tasks.has_access(task.id(), helper, Action::Archive).await?);
    ensure!(services.tasks.has_access(task.id(), owner, Action::Archive).await?);
    Ok(())
}
