//! Integration tests for project lifecycle and membership management.

use super::helpers::{Services, create_project, services};
use eyre::ensure;
use rstest::rstest;
use taskforge::access::{Action, Role};
use taskforge::error::DomainError;
use taskforge::ids::UserId;
use taskforge::project::domain::ProjectState;
use taskforge::project::services::ProjectServiceError;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creation_leaves_an_active_project_with_one_owner(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;

    ensure!(project.state() == ProjectState::Active);

    let owners = services.projects.owners(project.id()).await?;
    ensure!(owners.len() == 1);
    ensure!(owners.iter().all(|m| m.user() == owner));
    ensure!(services.projects.participants(project.id()).await?.is_empty());
    ensure!(services.projects.guests(project.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_state_machine_walk(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;

    let project_after = services.projects.deactivate(project.id()).await?;
    ensure!(project_after.state() == ProjectState::Inactive);

    let project_after = services.projects.activate(project.id()).await?;
    ensure!(project_after.state() == ProjectState::Active);

    let project_after = services.projects.archive(project.id()).await?;
    ensure!(project_after.state() == ProjectState::Archived);

    // Unarchiving lands in Inactive; reactivation is a separate step.
    let project_after = services.projects.unarchive(project.id()).await?;
    ensure!(project_after.state() == ProjectState::Inactive);

    let project_after = services.projects.activate(project.id()).await?;
    ensure!(project_after.state() == ProjectState::Active);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn role_grants_follow_the_permission_table(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let participant = UserId::new();
    let guest = UserId::new();
    let project = create_project(&services, owner).await?;

    services
        .projects
        .add_participant(project.id(), participant)
        .await?;
    services.projects.add_guest(project.id(), guest).await?;

    for action in [
        Action::Archive,
        Action::Deactivate,
        Action::RemoveMember,
        Action::AddOwner,
        Action::AddTask,
    ] {
        ensure!(services.projects.has_access(project.id(), owner, action).await?);
        ensure!(!services.projects.has_access(project.id(), guest, action).await?);
    }

    ensure!(
        services
            .projects
            .has_access(project.id(), participant, Action::AddTask)
            .await?
    );
    ensure!(
        !services
            .projects
            .has_access(project.id(), participant, Action::Archive)
            .await?
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn promoting_a_guest_replaces_the_role(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let member = UserId::new();
    let project = create_project(&services, owner).await?;

    services.projects.add_guest(project.id(), member).await?;
    services.projects.add_participant(project.id(), member).await?;

    let access = services.projects.find_access_for(project.id(), member).await?;
    ensure!(access == Some(Role::Participant));
    ensure!(services.projects.guests(project.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_projects_stay_archived_on_a_second_attempt(
    services: Services,
) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    services.projects.archive(project.id()).await?;

    let result = services.projects.archive(project.id()).await;
    ensure!(matches!(
        result,
        Err(ProjectServiceError::Domain(DomainError::InvalidArgument(_)))
    ));

    let fetched = services.projects.find_by_id(project.id()).await?;
    ensure!(fetched.is_some_and(|p| p.state() == ProjectState::Archived));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_members_lose_all_access(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let member = UserId::new();
    let project = create_project(&services, owner).await?;
    services.projects.add_participant(project.id(), member).await?;

    services.projects.remove_user(project.id(), member).await?;

    ensure!(
        services
            .projects
            .find_access_for(project.id(), member)
            .await?
            .is_none()
    );
    ensure!(
        !services
            .projects
            .has_access(project.id(), member, Action::ViewDetails)
            .await?
    );
    Ok(())
}
