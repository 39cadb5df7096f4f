//! Integration tests for the paired task relation graph.

use super::helpers::{Services, create_project, create_task, services};
use eyre::ensure;
use rstest::rstest;
use taskforge::ids::UserId;
use taskforge::task::domain::RelationKind;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sub_task_edges_are_paired(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let parent = create_task(&services, &project, owner, "Parent").await?;
    let child = create_task(&services, &project, owner, "Child").await?;

    services.tasks.add_sub_task(parent.id(), child.id()).await?;

    let subs = services.tasks.sub_tasks(parent.id()).await?;
    ensure!(subs.len() == 1 && subs.iter().all(|t| t.id() == child.id()));

    let parents = services.tasks.parent_tasks(child.id()).await?;
    ensure!(parents.len() == 1 && parents.iter().all(|t| t.id() == parent.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn declaring_a_parent_mirrors_the_sub_task_view(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let child = create_task(&services, &project, owner, "Child").await?;
    let parent = create_task(&services, &project, owner, "Parent").await?;

    services
        .tasks
        .add_parent_task(child.id(), parent.id())
        .await?;

    let subs = services.tasks.sub_tasks(parent.id()).await?;
    ensure!(subs.iter().any(|t| t.id() == child.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocking_edges_expose_both_views(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let upstream = create_task(&services, &project, owner, "Upstream").await?;
    let downstream = create_task(&services, &project, owner, "Downstream").await?;

    services
        .tasks
        .mark_blocking(upstream.id(), downstream.id())
        .await?;

    let blocked = services.tasks.blocked_tasks(upstream.id()).await?;
    ensure!(blocked.iter().any(|t| t.id() == downstream.id()));

    let blockers = services.tasks.blocked_by_tasks(downstream.id()).await?;
    ensure!(blockers.iter().any(|t| t.id() == upstream.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn kinds_do_not_bleed_into_each_other(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let hub = create_task(&services, &project, owner, "Hub").await?;
    let child = create_task(&services, &project, owner, "Child").await?;
    let peer = create_task(&services, &project, owner, "Peer").await?;
    let blocker = create_task(&services, &project, owner, "Blocker").await?;

    services.tasks.add_sub_task(hub.id(), child.id()).await?;
    services.tasks.add_related_task(hub.id(), peer.id()).await?;
    services
        .tasks
        .mark_blocked_by(hub.id(), blocker.id())
        .await?;

    let subs = services.tasks.sub_tasks(hub.id()).await?;
    ensure!(subs.len() == 1 && subs.iter().all(|t| t.id() == child.id()));

    let related = services.tasks.just_related_tasks(hub.id()).await?;
    ensure!(related.len() == 1 && related.iter().all(|t| t.id() == peer.id()));

    let blockers = services.tasks.blocked_by_tasks(hub.id()).await?;
    ensure!(blockers.len() == 1 && blockers.iter().all(|t| t.id() == blocker.id()));

    ensure!(services.tasks.parent_tasks(hub.id()).await?.is_empty());
    ensure!(services.tasks.blocked_tasks(hub.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removal_deletes_the_pair_and_is_idempotent(services: Services) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let left = create_task(&services, &project, owner, "Left").await?;
    let right = create_task(&services, &project, owner, "Right").await?;
    services.tasks.add_related_task(left.id(), right.id()).await?;

    services
        .tasks
        .remove_relation(left.id(), right.id(), RelationKind::Related)
        .await?;
    ensure!(services.tasks.just_related_tasks(left.id()).await?.is_empty());
    ensure!(services.tasks.just_related_tasks(right.id()).await?.is_empty());

    // Removing an absent edge is a no-op.
    services
        .tasks
        .remove_relation(left.id(), right.id(), RelationKind::Related)
        .await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removal_from_the_inverse_side_also_deletes_the_pair(
    services: Services,
) -> eyre::Result<()> {
    let owner = UserId::new();
    let project = create_project(&services, owner).await?;
    let parent = create_task(&services, &project, owner, "Parent").await?;
    let child = create_task(&services, &project, owner, "Child").await?;
    services.tasks.add_sub_task(parent.id(), child.id()).await?;

    services
        .tasks
        .remove_relation(child.id(), parent.id(), RelationKind::SubOf)
        .await?;

    ensure!(services.tasks.sub_tasks(parent.id()).await?.is_empty());
    ensure!(services.tasks.parent_tasks(child.id()).await?.is_empty());
    Ok(())
}
