//! Unit tests for the typed task relation graph.

use crate::error::DomainError;
use crate::task::domain::{ParseRelationKindError, RelationKind, TaskId, TaskRelation};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[case(RelationKind::ParentOf, RelationKind::SubOf)]
#[case(RelationKind::SubOf, RelationKind::ParentOf)]
#[case(RelationKind::BlockedBy, RelationKind::IsBlocking)]
#[case(RelationKind::IsBlocking, RelationKind::BlockedBy)]
#[case(RelationKind::Related, RelationKind::Related)]
fn every_kind_has_a_total_inverse(
    #[case] kind: RelationKind,
    #[case] expected: RelationKind,
) -> eyre::Result<()> {
    ensure!(kind.inverse() == expected);
    ensure!(kind.inverse().inverse() == kind);
    Ok(())
}

#[rstest]
fn self_relations_are_rejected() {
    let id = TaskId::new();
    let result = TaskRelation::new(id, id, RelationKind::Related);
    assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
}

#[rstest]
fn inverse_swaps_endpoints_and_flips_the_kind() -> eyre::Result<()> {
    let parent = TaskId::new();
    let child = TaskId::new();
    let relation = TaskRelation::new(parent, child, RelationKind::ParentOf)?;

    let inverse = relation.inverse();
    ensure!(inverse.source() == child);
    ensure!(inverse.target() == parent);
    ensure!(inverse.kind() == RelationKind::SubOf);
    ensure!(inverse.inverse() == relation);
    Ok(())
}

#[rstest]
#[case(RelationKind::ParentOf, "parent_of")]
#[case(RelationKind::SubOf, "sub_of")]
#[case(RelationKind::BlockedBy, "blocked_by")]
#[case(RelationKind::IsBlocking, "is_blocking")]
#[case(RelationKind::Related, "related")]
fn kind_round_trips_through_its_storage_form(
    #[case] kind: RelationKind,
    #[case] tag: &str,
) -> eyre::Result<()> {
    ensure!(kind.as_str() == tag);
    ensure!(RelationKind::try_from(tag)? == kind);
    Ok(())
}

#[rstest]
fn unknown_kind_tag_is_rejected() {
    let result = RelationKind::try_from("duplicate_of");
    assert_eq!(
        result,
        Err(ParseRelationKindError("duplicate_of".to_owned()))
    );
}
