//! Typed, paired edges between tasks.

use super::TaskId;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Semantic tag on a task-to-task edge.
///
/// Every kind has a defined inverse; whenever an edge `(A, kind, B)` exists,
/// the store also holds `(B, inverse(kind), A)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The source task is the parent of the target.
    ParentOf,
    /// The source task is a sub-task of the target.
    SubOf,
    /// The source task is blocked by the target.
    BlockedBy,
    /// The source task is blocking the target.
    IsBlocking,
    /// The tasks are related without further semantics.
    Related,
}

impl RelationKind {
    /// Returns the inverse kind used for the paired counterpart edge.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::ParentOf => Self::SubOf,
            Self::SubOf => Self::ParentOf,
            Self::BlockedBy => Self::IsBlocking,
            Self::IsBlocking => Self::BlockedBy,
            Self::Related => Self::Related,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParentOf => "parent_of",
            Self::SubOf => "sub_of",
            Self::BlockedBy => "blocked_by",
            Self::IsBlocking => "is_blocking",
            Self::Related => "related",
        }
    }
}

impl TryFrom<&str> for RelationKind {
    type Error = ParseRelationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "parent_of" => Ok(Self::ParentOf),
            "sub_of" => Ok(Self::SubOf),
            "blocked_by" => Ok(Self::BlockedBy),
            "is_blocking" => Ok(Self::IsBlocking),
            "related" => Ok(Self::Related),
            _ => Err(ParseRelationKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing relation kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown relation kind: {0}")]
pub struct ParseRelationKindError(pub String);

/// A directed, typed edge between two tasks.
///
/// Conceptually the graph is undirected-paired: the edge and its inverse are
/// created and removed together by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRelation {
    source: TaskId,
    target: TaskId,
    kind: RelationKind,
}

impl TaskRelation {
    /// Creates a validated relation edge.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOperation`] when source and target are
    /// the same task.
    pub fn new(source: TaskId, target: TaskId, kind: RelationKind) -> DomainResult<Self> {
        if source == target {
            return Err(DomainError::InvalidOperation(
                "a task cannot relate to itself".to_owned(),
            ));
        }
        Ok(Self {
            source,
            target,
            kind,
        })
    }

    /// Reconstructs an edge from persisted storage.
    ///
    /// Stored edges have already passed validation at write time.
    #[must_use]
    pub const fn from_persisted(source: TaskId, target: TaskId, kind: RelationKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// Returns the source task.
    #[must_use]
    pub const fn source(&self) -> TaskId {
        self.source
    }

    /// Returns the target task.
    #[must_use]
    pub const fn target(&self) -> TaskId {
        self.target
    }

    /// Returns the relation kind.
    #[must_use]
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Returns the paired counterpart edge.
    #[must_use]
    pub const fn inverse(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            kind: self.kind.inverse(),
        }
    }
}
