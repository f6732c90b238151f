//! Error types for the fetch coordinator.
//!
//! Collaborator failures never show up here: source failures travel inside
//! [`Snapshot`](crate::Snapshot)s, cache misses and write-back failures are
//! absorbed.  These enums only cover misuse of the coordinator itself.

use std::fmt;

use thiserror::Error;
use tokio::task::JoinError;

/// Rejected [`Snapshot`](crate::Snapshot) construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A snapshot cannot be in flight and carry a terminal error at once.
    #[error("a snapshot that is still fetching cannot carry an error")]
    ErrorWhileFetching,
}

/// One of the three functions a [`Coordinator`](crate::Coordinator) is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    FetchSource,
    WriteCache,
    ReadCache,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchSource => "fetch-source",
            Self::WriteCache => "write-cache",
            Self::ReadCache => "read-cache",
        })
    }
}

/// Errors raised by [`Coordinator`](crate::Coordinator) construction and use.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The builder was finished without one of the required collaborators.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(Collaborator),

    /// The broadcast buffer must hold at least one snapshot.
    #[error("snapshot channel capacity must be greater than zero")]
    ZeroCapacity,

    /// The coordinator has been torn down.
    #[error("coordinator is closed")]
    Closed,

    /// A branch task did not run to completion (a collaborator panicked).
    #[error("fetch branch failed to complete: {0}")]
    Join(#[from] JoinError),
}
