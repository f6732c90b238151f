//! One point in a fetch timeline.
//!
//! A [`Snapshot`] is what observers of a [`Coordinator`](crate::Coordinator)
//! receive: whether the authoritative fetch is still running, the best data
//! known at that moment, and the source error if the fetch failed.
//!
//! Snapshots are immutable and cheap to clone.  Item data is shared behind an
//! [`Arc`], so every subscriber sees the same allocation and `T` never needs to
//! implement [`Clone`].

use std::fmt;
use std::sync::Arc;

use crate::error::SnapshotError;

/// Shared, immutable sequence of items.
pub type Items<T> = Arc<[T]>;

/// A source failure as carried by a snapshot.
pub type SharedError = Arc<anyhow::Error>;

/// Immutable status update describing fetch progress.
///
/// Invariant: `is_fetching() == true` implies `error().is_none()`.
pub struct Snapshot<T> {
    is_fetching: bool,
    data: Option<Items<T>>,
    error: Option<SharedError>,
}

impl<T> Snapshot<T> {
    /// Build a snapshot, rejecting an in-flight snapshot that carries an error.
    pub fn new(
        is_fetching: bool,
        data: Option<Items<T>>,
        error: Option<SharedError>,
    ) -> Result<Self, SnapshotError> {
        if is_fetching && error.is_some() {
            return Err(SnapshotError::ErrorWhileFetching);
        }
        Ok(Self {
            is_fetching,
            data,
            error,
        })
    }

    /// Fetch in flight, showing whatever data is already known.
    pub fn fetching(data: Option<Items<T>>) -> Self {
        Self {
            is_fetching: true,
            data,
            error: None,
        }
    }

    /// Fetch finished successfully.
    pub fn done(data: Option<Items<T>>) -> Self {
        Self {
            is_fetching: false,
            data,
            error: None,
        }
    }

    /// Fetch finished with a source error; `data` is the stale fallback, if any.
    pub fn failed(data: Option<Items<T>>, error: SharedError) -> Self {
        Self {
            is_fetching: false,
            data,
            error: Some(error),
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn data(&self) -> Option<&Items<T>> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

// Manual impls: derives would demand `T: Clone` even though only the `Arc` is cloned.
impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            is_fetching: self.is_fetching,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("is_fetching", &self.is_fetching)
            .field("data", &self.data)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .finish()
    }
}

/// Structural equality: same flag, same item values, same error message.
impl<T: PartialEq> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.is_fetching == other.is_fetching
            && self.data == other.data
            && self.error.as_ref().map(|e| e.to_string())
                == other.error.as_ref().map(|e| e.to_string())
    }
}
