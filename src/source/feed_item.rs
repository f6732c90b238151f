//! The core data type shared across all feed sources.
//!
//! `FeedItem` represents a single entry from any data source (RSS, Atom, API,
//! etc.).  It is also the on-disk cache format: the
//! [`FeedCache`](crate::FeedCache) stores a JSON array of these, so adding a
//! field means old cache files fail to parse and are treated as a cache miss
//! until the next successful fetch rewrites them (unless the field is
//! `#[serde(default)]`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single feed entry, normalised from any data source.
///
/// All sources convert their native items into this struct so that the
/// application logic (de-duplication, sorting, rendering) doesn't need to
/// know which source type produced the item.
///
/// ## Sorting
///
/// `FeedItem` implements [`Ord`] for **reverse-chronological** ordering:
/// newer items sort before older ones, and items without a date sort last.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Unique identifier used for de-duplication.
    ///
    /// For RSS this is the `<guid>` element (falling back to `<link>`).
    /// Other sources should use whatever stable, unique key they provide.
    pub id: String,

    /// Human-readable headline.
    pub title: String,

    /// Optional longer description or summary text.
    #[serde(default)]
    pub description: Option<String>,

    /// URL to the full content.
    #[serde(default)]
    pub link: Option<String>,

    /// Publication timestamp, used for sorting.
    ///
    /// `None` means the source did not provide a date; such items sort after
    /// all dated items.
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,

    /// Name of the source or feed this came from (e.g. "BBC News").
    pub source_name: String,
}

// ---------------------------------------------------------------------------
// Ordering — reverse chronological (newest first)
// ---------------------------------------------------------------------------

impl Ord for FeedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that `Some(newer) > Some(older)` gives us newest-first.
        // `None` is less than `Some(_)` in the standard library, so undated
        // items naturally sink to the bottom.
        other.published.cmp(&self.published)
    }
}

impl PartialOrd for FeedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
