//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait and the common [`FeedItem`]
//! type.  Concrete source implementations live in sub-modules (currently only
//! [`rss`]).
//!
//! A data source is the authoritative, slow side of a refresh: the
//! [`feed_coordinator`](crate::feed_coordinator) wires it in as the
//! coordinator's fetch-source and races it against the on-disk
//! [`FeedCache`](crate::FeedCache).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomSource`) and implement [`DataSource`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Construct an instance in `main.rs` instead of (or next to) `RssSource`.

mod feed_item;
mod rss;

pub use feed_item::FeedItem;
pub use rss::RssSource;

use anyhow::Result;
use async_trait::async_trait;

/// Trait that every data source must implement.
///
/// `fetch()` runs on a tokio worker as the source branch of a fetch cycle, so
/// implementations must be [`Send`] and [`Sync`].
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct MySource { /* config fields */ }
///
/// #[async_trait]
/// impl DataSource for MySource {
///     fn name(&self) -> &str { "my-source" }
///
///     async fn fetch(&self) -> Result<Vec<FeedItem>> {
///         // Perform HTTP / IO, then convert into FeedItem values.
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable label shown alongside items.
    fn name(&self) -> &str;

    /// Fetch the latest batch of items.
    ///
    /// Errors end up in the final snapshot of the cycle, next to whatever
    /// stale data was already on screen.
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
}
