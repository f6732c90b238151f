//! freshfeed — show stale data now, the right data soon.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌──────────────┐  Snapshot<T>  ┌─────────────┐
//!  read_cache ──► │              │ ────────────► │ subscriber  │
//!                 │ Coordinator  │   broadcast   ├─────────────┤
//!  fetch_source ► │              │ ────────────► │ subscriber  │
//!                 └──────┬───────┘               └─────────────┘
//!                        │ fresh result (detached)
//!                        ▼
//!                   write_cache
//! ```
//!
//! * **`coordinator`** — the [`Coordinator`]: races the cache read against the
//!   source fetch, emits [`Snapshot`]s, writes fresh results back.
//! * **`snapshot`** — the immutable [`Snapshot`] value observers receive.
//! * **`error`** — construction and lifecycle errors.
//! * **`source`** — the [`DataSource`] trait, [`FeedItem`], and [`RssSource`].
//! * **`store`** — [`FeedCache`], the JSON file used as the fast side.
//! * **`feed`** — [`feed_coordinator`], gluing a source and a cache together.
//!
//! The core ([`Coordinator`], [`Snapshot`]) is generic over the item type and
//! knows nothing about feeds; the rest is what the `freshfeed` binary uses.

pub mod coordinator;
pub mod error;
pub mod feed;
pub mod snapshot;
pub mod source;
pub mod store;

pub use coordinator::{BoxFuture, Coordinator, CoordinatorBuilder, FetchHandle, DEFAULT_CAPACITY};
pub use error::{Collaborator, CoordinatorError, SnapshotError};
pub use feed::feed_coordinator;
pub use snapshot::{Items, SharedError, Snapshot};
pub use source::{DataSource, FeedItem, RssSource};
pub use store::{default_cache_path, FeedCache};
