//! Wiring a [`DataSource`] and a [`FeedCache`] into a [`Coordinator`].

use std::sync::Arc;

use tracing::debug;

use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::source::{DataSource, FeedItem};
use crate::store::FeedCache;

/// Build a coordinator whose authoritative load is `source`, whose fast load
/// is `cache`, and which writes every fresh result back into `cache`.
pub fn feed_coordinator(
    source: Arc<dyn DataSource>,
    cache: FeedCache,
    capacity: usize,
) -> Result<Coordinator<FeedItem>, CoordinatorError> {
    let cache = Arc::new(cache);
    let reader = Arc::clone(&cache);

    Coordinator::builder()
        .fetch_source(move || {
            let source = Arc::clone(&source);
            async move {
                debug!(source = source.name(), "fetching from source");
                source.fetch().await
            }
        })
        .read_cache(move || {
            let cache = Arc::clone(&reader);
            async move { cache.load().await }
        })
        .write_cache(move |items| {
            let cache = Arc::clone(&cache);
            async move { cache.store(&items).await }
        })
        .capacity(capacity)
        .build()
}
