//! Stale-while-refresh fetch coordination.
//!
//! A [`Coordinator`] races a fast local cache read against a slow
//! authoritative fetch and broadcasts a [`Snapshot`] every time the merged
//! picture changes.  Observers get something to show immediately (the last
//! data known from any earlier cycle), then the cached copy, then the
//! authoritative result or its error.
//!
//! ```text
//!            fetch()
//!               │ Snapshot::fetching(last_known)        (synchronous)
//!      ┌────────┴────────┐
//!      ▼                 ▼
//!  read_cache()     fetch_source()
//!      │                 │
//!      │ Snapshot::fetching(cached)   only if source not done yet
//!      │                 │ Snapshot::done(fresh) / Snapshot::failed(stale, err)
//!      │                 └──► write_cache(fresh)         (detached)
//!      └──────┬──────────┘
//!             ▼
//!       FetchHandle resolves
//! ```
//!
//! ## For contributors
//!
//! * `last_known` and the broadcast sender live behind one mutex, and every
//!   snapshot is sent while that lock is held.  That is what keeps a single
//!   cycle's emissions in order even when its two branches finish on
//!   different worker threads.
//! * Overlapping `fetch()` calls are allowed.  Each runs its own pair of
//!   branches against the shared `last_known`; their snapshots interleave in
//!   completion order.
//! * Cache misses and write-back failures never reach observers.  Only the
//!   source error does.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Collaborator, CoordinatorError};
use crate::snapshot::{Items, Snapshot};

/// Default number of snapshots buffered per subscriber before it lags.
pub const DEFAULT_CAPACITY: usize = 16;

/// Boxed, sendable future returned by collaborator functions.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type LoadFn<T> = Arc<dyn Fn() -> BoxFuture<anyhow::Result<Vec<T>>> + Send + Sync>;
type WriteFn<T> = Arc<dyn Fn(Items<T>) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects the three collaborator functions of a [`Coordinator`].
///
/// All three are required; [`build`](Self::build) refuses to produce a
/// coordinator without them.
pub struct CoordinatorBuilder<T> {
    fetch_source: Option<LoadFn<T>>,
    write_cache: Option<WriteFn<T>>,
    read_cache: Option<LoadFn<T>>,
    capacity: usize,
}

impl<T: Send + Sync + 'static> CoordinatorBuilder<T> {
    fn new() -> Self {
        Self {
            fetch_source: None,
            write_cache: None,
            read_cache: None,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// The slow, authoritative load.  Its failure is reported to observers.
    pub fn fetch_source<F, Fut>(mut self, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    {
        let load: LoadFn<T> =
            Arc::new(move || -> BoxFuture<anyhow::Result<Vec<T>>> { Box::pin(fetch()) });
        self.fetch_source = Some(load);
        self
    }

    /// Best-effort persistence of a fresh result.  Its outcome is discarded.
    pub fn write_cache<F, Fut>(mut self, write: F) -> Self
    where
        F: Fn(Items<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let store: WriteFn<T> =
            Arc::new(move |items: Items<T>| -> BoxFuture<anyhow::Result<()>> {
                Box::pin(write(items))
            });
        self.write_cache = Some(store);
        self
    }

    /// The fast, possibly stale load.  Failure means "nothing cached".
    pub fn read_cache<F, Fut>(mut self, read: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    {
        let load: LoadFn<T> =
            Arc::new(move || -> BoxFuture<anyhow::Result<Vec<T>>> { Box::pin(read()) });
        self.read_cache = Some(load);
        self
    }

    /// Snapshots buffered per subscriber.  Defaults to [`DEFAULT_CAPACITY`].
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Coordinator<T>, CoordinatorError> {
        let fetch_source = self
            .fetch_source
            .ok_or(CoordinatorError::MissingCollaborator(Collaborator::FetchSource))?;
        let write_cache = self
            .write_cache
            .ok_or(CoordinatorError::MissingCollaborator(Collaborator::WriteCache))?;
        let read_cache = self
            .read_cache
            .ok_or(CoordinatorError::MissingCollaborator(Collaborator::ReadCache))?;
        if self.capacity == 0 {
            return Err(CoordinatorError::ZeroCapacity);
        }

        let (tx, _) = broadcast::channel(self.capacity);
        Ok(Coordinator {
            shared: Arc::new(Shared {
                fetch_source,
                write_cache,
                read_cache,
                state: Mutex::new(State {
                    last_known: None,
                    tx: Some(tx),
                }),
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Races a cache read against a source fetch and broadcasts [`Snapshot`]s.
///
/// One instance per logical data feed.  Closing it (explicitly with
/// [`close`](Self::close) or by dropping it) ends the snapshot stream; branches
/// still in flight finish silently.
pub struct Coordinator<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    fetch_source: LoadFn<T>,
    write_cache: WriteFn<T>,
    read_cache: LoadFn<T>,
    state: Mutex<State<T>>,
}

struct State<T> {
    /// Most recent data obtained from either branch, kept across cycles.
    last_known: Option<Items<T>>,
    /// `None` once the coordinator is closed.
    tx: Option<broadcast::Sender<Snapshot<T>>>,
}

impl<T> State<T> {
    fn emit(&self, snapshot: Snapshot<T>) {
        if let Some(tx) = &self.tx {
            // No subscribers is not an error; the snapshot is simply unseen.
            let _ = tx.send(snapshot);
        }
    }
}

impl<T: Send + Sync + 'static> Coordinator<T> {
    pub fn builder() -> CoordinatorBuilder<T> {
        CoordinatorBuilder::new()
    }

    /// Subscribe to snapshots emitted from now on.  Earlier ones are not replayed.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Snapshot<T>>, CoordinatorError> {
        self.shared
            .state
            .lock()
            .tx
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(CoordinatorError::Closed)
    }

    /// Start one fetch cycle.
    ///
    /// The initial `fetching` snapshot has been sent by the time this returns.
    /// The cache and source branches then run as separate tasks; the returned
    /// [`FetchHandle`] resolves once both have finished (the cache write-back
    /// is not waited for).
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch(&self) -> Result<FetchHandle, CoordinatorError> {
        {
            let state = self.shared.state.lock();
            if state.tx.is_none() {
                return Err(CoordinatorError::Closed);
            }
            state.emit(Snapshot::fetching(state.last_known.clone()));
        }
        debug!("fetch cycle started");

        let source_done = Arc::new(AtomicBool::new(false));
        let cache = tokio::spawn(run_cache_branch(
            Arc::clone(&self.shared),
            Arc::clone(&source_done),
        ));
        let source = tokio::spawn(run_source_branch(Arc::clone(&self.shared), source_done));

        Ok(FetchHandle {
            cache: Some(cache),
            source: Some(source),
        })
    }

    /// The data most recently obtained from either branch, if any.
    pub fn last_known(&self) -> Option<Items<T>> {
        self.shared.state.lock().last_known.clone()
    }
}

impl<T> Coordinator<T> {
    /// Close the snapshot stream.  Safe to call more than once.
    ///
    /// Subscribers drain what is buffered and then see `RecvError::Closed`.
    /// Further [`fetch`](Self::fetch) calls fail with [`CoordinatorError::Closed`].
    pub fn close(&self) {
        if self.shared.state.lock().tx.take().is_some() {
            debug!("coordinator closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().tx.is_none()
    }
}

impl<T> Drop for Coordinator<T> {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

async fn run_cache_branch<T: Send + Sync + 'static>(
    shared: Arc<Shared<T>>,
    source_done: Arc<AtomicBool>,
) {
    let items: Items<T> = match (shared.read_cache)().await {
        Ok(items) => items.into(),
        Err(err) => {
            debug!(error = %err, "cache miss");
            return;
        }
    };

    debug!(items = items.len(), "cache hit");
    let mut state = shared.state.lock();
    state.last_known = Some(items);
    // `source_done` is only touched with `state` locked.
    if source_done.load(Ordering::Relaxed) {
        debug!("cached data arrived after the source result; not emitted");
        return;
    }
    state.emit(Snapshot::fetching(state.last_known.clone()));
}

async fn run_source_branch<T: Send + Sync + 'static>(
    shared: Arc<Shared<T>>,
    source_done: Arc<AtomicBool>,
) {
    let result = (shared.fetch_source)().await;

    let fresh = {
        let mut state = shared.state.lock();
        source_done.store(true, Ordering::Relaxed);
        match result {
            Ok(items) => {
                let items: Items<T> = items.into();
                state.last_known = Some(Arc::clone(&items));
                state.emit(Snapshot::done(Some(Arc::clone(&items))));
                Some(items)
            }
            Err(err) => {
                warn!(error = %err, "source fetch failed");
                state.emit(Snapshot::failed(state.last_known.clone(), Arc::new(err)));
                None
            }
        }
    };

    if let Some(items) = fresh {
        let write = Arc::clone(&shared.write_cache);
        // Fire and forget: nothing awaits this task and its result is dropped.
        tokio::spawn(async move {
            let _ = write(items).await;
        });
    }
}

// ---------------------------------------------------------------------------
// FetchHandle
// ---------------------------------------------------------------------------

/// Resolves once both branches of one fetch cycle have finished.
///
/// Dropping the handle does not cancel anything.
#[must_use = "dropping a FetchHandle detaches the cycle; await it to know when it finished"]
pub struct FetchHandle {
    cache: Option<JoinHandle<()>>,
    source: Option<JoinHandle<()>>,
}

impl FetchHandle {
    pub fn is_finished(&self) -> bool {
        [&self.cache, &self.source]
            .into_iter()
            .flatten()
            .all(JoinHandle::is_finished)
    }
}

impl Future for FetchHandle {
    type Output = Result<(), CoordinatorError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let mut pending = false;
        for slot in [&mut this.cache, &mut this.source] {
            let Some(handle) = slot.as_mut() else {
                continue;
            };
            match Pin::new(handle).poll(cx) {
                Poll::Ready(result) => {
                    *slot = None;
                    result?;
                }
                Poll::Pending => pending = true,
            }
        }
        if pending {
            Poll::Pending
        } else {
            Poll::Ready(Ok(()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
