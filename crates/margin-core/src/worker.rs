//! Isolated search worker.
//!
//! The [`SearchWorker`] owns a [`QueryRouter`] (and with it the document
//! index) on a dedicated thread. Callers talk to it only through messages:
//! every operation sends a request and immediately returns a [`Pending`]
//! handle that later settles with the response.
//!
//! ## Ordering
//!
//! Requests are delivered FIFO and handled one at a time, so operations
//! issued back-to-back take effect in submission order. There is no
//! cancellation: a superseded search still runs, and the caller simply
//! ignores its result (see [`Pending::id`]).

use crate::error::{MarginError, Result};
use crate::router::QueryRouter;
use crate::snapshot::IndexSnapshot;
use crate::types::{Document, IndexStats, SearchResult};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

type Reply<T> = Sender<Result<T>>;

enum Request {
    Search {
        criteria: String,
        reply: Reply<Vec<SearchResult>>,
    },
    SetIndexData {
        snapshot: Option<IndexSnapshot>,
        reply: Reply<()>,
    },
    AddIndexData {
        documents: Vec<Document>,
        reply: Reply<Option<IndexSnapshot>>,
    },
    Stats {
        reply: Reply<IndexStats>,
    },
}

struct Envelope {
    id: u64,
    request: Request,
}

/// A response that has not necessarily arrived yet.
#[derive(Debug)]
#[must_use = "a pending response does nothing unless waited on"]
pub struct Pending<T> {
    id: u64,
    rx: Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Request id; ids increase with submission order.
    ///
    /// Hosts that fire a search per keystroke keep the highest id they
    /// have applied and drop responses with lower ids.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the response arrives.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| MarginError::WorkerUnavailable)?
    }

    /// Take the response if it has arrived.
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(MarginError::WorkerUnavailable)),
        }
    }
}

/// Handle to a search engine running on its own thread.
///
/// Dropping the handle stops the worker after it drains queued requests.
///
/// ## Example
///
/// ```rust
/// use margin_core::{Document, IndexSnapshot, QueryRouter, SearchWorker};
///
/// let worker = SearchWorker::spawn(QueryRouter::default()).unwrap();
/// worker.set_index_data(Some(IndexSnapshot::empty())).wait().unwrap();
/// let snapshot = worker
///     .add_index_data(vec![Document::new("a.md", "hello")])
///     .wait()
///     .unwrap();
/// assert!(snapshot.is_some());
///
/// let results = worker.search("hello").wait().unwrap();
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct SearchWorker {
    tx: Option<Sender<Envelope>>,
    handle: Option<JoinHandle<()>>,
    next_id: AtomicU64,
}

impl SearchWorker {
    /// Start a worker thread owning `router`.
    pub fn spawn(router: QueryRouter) -> Result<Self> {
        let (tx, rx) = unbounded::<Envelope>();
        let handle = thread::Builder::new()
            .name("margin-search".to_string())
            .spawn(move || run(router, rx))?;

        info!("Search worker started");
        Ok(SearchWorker {
            tx: Some(tx),
            handle: Some(handle),
            next_id: AtomicU64::new(0),
        })
    }

    /// Search all sources. An empty string settles with no results.
    pub fn search(&self, criteria: impl Into<String>) -> Pending<Vec<SearchResult>> {
        let criteria = criteria.into();
        self.send(|reply| Request::Search { criteria, reply })
    }

    /// Replace the document index; `None` or empty snapshot text clears it.
    ///
    /// Settles with an error if the snapshot cannot be decoded, in which
    /// case the previous index stays in place.
    pub fn set_index_data(&self, snapshot: Option<IndexSnapshot>) -> Pending<()> {
        self.send(|reply| Request::SetIndexData { snapshot, reply })
    }

    /// Add documents and settle with the new snapshot.
    ///
    /// Settles with `None` when no index has been loaded yet.
    pub fn add_index_data(&self, documents: Vec<Document>) -> Pending<Option<IndexSnapshot>> {
        self.send(|reply| Request::AddIndexData { documents, reply })
    }

    /// Document index statistics.
    pub fn stats(&self) -> Pending<IndexStats> {
        self.send(|reply| Request::Stats { reply })
    }

    fn send<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> Pending<T> {
        let (reply, rx) = bounded(1);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let envelope = Envelope {
            id,
            request: make(reply),
        };

        // On failure the reply sender is dropped with the envelope, so the
        // pending handle settles with WorkerUnavailable.
        let delivered = match &self.tx {
            Some(tx) => tx.send(envelope).is_ok(),
            None => false,
        };
        if !delivered {
            warn!(id, "Search worker is not running");
        }

        Pending { id, rx }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Search worker panicked");
            }
        }
    }
}

fn run(mut router: QueryRouter, rx: Receiver<Envelope>) {
    while let Ok(Envelope { id, request }) = rx.recv() {
        let start = Instant::now();
        // A send error means the caller dropped its Pending; nothing to do.
        match request {
            Request::Search { criteria, reply } => {
                let results = router.search(&criteria);
                debug!(id, results = results.len(), took = ?start.elapsed(), "Search handled");
                let _ = reply.send(Ok(results));
            }
            Request::SetIndexData { snapshot, reply } => {
                let outcome = router.set_index_data(snapshot.as_ref());
                if let Err(ref e) = outcome {
                    warn!(id, error = %e, "Rejected index snapshot");
                }
                let _ = reply.send(outcome);
            }
            Request::AddIndexData { documents, reply } => {
                let outcome = router.add_index_data(documents);
                debug!(id, took = ?start.elapsed(), "Documents handled");
                let _ = reply.send(outcome);
            }
            Request::Stats { reply } => {
                let _ = reply.send(Ok(router.stats()));
            }
        }
    }

    info!("Search worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_loaded() -> SearchWorker {
        let worker = SearchWorker::spawn(QueryRouter::default()).unwrap();
        worker.set_index_data(Some(IndexSnapshot::empty())).wait().unwrap();
        worker
    }

    fn document_count(results: &[SearchResult]) -> usize {
        results.iter().filter(|r| r.kind() == "document").count()
    }

    #[test]
    fn test_add_before_load_is_noop() {
        let worker = SearchWorker::spawn(QueryRouter::default()).unwrap();
        let snapshot = worker
            .add_index_data(vec![Document::new("b.md", "zzz")])
            .wait()
            .unwrap();
        assert!(snapshot.is_none());
        assert!(worker.search("zzz").wait().unwrap().is_empty());
        assert!(!worker.stats().wait().unwrap().loaded);
    }

    #[test]
    fn test_hello_scenario() {
        let worker = spawn_loaded();
        worker
            .add_index_data(vec![Document::new("a.md", "hello\nworld\nhello again")])
            .wait()
            .unwrap();

        let results = worker.search("hello").wait().unwrap();
        let windows: Vec<(usize, usize)> = results
            .iter()
            .filter_map(|r| match r {
                SearchResult::Document {
                    path, starts, ends, ..
                } if path == "a.md" => Some((*starts, *ends)),
                _ => None,
            })
            .collect();
        assert_eq!(windows, vec![(0, 5), (11, 23)]);
    }

    #[test]
    fn test_clear_with_none() {
        let worker = spawn_loaded();
        worker
            .add_index_data(vec![Document::new("a.md", "hello")])
            .wait()
            .unwrap();
        worker.set_index_data(None).wait().unwrap();

        let results = worker.search("hello").wait().unwrap();
        assert_eq!(document_count(&results), 0);
    }

    #[test]
    fn test_clear_with_empty_snapshot_text() {
        let worker = spawn_loaded();
        worker
            .add_index_data(vec![Document::new("a.md", "hello")])
            .wait()
            .unwrap();

        worker
            .set_index_data(Some(IndexSnapshot::from(String::new())))
            .wait()
            .unwrap();

        assert_eq!(document_count(&worker.search("hello").wait().unwrap()), 0);
        assert!(!worker.stats().wait().unwrap().loaded);
    }

    #[test]
    fn test_malformed_snapshot_is_rejected() {
        let worker = spawn_loaded();
        worker
            .add_index_data(vec![Document::new("a.md", "hello")])
            .wait()
            .unwrap();

        let err = worker
            .set_index_data(Some(IndexSnapshot::from("garbage".to_string())))
            .wait()
            .unwrap_err();
        assert!(err.is_snapshot_error());

        let results = worker.search("hello").wait().unwrap();
        assert_eq!(document_count(&results), 1);
    }

    #[test]
    fn test_requests_are_fifo() {
        let worker = SearchWorker::spawn(QueryRouter::default()).unwrap();

        // Nothing is awaited until the end
        let load = worker.set_index_data(Some(IndexSnapshot::empty()));
        let add = worker.add_index_data(vec![Document::new("n.md", "queued note")]);
        let search = worker.search("queued");

        assert!(load.id() < add.id() && add.id() < search.id());
        assert_eq!(document_count(&search.wait().unwrap()), 1);
        assert!(add.wait().unwrap().is_some());
        load.wait().unwrap();
    }

    #[test]
    fn test_snapshot_moves_between_workers() {
        let first = spawn_loaded();
        let snapshot = first
            .add_index_data(vec![Document::new("a.md", "portable text")])
            .wait()
            .unwrap()
            .unwrap();

        let second = SearchWorker::spawn(QueryRouter::default()).unwrap();
        second.set_index_data(Some(snapshot)).wait().unwrap();

        assert_eq!(
            first.search("portable").wait().unwrap(),
            second.search("portable").wait().unwrap()
        );

        // Independent state
        first.set_index_data(None).wait().unwrap();
        assert_eq!(document_count(&second.search("portable").wait().unwrap()), 1);
    }

    #[test]
    fn test_try_take_eventually_settles() {
        let worker = spawn_loaded();
        let pending = worker.stats();
        let stats = loop {
            if let Some(response) = pending.try_take() {
                break response.unwrap();
            }
            thread::yield_now();
        };
        assert!(stats.loaded);
    }

    #[test]
    fn test_empty_search() {
        let worker = spawn_loaded();
        assert!(worker.search("").wait().unwrap().is_empty());
    }
}
