//! Application state management.

use crate::snapshot_file::SnapshotFile;
use margin_core::{Config, Document, IndexSnapshot, NamedSnippetCorpus, QueryRouter, SearchWorker};
use tracing::{info, warn};

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Stored index snapshot
    pub snapshot_file: SnapshotFile,

    /// Search engine running on its own thread
    pub worker: SearchWorker,

    /// Snippet corpus, kept on this side to render insertable text
    pub snippets: NamedSnippetCorpus,
}

impl App {
    /// Create a new application instance.
    ///
    /// The worker starts without an index; call [`App::load_stored`] or
    /// [`App::start_empty`] before adding documents.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let data_dir = config.snapshot_dir()?;
        let snapshot_file = SnapshotFile::new(&data_dir);

        let router = QueryRouter::from_config(&config)?;
        let snippets = router.snippets().clone();
        let worker = SearchWorker::spawn(router)?;

        info!(
            data_dir = %data_dir.display(),
            stored = snapshot_file.exists(),
            "Application initialized"
        );

        Ok(App {
            config,
            snapshot_file,
            worker,
            snippets,
        })
    }

    /// Load the stored snapshot into the worker.
    ///
    /// Falls back to the backup and then to an empty index when the stored
    /// snapshot is missing or rejected. Returns whether stored data was used.
    pub fn load_stored(&self) -> anyhow::Result<bool> {
        for snapshot in [self.snapshot_file.read()?, self.snapshot_file.read_backup()?]
            .into_iter()
            .flatten()
        {
            match self.worker.set_index_data(Some(snapshot)).wait() {
                Ok(()) => return Ok(true),
                Err(e) if e.is_snapshot_error() => {
                    warn!(error = %e, "Stored snapshot rejected");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.start_empty()?;
        Ok(false)
    }

    /// Load an empty index into the worker.
    pub fn start_empty(&self) -> anyhow::Result<()> {
        self.worker
            .set_index_data(Some(IndexSnapshot::empty()))
            .wait()?;
        Ok(())
    }

    /// Add documents and store the resulting snapshot.
    pub fn add_documents(&self, documents: Vec<Document>) -> anyhow::Result<()> {
        match self.worker.add_index_data(documents).wait()? {
            Some(snapshot) => self.snapshot_file.write(&snapshot),
            None => anyhow::bail!("No index loaded; documents were not added"),
        }
    }
}
