use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};

use super::loader::{LoadError, load_source};
use super::model::CleanedDataset;

// ---------------------------------------------------------------------------
// Lifecycle of one source
// ---------------------------------------------------------------------------

/// Where a source is in its load lifecycle.
#[derive(Debug, Clone)]
pub enum LoadState {
    NotLoaded,
    Loaded(Arc<CleanedDataset>),
    Failed(Arc<LoadError>),
}

impl LoadState {
    /// The dataset for this state. Anything but `Loaded` yields an empty one.
    pub fn dataset(&self) -> Arc<CleanedDataset> {
        match self {
            LoadState::Loaded(ds) => Arc::clone(ds),
            LoadState::NotLoaded | LoadState::Failed(_) => Arc::new(CleanedDataset::default()),
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

type LoadFn = dyn Fn(&Path) -> Result<CleanedDataset, LoadError> + Send + Sync;

/// Memo of cleaned datasets keyed by source path.
///
/// The first caller for a source runs the loader; concurrent callers for the
/// same source block on that run and share its outcome. Failures are cached
/// too, until [`DatasetCache::invalidate`] is called.
pub struct DatasetCache {
    loader: Box<LoadFn>,
    entries: Mutex<HashMap<PathBuf, Arc<OnceCell<LoadState>>>>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::with_loader(load_source)
    }
}

impl DatasetCache {
    pub fn with_loader(
        loader: impl Fn(&Path) -> Result<CleanedDataset, LoadError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            loader: Box::new(loader),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide cache used by the app.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: Lazy<DatasetCache> = Lazy::new(DatasetCache::default);
        &GLOBAL
    }

    /// Current state without triggering a load.
    pub fn state(&self, source: &Path) -> LoadState {
        self.lock()
            .get(source)
            .and_then(|cell| cell.get().cloned())
            .unwrap_or(LoadState::NotLoaded)
    }

    /// Load `source` once; later calls return the memoized outcome.
    pub fn load(&self, source: &Path) -> LoadState {
        // The map lock covers the lookup only; each load is guarded by its own cell.
        let cell = Arc::clone(self.lock().entry(source.to_path_buf()).or_default());
        cell.get_or_init(|| match (self.loader)(source) {
            Ok(dataset) if dataset.is_empty() => {
                log::warn!("{} has no records with a usable publish_time", source.display());
                LoadState::Loaded(Arc::new(dataset))
            }
            Ok(dataset) => {
                log::info!(
                    "Loaded {} cleaned records from {}",
                    dataset.len(),
                    source.display()
                );
                LoadState::Loaded(Arc::new(dataset))
            }
            Err(err) => {
                log::error!("{}", err.notice());
                LoadState::Failed(Arc::new(err))
            }
        })
        .clone()
    }

    /// Forget `source` so the next [`load`](Self::load) re-reads it.
    /// Returns whether an entry existed.
    pub fn invalidate(&self, source: &Path) -> bool {
        self.lock().remove(source).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<OnceCell<LoadState>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
