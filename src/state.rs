use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::aggregate::{Report, render_report};
use crate::data::cache::{DatasetCache, LoadState};
use crate::data::cloud::CloudLayout;
use crate::data::model::{CleanedDataset, YearInterval};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A loaded, non-empty dataset and everything derived for the current interval.
pub struct Explorer {
    pub dataset: Arc<CleanedDataset>,
    /// `(min_year, max_year)` of the dataset; the range control is clamped to it.
    pub bounds: (i32, i32),
    pub interval: YearInterval,
    pub report: Report,
    /// Word-cloud placement for `report`, computed on first paint.
    pub cloud: Option<CloudLayout>,
}

/// What the central panel can show.
pub enum Session {
    /// The source yielded no usable records; nothing but the notice is shown.
    Halted { notice: String },
    Ready(Box<Explorer>),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source the current session was loaded from.
    pub source: PathBuf,
    /// Start year used for the default interval of every new session.
    pub preferred_start: i32,
    pub session: Session,
}

impl AppState {
    /// Load `source` through `cache` and prepare the first report.
    ///
    /// Sequence: load → check for an empty dataset (halt) → year bounds →
    /// default interval → report.
    pub fn initialize(cache: &DatasetCache, source: PathBuf, preferred_start: i32) -> Self {
        let session = Self::start_session(cache, &source, preferred_start);
        AppState {
            source,
            preferred_start,
            session,
        }
    }

    fn start_session(cache: &DatasetCache, source: &Path, preferred_start: i32) -> Session {
        let state = cache.load(source);
        let dataset = state.dataset();

        let Some((min, max)) = dataset.year_bounds() else {
            let notice = match state.error() {
                Some(err) => err.notice(),
                None => format!(
                    "{} contains no records with a valid publish_time.",
                    source.display()
                ),
            };
            log::warn!("Session halted: {notice}");
            return Session::Halted { notice };
        };

        let interval = YearInterval::default_for(min, max, preferred_start);
        let report = render_report(&dataset, interval);
        Session::Ready(Box::new(Explorer {
            dataset,
            bounds: (min, max),
            interval,
            report,
            cloud: None,
        }))
    }

    /// Switch to another source (File → Open…).
    pub fn open(&mut self, cache: &DatasetCache, source: PathBuf) {
        if matches!(cache.state(&source), LoadState::Loaded(_)) {
            log::debug!("{} already loaded, reusing cached dataset", source.display());
        }
        self.session = Self::start_session(cache, &source, self.preferred_start);
        self.source = source;
    }

    /// Re-read the current source, bypassing the cached entry.
    pub fn reload(&mut self, cache: &DatasetCache) {
        cache.invalidate(&self.source);
        self.session = Self::start_session(cache, &self.source, self.preferred_start);
    }

    /// Apply a new interval from the range control. No-op while halted or
    /// when the clamped interval is unchanged.
    pub fn set_interval(&mut self, interval: YearInterval) {
        let Session::Ready(explorer) = &mut self.session else {
            return;
        };
        let (min, max) = explorer.bounds;
        let interval = interval.clamped(min, max);
        if interval == explorer.interval {
            return;
        }
        explorer.interval = interval;
        explorer.report = render_report(&explorer.dataset, interval);
        explorer.cloud = None;
    }

    pub fn explorer(&self) -> Option<&Explorer> {
        match &self.session {
            Session::Ready(explorer) => Some(&**explorer),
            Session::Halted { .. } => None,
        }
    }
}
