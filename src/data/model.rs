use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Substituted for a missing `abstract` cell.
pub const ABSTRACT_PLACEHOLDER: &str = "No abstract provided.";
/// Substituted for a missing `journal` cell.
pub const JOURNAL_PLACEHOLDER: &str = "Unknown Journal";
/// First year of the default analysis interval.
pub const DEFAULT_START_YEAR: i32 = 2020;

// ---------------------------------------------------------------------------
// RawRecord – one row as read from the source table
// ---------------------------------------------------------------------------

/// The columns of interest from one source row, exactly as read.
///
/// `None` means the column is absent or the cell was empty; NA markers such
/// as `"NaN"` are still text at this stage and are resolved during cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publish_time: Option<String>,
}

// ---------------------------------------------------------------------------
// CleanedRecord – a row that survived cleaning
// ---------------------------------------------------------------------------

/// A paper with a valid publication date and placeholder-filled text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedRecord {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: String,
    pub abstract_text: String,
    pub publish_time: NaiveDate,
    /// Calendar year of `publish_time`.
    pub year: i32,
}

// ---------------------------------------------------------------------------
// CleanedDataset – immutable result of the loader
// ---------------------------------------------------------------------------

/// All cleaned records in source order, with the year bounds computed once.
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    records: Vec<CleanedRecord>,
    year_bounds: Option<(i32, i32)>,
}

impl CleanedDataset {
    pub fn from_records(records: Vec<CleanedRecord>) -> Self {
        let year_bounds = records.iter().fold(None, |bounds, rec| match bounds {
            None => Some((rec.year, rec.year)),
            Some((lo, hi)) => Some((rec.year.min(lo), rec.year.max(hi))),
        });
        CleanedDataset {
            records,
            year_bounds,
        }
    }

    pub fn records(&self) -> &[CleanedRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(min_year, max_year)`, or `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }
}

// ---------------------------------------------------------------------------
// YearInterval – the user-controlled filter
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of publication years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearInterval {
    pub start: i32,
    pub end: i32,
}

impl YearInterval {
    pub fn new(start: i32, end: i32) -> Self {
        YearInterval { start, end }
    }

    /// `(preferred_start, max)` with the start pulled into `[min, max]`.
    ///
    /// Requires `min <= max`.
    pub fn default_for(min: i32, max: i32, preferred_start: i32) -> Self {
        YearInterval {
            start: preferred_start.clamp(min, max),
            end: max,
        }
    }

    /// Clamp both ends into `[min, max]` and restore `start <= end`.
    ///
    /// Requires `min <= max`.
    pub fn clamped(self, min: i32, max: i32) -> Self {
        let start = self.start.clamp(min, max);
        let end = self.end.clamp(min, max);
        YearInterval {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl fmt::Display for YearInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}
