use super::model::{CleanedDataset, CleanedRecord, YearInterval};

// ---------------------------------------------------------------------------
// Year filter: which records fall inside the selected interval
// ---------------------------------------------------------------------------

/// Return indices of records whose `year` lies in `interval` (inclusive),
/// in source order.
pub fn filtered_indices(dataset: &CleanedDataset, interval: YearInterval) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| interval.contains(rec.year))
        .map(|(i, _)| i)
        .collect()
}

/// The records of one dataset that pass a year filter.
///
/// Borrows the dataset; built fresh for every interval and never mutated.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a CleanedDataset,
    interval: YearInterval,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a CleanedDataset, interval: YearInterval) -> Self {
        FilteredView {
            dataset,
            interval,
            indices: filtered_indices(dataset, interval),
        }
    }

    pub fn interval(&self) -> YearInterval {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CleanedRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }
}
