use std::collections::{BTreeMap, HashMap};

use super::filter::FilteredView;
use super::model::{CleanedDataset, YearInterval};
use super::words::TitleCloud;

/// Journals listed in the top-journals chart.
pub const TOP_JOURNALS: usize = 10;
/// Rows in the sample table.
pub const SAMPLE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Yearly counts
// ---------------------------------------------------------------------------

/// Papers per publication year, ascending by year. Only observed years appear.
pub type YearCounts = BTreeMap<i32, usize>;

pub fn year_counts(view: &FilteredView<'_>) -> YearCounts {
    let mut counts = YearCounts::new();
    for rec in view.iter() {
        *counts.entry(rec.year).or_default() += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Journal counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalCount {
    pub journal: String,
    pub count: usize,
}

/// Papers per journal, in the order each journal first appears in the view.
pub fn journal_counts(view: &FilteredView<'_>) -> Vec<JournalCount> {
    let mut counts: Vec<JournalCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for rec in view.iter() {
        match index.get(rec.journal.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&rec.journal, counts.len());
                counts.push(JournalCount {
                    journal: rec.journal.clone(),
                    count: 1,
                });
            }
        }
    }
    counts
}

/// The `n` journals with most papers, descending. Ties keep first-seen order.
pub fn top_journals(view: &FilteredView<'_>, n: usize) -> Vec<JournalCount> {
    let mut counts = journal_counts(view);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Chart order for a top-journals list: ascending by count, so the largest
/// bar ends up last (drawn at the top of a horizontal chart).
pub fn chart_order(top: &[JournalCount]) -> Vec<JournalCount> {
    let mut ordered = top.to_vec();
    ordered.sort_by_key(|j| j.count);
    ordered
}

// ---------------------------------------------------------------------------
// Sample rows
// ---------------------------------------------------------------------------

/// One row of the sample table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: String,
    pub year: i32,
    pub abstract_text: String,
}

pub fn sample_rows(view: &FilteredView<'_>, n: usize) -> Vec<SampleRow> {
    view.iter()
        .take(n)
        .map(|rec| SampleRow {
            title: rec.title.clone(),
            authors: rec.authors.clone(),
            journal: rec.journal.clone(),
            year: rec.year,
            abstract_text: rec.abstract_text.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Report – everything shown for one interval
// ---------------------------------------------------------------------------

/// All aggregates for one interval, owned so the UI can keep it between frames.
#[derive(Debug, Clone)]
pub struct Report {
    pub interval: YearInterval,
    pub paper_count: usize,
    pub year_counts: YearCounts,
    /// Descending by count.
    pub top_journals: Vec<JournalCount>,
    /// Same journals, ascending by count.
    pub journals_for_chart: Vec<JournalCount>,
    pub title_cloud: TitleCloud,
    pub sample: Vec<SampleRow>,
}

impl Report {
    pub fn status_line(&self) -> String {
        format!(
            "Showing {} papers published between {} and {}.",
            self.paper_count, self.interval.start, self.interval.end
        )
    }
}

/// Run the filter and every aggregate for `interval`.
pub fn render_report(dataset: &CleanedDataset, interval: YearInterval) -> Report {
    let view = FilteredView::new(dataset, interval);
    let top = top_journals(&view, TOP_JOURNALS);
    let report = Report {
        interval: view.interval(),
        paper_count: view.len(),
        year_counts: year_counts(&view),
        journals_for_chart: chart_order(&top),
        top_journals: top,
        title_cloud: TitleCloud::from_titles(view.iter().filter_map(|r| r.title.as_deref())),
        sample: sample_rows(&view, SAMPLE_ROWS),
    };
    if view.is_empty() {
        log::debug!("Report {interval}: no papers in range");
    } else {
        log::debug!(
            "Report {}: {} papers over {} years, {} journals listed",
            interval,
            report.paper_count,
            report.year_counts.len(),
            report.top_journals.len()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::tests::dataset;
    use crate::data::model::JOURNAL_PLACEHOLDER;

    #[test]
    fn five_record_scenario() {
        let ds = dataset(&[
            (2019, Some("A"), Some("Old news")),
            (2020, Some("A"), Some("Masks")),
            (2020, Some("B"), Some("Ventilators")),
            (2021, Some("B"), Some("Vaccines")),
            (2021, Some("C"), Some("Boosters")),
        ]);
        let report = render_report(&ds, YearInterval::new(2020, 2021));
        assert_eq!(report.paper_count, 4);
        assert_eq!(report.year_counts, YearCounts::from([(2020, 2), (2021, 2)]));
    }

    #[test]
    fn status_line_matches_view_length() {
        let ds = dataset(&[
            (2018, None, None),
            (2019, None, None),
            (2020, None, None),
            (2020, None, None),
            (2022, None, None),
        ]);
        for start in 2017..=2023 {
            for end in start..=2023 {
                let interval = YearInterval::new(start, end);
                let report = render_report(&ds, interval);
                let expected = FilteredView::new(&ds, interval).len();
                assert_eq!(report.paper_count, expected);
                assert!(report
                    .status_line()
                    .starts_with(&format!("Showing {expected} papers")));
            }
        }
    }

    #[test]
    fn interval_without_papers_renders_empty_report() {
        let ds = dataset(&[(2019, Some("A"), Some("Masks")), (2022, Some("B"), Some("Vaccines"))]);
        let report = render_report(&ds, YearInterval::new(2020, 2021));
        assert_eq!(report.paper_count, 0);
        assert!(report.year_counts.is_empty());
        assert!(report.top_journals.is_empty());
        assert!(report.journals_for_chart.is_empty());
        assert!(report.sample.is_empty());
        assert_eq!(report.title_cloud, TitleCloud::NoTitles);
        assert_eq!(
            report.status_line(),
            "Showing 0 papers published between 2020 and 2021."
        );
    }

    #[test]
    fn year_counts_skip_gap_years() {
        let ds = dataset(&[(2022, None, None), (2018, None, None), (2022, None, None)]);
        let view = FilteredView::new(&ds, YearInterval::new(2000, 2030));
        let counts: Vec<_> = year_counts(&view).into_iter().collect();
        assert_eq!(counts, vec![(2018, 1), (2022, 2)]);
    }

    #[test]
    fn top_journals_limit_order_and_ties() {
        // 12 journals: J0 x3, J1..J11 x1, then K x3 appearing after J0.
        let mut rows: Vec<(i32, Option<String>, Option<&str>)> = Vec::new();
        for i in 0..12 {
            rows.push((2020, Some(format!("J{i}")), None));
        }
        rows.push((2020, Some("K".to_string()), None));
        rows.push((2020, Some("J0".to_string()), None));
        rows.push((2020, Some("K".to_string()), None));
        rows.push((2020, Some("J0".to_string()), None));
        rows.push((2020, Some("K".to_string()), None));
        let rows: Vec<_> = rows
            .iter()
            .map(|(y, j, t)| (*y, j.as_deref(), *t))
            .collect();
        let ds = dataset(&rows);
        let view = FilteredView::new(&ds, YearInterval::new(2020, 2020));

        let top = top_journals(&view, TOP_JOURNALS);
        assert_eq!(top.len(), 10);
        let names: Vec<&str> = top.iter().map(|j| j.journal.as_str()).collect();
        assert_eq!(
            names,
            vec!["J0", "K", "J1", "J2", "J3", "J4", "J5", "J6", "J7", "J8"]
        );
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));

        let chart = chart_order(&top);
        assert_eq!(chart.first().unwrap().count, 1);
        assert_eq!(chart.last().unwrap().count, 3);
        assert!(chart.windows(2).all(|w| w[0].count <= w[1].count));
    }

    #[test]
    fn missing_journal_counts_as_placeholder() {
        let ds = dataset(&[(2020, None, None), (2020, Some("Nature"), None), (2021, None, None)]);
        let view = FilteredView::new(&ds, YearInterval::new(2020, 2021));
        let top = top_journals(&view, TOP_JOURNALS);
        assert_eq!(
            top[0],
            JournalCount {
                journal: JOURNAL_PLACEHOLDER.to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn untitled_interval_gives_no_titles_notice() {
        let ds = dataset(&[(2019, None, Some("Bat coronavirus")), (2021, None, None)]);
        let report = render_report(&ds, YearInterval::new(2020, 2021));
        assert_eq!(report.title_cloud, TitleCloud::NoTitles);

        let report = render_report(&ds, YearInterval::new(2019, 2021));
        assert!(matches!(report.title_cloud, TitleCloud::Words(_)));
    }

    #[test]
    fn sample_is_first_rows_in_source_order() {
        let rows: Vec<_> = (0..15).map(|i| (2005 + i, None, None)).collect();
        let ds = dataset(&rows);
        let view = FilteredView::new(&ds, YearInterval::new(2008, 2030));
        let sample = sample_rows(&view, SAMPLE_ROWS);
        assert_eq!(sample.len(), 10);
        let years: Vec<i32> = sample.iter().map(|r| r.year).collect();
        assert_eq!(years, (2008..2018).collect::<Vec<_>>());
        assert_eq!(sample[0].authors.as_deref(), Some("Author"));
    }
}
