use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef};
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    ABSTRACT_PLACEHOLDER, CleanedDataset, CleanedRecord, JOURNAL_PLACEHOLDER, RawRecord,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a source produced no dataset at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    /// Text shown to the user before the session halts.
    pub fn notice(&self) -> String {
        match self {
            LoadError::NotFound { path } => format!(
                "{} not found. Please download metadata.csv from the CORD-19 dataset \
                 and place it alongside the app.",
                path.display()
            ),
            LoadError::Read { path, source } => {
                format!("Could not read {}: {source:#}", path.display())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and clean one source. Only a missing or unreadable source is an error;
/// bad rows are dropped by [`clean`].
pub fn load_source(path: &Path) -> Result<CleanedDataset, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let raw = read_file(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Read {} rows from {}", raw.len(), path.display());
    Ok(clean(raw))
}

/// Read the raw rows of a metadata table.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, quoted fields (anything unrecognised is read as CSV)
/// * `.json`    – `[{ "title": ..., "publish_time": ..., ... }, ...]`
/// * `.parquet` – any column types; cells are rendered to text
pub fn read_file(path: &Path) -> Result<Vec<RawRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        _ => load_csv(path),
    }
}

// ---------------------------------------------------------------------------
// Column lookup shared by the tabular readers
// ---------------------------------------------------------------------------

/// Positions of the columns of interest. Only `publish_time` is mandatory.
#[derive(Debug)]
struct ColumnIndex {
    title: Option<usize>,
    authors: Option<usize>,
    journal: Option<usize>,
    abstract_text: Option<usize>,
    publish_time: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };
        Ok(ColumnIndex {
            title: find("title"),
            authors: find("authors"),
            journal: find("journal"),
            abstract_text: find("abstract"),
            publish_time: find("publish_time").context("missing 'publish_time' column")?,
        })
    }

    fn extract(&self, cell: impl Fn(usize) -> Option<String>) -> RawRecord {
        let text = |idx: Option<usize>| idx.and_then(&cell).filter(|s| !s.is_empty());
        RawRecord {
            title: text(self.title),
            authors: text(self.authors),
            journal: text(self.journal),
            abstract_text: text(self.abstract_text),
            publish_time: text(Some(self.publish_time)),
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Rows may be ragged and need not be valid UTF-8; both are tolerated so a
/// single bad row never fails the whole load.
fn load_csv(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("CSV row {}", rows.len()))?
    {
        rows.push(columns.extract(|idx| {
            record
                .get(idx)
                .map(|b| String::from_utf8_lossy(b).into_owned())
        }));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "...", "journal": "...", "publish_time": "2020-03-15" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;
    let objects: Vec<_> = records.iter().filter_map(|r| r.as_object()).collect();
    if objects.len() < records.len() {
        log::debug!("Skipped {} non-object JSON rows", records.len() - objects.len());
    }
    if !objects.is_empty() && !objects.iter().any(|o| o.contains_key("publish_time")) {
        bail!("missing 'publish_time' column");
    }

    Ok(objects
        .into_iter()
        .map(|obj| {
            let text = |key: &str| obj.get(key).and_then(json_to_text);
            RawRecord {
                title: text("title"),
                authors: text("authors"),
                journal: text("journal"),
                abstract_text: text("abstract"),
                publish_time: text("publish_time"),
            }
        })
        .collect())
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the metadata table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Date and timestamp columns are rendered
/// to ISO text and parsed like any other `publish_time`.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = ColumnIndex::from_headers(&headers)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(columns.extract(|idx| cell_text(batch.column(idx), row)));
        }
    }
    Ok(rows)
}

fn cell_text(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    array_value_to_string(col, row).ok()
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Cell values treated the same as an empty cell.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell)
}

/// Clean raw rows into a dataset, preserving source order.
pub fn clean(raw: impl IntoIterator<Item = RawRecord>) -> CleanedDataset {
    let mut dropped = 0usize;
    let records: Vec<CleanedRecord> = raw
        .into_iter()
        .filter_map(|rec| {
            let cleaned = clean_record(rec);
            if cleaned.is_none() {
                dropped += 1;
            }
            cleaned
        })
        .collect();
    log::info!(
        "Kept {} records, dropped {dropped} without a usable publish_time",
        records.len()
    );
    CleanedDataset::from_records(records)
}

/// `None` when `publish_time` is missing or unparseable.
pub fn clean_record(raw: RawRecord) -> Option<CleanedRecord> {
    let present = |cell: Option<String>| cell.filter(|s| !is_missing(s));

    let publish_time = parse_publish_time(&present(raw.publish_time)?)?;
    Some(CleanedRecord {
        title: present(raw.title),
        authors: present(raw.authors),
        journal: present(raw.journal).unwrap_or_else(|| JOURNAL_PLACEHOLDER.to_string()),
        abstract_text: present(raw.abstract_text)
            .unwrap_or_else(|| ABSTRACT_PLACEHOLDER.to_string()),
        year: publish_time.year(),
        publish_time,
    })
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y %b %d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a `publish_time` cell into a calendar date.
///
/// The moment must be representable as a nanosecond timestamp
/// (1677-09-21 00:12:43.145224193 ..= 2262-04-11 23:47:16.854775807);
/// anything outside is rejected like an unparseable cell.
pub fn parse_publish_time(text: &str) -> Option<NaiveDate> {
    let moment = parse_moment(text.trim())?;
    // i64::MIN is the missing-timestamp sentinel, not a valid moment.
    let nanos = moment.and_utc().timestamp_nanos_opt()?;
    (nanos != i64::MIN).then(|| moment.date())
}

/// Date-only shapes resolve to midnight.
fn parse_moment(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_partial_date(text))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
}

/// `YYYY` or `YYYY-MM`, resolved to the first day of the period.
fn parse_partial_date(text: &str) -> Option<NaiveDate> {
    let is_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    let (year, month) = match text.split_once('-') {
        None => (text, None),
        Some((y, m)) => (y, Some(m)),
    };
    if !is_digits(year, 4) {
        return None;
    }
    let month = match month {
        None => 1,
        Some(m) if is_digits(m, 2) => m.parse().ok()?,
        Some(_) => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Date32Array, StringArray, TimestampNanosecondArray};
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    fn raw(publish_time: Option<&str>) -> RawRecord {
        RawRecord {
            title: Some("A title".into()),
            authors: Some("Doe, J.".into()),
            journal: Some("Lancet".into()),
            abstract_text: Some("Some abstract".into()),
            publish_time: publish_time.map(String::from),
        }
    }

    fn to_raw(rec: &CleanedRecord) -> RawRecord {
        RawRecord {
            title: rec.title.clone(),
            authors: rec.authors.clone(),
            journal: Some(rec.journal.clone()),
            abstract_text: Some(rec.abstract_text.clone()),
            publish_time: Some(rec.publish_time.format("%Y-%m-%d").to_string()),
        }
    }

    #[test]
    fn parses_common_date_shapes() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        assert_eq!(parse_publish_time("2020-03-15"), d(2020, 3, 15));
        assert_eq!(parse_publish_time(" 2020/03/15 "), d(2020, 3, 15));
        assert_eq!(parse_publish_time("03/15/2020"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020 Mar 15"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("15 March 2020"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("March 15, 2020"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020-03-15 10:30:00"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020-03-15T10:30:00.250"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020-03-15T10:30:00+02:00"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020-03-15T10:30:00Z"), d(2020, 3, 15));
        assert_eq!(parse_publish_time("2020-03"), d(2020, 3, 1));
        assert_eq!(parse_publish_time("2019"), d(2019, 1, 1));
    }

    #[test]
    fn rejects_malformed_dates() {
        for text in ["not-a-date", "", "   ", "2020-13-01", "2020-02-30", "20", "2020-3x", "3000-01-01"] {
            assert_eq!(parse_publish_time(text), None, "{text:?} should not parse");
        }
    }

    #[test]
    fn dates_outside_nanosecond_timestamps_are_rejected() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day);
        // Midnight of 1677-09-21 is before the earliest timestamp; noon is not.
        assert_eq!(parse_publish_time("1677-09-21"), None);
        assert_eq!(parse_publish_time("1677-09-21 12:00:00"), d(1677, 9, 21));
        assert_eq!(parse_publish_time("1677-09-22"), d(1677, 9, 22));
        assert_eq!(parse_publish_time("1677"), None);
        assert_eq!(parse_publish_time("2262-04-11"), d(2262, 4, 11));
        assert_eq!(parse_publish_time("2262-04-11T23:50:00"), None);
        assert_eq!(parse_publish_time("2262-04-12"), None);
        assert_eq!(parse_publish_time("2262"), d(2262, 1, 1));
    }

    #[test]
    fn malformed_date_drops_record_even_with_other_fields() {
        assert!(clean_record(raw(Some("not-a-date"))).is_none());
        assert!(clean_record(raw(None)).is_none());
        assert!(clean_record(raw(Some("NaN"))).is_none());
    }

    #[test]
    fn placeholders_fill_missing_journal_and_abstract() {
        let mut rec = raw(Some("2021-01-02"));
        rec.journal = None;
        rec.abstract_text = Some("nan".into());
        let cleaned = clean_record(rec).unwrap();
        assert_eq!(cleaned.journal, JOURNAL_PLACEHOLDER);
        assert_eq!(cleaned.abstract_text, ABSTRACT_PLACEHOLDER);
        assert_eq!(cleaned.year, 2021);
    }

    #[test]
    fn missing_title_stays_missing() {
        let mut rec = raw(Some("2021-01-02"));
        rec.title = Some("NA".into());
        assert_eq!(clean_record(rec).unwrap().title, None);
    }

    #[test]
    fn year_matches_publish_time() {
        let rows = ["2019-12-31", "2020", "2021-06", "January 5, 2022"]
            .into_iter()
            .map(|d| raw(Some(d)));
        let ds = clean(rows);
        assert_eq!(ds.len(), 4);
        for rec in ds.records() {
            assert_eq!(rec.year, rec.publish_time.year());
        }
        assert_eq!(ds.year_bounds(), Some((2019, 2022)));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let mut no_journal = raw(Some("2020-05-05"));
        no_journal.journal = None;
        no_journal.abstract_text = None;
        no_journal.title = None;
        let once = clean(vec![
            raw(Some("2020-01-01")),
            raw(Some("garbage")),
            no_journal,
            raw(Some("2018")),
        ]);
        let twice = clean(once.records().iter().map(to_raw));
        assert_eq!(once.records(), twice.records());
    }

    #[test]
    fn csv_reading_tolerates_bad_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(
            &path,
            "cord_uid,title,authors,journal,abstract,publish_time\n\
             a1,Viral spread,\"Doe, J.; Roe, R.\",Lancet,Text,2020-03-15\n\
             a2,No date,Doe,,,\n\
             a3,Bad date,Doe,BMJ,Text,not-a-date\n\
             a4,\"Short row\",Doe\n\
             a5,,Doe,,,2021\n",
        )
        .unwrap();

        let rows = read_file(&path).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].authors.as_deref(), Some("Doe, J.; Roe, R."));
        assert_eq!(rows[3].publish_time, None);

        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].title.as_deref(), Some("Viral spread"));
        assert_eq!(ds.records()[1].title, None);
        assert_eq!(ds.records()[1].journal, JOURNAL_PLACEHOLDER);
    }

    fn write_csv_records(path: &Path, rows: &[RawRecord]) {
        let mut writer = csv::Writer::from_path(path).unwrap();
        for row in rows {
            writer.serialize(row).unwrap();
        }
        writer.flush().unwrap();
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn csv_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        let mut bytes = b"title,journal,publish_time\nCaf".to_vec();
        bytes.extend_from_slice(b"\xff study,BMJ,2020-02-02\nPlain,BMJ,2021-01-01\n");
        fs::write(&path, bytes).unwrap();

        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].title.as_deref(), Some("Caf\u{fffd} study"));
        assert_eq!(ds.records()[1].title.as_deref(), Some("Plain"));
    }

    #[test]
    fn unknown_extension_is_read_as_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.txt");
        write_csv_records(
            &path,
            &[
                raw(Some("2020-03-15T10:30:00Z")),
                RawRecord {
                    title: Some("Second".into()),
                    publish_time: Some("2022-07-01".into()),
                    ..RawRecord::default()
                },
            ],
        );

        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].abstract_text, "Some abstract");
        assert_eq!(ds.records()[0].year, 2020);
        assert_eq!(ds.records()[1].journal, JOURNAL_PLACEHOLDER);
        assert_eq!(ds.year_bounds(), Some((2020, 2022)));
    }

    #[test]
    fn csv_without_publish_time_column_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "title,journal\nX,Y\n").unwrap();
        let err = load_source(&path).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.notice().contains("publish_time"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_source(&dir.path().join("metadata.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.notice().contains("not found"));
    }

    #[test]
    fn json_records_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(
            &path,
            r#"[
                {"title": "One", "journal": null, "publish_time": "2020-04-01"},
                {"title": "Two", "journal": "Nature", "publish_time": 2021},
                "not an object",
                {"title": "Three", "publish_time": ""}
            ]"#,
        )
        .unwrap();
        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].journal, JOURNAL_PLACEHOLDER);
        assert_eq!(ds.records()[1].year, 2021);
    }

    #[test]
    fn parquet_dates_and_strings_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, true),
            Field::new("journal", DataType::Utf8, true),
            Field::new("publish_time", DataType::Date32, true),
        ]));
        // Days since the epoch: 2020-01-01 = 18262.
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("Alpha"), None, Some("Gamma")])),
                Arc::new(StringArray::from(vec![Some("Cell"), Some("Cell"), None])),
                Arc::new(Date32Array::from(vec![Some(18262), None, Some(18262 + 366)])),
            ],
        )
        .unwrap();
        write_parquet(&path, &batch);

        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].year, 2020);
        assert_eq!(ds.records()[1].year, 2021);
        assert_eq!(ds.records()[1].journal, JOURNAL_PLACEHOLDER);
        assert_eq!(ds.records()[0].abstract_text, ABSTRACT_PLACEHOLDER);
    }

    #[test]
    fn pq_timestamps_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("metadata.pq");

        let nanos = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
                .and_utc()
                .timestamp_nanos_opt()
                .unwrap()
        };
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, true),
            Field::new(
                "publish_time",
                DataType::Timestamp(TimeUnit::Nanosecond, None),
                true,
            ),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some("Early"), Some("Late"), Some("Never")])),
                Arc::new(TimestampNanosecondArray::from(vec![
                    Some(nanos(2020, 3, 15)),
                    Some(nanos(2021, 12, 31)),
                    None,
                ])),
            ],
        )
        .unwrap();
        write_parquet(&path, &batch);

        let ds = load_source(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].publish_time, NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());
        assert_eq!(ds.records()[1].year, 2021);
        assert_eq!(ds.records()[1].title.as_deref(), Some("Late"));
    }
}
