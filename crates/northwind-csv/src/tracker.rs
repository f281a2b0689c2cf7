//! Append-only tracking file.
//!
//! # File Format
//! - Header: `Id,URLRequest,SourceIp,TimeOfAction`
//! - One row per request, written and flushed immediately
//! - `TimeOfAction` is RFC 3339 UTC with microseconds
//!
//! Identifier assignment and the append happen under one mutex, so concurrent
//! callers never see a duplicate id. An id is consumed even when its append
//! fails, since a partial row may already be on disk; failures leave gaps.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use northwind_core::{
    parse_timestamp, CoreError, CoreResult, RequestTracker, TrackingEntry,
};
use parking_lot::Mutex;

pub const TRACKING_FILE: &str = "webtracker.csv";
pub const TRACKING_HEADER: [&str; 4] = ["Id", "URLRequest", "SourceIp", "TimeOfAction"];

/// CSV-file implementation of [`RequestTracker`].
pub struct CsvRequestTracker {
    path: PathBuf,
    next_id: Mutex<i64>,
}

impl CsvRequestTracker {
    /// Opens (without creating) the tracking file at `path`.
    ///
    /// The next identifier continues from the largest id already in the
    /// file, or starts at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let max_id = if path.exists() {
            read_entries(&path)?.iter().map(|e| e.id).max().unwrap_or(0)
        } else {
            0
        };

        tracing::debug!(path = %path.display(), next_id = max_id + 1, "Opened tracking file");

        Ok(Self {
            path,
            next_id: Mutex::new(max_id + 1),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn track_blocking(&self, url_request: &str, source_ip: &str) -> CoreResult<TrackingEntry> {
        let mut next_id = self.next_id.lock();
        let entry = TrackingEntry::new(*next_id, url_request, source_ip);
        *next_id += 1;
        append_entry(&self.path, &entry)?;
        Ok(entry)
    }

    fn recent_blocking(&self, limit: usize) -> CoreResult<Vec<TrackingEntry>> {
        let _writer = self.next_id.lock();
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut entries = read_entries(&self.path)?;
        entries.sort_by(|a, b| b.id.cmp(&a.id));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[async_trait]
impl RequestTracker for CsvRequestTracker {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn track(&self, url_request: &str, source_ip: &str) -> CoreResult<TrackingEntry> {
        self.track_blocking(url_request, source_ip)
    }

    async fn recent(&self, limit: usize) -> CoreResult<Vec<TrackingEntry>> {
        self.recent_blocking(limit)
    }
}

fn append_entry(path: &Path, entry: &TrackingEntry) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    if needs_header {
        writer.write_record(TRACKING_HEADER).map_err(csv_error)?;
    }
    writer
        .write_record([
            entry.id.to_string().as_str(),
            entry.url_request.as_str(),
            entry.source_ip.as_str(),
            entry.timestamp_text().as_str(),
        ])
        .map_err(csv_error)?;
    writer.flush()?;
    Ok(())
}

/// Reads all well-formed rows; malformed rows are skipped.
fn read_entries(path: &Path) -> CoreResult<Vec<TrackingEntry>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(csv_error(err)),
            Err(_) => continue,
        };

        let (Some(id), Some(url), Some(ip), Some(ts)) =
            (record.get(0), record.get(1), record.get(2), record.get(3))
        else {
            continue;
        };
        let (Ok(id), Ok(time_of_action)) = (id.trim().parse::<i64>(), parse_timestamp(ts)) else {
            continue;
        };

        entries.push(TrackingEntry {
            id,
            url_request: url.to_string(),
            source_ip: ip.to_string(),
            time_of_action,
        });
    }
    Ok(entries)
}

fn csv_error(err: csv::Error) -> CoreError {
    CoreError::internal(format!("tracking file: {err}"))
}
