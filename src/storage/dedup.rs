//! In-memory deduplicating buffer in front of the CSV sink
//!
//! Records are keyed by [`SinkRecord::key`]. A key is written at most once per
//! buffer lifetime; the seen-set starts empty every run unless it is seeded
//! from the sink file with [`DedupBuffer::seed_from_sink`].

use std::collections::HashSet;

use crate::error::Result;
use crate::storage::{CsvSink, SinkRecord};

/// Bounded buffer that drops repeated keys and flushes to a [`CsvSink`]
///
/// After [`add`](Self::add) returns, fewer than `threshold` records are
/// pending. [`close`](Self::close) leaves none.
pub struct DedupBuffer<R: SinkRecord> {
    sink: CsvSink,
    pending: Vec<R>,
    seen: HashSet<String>,
    threshold: usize,
    written: usize,
}

impl<R: SinkRecord> DedupBuffer<R> {
    /// Create a buffer; a zero threshold is treated as 1
    pub fn new(sink: CsvSink, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            sink,
            pending: Vec::with_capacity(threshold),
            seen: HashSet::new(),
            threshold,
            written: 0,
        }
    }

    /// Mark every key already present in the sink file as seen
    ///
    /// Returns the number of keys loaded.
    pub fn seed_from_sink(&mut self) -> Result<usize> {
        let keys = self.sink.read_keys(R::KEY_COLUMN)?;
        let loaded = keys.len();
        self.seen.extend(keys);
        tracing::debug!(loaded, path = %self.sink.path().display(), "Seeded seen-set from sink");
        Ok(loaded)
    }

    /// Queue `record` unless its key was seen before
    ///
    /// Returns `true` if the record was accepted. Flushes when the pending
    /// queue reaches the threshold.
    pub fn add(&mut self, record: R) -> Result<bool> {
        if !self.seen.insert(record.key().to_string()) {
            tracing::trace!(key = %record.key(), "Duplicate record dropped");
            return Ok(false);
        }

        self.pending.push(record);
        if self.pending.len() >= self.threshold {
            self.flush()?;
        }
        Ok(true)
    }

    /// Write all pending records to the sink
    ///
    /// If the write fails part way, the rows that reached the file leave the
    /// queue and the rest stay pending, so a later flush does not repeat
    /// them. Returns the number of rows written.
    pub fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut rows = 0;
        let result = self.sink.append_counted(&self.pending, &mut rows);
        self.pending.drain(..rows);
        self.written += rows;
        result?;

        tracing::debug!(rows, total = self.written, "Flushed dedup buffer");
        Ok(rows)
    }

    /// Flush whatever is left
    pub fn close(&mut self) -> Result<usize> {
        self.flush()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Rows written to the sink by this buffer so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn sink(&self) -> &CsvSink {
        &self.sink
    }
}

impl<R: SinkRecord> Drop for DedupBuffer<R> {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Err(e) = self.flush() {
            tracing::warn!(
                error = %e,
                pending = self.pending.len(),
                "Dropping dedup buffer with unflushed records"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchResult;
    use std::fs;
    use tempfile::TempDir;

    fn record(link: &str) -> SearchResult {
        SearchResult::new("kw", "title", link, 1)
    }

    fn data_rows(sink: &CsvSink) -> Vec<String> {
        fs::read_to_string(sink.path())
            .unwrap_or_default()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_duplicates_dropped() {
        let dir = TempDir::new().unwrap();
        let mut buffer = DedupBuffer::new(CsvSink::new(dir.path().join("r.csv")), 10);

        assert!(buffer.add(record("a")).unwrap());
        assert!(buffer.add(record("b")).unwrap());
        assert!(!buffer.add(record("a")).unwrap());
        assert!(buffer.add(record("c")).unwrap());
        assert_eq!(buffer.pending_len(), 3);

        assert_eq!(buffer.close().unwrap(), 3);
        assert_eq!(buffer.pending_len(), 0);
        assert_eq!(buffer.written(), 3);
    }

    #[test]
    fn test_auto_flush_at_threshold() {
        let dir = TempDir::new().unwrap();
        let mut buffer = DedupBuffer::new(CsvSink::new(dir.path().join("r.csv")), 2);

        buffer.add(record("a")).unwrap();
        assert_eq!(buffer.pending_len(), 1);
        assert!(!buffer.sink().path().exists());

        buffer.add(record("b")).unwrap();
        assert_eq!(buffer.pending_len(), 0);
        assert_eq!(data_rows(buffer.sink()).len(), 2);
    }

    #[test]
    fn test_flush_when_empty_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut buffer: DedupBuffer<SearchResult> =
            DedupBuffer::new(CsvSink::new(dir.path().join("r.csv")), 5);
        assert_eq!(buffer.flush().unwrap(), 0);
        assert_eq!(buffer.close().unwrap(), 0);
        assert!(!buffer.sink().path().exists());
    }

    #[test]
    fn test_zero_threshold_clamped() {
        let dir = TempDir::new().unwrap();
        let mut buffer = DedupBuffer::new(CsvSink::new(dir.path().join("r.csv")), 0);
        assert_eq!(buffer.threshold(), 1);
        buffer.add(record("a")).unwrap();
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_drop_flushes_pending() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("r.csv"));
        {
            let mut buffer = DedupBuffer::new(sink.clone(), 10);
            buffer.add(record("a")).unwrap();
        }
        assert_eq!(data_rows(&sink).len(), 1);
    }

    #[test]
    fn test_failed_flush_keeps_pending() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let mut buffer = DedupBuffer::new(CsvSink::new(dir.path()), 10);
        buffer.add(record("a")).unwrap();
        assert!(buffer.flush().is_err());
        assert_eq!(buffer.pending_len(), 1);
    }
}
