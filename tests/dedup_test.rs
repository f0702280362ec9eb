//! Dedup buffer and CSV sink across buffer lifetimes

use std::fs;
use tempfile::TempDir;
use tripdesk::models::{SearchResult, UrlRow};
use tripdesk::storage::{CsvSink, DedupBuffer};

fn result(link: &str, rank: usize) -> SearchResult {
    SearchResult::new("hoteles", "Hotel", link, rank)
}

fn data_lines(sink: &CsvSink) -> Vec<String> {
    fs::read_to_string(sink.path())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_repeated_link_written_once() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));

    let mut buffer = DedupBuffer::new(sink.clone(), 10);
    for (i, link) in ["https://a.es/", "https://b.es/", "https://a.es/", "https://c.es/"]
        .iter()
        .enumerate()
    {
        buffer.add(result(link, i + 1)).unwrap();
    }
    assert_eq!(buffer.close().unwrap(), 3);

    let lines = data_lines(&sink);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("https://a.es/"));
    assert!(lines[2].contains("https://b.es/"));
    assert!(lines[3].contains("https://c.es/"));
}

#[test]
fn test_pending_stays_below_threshold() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));
    let mut buffer = DedupBuffer::new(sink, 3);

    for i in 0..10 {
        buffer.add(result(&format!("https://site{i}.es/"), 1)).unwrap();
        assert!(buffer.pending_len() < 3);
    }
    assert_eq!(buffer.written(), 9);
    buffer.close().unwrap();
    assert_eq!(buffer.written(), 10);
    assert_eq!(buffer.pending_len(), 0);
}

#[test]
fn test_header_once_across_runs() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));

    for run in 0..3 {
        let mut buffer: DedupBuffer<UrlRow> = DedupBuffer::new(sink.clone(), 5);
        buffer
            .add(UrlRow::from(&result(&format!("https://run{run}.es/"), 1)))
            .unwrap();
        buffer.close().unwrap();
    }

    let lines = data_lines(&sink);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "timestamp,url");
    assert_eq!(lines.iter().filter(|l| *l == "timestamp,url").count(), 1);
}

#[test]
fn test_new_run_forgets_without_seeding() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));

    let mut first = DedupBuffer::new(sink.clone(), 10);
    first.add(result("https://a.es/", 1)).unwrap();
    first.close().unwrap();

    let mut second = DedupBuffer::new(sink.clone(), 10);
    assert!(second.add(result("https://a.es/", 1)).unwrap());
    second.close().unwrap();

    assert_eq!(data_lines(&sink).len(), 3);
}

#[test]
fn test_seeded_run_skips_existing_links() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));

    let mut first = DedupBuffer::new(sink.clone(), 10);
    first.add(result("https://a.es/", 1)).unwrap();
    first.add(result("https://b.es/", 2)).unwrap();
    first.close().unwrap();

    let mut second: DedupBuffer<SearchResult> = DedupBuffer::new(sink.clone(), 10);
    assert_eq!(second.seed_from_sink().unwrap(), 2);
    assert!(!second.add(result("https://a.es/", 1)).unwrap());
    assert!(second.add(result("https://c.es/", 3)).unwrap());
    second.close().unwrap();

    assert_eq!(data_lines(&sink).len(), 4);
}

#[test]
fn test_seed_from_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut buffer: DedupBuffer<SearchResult> =
        DedupBuffer::new(CsvSink::new(dir.path().join("none.csv")), 10);
    assert_eq!(buffer.seed_from_sink().unwrap(), 0);
}

#[test]
fn test_seed_with_other_layout_fails() {
    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));

    let mut minimal: DedupBuffer<UrlRow> = DedupBuffer::new(sink.clone(), 10);
    minimal
        .add(UrlRow::from(&result("https://a.es/", 1)))
        .unwrap();
    minimal.close().unwrap();

    let mut rich: DedupBuffer<SearchResult> = DedupBuffer::new(sink, 10);
    assert!(rich.seed_from_sink().is_err());
}
