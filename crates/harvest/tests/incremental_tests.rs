//! Incremental runs: change detection, full refresh and checkpoint resume.

mod common;

use std::path::PathBuf;

use common::harness::page_url;
use common::{card, card_url, JobBuilder, Site, TestHarness};
use harvest::error::SinkError;
use harvest::model::IncrementalMode;
use harvest::state::{IncrementalStateStore, STATUS_IN_PROGRESS};
use harvest::{ConfigError, HarvestError, Job, Record, Sink, SqliteStateStore};

/// Rejects every write, like a full disk.
struct FullDiskSink;

impl Sink for FullDiskSink {
    fn write(&mut self, _job: &Job, _records: &[Record]) -> Result<(), SinkError> {
        Err(SinkError::Io {
            path: PathBuf::from("/out/cafes.jsonl"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"),
        })
    }
}

fn cafes() -> Site {
    Site::paged(vec![vec![card(1, "Alpha"), card(2, "Bravo")]])
}

#[test]
fn test_changed_only_across_runs() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .build();

    let first = harness.run(&cafes(), &job).unwrap();
    assert_eq!(first.run_count, Some(1));
    assert_eq!(first.records_emitted, 2);
    assert_eq!(first.records_skipped_incremental, 0);

    harness.reset();
    let second = harness.run(&cafes(), &job).unwrap();
    assert_eq!(second.run_count, Some(2));
    assert_eq!(second.records_emitted, 0);
    assert_eq!(second.records_skipped_incremental, 2);
    assert_eq!(harness.write_sizes(), vec![0]);

    harness.reset();
    let renamed = Site::paged(vec![vec![card(1, "Alpha"), card(2, "Bravo Bar")]]);
    let third = harness.run(&renamed, &job).unwrap();
    assert_eq!(third.records_emitted, 1);
    assert_eq!(third.records_skipped_incremental, 1);
    assert_eq!(harness.written_urls(), vec![card_url(2)]);

    let store = SqliteStateStore::open(&harness.state_path()).unwrap();
    assert_eq!(store.run_count("cafes").unwrap(), 3);
    let row = store.record_state("cafes", &card_url(2)).unwrap().unwrap();
    assert_eq!(row.seen_count, 3);
}

#[test]
fn test_new_only_ignores_changes() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .incremental_mode(IncrementalMode::NewOnly)
        .build();

    harness
        .run(&Site::paged(vec![vec![card(1, "Alpha")]]), &job)
        .unwrap();

    harness.reset();
    let site = Site::paged(vec![vec![card(1, "Alpha renamed"), card(2, "Bravo")]]);
    let report = harness.run(&site, &job).unwrap();

    assert_eq!(report.records_emitted, 1);
    assert_eq!(report.records_skipped_incremental, 1);
    assert_eq!(harness.written_urls(), vec![card_url(2)]);
}

#[test]
fn test_all_mode_emits_everything() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .incremental_mode(IncrementalMode::All)
        .build();

    harness.run(&cafes(), &job).unwrap();
    harness.reset();
    let report = harness.run(&cafes(), &job).unwrap();

    assert_eq!(report.records_emitted, 2);
    assert_eq!(report.records_skipped_incremental, 0);
}

#[test]
fn test_full_refresh_every_second_run() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .full_refresh_every(2)
        .build();

    let first = harness.run(&cafes(), &job).unwrap();
    assert!(!first.full_refresh);
    assert_eq!(first.records_emitted, 2);

    let second = harness.run(&cafes(), &job).unwrap();
    assert!(second.full_refresh);
    assert_eq!(second.run_count, Some(2));
    assert_eq!(second.records_emitted, 2);

    let third = harness.run(&cafes(), &job).unwrap();
    assert!(!third.full_refresh);
    assert_eq!(third.records_emitted, 0);
}

#[test]
fn test_resume_after_fetch_failure() {
    let harness = TestHarness::new();
    let pages = vec![
        vec![card(1, "Alpha")],
        vec![card(2, "Bravo")],
        vec![card(3, "Charlie")],
    ];
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .build();

    let err = harness
        .run(&Site::paged(pages.clone()).failing_at(2), &job)
        .unwrap_err();
    assert!(matches!(err, HarvestError::Fetch(_)));
    assert!(harness.fetcher_closed());

    {
        let store = SqliteStateStore::open(&harness.state_path()).unwrap();
        let checkpoint = store.load_checkpoint("cafes").unwrap().unwrap();
        assert_eq!(checkpoint.page_index, 1);
        assert_eq!(checkpoint.status, STATUS_IN_PROGRESS);
        assert_eq!(checkpoint.request.unwrap().url, page_url(2));
    }

    harness.reset();
    let report = harness.run(&Site::paged(pages), &job).unwrap();

    assert_eq!(report.resumed_from_page, Some(1));
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(harness.fetched_urls(), vec![page_url(2), page_url(3)]);
    assert_eq!(harness.written_urls(), vec![card_url(2), card_url(3)]);

    let store = SqliteStateStore::open(&harness.state_path()).unwrap();
    assert!(store.load_checkpoint("cafes").unwrap().is_none());
    assert_eq!(store.run_count("cafes").unwrap(), 2);
}

#[test]
fn test_checkpoint_without_request_starts_fresh() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .max_pages(2)
        .build();
    {
        let store = SqliteStateStore::open(&harness.state_path()).unwrap();
        store
            .save_checkpoint("cafes", None, 2, STATUS_IN_PROGRESS)
            .unwrap();
    }

    let site = Site::paged(vec![vec![card(1, "Alpha")], vec![card(2, "Bravo")]]);
    let report = harness.run(&site, &job).unwrap();

    assert_eq!(report.resumed_from_page, None);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records_emitted, 2);
    assert_eq!(harness.fetched_urls(), vec![page_url(1), page_url(2)]);
}

#[test]
fn test_sink_failure_after_last_page_reruns_from_start() {
    let harness = TestHarness::new();
    let pages = vec![vec![card(1, "Alpha")], vec![card(2, "Bravo")]];
    // The failed run already stored these hashes.
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .incremental_mode(IncrementalMode::All)
        .build();

    let mut engine = harness
        .builder_with_sink(&Site::paged(pages.clone()), Box::new(FullDiskSink))
        .configure_for(&job)
        .unwrap()
        .build();
    let err = engine.run(&job).unwrap_err();
    assert!(matches!(err, HarvestError::Sink(_)));
    assert!(harness.fetcher_closed());

    {
        let store = SqliteStateStore::open(&harness.state_path()).unwrap();
        let checkpoint = store.load_checkpoint("cafes").unwrap().unwrap();
        assert_eq!(checkpoint.status, STATUS_IN_PROGRESS);
        assert_eq!(checkpoint.page_index, 2);
        assert!(checkpoint.request.is_none());
    }

    harness.reset();
    let report = harness.run(&Site::paged(pages), &job).unwrap();

    assert_eq!(report.resumed_from_page, None);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.records_emitted, 2);
    assert_eq!(harness.fetched_urls(), vec![page_url(1), page_url(2)]);
    assert_eq!(harness.written_urls(), vec![card_url(1), card_url(2)]);

    let store = SqliteStateStore::open(&harness.state_path()).unwrap();
    assert!(store.load_checkpoint("cafes").unwrap().is_none());
}

#[test]
fn test_resume_disabled_starts_over() {
    let harness = TestHarness::new();
    let pages = vec![vec![card(1, "Alpha")], vec![card(2, "Bravo")]];
    let job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .resume(false)
        .build();

    harness
        .run(&Site::paged(pages.clone()).failing_at(2), &job)
        .unwrap_err();
    {
        let store = SqliteStateStore::open(&harness.state_path()).unwrap();
        assert!(store.load_checkpoint("cafes").unwrap().is_none());
    }

    harness.reset();
    let report = harness.run(&Site::paged(pages), &job).unwrap();

    assert_eq!(report.resumed_from_page, None);
    assert_eq!(harness.fetched_urls(), vec![page_url(1), page_url(2)]);
    assert_eq!(report.records_emitted, 2);
}

#[test]
fn test_stream_chunks_are_filtered_incrementally() {
    let harness = TestHarness::new();
    let job = JobBuilder::new("cafes")
        .stream(1)
        .incremental(&harness.state_path())
        .build();

    harness.run(&cafes(), &job).unwrap();
    assert_eq!(harness.write_sizes(), vec![1, 1]);

    harness.reset();
    let report = harness.run(&cafes(), &job).unwrap();

    assert_eq!(report.records_emitted, 0);
    assert_eq!(report.records_skipped_incremental, 2);
    assert_eq!(report.chunks_flushed, 2);
    assert_eq!(harness.write_sizes(), vec![0]);
}

#[test]
fn test_unknown_backend_is_a_config_error() {
    let harness = TestHarness::new();
    let mut job = JobBuilder::new("cafes")
        .incremental(&harness.state_path())
        .build();
    job.incremental.backend = "redis".to_string();

    let err = harness.run(&cafes(), &job).unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Config(ConfigError::UnknownBackend(_))
    ));
}
