#![cfg(test)]
use std::fs;

use tempfile::TempDir;
use umbra_common::cancel::CancelToken;
use umbra_common::config::WipeConfig;
use umbra_common::deletion::{DeletionEvent, DeletionMethod, DeletionResult};
use umbra_core::wipe;

use crate::util::write_files;

async fn drain(mut job: wipe::DeletionJob) -> (Vec<DeletionEvent>, DeletionResult) {
    let mut events = Vec::new();
    while let Some(event) = job.next_event().await {
        events.push(event);
    }
    let result = job.join().await.unwrap();
    (events, result)
}

/// Three regular files are overwritten and removed, and the report adds up.
#[tokio::test]
async fn batch_deletes_three_files() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(dir.path(), &[("a.doc", 70_000), ("b.jpg", 1), ("c.txt", 4_096)]);

    let (events, result) = drain(wipe::delete_files(paths.clone(), DeletionMethod::Dod3Pass)).await;

    assert!(result.success, "{result:?}");
    assert_eq!(result.files_deleted, 3);
    assert_eq!(result.total_bytes, 74_097);
    assert_eq!(result.bytes_overwritten, 74_097 * 3);
    assert_eq!(result.method, DeletionMethod::Dod3Pass);
    assert!(paths.iter().all(|p| !p.exists()));

    assert!(matches!(events.last(), Some(DeletionEvent::Finished(r)) if *r == result));
    let finished = events
        .iter()
        .filter(|e| matches!(e, DeletionEvent::Finished(_)))
        .count();
    assert_eq!(finished, 1);
}

/// A path that cannot be opened for writing fails alone; the rest of the batch completes.
#[tokio::test]
async fn batch_with_one_inaccessible_entry() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_files(dir.path(), &[("keep-going-1", 512), ("keep-going-2", 512)]);
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    paths.insert(1, locked.clone());

    let (events, result) = drain(wipe::delete_files(paths, DeletionMethod::Random7Pass)).await;

    assert!(!result.success);
    assert_eq!(result.failed_files, vec!["locked".to_string()]);
    assert_eq!(result.files_deleted, 2);
    assert!(result.error.is_none());
    assert!(locked.exists());
    assert!(events.iter().any(|e| matches!(
        e,
        DeletionEvent::FileFailed { file_name, .. } if file_name == "locked"
    )));
}

#[tokio::test]
async fn cancelling_a_job_leaves_files_in_place() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(dir.path(), &[("large.bin", 4 * 1024 * 1024), ("next.bin", 10)]);
    let config = WipeConfig {
        channel_capacity: 1,
        ..WipeConfig::default()
    };

    let mut job = wipe::delete_files_with(
        paths.clone(),
        DeletionMethod::Gutmann35Pass,
        config,
        CancelToken::new(),
    );
    let first = job.next_event().await;
    assert!(matches!(first, Some(DeletionEvent::Progress(_))));
    job.cancel();

    let (_, result) = drain(job).await;

    assert_eq!(result.error.as_deref(), Some("cancelled"));
    assert_eq!(result.failed_files, vec!["large.bin".to_string(), "next.bin".to_string()]);
    assert_eq!(result.files_deleted, 0);
    assert!(paths.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn single_file_overwrite_stream() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(dir.path(), &[("one.bin", 200_000)]);

    let mut job = wipe::overwrite(paths[0].clone(), DeletionMethod::SinglePass);
    let mut last = None;
    while let Some(snapshot) = job.progress.recv().await {
        last = Some(snapshot);
    }
    let written = job.handle.await.unwrap().unwrap();

    let last = last.unwrap();
    assert_eq!(written, 200_000);
    assert_eq!(last.bytes_processed_in_pass, last.total_bytes_in_file);
    assert_eq!(last.pass_progress(), 1.0);
    assert!(!paths[0].exists());
}
