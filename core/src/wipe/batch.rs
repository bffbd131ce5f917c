//! # Batch Deletion
//!
//! Runs a deletion job over a list of files, one file at a time, on a blocking
//! worker thread. A failed file never aborts the job: it is recorded and the
//! next file starts.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use umbra_common::cancel::CancelToken;
use umbra_common::config::WipeConfig;
use umbra_common::deletion::{DeletionEvent, DeletionMethod, DeletionResult};
use umbra_common::error::WipeError;

use crate::wipe::overwrite::{JobClock, file_name, overwrite_file, progress_snapshot};
use crate::wipe::pattern::{PatternGenerator, PatternSource};

const CANCELLED: &str = "cancelled";

/// A running deletion job.
///
/// `events` yields every [`DeletionEvent`] in order and closes after
/// [`DeletionEvent::Finished`]. Dropping it does not stop the job.
pub struct DeletionJob {
    pub events: mpsc::Receiver<DeletionEvent>,
    pub handle: JoinHandle<DeletionResult>,
    cancel: CancelToken,
}

impl DeletionJob {
    /// Requests a stop at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn next_event(&mut self) -> Option<DeletionEvent> {
        self.events.recv().await
    }

    /// Discards pending events and waits for the final report.
    pub async fn join(self) -> anyhow::Result<DeletionResult> {
        drop(self.events);
        self.handle.await.context("deletion worker failed")
    }
}

/// Securely deletes `paths` in order with `method`.
///
/// Must be called from within a tokio runtime.
pub fn delete_files(paths: Vec<PathBuf>, method: DeletionMethod) -> DeletionJob {
    delete_files_with(paths, method, WipeConfig::default(), CancelToken::new())
}

pub fn delete_files_with(
    paths: Vec<PathBuf>,
    method: DeletionMethod,
    config: WipeConfig,
    cancel: CancelToken,
) -> DeletionJob {
    delete_files_using(paths, method, config, cancel, PatternGenerator::new())
}

/// Same as [`delete_files_with`] with a caller-supplied pattern source.
pub fn delete_files_using<S>(
    paths: Vec<PathBuf>,
    method: DeletionMethod,
    config: WipeConfig,
    cancel: CancelToken,
    mut source: S,
) -> DeletionJob
where
    S: PatternSource + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let worker_cancel = cancel.clone();

    let handle = tokio::task::spawn_blocking(move || {
        run_batch(&paths, method, &config, &worker_cancel, &mut source, |event| {
            // Blocks while the channel is full. A closed channel is ignored.
            let _ = tx.blocking_send(event);
        })
    });

    DeletionJob {
        events: rx,
        handle,
        cancel,
    }
}

/// Synchronous body of a deletion job. Emits `Finished` last and returns the same report.
pub fn run_batch(
    paths: &[PathBuf],
    method: DeletionMethod,
    config: &WipeConfig,
    cancel: &CancelToken,
    source: &mut dyn PatternSource,
    mut emit: impl FnMut(DeletionEvent),
) -> DeletionResult {
    let started = Instant::now();
    let total_files = paths.len();
    let total_passes = method.pass_count();

    let sizes: Vec<u64> = paths
        .iter()
        .map(|path| match fs::metadata(path) {
            Ok(m) if m.is_file() => m.len(),
            _ => 0,
        })
        .collect();
    let total_bytes: u64 = sizes.iter().sum();
    let mut clock = JobClock::new(total_bytes.saturating_mul(total_passes as u64));

    info!(
        "Deleting {} file(s), {} bytes, with {}",
        total_files, total_bytes, method
    );

    let mut files_deleted: usize = 0;
    let mut bytes_overwritten: u64 = 0;
    let mut failed_files: Vec<String> = Vec::new();
    let mut residual_entries: Vec<String> = Vec::new();
    let mut work_through: u64 = 0;
    let mut cancelled = false;

    for (index, path) in paths.iter().enumerate() {
        let name = file_name(path);
        work_through += sizes[index].saturating_mul(total_passes as u64);

        if cancel.is_cancelled() {
            cancelled = true;
            failed_files.push(name.clone());
            emit(DeletionEvent::FileFailed {
                file_name: name,
                error: CANCELLED.to_string(),
            });
            continue;
        }

        debug!("Overwriting {}", path.display());
        let outcome = overwrite_file(path, method, source, config, cancel, |chunk| {
            clock.advance(chunk.chunk_len);
            bytes_overwritten += chunk.chunk_len;
            emit(DeletionEvent::Progress(progress_snapshot(
                &name,
                chunk,
                total_passes,
                index,
                total_files,
                &clock,
            )));
        });
        clock.catch_up(work_through);

        match outcome {
            Ok(_) => {
                files_deleted += 1;
                debug!("Deleted {}", path.display());
            }
            Err(err @ WipeError::Remove { .. }) => {
                warn!("{}", err);
                residual_entries.push(name.clone());
                emit(DeletionEvent::ResidualEntry {
                    file_name: name,
                    error: err.to_string(),
                });
            }
            Err(WipeError::Cancelled { .. }) => {
                cancelled = true;
                failed_files.push(name.clone());
                emit(DeletionEvent::FileFailed {
                    file_name: name,
                    error: CANCELLED.to_string(),
                });
            }
            Err(err) => {
                warn!("{}", err);
                failed_files.push(name.clone());
                emit(DeletionEvent::FileFailed {
                    file_name: name,
                    error: err.to_string(),
                });
            }
        }
    }

    let error: Option<String> = if cancelled {
        error!("Deletion cancelled after {} file(s)", files_deleted);
        Some(CANCELLED.to_string())
    } else {
        None
    };

    let result = DeletionResult {
        success: failed_files.is_empty() && residual_entries.is_empty() && error.is_none(),
        files_deleted,
        total_bytes,
        bytes_overwritten,
        duration: started.elapsed(),
        method,
        failed_files,
        residual_entries,
        error,
    };

    info!(
        "Deletion finished: {}/{} file(s) removed in {:.2?}",
        result.files_deleted, total_files, result.duration
    );

    emit(DeletionEvent::Finished(result.clone()));
    result
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
