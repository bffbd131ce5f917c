//! # Overwrite Engine
//!
//! Writes every pass of a [`DeletionMethod`] over a file in place, syncing the
//! file to disk between passes, then unlinks it.
//!
//! The engine is synchronous; [`overwrite`] runs it on a blocking thread and
//! streams [`DeletionProgress`] snapshots through a bounded channel.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use umbra_common::cancel::CancelToken;
use umbra_common::config::WipeConfig;
use umbra_common::deletion::{DeletionMethod, DeletionProgress};
use umbra_common::error::WipeError;

use crate::wipe::pattern::{PatternGenerator, PatternSource};

/// Reported after every chunk reaches the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWritten {
    pub pass_index: usize,
    pub bytes_processed_in_pass: u64,
    pub total_bytes_in_file: u64,
    /// Size of the chunk just written. Zero for the single write-free step of an empty file.
    pub chunk_len: u64,
}

/// Overwrites `path` with every pass of `method`, then removes it.
///
/// Returns the number of bytes written across all passes. Cancellation is only
/// observed before a pass or a chunk starts, so a chunk is never half-written.
pub fn overwrite_file(
    path: &Path,
    method: DeletionMethod,
    source: &mut dyn PatternSource,
    config: &WipeConfig,
    cancel: &CancelToken,
    mut on_chunk: impl FnMut(ChunkWritten),
) -> Result<u64, WipeError> {
    let mut file: File = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| WipeError::io(path, e))?;

    let metadata = file.metadata().map_err(|e| WipeError::io(path, e))?;
    if !metadata.is_file() {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
        return Err(WipeError::io(path, err));
    }

    let len: u64 = metadata.len();
    let chunk_size: usize = config.chunk_size.max(1);
    let buffer_len: usize = usize::try_from(len).unwrap_or(usize::MAX).min(chunk_size);
    let mut buffer: Vec<u8> = vec![0u8; buffer_len];
    let passes: usize = method.pass_count();

    for pass_index in 0..passes {
        if cancel.is_cancelled() {
            return Err(WipeError::Cancelled { path: path.into() });
        }

        file.seek(SeekFrom::Start(0)).map_err(|e| WipeError::io(path, e))?;

        if len == 0 {
            on_chunk(ChunkWritten {
                pass_index,
                bytes_processed_in_pass: 0,
                total_bytes_in_file: 0,
                chunk_len: 0,
            });
        }

        let mut written: u64 = 0;
        while written < len {
            if cancel.is_cancelled() {
                return Err(WipeError::Cancelled { path: path.into() });
            }

            let n: usize = (len - written).min(chunk_size as u64) as usize;
            let chunk: &mut [u8] = &mut buffer[..n];
            source.fill_pass(chunk, pass_index, method);
            file.write_all(chunk).map_err(|e| WipeError::io(path, e))?;
            written += n as u64;

            on_chunk(ChunkWritten {
                pass_index,
                bytes_processed_in_pass: written,
                total_bytes_in_file: len,
                chunk_len: n as u64,
            });
        }

        file.sync_all().map_err(|e| WipeError::io(path, e))?;
        debug!("Pass {}/{} synced for {}", pass_index + 1, passes, path.display());
    }

    drop(file);
    fs::remove_file(path).map_err(|source| WipeError::Remove {
        path: path.into(),
        source,
    })?;

    Ok(len * passes as u64)
}

/// Elapsed time and remaining-time estimate for a job.
///
/// Work is measured in bytes written, i.e. file size times pass count.
#[derive(Debug, Clone)]
pub(crate) struct JobClock {
    started: Instant,
    total_work: u64,
    done_work: u64,
}

impl JobClock {
    pub(crate) fn new(total_work: u64) -> Self {
        Self {
            started: Instant::now(),
            total_work,
            done_work: 0,
        }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.done_work = self.done_work.saturating_add(bytes);
    }

    /// Marks all work up to `work` as done, e.g. the share of a file that failed.
    pub(crate) fn catch_up(&mut self, work: u64) {
        self.done_work = self.done_work.max(work);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn estimated_remaining(&self) -> Duration {
        if self.done_work == 0 {
            return Duration::ZERO;
        }
        let remaining = self.total_work.saturating_sub(self.done_work);
        let secs = self.elapsed().as_secs_f64() * remaining as f64 / self.done_work as f64;
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

pub(crate) fn progress_snapshot(
    file_name: &str,
    chunk: ChunkWritten,
    total_passes: usize,
    files_completed: usize,
    total_files: usize,
    clock: &JobClock,
) -> DeletionProgress {
    DeletionProgress {
        current_file_name: file_name.to_string(),
        current_pass_index: chunk.pass_index,
        total_passes,
        bytes_processed_in_pass: chunk.bytes_processed_in_pass,
        total_bytes_in_file: chunk.total_bytes_in_file,
        files_completed,
        total_files,
        elapsed: clock.elapsed(),
        estimated_remaining: clock.estimated_remaining(),
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Single-file overwrite running on a blocking worker.
pub struct OverwriteJob {
    pub progress: mpsc::Receiver<DeletionProgress>,
    pub handle: JoinHandle<Result<u64, WipeError>>,
}

/// Streams progress while `path` is overwritten with `method` and removed.
///
/// Must be called from within a tokio runtime.
pub fn overwrite(path: impl Into<PathBuf>, method: DeletionMethod) -> OverwriteJob {
    overwrite_with(
        path,
        method,
        WipeConfig::default(),
        CancelToken::new(),
        PatternGenerator::new(),
    )
}

pub fn overwrite_with<S>(
    path: impl Into<PathBuf>,
    method: DeletionMethod,
    config: WipeConfig,
    cancel: CancelToken,
    mut source: S,
) -> OverwriteJob
where
    S: PatternSource + 'static,
{
    let path: PathBuf = path.into();
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        let len = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let total_passes = method.pass_count();
        let mut clock = JobClock::new(len.saturating_mul(total_passes as u64));
        let name = file_name(&path);

        overwrite_file(&path, method, &mut source, &config, &cancel, |chunk| {
            clock.advance(chunk.chunk_len);
            let snapshot = progress_snapshot(&name, chunk, total_passes, 0, 1, &clock);
            // A dropped receiver must not stop the overwrite.
            let _ = tx.blocking_send(snapshot);
        })
    });

    OverwriteJob {
        progress: rx,
        handle,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// Records which passes were filled and with how many bytes.
    #[derive(Default)]
    struct RecordingSource {
        inner: Option<PatternGenerator>,
        fills: Vec<(usize, usize)>,
    }

    impl PatternSource for RecordingSource {
        fn fill_pass(&mut self, buffer: &mut [u8], pass_index: usize, method: DeletionMethod) {
            self.fills.push((pass_index, buffer.len()));
            self.inner
                .get_or_insert_with(PatternGenerator::new)
                .fill_pass(buffer, pass_index, method);
        }
    }

    /// Cancels the token as soon as the given pass is requested.
    struct CancelOnPass {
        pass: usize,
        cancel: CancelToken,
    }

    impl PatternSource for CancelOnPass {
        fn fill_pass(&mut self, buffer: &mut [u8], pass_index: usize, _method: DeletionMethod) {
            buffer.fill(0);
            if pass_index == self.pass {
                self.cancel.cancel();
            }
        }
    }

    fn write_file(dir: &TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, vec![0xE7u8; len]).unwrap();
        path
    }

    fn small_chunks() -> WipeConfig {
        WipeConfig {
            chunk_size: 64,
            ..WipeConfig::default()
        }
    }

    #[test]
    fn executes_exactly_pass_count_passes() {
        let dir = TempDir::new().unwrap();
        for method in DeletionMethod::ALL {
            let path = write_file(&dir, "victim.bin", 200);
            let mut source = RecordingSource::default();

            let written = overwrite_file(
                &path,
                method,
                &mut source,
                &small_chunks(),
                &CancelToken::new(),
                |_| {},
            )
            .unwrap();

            let mut per_pass: BTreeMap<usize, usize> = BTreeMap::new();
            for (pass, len) in &source.fills {
                *per_pass.entry(*pass).or_default() += len;
            }
            assert_eq!(per_pass.len(), method.pass_count(), "{method}");
            assert!(per_pass.keys().copied().eq(0..method.pass_count()));
            assert!(per_pass.values().all(|&bytes| bytes == 200));
            assert_eq!(written, 200 * method.pass_count() as u64);
            assert!(!path.exists());
        }
    }

    #[test]
    fn last_chunk_is_clipped_and_pass_ends_at_file_size() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "clip.bin", 150);
        let mut source = RecordingSource::default();
        let mut chunks: Vec<ChunkWritten> = Vec::new();

        overwrite_file(
            &path,
            DeletionMethod::Dod3Pass,
            &mut source,
            &small_chunks(),
            &CancelToken::new(),
            |chunk| chunks.push(chunk),
        )
        .unwrap();

        let lens: Vec<usize> = source.fills.iter().map(|(_, len)| *len).collect();
        assert_eq!(lens, vec![64, 64, 22, 64, 64, 22, 64, 64, 22]);

        for pass in 0..3 {
            let last = chunks.iter().rev().find(|c| c.pass_index == pass).unwrap();
            assert_eq!(last.bytes_processed_in_pass, last.total_bytes_in_file);
        }
    }

    #[test]
    fn empty_file_reports_one_step_per_pass() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.bin", 0);
        let mut chunks: Vec<ChunkWritten> = Vec::new();

        let written = overwrite_file(
            &path,
            DeletionMethod::Random7Pass,
            &mut PatternGenerator::new(),
            &WipeConfig::default(),
            &CancelToken::new(),
            |chunk| chunks.push(chunk),
        )
        .unwrap();

        assert_eq!(written, 0);
        assert_eq!(chunks.len(), 7);
        assert!(chunks.iter().all(|c| c.total_bytes_in_file == 0 && c.chunk_len == 0));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = overwrite_file(
            &dir.path().join("absent"),
            DeletionMethod::SinglePass,
            &mut PatternGenerator::new(),
            &WipeConfig::default(),
            &CancelToken::new(),
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, WipeError::Io { .. }));
        assert!(!err.content_destroyed());
    }

    #[test]
    fn directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = overwrite_file(
            dir.path(),
            DeletionMethod::SinglePass,
            &mut PatternGenerator::new(),
            &WipeConfig::default(),
            &CancelToken::new(),
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, WipeError::Io { .. }));
        assert!(dir.path().exists());
    }

    #[test]
    fn cancellation_stops_between_chunks_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "keep.bin", 300);
        let cancel = CancelToken::new();
        let mut source = CancelOnPass {
            pass: 1,
            cancel: cancel.clone(),
        };
        let mut chunks: Vec<ChunkWritten> = Vec::new();

        let err = overwrite_file(
            &path,
            DeletionMethod::Dod3Pass,
            &mut source,
            &small_chunks(),
            &cancel,
            |chunk| chunks.push(chunk),
        )
        .unwrap_err();

        assert!(matches!(err, WipeError::Cancelled { .. }));
        assert!(path.exists());
        // The chunk that triggered cancellation still completes.
        let last = chunks.last().unwrap();
        assert_eq!(last.pass_index, 1);
        assert_eq!(last.bytes_processed_in_pass, 64);
    }

    #[test]
    fn dod_final_pass_is_random() {
        struct Capture {
            inner: PatternGenerator,
            last_pass: Vec<u8>,
        }
        impl PatternSource for Capture {
            fn fill_pass(&mut self, buffer: &mut [u8], pass: usize, method: DeletionMethod) {
                self.inner.fill_pass(buffer, pass, method);
                if pass == 2 {
                    self.last_pass.extend_from_slice(buffer);
                }
            }
        }

        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "dod.bin", 1024);
        let mut source = Capture {
            inner: PatternGenerator::new(),
            last_pass: Vec::new(),
        };

        overwrite_file(
            &path,
            DeletionMethod::Dod3Pass,
            &mut source,
            &WipeConfig::default(),
            &CancelToken::new(),
            |_| {},
        )
        .unwrap();

        assert_eq!(source.last_pass.len(), 1024);
        assert!(source.last_pass.iter().any(|&b| b != 0x00 && b != 0xFF));
    }

    #[test]
    fn clock_catch_up_never_rewinds() {
        let mut clock = JobClock::new(1_000);
        assert_eq!(clock.estimated_remaining(), Duration::ZERO);

        clock.advance(1_000);
        assert_eq!(clock.estimated_remaining(), Duration::ZERO);

        clock.catch_up(10);
        assert_eq!(clock.done_work, 1_000);
    }

    #[tokio::test]
    async fn overwrite_streams_progress_until_done() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "stream.bin", 100_000);

        let mut job = overwrite(path.clone(), DeletionMethod::Dod3Pass);
        let mut snapshots: Vec<DeletionProgress> = Vec::new();
        while let Some(snapshot) = job.progress.recv().await {
            snapshots.push(snapshot);
        }
        let written = job.handle.await.unwrap().unwrap();

        assert_eq!(written, 300_000);
        assert!(!path.exists());
        // 100 000 bytes in 64 KiB chunks: two chunks per pass.
        assert_eq!(snapshots.len(), 6);
        assert!(snapshots.iter().all(|s| s.current_file_name == "stream.bin"));
        assert_eq!(snapshots.last().unwrap().current_pass_index, 2);
        assert_eq!(snapshots.last().unwrap().bytes_processed_in_pass, 100_000);
    }
}
