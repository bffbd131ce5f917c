//! # Secure Deletion Model
//!
//! Types describing a deletion job: the overwrite method chosen by the user,
//! the snapshots streamed while files are being destroyed, and the final report.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Overwrite strategy for a deletion job.
///
/// Pass counts are part of the public contract: they are shown to users as a
/// security claim and must not change without a version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletionMethod {
    /// One pass of zeros.
    SinglePass,
    /// Zeros, ones, then random data.
    Dod3Pass,
    /// Seven independent passes of random data.
    Random7Pass,
    /// Random, fixed and rotated three-byte patterns over 35 passes.
    Gutmann35Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SecurityLevel {
    Basic,
    Standard,
    High,
    Maximum,
}

impl DeletionMethod {
    pub const ALL: [DeletionMethod; 4] = [
        DeletionMethod::SinglePass,
        DeletionMethod::Dod3Pass,
        DeletionMethod::Random7Pass,
        DeletionMethod::Gutmann35Pass,
    ];

    pub const fn pass_count(self) -> usize {
        match self {
            Self::SinglePass => 1,
            Self::Dod3Pass => 3,
            Self::Random7Pass => 7,
            Self::Gutmann35Pass => 35,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::SinglePass => "Single Pass (Fast)",
            Self::Dod3Pass => "DoD 5220.22-M (3 Pass)",
            Self::Random7Pass => "Random Data (7 Pass)",
            Self::Gutmann35Pass => "Gutmann (35 Pass)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SinglePass => {
                "Overwrite with zeros once. Fast, basic protection for non-sensitive files."
            }
            Self::Dod3Pass => {
                "Overwrite with zeros, ones, then random data. Good balance of speed and security."
            }
            Self::Random7Pass => "Seven passes of random data. Strong protection for most uses.",
            Self::Gutmann35Pass => {
                "35 passes of random and patterned data. Very slow, overkill for modern drives."
            }
        }
    }

    pub fn security_level(self) -> SecurityLevel {
        match self {
            Self::SinglePass => SecurityLevel::Basic,
            Self::Dod3Pass => SecurityLevel::Standard,
            Self::Random7Pass => SecurityLevel::High,
            Self::Gutmann35Pass => SecurityLevel::Maximum,
        }
    }

    /// Short identifier accepted by [`FromStr`].
    pub fn key(self) -> &'static str {
        match self {
            Self::SinglePass => "single",
            Self::Dod3Pass => "dod3",
            Self::Random7Pass => "random7",
            Self::Gutmann35Pass => "gutmann35",
        }
    }
}

impl fmt::Display for DeletionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DeletionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single-pass" | "zero" => Ok(Self::SinglePass),
            "dod" | "dod3" | "dod-3" => Ok(Self::Dod3Pass),
            "random" | "random7" | "random-7" => Ok(Self::Random7Pass),
            "gutmann" | "gutmann35" | "gutmann-35" => Ok(Self::Gutmann35Pass),
            other => Err(format!(
                "unknown deletion method '{other}' (expected single, dod3, random7 or gutmann35)"
            )),
        }
    }
}

/// Snapshot emitted after every chunk written.
///
/// The last snapshot of a pass always has `bytes_processed_in_pass == total_bytes_in_file`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionProgress {
    pub current_file_name: String,
    /// Zero-based index of the pass being written.
    pub current_pass_index: usize,
    pub total_passes: usize,
    pub bytes_processed_in_pass: u64,
    pub total_bytes_in_file: u64,
    pub files_completed: usize,
    pub total_files: usize,
    pub elapsed: Duration,
    pub estimated_remaining: Duration,
}

impl DeletionProgress {
    /// Fraction of the current pass written, in `0.0..=1.0`.
    pub fn pass_progress(&self) -> f64 {
        if self.total_bytes_in_file == 0 {
            return 0.0;
        }
        self.bytes_processed_in_pass as f64 / self.total_bytes_in_file as f64
    }

    /// Fraction of the whole job, counting the current file by its pass progress.
    pub fn overall_progress(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        let passes_done = self.current_pass_index as f64 + self.pass_progress();
        let file_fraction = passes_done / self.total_passes.max(1) as f64;
        (self.files_completed as f64 + file_fraction) / self.total_files as f64
    }

    pub fn current_pass_number(&self) -> usize {
        self.current_pass_index + 1
    }
}

/// Terminal report of a deletion job.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionResult {
    pub success: bool,
    /// Files overwritten and unlinked.
    pub files_deleted: usize,
    /// Combined size of the requested files when the job started.
    pub total_bytes: u64,
    /// Bytes written across every pass of every file.
    pub bytes_overwritten: u64,
    pub duration: Duration,
    pub method: DeletionMethod,
    /// Files whose overwrite did not complete.
    pub failed_files: Vec<String>,
    /// Files whose content was destroyed but whose directory entry remains.
    pub residual_entries: Vec<String>,
    pub error: Option<String>,
}

/// Everything a deletion job reports, in order. `Finished` is always last.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionEvent {
    Progress(DeletionProgress),
    FileFailed { file_name: String, error: String },
    ResidualEntry { file_name: String, error: String },
    Finished(DeletionResult),
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

    fn snapshot(pass: usize, done: u64, total: u64, files_completed: usize) -> DeletionProgress {
        DeletionProgress {
            current_file_name: "a.bin".into(),
            current_pass_index: pass,
            total_passes: 2,
            bytes_processed_in_pass: done,
            total_bytes_in_file: total,
            files_completed,
            total_files: 2,
            elapsed: Duration::ZERO,
            estimated_remaining: Duration::ZERO,
        }
    }

    #[test]
    fn catalog_pass_counts_are_fixed() {
        let counts: Vec<usize> = DeletionMethod::ALL.iter().map(|m| m.pass_count()).collect();
        assert_eq!(counts, vec![1, 3, 7, 35]);
    }

    #[test]
    fn from_str_accepts_keys_and_aliases() {
        for method in DeletionMethod::ALL {
            assert_eq!(method.key().parse::<DeletionMethod>(), Ok(method));
        }
        assert_eq!("DoD".parse::<DeletionMethod>(), Ok(DeletionMethod::Dod3Pass));
        assert_eq!(" gutmann ".parse::<DeletionMethod>(), Ok(DeletionMethod::Gutmann35Pass));
        assert!("shred".parse::<DeletionMethod>().is_err());
    }

    #[test]
    fn security_levels_increase_with_passes() {
        let levels: Vec<SecurityLevel> =
            DeletionMethod::ALL.iter().map(|m| m.security_level()).collect();
        let mut sorted = levels.clone();
        sorted.sort();
        assert_eq!(levels, sorted);
    }

    #[test]
    fn pass_progress_handles_empty_files() {
        assert_eq!(snapshot(0, 0, 0, 0).pass_progress(), 0.0);
        assert_eq!(snapshot(0, 50, 100, 0).pass_progress(), 0.5);
    }

    #[test]
    fn overall_progress_counts_completed_files_and_passes() {
        // second pass of the second file, half written
        let progress = snapshot(1, 50, 100, 1);
        assert!((progress.overall_progress() - 0.875).abs() < f64::EPSILON);
        assert_eq!(progress.current_pass_number(), 2);
    }
}
