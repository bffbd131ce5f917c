//! # Secure Deletion
//!
//! Destroys file content by overwriting it in place, pass after pass, before the
//! directory entry is removed.
//!
//! The [`pattern`] module decides which bytes each pass writes, [`overwrite`]
//! drives a single file through every pass and [`batch`] runs a whole job
//! sequentially on a blocking worker thread, streaming [`DeletionEvent`]s.
//!
//! [`DeletionEvent`]: umbra_common::deletion::DeletionEvent

pub mod batch;
pub mod overwrite;
pub mod pattern;

pub use batch::{DeletionJob, delete_files, delete_files_with};
pub use overwrite::{OverwriteJob, overwrite, overwrite_file};
pub use pattern::{PatternGenerator, PatternSource};
