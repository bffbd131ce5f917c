//! Shared models, errors and configuration for the umbra engines.

pub mod cancel;
pub mod config;
pub mod deletion;
pub mod error;
pub mod network;
pub mod vendors;

pub use cancel::CancelToken;
pub use error::{ScanError, SubnetError, WipeError};
