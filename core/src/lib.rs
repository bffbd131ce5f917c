//! Engines behind the `umbra` toolkit: secure file deletion and local network scanning.

pub mod neighbors;
pub mod scanner;
pub mod vendors;
pub mod wipe;
