//! End-to-end tests for the umbra engines, run against real temporary files
//! and listeners on the loopback interface.

mod scan;
mod util;
mod wipe;
