use std::ops::Deref;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

/// Resolution of the deletion bar, which tracks a fraction rather than a count.
pub const WIPE_BAR_LEN: u64 = 1_000;

static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Runs `f` with the active bar, if any, cleared from the screen.
pub fn suspend<R>(f: impl FnOnce() -> R) -> R {
    let active: Option<ProgressBar> = ACTIVE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match active {
        Some(bar) => bar.suspend(f),
        None => f(),
    }
}

/// Progress bar registered as the active one until dropped.
pub struct ActiveBar {
    bar: ProgressBar,
}

impl ActiveBar {
    fn register(bar: ProgressBar) -> Self {
        *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Some(bar.clone());
        Self { bar }
    }
}

impl Deref for ActiveBar {
    type Target = ProgressBar;

    fn deref(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Drop for ActiveBar {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
        *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub fn wipe_bar(hidden: bool) -> ActiveBar {
    styled(
        WIPE_BAR_LEN,
        hidden,
        "{spinner:.blue} [{bar:30.green/black}] {percent:>3}% {msg}",
    )
}

pub fn scan_bar(total_hosts: u64, hidden: bool) -> ActiveBar {
    styled(
        total_hosts,
        hidden,
        "{spinner:.blue} [{bar:30.green/black}] {pos}/{len} hosts {msg}",
    )
}

fn styled(len: u64, hidden: bool, template: &str) -> ActiveBar {
    if hidden {
        return ActiveBar::register(ProgressBar::hidden());
    }

    let style: ProgressStyle = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
        .tick_strings(TICK_STRINGS);

    let bar: ProgressBar = ProgressBar::new(len);
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    ActiveBar::register(bar)
}
