use std::path::PathBuf;

use anyhow::bail;
use colored::*;
use console::Term;
use umbra_common::config::{Config, WipeConfig};
use umbra_common::deletion::{DeletionEvent, DeletionMethod, DeletionProgress, DeletionResult};
use umbra_core::wipe;

use crate::commands::{WipeArgs, cancel_on_ctrl_c};
use crate::mprint;
use crate::terminal::progress::{self, WIPE_BAR_LEN};
use crate::terminal::{colors, format, print};

pub async fn wipe(args: WipeArgs, cfg: &Config) -> anyhow::Result<()> {
    let WipeArgs { files, method, yes } = args;

    if cfg.quiet == 0 {
        print::as_tree_one_level(vec![
            ("Method".to_string(), method.display_name().color(colors::ACCENT)),
            ("Passes".to_string(), method.pass_count().to_string().normal()),
            ("Files".to_string(), files.len().to_string().normal()),
        ]);
    }

    if !yes && !confirm(&files, method)? {
        print::print_status("Aborted, nothing was touched");
        return Ok(());
    }

    let cancel = cancel_on_ctrl_c();
    let mut job = wipe::delete_files_with(files, method, WipeConfig::default(), cancel);

    let bar = progress::wipe_bar(cfg.quiet > 0);
    while let Some(event) = job.next_event().await {
        match event {
            DeletionEvent::Progress(snapshot) => {
                bar.set_position((snapshot.overall_progress() * WIPE_BAR_LEN as f64) as u64);
                bar.set_message(progress_message(&snapshot));
            }
            DeletionEvent::FileFailed { file_name, error } => {
                let label = "failed".color(colors::FAILURE);
                print::print_status(format!("{label} {file_name}: {error}"));
            }
            DeletionEvent::ResidualEntry { file_name, error } => {
                let label = "residual".color(colors::WARNING);
                print::print_status(format!("{label} {file_name}: {error}"));
            }
            DeletionEvent::Finished(_) => {}
        }
    }
    drop(bar);

    let result: DeletionResult = job.join().await?;
    print_summary(&result, cfg);

    if let Some(error) = &result.error {
        bail!("deletion {error}");
    }
    if !result.success {
        bail!(
            "{} file(s) failed, {} left a directory entry behind",
            result.failed_files.len(),
            result.residual_entries.len()
        );
    }
    Ok(())
}

fn confirm(files: &[PathBuf], method: DeletionMethod) -> anyhow::Result<bool> {
    let term = Term::stdout();
    if !term.is_term() {
        bail!("refusing to destroy files without confirmation, pass --yes");
    }

    term.write_str(&format!(
        "Permanently destroy {} file(s) with {}? [y/N] ",
        files.len(),
        method
    ))?;
    let answer: String = term.read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn progress_message(snapshot: &DeletionProgress) -> String {
    format!(
        "{} pass {}/{} eta {}",
        snapshot.current_file_name,
        snapshot.current_pass_number(),
        snapshot.total_passes,
        format::duration(snapshot.estimated_remaining)
    )
}

fn print_summary(result: &DeletionResult, cfg: &Config) {
    let deleted: ColoredString = format!("{} file(s)", result.files_deleted).bold().green();
    let size: ColoredString = format::bytes(result.total_bytes).bold().yellow();
    let time: ColoredString = format::duration(result.duration).bold().yellow();
    let output: String = format!("Deletion complete: {deleted} ({size}) destroyed in {time}");

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            mprint!();
            print::print_status(&output);
        }
    }

    for name in &result.failed_files {
        print::print_status(format!("{} {}", "not deleted".color(colors::FAILURE), name));
    }
    for name in &result.residual_entries {
        print::print_status(format!(
            "{} {} (content destroyed, entry remains)",
            "residual".color(colors::WARNING),
            name
        ));
    }
}
