//! Terminal output for sdm: right-aligned status labels, IDE log lines and
//! indicatif bars. Everything goes to stderr so stdout stays free for
//! `sdm resolve --format json` and `sdm tree`.

use std::io::Write;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Width the status label is right-aligned to.
const LABEL_WIDTH: usize = 12;

fn label_line(style: &Style, label: &str, message: &str) -> String {
    let padded = format!("{label:>LABEL_WIDTH$}");
    format!("{} {message}", style.apply_to(padded))
}

fn emit(style: Style, label: &str, message: &str) {
    let line = label_line(&style.for_stderr(), label, message);
    let _ = writeln!(std::io::stderr(), "{line}");
}

/// A step the resolver or installer finished, in bold green:
/// `    Resolved libA 1.2.0`, `   Installed libA 1.2.0`.
pub fn status(label: &str, message: &str) {
    emit(Style::new().green().bold(), label, message);
}

/// Bold cyan, for outcomes that changed nothing (`      Locked Sdm.lock is up to date`).
pub fn status_info(label: &str, message: &str) {
    emit(Style::new().cyan().bold(), label, message);
}

/// Bold yellow `warning` lines, e.g. `--branch-policy sticky` passed to `sdm update`.
pub fn status_warn(label: &str, message: &str) {
    emit(Style::new().yellow().bold(), label, message);
}

/// `<level>: sdm: <message>`, the shape Xcode picks up from build logs.
pub fn ide_line(level: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{level}: sdm: {message}");
}

/// Spinner shown while a resolution is in flight; the reporter rewrites its
/// message to `Resolving <name> (<requirement>)` as each package is fetched.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Bar over the packages `sdm install` checks out.
pub fn progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:>12} [{bar:30.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("=> "),
    );
    pb.set_message(message.to_string());
    pb
}
