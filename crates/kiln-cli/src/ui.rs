//! Kiln CLI UI primitives.
#![allow(dead_code)]

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal symbols
pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const DOT: &str = "\u{00B7}"; // ·
    pub const ARROW: &str = "\u{2500}\u{25B8}"; // ─▸
}

/// Create a spinner with a message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Print a success line.
pub fn success(message: &str) {
    println!("  {} {}", style(symbols::TARGET_FILLED).green(), message);
}

/// Print an error line.
pub fn error(message: &str) {
    eprintln!("  {} {}", style(symbols::DIAMOND).red(), message);
}

/// Print an info line.
pub fn info(message: &str) {
    println!("  {} {}", style(symbols::TRIANGLE).cyan(), message);
}

/// Print a dimmed line.
pub fn dim(message: &str) {
    println!("  {}", style(message).dim());
}

/// Print a timing line.
pub fn timing(label: &str, millis: u128) {
    println!(
        "  {} {} {}",
        style(symbols::TARGET_FILLED).green(),
        label,
        style(format!("in {millis}ms")).dim()
    );
}

/// Print the generation summary for a run.
pub fn summary(entities: usize, procedures: usize, rules: usize) {
    println!(
        "    {} entities {} {} procedures {} {} rules",
        entities,
        symbols::DOT,
        procedures,
        symbols::DOT,
        rules
    );
}

/// Print a section divider.
pub fn divider() {
    println!("  {}", style("─".repeat(56)).dim());
}
