//! CLI output formatting for the `check` and `pick` commands.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Pool (3 images)
//! 001 a.jpg
//! 002 b.jpg
//! 003 travel/kyoto.jpeg
//!     Source: images/
//! ```
//!
//! ## Pick
//!
//! ```text
//! 2024-01-01
//! 001 a.jpg  5938879079674468119
//! 002 b.jpg  13716266316763605787  ← selected
//! 003 c.jpg  7313854298239417265
//! ```

use crate::naming::asset_filename;
use crate::scan::ImagePool;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn image_count(n: usize) -> String {
    match n {
        1 => "1 image".to_string(),
        n => format!("{n} images"),
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the scanned pool in canonical order.
pub fn format_pool_output(pool: &ImagePool, source_root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Pool ({})", image_count(pool.len()))];
    for (i, image) in pool.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), image));
    }
    lines.push(format!("{}Source: {}/", indent(1), source_root.display()));
    lines
}

pub fn print_pool_output(pool: &ImagePool, source_root: &Path) {
    for line in format_pool_output(pool, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// pick
// ============================================================================

/// One candidate and its score for the picked date.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RankedImage {
    pub image: String,
    pub score: u64,
}

/// Everything `pick` knows about one date. Serialized for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct PickReport {
    pub date: NaiveDate,
    pub selected: String,
    pub asset: String,
    pub ranking: Vec<RankedImage>,
}

impl PickReport {
    pub fn new(date: NaiveDate, selected: &str, ranking: Vec<(&str, u64)>) -> Self {
        Self {
            date,
            selected: selected.to_string(),
            asset: asset_filename(date),
            ranking: ranking
                .into_iter()
                .map(|(image, score)| RankedImage {
                    image: image.to_string(),
                    score,
                })
                .collect(),
        }
    }
}

/// Format the ranking for a date, marking the winner.
pub fn format_pick_output(report: &PickReport) -> Vec<String> {
    let width = report
        .ranking
        .iter()
        .map(|r| r.image.len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![report.date.format("%Y-%m-%d").to_string()];
    for (i, ranked) in report.ranking.iter().enumerate() {
        let marker = if ranked.image == report.selected {
            "  ← selected"
        } else {
            ""
        };
        lines.push(format!(
            "{} {:<width$}  {}{}",
            format_index(i + 1),
            ranked.image,
            ranked.score,
            marker,
        ));
    }
    lines.push(format!("{}Asset: {}", indent(1), report.asset));
    lines
}

pub fn print_pick_output(report: &PickReport) {
    for line in format_pick_output(report) {
        println!("{}", line);
    }
}
