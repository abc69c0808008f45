//! CLI output formatting for every command.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes the lines out. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Transform
//!
//! ```text
//! 001 #1989 → picture (2 sources)
//! 002 #7 → unchanged (no adaptive media)
//! 003 #3 → unchanged (no file entry with id 3)
//! Replaced 1 of 3 images
//! ```
//!
//! ## Build
//!
//! ```text
//! 001 blog/post.html (2 images)
//!     001 #1989 → picture (2 sources)
//!     002 #7 → unchanged (no adaptive media)
//! 002 style.css (copied)
//!
//! Rewrote 1 images in 1 files, copied 1 files
//! ```
//!
//! ## Check
//!
//! ```text
//! Catalog
//! 001 #1989 sunset.jpg v1.3 (2 variants)
//!     800px small
//!     300px thumb (disabled)
//! Total: 1 entries, 2 variants
//! ```

use crate::catalog::Catalog;
use crate::site::{FileAction, SiteReport};
use crate::transform::{ImageOutcome, ImageStatus};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// One image outcome as `NNN #id → result`.
fn outcome_line(index: usize, outcome: &ImageOutcome) -> String {
    let result = match &outcome.status {
        ImageStatus::Replaced { sources } => format!("picture ({sources} sources)"),
        ImageStatus::NoVariants => "unchanged (no adaptive media)".to_string(),
        ImageStatus::Unresolved(err) => format!("unchanged ({err})"),
    };
    format!("{} #{} → {}", format_index(index), outcome.file_entry_id, result)
}

// ============================================================================
// transform
// ============================================================================

pub fn format_transform_report(outcomes: &[ImageOutcome]) -> Vec<String> {
    let mut lines: Vec<String> = outcomes
        .iter()
        .enumerate()
        .map(|(i, o)| outcome_line(i + 1, o))
        .collect();
    let replaced = outcomes
        .iter()
        .filter(|o| matches!(o.status, ImageStatus::Replaced { .. }))
        .count();
    lines.push(format!("Replaced {} of {} images", replaced, outcomes.len()));
    lines
}

/// Print the transform report to stderr, keeping stdout for the HTML.
pub fn print_transform_report(outcomes: &[ImageOutcome]) {
    for line in format_transform_report(outcomes) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

pub fn format_site_report(report: &SiteReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, file) in report.files.iter().enumerate() {
        let path = file.path.display();
        match &file.action {
            FileAction::Copied => {
                lines.push(format!("{} {} (copied)", format_index(i + 1), path));
            }
            FileAction::Transformed { outcomes } => {
                lines.push(format!(
                    "{} {} ({} images)",
                    format_index(i + 1),
                    path,
                    outcomes.len()
                ));
                for (j, outcome) in outcomes.iter().enumerate() {
                    lines.push(format!("    {}", outcome_line(j + 1, outcome)));
                }
            }
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Rewrote {} images in {} files, copied {} files",
        report.images_replaced(),
        report.transformed_files(),
        report.copied_files()
    ));
    lines
}

pub fn print_site_report(report: &SiteReport) {
    for line in format_site_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_catalog_summary(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Catalog".to_string()];
    for (i, entry) in catalog.entries().iter().enumerate() {
        let name = if entry.file_name.is_empty() {
            "(unnamed)"
        } else {
            entry.file_name.as_str()
        };
        lines.push(format!(
            "{} #{} {} v{} ({} variants)",
            format_index(i + 1),
            entry.file_entry_id,
            name,
            entry.version,
            entry.variants.len()
        ));
        for variant in &entry.variants {
            let width = variant
                .width
                .map(|w| format!("{w}px"))
                .unwrap_or_else(|| "no width".to_string());
            let mut line = format!("    {}", width);
            if let Some(uuid) = &variant.configuration_uuid {
                line.push(' ');
                line.push_str(uuid);
            }
            if !variant.enabled {
                line.push_str(" (disabled)");
            }
            lines.push(line);
        }
    }
    lines.push(format!(
        "Total: {} entries, {} variants",
        catalog.entries().len(),
        catalog.variant_count()
    ));
    lines
}

pub fn print_catalog_summary(catalog: &Catalog) {
    for line in format_catalog_summary(catalog) {
        println!("{}", line);
    }
}
