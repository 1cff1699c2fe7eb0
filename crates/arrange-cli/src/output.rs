//! Output formatting and reporting

use colored::*;
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Changed {
        original: String,
        formatted: String,
        applied_rules: Vec<String>,
        written: bool,
    },
    /// Not processed because it does not parse
    Skipped(String),
    Failed(String),
}

/// Result of processing one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileReport {
    /// One line per changed, skipped or failed file
    pub fn print(&self, write: bool) {
        let path = self.path.display();
        match &self.status {
            FileStatus::Unchanged => {}
            FileStatus::Changed { applied_rules, .. } => {
                let verb = if write { "Formatted" } else { "Would format" };
                println!("{verb} {path} ({})", applied_rules.join(", "));
            }
            FileStatus::Skipped(reason) => {
                eprintln!("{} skipping {path}: {reason}", "warning:".yellow().bold());
            }
            FileStatus::Failed(reason) => {
                eprintln!("{} {path}: {reason}", "error:".red().bold());
            }
        }
    }
}

/// Summary statistics for a fmt run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSummary {
    pub files_checked: usize,
    pub changed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl FormatSummary {
    pub fn new(files_checked: usize) -> Self {
        Self {
            files_checked,
            ..Self::default()
        }
    }

    pub fn record(&mut self, status: &FileStatus) {
        match status {
            FileStatus::Unchanged => {}
            FileStatus::Changed { written, .. } => {
                self.changed += 1;
                if *written {
                    self.written += 1;
                }
            }
            FileStatus::Skipped(_) => self.skipped += 1,
            FileStatus::Failed(_) => self.failed += 1,
        }
    }

    pub fn print(&self, write: bool) {
        println!("\n{}", "Summary:".bold());
        println!("  Files checked: {}", self.files_checked);

        if self.changed == 0 {
            println!("  {} All files are arranged", "✓".green());
        } else if write {
            println!(
                "  Formatted: {} file{}",
                self.written.to_string().green(),
                plural(self.written)
            );
        } else {
            println!(
                "  Would format: {} file{}",
                self.changed.to_string().yellow(),
                plural(self.changed)
            );
        }
        if self.skipped > 0 {
            println!(
                "  Skipped (parse errors): {}",
                self.skipped.to_string().yellow()
            );
        }
        if self.failed > 0 {
            println!("  Failed: {}", self.failed.to_string().red());
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Line diff between the original and arranged text
#[derive(Debug, Clone)]
pub struct DiffRenderer {
    context_lines: usize,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self { context_lines: 3 }
    }

    /// Render a unified diff with colored `-`/`+` lines
    pub fn render_diff(&self, original: &str, modified: &str) -> String {
        let diff = TextDiff::from_lines(original, modified);
        let mut output = String::new();

        for (idx, group) in diff.grouped_ops(self.context_lines).iter().enumerate() {
            if idx > 0 {
                output.push_str(&format!("{}\n", "...".dimmed()));
            }
            for op in group {
                for change in diff.iter_changes(op) {
                    let line_num = change
                        .new_index()
                        .or(change.old_index())
                        .map_or(0, |i| i + 1);
                    let line = match change.tag() {
                        ChangeTag::Delete => {
                            format!("- {line_num:>4} │ {}", change.value()).red().to_string()
                        }
                        ChangeTag::Insert => {
                            format!("+ {line_num:>4} │ {}", change.value()).green().to_string()
                        }
                        ChangeTag::Equal => format!("  {line_num:>4} │ {}", change.value()),
                    };
                    output.push_str(&line);
                    if !change.value().ends_with('\n') {
                        output.push('\n');
                    }
                }
            }
        }

        output
    }
}

/// Utility functions for output formatting
pub mod utils {
    /// Format duration in human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else if total_ms < 60_000 {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        } else {
            let minutes = total_ms / 60_000;
            let seconds = (total_ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }
}
