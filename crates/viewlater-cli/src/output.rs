//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use viewlater_core::{LinkRecord, QueryResult};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

#[derive(Serialize)]
struct GroupEntry<'a> {
    name: &'a str,
    count: usize,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single link
    pub fn print_link(&self, link: &LinkRecord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", link.id);
                println!("Title:  {}", link.display_title());
                println!("URL:    {}", link.url);
                if link.is_grouped() {
                    println!("Group:  {}", link.group);
                }
                println!("Saved:  {}", link.saved_at.format("%Y-%m-%d %H:%M"));
                if !link.notes.is_empty() {
                    println!();
                    println!("── Notes ──");
                    println!("{}", link.notes);
                }
            }
            OutputFormat::Json => print_json(link),
            OutputFormat::Quiet => {
                println!("{}", link.id);
            }
        }
    }

    /// Print the result of a query
    pub fn print_results(&self, result: &QueryResult) {
        match self.format {
            OutputFormat::Human => {
                if result.is_empty() {
                    println!("No matching links found.");
                    return;
                }
                for link in &result.records {
                    let group = if link.is_grouped() {
                        format!(" [{}]", truncate(&link.group, 15))
                    } else {
                        String::new()
                    };
                    println!(
                        "{} | {}{} | {}",
                        link.id.short(),
                        truncate(link.display_title(), 35),
                        group,
                        truncate(&link.url, 45)
                    );
                }
                if result.is_truncated() {
                    println!(
                        "\nShowing {} of {} link(s). Use --all to show everything.",
                        result.records.len(),
                        result.total
                    );
                } else {
                    println!("\n{} link(s)", result.total);
                }
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "links": result.records,
                "total": result.total,
            })),
            OutputFormat::Quiet => {
                for link in &result.records {
                    println!("{}", link.id);
                }
            }
        }
    }

    /// Print groups with their link counts
    pub fn print_groups(&self, groups: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if groups.is_empty() {
                    println!("No groups yet.");
                    return;
                }
                for (name, count) in groups {
                    println!("{} ({})", name, count);
                }
                println!("\n{} group(s)", groups.len());
            }
            OutputFormat::Json => {
                let entries: Vec<GroupEntry> = groups
                    .iter()
                    .map(|(name, count)| GroupEntry {
                        name,
                        count: *count,
                    })
                    .collect();
                print_json(&entries);
            }
            OutputFormat::Quiet => {
                for (name, _) in groups {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr
    pub fn warning(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("⚠ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "warning", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
