//! Terminal rendering for predictions, artifacts and server status

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// One predicted or reported quantity
#[derive(Tabled)]
pub struct ValueRow {
    #[tabled(rename = "Quantity")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl ValueRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Row for a predicted value with fixed precision
    pub fn number(name: impl Into<String>, value: f64, decimals: usize) -> Self {
        Self::new(name, format!("{:.*}", decimals, value))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Notice {
    Success,
    Info,
    Error,
}

impl Notice {
    fn marker(self) -> ColoredString {
        match self {
            Notice::Success => "✓".green().bold(),
            Notice::Info => "ℹ".blue().bold(),
            Notice::Error => "✗".red().bold(),
        }
    }
}

/// Print a marked one-line message; errors go to stderr
pub fn notice(kind: Notice, message: &str) {
    match kind {
        Notice::Error => eprintln!("{} {}", kind.marker(), message),
        _ => println!("{} {}", kind.marker(), message),
    }
}

pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "(nothing to show)".dimmed());
    } else {
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Artifact sizes in binary units
pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Colour a health or readiness label
pub fn paint_status(label: &str) -> String {
    let painted = match label {
        "healthy" | "ready" => label.green(),
        "degraded" => label.yellow(),
        "unhealthy" | "not ready" => label.red(),
        _ => label.normal(),
    };
    painted.to_string()
}
