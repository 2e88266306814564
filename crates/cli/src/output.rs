//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a confidence fraction as a percentage
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

/// Color confidence based on value
pub fn color_confidence(confidence: f64) -> String {
    let formatted = format_confidence(confidence);
    if confidence >= 0.8 {
        formatted.green().to_string()
    } else if confidence >= 0.6 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Color a risk level label
pub fn color_risk(risk: &str) -> String {
    match risk {
        "Low" => risk.green().to_string(),
        "Medium" => risk.yellow().to_string(),
        _ => risk.red().to_string(),
    }
}
