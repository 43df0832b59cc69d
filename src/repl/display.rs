//! Display manager for the interactive terminal UI
//!
//! Color-coded verdicts, form rendering and status lines.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use std::io;

use crate::measurement::Field;
use crate::pipeline::{failure_message, PredictionResult};
use crate::presets::PRESETS;
use crate::repl::session::FormState;

pub const PROMPT: &str = ">oracle: ";

/// Display manager for REPL UI
pub struct DisplayManager;

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let width = 64;
        let title = format!("  Cosmic Oracle {} - Exoplanet Habitability", version);
        let info = format!("  Model: {}", model);

        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!("Is this world a new Earth? Enter planetary and stellar data to reveal its secrets.");
        println!(
            "Type six values, or {} for commands, {} to quit\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Render the six form fields
    pub fn show_form(&self, form: &FormState) {
        let source = if form.is_custom() {
            form.preset_name().to_string()
        } else {
            format!("{} (locked)", form.preset_name())
        };
        println!("\n{} {}", "Profile:".bold().cyan(), source);
        println!("{}", "-".repeat(60).cyan());

        for field in Field::ALL {
            let spec = field.spec();
            let label = format!("{} ({})", spec.label, spec.unit);
            let value = form.measurement().get(field).to_string();
            let range = format!("[{} .. {}]", spec.min, spec.max);
            println!("  {:<40} {:>10}  {}", label, value.green(), range.dimmed());
        }
        println!();
    }

    /// List the preset table
    pub fn show_presets(&self) {
        println!("\n{}", "Celestial Body Profiles:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());
        for preset in PRESETS.iter() {
            let values = match preset.values {
                Some(v) => v
                    .iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                None => "enter your own values".to_string(),
            };
            println!("  {:<20} {:<18} {}", preset.name.green(), preset.slug.dimmed(), values);
        }
        println!();
    }

    /// Habitable verdicts in green, hostile ones in red
    pub fn show_verdict(&self, result: &PredictionResult, verbose: bool) {
        let message = result.message();
        if result.is_habitable() {
            println!("{} {}", "✓".green().bold(), message.green());
        } else {
            println!("{} {}", "✗".red().bold(), message.red());
        }

        if verbose {
            println!(
                "  {} P(not habitable) = {:.4}, P(habitable) = {:.4}",
                "→".cyan(),
                result.probabilities.not_habitable,
                result.probabilities.habitable
            );
        }
    }

    /// Failed prediction, distinct from both verdicts
    pub fn show_failure(&self, error: &dyn std::fmt::Display) {
        println!("{} {}", "!".yellow().bold(), failure_message(error).yellow());
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}
