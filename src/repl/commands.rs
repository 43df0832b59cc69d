//! Command handler for REPL built-in commands
//!
//! Form editing, preset selection, scans and session introspection.

use anyhow::Result;
use chrono::Utc;
use colored::*;
use std::time::Instant;
use tracing::warn;

use crate::errors::OracleError;
use crate::measurement::{parse_value, Field, MeasurementVector};
use crate::pipeline::InferencePipeline;
use crate::repl::display::DisplayManager;
use crate::repl::session::{PredictionRecord, SessionManager};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

/// Events listed by /status in verbose mode
const STATUS_EVENTS: usize = 5;

/// REPL command types
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Presets,
    Preset { name: String },
    Custom,
    Set { field: String, value: String },
    Show,
    Predict,
    History { limit: Option<usize> },
    Status,
    Reset,
    Exit,
    Verbose { enable: bool },
    Clear,
    /// Known command with missing arguments
    Usage { usage: &'static str },
    Unknown { input: String },
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    verbose: bool,
    display: DisplayManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler {
            verbose: false,
            display: DisplayManager::new(),
        }
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown { input: input.to_string() };
        }

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "presets" | "profiles" => Command::Presets,
            "preset" | "profile" | "p" => {
                if parts.len() < 2 {
                    Command::Usage { usage: "/preset <name>" }
                } else {
                    Command::Preset { name: parts[1..].join(" ") }
                }
            }
            "custom" => Command::Custom,
            "set" => match (parts.get(1), parts.get(2)) {
                (Some(field), Some(value)) => Command::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                },
                _ => Command::Usage { usage: "/set <field> <value>" },
            },
            "show" | "form" => Command::Show,
            "predict" | "scan" => Command::Predict,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "status" => Command::Status,
            "reset" => Command::Reset,
            "verbose" => {
                let enable = parts
                    .get(1)
                    .map(|s| s.to_lowercase() == "on" || s == &"1" || s == &"true")
                    .unwrap_or(true);
                Command::Verbose { enable }
            }
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &mut self,
        command: Command,
        session: &mut SessionManager,
        pipeline: &InferencePipeline,
        telemetry: &TelemetryCollector,
    ) -> Result<bool> {
        match command {
            Command::Help => self.show_help(),
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Ok(false);
            }
            Command::Presets => self.display.show_presets(),
            Command::Preset { name } => match session.form_mut().select_preset(&name) {
                Ok(preset) => {
                    telemetry.record(TelemetryEvent::PresetSelected {
                        preset: preset.name.to_string(),
                        timestamp: Instant::now(),
                    });
                    self.display.show_form(session.form());
                }
                Err(e) => {
                    self.display.show_error(&e.to_string());
                    println!("Type {} to list profiles", "/presets".cyan());
                }
            },
            Command::Custom => {
                session.form_mut().reset_custom();
                self.display.show_form(session.form());
            }
            Command::Set { field, value } => {
                let outcome = Field::parse(&field).and_then(|f| {
                    let v = parse_value(f, &value)?;
                    session.form_mut().set_field(f, v).map(|_| f)
                });
                match outcome {
                    Ok(f) => {
                        let spec = f.spec();
                        println!(
                            "{} = {} {}",
                            spec.label.cyan(),
                            session.form().measurement().get(f),
                            spec.unit.dimmed()
                        );
                    }
                    Err(e) => {
                        telemetry.record(TelemetryEvent::InputRejected {
                            reason: e.to_string(),
                            timestamp: Instant::now(),
                        });
                        self.display.show_error(&e.to_string());
                    }
                }
            }
            Command::Show => self.display.show_form(session.form()),
            Command::Predict => {
                let measurement = *session.form().measurement();
                let source = session.form().preset_name().to_string();
                self.scan(measurement, source, session, pipeline, telemetry);
            }
            Command::History { limit } => self.show_history(session, limit.unwrap_or(10)),
            Command::Status => self.show_status(session, telemetry),
            Command::Reset => {
                session.reset();
                println!("{}", "Session reset. Form returned to custom defaults.".yellow());
            }
            Command::Verbose { enable } => {
                self.verbose = enable;
                let status = if enable { "enabled" } else { "disabled" };
                println!("{}", format!("Verbose mode {}", status).cyan());
            }
            Command::Clear => self.display.clear_screen()?,
            Command::Usage { usage } => {
                println!("{} {}", "Usage:".yellow(), usage);
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }
        Ok(true)
    }

    /// Run one prediction, show the verdict and record it
    pub fn scan(
        &self,
        measurement: MeasurementVector,
        source: String,
        session: &mut SessionManager,
        pipeline: &InferencePipeline,
        telemetry: &TelemetryCollector,
    ) {
        let start = Instant::now();
        let outcome = pipeline.predict(&measurement);
        let duration = start.elapsed();

        let (result, error) = match outcome {
            Ok(result) => {
                self.display.show_verdict(&result, self.verbose);
                telemetry.record(TelemetryEvent::PredictionCompleted {
                    label: result.label,
                    confidence_percent: result.confidence_percent,
                    duration,
                    timestamp: Instant::now(),
                });
                (Some(result), None)
            }
            Err(e) => {
                warn!(error = %e, "prediction failed");
                self.display.show_failure(&e);
                let event = match e {
                    OracleError::Input(_) => TelemetryEvent::InputRejected {
                        reason: e.to_string(),
                        timestamp: Instant::now(),
                    },
                    _ => TelemetryEvent::PredictionFailed {
                        reason: e.to_string(),
                        timestamp: Instant::now(),
                    },
                };
                telemetry.record(event);
                (None, Some(e.to_string()))
            }
        };

        session.record(PredictionRecord {
            timestamp: Utc::now(),
            source,
            measurement,
            result,
            error,
            duration_us: duration.as_micros() as u64,
        });
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/presets", "List celestial body profiles"),
            ("/preset <name>", "Load a profile into the form"),
            ("/custom", "Switch to custom input with default values"),
            ("/set <field> <value>", "Edit one form field"),
            ("/show", "Show the current form"),
            ("/predict, /scan", "Run the habitability scan on the form"),
            ("/history [n]", "Show last n predictions (default: 10)"),
            ("/status", "Show session status and statistics"),
            ("/reset", "Clear history and reset the form"),
            ("/verbose [on|off]", "Toggle class probabilities in verdicts"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit REPL"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<24} {}", cmd.green(), desc);
        }

        println!("\n{}", "Fields:".bold());
        for field in Field::ALL {
            let spec = field.spec();
            println!("  {:<20} {} ({})", field.name().green(), spec.label, spec.unit);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type six numbers to scan them directly, e.g. 1 288 365 5778 1 4.44");
        println!("  - Use {} for command history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display prediction history
    fn show_history(&self, session: &SessionManager, limit: usize) {
        let history = session.get_history(limit);

        if history.is_empty() {
            println!("{}", "No predictions in history yet.".yellow());
            return;
        }

        println!(
            "\n{}",
            format!("Prediction History (last {}):", history.len()).bold().cyan()
        );
        println!("{}", "=".repeat(60).cyan());

        for (i, record) in history.iter().enumerate() {
            let index = history.len() - i;
            let duration = format!("({}µs)", record.duration_us).dimmed();
            let outcome = match (&record.result, &record.error) {
                (Some(result), _) if result.is_habitable() => {
                    format!("habitable {:.2}%", result.confidence_percent).green()
                }
                (Some(result), _) => {
                    format!("not habitable {:.2}%", result.confidence_percent).red()
                }
                (None, Some(error)) => format!("failed: {}", error).yellow(),
                (None, None) => "failed".yellow(),
            };

            println!(
                "  {}. {} {} {}",
                index.to_string().cyan(),
                record.source,
                outcome,
                duration
            );

            if self.verbose {
                println!("     Input: {}", record.measurement.to_string().dimmed());
            }
        }
        println!();
    }

    /// Display session status
    fn show_status(&self, session: &SessionManager, telemetry: &TelemetryCollector) {
        println!("\n{}", "Session Status:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let duration = session.session_duration();
        let hours = duration / 3600;
        let minutes = (duration % 3600) / 60;
        let seconds = duration % 60;

        let duration_str = if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        };

        let stats = telemetry.get_stats();
        println!("  Session:          {}", session.id().to_string().dimmed());
        println!("  Predictions:      {}", session.prediction_count().to_string().green());
        println!("  Habitable:        {}", session.habitable_count().to_string().green());
        println!("  Failures:         {}", stats.failures.to_string().green());
        println!("  Rejected Inputs:  {}", stats.rejected_inputs.to_string().green());
        println!("  Mean Latency:     {}", format!("{:?}", stats.mean_prediction_time()).green());
        println!("  Current Profile:  {}", session.form().preset_name().green());
        println!("  Session Duration: {}", duration_str.green());
        println!("  Verbose Mode:     {}", if self.verbose { "On".green() } else { "Off".red() });

        if self.verbose && telemetry.event_count() > 0 {
            println!("  Recent Events:");
            for event in telemetry.recent_events(STATUS_EVENTS) {
                println!("    {}", event.summary().dimmed());
            }
        }
        println!();
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, enable: bool) {
        self.verbose = enable;
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}
