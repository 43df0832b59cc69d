//! Interactive habitability scanner
//!
//! A line-oriented rendition of the input form: pick a profile or edit the
//! six fields, then scan. A bare line of six numbers is scanned directly.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::measurement::MeasurementVector;
use crate::pipeline::InferencePipeline;
use crate::repl::commands::{is_command, CommandHandler};
use crate::repl::input::InputHandler;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

pub use crate::repl::display::DisplayManager;
pub use crate::repl::session::{FormState, PredictionRecord, SessionManager};

/// Source label for a bare numeric line
const INLINE_SOURCE: &str = "Inline Input";

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    session_manager: SessionManager,
    display_manager: DisplayManager,
    pipeline: InferencePipeline,
    telemetry: TelemetryCollector,
}

impl ReplSession {
    pub fn new(pipeline: InferencePipeline, telemetry: TelemetryCollector) -> Result<Self> {
        Self::build(InputHandler::new()?, pipeline, telemetry)
    }

    /// Create REPL session with persistent history
    pub fn with_history(
        history_path: PathBuf,
        pipeline: InferencePipeline,
        telemetry: TelemetryCollector,
    ) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, pipeline, telemetry)
    }

    fn build(
        input_handler: InputHandler,
        pipeline: InferencePipeline,
        telemetry: TelemetryCollector,
    ) -> Result<Self> {
        Ok(ReplSession {
            input_handler,
            command_handler: CommandHandler::new(),
            session_manager: SessionManager::new(),
            display_manager: DisplayManager::new(),
            pipeline,
            telemetry,
        })
    }

    pub fn show_welcome(&self, version: &str) {
        self.display_manager
            .show_banner(version, &self.pipeline.model_description());
        self.display_manager.show_form(self.session_manager.form());
    }

    pub fn read_input(&mut self) -> Result<Option<String>> {
        self.input_handler.read_line()
    }

    /// Handle one line of user input
    ///
    /// Returns true if session should continue, false to exit
    pub fn handle_input(&mut self, input: &str) -> Result<bool> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(true);
        }

        if is_command(input) {
            let command = self.command_handler.parse(input);
            return self.command_handler.execute(
                command,
                &mut self.session_manager,
                &self.pipeline,
                &self.telemetry,
            );
        }

        match MeasurementVector::parse_line(input).and_then(|m| m.validate_ranges().map(|_| m)) {
            Ok(measurement) => self.command_handler.scan(
                measurement,
                INLINE_SOURCE.to_string(),
                &mut self.session_manager,
                &self.pipeline,
                &self.telemetry,
            ),
            Err(e) => {
                self.telemetry.record(TelemetryEvent::InputRejected {
                    reason: e.to_string(),
                    timestamp: Instant::now(),
                });
                self.display_manager.show_error(&e.to_string());
                self.display_manager
                    .show_info("Enter six numbers or a command; /help lists commands");
            }
        }
        Ok(true)
    }

    pub fn session(&self) -> &SessionManager {
        &self.session_manager
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    pub fn is_verbose(&self) -> bool {
        self.command_handler.is_verbose()
    }

    pub fn set_verbose(&mut self, enable: bool) {
        self.command_handler.set_verbose(enable);
    }

    /// Save session state
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }
}
