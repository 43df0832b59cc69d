//! Session manager for the interactive form and prediction history
//!
//! Holds the six form values (or the selected preset) and a bounded log of
//! predictions made in this session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::errors::InputError;
use crate::measurement::{Field, MeasurementVector};
use crate::pipeline::PredictionResult;
use crate::presets::{self, Preset, CUSTOM_INPUT};

/// Maximum number of predictions to keep in history
const MAX_HISTORY_SIZE: usize = 1000;

/// Current form contents
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    measurement: MeasurementVector,
    /// Selected preset; `None` is "Custom Input"
    preset: Option<&'static Preset>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            measurement: MeasurementVector::custom_default(),
            preset: None,
        }
    }

    pub fn measurement(&self) -> &MeasurementVector {
        &self.measurement
    }

    pub fn preset_name(&self) -> &'static str {
        self.preset.map(|p| p.name).unwrap_or(CUSTOM_INPUT)
    }

    pub fn is_custom(&self) -> bool {
        self.preset.is_none()
    }

    /// Populate the form from a preset; "Custom Input" resets to defaults
    pub fn select_preset(&mut self, query: &str) -> Result<&'static Preset, InputError> {
        let preset = presets::find(query)?;
        match preset.measurement() {
            Some(measurement) => {
                self.measurement = measurement;
                self.preset = Some(preset);
            }
            None => self.reset_custom(),
        }
        Ok(preset)
    }

    pub fn reset_custom(&mut self) {
        self.measurement = MeasurementVector::custom_default();
        self.preset = None;
    }

    /// Range-checked edit of one field. Switches the form to custom input,
    /// keeping the other values. The form is unchanged on error.
    pub fn set_field(&mut self, field: Field, value: f64) -> Result<(), InputError> {
        field.check(value)?;
        self.measurement.set(field, value);
        self.preset = None;
        Ok(())
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

/// One prediction attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub measurement: MeasurementVector,
    pub result: Option<PredictionResult>,
    pub error: Option<String>,
    pub duration_us: u64,
}

/// Session manager maintaining REPL state
pub struct SessionManager {
    id: Uuid,
    form: FormState,
    /// Prediction history (FIFO queue, max 1000 entries)
    history: VecDeque<PredictionRecord>,
    session_start: DateTime<Utc>,
    prediction_count: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager {
            id: Uuid::new_v4(),
            form: FormState::new(),
            history: VecDeque::with_capacity(64),
            session_start: Utc::now(),
            prediction_count: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    /// Record a prediction attempt
    pub fn record(&mut self, record: PredictionRecord) {
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.prediction_count += 1;
    }

    /// Last `limit` records, newest first
    pub fn get_history(&self, limit: usize) -> Vec<&PredictionRecord> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn prediction_count(&self) -> usize {
        self.prediction_count
    }

    pub fn habitable_count(&self) -> usize {
        self.history
            .iter()
            .filter(|r| r.result.map(|res| res.is_habitable()).unwrap_or(false))
            .count()
    }

    /// Session duration in seconds
    pub fn session_duration(&self) -> u64 {
        (Utc::now() - self.session_start).num_seconds().max(0) as u64
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.session_start
    }

    /// Clear history and return the form to custom defaults
    pub fn reset(&mut self) {
        self.history.clear();
        self.form.reset_custom();
        self.prediction_count = 0;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
