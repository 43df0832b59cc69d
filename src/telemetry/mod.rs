//! Prediction telemetry for Cosmic Oracle
//!
//! Collects per-process prediction events and summarizes them for the
//! interactive `/status` view and the end-of-run summary.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::artifacts::HabitabilityLabel;

/// Maximum number of events kept for the recent-activity view
pub const MAX_EVENTS: usize = 1000;

/// Events listed under the summary in verbose mode
const SUMMARY_EVENTS: usize = 5;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    PredictionCompleted {
        label: HabitabilityLabel,
        confidence_percent: f64,
        duration: Duration,
        timestamp: Instant,
    },
    PredictionFailed {
        reason: String,
        timestamp: Instant,
    },
    InputRejected {
        reason: String,
        timestamp: Instant,
    },
    PresetSelected {
        preset: String,
        timestamp: Instant,
    },
}

impl TelemetryEvent {
    /// One-line summary for the recent-activity view
    pub fn summary(&self) -> String {
        match self {
            TelemetryEvent::PredictionCompleted {
                label,
                confidence_percent,
                duration,
                ..
            } => format!("scan: {} {:.2}% in {:?}", label, confidence_percent, duration),
            TelemetryEvent::PredictionFailed { reason, .. } => format!("scan failed: {}", reason),
            TelemetryEvent::InputRejected { reason, .. } => format!("input rejected: {}", reason),
            TelemetryEvent::PresetSelected { preset, .. } => format!("profile: {}", preset),
        }
    }
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub predictions: usize,
    pub habitable: usize,
    pub not_habitable: usize,
    pub failures: usize,
    pub rejected_inputs: usize,
    pub preset_selections: usize,
    pub total_prediction_time: Duration,
}

impl TelemetryStats {
    /// Mean wall time of a successful prediction
    pub fn mean_prediction_time(&self) -> Duration {
        if self.predictions == 0 {
            Duration::ZERO
        } else {
            self.total_prediction_time / self.predictions as u32
        }
    }
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(64))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::PredictionCompleted {
                    label, duration, ..
                } => {
                    stats.predictions += 1;
                    stats.total_prediction_time += *duration;
                    match label {
                        HabitabilityLabel::Habitable => stats.habitable += 1,
                        HabitabilityLabel::NotHabitable => stats.not_habitable += 1,
                    }
                }
                TelemetryEvent::PredictionFailed { .. } => {
                    stats.failures += 1;
                }
                TelemetryEvent::InputRejected { .. } => {
                    stats.rejected_inputs += 1;
                }
                TelemetryEvent::PresetSelected { .. } => {
                    stats.preset_selections += 1;
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() >= MAX_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n, oldest first)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }

    /// Share of successful predictions among all attempts
    pub fn success_rate(&self) -> f64 {
        let stats = lock(&self.stats);
        let total = stats.predictions + stats.failures;
        if total == 0 {
            1.0
        } else {
            stats.predictions as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: crate::cli::Verbosity,
}

impl TelemetryDisplay {
    /// Create a new display
    pub fn new(collector: TelemetryCollector, verbosity: crate::cli::Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Summary lines, without terminal styling
    pub fn summary_lines(&self) -> Vec<String> {
        let stats = self.collector.get_stats();
        vec![
            format!("Duration:          {:.1}s", self.collector.elapsed().as_secs_f64()),
            format!("Predictions:       {}", stats.predictions),
            format!("  habitable:       {}", stats.habitable),
            format!("  not habitable:   {}", stats.not_habitable),
            format!("Failures:          {}", stats.failures),
            format!("Rejected inputs:   {}", stats.rejected_inputs),
            format!("Success rate:      {:.1}%", self.collector.success_rate() * 100.0),
            format!("Mean latency:      {:?}", stats.mean_prediction_time()),
        ]
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.verbosity.show_progress() {
            return;
        }
        println!("\nSession Summary");
        println!("─────────────────────────────────────");
        for line in self.summary_lines() {
            println!("{}", line);
        }
        if self.verbosity.show_events() {
            for line in self.recent_lines(SUMMARY_EVENTS) {
                println!("  {}", line);
            }
        }
        println!();
    }

    /// Summaries of the last `n` events, oldest first
    pub fn recent_lines(&self, n: usize) -> Vec<String> {
        self.collector
            .recent_events(n)
            .iter()
            .map(TelemetryEvent::summary)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Verbosity;

    fn completed(label: HabitabilityLabel, ms: u64) -> TelemetryEvent {
        TelemetryEvent::PredictionCompleted {
            label,
            confidence_percent: 80.0,
            duration: Duration::from_millis(ms),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_collector_creation() {
        let collector = TelemetryCollector::new();
        assert_eq!(collector.event_count(), 0);
        assert_eq!(collector.get_stats().predictions, 0);
        assert_eq!(collector.success_rate(), 1.0);
    }

    #[test]
    fn test_record_predictions() {
        let collector = TelemetryCollector::new();
        collector.record(completed(HabitabilityLabel::Habitable, 2));
        collector.record(completed(HabitabilityLabel::NotHabitable, 4));
        collector.record(completed(HabitabilityLabel::NotHabitable, 6));

        let stats = collector.get_stats();
        assert_eq!(stats.predictions, 3);
        assert_eq!(stats.habitable, 1);
        assert_eq!(stats.not_habitable, 2);
        assert_eq!(stats.mean_prediction_time(), Duration::from_millis(4));
    }

    #[test]
    fn test_success_rate() {
        let collector = TelemetryCollector::new();
        collector.record(completed(HabitabilityLabel::Habitable, 1));
        collector.record(completed(HabitabilityLabel::Habitable, 1));
        collector.record(TelemetryEvent::PredictionFailed {
            reason: "bad probabilities".to_string(),
            timestamp: Instant::now(),
        });

        let rate = collector.success_rate();
        assert!((rate - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_rejected_and_presets() {
        let collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::InputRejected {
            reason: "out of range".to_string(),
            timestamp: Instant::now(),
        });
        collector.record(TelemetryEvent::PresetSelected {
            preset: "Hot Jupiter".to_string(),
            timestamp: Instant::now(),
        });

        let stats = collector.get_stats();
        assert_eq!(stats.rejected_inputs, 1);
        assert_eq!(stats.preset_selections, 1);
        assert_eq!(stats.predictions, 0);
    }

    #[test]
    fn test_recent_events() {
        let collector = TelemetryCollector::new();
        for _ in 0..10 {
            collector.record(completed(HabitabilityLabel::Habitable, 1));
        }
        assert_eq!(collector.recent_events(3).len(), 3);
        assert_eq!(collector.recent_events(50).len(), 10);
    }

    #[test]
    fn test_event_log_is_bounded() {
        let collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::PresetSelected {
            preset: "Hot Jupiter".to_string(),
            timestamp: Instant::now(),
        });
        for _ in 0..MAX_EVENTS + 5 {
            collector.record(completed(HabitabilityLabel::Habitable, 1));
        }

        assert_eq!(collector.event_count(), MAX_EVENTS);
        // the oldest entries are dropped first
        assert!(collector
            .recent_events(MAX_EVENTS)
            .iter()
            .all(|e| matches!(e, TelemetryEvent::PredictionCompleted { .. })));
        // counters still see every event
        assert_eq!(collector.get_stats().predictions, MAX_EVENTS + 5);
        assert_eq!(collector.get_stats().preset_selections, 1);
    }

    #[test]
    fn test_summary_lines() {
        let collector = TelemetryCollector::new();
        collector.record(completed(HabitabilityLabel::Habitable, 1));
        let display = TelemetryDisplay::new(collector, Verbosity::Normal);
        let lines = display.summary_lines();
        assert!(lines.iter().any(|l| l.contains("Predictions:       1")));
    }

    #[test]
    fn test_recent_lines() {
        let collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::PresetSelected {
            preset: "Super-Earth".to_string(),
            timestamp: Instant::now(),
        });
        collector.record(completed(HabitabilityLabel::NotHabitable, 1));
        let display = TelemetryDisplay::new(collector, Verbosity::VeryVerbose);

        let lines = display.recent_lines(5);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "profile: Super-Earth");
        assert!(lines[1].starts_with("scan: not habitable 80.00%"));
    }
}
