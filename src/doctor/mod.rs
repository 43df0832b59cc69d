//! Doctor command for artifact diagnostics
//!
//! Checks that both artifacts exist, load, agree on the feature schema and
//! can serve a smoke prediction.

use std::path::PathBuf;

use crate::artifacts::{ArtifactStore, Classifier, ModelArtifact, ScalerArtifact};
use crate::pipeline::InferencePipeline;
use crate::presets;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

fn skipped() -> HealthStatus {
    HealthStatus::Warn("Skipped: artifacts did not load".to_string())
}

/// Doctor diagnostics system
pub struct Doctor {
    scaler_path: PathBuf,
    model_path: PathBuf,
}

impl Doctor {
    /// Create a new doctor instance
    pub fn new(scaler_path: PathBuf, model_path: PathBuf) -> Self {
        Self {
            scaler_path,
            model_path,
        }
    }

    /// Run all health checks
    ///
    /// Each artifact file is read once; later checks reuse what earlier
    /// checks loaded.
    pub fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let (scaler_check, scaler) = self.check_scaler();
        let (model_check, model) = self.check_model();
        let (compat_check, store) = self.check_compatibility(scaler, model);
        let smoke_check = self.check_smoke_prediction(store);
        vec![scaler_check, model_check, compat_check, smoke_check]
    }

    /// Check 1: Scaler artifact loads
    fn check_scaler(&self) -> (HealthCheck, Option<ScalerArtifact>) {
        let name = "Scaler Artifact";
        match ScalerArtifact::from_file(&self.scaler_path) {
            Ok(scaler) => (HealthCheck::new(name, HealthStatus::Pass), Some(scaler)),
            Err(e) => (HealthCheck::new(name, HealthStatus::Fail(e.to_string())), None),
        }
    }

    /// Check 2: Model artifact loads
    fn check_model(&self) -> (HealthCheck, Option<ModelArtifact>) {
        let name = "Model Artifact";
        match ModelArtifact::from_file(&self.model_path) {
            Ok(model) => {
                let status = match &model.description {
                    Some(_) => HealthStatus::Pass,
                    None => HealthStatus::Warn(format!("{} has no description", model.model_id)),
                };
                (HealthCheck::new(name, status), Some(model))
            }
            Err(e) => (HealthCheck::new(name, HealthStatus::Fail(e.to_string())), None),
        }
    }

    /// Check 3: Both agree on the measurement schema
    fn check_compatibility(
        &self,
        scaler: Option<ScalerArtifact>,
        model: Option<ModelArtifact>,
    ) -> (HealthCheck, Option<ArtifactStore>) {
        let name = "Schema Compatibility";
        let (Some(scaler), Some(model)) = (scaler, model) else {
            return (HealthCheck::new(name, skipped()), None);
        };

        match ArtifactStore::from_parts(scaler, model, &self.scaler_path, &self.model_path) {
            Ok(store) => (HealthCheck::new(name, HealthStatus::Pass), Some(store)),
            Err(e) => (HealthCheck::new(name, HealthStatus::Fail(e.to_string())), None),
        }
    }

    /// Check 4: Earth-like preset predicts without error
    fn check_smoke_prediction(&self, store: Option<ArtifactStore>) -> HealthCheck {
        let name = "Smoke Prediction";
        let Some(store) = store else {
            return HealthCheck::new(name, skipped());
        };
        let description = store.model.describe();

        let pipeline = match InferencePipeline::from_store(store) {
            Ok(p) => p,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        };

        let earth = match presets::resolve("earth") {
            Ok(m) => m,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        };

        match pipeline.predict(&earth) {
            Ok(_) => HealthCheck::new(name, HealthStatus::Pass),
            Err(e) => HealthCheck::new(
                name,
                HealthStatus::Fail(format!("{} failed on Earth-like Planet: {}", description, e)),
            ),
        }
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\nCosmic Oracle Diagnostics");
        println!("═══════════════════════════════════════");

        for check in checks {
            let (icon, msg) = match &check.status {
                HealthStatus::Pass => ("✓", String::new()),
                HealthStatus::Warn(m) => ("⚠", format!(" - {}", m)),
                HealthStatus::Fail(m) => ("✗", format!(" - {}", m)),
            };

            println!("{} {}{}", icon, check.name, msg);
        }

        println!();

        let passed = checks.iter().filter(|c| c.status == HealthStatus::Pass).count();
        let total = checks.len();

        println!("Summary: {}/{} checks passed", passed, total);

        if Self::has_failures(checks) {
            println!("⚠️  Some checks failed. Predictions are unavailable until they pass.");
        }
    }

    pub fn has_failures(checks: &[HealthCheck]) -> bool {
        checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}
