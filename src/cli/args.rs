//! Command-line argument parsing for Cosmic Oracle
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::errors::InputError;
use crate::measurement::{Field, MeasurementVector};
use crate::presets;

/// Cosmic Oracle - Is this world a new Earth?
#[derive(Parser, Debug)]
#[command(name = "cosmicoracle")]
#[command(version)]
#[command(about = "Predict exoplanet habitability from planetary and stellar measurements", long_about = None)]
pub struct Args {
    /// Scaler artifact (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub scaler: Option<PathBuf>,

    /// Model artifact (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the verdict)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (interactive mode when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive form
    Start,

    /// Predict habitability for one set of measurements
    Predict(PredictArgs),

    /// List the built-in celestial body profiles
    Presets,

    /// Score every row of a local catalog CSV
    Batch {
        /// Input CSV with pl_rade, pl_eqt, pl_orbper, st_teff, st_rad, st_logg columns
        input: PathBuf,

        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show metadata of the loaded artifacts
    Inspect,

    /// Run artifact health checks
    Doctor,

    /// Display current configuration
    Config,
}

/// Measurements for a single prediction
#[derive(clap::Args, Debug, Default)]
pub struct PredictArgs {
    /// Use a built-in profile instead of individual values
    #[arg(short, long, conflicts_with_all = [
        "planet_radius", "equilibrium_temp", "orbital_period",
        "stellar_eff_temp", "stellar_radius", "stellar_logg",
    ])]
    pub preset: Option<String>,

    /// Planet radius (Earth radii)
    #[arg(long)]
    pub planet_radius: Option<f64>,

    /// Equilibrium temperature (K)
    #[arg(long)]
    pub equilibrium_temp: Option<f64>,

    /// Orbital period (days)
    #[arg(long)]
    pub orbital_period: Option<f64>,

    /// Stellar effective temperature (K)
    #[arg(long)]
    pub stellar_eff_temp: Option<f64>,

    /// Stellar radius (Solar radii)
    #[arg(long)]
    pub stellar_radius: Option<f64>,

    /// Stellar surface gravity (log g)
    #[arg(long)]
    pub stellar_logg: Option<f64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// Measurement vector to predict, plus the preset name when one was used.
    ///
    /// Preset values pass through verbatim; hand-entered values are
    /// range-checked, with missing fields taking the custom defaults.
    pub fn measurement(&self) -> Result<(MeasurementVector, Option<&'static str>), InputError> {
        if let Some(query) = &self.preset {
            let preset = presets::find(query)?;
            if let Some(measurement) = preset.measurement() {
                return Ok((measurement, Some(preset.name)));
            }
        }

        let mut measurement = MeasurementVector::custom_default();
        let provided = [
            (Field::PlanetRadius, self.planet_radius),
            (Field::EquilibriumTemp, self.equilibrium_temp),
            (Field::OrbitalPeriod, self.orbital_period),
            (Field::StellarEffTemp, self.stellar_eff_temp),
            (Field::StellarRadius, self.stellar_radius),
            (Field::StellarLogg, self.stellar_logg),
        ];
        for (field, value) in provided {
            if let Some(v) = value {
                measurement.set(field, v);
            }
        }
        measurement.validate_ranges()?;
        Ok((measurement, None))
    }
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Default tracing filter directive for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show class probabilities alongside the verdict
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["cosmicoracle", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["cosmicoracle"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["cosmicoracle", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["cosmicoracle", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let args = parse(&["cosmicoracle"]);
        assert!(args.command.is_none());
        assert!(args.scaler.is_none() && args.model.is_none());
    }

    #[test]
    fn test_predict_with_preset() {
        let args = parse(&["cosmicoracle", "predict", "--preset", "hot-jupiter"]);
        match args.command {
            Some(Commands::Predict(p)) => {
                let (m, name) = p.measurement().unwrap();
                assert_eq!(name, Some("Hot Jupiter"));
                assert_eq!(m.to_array(), [11.0, 1200.0, 3.5, 6100.0, 1.5, 4.1]);
            }
            other => panic!("Expected predict, got {:?}", other),
        }
    }

    #[test]
    fn test_predict_with_fields_and_defaults() {
        let args = parse(&[
            "cosmicoracle",
            "predict",
            "--planet-radius",
            "1.5",
            "--stellar-logg",
            "4.5",
        ]);
        match args.command {
            Some(Commands::Predict(p)) => {
                let (m, name) = p.measurement().unwrap();
                assert!(name.is_none());
                assert_eq!(m.to_array(), [1.5, 300.0, 365.0, 5500.0, 1.0, 4.5]);
            }
            other => panic!("Expected predict, got {:?}", other),
        }
    }

    #[test]
    fn test_predict_out_of_range_rejected() {
        let p = PredictArgs {
            equilibrium_temp: Some(50.0),
            ..Default::default()
        };
        assert!(matches!(p.measurement(), Err(InputError::OutOfRange { .. })));
    }

    #[test]
    fn test_predict_custom_preset_uses_fields() {
        let p = PredictArgs {
            preset: Some("custom".to_string()),
            ..Default::default()
        };
        let (m, name) = p.measurement().unwrap();
        assert!(name.is_none());
        assert_eq!(m, MeasurementVector::custom_default());
    }

    #[test]
    fn test_preset_conflicts_with_fields() {
        let result = Args::try_parse_from([
            "cosmicoracle",
            "predict",
            "--preset",
            "earth",
            "--planet-radius",
            "2.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_artifact_flags() {
        let args = parse(&["cosmicoracle", "inspect", "--model", "/tmp/m.json"]);
        assert_eq!(args.model, Some(PathBuf::from("/tmp/m.json")));
        assert!(matches!(args.command, Some(Commands::Inspect)));
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());

        assert!(!Verbosity::Normal.show_events());
        assert!(Verbosity::Verbose.show_events());

        assert_eq!(Verbosity::VeryVerbose.log_filter(), "debug");
        assert_eq!(Verbosity::parse("verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::parse("loud"), None);
    }
}
