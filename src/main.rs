//! Cosmic Oracle - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use cosmicoracle::{
    artifacts::{ArtifactStore, ClassifierSpec},
    batch,
    cli::{Args, Commands, Config, PredictArgs, Verbosity},
    doctor::Doctor,
    logging,
    measurement::{Field, MeasurementVector},
    pipeline::{failure_message, InferencePipeline, PredictionResult},
    presets::PRESETS,
    repl::ReplSession,
    telemetry::{TelemetryCollector, TelemetryDisplay},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything resolved from flags and the config file before dispatch
struct Runtime {
    config: Config,
    config_source: Option<PathBuf>,
    verbosity: Verbosity,
    scaler_path: PathBuf,
    model_path: PathBuf,
}

impl Runtime {
    fn resolve(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.as_deref()).context("loading configuration")?;

        // Explicit flags win over the configured default
        let verbosity = if args.quiet || args.verbose > 0 {
            args.verbosity()
        } else {
            config.default_verbosity()
        };

        let config_source = args
            .config
            .clone()
            .or_else(|| Config::default_path().filter(|p| p.exists()));

        let scaler_path = args.scaler.clone().unwrap_or_else(|| config.scaler_path());
        let model_path = args.model.clone().unwrap_or_else(|| config.model_path());

        Ok(Self {
            config,
            config_source,
            verbosity,
            scaler_path,
            model_path,
        })
    }

    fn load_store(&self) -> Result<ArtifactStore> {
        ArtifactStore::load(&self.scaler_path, &self.model_path)
            .context("artifacts must load before predictions can be served")
    }

    fn load_pipeline(&self) -> Result<InferencePipeline> {
        Ok(InferencePipeline::from_store(self.load_store()?)?)
    }

    fn show_progress(&self) -> bool {
        self.verbosity.show_progress() && self.config.display.show_progress_bars
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let runtime = Runtime::resolve(&args)?;

    if !runtime.config.display.color_output {
        colored::control::set_override(false);
    }
    logging::init(runtime.verbosity, runtime.config.display.color_output);

    match &args.command {
        None | Some(Commands::Start) => run_repl(&runtime),
        Some(Commands::Predict(predict)) => run_predict(&runtime, predict),
        Some(Commands::Presets) => {
            show_presets();
            Ok(())
        }
        Some(Commands::Batch { input, output }) => run_batch(&runtime, input, output.as_deref()),
        Some(Commands::Inspect) => run_inspect(&runtime),
        Some(Commands::Doctor) => run_doctor(&runtime),
        Some(Commands::Config) => show_config(&runtime),
    }
}

/// Run the interactive form
fn run_repl(runtime: &Runtime) -> Result<()> {
    let pipeline = runtime.load_pipeline()?;
    let telemetry = TelemetryCollector::new();

    let mut repl_session =
        ReplSession::with_history(runtime.config.history_file(), pipeline, telemetry.clone())?;
    repl_session.set_verbose(runtime.verbosity.show_events());
    repl_session.show_welcome(VERSION);

    loop {
        match repl_session.read_input() {
            Ok(Some(input)) => {
                if input.is_empty() {
                    continue;
                }

                match repl_session.handle_input(&input) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
            }
            // EOF (Ctrl-D)
            Ok(None) => break,
            Err(e) => {
                if e.to_string().contains("Interrupted") {
                    println!("\nUse /exit to quit gracefully");
                    continue;
                }
                return Err(e);
            }
        }
    }

    repl_session.save()?;
    TelemetryDisplay::new(telemetry, runtime.verbosity).display_summary();
    Ok(())
}

#[derive(Serialize)]
struct PredictionReport<'a> {
    preset: Option<&'a str>,
    input: MeasurementVector,
    #[serde(flatten)]
    result: PredictionResult,
    message: String,
}

/// Single prediction from flags or a preset
fn run_predict(runtime: &Runtime, predict: &PredictArgs) -> Result<()> {
    let (measurement, preset) = predict.measurement()?;
    let pipeline = runtime.load_pipeline()?;

    let result = match pipeline.predict(&measurement) {
        Ok(result) => result,
        Err(e) => {
            if !predict.json {
                println!("{}", failure_message(&e).yellow());
            }
            return Err(e.into());
        }
    };

    if predict.json {
        let report = PredictionReport {
            preset,
            input: measurement,
            result,
            message: result.message(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if runtime.verbosity.show_progress() {
        println!("{} {}", "Profile:".cyan(), preset.unwrap_or("Custom Input"));
        println!("{} {}", "Input:".cyan(), measurement);
    }
    if result.is_habitable() {
        println!("{}", result.message().green());
    } else {
        println!("{}", result.message().red());
    }
    if runtime.verbosity.show_events() {
        println!(
            "P(not habitable) = {:.4}, P(habitable) = {:.4}",
            result.probabilities.not_habitable, result.probabilities.habitable
        );
    }
    Ok(())
}

fn show_presets() {
    println!("\n{}", "Celestial Body Profiles".bold().cyan());
    let header: Vec<String> = Field::ALL
        .iter()
        .map(|f| format!("{:>10}", f.spec().catalog_column))
        .collect();
    println!("  {:<20} {}", "Profile", header.join(" "));

    for preset in PRESETS.iter() {
        let row = match preset.values {
            Some(values) => values
                .iter()
                .map(|v| format!("{:>10}", v))
                .collect::<Vec<_>>()
                .join(" "),
            None => format!("{:>10}", "(your own values)"),
        };
        println!("  {:<20} {}", preset.name.green(), row);
    }
    println!();
}

/// Score a catalog CSV
fn run_batch(runtime: &Runtime, input: &Path, output: Option<&Path>) -> Result<()> {
    let pipeline = runtime.load_pipeline()?;
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );

    let progress = if runtime.show_progress() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} rows scored ({elapsed})")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let summary = match output {
        Some(path) => {
            let writer = BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            );
            batch::score_csv(reader, writer, &pipeline, progress.as_ref())?
        }
        None => batch::score_csv(reader, io::stdout().lock(), &pipeline, progress.as_ref())?,
    };

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if runtime.verbosity.show_progress() {
        eprintln!(
            "{} {} scored, {} habitable ({:.1}%), {} outside form ranges, {} skipped",
            "Batch complete:".green().bold(),
            summary.scored,
            summary.habitable,
            summary.habitable_ratio() * 100.0,
            summary.out_of_range,
            summary.skipped.len()
        );
        if runtime.verbosity.show_events() {
            for row in &summary.skipped {
                eprintln!("  line {}: {}", row.line, row.reason.dimmed());
            }
        }
    }
    Ok(())
}

/// Print artifact metadata
fn run_inspect(runtime: &Runtime) -> Result<()> {
    let store = runtime.load_store()?;

    println!("\n{}", "Scaler".bold().cyan());
    println!("  Path:    {}", store.scaler_path.display());
    println!("  Schema:  v{}", store.scaler.schema.version);
    for (i, name) in store.scaler.schema.features.iter().enumerate() {
        println!(
            "  {:<18} mean {:>12.4}  scale {:>12.4}",
            name, store.scaler.mean[i], store.scaler.scale[i]
        );
    }

    let model = &store.model;
    println!("\n{}", "Model".bold().cyan());
    println!("  Path:    {}", store.model_path.display());
    println!("  Id:      {}", model.model_id);
    println!("  Kind:    {}", model.classifier.kind());
    if let Some(description) = &model.description {
        println!("  About:   {}", description);
    }
    match &model.classifier {
        ClassifierSpec::Logistic(logistic) => {
            for (name, weight) in model.schema.features.iter().zip(&logistic.coefficients) {
                println!("  {:<18} weight {:>12.4}", name, weight);
            }
            println!("  {:<18} {:>19.4}", "intercept", logistic.intercept);
        }
        ClassifierSpec::Forest(forest) => {
            println!("  Trees:   {}", forest.trees.len());
            println!("  Nodes:   {}", forest.node_count());
        }
    }
    println!();
    Ok(())
}

fn run_doctor(runtime: &Runtime) -> Result<()> {
    let doctor = Doctor::new(runtime.scaler_path.clone(), runtime.model_path.clone());
    let checks = doctor.run_diagnostics();
    Doctor::display_results(&checks);

    if Doctor::has_failures(&checks) {
        anyhow::bail!("health checks failed");
    }
    Ok(())
}

fn show_config(runtime: &Runtime) -> Result<()> {
    println!("{}", "Cosmic Oracle Configuration".bold().cyan());
    match &runtime.config_source {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    println!("# effective scaler: {}", runtime.scaler_path.display());
    println!("# effective model:  {}", runtime.model_path.display());
    println!("# verbosity:        {}\n", runtime.verbosity.as_str());
    println!("{}", toml::to_string_pretty(&runtime.config)?);
    Ok(())
}
