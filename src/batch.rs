//! Batch scoring of a local catalog export
//!
//! Reads a CSV whose header names the six catalog columns
//! (`pl_rade, pl_eqt, pl_orbper, st_teff, st_rad, st_logg`, or the field
//! names themselves) and writes one scored row per usable input row.
//! Rows with missing or unparseable cells are skipped and reported.

use indicatif::ProgressBar;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::warn;

use crate::errors::{InputError, OracleError, Result};
use crate::measurement::{parse_value, Field, MeasurementVector, FEATURE_COUNT};
use crate::pipeline::InferencePipeline;

/// Catalog disposition column carried through to the output
pub const DISPOSITION_COLUMN: &str = "tfopwg_disp";

/// A row that could not be scored
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the input, header included
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub scored: usize,
    pub habitable: usize,
    /// Scored rows with at least one value outside the interactive ranges
    pub out_of_range: usize,
    pub skipped: Vec<SkippedRow>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.scored + self.skipped.len()
    }

    pub fn habitable_ratio(&self) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            self.habitable as f64 / self.scored as f64
        }
    }
}

#[derive(Debug, Serialize)]
struct ScoredRow<'a> {
    planet_radius: f64,
    equilibrium_temp: f64,
    orbital_period: f64,
    stellar_eff_temp: f64,
    stellar_radius: f64,
    stellar_logg: f64,
    disposition: &'a str,
    habitable: u8,
    confidence_percent: f64,
}

/// Column positions of the six fields and the optional disposition
#[derive(Debug)]
struct ColumnMap {
    fields: [usize; FEATURE_COUNT],
    disposition: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let position = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let mut fields = [0usize; FEATURE_COUNT];
        for field in Field::ALL {
            let spec = field.spec();
            fields[field.index()] = position(&[spec.catalog_column, spec.name]).ok_or_else(|| {
                OracleError::Input(InputError::UnknownField(format!(
                    "CSV header is missing column {} ({})",
                    spec.catalog_column, spec.name
                )))
            })?;
        }

        Ok(Self {
            fields,
            disposition: position(&[DISPOSITION_COLUMN, "disposition"]),
        })
    }

    fn measurement(&self, record: &csv::StringRecord) -> std::result::Result<MeasurementVector, InputError> {
        let mut values = [0.0; FEATURE_COUNT];
        for field in Field::ALL {
            let cell = record.get(self.fields[field.index()]).unwrap_or("").trim();
            if cell.is_empty() {
                return Err(InputError::Parse {
                    field: field.name().to_string(),
                    input: String::new(),
                });
            }
            values[field.index()] = parse_value(field, cell)?;
        }
        Ok(MeasurementVector::from_array(values))
    }
}

/// Score every row of `input`, writing results to `output`
pub fn score_csv<R: Read, W: Write>(
    input: R,
    output: W,
    pipeline: &InferencePipeline,
    progress: Option<&ProgressBar>,
) -> Result<BatchSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    let columns = ColumnMap::from_headers(reader.headers()?)?;
    let mut summary = BatchSummary::default();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if let Some(pb) = progress {
            pb.inc(1);
        }

        let measurement = match columns.measurement(&record) {
            Ok(m) => m,
            Err(e) => {
                skip(&mut summary, line, e.to_string());
                continue;
            }
        };

        let result = match pipeline.predict(&measurement) {
            Ok(r) => r,
            Err(e) if e.is_recoverable() => {
                skip(&mut summary, line, e.to_string());
                continue;
            }
            Err(e) => return Err(e),
        };

        summary.scored += 1;
        if result.is_habitable() {
            summary.habitable += 1;
        }
        if measurement.validate_ranges().is_err() {
            summary.out_of_range += 1;
        }

        let disposition = columns
            .disposition
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .trim();
        writer.serialize(ScoredRow {
            planet_radius: measurement.planet_radius,
            equilibrium_temp: measurement.equilibrium_temp,
            orbital_period: measurement.orbital_period,
            stellar_eff_temp: measurement.stellar_eff_temp,
            stellar_radius: measurement.stellar_radius,
            stellar_logg: measurement.stellar_logg,
            disposition,
            habitable: result.label.class_index(),
            confidence_percent: result.confidence_percent,
        })?;
    }

    writer.flush()?;
    Ok(summary)
}

fn skip(summary: &mut BatchSummary, line: u64, reason: String) {
    warn!(line, %reason, "skipping catalog row");
    summary.skipped.push(SkippedRow { line, reason });
}
