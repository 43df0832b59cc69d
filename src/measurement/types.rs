//! The six-field measurement schema
//!
//! Field order matches the column order the scaler and classifier were
//! fitted on. Reordering `Field::ALL` silently corrupts every prediction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::InputError;

/// Number of features in the model's input vector.
pub const FEATURE_COUNT: usize = 6;

/// Feature names in fitted column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "planet_radius",
    "equilibrium_temp",
    "orbital_period",
    "stellar_eff_temp",
    "stellar_radius",
    "stellar_logg",
];

/// One measurement field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PlanetRadius,
    EquilibriumTemp,
    OrbitalPeriod,
    StellarEffTemp,
    StellarRadius,
    StellarLogg,
}

/// Static description of a field: label, unit, UI range and default
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    /// Column name in the public exoplanet catalog export
    pub catalog_column: &'static str,
}

impl Field {
    pub const ALL: [Field; FEATURE_COUNT] = [
        Field::PlanetRadius,
        Field::EquilibriumTemp,
        Field::OrbitalPeriod,
        Field::StellarEffTemp,
        Field::StellarRadius,
        Field::StellarLogg,
    ];

    /// Position in the fitted column order
    pub fn index(self) -> usize {
        match self {
            Field::PlanetRadius => 0,
            Field::EquilibriumTemp => 1,
            Field::OrbitalPeriod => 2,
            Field::StellarEffTemp => 3,
            Field::StellarRadius => 4,
            Field::StellarLogg => 5,
        }
    }

    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    pub fn spec(self) -> FieldSpec {
        match self {
            Field::PlanetRadius => FieldSpec {
                name: "planet_radius",
                label: "Planet Radius",
                unit: "Earth radii",
                min: 0.1,
                max: 20.0,
                default: 1.0,
                step: 0.1,
                catalog_column: "pl_rade",
            },
            Field::EquilibriumTemp => FieldSpec {
                name: "equilibrium_temp",
                label: "Equilibrium Temperature",
                unit: "K",
                min: 100.0,
                max: 2000.0,
                default: 300.0,
                step: 1.0,
                catalog_column: "pl_eqt",
            },
            Field::OrbitalPeriod => FieldSpec {
                name: "orbital_period",
                label: "Orbital Period",
                unit: "days",
                min: 0.1,
                max: 1000.0,
                default: 365.0,
                step: 0.1,
                catalog_column: "pl_orbper",
            },
            Field::StellarEffTemp => FieldSpec {
                name: "stellar_eff_temp",
                label: "Stellar Effective Temperature",
                unit: "K",
                min: 2000.0,
                max: 8000.0,
                default: 5500.0,
                step: 1.0,
                catalog_column: "st_teff",
            },
            Field::StellarRadius => FieldSpec {
                name: "stellar_radius",
                label: "Stellar Radius",
                unit: "Solar radii",
                min: 0.1,
                max: 20.0,
                default: 1.0,
                step: 0.1,
                catalog_column: "st_rad",
            },
            Field::StellarLogg => FieldSpec {
                name: "stellar_logg",
                label: "Stellar Surface Gravity",
                unit: "log g",
                min: 0.0,
                max: 10.0,
                default: 4.4,
                step: 0.1,
                catalog_column: "st_logg",
            },
        }
    }

    /// Resolve a field from its name, catalog column or short alias
    pub fn parse(input: &str) -> Result<Field, InputError> {
        let key = input.trim().to_lowercase().replace('-', "_");
        let field = match key.as_str() {
            "planet_radius" | "radius" | "pl_rade" => Field::PlanetRadius,
            "equilibrium_temp" | "temp" | "pl_eqt" => Field::EquilibriumTemp,
            "orbital_period" | "period" | "pl_orbper" => Field::OrbitalPeriod,
            "stellar_eff_temp" | "teff" | "st_teff" => Field::StellarEffTemp,
            "stellar_radius" | "st_rad" => Field::StellarRadius,
            "stellar_logg" | "logg" | "st_logg" => Field::StellarLogg,
            _ => return Err(InputError::UnknownField(input.trim().to_string())),
        };
        Ok(field)
    }

    /// Check a single value against the field's UI range
    pub fn check(self, value: f64) -> Result<(), InputError> {
        let spec = self.spec();
        if !value.is_finite() {
            return Err(InputError::NonFinite {
                field: spec.name,
                value,
            });
        }
        if value < spec.min || value > spec.max {
            return Err(InputError::OutOfRange {
                field: spec.name,
                value,
                min: spec.min,
                max: spec.max,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Six planetary and stellar measurements in fitted column order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementVector {
    pub planet_radius: f64,
    pub equilibrium_temp: f64,
    pub orbital_period: f64,
    pub stellar_eff_temp: f64,
    pub stellar_radius: f64,
    pub stellar_logg: f64,
}

impl MeasurementVector {
    pub fn new(
        planet_radius: f64,
        equilibrium_temp: f64,
        orbital_period: f64,
        stellar_eff_temp: f64,
        stellar_radius: f64,
        stellar_logg: f64,
    ) -> Self {
        Self {
            planet_radius,
            equilibrium_temp,
            orbital_period,
            stellar_eff_temp,
            stellar_radius,
            stellar_logg,
        }
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [r, t, p, teff, st_rad, logg] = values;
        Self::new(r, t, p, teff, st_rad, logg)
    }

    /// Values in fitted column order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.planet_radius,
            self.equilibrium_temp,
            self.orbital_period,
            self.stellar_eff_temp,
            self.stellar_radius,
            self.stellar_logg,
        ]
    }

    /// The "Custom Input" starting values
    pub fn custom_default() -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for field in Field::ALL {
            values[field.index()] = field.spec().default;
        }
        Self::from_array(values)
    }

    pub fn get(&self, field: Field) -> f64 {
        self.to_array()[field.index()]
    }

    pub fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::PlanetRadius => self.planet_radius = value,
            Field::EquilibriumTemp => self.equilibrium_temp = value,
            Field::OrbitalPeriod => self.orbital_period = value,
            Field::StellarEffTemp => self.stellar_eff_temp = value,
            Field::StellarRadius => self.stellar_radius = value,
            Field::StellarLogg => self.stellar_logg = value,
        }
    }

    /// Reject NaN and infinities; the scaler transform is undefined for them
    pub fn validate_finite(&self) -> Result<(), InputError> {
        for field in Field::ALL {
            let value = self.get(field);
            if !value.is_finite() {
                return Err(InputError::NonFinite {
                    field: field.name(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Caller-side range enforcement against the UI limits
    pub fn validate_ranges(&self) -> Result<(), InputError> {
        for field in Field::ALL {
            field.check(self.get(field))?;
        }
        Ok(())
    }

    /// Parse six numbers separated by whitespace and/or commas
    pub fn parse_line(line: &str) -> Result<Self, InputError> {
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.len() != FEATURE_COUNT {
            return Err(InputError::WrongArity {
                expected: FEATURE_COUNT,
                got: tokens.len(),
            });
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (field, token) in Field::ALL.iter().zip(tokens) {
            values[field.index()] = parse_value(*field, token)?;
        }
        Ok(Self::from_array(values))
    }
}

impl Default for MeasurementVector {
    fn default() -> Self {
        Self::custom_default()
    }
}

impl fmt::Display for MeasurementVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.to_array().iter().map(|v| v.to_string()).collect();
        write!(f, "({})", values.join(", "))
    }
}

/// Parse one numeric token for a field; no range check
pub fn parse_value(field: Field, token: &str) -> Result<f64, InputError> {
    token.trim().parse::<f64>().map_err(|_| InputError::Parse {
        field: field.name().to_string(),
        input: token.trim().to_string(),
    })
}
