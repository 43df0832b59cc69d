//! Fixed celestial body profiles
//!
//! Preset tuples are handed to the pipeline verbatim; they are not clamped
//! to the UI ranges.

use crate::errors::InputError;
use crate::measurement::{MeasurementVector, FEATURE_COUNT};

/// One entry of the profile selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub slug: &'static str,
    /// `None` means "collect fresh values from the caller"
    pub values: Option<[f64; FEATURE_COUNT]>,
}

pub const CUSTOM_INPUT: &str = "Custom Input";

/// Selector order as shown to the user
pub const PRESETS: [Preset; 5] = [
    Preset {
        name: CUSTOM_INPUT,
        slug: "custom",
        values: None,
    },
    Preset {
        name: "Earth-like Planet",
        slug: "earth-like-planet",
        values: Some([1.0, 288.0, 365.0, 5778.0, 1.0, 4.44]),
    },
    Preset {
        name: "Hot Jupiter",
        slug: "hot-jupiter",
        values: Some([11.0, 1200.0, 3.5, 6100.0, 1.5, 4.1]),
    },
    Preset {
        name: "Super-Earth",
        slug: "super-earth",
        values: Some([1.5, 310.0, 130.0, 5000.0, 0.8, 4.5]),
    },
    Preset {
        name: "Cold Gas Giant",
        slug: "cold-gas-giant",
        values: Some([3.5, 151.0, 493.0, 4299.0, 0.7, 2.5]),
    },
];

impl Preset {
    pub fn is_custom(&self) -> bool {
        self.values.is_none()
    }

    pub fn measurement(&self) -> Option<MeasurementVector> {
        self.values.map(MeasurementVector::from_array)
    }
}

/// Look a preset up by display name, slug, or the first word of its slug
pub fn find(query: &str) -> Result<&'static Preset, InputError> {
    let key = normalize(query);
    if key.is_empty() {
        return Err(InputError::UnknownPreset(query.to_string()));
    }

    PRESETS
        .iter()
        .find(|p| normalize(p.name) == key || p.slug == key)
        .or_else(|| {
            PRESETS
                .iter()
                .find(|p| p.slug.split('-').next() == Some(key.as_str()))
        })
        .ok_or_else(|| InputError::UnknownPreset(query.trim().to_string()))
}

/// Preset values as a measurement vector; errors for "Custom Input"
pub fn resolve(query: &str) -> Result<MeasurementVector, InputError> {
    let preset = find(query)?;
    preset
        .measurement()
        .ok_or_else(|| InputError::UnknownPreset(format!("{} has no fixed values", preset.name)))
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
