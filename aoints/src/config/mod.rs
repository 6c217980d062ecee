//! Configuration management
//!
//! This module handles configuration structures and their defaults.

mod args;

pub use args::Args;

use aoints::guess::GuessType;
use aoints::integrals::DEFAULT_PRECISION;
use aoints::ortho::{OrthoType, DEFAULT_LINEAR_DEPENDENCE_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    pub unit: Option<Unit>,
    pub basis: Option<String>,
    pub basis_dir: Option<String>,
    pub charge: Option<i32>,
    pub integrals: Option<IntegralParams>,
    pub guess: Option<GuessType>,
}

/// Atomic position configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Bohr,
    Angstrom,
}

/// Integral and orthogonalization parameters
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntegralParams {
    pub ortho_type: Option<OrthoType>,
    pub screening_threshold: Option<f64>,
    pub linear_dependence_threshold: Option<f64>,
    pub verify_ortho: Option<bool>,
    pub num_threads: Option<usize>,
}

impl Default for IntegralParams {
    fn default() -> Self {
        IntegralParams {
            ortho_type: Some(OrthoType::Cholesky),
            screening_threshold: Some(DEFAULT_PRECISION),
            linear_dependence_threshold: Some(DEFAULT_LINEAR_DEPENDENCE_THRESHOLD),
            verify_ortho: Some(false),
            num_threads: None,
        }
    }
}

impl IntegralParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.ortho_type.is_none() {
            self.ortho_type = defaults.ortho_type;
        }
        if self.screening_threshold.is_none() {
            self.screening_threshold = defaults.screening_threshold;
        }
        if self.linear_dependence_threshold.is_none() {
            self.linear_dependence_threshold = defaults.linear_dependence_threshold;
        }
        if self.verify_ortho.is_none() {
            self.verify_ortho = defaults.verify_ortho;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        if self.unit.is_none() {
            self.unit = Some(Unit::Bohr);
        }
        if self.basis.is_none() {
            self.basis = Some("sto-3g".to_string());
        }
        if self.basis_dir.is_none() {
            self.basis_dir = Some("tests/basis_sets".to_string());
        }
        if self.charge.is_none() {
            self.charge = Some(0);
        }
        self.integrals = Some(self.integrals.take().unwrap_or_default().with_defaults());
        if self.guess.is_none() {
            self.guess = Some(GuessType::Core);
        }
        self
    }

    pub fn integral_params(&self) -> IntegralParams {
        self.integrals.clone().unwrap_or_default().with_defaults()
    }

    pub fn basis_name(&self) -> &str {
        self.basis.as_deref().unwrap_or("sto-3g")
    }

    pub fn basis_dir(&self) -> &str {
        self.basis_dir.as_deref().unwrap_or("tests/basis_sets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let yaml = r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 1.4]
integrals:
  ortho_type: lowdin
"#;
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.geometry.len(), 2);
        assert_eq!(config.unit, Some(Unit::Bohr));
        assert_eq!(config.basis_name(), "sto-3g");
        assert_eq!(config.charge, Some(0));
        assert_eq!(config.guess, Some(GuessType::Core));

        let params = config.integral_params();
        assert_eq!(params.ortho_type, Some(OrthoType::Lowdin));
        assert_eq!(params.screening_threshold, Some(DEFAULT_PRECISION));
        assert_eq!(params.verify_ortho, Some(false));
    }

    #[test]
    fn test_angstrom_unit() {
        let yaml = r#"
geometry:
  - element: He
    coords: [0.0, 0.0, 0.0]
unit: angstrom
basis: 6-31g
"#;
        let config = serde_yml::from_str::<Config>(yaml).unwrap().with_defaults();
        assert_eq!(config.unit, Some(Unit::Angstrom));
        assert_eq!(config.basis_name(), "6-31g");
        assert_eq!(
            config.integral_params().ortho_type,
            Some(OrthoType::Cholesky)
        );
    }
}
