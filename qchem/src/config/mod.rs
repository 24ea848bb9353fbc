//! Configuration management
//!
//! YAML sections for the molecule, the SCF solver and each pipeline stage.
//! Missing fields are filled by `with_defaults()`; command-line flags
//! override both.

mod args;

pub use args::Args;

use crate::hamiltonian::{HamiltonianOptions, Method};
use crate::mapping::Mapping;
use crate::molecule::Unit;
use crate::solver::ScfSettings;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub geometry: Vec<Atom>,
    pub unit: Option<Unit>,
    pub basis: Option<String>,
    pub charge: Option<i32>,
    pub multiplicity: Option<usize>,
    /// Extra directories searched for `<basis>.<element>.nwchem` files
    pub basis_dirs: Option<Vec<String>>,
    /// Never download basis sets
    pub offline: Option<bool>,
    #[serde(default)]
    pub scf_params: ScfParams,
    pub hamiltonian: Option<HamiltonianParams>,
    pub operator_import: Option<OperatorImportParams>,
    pub integrals: Option<IntegralParams>,
    pub state: Option<StateParams>,
    pub conversion: Option<ConversionParams>,
}

/// Atomic position configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct Atom {
    pub element: String,
    pub coords: [f64; 3],
}

/// SCF-specific parameters
#[derive(Debug, Deserialize, Serialize)]
pub struct ScfParams {
    pub density_mixing: Option<f64>,
    pub max_cycle: Option<usize>,
    pub diis_subspace_size: Option<usize>,
    pub convergence_threshold: Option<f64>,
}

impl Default for ScfParams {
    fn default() -> Self {
        let settings = ScfSettings::default();
        ScfParams {
            density_mixing: Some(settings.density_mixing),
            max_cycle: Some(settings.max_cycle),
            diis_subspace_size: Some(settings.diis_subspace_size),
            convergence_threshold: Some(settings.convergence_threshold),
        }
    }
}

impl ScfParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.density_mixing.is_none() {
            self.density_mixing = defaults.density_mixing;
        }
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.diis_subspace_size.is_none() {
            self.diis_subspace_size = defaults.diis_subspace_size;
        }
        if self.convergence_threshold.is_none() {
            self.convergence_threshold = defaults.convergence_threshold;
        }
        self
    }
}

/// Molecular Hamiltonian stage
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HamiltonianParams {
    pub enabled: Option<bool>,
    pub method: Option<String>,
    pub mapping: Option<String>,
    pub active_electrons: Option<usize>,
    pub active_orbitals: Option<usize>,
    pub cutoff: Option<f64>,
}

impl Default for HamiltonianParams {
    fn default() -> Self {
        let options = HamiltonianOptions::default();
        HamiltonianParams {
            enabled: Some(true),
            method: Some(Method::default().to_string()),
            mapping: Some(Mapping::default().to_string()),
            active_electrons: None,
            active_orbitals: None,
            cutoff: Some(options.cutoff),
        }
    }
}

impl HamiltonianParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.method.is_none() {
            self.method = defaults.method;
        }
        if self.mapping.is_none() {
            self.mapping = defaults.mapping;
        }
        if self.cutoff.is_none() {
            self.cutoff = defaults.cutoff;
        }
        self
    }
}

/// Qubit-operator import stage
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OperatorImportParams {
    pub enabled: Option<bool>,
    /// Operator in the printed `coeff [term] +` format
    pub operator: Option<String>,
    pub tol: Option<f64>,
}

impl Default for OperatorImportParams {
    fn default() -> Self {
        OperatorImportParams {
            enabled: Some(true),
            operator: Some("0.1 [X0 X1] +\n0.2 [Z0]".to_string()),
            tol: Some(1e-12),
        }
    }
}

impl OperatorImportParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.operator.is_none() {
            self.operator = defaults.operator;
        }
        if self.tol.is_none() {
            self.tol = defaults.tol;
        }
        self
    }
}

/// Integral pipeline stage
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IntegralParams {
    pub enabled: Option<bool>,
    pub mapping: Option<String>,
    pub cutoff: Option<f64>,
}

impl Default for IntegralParams {
    fn default() -> Self {
        IntegralParams {
            enabled: Some(true),
            mapping: Some(Mapping::default().to_string()),
            cutoff: Some(HamiltonianOptions::default().cutoff),
        }
    }
}

impl IntegralParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.mapping.is_none() {
            self.mapping = defaults.mapping;
        }
        if self.cutoff.is_none() {
            self.cutoff = defaults.cutoff;
        }
        self
    }
}

/// State import stage
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StateParams {
    pub enabled: Option<bool>,
    pub method: Option<String>, // "ccsd" or "cisd"
    pub max_iterations: Option<usize>,
    pub convergence_threshold: Option<f64>,
    pub tol: Option<f64>,
}

impl Default for StateParams {
    fn default() -> Self {
        StateParams {
            enabled: Some(true),
            method: Some("ccsd".to_string()),
            max_iterations: Some(100),
            convergence_threshold: Some(1e-8),
            tol: Some(1e-15),
        }
    }
}

impl StateParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.method.is_none() {
            self.method = defaults.method;
        }
        if self.max_iterations.is_none() {
            self.max_iterations = defaults.max_iterations;
        }
        if self.convergence_threshold.is_none() {
            self.convergence_threshold = defaults.convergence_threshold;
        }
        if self.tol.is_none() {
            self.tol = defaults.tol;
        }
        self
    }
}

/// Fermion-operator conversion stage
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversionParams {
    pub enabled: Option<bool>,
    pub operator: Option<String>,
}

impl Default for ConversionParams {
    fn default() -> Self {
        ConversionParams {
            enabled: Some(true),
            operator: Some("0.5 [0^ 2] +\n1.0 [0 2^]".to_string()),
        }
    }
}

impl ConversionParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.enabled.is_none() {
            self.enabled = defaults.enabled;
        }
        if self.operator.is_none() {
            self.operator = defaults.operator;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.scf_params = self.scf_params.with_defaults();
        if self.unit.is_none() {
            self.unit = Some(Unit::default());
        }
        if self.basis.is_none() {
            self.basis = Some("sto-3g".to_string());
        }
        if let Some(params) = self.hamiltonian.take() {
            self.hamiltonian = Some(params.with_defaults());
        }
        if let Some(params) = self.operator_import.take() {
            self.operator_import = Some(params.with_defaults());
        }
        if let Some(params) = self.integrals.take() {
            self.integrals = Some(params.with_defaults());
        }
        if let Some(params) = self.state.take() {
            self.state = Some(params.with_defaults());
        }
        if let Some(params) = self.conversion.take() {
            self.conversion = Some(params.with_defaults());
        }
        self
    }

    pub fn is_hamiltonian_enabled(&self) -> bool {
        self.hamiltonian.as_ref().and_then(|h| h.enabled).unwrap_or(false)
    }

    pub fn is_operator_import_enabled(&self) -> bool {
        self.operator_import.as_ref().and_then(|o| o.enabled).unwrap_or(false)
    }

    pub fn is_integrals_enabled(&self) -> bool {
        self.integrals.as_ref().and_then(|i| i.enabled).unwrap_or(false)
    }

    pub fn is_state_enabled(&self) -> bool {
        self.state.as_ref().and_then(|s| s.enabled).unwrap_or(false)
    }

    pub fn is_conversion_enabled(&self) -> bool {
        self.conversion.as_ref().and_then(|c| c.enabled).unwrap_or(false)
    }

    /// SCF settings from the YAML section, overridden by the command line
    pub fn scf_settings(&self, args: &Args) -> ScfSettings {
        let defaults = ScfSettings::default();
        ScfSettings {
            density_mixing: args
                .density_mixing
                .or(self.scf_params.density_mixing)
                .unwrap_or(defaults.density_mixing),
            max_cycle: args
                .max_cycle
                .or(self.scf_params.max_cycle)
                .unwrap_or(defaults.max_cycle),
            diis_subspace_size: args
                .diis_subspace_size
                .or(self.scf_params.diis_subspace_size)
                .unwrap_or(defaults.diis_subspace_size),
            convergence_threshold: args
                .convergence_threshold
                .or(self.scf_params.convergence_threshold)
                .unwrap_or(defaults.convergence_threshold),
        }
    }
}
