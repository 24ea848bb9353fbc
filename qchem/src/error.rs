//! Error type shared by the library side of the crate.
//!
//! The binary wraps these into `color_eyre` reports; library functions return
//! [`Result`] so callers can match on the failure.

use basis::basis::BasisError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QchemError>;

#[derive(Error, Debug)]
pub enum QchemError {
    // ----------------------------------------------------------------------
    // Input
    // ----------------------------------------------------------------------
    #[error("invalid molecule: {0}")]
    InvalidMolecule(String),

    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    #[error("basis set '{basis}' is not available for element {element}")]
    BasisNotFound { basis: String, element: String },

    #[error("failed to download basis set: {0}")]
    BasisDownload(#[from] reqwest::Error),

    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // ----------------------------------------------------------------------
    // Method selection
    // ----------------------------------------------------------------------
    #[error("unsupported Hamiltonian method '{0}' (expected 'dhf' or 'pyscf')")]
    UnsupportedMethod(String),

    #[error("unsupported fermion-to-qubit mapping '{0}' (expected 'jordan_wigner' or 'parity')")]
    UnsupportedMapping(String),

    #[error("invalid active space: {0}")]
    InvalidActiveSpace(String),

    // ----------------------------------------------------------------------
    // Solvers
    // ----------------------------------------------------------------------
    #[error("SCF did not converge in {cycles} cycles (last energy change {delta_e:.3e} Eh)")]
    ScfNotConverged { cycles: usize, delta_e: f64 },

    #[error("{method} did not converge in {iterations} iterations")]
    NotConverged { method: String, iterations: usize },

    #[error("solver has not been run: {0}")]
    NotSolved(String),

    // ----------------------------------------------------------------------
    // Operators
    // ----------------------------------------------------------------------
    #[error("term '{term}' has a complex coefficient (imaginary part {imag:.3e})")]
    ComplexCoefficient { term: String, imag: f64 },

    #[error("cannot parse operator: {0}")]
    ParseOperator(String),

    #[error("dimension mismatch: {0}")]
    Dimension(String),
}
