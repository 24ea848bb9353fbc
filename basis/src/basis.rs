#![allow(non_snake_case)]

use nalgebra::Vector3;
use std::sync::Arc;
use thiserror::Error;

/// Integrals every basis function type has to provide.
///
/// Two-electron integrals follow chemists' notation: `JKabcd(a, b, c, d)`
/// is `(ab|cd)`.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    fn Sab(a: &Self, b: &Self) -> f64;
    fn Tab(a: &Self, b: &Self) -> f64;
    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64;
    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64;
}

/// An atomic basis family (all shells of one element) that can be placed on
/// an atom and expanded into individual basis functions.
pub trait AOBasis {
    type BasisType: Basis;

    fn set_center(&mut self, center: Vector3<f64>);
    fn get_center(&self) -> Option<Vector3<f64>>;
    fn basis_size(&self) -> usize;
    fn get_basis(&self) -> Vec<Arc<Self::BasisType>>;
}

#[derive(Debug, Error)]
pub enum BasisError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    #[error("unsupported shell type: {0}")]
    UnsupportedShell(String),

    #[error("basis text for {0} contains no shells")]
    Empty(String),

    #[error("basis text mixes elements {0} and {1}")]
    MixedElements(String, String),
}
