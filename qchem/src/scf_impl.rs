//! SCF implementations with DIIS acceleration
//!
//! This module provides the SCF trait definition, DIIS (Direct Inversion in the Iterative Subspace)
//! convergence acceleration, and the restricted Hartree-Fock implementation `SimpleSCF`.

extern crate nalgebra as na;

mod simple;
#[cfg(test)]
mod tests;

pub use simple::SimpleSCF;

use crate::error::Result;
use basis::basis::AOBasis;
use na::{DMatrix, DVector, Vector3};
use periodic_table_on_an_enum::Element;
use std::collections::HashMap;
use tracing::{info, warn};

/// The SCF trait defines the interface for Self-Consistent Field calculations
pub trait SCF {
    type BasisType: AOBasis;

    /// Attach one copy of the element's basis family to every atom.
    fn init_basis(
        &mut self,
        elems: &[Element],
        basis: &HashMap<String, Self::BasisType>,
    ) -> Result<()>;
    fn init_geometry(&mut self, coords: &[Vector3<f64>], elems: &[Element]);
    /// One-electron integrals, the AO ERI tensor and the core-Hamiltonian guess.
    fn init_density_matrix(&mut self);
    fn update_density_matrix(&mut self);
    fn init_fock_matrix(&mut self);
    /// Iterates to self-consistency and returns the number of cycles used.
    fn scf_cycle(&mut self) -> Result<usize>;
    fn calculate_total_energy(&self) -> f64;
}

/// DIIS (Direct Inversion in the Iterative Subspace) convergence accelerator
///
/// The error matrix is the commutator `E = FDS - SDF`. The extrapolated Fock
/// matrix is `F_DIIS = Σ c_i F_i` with the coefficients minimising
/// `||Σ c_i E_i||^2` under `Σ c_i = 1`.
#[derive(Clone, Debug)]
pub struct DIIS {
    error_matrices: Vec<DMatrix<f64>>,
    fock_matrices: Vec<DMatrix<f64>>,
    max_subspace_size: usize,
}

impl DIIS {
    /// `max_subspace_size` is the number of Fock/error pairs kept (typically 6-12).
    pub fn new(max_subspace_size: usize) -> Self {
        DIIS {
            error_matrices: Vec::new(),
            fock_matrices: Vec::new(),
            max_subspace_size: max_subspace_size.max(1),
        }
    }

    pub fn calculate_error_matrix(
        &self,
        fock: &DMatrix<f64>,
        density: &DMatrix<f64>,
        overlap: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        fock * density * overlap - overlap * density * fock
    }

    /// Push a Fock matrix and its error, dropping the oldest pair when full.
    pub fn update(
        &mut self,
        fock_matrix: DMatrix<f64>,
        density_matrix: &DMatrix<f64>,
        overlap_matrix: &DMatrix<f64>,
    ) {
        let error = self.calculate_error_matrix(&fock_matrix, density_matrix, overlap_matrix);

        if self.error_matrices.len() >= self.max_subspace_size {
            self.error_matrices.remove(0);
            self.fock_matrices.remove(0);
        }

        self.error_matrices.push(error);
        self.fock_matrices.push(fock_matrix);
    }

    /// Largest absolute element of the newest error matrix.
    pub fn last_error(&self) -> Option<f64> {
        self.error_matrices
            .last()
            .map(|e| e.iter().fold(0.0_f64, |acc, x| acc.max(x.abs())))
    }

    /// Returns None if the DIIS equations cannot be solved (singular B matrix).
    pub fn extrapolate(&self) -> Option<DMatrix<f64>> {
        let n = self.error_matrices.len();
        if n == 0 {
            return None;
        }

        // B_ij = <e_i|e_j>, bordered by the Σ c_i = 1 constraint
        let mut b = DMatrix::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in 0..=i {
                let dot = self.error_matrices[i].dot(&self.error_matrices[j]);
                b[(i, j)] = dot;
                b[(j, i)] = dot;
            }
            b[(i, n)] = -1.0;
            b[(n, i)] = -1.0;
        }

        let mut rhs = DVector::zeros(n + 1);
        rhs[n] = -1.0;

        let coeffs = match b.lu().solve(&rhs) {
            Some(x) => x,
            None => {
                warn!("DIIS extrapolation failed: singular B matrix");
                return None;
            }
        };

        let mut fock_extrapolated =
            DMatrix::zeros(self.fock_matrices[0].nrows(), self.fock_matrices[0].ncols());
        for i in 0..n {
            fock_extrapolated += &self.fock_matrices[i] * coeffs[i];
        }

        Some(fock_extrapolated)
    }

    pub fn reset(&mut self) {
        self.error_matrices.clear();
        self.fock_matrices.clear();
        info!("DIIS subspace cleared");
    }

    pub fn size(&self) -> usize {
        self.error_matrices.len()
    }
}

/// Flips each eigenvector (column) so that its entry of largest magnitude is
/// positive. Makes MO coefficients reproducible between runs.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        let max_val = eigvecs
            .column(j)
            .iter()
            .copied()
            .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() + 1e-12 { x } else { acc });
        if max_val < 0.0 {
            eigvecs.column_mut(j).neg_mut();
        }
    }
    eigvecs
}

/// Solve `F C = S C ε` through the orthogonaliser `x`, eigenvalues ascending.
pub fn solve_roothaan_hall(
    fock: &DMatrix<f64>,
    x: &DMatrix<f64>,
) -> (DVector<f64>, DMatrix<f64>) {
    let f_prime = x.transpose() * fock * x;
    let eig = f_prime.symmetric_eigen();

    let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    indices.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
    let sorted_eigenvalues =
        DVector::from_fn(eig.eigenvalues.len(), |i, _| eig.eigenvalues[indices[i]]);
    let sorted_eigenvectors = eig.eigenvectors.select_columns(&indices);

    (sorted_eigenvalues, align_eigenvectors(x * sorted_eigenvectors))
}
