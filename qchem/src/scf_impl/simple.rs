//! Restricted closed-shell Hartree-Fock.

use super::{solve_roothaan_hall, DIIS, SCF};
use crate::error::{QchemError, Result};
use basis::basis::{AOBasis, Basis};
use nalgebra::{DMatrix, DVector, Vector3};
use ndarray::Array4;
use periodic_table_on_an_enum::Element;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Simple restricted Hartree-Fock SCF implementation with DIIS acceleration
#[derive(Clone)]
pub struct SimpleSCF<B: AOBasis> {
    pub num_atoms: usize,
    pub num_basis: usize,
    pub ao_basis: Vec<B>,
    mo_basis: Vec<Arc<B::BasisType>>,
    pub coords: Vec<Vector3<f64>>,
    pub elems: Vec<Element>,
    pub charge: i32,
    pub coeffs: DMatrix<f64>,
    /// Weight of the new density in `P = w P_new + (1 - w) P_old`.
    pub density_mixing: f64,
    pub density_matrix: DMatrix<f64>,
    pub fock_matrix: DMatrix<f64>,
    pub h_core: DMatrix<f64>,
    pub kinetic_matrix: DMatrix<f64>,
    pub nuclear_matrix: DMatrix<f64>,
    pub overlap_matrix: DMatrix<f64>,
    /// AO electron repulsion integrals (μν|λσ), chemists' notation.
    pub eri: Array4<f64>,
    pub e_level: DVector<f64>,
    pub max_cycle: usize,
    pub diis: Option<DIIS>,
    /// Convergence threshold on the energy change; the density RMS change
    /// must fall below its square root.
    pub convergence_threshold: f64,
    pub converged: bool,
}

impl<B: AOBasis + Clone + Send + Sync> Default for SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B: AOBasis + Clone + Send + Sync> SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    pub fn new() -> SimpleSCF<B> {
        SimpleSCF {
            num_atoms: 0,
            num_basis: 0,
            ao_basis: Vec::new(),
            mo_basis: Vec::new(),
            coords: Vec::new(),
            elems: Vec::new(),
            charge: 0,
            coeffs: DMatrix::zeros(0, 0),
            density_mixing: 0.5,
            density_matrix: DMatrix::zeros(0, 0),
            fock_matrix: DMatrix::zeros(0, 0),
            h_core: DMatrix::zeros(0, 0),
            kinetic_matrix: DMatrix::zeros(0, 0),
            nuclear_matrix: DMatrix::zeros(0, 0),
            overlap_matrix: DMatrix::zeros(0, 0),
            eri: Array4::zeros((0, 0, 0, 0)),
            e_level: DVector::zeros(0),
            max_cycle: 50,
            diis: None,
            convergence_threshold: 1e-6,
            converged: false,
        }
    }

    pub fn enable_diis(&mut self, subspace_size: usize) {
        self.diis = Some(DIIS::new(subspace_size));
        info!("DIIS acceleration enabled with subspace size {}", subspace_size);
    }

    pub fn set_convergence_threshold(&mut self, threshold: f64) {
        self.convergence_threshold = threshold;
    }

    pub fn set_charge(&mut self, charge: i32) {
        self.charge = charge;
    }

    pub fn num_electrons(&self) -> usize {
        let nuclear: i64 = self.elems.iter().map(|e| e.get_atomic_number() as i64).sum();
        (nuclear - self.charge as i64).max(0) as usize
    }

    pub fn num_occupied(&self) -> usize {
        self.num_electrons() / 2
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for i in 0..self.num_atoms {
            for j in (i + 1)..self.num_atoms {
                let z_i = self.elems[i].get_atomic_number() as f64;
                let z_j = self.elems[j].get_atomic_number() as f64;
                let r_ij = (self.coords[i] - self.coords[j]).norm();
                if r_ij > 1e-10 {
                    energy += z_i * z_j / r_ij;
                }
            }
        }
        energy
    }

    fn ij_pairs(&self) -> Vec<(usize, usize)> {
        (0..self.num_basis)
            .flat_map(|i| (0..self.num_basis).map(move |j| (i, j)))
            .collect()
    }

    fn one_electron_matrix<F>(&self, f: F) -> DMatrix<f64>
    where
        F: Fn(&B::BasisType, &B::BasisType) -> f64 + Sync,
    {
        let ij_pairs = self.ij_pairs();
        let values: Vec<f64> = ij_pairs
            .par_iter()
            .map(|&(i, j)| f(&self.mo_basis[i], &self.mo_basis[j]))
            .collect();
        DMatrix::from_fn(self.num_basis, self.num_basis, |i, j| {
            values[i * self.num_basis + j]
        })
    }

    /// Unique quartets (ij|kl) with i≥j, k≥l, ij≥kl evaluated in parallel and
    /// scattered over the eight permutations.
    fn compute_eri(&self) -> Array4<f64> {
        let n = self.num_basis;
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (0..=i).map(move |j| (i, j))).collect();

        let blocks: Vec<Vec<(usize, usize, usize, usize, f64)>> = pairs
            .par_iter()
            .enumerate()
            .map(|(ij, &(i, j))| {
                pairs[..=ij]
                    .iter()
                    .map(|&(k, l)| {
                        let val = B::BasisType::JKabcd(
                            &self.mo_basis[i],
                            &self.mo_basis[j],
                            &self.mo_basis[k],
                            &self.mo_basis[l],
                        );
                        (i, j, k, l, val)
                    })
                    .collect()
            })
            .collect();

        let mut eri = Array4::zeros((n, n, n, n));
        for (i, j, k, l, val) in blocks.into_iter().flatten() {
            for (a, b, c, d) in [
                (i, j, k, l),
                (j, i, k, l),
                (i, j, l, k),
                (j, i, l, k),
                (k, l, i, j),
                (l, k, i, j),
                (k, l, j, i),
                (l, k, j, i),
            ] {
                eri[[a, b, c, d]] = val;
            }
        }
        eri
    }

    pub fn update_fock_matrix(&mut self) {
        let n = self.num_basis;
        let p = &self.density_matrix;
        let eri = &self.eri;

        let g_values: Vec<f64> = self
            .ij_pairs()
            .par_iter()
            .map(|&(i, j)| {
                let mut g_ij = 0.0;
                for k in 0..n {
                    for l in 0..n {
                        g_ij += p[(k, l)] * (eri[[i, j, k, l]] - 0.5 * eri[[i, k, j, l]]);
                    }
                }
                g_ij
            })
            .collect();

        let g_matrix = DMatrix::from_fn(n, n, |i, j| g_values[i * n + j]);
        self.fock_matrix = &self.h_core + g_matrix;
    }

    /// Symmetric orthogonaliser S^{-1/2}.
    pub fn orthogonalizer(&self) -> DMatrix<f64> {
        let eig = self.overlap_matrix.clone().symmetric_eigen();

        let threshold = 1e-10;
        let inv_sqrt_vals = eig
            .eigenvalues
            .map(|val| if val > threshold { 1.0 / val.sqrt() } else { 0.0 });
        if eig.eigenvalues.iter().any(|&val| val <= threshold) {
            warn!("Overlap matrix is nearly singular; dropping linearly dependent functions");
        }

        &eig.eigenvectors * DMatrix::from_diagonal(&inv_sqrt_vals) * eig.eigenvectors.transpose()
    }

    fn density_from_coeffs(&self) -> DMatrix<f64> {
        let n_occ = self.num_occupied();
        let occupied_coeffs = self.coeffs.columns(0, n_occ);
        2.0 * &occupied_coeffs * occupied_coeffs.transpose()
    }
}

impl<B: AOBasis + Clone + Send + Sync> SCF for SimpleSCF<B>
where
    B::BasisType: Send + Sync,
{
    type BasisType = B;

    fn init_basis(&mut self, elems: &[Element], basis: &HashMap<String, B>) -> Result<()> {
        self.elems = elems.to_vec();
        self.num_atoms = elems.len();
        self.ao_basis.clear();
        for elem in elems {
            let b = basis
                .get(elem.get_symbol())
                .ok_or_else(|| QchemError::BasisNotFound {
                    basis: "<registry>".to_string(),
                    element: elem.get_symbol().to_string(),
                })?;
            self.ao_basis.push(b.clone());
        }
        Ok(())
    }

    fn init_geometry(&mut self, coords: &[Vector3<f64>], _elems: &[Element]) {
        self.coords = coords.to_vec();
        for (ao, center) in self.ao_basis.iter_mut().zip(coords) {
            ao.set_center(*center);
        }

        self.mo_basis.clear();
        self.num_basis = 0;
        for ao in &self.ao_basis {
            self.mo_basis.extend(ao.get_basis());
            self.num_basis += ao.basis_size();
        }

        let n = self.num_basis;
        self.density_matrix = DMatrix::zeros(n, n);
        self.fock_matrix = DMatrix::zeros(n, n);
        self.h_core = DMatrix::zeros(n, n);
        self.coeffs = DMatrix::zeros(n, n);
        self.e_level = DVector::zeros(n);
        self.overlap_matrix = DMatrix::zeros(n, n);
        self.converged = false;
    }

    fn init_density_matrix(&mut self) {
        info!("Computing one-electron integrals for {} basis functions", self.num_basis);
        self.overlap_matrix = self.one_electron_matrix(|a, b| B::BasisType::Sab(a, b));
        self.kinetic_matrix = self.one_electron_matrix(|a, b| B::BasisType::Tab(a, b));

        let nuclei: Vec<(Vector3<f64>, u32)> = self
            .coords
            .iter()
            .zip(&self.elems)
            .map(|(c, e)| (*c, e.get_atomic_number() as u32))
            .collect();
        self.nuclear_matrix = self.one_electron_matrix(|a, b| {
            nuclei
                .iter()
                .map(|(r, z)| B::BasisType::Vab(a, b, *r, *z))
                .sum()
        });
        self.h_core = &self.kinetic_matrix + &self.nuclear_matrix;

        info!("Computing two-electron integrals");
        self.eri = self.compute_eri();

        // core-Hamiltonian guess
        let x = self.orthogonalizer();
        let (e_level, coeffs) = solve_roothaan_hall(&self.h_core, &x);
        self.e_level = e_level;
        self.coeffs = coeffs;
        self.density_matrix = self.density_from_coeffs();
        self.fock_matrix = self.h_core.clone();
    }

    fn update_density_matrix(&mut self) {
        let new_density = self.density_from_coeffs();
        let w = self.density_mixing.clamp(0.0, 1.0);
        self.density_matrix = w * new_density + (1.0 - w) * &self.density_matrix;
    }

    fn init_fock_matrix(&mut self) {
        self.update_fock_matrix();
    }

    fn scf_cycle(&mut self) -> Result<usize> {
        let x = self.orthogonalizer();
        self.converged = false;

        if let Some(ref mut diis) = self.diis {
            diis.reset();
        }

        // the Fock matrix always belongs to the current density
        self.update_fock_matrix();
        let mut old_energy = self.calculate_total_energy();
        let mut delta_e = f64::INFINITY;

        for cycle in 0..self.max_cycle {
            let mut fock = self.fock_matrix.clone();
            if let Some(ref mut diis) = self.diis {
                diis.update(fock.clone(), &self.density_matrix, &self.overlap_matrix);
                if diis.size() >= 2 {
                    if let Some(fock_diis) = diis.extrapolate() {
                        fock = fock_diis;
                    }
                }
            }

            let (e_level, coeffs) = solve_roothaan_hall(&fock, &x);
            self.e_level = e_level;
            self.coeffs = coeffs;

            let old_density = self.density_matrix.clone();
            self.update_density_matrix();
            let density_rms =
                (&self.density_matrix - old_density).norm() / self.num_basis.max(1) as f64;

            self.update_fock_matrix();
            let total_energy = self.calculate_total_energy();
            delta_e = total_energy - old_energy;

            info!(
                "Cycle {:>3}: E = {:.12} au, dE = {:+.3e} au, rms(dP) = {:.3e}",
                cycle, total_energy, delta_e, density_rms
            );

            if delta_e.abs() < self.convergence_threshold
                && density_rms < self.convergence_threshold.sqrt()
            {
                info!("SCF converged in {} cycles.", cycle + 1);
                info!("Final energy: {:.12} au", total_energy);
                if self.diis.is_some() {
                    info!("DIIS acceleration was enabled");
                }
                self.converged = true;
                return Ok(cycle + 1);
            }
            old_energy = total_energy;
        }

        warn!("SCF did not converge within {} cycles", self.max_cycle);
        Err(QchemError::ScfNotConverged {
            cycles: self.max_cycle,
            delta_e,
        })
    }

    fn calculate_total_energy(&self) -> f64 {
        // E = ½ Σ P_ij (H_ij + F_ij) + E_nuc
        let electronic: f64 = self
            .density_matrix
            .iter()
            .zip(self.h_core.iter().zip(self.fock_matrix.iter()))
            .map(|(p, (h, f))| p * (h + f))
            .sum::<f64>()
            * 0.5;
        electronic + self.nuclear_repulsion()
    }
}
