//! CISD over spin-orbital determinants.
//!
//! Determinants are occupation bitmasks (bit `p` set when spin orbital `p` is
//! occupied). The space holds the reference plus every Sz-conserving single
//! and double excitation; matrix elements come from the Slater-Condon rules.

use crate::error::{QchemError, Result};
use crate::fermion::Op;
use crate::integrals::{spin_orbital_integrals, SpinOrbitalIntegrals};
use crate::solver::RhfSolver;
use crate::state::apply_ladder;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::info;

pub struct CI {
    ints: SpinOrbitalIntegrals,

    /// Occupied spin orbitals of the reference
    pub num_occ: usize,

    /// Virtual spin orbitals
    pub num_virt: usize,

    /// Determinant space, reference first
    pub determinants: Vec<u64>,

    /// Electronic + nuclear energies of all roots, ascending
    pub energies: Vec<f64>,

    /// Ground-state coefficients over `determinants`
    pub ci_coeffs: Option<DVector<f64>>,

    pub correlation_energy: Option<f64>,
}

fn spin(p: usize) -> usize {
    p % 2
}

impl CI {
    pub fn from_rhf(solver: &RhfSolver) -> Result<Self> {
        Self::new(spin_orbital_integrals(solver)?)
    }

    pub fn new(ints: SpinOrbitalIntegrals) -> Result<Self> {
        let nso = ints.nso();
        if nso > 64 {
            return Err(QchemError::Dimension(format!(
                "{} spin orbitals do not fit a 64-bit determinant",
                nso
            )));
        }
        let num_occ = ints.num_occ;
        let num_virt = ints.num_virt();
        let determinants = Self::cisd_space(num_occ, nso);

        info!("===========================================");
        info!("     CISD Initialization");
        info!("===========================================");
        info!("Number of spin orbitals: {}", nso);
        info!("Number of occupied spin orbitals: {}", num_occ);
        info!("Number of determinants: {}", determinants.len());
        info!("===========================================");

        Ok(CI {
            ints,
            num_occ,
            num_virt,
            determinants,
            energies: Vec::new(),
            ci_coeffs: None,
            correlation_energy: None,
        })
    }

    /// Reference, singles and doubles that conserve Sz.
    fn cisd_space(num_occ: usize, nso: usize) -> Vec<u64> {
        let reference: u64 = if num_occ == 0 { 0 } else { (1u64 << num_occ) - 1 };
        let virt = num_occ..nso;
        let mut dets = vec![reference];

        for i in 0..num_occ {
            for a in virt.clone() {
                if spin(i) == spin(a) {
                    dets.push(reference ^ (1 << i) ^ (1 << a));
                }
            }
        }
        for ((i, j), (a, b)) in (0..num_occ)
            .tuple_combinations()
            .cartesian_product(virt.tuple_combinations())
        {
            if spin(i) + spin(j) == spin(a) + spin(b) {
                dets.push(reference ^ (1 << i) ^ (1 << j) ^ (1 << a) ^ (1 << b));
            }
        }
        dets
    }

    fn occupied(det: u64) -> Vec<usize> {
        (0..64).filter(|&p| det & (1 << p) != 0).collect()
    }

    /// `<bra|H|ket>` (electronic part) by the Slater-Condon rules.
    fn matrix_element(&self, bra: u64, ket: u64) -> f64 {
        let h = &self.ints.h;
        let g = &self.ints.g;
        let diff = bra ^ ket;
        match diff.count_ones() {
            0 => {
                let occ = Self::occupied(ket);
                let mut e = 0.0;
                for &p in &occ {
                    e += h[(p, p)];
                    for &q in &occ {
                        e += 0.5 * g[[p, q, p, q]];
                    }
                }
                e
            }
            2 => {
                let hole = Self::occupied(ket & diff)[0];
                let particle = Self::occupied(bra & diff)[0];
                let Some((_, sign)) =
                    apply_ladder(ket, &[(particle, Op::Create), (hole, Op::Annihilate)])
                else {
                    return 0.0;
                };
                let common = Self::occupied(ket & bra);
                let val = h[(particle, hole)]
                    + common.iter().map(|&r| g[[particle, r, hole, r]]).sum::<f64>();
                sign * val
            }
            4 => {
                let holes = Self::occupied(ket & diff);
                let particles = Self::occupied(bra & diff);
                let (p1, p2) = (holes[0], holes[1]);
                let (q1, q2) = (particles[0], particles[1]);
                let ops = [
                    (q1, Op::Create),
                    (q2, Op::Create),
                    (p2, Op::Annihilate),
                    (p1, Op::Annihilate),
                ];
                match apply_ladder(ket, &ops) {
                    Some((_, sign)) => sign * g[[q1, q2, p1, p2]],
                    None => 0.0,
                }
            }
            _ => 0.0,
        }
    }

    pub fn hamiltonian_matrix(&self) -> DMatrix<f64> {
        let n = self.determinants.len();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| self.matrix_element(self.determinants[i], self.determinants[j]))
                    .collect()
            })
            .collect();
        DMatrix::from_fn(n, n, |i, j| rows[i][j])
    }

    /// Diagonalises the CISD matrix and returns the ground-state correlation
    /// energy.
    pub fn solve(&mut self) -> Result<f64> {
        info!("===========================================");
        info!("     CISD Calculation");
        info!("===========================================");

        let h = self.hamiltonian_matrix();
        let eig = h.symmetric_eigen();

        let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));
        let ground = *order
            .first()
            .ok_or_else(|| QchemError::Dimension("empty determinant space".to_string()))?;

        let mut coeffs = eig.eigenvectors.column(ground).into_owned();
        if coeffs[0] < 0.0 {
            coeffs.neg_mut();
        }

        self.energies = order
            .iter()
            .map(|&k| eig.eigenvalues[k] + self.ints.e_nuc)
            .collect();
        let e_ground = self.energies[0];
        let corr = e_ground - self.ints.e_hf;

        info!("CISD ground-state energy:    {:.12} Eh", e_ground);
        info!("CISD correlation energy:     {:.12} Eh", corr);
        info!("Reference weight:            {:.6}", coeffs[0] * coeffs[0]);
        info!("===========================================");

        self.ci_coeffs = Some(coeffs);
        self.correlation_energy = Some(corr);
        Ok(corr)
    }

    pub fn get_correlation_energy(&self) -> Option<f64> {
        self.correlation_energy
    }

    pub fn hf_energy(&self) -> f64 {
        self.ints.e_hf
    }

    pub fn nso(&self) -> usize {
        self.ints.nso()
    }

    pub fn e_tot(&self) -> Result<f64> {
        self.energies
            .first()
            .copied()
            .ok_or_else(|| QchemError::NotSolved("call CI::solve() first".to_string()))
    }

    /// Excitation energies of the higher roots relative to the ground state.
    pub fn excitation_energies(&self) -> Vec<f64> {
        match self.energies.first() {
            Some(e0) => self.energies.iter().skip(1).map(|e| e - e0).collect(),
            None => Vec::new(),
        }
    }
}
