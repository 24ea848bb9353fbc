//! Spin-orbital CCSD on a closed-shell RHF reference.
//!
//! Amplitude equations follow Stanton and Gauss (J. Chem. Phys. 94, 4334),
//! with MP2 doubles as the starting guess.

use crate::error::{QchemError, Result};
use crate::integrals::{spin_orbital_integrals, SpinOrbitalIntegrals};
use crate::solver::RhfSolver;
use nalgebra::DMatrix;
use ndarray::{Array2, Array4};
use rayon::prelude::*;
use tracing::{info, warn};

pub struct CCSD {
    ints: SpinOrbitalIntegrals,

    /// Occupied spin orbitals
    pub num_occ: usize,

    /// Virtual spin orbitals
    pub num_virt: usize,

    /// t_i^a, shape (num_occ, num_virt)
    pub t1: DMatrix<f64>,

    /// t_ij^ab, shape (num_occ, num_occ, num_virt, num_virt)
    pub t2: Array4<f64>,

    pub correlation_energy: Option<f64>,

    pub max_iterations: usize,

    /// Threshold on both the energy change and the RMS amplitude change
    pub convergence_threshold: f64,
}

/// Intermediates of one iteration.
struct Intermediates {
    f_ae: Array2<f64>,
    f_mi: Array2<f64>,
    f_me: Array2<f64>,
    w_mnij: Array4<f64>,
    w_abef: Array4<f64>,
    w_mbej: Array4<f64>,
}

impl CCSD {
    pub fn from_rhf(solver: &RhfSolver, max_iterations: usize, convergence_threshold: f64) -> Result<Self> {
        let ints = spin_orbital_integrals(solver)?;
        Ok(Self::new(ints, max_iterations, convergence_threshold))
    }

    pub fn new(ints: SpinOrbitalIntegrals, max_iterations: usize, convergence_threshold: f64) -> Self {
        let num_occ = ints.num_occ;
        let num_virt = ints.num_virt();

        info!("===========================================");
        info!("     CCSD Initialization");
        info!("===========================================");
        info!("Number of spin orbitals: {}", ints.nso());
        info!("Number of occupied spin orbitals: {}", num_occ);
        info!("Number of virtual spin orbitals: {}", num_virt);
        info!("Max iterations: {}", max_iterations);
        info!("Convergence threshold: {:.2e}", convergence_threshold);
        info!("===========================================");

        CCSD {
            ints,
            num_occ,
            num_virt,
            t1: DMatrix::zeros(num_occ, num_virt),
            t2: Array4::zeros((num_occ, num_occ, num_virt, num_virt)),
            correlation_energy: None,
            max_iterations,
            convergence_threshold,
        }
    }

    pub fn hf_energy(&self) -> f64 {
        self.ints.e_hf
    }

    pub fn integrals(&self) -> &SpinOrbitalIntegrals {
        &self.ints
    }

    /// `<pq||rs>` over absolute spin-orbital indices; virtuals start at `num_occ`.
    #[inline]
    fn g(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.ints.g[[p, q, r, s]]
    }

    #[inline]
    fn f(&self, p: usize, q: usize) -> f64 {
        self.ints.fock[(p, q)]
    }

    fn d1(&self, i: usize, a: usize) -> f64 {
        let o = self.num_occ;
        self.f(i, i) - self.f(o + a, o + a)
    }

    fn d2(&self, i: usize, j: usize, a: usize, b: usize) -> f64 {
        let o = self.num_occ;
        self.f(i, i) + self.f(j, j) - self.f(o + a, o + a) - self.f(o + b, o + b)
    }

    /// t_ij^ab = <ij||ab> / D_ij^ab
    fn initialize_t2_from_mp2(&mut self) {
        info!("Initializing T2 amplitudes with MP2 guess...");
        let o = self.num_occ;
        let v = self.num_virt;
        let mut t2 = Array4::zeros((o, o, v, v));
        for ((i, j, a, b), t) in t2.indexed_iter_mut() {
            let d = self.d2(i, j, a, b);
            if d.abs() > 1e-12 {
                *t = self.g(i, j, o + a, o + b) / d;
            }
        }
        self.t2 = t2;
        self.t1 = DMatrix::from_fn(o, v, |i, a| {
            let d = self.d1(i, a);
            if d.abs() > 1e-12 {
                self.f(i, o + a) / d
            } else {
                0.0
            }
        });
    }

    /// τ̃ (`scale = 0.5`) or τ (`scale = 1.0`)
    fn tau(&self, scale: f64, i: usize, j: usize, a: usize, b: usize) -> f64 {
        self.t2[[i, j, a, b]]
            + scale * (self.t1[(i, a)] * self.t1[(j, b)] - self.t1[(i, b)] * self.t1[(j, a)])
    }

    /// E = Σ f_ia t_ia + ¼ Σ <ij||ab> t_ijab + ½ Σ <ij||ab> t_ia t_jb
    pub fn calculate_energy(&self) -> f64 {
        let o = self.num_occ;
        let v = self.num_virt;
        let mut energy = 0.0;
        for i in 0..o {
            for a in 0..v {
                energy += self.f(i, o + a) * self.t1[(i, a)];
            }
        }
        for i in 0..o {
            for j in 0..o {
                for a in 0..v {
                    for b in 0..v {
                        let g = self.g(i, j, o + a, o + b);
                        energy += 0.25 * g * self.t2[[i, j, a, b]]
                            + 0.5 * g * self.t1[(i, a)] * self.t1[(j, b)];
                    }
                }
            }
        }
        energy
    }

    fn build_intermediates(&self) -> Intermediates {
        let o = self.num_occ;
        let v = self.num_virt;
        let t1 = &self.t1;

        let f_ae = Array2::from_shape_fn((v, v), |(a, e)| {
            let mut val = if a == e { 0.0 } else { self.f(o + a, o + e) };
            for m in 0..o {
                val -= 0.5 * self.f(m, o + e) * t1[(m, a)];
                for f in 0..v {
                    val += t1[(m, f)] * self.g(m, o + a, o + f, o + e);
                    for n in 0..o {
                        val -= 0.5 * self.tau(0.5, m, n, a, f) * self.g(m, n, o + e, o + f);
                    }
                }
            }
            val
        });

        let f_mi = Array2::from_shape_fn((o, o), |(m, i)| {
            let mut val = if m == i { 0.0 } else { self.f(m, i) };
            for e in 0..v {
                val += 0.5 * t1[(i, e)] * self.f(m, o + e);
                for n in 0..o {
                    val += t1[(n, e)] * self.g(m, n, i, o + e);
                    for f in 0..v {
                        val += 0.5 * self.tau(0.5, i, n, e, f) * self.g(m, n, o + e, o + f);
                    }
                }
            }
            val
        });

        let f_me = Array2::from_shape_fn((o, v), |(m, e)| {
            let mut val = self.f(m, o + e);
            for n in 0..o {
                for f in 0..v {
                    val += t1[(n, f)] * self.g(m, n, o + e, o + f);
                }
            }
            val
        });

        let w_mnij = Array4::from_shape_fn((o, o, o, o), |(m, n, i, j)| {
            let mut val = self.g(m, n, i, j);
            for e in 0..v {
                val += t1[(j, e)] * self.g(m, n, i, o + e) - t1[(i, e)] * self.g(m, n, j, o + e);
                for f in 0..v {
                    val += 0.25 * self.tau(1.0, i, j, e, f) * self.g(m, n, o + e, o + f);
                }
            }
            val
        });

        let w_abef = Array4::from_shape_fn((v, v, v, v), |(a, b, e, f)| {
            let mut val = self.g(o + a, o + b, o + e, o + f);
            for m in 0..o {
                val -= t1[(m, b)] * self.g(o + a, m, o + e, o + f)
                    - t1[(m, a)] * self.g(o + b, m, o + e, o + f);
                for n in 0..o {
                    val += 0.25 * self.tau(1.0, m, n, a, b) * self.g(m, n, o + e, o + f);
                }
            }
            val
        });

        let w_mbej = Array4::from_shape_fn((o, v, v, o), |(m, b, e, j)| {
            let mut val = self.g(m, o + b, o + e, j);
            for f in 0..v {
                val += t1[(j, f)] * self.g(m, o + b, o + e, o + f);
            }
            for n in 0..o {
                val -= t1[(n, b)] * self.g(m, n, o + e, j);
                for f in 0..v {
                    val -= (0.5 * self.t2[[j, n, f, b]] + t1[(j, f)] * t1[(n, b)])
                        * self.g(m, n, o + e, o + f);
                }
            }
            val
        });

        Intermediates {
            f_ae,
            f_mi,
            f_me,
            w_mnij,
            w_abef,
            w_mbej,
        }
    }

    fn update_t1(&self, im: &Intermediates) -> DMatrix<f64> {
        let o = self.num_occ;
        let v = self.num_virt;
        let t1 = &self.t1;
        let t2 = &self.t2;

        DMatrix::from_fn(o, v, |i, a| {
            let mut r = self.f(i, o + a);
            for e in 0..v {
                r += t1[(i, e)] * im.f_ae[[a, e]];
            }
            for m in 0..o {
                r -= t1[(m, a)] * im.f_mi[[m, i]];
                for e in 0..v {
                    r += t2[[i, m, a, e]] * im.f_me[[m, e]];
                    for f in 0..v {
                        r -= 0.5 * t2[[i, m, e, f]] * self.g(m, o + a, o + e, o + f);
                    }
                    for n in 0..o {
                        r -= 0.5 * t2[[m, n, a, e]] * self.g(n, m, o + e, i);
                    }
                }
            }
            for n in 0..o {
                for f in 0..v {
                    r -= t1[(n, f)] * self.g(n, o + a, i, o + f);
                }
            }
            r / self.d1(i, a)
        })
    }

    fn t2_residual(&self, im: &Intermediates, i: usize, j: usize, a: usize, b: usize) -> f64 {
        let o = self.num_occ;
        let v = self.num_virt;
        let t1 = &self.t1;
        let t2 = &self.t2;

        let mut r = self.g(i, j, o + a, o + b);

        // P(ab) Σ_e t_ijae (F_be − ½ Σ_m t_mb F_me)
        for e in 0..v {
            let mut fb = im.f_ae[[b, e]];
            let mut fa = im.f_ae[[a, e]];
            for m in 0..o {
                fb -= 0.5 * t1[(m, b)] * im.f_me[[m, e]];
                fa -= 0.5 * t1[(m, a)] * im.f_me[[m, e]];
            }
            r += t2[[i, j, a, e]] * fb - t2[[i, j, b, e]] * fa;
        }

        // −P(ij) Σ_m t_imab (F_mj + ½ Σ_e t_je F_me)
        for m in 0..o {
            let mut fj = im.f_mi[[m, j]];
            let mut fi = im.f_mi[[m, i]];
            for e in 0..v {
                fj += 0.5 * t1[(j, e)] * im.f_me[[m, e]];
                fi += 0.5 * t1[(i, e)] * im.f_me[[m, e]];
            }
            r -= t2[[i, m, a, b]] * fj - t2[[j, m, a, b]] * fi;
        }

        for m in 0..o {
            for n in 0..o {
                r += 0.5 * self.tau(1.0, m, n, a, b) * im.w_mnij[[m, n, i, j]];
            }
        }
        for e in 0..v {
            for f in 0..v {
                r += 0.5 * self.tau(1.0, i, j, e, f) * im.w_abef[[a, b, e, f]];
            }
        }

        // P(ij) P(ab) Σ_me (t_imae W_mbej − t_ie t_ma <mb||ej>)
        let ring = |i: usize, j: usize, a: usize, b: usize| {
            let mut val = 0.0;
            for m in 0..o {
                for e in 0..v {
                    val += t2[[i, m, a, e]] * im.w_mbej[[m, b, e, j]]
                        - t1[(i, e)] * t1[(m, a)] * self.g(m, o + b, o + e, j);
                }
            }
            val
        };
        r += ring(i, j, a, b) - ring(j, i, a, b) - ring(i, j, b, a) + ring(j, i, b, a);

        for e in 0..v {
            r += t1[(i, e)] * self.g(o + a, o + b, o + e, j) - t1[(j, e)] * self.g(o + a, o + b, o + e, i);
        }
        for m in 0..o {
            r -= t1[(m, a)] * self.g(m, o + b, i, j) - t1[(m, b)] * self.g(m, o + a, i, j);
        }

        r
    }

    fn update_t2(&self, im: &Intermediates) -> Array4<f64> {
        let o = self.num_occ;
        let v = self.num_virt;

        let pairs: Vec<(usize, usize)> = (0..o).flat_map(|i| (0..o).map(move |j| (i, j))).collect();
        let results: Vec<_> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let mut local = Vec::with_capacity(v * v);
                for a in 0..v {
                    for b in 0..v {
                        let d = self.d2(i, j, a, b);
                        local.push((a, b, self.t2_residual(im, i, j, a, b) / d));
                    }
                }
                (i, j, local)
            })
            .collect();

        let mut new_t2 = Array4::zeros((o, o, v, v));
        for (i, j, local) in results {
            for (a, b, value) in local {
                new_t2[[i, j, a, b]] = value;
            }
        }
        new_t2
    }

    fn calculate_rms_change(&self, new_t1: &DMatrix<f64>, new_t2: &Array4<f64>) -> f64 {
        let mut sum_sq = 0.0;
        for (new, old) in new_t1.iter().zip(self.t1.iter()) {
            sum_sq += (new - old).powi(2);
        }
        for (new, old) in new_t2.iter().zip(self.t2.iter()) {
            sum_sq += (new - old).powi(2);
        }
        let count = new_t1.len() + new_t2.len();
        if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64).sqrt()
        }
    }

    /// Iterates the amplitude equations and returns the correlation energy.
    pub fn solve(&mut self) -> Result<f64> {
        info!("===========================================");
        info!("     Starting CCSD Iterations");
        info!("===========================================");

        if self.num_occ == 0 || self.num_virt == 0 {
            info!("No excitations possible; correlation energy is zero.");
            self.correlation_energy = Some(0.0);
            return Ok(0.0);
        }

        self.initialize_t2_from_mp2();
        let mut old_energy = self.calculate_energy();
        info!("Initial energy (MP2): {:.12} Eh", old_energy);
        info!("");
        info!("{:>5} {:>18} {:>18} {:>15}", "Iter", "E_CCSD", "ΔE", "RMS(T)");
        info!("{}", "-".repeat(60));

        for iteration in 0..self.max_iterations {
            let im = self.build_intermediates();
            let new_t1 = self.update_t1(&im);
            let new_t2 = self.update_t2(&im);
            let rms = self.calculate_rms_change(&new_t1, &new_t2);

            self.t1 = new_t1;
            self.t2 = new_t2;

            let new_energy = self.calculate_energy();
            let delta_e = new_energy - old_energy;
            info!("{:5} {:18.12} {:18.12} {:15.10}", iteration + 1, new_energy, delta_e, rms);

            if rms < self.convergence_threshold && delta_e.abs() < self.convergence_threshold {
                info!("");
                info!("===========================================");
                info!("       CCSD Converged!");
                info!("===========================================");
                info!("Final CCSD correlation energy: {:.12} Eh", new_energy);
                info!("Number of iterations: {}", iteration + 1);
                info!("===========================================");
                self.correlation_energy = Some(new_energy);
                return Ok(new_energy);
            }
            old_energy = new_energy;
        }

        warn!("===========================================");
        warn!("       CCSD NOT Converged");
        warn!("===========================================");
        warn!("Maximum iterations ({}) reached", self.max_iterations);
        warn!("Last CCSD correlation energy: {:.12} Eh", old_energy);
        Err(QchemError::NotConverged {
            method: "CCSD".to_string(),
            iterations: self.max_iterations,
        })
    }

    pub fn get_correlation_energy(&self) -> Option<f64> {
        self.correlation_energy
    }

    /// HF plus correlation energy.
    pub fn e_tot(&self) -> Result<f64> {
        self.correlation_energy
            .map(|e| self.ints.e_hf + e)
            .ok_or_else(|| QchemError::NotSolved("call CCSD::solve() first".to_string()))
    }

    pub fn print_summary(&self) {
        info!("===========================================");
        info!("        CCSD Results Summary");
        info!("===========================================");
        info!("Hartree-Fock energy:       {:.12} Eh", self.ints.e_hf);
        match self.correlation_energy {
            Some(corr_e) => {
                info!("CCSD correlation energy:   {:.12} Eh", corr_e);
                info!("Total CCSD energy:         {:.12} Eh", self.ints.e_hf + corr_e);
                info!("T1 diagnostic:             {:.6}", self.t1_diagnostic());
            }
            None => info!("CCSD correlation energy not yet calculated."),
        }
        info!("===========================================");
    }

    /// ||T1|| / √N over spin-orbital amplitudes.
    ///
    /// Values above 0.02 for closed shells hint at multireference character.
    pub fn t1_diagnostic(&self) -> f64 {
        if self.num_occ == 0 {
            return 0.0;
        }
        let t1_norm: f64 = self.t1.iter().map(|x| x * x).sum::<f64>().sqrt();
        t1_norm / (self.num_occ as f64).sqrt()
    }
}
