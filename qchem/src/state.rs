//! Wavefunctions as computational-basis state vectors.
//!
//! A determinant is an occupation bitmask over interleaved spin orbitals and
//! stands for `(a†_0)^n0 (a†_1)^n1 … |vac>`. On qubits, spin orbital `p` is
//! wire `p`, so the determinant maps onto the basis state whose index has
//! spin orbital 0 as the most significant bit.

use crate::ccsd_impl::CCSD;
use crate::ci_impl::CI;
use crate::error::{QchemError, Result};
use crate::fermion::Op;
use num_complex::Complex64;
use std::collections::BTreeMap;

/// Applies `ops[0] ops[1] …` (rightmost first) to `det`. Returns the new
/// determinant and its sign, or `None` when the product annihilates it.
pub(crate) fn apply_ladder(det: u64, ops: &[(usize, Op)]) -> Option<(u64, f64)> {
    let mut det = det;
    let mut sign = 1.0;
    for &(p, kind) in ops.iter().rev() {
        let bit = 1u64 << p;
        let occupied = det & bit != 0;
        match kind {
            Op::Create if occupied => return None,
            Op::Annihilate if !occupied => return None,
            _ => {}
        }
        if (det & (bit - 1)).count_ones() % 2 == 1 {
            sign = -sign;
        }
        det ^= bit;
    }
    Some((det, sign))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeterminantExpansion {
    n_spin_orbitals: usize,
    coefficients: BTreeMap<u64, f64>,
}

impl DeterminantExpansion {
    pub fn new(n_spin_orbitals: usize) -> Self {
        DeterminantExpansion {
            n_spin_orbitals,
            coefficients: BTreeMap::new(),
        }
    }

    pub fn n_spin_orbitals(&self) -> usize {
        self.n_spin_orbitals
    }

    pub fn add(&mut self, det: u64, coeff: f64) {
        *self.coefficients.entry(det).or_insert(0.0) += coeff;
    }

    pub fn get(&self, det: u64) -> f64 {
        self.coefficients.get(&det).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.coefficients.iter().map(|(&d, &c)| (d, c))
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Basis-state index of `det` (spin orbital 0 is the most significant bit).
    pub fn basis_index(&self, det: u64) -> usize {
        (0..self.n_spin_orbitals)
            .filter(|&p| det & (1 << p) != 0)
            .map(|p| 1usize << (self.n_spin_orbitals - 1 - p))
            .sum()
    }

    /// Dense normalised state; coefficients with `|c| < tol` are dropped first.
    pub fn to_state_vector(&self, tol: f64) -> Result<Vec<Complex64>> {
        if self.n_spin_orbitals >= 31 {
            return Err(QchemError::Dimension(format!(
                "a state over {} qubits is too large to store densely",
                self.n_spin_orbitals
            )));
        }
        let mut state = vec![Complex64::new(0.0, 0.0); 1 << self.n_spin_orbitals];
        for (det, c) in self.iter() {
            if c.abs() >= tol {
                state[self.basis_index(det)] += Complex64::new(c, 0.0);
            }
        }
        let norm = state.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(QchemError::Dimension(
                "every coefficient fell below the tolerance".to_string(),
            ));
        }
        for a in state.iter_mut() {
            *a /= norm;
        }
        Ok(state)
    }
}

/// A correlated wavefunction that can be expanded in determinants.
pub trait Wavefunction {
    fn determinants(&self) -> Result<DeterminantExpansion>;
}

impl Wavefunction for CCSD {
    /// exp(T) |HF> through double excitations, intermediate normalisation.
    fn determinants(&self) -> Result<DeterminantExpansion> {
        self.get_correlation_energy()
            .ok_or_else(|| QchemError::NotSolved("call CCSD::solve() first".to_string()))?;
        let o = self.num_occ;
        let v = self.num_virt;
        let nso = o + v;
        if nso > 64 {
            return Err(QchemError::Dimension(format!("{} spin orbitals exceed 64", nso)));
        }
        let reference: u64 = if o == 0 { 0 } else { (1u64 << o) - 1 };
        let mut expansion = DeterminantExpansion::new(nso);
        expansion.add(reference, 1.0);

        for i in 0..o {
            for a in 0..v {
                let ops = [(o + a, Op::Create), (i, Op::Annihilate)];
                if let Some((det, sign)) = apply_ladder(reference, &ops) {
                    expansion.add(det, sign * self.t1[(i, a)]);
                }
            }
        }
        for i in 0..o {
            for j in i + 1..o {
                for a in 0..v {
                    for b in a + 1..v {
                        let c = self.t2[[i, j, a, b]] + self.t1[(i, a)] * self.t1[(j, b)]
                            - self.t1[(i, b)] * self.t1[(j, a)];
                        let ops = [
                            (o + a, Op::Create),
                            (o + b, Op::Create),
                            (j, Op::Annihilate),
                            (i, Op::Annihilate),
                        ];
                        if let Some((det, sign)) = apply_ladder(reference, &ops) {
                            expansion.add(det, sign * c);
                        }
                    }
                }
            }
        }
        Ok(expansion)
    }
}

impl Wavefunction for CI {
    fn determinants(&self) -> Result<DeterminantExpansion> {
        let coeffs = self
            .ci_coeffs
            .as_ref()
            .ok_or_else(|| QchemError::NotSolved("call CI::solve() first".to_string()))?;
        let mut expansion = DeterminantExpansion::new(self.nso());
        for (&det, &c) in self.determinants.iter().zip(coeffs.iter()) {
            expansion.add(det, c);
        }
        Ok(expansion)
    }
}

/// State vector of a solved wavefunction on `2 × orbitals` qubits.
pub fn import_state<W: Wavefunction + ?Sized>(solver: &W, tol: f64) -> Result<Vec<Complex64>> {
    solver.determinants()?.to_state_vector(tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_ladder_signs() {
        // a†_2 a_0 |0011> : a_0 gives +, a†_2 passes orbital 1 → −
        assert_eq!(
            apply_ladder(0b0011, &[(2, Op::Create), (0, Op::Annihilate)]),
            Some((0b0110, -1.0))
        );
        assert_eq!(
            apply_ladder(0b0011, &[(2, Op::Create), (1, Op::Annihilate)]),
            Some((0b0101, 1.0))
        );
        assert_eq!(apply_ladder(0b0011, &[(1, Op::Create)]), None);
        assert_eq!(apply_ladder(0b0011, &[(3, Op::Annihilate)]), None);
    }

    #[test]
    fn test_basis_index_puts_orbital_zero_first() {
        let expansion = DeterminantExpansion::new(4);
        assert_eq!(expansion.basis_index(0b0011), 12);
        assert_eq!(expansion.basis_index(0b1100), 3);
        assert_eq!(expansion.basis_index(0b0001), 8);
    }

    #[test]
    fn test_state_vector_normalised_and_chopped() {
        let mut expansion = DeterminantExpansion::new(4);
        expansion.add(0b0011, 1.0);
        expansion.add(0b1100, -0.1);
        expansion.add(0b0101, 1e-12);
        let state = expansion.to_state_vector(1e-8).unwrap();
        let norm: f64 = state.iter().map(|a| a.norm_sqr()).sum();
        assert!((norm - 1.0).abs() < 1e-14);
        assert_eq!(state[expansion.basis_index(0b0101)], Complex64::new(0.0, 0.0));
        assert!(state[12].re > 0.99);
        assert!(state[3].re < 0.0);

        let empty = DeterminantExpansion::new(2);
        assert!(empty.to_state_vector(1e-8).is_err());
    }
}
