//! Second-quantised fermionic operators.
//!
//! A [`FermiWord`] is an ordered product of ladder operators on spin orbitals,
//! a [`FermiSentence`] a linear combination of words with complex
//! coefficients. Terms live in a `BTreeMap`, so iteration and printing order
//! never depend on hashing.

use nalgebra::DMatrix;
use ndarray::Array4;
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Integrals with a magnitude at or below this are dropped by default.
pub const DEFAULT_CUTOFF: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    Create,
    Annihilate,
}

impl Op {
    pub fn dagger(self) -> Op {
        match self {
            Op::Create => Op::Annihilate,
            Op::Annihilate => Op::Create,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FermiWord(Vec<(usize, Op)>);

impl FermiWord {
    pub fn new(ops: Vec<(usize, Op)>) -> Self {
        FermiWord(ops)
    }

    pub fn identity() -> Self {
        FermiWord(Vec::new())
    }

    pub fn create(orbital: usize) -> Self {
        FermiWord(vec![(orbital, Op::Create)])
    }

    pub fn annihilate(orbital: usize) -> Self {
        FermiWord(vec![(orbital, Op::Annihilate)])
    }

    pub fn ops(&self) -> &[(usize, Op)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reversed order, creation and annihilation exchanged.
    pub fn adjoint(&self) -> FermiWord {
        FermiWord(self.0.iter().rev().map(|&(p, op)| (p, op.dagger())).collect())
    }

    /// Largest orbital index plus one.
    pub fn num_orbitals(&self) -> usize {
        self.0.iter().map(|&(p, _)| p + 1).max().unwrap_or(0)
    }

    /// A word with the same ladder operator on one orbital twice in a row is
    /// identically zero.
    fn is_trivially_zero(&self) -> bool {
        self.0.windows(2).any(|w| w[0] == w[1])
    }
}

impl Mul for &FermiWord {
    type Output = FermiWord;

    fn mul(self, rhs: &FermiWord) -> FermiWord {
        let mut ops = self.0.clone();
        ops.extend_from_slice(&rhs.0);
        FermiWord(ops)
    }
}

impl fmt::Display for FermiWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|&(p, op)| match op {
                Op::Create => format!("a⁺({})", p),
                Op::Annihilate => format!("a({})", p),
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Prints real coefficients as plain numbers and complex ones as `(a+bj)`.
pub(crate) fn format_coeff(c: Complex64) -> String {
    if c.im == 0.0 {
        format!("{}", c.re)
    } else if c.im < 0.0 {
        format!("({}-{}j)", c.re, -c.im)
    } else {
        format!("({}+{}j)", c.re, c.im)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FermiSentence {
    terms: BTreeMap<FermiWord, Complex64>,
}

impl FermiSentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_term(word: FermiWord, coeff: impl Into<Complex64>) -> Self {
        let mut sentence = Self::new();
        sentence.add_term(word, coeff);
        sentence
    }

    pub fn identity(coeff: impl Into<Complex64>) -> Self {
        Self::from_term(FermiWord::identity(), coeff)
    }

    /// Accumulates `coeff` onto `word`.
    pub fn add_term(&mut self, word: FermiWord, coeff: impl Into<Complex64>) {
        *self.terms.entry(word).or_insert(Complex64::new(0.0, 0.0)) += coeff.into();
    }

    pub fn terms(&self) -> impl Iterator<Item = (&FermiWord, &Complex64)> {
        self.terms.iter()
    }

    pub fn get(&self, word: &FermiWord) -> Option<Complex64> {
        self.terms.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn num_orbitals(&self) -> usize {
        self.terms.keys().map(FermiWord::num_orbitals).max().unwrap_or(0)
    }

    pub fn adjoint(&self) -> FermiSentence {
        FermiSentence {
            terms: self.terms.iter().map(|(w, c)| (w.adjoint(), c.conj())).collect(),
        }
    }

    /// Drops terms whose coefficient magnitude is at or below `tol` and words
    /// that vanish identically.
    pub fn simplify(&mut self, tol: f64) {
        self.terms
            .retain(|word, c| c.norm() > tol && !word.is_trivially_zero());
    }

    pub fn simplified(mut self, tol: f64) -> Self {
        self.simplify(tol);
        self
    }
}

impl From<FermiWord> for FermiSentence {
    fn from(word: FermiWord) -> Self {
        FermiSentence::from_term(word, 1.0)
    }
}

impl AddAssign<&FermiSentence> for FermiSentence {
    fn add_assign(&mut self, rhs: &FermiSentence) {
        for (word, c) in &rhs.terms {
            self.add_term(word.clone(), *c);
        }
    }
}

impl Add for FermiSentence {
    type Output = FermiSentence;

    fn add(mut self, rhs: FermiSentence) -> FermiSentence {
        self += &rhs;
        self
    }
}

impl Add for &FermiSentence {
    type Output = FermiSentence;

    fn add(self, rhs: &FermiSentence) -> FermiSentence {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Neg for FermiSentence {
    type Output = FermiSentence;

    fn neg(self) -> FermiSentence {
        self * -1.0
    }
}

impl Sub for FermiSentence {
    type Output = FermiSentence;

    fn sub(self, rhs: FermiSentence) -> FermiSentence {
        self + (-rhs)
    }
}

impl Mul for &FermiSentence {
    type Output = FermiSentence;

    fn mul(self, rhs: &FermiSentence) -> FermiSentence {
        let mut out = FermiSentence::new();
        for (w1, c1) in &self.terms {
            for (w2, c2) in &rhs.terms {
                out.add_term(w1 * w2, c1 * c2);
            }
        }
        out
    }
}

impl Mul for FermiSentence {
    type Output = FermiSentence;

    fn mul(self, rhs: FermiSentence) -> FermiSentence {
        &self * &rhs
    }
}

impl Mul<Complex64> for FermiSentence {
    type Output = FermiSentence;

    fn mul(mut self, rhs: Complex64) -> FermiSentence {
        for c in self.terms.values_mut() {
            *c *= rhs;
        }
        self
    }
}

impl Mul<f64> for FermiSentence {
    type Output = FermiSentence;

    fn mul(self, rhs: f64) -> FermiSentence {
        self * Complex64::new(rhs, 0.0)
    }
}

impl fmt::Display for FermiSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0 * I");
        }
        let lines: Vec<String> = self
            .terms
            .iter()
            .map(|(w, c)| format!("{} * {}", format_coeff(*c), w))
            .collect();
        write!(f, "{}", lines.join("\n+ "))
    }
}

/// Spin blocks `(σ_p, σ_q, σ_r, σ_s)` of `a†_pσ a†_qτ a_rτ a_sσ`.
const SPIN_BLOCKS: [[usize; 4]; 4] = [[0, 0, 0, 0], [0, 1, 1, 0], [1, 0, 0, 1], [1, 1, 1, 1]];

/// Builds the electronic Hamiltonian from spatial-orbital integrals:
///
/// `H = c + Σ h_pq a†_pσ a_qσ + ½ Σ g_pqrs a†_pσ a†_qτ a_rτ a_sσ`
///
/// `two` is in physicists' notation. Spin orbital `2p` is the α and `2p + 1`
/// the β partner of spatial orbital `p`. Integrals with magnitude at or below
/// `cutoff` are skipped; the constant term is always present.
pub fn fermionic_observable(
    constant: &[f64],
    one: &DMatrix<f64>,
    two: &Array4<f64>,
    cutoff: f64,
) -> FermiSentence {
    let n = one.nrows();
    let mut h = FermiSentence::new();

    for p in 0..n {
        for q in 0..n {
            let h_pq = one[(p, q)];
            if h_pq.abs() <= cutoff {
                continue;
            }
            for sigma in 0..2 {
                let word = FermiWord::new(vec![
                    (2 * p + sigma, Op::Create),
                    (2 * q + sigma, Op::Annihilate),
                ]);
                h.add_term(word, h_pq);
            }
        }
    }

    let (d0, d1, d2, d3) = two.dim();
    for p in 0..d0 {
        for q in 0..d1 {
            for r in 0..d2 {
                for s in 0..d3 {
                    let g = two[[p, q, r, s]];
                    if g.abs() <= cutoff {
                        continue;
                    }
                    for spins in SPIN_BLOCKS.iter() {
                        let word = FermiWord::new(vec![
                            (2 * p + spins[0], Op::Create),
                            (2 * q + spins[1], Op::Create),
                            (2 * r + spins[2], Op::Annihilate),
                            (2 * s + spins[3], Op::Annihilate),
                        ]);
                        h.add_term(word, 0.5 * g);
                    }
                }
            }
        }
    }

    h.simplify(0.0);
    h.add_term(FermiWord::identity(), constant.iter().sum::<f64>());
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let word = FermiWord::new(vec![(0, Op::Create), (2, Op::Annihilate)]);
        let op = FermiSentence::from_term(word, 0.5);
        assert_eq!(op.to_string(), "0.5 * a⁺(0) a(2)");
        assert_eq!(FermiSentence::identity(1.5).to_string(), "1.5 * I");
    }

    #[test]
    fn test_adjoint() {
        let word = FermiWord::new(vec![(0, Op::Create), (2, Op::Annihilate)]);
        assert_eq!(
            word.adjoint(),
            FermiWord::new(vec![(2, Op::Create), (0, Op::Annihilate)])
        );
        let op = FermiSentence::from_term(word, Complex64::new(0.0, 1.0));
        let adj = op.adjoint();
        assert_eq!(adj.len(), 1);
        let (_, c) = adj.terms().next().unwrap();
        assert_eq!(*c, Complex64::new(0.0, -1.0));
    }

    #[test]
    fn test_arithmetic_and_simplify() {
        let a = FermiSentence::from(FermiWord::create(0));
        let b = FermiSentence::from(FermiWord::annihilate(1));
        let prod = &a * &b;
        assert_eq!(
            prod.get(&FermiWord::new(vec![(0, Op::Create), (1, Op::Annihilate)])),
            Some(Complex64::new(1.0, 0.0))
        );

        let mut sum = prod.clone() + prod.clone() * 2.0;
        assert_eq!(sum.len(), 1);
        assert_eq!(sum.terms().next().unwrap().1.re, 3.0);

        sum = sum.clone() - sum;
        sum.simplify(1e-12);
        assert!(sum.is_empty());

        let mut zero = &a * &a;
        zero.simplify(0.0);
        assert!(zero.is_empty());
    }

    #[test]
    fn test_observable_spin_structure() {
        let one = DMatrix::from_row_slice(1, 1, &[-1.0]);
        let two = Array4::from_elem((1, 1, 1, 1), 0.6);
        let h = fermionic_observable(&[0.25], &one, &two, DEFAULT_CUTOFF);

        assert_eq!(h.get(&FermiWord::identity()), Some(Complex64::new(0.25, 0.0)));
        assert_eq!(
            h.get(&FermiWord::new(vec![(0, Op::Create), (0, Op::Annihilate)])),
            Some(Complex64::new(-1.0, 0.0))
        );
        assert_eq!(
            h.get(&FermiWord::new(vec![(1, Op::Create), (1, Op::Annihilate)])),
            Some(Complex64::new(-1.0, 0.0))
        );
        // the αα and ββ two-body words vanish, αβ and βα survive
        assert_eq!(
            h.get(&FermiWord::new(vec![
                (0, Op::Create),
                (1, Op::Create),
                (1, Op::Annihilate),
                (0, Op::Annihilate)
            ])),
            Some(Complex64::new(0.3, 0.0))
        );
        assert_eq!(h.len(), 5);
        assert_eq!(h.num_orbitals(), 2);
    }

    #[test]
    fn test_observable_cutoff_keeps_constant() {
        let one = DMatrix::from_row_slice(2, 2, &[1e-14, 0.0, 0.0, 1e-14]);
        let two = Array4::zeros((2, 2, 2, 2));
        let h = fermionic_observable(&[0.0], &one, &two, DEFAULT_CUTOFF);
        assert_eq!(h.len(), 1);
        assert!(h.get(&FermiWord::identity()).is_some());
    }
}
