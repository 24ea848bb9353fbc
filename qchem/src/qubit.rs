//! Pauli-string algebra.
//!
//! Wire 0 is the most significant bit of a computational-basis index, so the
//! state `|q0 q1 … q(n-1)>` has index `Σ q_w 2^(n-1-w)`.

use crate::error::{QchemError, Result};
use crate::fermion::format_coeff;
use nalgebra::DMatrix;
use num_complex::Complex64;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const IMAG: Complex64 = Complex64::new(0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    /// Single-qubit product `self · rhs` as `(phase, result)`.
    pub fn product(self, rhs: Pauli) -> (Complex64, Pauli) {
        use Pauli::{X, Y, Z};
        match (self, rhs) {
            (Pauli::I, p) | (p, Pauli::I) => (ONE, p),
            (X, X) | (Y, Y) | (Z, Z) => (ONE, Pauli::I),
            (X, Y) => (IMAG, Z),
            (Y, X) => (-IMAG, Z),
            (Y, Z) => (IMAG, X),
            (Z, Y) => (-IMAG, X),
            (Z, X) => (IMAG, Y),
            (X, Z) => (-IMAG, Y),
        }
    }

    /// Image of basis bit `bit`: `(flipped bit, phase)`.
    fn act(self, bit: usize) -> (usize, Complex64) {
        match self {
            Pauli::I => (bit, ONE),
            Pauli::X => (bit ^ 1, ONE),
            Pauli::Y => {
                if bit == 0 {
                    (1, IMAG)
                } else {
                    (0, -IMAG)
                }
            }
            Pauli::Z => {
                if bit == 0 {
                    (0, ONE)
                } else {
                    (1, -ONE)
                }
            }
        }
    }

    pub fn from_char(c: char) -> Option<Pauli> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }
}

/// Tensor product of non-identity Paulis keyed by wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PauliWord(BTreeMap<usize, Pauli>);

impl PauliWord {
    /// Identity factors are discarded; a repeated wire keeps the last Pauli.
    pub fn new(ops: impl IntoIterator<Item = (usize, Pauli)>) -> Self {
        PauliWord(ops.into_iter().filter(|&(_, p)| p != Pauli::I).collect())
    }

    pub fn identity() -> Self {
        PauliWord(BTreeMap::new())
    }

    pub fn single(wire: usize, pauli: Pauli) -> Self {
        Self::new([(wire, pauli)])
    }

    pub fn get(&self, wire: usize) -> Pauli {
        self.0.get(&wire).copied().unwrap_or(Pauli::I)
    }

    pub fn ops(&self) -> impl Iterator<Item = (usize, Pauli)> + '_ {
        self.0.iter().map(|(&w, &p)| (w, p))
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn wires(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }

    /// `self · rhs` as `(phase, word)`.
    pub fn product(&self, rhs: &PauliWord) -> (Complex64, PauliWord) {
        let mut phase = ONE;
        let mut ops = self.0.clone();
        for (&wire, &p) in &rhs.0 {
            match ops.get(&wire).copied() {
                None => {
                    ops.insert(wire, p);
                }
                Some(q) => {
                    let (ph, r) = q.product(p);
                    phase *= ph;
                    if r == Pauli::I {
                        ops.remove(&wire);
                    } else {
                        ops.insert(wire, r);
                    }
                }
            }
        }
        (phase, PauliWord(ops))
    }

    /// Maps basis index `i` on `n` wires to `(j, phase)` with
    /// `P|i> = phase |j>`.
    fn act(&self, i: usize, n: usize) -> (usize, Complex64) {
        let mut j = i;
        let mut phase = ONE;
        for (&wire, &p) in &self.0 {
            let shift = n - 1 - wire;
            let bit = (i >> shift) & 1;
            let (new_bit, ph) = p.act(bit);
            j = (j & !(1 << shift)) | (new_bit << shift);
            phase *= ph;
        }
        (j, phase)
    }
}

impl fmt::Display for PauliWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "I");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(w, p)| format!("{}({})", p.as_char(), w))
            .collect();
        write!(f, "{}", parts.join(" @ "))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauliSentence {
    terms: BTreeMap<PauliWord, Complex64>,
}

impl PauliSentence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_term(word: PauliWord, coeff: impl Into<Complex64>) -> Self {
        let mut sentence = Self::new();
        sentence.add_term(word, coeff);
        sentence
    }

    pub fn identity(coeff: impl Into<Complex64>) -> Self {
        Self::from_term(PauliWord::identity(), coeff)
    }

    pub fn add_term(&mut self, word: PauliWord, coeff: impl Into<Complex64>) {
        *self.terms.entry(word).or_insert(ZERO) += coeff.into();
    }

    pub fn terms(&self) -> impl Iterator<Item = (&PauliWord, &Complex64)> {
        self.terms.iter()
    }

    pub fn get(&self, word: &PauliWord) -> Option<Complex64> {
        self.terms.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Drops terms with `|c| <= tol`.
    pub fn simplify(&mut self, tol: f64) {
        self.terms.retain(|_, c| c.norm() > tol);
    }

    /// Zeroes imaginary parts with `|im| < tol`, then simplifies.
    pub fn chop_imaginary(&mut self, tol: f64) {
        for c in self.terms.values_mut() {
            if c.im.abs() < tol {
                c.im = 0.0;
            }
        }
        self.simplify(tol);
    }

    pub fn wires(&self) -> BTreeSet<usize> {
        self.terms.keys().flat_map(|w| w.wires()).collect()
    }

    /// Largest wire index plus one.
    pub fn num_wires(&self) -> usize {
        self.wires().iter().next_back().map_or(0, |w| w + 1)
    }

    fn check_wires(&self, n_wires: usize) -> Result<()> {
        if self.num_wires() > n_wires {
            return Err(QchemError::Dimension(format!(
                "operator acts on {} wires, requested {}",
                self.num_wires(),
                n_wires
            )));
        }
        if n_wires >= usize::BITS as usize {
            return Err(QchemError::Dimension(format!("{} wires is too many", n_wires)));
        }
        Ok(())
    }

    /// Dense `2^n × 2^n` matrix.
    pub fn to_matrix(&self, n_wires: usize) -> Result<DMatrix<Complex64>> {
        self.check_wires(n_wires)?;
        let dim = 1usize << n_wires;
        let mut m = DMatrix::from_element(dim, dim, ZERO);
        for (word, c) in &self.terms {
            for i in 0..dim {
                let (j, phase) = word.act(i, n_wires);
                m[(j, i)] += c * phase;
            }
        }
        Ok(m)
    }

    /// `H|ψ>` for a state on `log2(len)` wires.
    pub fn apply(&self, state: &[Complex64]) -> Result<Vec<Complex64>> {
        let n_wires = wires_of_state(state.len())?;
        self.check_wires(n_wires)?;
        let mut out = vec![ZERO; state.len()];
        for (word, c) in &self.terms {
            for (i, amp) in state.iter().enumerate() {
                if *amp == ZERO {
                    continue;
                }
                let (j, phase) = word.act(i, n_wires);
                out[j] += c * phase * amp;
            }
        }
        Ok(out)
    }

    /// `<ψ|H|ψ>`; real for Hermitian operators.
    pub fn expectation(&self, state: &[Complex64]) -> Result<Complex64> {
        let h_psi = self.apply(state)?;
        Ok(state.iter().zip(&h_psi).map(|(a, b)| a.conj() * b).sum())
    }

    /// Ascending eigenvalues of the Hermitian part.
    pub fn spectrum(&self, n_wires: usize) -> Result<Vec<f64>> {
        let m = self.to_matrix(n_wires)?;
        let hermitian = (&m + m.adjoint()) * Complex64::new(0.5, 0.0);
        let mut eigenvalues: Vec<f64> = hermitian.symmetric_eigenvalues().iter().copied().collect();
        eigenvalues.sort_by(|a, b| a.total_cmp(b));
        Ok(eigenvalues)
    }
}

fn wires_of_state(len: usize) -> Result<usize> {
    if len == 0 || !len.is_power_of_two() {
        return Err(QchemError::Dimension(format!(
            "state of length {} is not a power of two",
            len
        )));
    }
    Ok(len.trailing_zeros() as usize)
}

impl From<PauliWord> for PauliSentence {
    fn from(word: PauliWord) -> Self {
        PauliSentence::from_term(word, 1.0)
    }
}

impl AddAssign<&PauliSentence> for PauliSentence {
    fn add_assign(&mut self, rhs: &PauliSentence) {
        for (word, c) in &rhs.terms {
            self.add_term(word.clone(), *c);
        }
    }
}

impl Add for PauliSentence {
    type Output = PauliSentence;

    fn add(mut self, rhs: PauliSentence) -> PauliSentence {
        self += &rhs;
        self
    }
}

impl Add for &PauliSentence {
    type Output = PauliSentence;

    fn add(self, rhs: &PauliSentence) -> PauliSentence {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Neg for PauliSentence {
    type Output = PauliSentence;

    fn neg(self) -> PauliSentence {
        self * -1.0
    }
}

impl Sub for PauliSentence {
    type Output = PauliSentence;

    fn sub(self, rhs: PauliSentence) -> PauliSentence {
        self + (-rhs)
    }
}

impl Mul for &PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: &PauliSentence) -> PauliSentence {
        let mut out = PauliSentence::new();
        for (w1, c1) in &self.terms {
            for (w2, c2) in &rhs.terms {
                let (phase, word) = w1.product(w2);
                out.add_term(word, c1 * c2 * phase);
            }
        }
        out
    }
}

impl Mul for PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: PauliSentence) -> PauliSentence {
        &self * &rhs
    }
}

impl Mul<Complex64> for PauliSentence {
    type Output = PauliSentence;

    fn mul(mut self, rhs: Complex64) -> PauliSentence {
        for c in self.terms.values_mut() {
            *c *= rhs;
        }
        self
    }
}

impl Mul<f64> for PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: f64) -> PauliSentence {
        self * Complex64::new(rhs, 0.0)
    }
}

impl fmt::Display for PauliSentence {
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
