//! OpenFermion-style operator representations.
//!
//! Terms are tuples of `(index, action)` pairs written as term strings,
//! `"X0 X1"` for qubit operators and `"0^ 2"` for fermion operators. The
//! printed form is one `coeff [term]` per line joined by ` +`, the same text
//! [`FromStr`] reads back.

use crate::error::{QchemError, Result};
use crate::fermion::format_coeff;
use crate::qubit::{Pauli, PauliWord};
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

fn parse_coeff(text: &str) -> Result<Complex64> {
    let t = text.trim();
    if t.is_empty() || t == "+" {
        return Ok(Complex64::new(1.0, 0.0));
    }
    if t == "-" {
        return Ok(Complex64::new(-1.0, 0.0));
    }
    let t = t.trim_start_matches('(').trim_end_matches(')');
    let bad = || QchemError::ParseOperator(format!("bad coefficient '{}'", text));

    let Some(body) = t.strip_suffix('j') else {
        return t.parse::<f64>().map(|re| Complex64::new(re, 0.0)).map_err(|_| bad());
    };
    // split "a+bj" at the last sign that is not an exponent sign
    let split = body
        .char_indices()
        .filter(|&(i, ch)| {
            (ch == '+' || ch == '-') && i > 0 && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last();
    match split {
        Some(i) => {
            let re = body[..i].parse::<f64>().map_err(|_| bad())?;
            let im = body[i..].parse::<f64>().map_err(|_| bad())?;
            Ok(Complex64::new(re, im))
        }
        None => {
            let im = match body {
                "" | "+" => 1.0,
                "-" => -1.0,
                other => other.parse::<f64>().map_err(|_| bad())?,
            };
            Ok(Complex64::new(0.0, im))
        }
    }
}

/// Splits `coeff [term] + coeff [term] …` into `(coeff, term)` pairs.
fn split_terms(text: &str) -> Result<Vec<(Complex64, String)>> {
    let mut out = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let open = rest
            .find('[')
            .ok_or_else(|| QchemError::ParseOperator(format!("missing '[' in '{}'", rest)))?;
        let close = rest
            .find(']')
            .ok_or_else(|| QchemError::ParseOperator(format!("missing ']' in '{}'", rest)))?;
        if close < open {
            return Err(QchemError::ParseOperator(format!("unbalanced brackets in '{}'", rest)));
        }
        let coeff = parse_coeff(&rest[..open])?;
        out.push((coeff, rest[open + 1..close].trim().to_string()));
        rest = rest[close + 1..].trim_start();
        if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped.trim_start();
            if rest.is_empty() {
                return Err(QchemError::ParseOperator("dangling '+'".to_string()));
            }
        }
    }
    Ok(out)
}

fn write_terms<'a, K: 'a>(
    f: &mut fmt::Formatter<'_>,
    terms: impl Iterator<Item = (&'a K, &'a Complex64)>,
    render: impl Fn(&K) -> String,
) -> fmt::Result {
    let lines: Vec<String> = terms
        .map(|(term, c)| format!("{} [{}]", format_coeff(*c), render(term)))
        .collect();
    if lines.is_empty() {
        return write!(f, "0");
    }
    write!(f, "{}", lines.join(" +\n"))
}

/// Linear combination of Pauli strings, each stored sorted by qubit with at
/// most one Pauli per qubit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QubitOperator {
    terms: BTreeMap<Vec<(usize, Pauli)>, Complex64>,
}

impl QubitOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(coeff: impl Into<Complex64>) -> Self {
        let mut op = Self::new();
        op.add_term(Vec::new(), coeff);
        op
    }

    /// `QubitOperator::from_term("X0 X1", 0.1)`.
    pub fn from_term(term: &str, coeff: impl Into<Complex64>) -> Result<Self> {
        let mut ops = Vec::new();
        for token in term.split_whitespace() {
            let mut chars = token.chars();
            let pauli = chars
                .next()
                .and_then(Pauli::from_char)
                .ok_or_else(|| QchemError::ParseOperator(format!("bad Pauli factor '{}'", token)))?;
            let qubit = chars
                .as_str()
                .parse::<usize>()
                .map_err(|_| QchemError::ParseOperator(format!("bad qubit index in '{}'", token)))?;
            ops.push((qubit, pauli));
        }
        let mut op = Self::new();
        op.add_term(ops, coeff);
        Ok(op)
    }

    /// Canonicalises `ops` (sorted by qubit, same-qubit factors multiplied out)
    /// and accumulates the coefficient.
    pub fn add_term(&mut self, ops: Vec<(usize, Pauli)>, coeff: impl Into<Complex64>) {
        let mut word = PauliWord::identity();
        let mut phase = Complex64::new(1.0, 0.0);
        for (qubit, pauli) in ops {
            let (ph, w) = word.product(&PauliWord::single(qubit, pauli));
            phase *= ph;
            word = w;
        }
        let key: Vec<(usize, Pauli)> = word.ops().collect();
        *self.terms.entry(key).or_insert(ZERO) += phase * coeff.into();
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Vec<(usize, Pauli)>, &Complex64)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Drops terms with `|c| <= tol`.
    pub fn compress(&mut self, tol: f64) {
        self.terms.retain(|_, c| c.norm() > tol);
    }
}

fn qubit_term_string(term: &[(usize, Pauli)]) -> String {
    term.iter()
        .map(|(q, p)| format!("{}{}", p.as_char(), q))
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for QubitOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(f, self.terms.iter(), |t| qubit_term_string(t))
    }
}

impl FromStr for QubitOperator {
    type Err = QchemError;

    fn from_str(s: &str) -> Result<Self> {
        let mut op = QubitOperator::new();
        for (coeff, term) in split_terms(s)? {
            op += &QubitOperator::from_term(&term, coeff)?;
        }
        Ok(op)
    }
}

impl AddAssign<&QubitOperator> for QubitOperator {
    fn add_assign(&mut self, rhs: &QubitOperator) {
        for (term, c) in &rhs.terms {
            *self.terms.entry(term.clone()).or_insert(ZERO) += c;
        }
    }
}

impl Add for QubitOperator {
    type Output = QubitOperator;

    fn add(mut self, rhs: QubitOperator) -> QubitOperator {
        self += &rhs;
        self
    }
}

impl Mul for &QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: &QubitOperator) -> QubitOperator {
        let mut out = QubitOperator::new();
        for (t1, c1) in &self.terms {
            for (t2, c2) in &rhs.terms {
                let ops = t1.iter().chain(t2.iter()).copied().collect();
                out.add_term(ops, c1 * c2);
            }
        }
        out
    }
}

impl Mul for QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: QubitOperator) -> QubitOperator {
        &self * &rhs
    }
}

impl Mul<Complex64> for QubitOperator {
    type Output = QubitOperator;

    fn mul(mut self, rhs: Complex64) -> QubitOperator {
        for c in self.terms.values_mut() {
            *c *= rhs;
        }
        self
    }
}

impl Mul<f64> for QubitOperator {
    type Output = QubitOperator;

    fn mul(self, rhs: f64) -> QubitOperator {
        self * Complex64::new(rhs, 0.0)
    }
}

/// Linear combination of ladder-operator products; `true` marks a creation
/// operator (`"3^"`). Terms keep the order they were written in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FermionOperator {
    terms: BTreeMap<Vec<(usize, bool)>, Complex64>,
}

impl FermionOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(coeff: impl Into<Complex64>) -> Self {
        let mut op = Self::new();
        op.add_term(Vec::new(), coeff);
        op
    }

    /// `FermionOperator::from_term("0^ 2", 0.5)`.
    pub fn from_term(term: &str, coeff: impl Into<Complex64>) -> Result<Self> {
        let mut ops = Vec::new();
        for token in term.split_whitespace() {
            let (index, create) = match token.strip_suffix('^') {
                Some(index) => (index, true),
                None => (token, false),
            };
            let index = index
                .parse::<usize>()
                .map_err(|_| QchemError::ParseOperator(format!("bad ladder operator '{}'", token)))?;
            ops.push((index, create));
        }
        let mut op = Self::new();
        op.add_term(ops, coeff);
        Ok(op)
    }

    pub fn add_term(&mut self, ops: Vec<(usize, bool)>, coeff: impl Into<Complex64>) {
        *self.terms.entry(ops).or_insert(ZERO) += coeff.into();
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Vec<(usize, bool)>, &Complex64)> {
        self.terms.iter()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn compress(&mut self, tol: f64) {
        self.terms.retain(|_, c| c.norm() > tol);
    }
}

fn fermion_term_string(term: &[(usize, bool)]) -> String {
    term.iter()
        .map(|&(p, create)| if create { format!("{}^", p) } else { p.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for FermionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(f, self.terms.iter(), |t| fermion_term_string(t))
    }
}

impl FromStr for FermionOperator {
    type Err = QchemError;

    fn from_str(s: &str) -> Result<Self> {
        let mut op = FermionOperator::new();
        for (coeff, term) in split_terms(s)? {
            op += &FermionOperator::from_term(&term, coeff)?;
        }
        Ok(op)
    }
}

impl AddAssign<&FermionOperator> for FermionOperator {
    fn add_assign(&mut self, rhs: &FermionOperator) {
        for (term, c) in &rhs.terms {
            self.add_term(term.clone(), *c);
        }
    }
}

impl Add for FermionOperator {
    type Output = FermionOperator;

    fn add(mut self, rhs: FermionOperator) -> FermionOperator {
        self += &rhs;
        self
    }
}

impl Mul for &FermionOperator {
    type Output = FermionOperator;

    fn mul(self, rhs: &FermionOperator) -> FermionOperator {
        let mut out = FermionOperator::new();
        for (t1, c1) in &self.terms {
            for (t2, c2) in &rhs.terms {
                let ops = t1.iter().chain(t2.iter()).copied().collect();
                out.add_term(ops, c1 * c2);
            }
        }
        out
    }
}

impl Mul for FermionOperator {
    type Output = FermionOperator;

    fn mul(self, rhs: FermionOperator) -> FermionOperator {
        &self * &rhs
    }
}

impl Mul<Complex64> for FermionOperator {
    type Output = FermionOperator;

    fn mul(mut self, rhs: Complex64) -> FermionOperator {
        for c in self.terms.values_mut() {
            *c *= rhs;
        }
        self
    }
}

impl Mul<f64> for FermionOperator {
    type Output = FermionOperator;

    fn mul(self, rhs: f64) -> FermionOperator {
        self * Complex64::new(rhs, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_operator_display_and_parse() {
        let op = QubitOperator::from_term("X0 X1", 0.1).unwrap()
            + QubitOperator::from_term("Z0", 0.2).unwrap();
        let text = op.to_string();
        assert_eq!(text, "0.1 [X0 X1] +\n0.2 [Z0]");
        let parsed: QubitOperator = text.parse().unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn test_qubit_terms_are_canonical() {
        // X0 Y0 = i Z0, and factor order by qubit
        let op = QubitOperator::from_term("Y1 X0 Y0", 1.0).unwrap();
        let (term, c) = op.terms().next().unwrap();
        assert_eq!(term, &vec![(0, Pauli::Z), (1, Pauli::Y)]);
        assert_eq!(*c, Complex64::new(0.0, 1.0));

        let product = QubitOperator::from_term("X0", 1.0).unwrap()
            * QubitOperator::from_term("X0", 2.0).unwrap();
        assert_eq!(product, QubitOperator::identity(2.0));
    }

    #[test]
    fn test_parse_coefficients() {
        assert_eq!(parse_coeff("0.5").unwrap(), Complex64::new(0.5, 0.0));
        assert_eq!(parse_coeff("(0.5+0.25j)").unwrap(), Complex64::new(0.5, 0.25));
        assert_eq!(parse_coeff("(1e-3-2e-2j)").unwrap(), Complex64::new(1e-3, -2e-2));
        assert_eq!(parse_coeff("-1.5j").unwrap(), Complex64::new(0.0, -1.5));
        assert_eq!(parse_coeff("").unwrap(), Complex64::new(1.0, 0.0));
        assert!(parse_coeff("abc").is_err());

        let op: QubitOperator = "-0.5 [] +\n(0+1j) [Y2]".parse().unwrap();
        assert_eq!(op.len(), 2);
        assert!("0.5 [X0".parse::<QubitOperator>().is_err());
        assert!("0.5 [Q0]".parse::<QubitOperator>().is_err());
    }

    #[test]
    fn test_fermion_operator() {
        let op = FermionOperator::from_term("0^ 2", 0.5).unwrap()
            + FermionOperator::from_term("0 2^", 1.0).unwrap();
        let text = op.to_string();
        let parsed: FermionOperator = text.parse().unwrap();
        assert_eq!(parsed, op);
        assert_eq!(op.len(), 2);
        assert!(text.contains("0.5 [0^ 2]"));
        assert!(text.contains("1 [0 2^]"));
        assert!(FermionOperator::from_term("a^", 1.0).is_err());

        let sq = &op * &FermionOperator::identity(2.0);
        assert_eq!(sq, op.clone() * 2.0);
    }
}
