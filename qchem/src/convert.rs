//! Conversions between the OpenFermion-style operators and the native
//! fermionic and Pauli algebra.

use crate::error::{QchemError, Result};
use crate::fermion::{FermiSentence, FermiWord, Op};
use crate::openfermion::{FermionOperator, QubitOperator};
use crate::qubit::{PauliSentence, PauliWord};

/// Imports a qubit operator as an observable. Coefficients must be real up to
/// `tol`; the remaining imaginary parts are discarded.
pub fn import_operator(op: &QubitOperator, tol: f64) -> Result<PauliSentence> {
    let mut sentence = PauliSentence::new();
    for (term, c) in op.terms() {
        if c.im.abs() > tol {
            let word = PauliWord::new(term.iter().copied());
            return Err(QchemError::ComplexCoefficient {
                term: word.to_string(),
                imag: c.im,
            });
        }
        sentence.add_term(PauliWord::new(term.iter().copied()), c.re);
    }
    Ok(sentence)
}

/// External → native, keeping complex coefficients.
pub fn from_openfermion<'a, E, N>(op: &'a E) -> N
where
    N: From<&'a E>,
{
    N::from(op)
}

/// Native → external.
pub fn to_openfermion<'a, N, E>(op: &'a N) -> E
where
    E: From<&'a N>,
{
    E::from(op)
}

impl From<&QubitOperator> for PauliSentence {
    fn from(op: &QubitOperator) -> Self {
        let mut sentence = PauliSentence::new();
        for (term, c) in op.terms() {
            sentence.add_term(PauliWord::new(term.iter().copied()), *c);
        }
        sentence
    }
}

impl From<&PauliSentence> for QubitOperator {
    fn from(sentence: &PauliSentence) -> Self {
        let mut op = QubitOperator::new();
        for (word, c) in sentence.terms() {
            op.add_term(word.ops().collect(), *c);
        }
        op
    }
}

impl From<&FermionOperator> for FermiSentence {
    fn from(op: &FermionOperator) -> Self {
        let mut sentence = FermiSentence::new();
        for (term, c) in op.terms() {
            let word = FermiWord::new(
                term.iter()
                    .map(|&(p, create)| (p, if create { Op::Create } else { Op::Annihilate }))
                    .collect(),
            );
            sentence.add_term(word, *c);
        }
        sentence
    }
}

impl From<&FermiSentence> for FermionOperator {
    fn from(sentence: &FermiSentence) -> Self {
        let mut op = FermionOperator::new();
        for (word, c) in sentence.terms() {
            let term = word
                .ops()
                .iter()
                .map(|&(p, kind)| (p, kind == Op::Create))
                .collect();
            op.add_term(term, *c);
        }
        op
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qubit::Pauli;
    use num_complex::Complex64;

    #[test]
    fn test_import_operator() {
        let op: QubitOperator = "0.1 [X0 X1] +\n0.2 [Z0]".parse().unwrap();
        let h = import_operator(&op, 1e-12).unwrap();
        assert_eq!(h.to_string(), "0.1 * X(0) @ X(1)\n+ 0.2 * Z(0)");

        let complex = QubitOperator::from_term("Y0", Complex64::new(0.1, 0.3)).unwrap();
        assert!(matches!(
            import_operator(&complex, 1e-12),
            Err(QchemError::ComplexCoefficient { .. })
        ));
        let nearly_real = QubitOperator::from_term("Y0", Complex64::new(0.1, 1e-14)).unwrap();
        let h = import_operator(&nearly_real, 1e-12).unwrap();
        assert_eq!(h.get(&PauliWord::single(0, Pauli::Y)), Some(Complex64::new(0.1, 0.0)));
    }

    #[test]
    fn test_qubit_round_trip() {
        let op: QubitOperator = "0.1 [X0 X1] +\n(0+0.2j) [Y0 Z3] +\n-0.7 []".parse().unwrap();
        let native: PauliSentence = from_openfermion(&op);
        let back: QubitOperator = to_openfermion(&native);
        assert_eq!(back, op);
    }

    #[test]
    fn test_fermion_round_trip() {
        let op = FermionOperator::from_term("0^ 2", 0.5).unwrap()
            + FermionOperator::from_term("0 2^", 1.0).unwrap();
        let native: FermiSentence = from_openfermion(&op);
        assert_eq!(native.len(), 2);
        assert!(native.to_string().contains("0.5 * a⁺(0) a(2)"));
        assert!(native.to_string().contains("1 * a(0) a⁺(2)"));
        let back: FermionOperator = to_openfermion(&native);
        assert_eq!(back, op);
    }
}
