//! Fermion-to-qubit encodings.

use crate::error::{QchemError, Result};
use crate::fermion::{FermiSentence, Op};
use crate::qubit::{Pauli, PauliSentence, PauliWord};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapping {
    #[default]
    JordanWigner,
    Parity,
}

impl Mapping {
    /// Encodes `op` on `n_qubits` qubits.
    pub fn apply(self, op: &FermiSentence, n_qubits: usize, tol: f64) -> Result<PauliSentence> {
        match self {
            Mapping::JordanWigner => {
                if op.num_orbitals() > n_qubits {
                    return Err(QchemError::Dimension(format!(
                        "operator acts on {} spin orbitals, only {} qubits available",
                        op.num_orbitals(),
                        n_qubits
                    )));
                }
                Ok(jordan_wigner(op, tol))
            }
            Mapping::Parity => parity_transform(op, n_qubits, tol),
        }
    }
}

impl FromStr for Mapping {
    type Err = QchemError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "jordan_wigner" | "jw" => Ok(Mapping::JordanWigner),
            "parity" => Ok(Mapping::Parity),
            _ => Err(QchemError::UnsupportedMapping(s.to_string())),
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::JordanWigner => write!(f, "jordan_wigner"),
            Mapping::Parity => write!(f, "parity"),
        }
    }
}

/// Multiplies out the images of every word, with the image of each ladder
/// operator computed once.
fn encode(
    op: &FermiSentence,
    tol: f64,
    mut ladder: impl FnMut(usize, Op) -> PauliSentence,
) -> PauliSentence {
    let mut cache: HashMap<(usize, Op), PauliSentence> = HashMap::new();
    let mut out = PauliSentence::new();

    for (word, coeff) in op.terms() {
        let mut image = PauliSentence::identity(*coeff);
        for &(orbital, kind) in word.ops() {
            let factor = &*cache
                .entry((orbital, kind))
                .or_insert_with(|| ladder(orbital, kind));
            image = &image * factor;
        }
        out += &image;
    }

    out.chop_imaginary(tol);
    out
}

fn ladder_image(kind: Op, real: PauliWord, imag: PauliWord) -> PauliSentence {
    let sign = match kind {
        Op::Create => -1.0,
        Op::Annihilate => 1.0,
    };
    let mut s = PauliSentence::from_term(real, 0.5);
    s.add_term(imag, Complex64::new(0.0, 0.5 * sign));
    s
}

/// `a†_j = ½ Z_0…Z_(j-1) (X_j − iY_j)`.
pub fn jordan_wigner(op: &FermiSentence, tol: f64) -> PauliSentence {
    encode(op, tol, |j, kind| {
        let z_string = (0..j).map(|k| (k, Pauli::Z));
        let x = PauliWord::new(z_string.clone().chain([(j, Pauli::X)]));
        let y = PauliWord::new(z_string.chain([(j, Pauli::Y)]));
        ladder_image(kind, x, y)
    })
}

/// Qubit `j` stores the parity of spin orbitals `0..=j`:
/// `a†_j = ½ Z_(j-1) X_j X_(j+1)… − (i/2) Y_j X_(j+1)…`.
pub fn parity_transform(op: &FermiSentence, n_qubits: usize, tol: f64) -> Result<PauliSentence> {
    if op.num_orbitals() > n_qubits {
        return Err(QchemError::Dimension(format!(
            "operator acts on {} spin orbitals, only {} qubits available",
            op.num_orbitals(),
            n_qubits
        )));
    }
    Ok(encode(op, tol, |j, kind| {
        let x_string = (j + 1..n_qubits).map(|k| (k, Pauli::X));
        let previous = j.checked_sub(1).map(|k| (k, Pauli::Z));
        let real = PauliWord::new(previous.into_iter().chain([(j, Pauli::X)]).chain(x_string.clone()));
        let imag = PauliWord::new([(j, Pauli::Y)].into_iter().chain(x_string));
        ladder_image(kind, real, imag)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fermion::FermiWord;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_mapping_from_str() {
        assert_eq!("jordan_wigner".parse::<Mapping>().unwrap(), Mapping::JordanWigner);
        assert_eq!("Jordan-Wigner".parse::<Mapping>().unwrap(), Mapping::JordanWigner);
        assert_eq!("parity".parse::<Mapping>().unwrap(), Mapping::Parity);
        assert!(matches!(
            "bravyi_kitaev".parse::<Mapping>(),
            Err(QchemError::UnsupportedMapping(_))
        ));
    }

    #[test]
    fn test_jw_number_operator() {
        // a†_1 a_1 = (I - Z_1) / 2
        let n1 = FermiSentence::from(FermiWord::new(vec![(1, Op::Create), (1, Op::Annihilate)]));
        let q = jordan_wigner(&n1, 1e-12);
        assert_eq!(q.len(), 2);
        assert_eq!(q.get(&PauliWord::identity()), Some(c(0.5, 0.0)));
        assert_eq!(q.get(&PauliWord::single(1, Pauli::Z)), Some(c(-0.5, 0.0)));
    }

    #[test]
    fn test_jw_hopping_term() {
        // a†_0 a_2 + a†_2 a_0 = ½ (X0 Z1 X2 + Y0 Z1 Y2)
        let hop = FermiSentence::from(FermiWord::new(vec![(0, Op::Create), (2, Op::Annihilate)]));
        let herm = &hop + &hop.adjoint();
        let q = jordan_wigner(&herm, 1e-12);
        assert_eq!(q.len(), 2);
        let xzx = PauliWord::new([(0, Pauli::X), (1, Pauli::Z), (2, Pauli::X)]);
        let yzy = PauliWord::new([(0, Pauli::Y), (1, Pauli::Z), (2, Pauli::Y)]);
        assert_eq!(q.get(&xzx), Some(c(0.5, 0.0)));
        assert_eq!(q.get(&yzy), Some(c(0.5, 0.0)));
    }

    #[test]
    fn test_jw_anticommutation() {
        let a0 = FermiSentence::from(FermiWord::annihilate(0));
        let a0_dag = FermiSentence::from(FermiWord::create(0));
        let a1 = FermiSentence::from(FermiWord::annihilate(1));
        let anti = &(&a0 * &a0_dag) + &(&a0_dag * &a0);
        let q = jordan_wigner(&anti, 1e-12);
        assert_eq!(q, PauliSentence::identity(1.0));

        let cross = &(&a0 * &a1) + &(&a1 * &a0);
        assert!(jordan_wigner(&cross, 1e-12).is_empty());
    }

    #[test]
    fn test_parity_number_operators() {
        // n_0 = (I - Z0)/2 and n_1 = (I - Z0 Z1)/2 in the parity basis
        let n0 = FermiSentence::from(FermiWord::new(vec![(0, Op::Create), (0, Op::Annihilate)]));
        let q0 = parity_transform(&n0, 3, 1e-12).unwrap();
        assert_eq!(q0.get(&PauliWord::single(0, Pauli::Z)), Some(c(-0.5, 0.0)));
        assert_eq!(q0.len(), 2);

        let n1 = FermiSentence::from(FermiWord::new(vec![(1, Op::Create), (1, Op::Annihilate)]));
        let q1 = parity_transform(&n1, 3, 1e-12).unwrap();
        let zz = PauliWord::new([(0, Pauli::Z), (1, Pauli::Z)]);
        assert_eq!(q1.get(&zz), Some(c(-0.5, 0.0)));
        assert_eq!(q1.len(), 2);

        assert!(parity_transform(&n1, 1, 1e-12).is_err());
    }

    #[test]
    fn test_parity_matches_jw_spectrum() {
        let mut op = FermiSentence::from_term(FermiWord::new(vec![(0, Op::Create), (1, Op::Annihilate)]), 0.3);
        op = &op + &op.adjoint();
        op.add_term(FermiWord::new(vec![(1, Op::Create), (1, Op::Annihilate)]), -0.7);
        op.add_term(
            FermiWord::new(vec![(0, Op::Create), (1, Op::Create), (1, Op::Annihilate), (0, Op::Annihilate)]),
            0.4,
        );
        let jw = Mapping::JordanWigner.apply(&op, 2, 1e-12).unwrap().spectrum(2).unwrap();
        let parity = Mapping::Parity.apply(&op, 2, 1e-12).unwrap().spectrum(2).unwrap();
        for (a, b) in jw.iter().zip(&parity) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
