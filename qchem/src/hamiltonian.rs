//! Molecular qubit Hamiltonians.
//!
//! Runs RHF on the molecule, builds MO integrals (optionally in an active
//! space), assembles the fermionic Hamiltonian and encodes it on qubits.

use crate::error::{QchemError, Result};
use crate::fermion::{fermionic_observable, FermiSentence, DEFAULT_CUTOFF};
use crate::integrals::{
    active_space, ao2mo_full, chemist_to_physicist, electron_integrals, mo_one,
    reduce_to_active_space,
};
use crate::io::BasisLoader;
use crate::mapping::Mapping;
use crate::molecule::Molecule;
use crate::qubit::PauliSentence;
use crate::solver::RhfSolver;
use nalgebra::DMatrix;
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Source of the molecular integrals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Integrals taken straight from the solved RHF object.
    #[default]
    Dhf,
    /// AO integrals pulled from the solver and transformed explicitly.
    Pyscf,
}

impl FromStr for Method {
    type Err = QchemError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dhf" => Ok(Method::Dhf),
            "pyscf" => Ok(Method::Pyscf),
            _ => Err(QchemError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Dhf => write!(f, "dhf"),
            Method::Pyscf => write!(f, "pyscf"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianOptions {
    pub method: Method,
    pub active_electrons: Option<usize>,
    pub active_orbitals: Option<usize>,
    pub mapping: Mapping,
    pub cutoff: f64,
}

impl Default for HamiltonianOptions {
    fn default() -> Self {
        HamiltonianOptions {
            method: Method::Dhf,
            active_electrons: None,
            active_orbitals: None,
            mapping: Mapping::JordanWigner,
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

/// Integrals over the full MO space in physicists' notation.
fn solver_integrals(
    solver: &RhfSolver,
    method: Method,
) -> Result<(f64, DMatrix<f64>, Array4<f64>)> {
    match method {
        Method::Dhf => {
            let (core, one, two) = electron_integrals(solver)?;
            Ok((core[0], one, two))
        }
        Method::Pyscf => {
            solver.require_converged()?;
            let c = solver.mo_coeff();
            let h_ao = solver.intor_kinetic() + solver.intor_nuclear();
            let one = mo_one(c, &h_ao)?;
            let eri = ao2mo_full(&solver.intor_eri(), c)?;
            Ok((solver.energy_nuc(), one, chemist_to_physicist(&eri)))
        }
    }
}

/// Fermionic Hamiltonian and its number of spin orbitals.
pub fn fermionic_hamiltonian(
    molecule: &Molecule,
    options: &HamiltonianOptions,
    loader: impl BasisLoader,
) -> Result<(FermiSentence, usize)> {
    let solver = RhfSolver::new(molecule, loader)?.run()?;
    let (core_constant, one, two) = solver_integrals(&solver, options.method)?;

    let (core, active) = active_space(
        molecule.num_electrons(),
        solver.nao(),
        molecule.multiplicity,
        options.active_electrons,
        options.active_orbitals,
    )?;
    info!(
        "active space: {} core and {} active spatial orbitals",
        core.len(),
        active.len()
    );
    let (constant, one, two) = reduce_to_active_space(core_constant, &one, &two, &core, &active);

    let h = fermionic_observable(&[constant], &one, &two, options.cutoff);
    Ok((h, 2 * active.len()))
}

/// Qubit Hamiltonian and qubit count (twice the number of active orbitals).
pub fn molecular_hamiltonian(
    molecule: &Molecule,
    options: &HamiltonianOptions,
    loader: impl BasisLoader,
) -> Result<(PauliSentence, usize)> {
    let (fermionic, n_qubits) = fermionic_hamiltonian(molecule, options, loader)?;
    info!(
        "mapping {} fermionic terms onto {} qubits ({})",
        fermionic.len(),
        n_qubits,
        options.mapping
    );
    let qubit = options.mapping.apply(&fermionic, n_qubits, options.cutoff)?;
    info!("qubit Hamiltonian has {} terms", qubit.len());
    Ok((qubit, n_qubits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NwchemBasisLoader;
    use crate::molecule::Unit;
    use crate::qubit::PauliWord;
    use num_complex::Complex64;

    fn h2() -> Molecule {
        Molecule::new(&["H", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]], Unit::Bohr).unwrap()
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("PySCF".parse::<Method>().unwrap(), Method::Pyscf);
        assert_eq!("dhf".parse::<Method>().unwrap(), Method::Dhf);
        assert!(matches!(
            "openfermion".parse::<Method>(),
            Err(QchemError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_h2_hamiltonian() {
        let (h, qubits) =
            molecular_hamiltonian(&h2(), &HamiltonianOptions::default(), NwchemBasisLoader::offline())
                .unwrap();
        assert_eq!(qubits, 4);
        assert_eq!(h.num_wires(), 4);

        // <1100|H|1100> is the HF energy
        let mut hf = vec![Complex64::new(0.0, 0.0); 16];
        hf[0b1100] = Complex64::new(1.0, 0.0);
        let e = h.expectation(&hf).unwrap();
        assert!((e.re + 1.1167143502770278).abs() < 1e-6);

        // all coefficients are real
        assert!(h.terms().all(|(_, c)| c.im == 0.0));
        assert!(h.get(&PauliWord::identity()).is_some());
    }

    #[test]
    fn test_active_space_shrinks_register() {
        let mol = Molecule::new(&["Li", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 3.0]], Unit::Bohr).unwrap();
        let options = HamiltonianOptions {
            active_electrons: Some(2),
            active_orbitals: Some(2),
            ..Default::default()
        };
        let (h, qubits) = molecular_hamiltonian(&mol, &options, NwchemBasisLoader::offline()).unwrap();
        assert_eq!(qubits, 4);
        assert!(h.num_wires() <= 4);

        let bad = HamiltonianOptions {
            active_electrons: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            molecular_hamiltonian(&mol, &bad, NwchemBasisLoader::offline()),
            Err(QchemError::InvalidActiveSpace(_))
        ));
    }
}
