//! Quantum-chemistry front end for qubit algorithms.
//!
//! Restricted Hartree-Fock over contracted Gaussian basis sets, molecular
//! integrals in the MO basis, fermionic and qubit Hamiltonians, correlated
//! (CCSD, CISD) wavefunctions as qubit state vectors, and conversions to and
//! from OpenFermion-style operator text.

pub mod app;
pub mod ccsd_impl;
pub mod ci_impl;
pub mod config;
pub mod convert;
pub mod error;
pub mod fermion;
pub mod hamiltonian;
pub mod integrals;
pub mod io;
pub mod mapping;
pub mod molecule;
pub mod openfermion;
pub mod qubit;
mod scf_impl;
pub mod solver;
pub mod state;

pub use ccsd_impl::CCSD;
pub use ci_impl::CI;
pub use convert::{from_openfermion, import_operator, to_openfermion};
pub use error::{QchemError, Result};
pub use fermion::{fermionic_observable, FermiSentence, FermiWord, Op};
pub use hamiltonian::{fermionic_hamiltonian, molecular_hamiltonian, HamiltonianOptions, Method};
pub use integrals::{active_space, electron_integrals};
pub use io::{BasisLoader, NwchemBasisLoader};
pub use mapping::{jordan_wigner, parity_transform, Mapping};
pub use molecule::{Molecule, Unit};
pub use openfermion::{FermionOperator, QubitOperator};
pub use qubit::{Pauli, PauliSentence, PauliWord};
pub use solver::{RhfSolver, ScfSettings};
pub use state::{import_state, DeterminantExpansion, Wavefunction};
