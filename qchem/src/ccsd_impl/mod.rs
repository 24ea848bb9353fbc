//! CCSD (Coupled Cluster Singles and Doubles)
//!
//! Exponential ansatz on the RHF determinant:
//!
//! |Ψ⟩ = exp(T₁ + T₂) |Φ₀⟩
//!
//! with T₁ and T₂ the singles and doubles cluster operators over spin
//! orbitals.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qchem::{CCSD, Molecule, NwchemBasisLoader, RhfSolver};
//!
//! let rhf = RhfSolver::new(&molecule, NwchemBasisLoader::default())?.run()?;
//! let mut ccsd = CCSD::from_rhf(&rhf, 50, 1e-8)?;
//! let correlation_energy = ccsd.solve()?;
//! let total_ccsd_energy = ccsd.e_tot()?;
//! ```

mod ccsd;

pub use ccsd::CCSD;
