//! Configuration Interaction (CI)
//!
//! CISD: the ground state as a linear combination of the reference
//! determinant and its singly and doubly excited determinants.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qchem::{CI, RhfSolver};
//!
//! let mut ci = CI::from_rhf(&rhf)?;
//! let correlation_energy = ci.solve()?;
//! ```

mod ci;

pub use ci::CI;
