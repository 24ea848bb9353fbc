//! Gaussian-type orbital basis functions and their molecular integrals.

pub mod basis;
pub mod cgto;
pub mod gto;
pub mod helper;
pub mod library;

#[cfg(test)]
mod gto_test;
