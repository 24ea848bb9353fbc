//! Solver object around the restricted Hartree-Fock implementation.
//!
//! Holds the molecule, the AO integrals and, after [`RhfSolver::kernel`], the
//! converged orbitals. Everything downstream (MO integrals, CCSD, CISD,
//! state import) starts from one of these.

use crate::error::{QchemError, Result};
use crate::io::{BasisLoader, BasisRegistry};
use crate::molecule::Molecule;
use crate::scf_impl::{SimpleSCF, SCF};
use basis::cgto::BasisSet;
use nalgebra::{DMatrix, DVector};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScfSettings {
    pub density_mixing: f64,
    pub max_cycle: usize,
    /// 0 disables DIIS.
    pub diis_subspace_size: usize,
    pub convergence_threshold: f64,
}

impl Default for ScfSettings {
    fn default() -> Self {
        ScfSettings {
            density_mixing: 1.0,
            max_cycle: 100,
            diis_subspace_size: 8,
            convergence_threshold: 1e-10,
        }
    }
}

pub struct RhfSolver {
    molecule: Molecule,
    scf: SimpleSCF<BasisSet>,
    e_tot: Option<f64>,
}

impl RhfSolver {
    pub fn new(molecule: &Molecule, loader: impl BasisLoader) -> Result<Self> {
        Self::with_settings(molecule, loader, ScfSettings::default())
    }

    pub fn with_settings(
        molecule: &Molecule,
        loader: impl BasisLoader,
        settings: ScfSettings,
    ) -> Result<Self> {
        if molecule.multiplicity != 1 || molecule.num_electrons() % 2 != 0 {
            return Err(QchemError::InvalidMolecule(format!(
                "restricted Hartree-Fock needs a closed-shell singlet, got {} electrons with multiplicity {}",
                molecule.num_electrons(),
                molecule.multiplicity
            )));
        }

        let mut registry = BasisRegistry::new(loader);
        let basis_map = registry.load_for_elements(&molecule.basis_name, &molecule.symbols)?;
        let elems = molecule.elements();
        if elems.len() != molecule.num_atoms() {
            return Err(QchemError::InvalidMolecule("unresolved element symbol".to_string()));
        }

        let mut scf = SimpleSCF::<BasisSet>::new();
        scf.density_mixing = settings.density_mixing;
        scf.max_cycle = settings.max_cycle;
        scf.set_convergence_threshold(settings.convergence_threshold);
        if settings.diis_subspace_size > 0 {
            scf.enable_diis(settings.diis_subspace_size);
        }
        scf.set_charge(molecule.charge);

        scf.init_basis(&elems, &basis_map)?;
        scf.init_geometry(&molecule.coordinates, &elems);
        scf.init_density_matrix();

        if molecule.num_electrons() / 2 > scf.num_basis {
            return Err(QchemError::InvalidMolecule(format!(
                "{} electrons do not fit into {} spatial orbitals",
                molecule.num_electrons(),
                scf.num_basis
            )));
        }

        Ok(RhfSolver {
            molecule: molecule.clone(),
            scf,
            e_tot: None,
        })
    }

    /// Runs the SCF iterations and returns the total energy.
    pub fn kernel(&mut self) -> Result<f64> {
        info!("===========================================");
        info!("     RHF ({} basis functions, {} electrons)", self.nao(), self.nelec());
        info!("===========================================");
        self.scf.init_fock_matrix();
        self.scf.scf_cycle()?;
        let energy = self.scf.calculate_total_energy();
        info!("converged SCF energy = {:.12}", energy);
        self.e_tot = Some(energy);
        Ok(energy)
    }

    /// Builder-style `kernel`.
    pub fn run(mut self) -> Result<Self> {
        self.kernel()?;
        Ok(self)
    }

    pub fn converged(&self) -> bool {
        self.e_tot.is_some() && self.scf.converged
    }

    pub fn e_tot(&self) -> Result<f64> {
        self.e_tot
            .ok_or_else(|| QchemError::NotSolved("call kernel() before reading the energy".to_string()))
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    /// MO coefficients, one orbital per column.
    pub fn mo_coeff(&self) -> &DMatrix<f64> {
        &self.scf.coeffs
    }

    pub fn mo_energy(&self) -> &DVector<f64> {
        &self.scf.e_level
    }

    pub fn mo_occ(&self) -> Vec<f64> {
        (0..self.nao())
            .map(|p| if p < self.nocc() { 2.0 } else { 0.0 })
            .collect()
    }

    pub fn energy_nuc(&self) -> f64 {
        self.scf.nuclear_repulsion()
    }

    pub fn nao(&self) -> usize {
        self.scf.num_basis
    }

    pub fn nelec(&self) -> usize {
        self.scf.num_electrons()
    }

    pub fn nocc(&self) -> usize {
        self.scf.num_occupied()
    }

    pub fn intor_overlap(&self) -> DMatrix<f64> {
        self.scf.overlap_matrix.clone()
    }

    pub fn intor_kinetic(&self) -> DMatrix<f64> {
        self.scf.kinetic_matrix.clone()
    }

    pub fn intor_nuclear(&self) -> DMatrix<f64> {
        self.scf.nuclear_matrix.clone()
    }

    /// AO two-electron integrals (μν|λσ), chemists' notation.
    pub fn intor_eri(&self) -> Array4<f64> {
        self.scf.eri.clone()
    }

    pub(crate) fn require_converged(&self) -> Result<()> {
        if self.converged() {
            Ok(())
        } else {
            Err(QchemError::NotSolved(
                "the Hartree-Fock solver has not converged; call kernel() first".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NwchemBasisLoader;
    use crate::molecule::Unit;

    fn h2() -> Molecule {
        Molecule::new(&["H", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]], Unit::Bohr).unwrap()
    }

    #[test]
    fn test_kernel_h2() {
        let mut rhf = RhfSolver::new(&h2(), NwchemBasisLoader::offline()).unwrap();
        assert!(rhf.e_tot().is_err());
        assert!(rhf.require_converged().is_err());
        let e = rhf.kernel().unwrap();
        assert!((e + 1.1167143502770278).abs() < 1e-6);
        assert!(rhf.converged());
        assert_eq!(rhf.nao(), 2);
        assert_eq!(rhf.nocc(), 1);
        assert_eq!(rhf.mo_occ(), vec![2.0, 0.0]);
        assert!((rhf.energy_nuc() - 1.0 / 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_open_shell_is_rejected() {
        let mol = h2().with_charge(1).and_then(|m| m.with_multiplicity(2));
        // an H2+ cation cannot be built as a singlet, and RHF rejects doublets
        assert!(mol.is_err());
        let h = Molecule::new(&["H"], &[[0.0; 3]], Unit::Bohr).unwrap_err();
        assert!(matches!(h, QchemError::InvalidMolecule(_)));
        let triplet = h2().with_multiplicity(3).unwrap();
        assert!(RhfSolver::new(&triplet, NwchemBasisLoader::offline()).is_err());
    }

    #[test]
    fn test_intor_matrices() {
        let rhf = RhfSolver::new(&h2(), NwchemBasisLoader::offline()).unwrap();
        let s = rhf.intor_overlap();
        assert!((s[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((s[(0, 1)] - 0.6593).abs() < 1e-4);
        let t = rhf.intor_kinetic();
        assert!((t[(0, 0)] - 0.7600).abs() < 1e-4);
        let v = rhf.intor_nuclear();
        assert!((v[(0, 0)] + 1.2266 + 0.6538).abs() < 1e-4);
        let eri = rhf.intor_eri();
        assert!((eri[[0, 0, 1, 1]] - 0.5697).abs() < 1e-4);
    }
}
