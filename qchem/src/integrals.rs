//! Molecular-orbital integrals.
//!
//! AO → MO transforms, the chemists' → physicists' index swap and frozen-core
//! active spaces. Two-electron tensors are `ndarray::Array4`; in chemists'
//! notation `chem[p,q,r,s] = (pq|rs)`, in physicists' notation
//! `phys[p,q,r,s] = chem[p,s,r,q]`.

use crate::error::{QchemError, Result};
use crate::solver::RhfSolver;
use nalgebra::DMatrix;
use ndarray::Array4;
use rayon::prelude::*;

/// `C^T h C`.
pub fn mo_one(c: &DMatrix<f64>, h_ao: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if h_ao.nrows() != c.nrows() || h_ao.ncols() != c.nrows() {
        return Err(QchemError::Dimension(format!(
            "{}x{} one-electron matrix with {} AO coefficients",
            h_ao.nrows(),
            h_ao.ncols(),
            c.nrows()
        )));
    }
    Ok(c.transpose() * h_ao * c)
}

/// Contracts the first index with `C` and moves the new MO index last:
/// `out[b,c,d,p] = Σ_a C[a,p] t[a,b,c,d]`.
fn quarter_transform(t: &Array4<f64>, c: &DMatrix<f64>) -> Array4<f64> {
    let (n, b, cc, d) = t.dim();
    let m = c.ncols();

    let slabs: Vec<Vec<f64>> = (0..m)
        .into_par_iter()
        .map(|p| {
            let mut slab = vec![0.0; b * cc * d];
            for a in 0..n {
                let c_ap = c[(a, p)];
                if c_ap == 0.0 {
                    continue;
                }
                for (idx, val) in t.index_axis(ndarray::Axis(0), a).iter().enumerate() {
                    slab[idx] += c_ap * val;
                }
            }
            slab
        })
        .collect();

    let mut out = Array4::zeros((b, cc, d, m));
    for (p, slab) in slabs.iter().enumerate() {
        for j in 0..b {
            for k in 0..cc {
                for l in 0..d {
                    out[[j, k, l, p]] = slab[(j * cc + k) * d + l];
                }
            }
        }
    }
    out
}

/// Full four-index transform `(pq|rs) = Σ C_μp C_νq C_λr C_σs (μν|λσ)`,
/// done as four quarter transforms.
pub fn ao2mo_full(eri_ao: &Array4<f64>, c: &DMatrix<f64>) -> Result<Array4<f64>> {
    let n = c.nrows();
    if eri_ao.dim() != (n, n, n, n) {
        return Err(QchemError::Dimension(format!(
            "AO tensor of shape {:?} with {} AO coefficients",
            eri_ao.dim(),
            n
        )));
    }
    let mut t = eri_ao.clone();
    for _ in 0..4 {
        t = quarter_transform(&t, c);
    }
    Ok(t)
}

/// Swap axes 1 and 3 (chemists' → physicists' notation).
pub fn chemist_to_physicist(two: &Array4<f64>) -> Array4<f64> {
    let mut view = two.view();
    view.swap_axes(1, 3);
    view.as_standard_layout().into_owned()
}

/// Nuclear repulsion (as a one-element array), MO one-electron integrals and
/// MO two-electron integrals in physicists' notation.
pub fn electron_integrals(solver: &RhfSolver) -> Result<([f64; 1], DMatrix<f64>, Array4<f64>)> {
    solver.require_converged()?;
    let c = solver.mo_coeff();
    let h_ao = solver.intor_kinetic() + solver.intor_nuclear();
    let one = mo_one(c, &h_ao)?;
    let two = chemist_to_physicist(&ao2mo_full(&solver.intor_eri(), c)?);
    Ok(([solver.energy_nuc()], one, two))
}

/// Splits the spatial orbitals into doubly occupied core orbitals and active
/// orbitals.
///
/// Without `active_electrons` every electron is active; without
/// `active_orbitals` every non-core orbital is active.
pub fn active_space(
    electrons: usize,
    orbitals: usize,
    mult: usize,
    active_electrons: Option<usize>,
    active_orbitals: Option<usize>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let active_electrons = match active_electrons {
        None => electrons,
        Some(0) => {
            return Err(QchemError::InvalidActiveSpace(
                "the number of active electrons must be positive".to_string(),
            ))
        }
        Some(n) if n > electrons => {
            return Err(QchemError::InvalidActiveSpace(format!(
                "{} active electrons exceed the total of {}",
                n, electrons
            )))
        }
        Some(n) if (electrons - n) % 2 != 0 => {
            return Err(QchemError::InvalidActiveSpace(format!(
                "{} inactive electrons cannot fill doubly occupied core orbitals",
                electrons - n
            )))
        }
        Some(n) => n,
    };
    let ncore = (electrons - active_electrons) / 2;
    if ncore > orbitals {
        return Err(QchemError::InvalidActiveSpace(format!(
            "{} core orbitals exceed the {} available orbitals",
            ncore, orbitals
        )));
    }

    let active_orbitals = match active_orbitals {
        None => orbitals - ncore,
        Some(0) => {
            return Err(QchemError::InvalidActiveSpace(
                "the number of active orbitals must be positive".to_string(),
            ))
        }
        Some(n) if ncore + n > orbitals => {
            return Err(QchemError::InvalidActiveSpace(format!(
                "{} core plus {} active orbitals exceed the {} available orbitals",
                ncore, n, orbitals
            )))
        }
        Some(n) => n,
    };

    if active_electrons > 2 * active_orbitals {
        return Err(QchemError::InvalidActiveSpace(format!(
            "{} active electrons do not fit into {} active orbitals",
            active_electrons, active_orbitals
        )));
    }
    let unpaired = mult.saturating_sub(1);
    if unpaired > active_electrons || unpaired > 2 * active_orbitals - active_electrons {
        return Err(QchemError::InvalidActiveSpace(format!(
            "multiplicity {} cannot be realised with {} electrons in {} orbitals",
            mult, active_electrons, active_orbitals
        )));
    }

    let core = (0..ncore).collect();
    let active = (ncore..ncore + active_orbitals).collect();
    Ok((core, active))
}

/// Folds the doubly occupied `core` orbitals into the constant and the
/// one-body term and restricts everything to `active`. `two` is in
/// physicists' notation.
pub fn reduce_to_active_space(
    core_constant: f64,
    one: &DMatrix<f64>,
    two: &Array4<f64>,
    core: &[usize],
    active: &[usize],
) -> (f64, DMatrix<f64>, Array4<f64>) {
    let mut constant = core_constant;
    for &a in core {
        constant += 2.0 * one[(a, a)];
        for &b in core {
            constant += 2.0 * two[[a, b, b, a]] - two[[a, b, a, b]];
        }
    }

    let na = active.len();
    let one_active = DMatrix::from_fn(na, na, |i, j| {
        let (p, q) = (active[i], active[j]);
        one[(p, q)]
            + core
                .iter()
                .map(|&a| 2.0 * two[[a, p, q, a]] - two[[a, p, a, q]])
                .sum::<f64>()
    });

    let two_active = Array4::from_shape_fn((na, na, na, na), |(i, j, k, l)| {
        two[[active[i], active[j], active[k], active[l]]]
    });

    (constant, one_active, two_active)
}

/// Integrals over interleaved spin orbitals (`2p` α, `2p + 1` β) of a
/// closed-shell reference; the occupied spin orbitals are `0..num_occ`.
#[derive(Debug, Clone)]
pub struct SpinOrbitalIntegrals {
    pub num_occ: usize,
    pub e_nuc: f64,
    pub e_hf: f64,
    pub h: DMatrix<f64>,
    /// Antisymmetrised `<pq||rs>`.
    pub g: Array4<f64>,
    /// `f_pq = h_pq + Σ_i <pi||qi>`.
    pub fock: DMatrix<f64>,
}

impl SpinOrbitalIntegrals {
    pub fn nso(&self) -> usize {
        self.h.nrows()
    }

    pub fn num_virt(&self) -> usize {
        self.nso() - self.num_occ
    }
}

pub fn spin_orbital_integrals(solver: &RhfSolver) -> Result<SpinOrbitalIntegrals> {
    solver.require_converged()?;
    let c = solver.mo_coeff();
    let h_ao = solver.intor_kinetic() + solver.intor_nuclear();
    let one = mo_one(c, &h_ao)?;
    let chem = ao2mo_full(&solver.intor_eri(), c)?;
    let nso = 2 * one.nrows();

    let h = DMatrix::from_fn(nso, nso, |p, q| {
        if p % 2 == q % 2 {
            one[(p / 2, q / 2)]
        } else {
            0.0
        }
    });
    // <pq|rs> = (pr|qs) with matching spins
    let coulomb = |p: usize, q: usize, r: usize, s: usize| {
        if p % 2 == r % 2 && q % 2 == s % 2 {
            chem[[p / 2, r / 2, q / 2, s / 2]]
        } else {
            0.0
        }
    };
    let g = Array4::from_shape_fn((nso, nso, nso, nso), |(p, q, r, s)| {
        coulomb(p, q, r, s) - coulomb(p, q, s, r)
    });

    let num_occ = solver.nelec();
    let fock = DMatrix::from_fn(nso, nso, |p, q| {
        h[(p, q)] + (0..num_occ).map(|i| g[[p, i, q, i]]).sum::<f64>()
    });

    Ok(SpinOrbitalIntegrals {
        num_occ,
        e_nuc: solver.energy_nuc(),
        e_hf: solver.e_tot()?,
        h,
        g,
        fock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::NwchemBasisLoader;
    use crate::molecule::{Molecule, Unit};

    fn h2_solver() -> RhfSolver {
        let mol = Molecule::new(&["H", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]], Unit::Bohr).unwrap();
        RhfSolver::new(&mol, NwchemBasisLoader::offline()).unwrap().run().unwrap()
    }

    #[test]
    fn test_physicist_tensor_is_axis_swap() {
        let chem = Array4::from_shape_fn((3, 3, 3, 3), |(p, q, r, s)| {
            (p * 27 + q * 9 + r * 3 + s) as f64
        });
        let phys = chemist_to_physicist(&chem);
        for ((p, q, r, s), v) in phys.indexed_iter() {
            assert_eq!(*v, chem[[p, s, r, q]]);
        }
    }

    #[test]
    fn test_ao2mo_with_identity_is_noop() {
        let eri = Array4::from_shape_fn((2, 2, 2, 2), |(p, q, r, s)| {
            1.0 + (p + 2 * q + 3 * r + 5 * s) as f64
        });
        let c = DMatrix::<f64>::identity(2, 2);
        let mo = ao2mo_full(&eri, &c).unwrap();
        assert_eq!(mo, eri);
        assert!(ao2mo_full(&eri, &DMatrix::identity(3, 3)).is_err());
    }

    #[test]
    fn test_ao2mo_matches_brute_force() {
        let n = 3;
        let eri = Array4::from_shape_fn((n, n, n, n), |(p, q, r, s)| {
            ((p + 1) * (q + 2)) as f64 * 0.1 + ((r + 1) * (s + 3)) as f64 * 0.01
        });
        let c = DMatrix::from_row_slice(n, 2, &[0.5, -0.2, 0.3, 0.9, -0.7, 0.1]);
        let mo = ao2mo_full(&eri, &c).unwrap();
        let (i, j, k, l) = (1, 0, 1, 1);
        let mut expected = 0.0;
        for a in 0..n {
            for b in 0..n {
                for cc in 0..n {
                    for d in 0..n {
                        expected += c[(a, i)] * c[(b, j)] * c[(cc, k)] * c[(d, l)] * eri[[a, b, cc, d]];
                    }
                }
            }
        }
        assert!((mo[[i, j, k, l]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_h2_electron_integrals() {
        let rhf = h2_solver();
        let (core, one, two) = electron_integrals(&rhf).unwrap();
        assert!((core[0] - 1.0 / 1.4).abs() < 1e-12);
        assert_eq!(one.shape(), (2, 2));
        assert_eq!(two.dim(), (2, 2, 2, 2));
        // σg/σu do not mix by symmetry
        assert!(one[(0, 1)].abs() < 1e-10);

        // E_HF = E_nuc + 2 h_00 + (00|00)
        let e_hf = core[0] + 2.0 * one[(0, 0)] + two[[0, 0, 0, 0]];
        assert!((e_hf - rhf.e_tot().unwrap()).abs() < 1e-8);

        // real orbitals: (pq|rs) = (qp|rs) = (rs|pq)
        let chem = ao2mo_full(&rhf.intor_eri(), rhf.mo_coeff()).unwrap();
        assert!((chem[[0, 1, 0, 1]] - chem[[1, 0, 0, 1]]).abs() < 1e-12);
        assert!((chem[[0, 0, 1, 1]] - chem[[1, 1, 0, 0]]).abs() < 1e-12);
    }

    #[test]
    fn test_electron_integrals_need_converged_solver() {
        let mol = Molecule::new(&["H", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]], Unit::Bohr).unwrap();
        let rhf = RhfSolver::new(&mol, NwchemBasisLoader::offline()).unwrap();
        assert!(matches!(electron_integrals(&rhf), Err(QchemError::NotSolved(_))));
    }

    #[test]
    fn test_spin_orbital_fock_is_diagonal() {
        let rhf = h2_solver();
        let so = spin_orbital_integrals(&rhf).unwrap();
        assert_eq!(so.nso(), 4);
        assert_eq!(so.num_occ, 2);
        for p in 0..4 {
            for q in 0..4 {
                let expected = if p == q { rhf.mo_energy()[p / 2] } else { 0.0 };
                assert!((so.fock[(p, q)] - expected).abs() < 1e-8);
            }
        }
        // antisymmetry
        assert!((so.g[[0, 1, 2, 3]] + so.g[[1, 0, 2, 3]]).abs() < 1e-14);
        assert!((so.g[[0, 1, 2, 3]] + so.g[[0, 1, 3, 2]]).abs() < 1e-14);

        let e = so.e_nuc
            + (0..2).map(|i| so.h[(i, i)]).sum::<f64>()
            + 0.5 * (0..2).flat_map(|i| (0..2).map(move |j| (i, j))).map(|(i, j)| so.g[[i, j, i, j]]).sum::<f64>();
        assert!((e - so.e_hf).abs() < 1e-8);
    }

    #[test]
    fn test_active_space_selection() {
        let (core, active) = active_space(10, 7, 1, None, None).unwrap();
        assert!(core.is_empty());
        assert_eq!(active, (0..7).collect::<Vec<_>>());

        let (core, active) = active_space(10, 7, 1, Some(4), Some(3)).unwrap();
        assert_eq!(core, vec![0, 1, 2]);
        assert_eq!(active, vec![3, 4, 5]);

        assert!(active_space(10, 7, 1, Some(0), None).is_err());
        assert!(active_space(10, 7, 1, Some(12), None).is_err());
        assert!(active_space(10, 7, 1, Some(3), None).is_err());
        assert!(active_space(10, 7, 1, Some(4), Some(5)).is_err());
        assert!(active_space(10, 7, 1, Some(4), Some(0)).is_err());
        assert!(active_space(10, 7, 1, Some(6), Some(2)).is_err());
        assert!(active_space(2, 2, 5, None, None).is_err());
    }

    #[test]
    fn test_active_space_keeps_hf_energy() {
        let mol = Molecule::new(&["Li", "H"], &[[0.0, 0.0, 0.0], [0.0, 0.0, 3.0]], Unit::Bohr).unwrap();
        let rhf = RhfSolver::new(&mol, NwchemBasisLoader::offline()).unwrap().run().unwrap();
        let (c, one, two) = electron_integrals(&rhf).unwrap();
        let (core, active) = active_space(4, 6, 1, Some(2), Some(3)).unwrap();
        let (constant, one_a, two_a) = reduce_to_active_space(c[0], &one, &two, &core, &active);
        assert_eq!(one_a.shape(), (3, 3));
        assert_eq!(two_a.dim(), (3, 3, 3, 3));

        // HF energy from the active space: orbital 1 doubly occupied in the active window
        let e = constant + 2.0 * one_a[(0, 0)] + two_a[[0, 0, 0, 0]];
        assert!((e - rhf.e_tot().unwrap()).abs() < 1e-8, "{} vs {}", e, rhf.e_tot().unwrap());
    }
}
