//! Tests for SCF implementations

use super::{align_eigenvectors, SimpleSCF, DIIS, SCF};
use basis::basis::AOBasis;
use basis::cgto::BasisSet;
use basis::library;
use nalgebra::{DMatrix, Vector3};
use periodic_table_on_an_enum::Element;
use std::collections::HashMap;

fn sto3g_map(symbols: &[&str]) -> HashMap<String, BasisSet> {
    symbols
        .iter()
        .map(|s| {
            let text = library::lookup("sto-3g", s).unwrap();
            (s.to_string(), BasisSet::parse_nwchem("sto-3g", &text).unwrap())
        })
        .collect()
}

fn run_scf(elems: &[Element], coords: &[Vector3<f64>], symbols: &[&str]) -> SimpleSCF<BasisSet> {
    let mut scf = SimpleSCF::<BasisSet>::new();
    scf.density_mixing = 1.0;
    scf.max_cycle = 100;
    scf.set_convergence_threshold(1e-10);
    scf.enable_diis(8);

    scf.init_basis(elems, &sto3g_map(symbols)).unwrap();
    scf.init_geometry(coords, elems);
    scf.init_density_matrix();
    scf.init_fock_matrix();
    scf.scf_cycle().unwrap();
    scf
}

#[test]
fn test_diis_error_vanishes_for_commuting_matrices() {
    let diis = DIIS::new(4);
    let s = DMatrix::<f64>::identity(3, 3);
    let f = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![-1.0, 0.5, 2.0]));
    let d = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![2.0, 0.0, 0.0]));
    let err = diis.calculate_error_matrix(&f, &d, &s);
    assert!(err.norm() < 1e-14);
}

#[test]
fn test_diis_subspace_is_bounded() {
    let mut diis = DIIS::new(3);
    let s = DMatrix::<f64>::identity(2, 2);
    let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.2, 0.5]);
    for k in 0..5 {
        let f = DMatrix::from_row_slice(2, 2, &[k as f64, 1.0, 1.0, -(k as f64)]);
        diis.update(f, &d, &s);
    }
    assert_eq!(diis.size(), 3);
    assert!(diis.last_error().unwrap() > 0.0);
    diis.reset();
    assert_eq!(diis.size(), 0);
    assert!(diis.extrapolate().is_none());
}

#[test]
fn test_diis_single_vector_returns_it() {
    let mut diis = DIIS::new(4);
    let s = DMatrix::<f64>::identity(2, 2);
    let d = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 0.2]);
    let f = DMatrix::from_row_slice(2, 2, &[-0.5, 0.1, 0.1, 0.7]);
    diis.update(f.clone(), &d, &s);
    let extrapolated = diis.extrapolate().unwrap();
    assert!((extrapolated - f).norm() < 1e-12);
}

#[test]
fn test_align_eigenvectors() {
    let m = DMatrix::from_row_slice(2, 2, &[0.1, -0.8, -0.9, 0.6]);
    let aligned = align_eigenvectors(m);
    assert!(aligned[(1, 0)] > 0.0);
    assert!((aligned[(0, 0)] + 0.1).abs() < 1e-15);
    assert!(aligned[(0, 1)] > 0.0);
}

#[test]
fn test_init_basis_requires_every_element() {
    let mut scf = SimpleSCF::<BasisSet>::new();
    let elems = vec![Element::Hydrogen, Element::Oxygen];
    assert!(scf.init_basis(&elems, &sto3g_map(&["H"])).is_err());
    assert!(scf.init_basis(&elems, &sto3g_map(&["H", "O"])).is_ok());
    assert_eq!(scf.num_atoms, 2);
}

#[test]
fn test_init_geometry_centres_basis() {
    let mut scf = SimpleSCF::<BasisSet>::new();
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
    scf.init_basis(&elems, &sto3g_map(&["H"])).unwrap();
    scf.init_geometry(&coords, &elems);

    assert_eq!(scf.num_basis, 2);
    for (ao, c) in scf.ao_basis.iter().zip(&coords) {
        assert_eq!(ao.get_center().unwrap(), *c);
    }
}

#[test]
fn test_h2_sto3g_energy() {
    let coords = vec![Vector3::new(0.0, 0.0, -0.7), Vector3::new(0.0, 0.0, 0.7)];
    let elems = vec![Element::Hydrogen, Element::Hydrogen];
    let scf = run_scf(&elems, &coords, &["H"]);

    let total_energy = scf.calculate_total_energy();
    let expected_energy = -1.1167143502770278;
    assert!(
        (total_energy - expected_energy).abs() < 1e-6,
        "H2 STO-3G energy mismatch: got {}, expected {}",
        total_energy,
        expected_energy
    );
    assert!(scf.converged);
    assert_eq!(scf.num_occupied(), 1);
    assert!(scf.e_level[0] < 0.0 && scf.e_level[1] > 0.0);
}

#[test]
fn test_h2o_sto3g_energy() {
    let coords = vec![
        Vector3::new(0.0, 0.0, 0.1173 * 1.88973),
        Vector3::new(0.0, 0.7572 * 1.88973, -0.4692 * 1.88973),
        Vector3::new(0.0, -0.7572 * 1.88973, -0.4692 * 1.88973),
    ];
    let elems = vec![Element::Oxygen, Element::Hydrogen, Element::Hydrogen];
    let scf = run_scf(&elems, &coords, &["H", "O"]);

    let final_energy = scf.calculate_total_energy();
    let expected_energy = -74.9627;
    assert!(
        (final_energy - expected_energy).abs() < 1e-3,
        "H2O STO-3G energy mismatch: got {}, expected {}",
        final_energy,
        expected_energy
    );
}

#[test]
fn test_mo_coefficients_are_orthonormal() {
    let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0)];
    let elems = vec![Element::Lithium, Element::Hydrogen];
    let scf = run_scf(&elems, &coords, &["Li", "H"]);

    let c = &scf.coeffs;
    let identity = c.transpose() * &scf.overlap_matrix * c;
    assert!(identity.is_identity(1e-8));

    // trace(PS) counts the electrons
    let n_elec = (&scf.density_matrix * &scf.overlap_matrix).trace();
    assert!((n_elec - 4.0).abs() < 1e-8);
}

#[test]
fn test_eri_permutational_symmetry() {
    let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0)];
    let elems = vec![Element::Lithium, Element::Hydrogen];
    let scf = run_scf(&elems, &coords, &["Li", "H"]);
    let eri = &scf.eri;
    let n = scf.num_basis;
    for (i, j, k, l) in [(0, 1, 2, 3), (5, 1, 4, 0), (2, 2, 5, 3), (1, 4, 4, 1)] {
        let (i, j, k, l) = (i % n, j % n, k % n, l % n);
        let v = eri[[i, j, k, l]];
        assert!((v - eri[[j, i, l, k]]).abs() < 1e-14);
        assert!((v - eri[[k, l, i, j]]).abs() < 1e-14);
    }
}

#[test]
fn test_scf_reports_non_convergence() {
    let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 3.0)];
    let elems = vec![Element::Lithium, Element::Hydrogen];
    let mut scf = SimpleSCF::<BasisSet>::new();
    scf.max_cycle = 1;
    scf.set_convergence_threshold(1e-14);
    scf.init_basis(&elems, &sto3g_map(&["Li", "H"])).unwrap();
    scf.init_geometry(&coords, &elems);
    scf.init_density_matrix();
    scf.init_fock_matrix();
    assert!(scf.scf_cycle().is_err());
    assert!(!scf.converged);
}
