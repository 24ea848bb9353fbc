use crate::qubit::PauliSentence;
use crate::solver::RhfSolver;
use num_complex::Complex64;
use tracing::info;

pub fn report_rhf_summary(rhf: &RhfSolver) {
    info!("\nSCF calculation finished.");

    info!("\nFinal Energy Levels:");
    for (i, (energy, occ)) in rhf.mo_energy().iter().zip(rhf.mo_occ()).enumerate() {
        info!("  Level {}: {:.8} au  (occ {:.0})", i + 1, energy, occ);
    }

    info!("\nNuclear repulsion energy:  {:.10} au", rhf.energy_nuc());
    if let Ok(energy) = rhf.e_tot() {
        info!("Hartree-Fock Total Energy: {:.10} au", energy);
    }
}

pub fn report_operator(title: &str, op: &PauliSentence) {
    info!("\n{} ({} terms):", title, op.len());
    for line in op.to_string().lines() {
        info!("  {}", line);
    }
}

/// Logs the nonzero amplitudes of a state vector with their bitstrings.
pub fn report_state(state: &[Complex64], n_qubits: usize, tol: f64) {
    info!("\nNonzero amplitudes:");
    for (index, amp) in state.iter().enumerate() {
        if amp.norm() > tol {
            info!(
                "  |{:0width$b}>  {:+.10}",
                index,
                amp.re,
                width = n_qubits
            );
        }
    }
    let norm: f64 = state.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    info!("State norm: {:.12}", norm);
}
