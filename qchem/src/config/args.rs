//! Command-line argument parsing

use clap::Parser;

/// Molecular Hamiltonians, integrals and state import from a YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override density mixing parameter
    #[arg(long)]
    pub density_mixing: Option<f64>,

    /// Override maximum SCF cycles
    #[arg(long)]
    pub max_cycle: Option<usize>,

    /// Override DIIS subspace size (0 disables DIIS)
    #[arg(long)]
    pub diis_subspace_size: Option<usize>,

    /// Override convergence threshold
    #[arg(long)]
    pub convergence_threshold: Option<f64>,

    /// Molecular charge (default: 0 for neutral)
    #[arg(long)]
    pub charge: Option<i32>,

    /// Spin multiplicity (2S+1, default: 1 for singlet)
    #[arg(long)]
    pub multiplicity: Option<usize>,

    /// Gaussian basis set name (default: sto-3g)
    #[arg(long)]
    pub basis: Option<String>,

    /// Integral source for the Hamiltonian stage (dhf or pyscf)
    #[arg(long)]
    pub method: Option<String>,

    /// Fermion-to-qubit mapping (jordan_wigner or parity)
    #[arg(long)]
    pub mapping: Option<String>,

    /// Number of active electrons
    #[arg(long)]
    pub active_electrons: Option<usize>,

    /// Number of active spatial orbitals
    #[arg(long)]
    pub active_orbitals: Option<usize>,

    /// Never download basis sets from the Basis Set Exchange
    #[arg(long)]
    pub offline: bool,
}
