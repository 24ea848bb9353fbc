use crate::config::{Args, Config};
use crate::io::NwchemBasisLoader;
use crate::molecule::Molecule;
use crate::solver::{RhfSolver, ScfSettings};
use color_eyre::eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

/// Basis loader honouring the configured search directories and the
/// offline switch from either the YAML file or the command line.
pub fn build_loader(config: &Config, args: &Args) -> NwchemBasisLoader {
    let mut loader = NwchemBasisLoader::default();
    if let Some(dirs) = &config.basis_dirs {
        loader
            .search_dirs
            .extend(dirs.iter().map(PathBuf::from));
    }
    if args.offline || config.offline.unwrap_or(false) {
        info!("Basis set downloads disabled");
        loader.allow_download = false;
    }
    loader
}

pub fn run_rhf(
    molecule: &Molecule,
    loader: &NwchemBasisLoader,
    settings: ScfSettings,
) -> Result<RhfSolver> {
    info!("\nInitializing SCF calculation...");
    info!(
        "  mixing {:.2}, max cycles {}, DIIS subspace {}, threshold {:.1e}",
        settings.density_mixing,
        settings.max_cycle,
        settings.diis_subspace_size,
        settings.convergence_threshold
    );
    let solver = RhfSolver::with_settings(molecule, loader, settings)
        .wrap_err("Failed to set up the RHF solver")?;

    info!("\nStarting SCF cycle...\n");
    solver.run().wrap_err("RHF calculation failed")
}
