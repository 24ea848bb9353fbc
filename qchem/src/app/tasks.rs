use crate::app::report::{report_operator, report_state};
use crate::ccsd_impl::CCSD;
use crate::ci_impl::CI;
use crate::config::{Args, Config};
use crate::convert::{from_openfermion, import_operator, to_openfermion};
use crate::fermion::{fermionic_observable, FermiSentence};
use crate::hamiltonian::{molecular_hamiltonian, HamiltonianOptions, Method};
use crate::integrals::electron_integrals;
use crate::io::NwchemBasisLoader;
use crate::mapping::Mapping;
use crate::molecule::Molecule;
use crate::openfermion::{FermionOperator, QubitOperator};
use crate::solver::RhfSolver;
use crate::state::{import_state, Wavefunction};
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;

fn banner(title: &str) {
    info!("\n===========================================");
    info!("       {}", title);
    info!("===========================================");
}

/// Options for the Hamiltonian stage: command line first, then YAML.
pub fn hamiltonian_options(args: &Args, config: &Config) -> Result<HamiltonianOptions> {
    let params = config.hamiltonian.clone().unwrap_or_default().with_defaults();
    let defaults = HamiltonianOptions::default();

    let method = match args.method.as_ref().or(params.method.as_ref()) {
        Some(name) => name.parse::<Method>()?,
        None => defaults.method,
    };
    let mapping = match args.mapping.as_ref().or(params.mapping.as_ref()) {
        Some(name) => name.parse::<Mapping>()?,
        None => defaults.mapping,
    };

    Ok(HamiltonianOptions {
        method,
        active_electrons: args.active_electrons.or(params.active_electrons),
        active_orbitals: args.active_orbitals.or(params.active_orbitals),
        mapping,
        cutoff: params.cutoff.unwrap_or(defaults.cutoff),
    })
}

pub fn run_hamiltonian_stage(
    molecule: &Molecule,
    loader: &NwchemBasisLoader,
    args: &Args,
    config: &Config,
) -> Result<()> {
    banner("Molecular Hamiltonian");
    let options = hamiltonian_options(args, config)?;
    info!("Integral method: {}", options.method);
    info!("Mapping:         {}", options.mapping);
    if let (Some(e), Some(o)) = (options.active_electrons, options.active_orbitals) {
        info!("Active space:    {} electrons in {} orbitals", e, o);
    }

    let (hamiltonian, n_qubits) = molecular_hamiltonian(molecule, &options, loader)
        .wrap_err("Failed to build the molecular Hamiltonian")?;

    info!("Number of qubits required: {}", n_qubits);
    report_operator("Qubit Hamiltonian", &hamiltonian);
    Ok(())
}

pub fn run_operator_import_stage(config: &Config) -> Result<()> {
    banner("Operator Import");
    let params = config
        .operator_import
        .clone()
        .unwrap_or_default()
        .with_defaults();
    let text = params
        .operator
        .ok_or_else(|| eyre!("operator_import.operator is missing"))?;
    let tol = params.tol.unwrap_or(1e-12);

    let external: QubitOperator = text.parse().wrap_err("Invalid qubit operator")?;
    info!("Imported operator:\n{}", external);
    let observable = import_operator(&external, tol)?;
    report_operator("Native observable", &observable);
    Ok(())
}

pub fn run_integral_stage(rhf: &RhfSolver, config: &Config) -> Result<()> {
    banner("Electron Integrals");
    let params = config.integrals.clone().unwrap_or_default().with_defaults();
    let mapping = match params.mapping.as_ref() {
        Some(name) => name.parse::<Mapping>()?,
        None => Mapping::default(),
    };
    let cutoff = params.cutoff.unwrap_or(HamiltonianOptions::default().cutoff);

    let (core_constant, one, two) = electron_integrals(rhf)?;
    info!("Core constant: {:.10} Eh", core_constant[0]);
    info!("One-electron integrals: {} x {}", one.nrows(), one.ncols());
    info!("Two-electron integrals: {:?}", two.dim());

    let fermionic: FermiSentence = fermionic_observable(&core_constant, &one, &two, cutoff);
    let n_qubits = 2 * one.nrows();
    info!("Fermionic Hamiltonian: {} terms", fermionic.len());

    let qubit = mapping.apply(&fermionic, n_qubits, cutoff)?;
    info!("Mapping: {}, qubits: {}", mapping, n_qubits);
    report_operator("Qubit Hamiltonian from integrals", &qubit);
    Ok(())
}

pub fn run_state_stage(rhf: &RhfSolver, config: &Config) -> Result<()> {
    banner("State Import");
    let params = config.state.clone().unwrap_or_default().with_defaults();
    let method = params.method.unwrap_or_else(|| "ccsd".to_string());
    let tol = params.tol.unwrap_or(1e-15);
    let max_iterations = params.max_iterations.unwrap_or(100);
    let threshold = params.convergence_threshold.unwrap_or(1e-8);

    let solver: Box<dyn Wavefunction> = match method.to_lowercase().as_str() {
        "ccsd" => {
            let mut ccsd = CCSD::from_rhf(rhf, max_iterations, threshold)?;
            ccsd.solve().wrap_err("CCSD failed")?;
            ccsd.print_summary();
            Box::new(ccsd)
        }
        "cisd" => {
            let mut ci = CI::from_rhf(rhf)?;
            ci.solve().wrap_err("CISD failed")?;
            info!("CISD total energy: {:.12} Eh", ci.e_tot()?);
            Box::new(ci)
        }
        other => return Err(eyre!("unknown state method '{}' (expected ccsd or cisd)", other)),
    };

    let state = import_state(solver.as_ref(), tol)?;
    let n_qubits = state.len().trailing_zeros() as usize;
    info!("Wavefunction on {} qubits from {}", n_qubits, method);
    report_state(&state, n_qubits, tol.max(1e-10));
    Ok(())
}

pub fn run_conversion_stage(config: &Config) -> Result<()> {
    banner("Operator Conversion");
    let params = config.conversion.clone().unwrap_or_default().with_defaults();
    let text = params
        .operator
        .ok_or_else(|| eyre!("conversion.operator is missing"))?;

    let external: FermionOperator = text.parse().wrap_err("Invalid fermion operator")?;
    info!("External operator:\n{}", external);

    let native: FermiSentence = from_openfermion(&external);
    info!("Native operator:\n{}", native);

    let back: FermionOperator = to_openfermion(&native);
    info!("Converted back:\n{}", back);
    if back != external {
        return Err(eyre!("fermion operator changed during conversion"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(text: &str) -> Config {
        serde_yml::from_str::<Config>(text).unwrap().with_defaults()
    }

    const H2: &str = "geometry:\n  - element: H\n    coords: [0.0, 0.0, 0.0]\n  - element: H\n    coords: [0.0, 0.0, 1.4]\n";

    #[test]
    fn test_hamiltonian_options_prefer_command_line() {
        let config = config(&format!("{H2}hamiltonian:\n  method: pyscf\n  mapping: parity\n"));
        let args = Args::parse_from(["qchem", "--mapping", "jw"]);
        let options = hamiltonian_options(&args, &config).unwrap();
        assert_eq!(options.method, Method::Pyscf);
        assert_eq!(options.mapping, Mapping::JordanWigner);
    }

    #[test]
    fn test_hamiltonian_options_reject_unknown_method() {
        let config = config(&format!("{H2}hamiltonian:\n  method: psi4\n"));
        let args = Args::parse_from(["qchem"]);
        assert!(hamiltonian_options(&args, &config).is_err());
    }

    #[test]
    fn test_operator_stages_run_without_molecule() {
        let config = config(&format!("{H2}operator_import: {{}}\nconversion: {{}}\n"));
        run_operator_import_stage(&config).unwrap();
        run_conversion_stage(&config).unwrap();

        let bad = config_with_complex();
        assert!(run_operator_import_stage(&bad).is_err());
    }

    fn config_with_complex() -> Config {
        config(&format!(
            "{H2}operator_import:\n  operator: \"(0.1+0.3j) [Y0]\"\n"
        ))
    }
}
