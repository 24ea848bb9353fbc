use crate::config::{Args, Config};
use crate::molecule::{Molecule, Unit};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

/// Build the molecule defined in the YAML configuration, with charge,
/// multiplicity and basis overridable from the command line.
pub fn build_molecule(config: &Config, args: &Args) -> Result<Molecule> {
    info!("\nPreparing geometry...");

    let symbols: Vec<&str> = config.geometry.iter().map(|a| a.element.as_str()).collect();
    let coords: Vec<[f64; 3]> = config.geometry.iter().map(|a| a.coords).collect();
    let unit = config.unit.unwrap_or(Unit::Bohr);

    let charge = args.charge.or(config.charge).unwrap_or(0);
    let multiplicity = args.multiplicity.or(config.multiplicity).unwrap_or(1);
    let basis = args
        .basis
        .clone()
        .or_else(|| config.basis.clone())
        .unwrap_or_else(|| "sto-3g".to_string());

    let molecule = Molecule::new(&symbols, &coords, unit)
        .and_then(|m| m.with_charge_and_multiplicity(charge, multiplicity))
        .wrap_err("Invalid molecule in configuration")?
        .with_basis(&basis);

    Ok(molecule)
}
