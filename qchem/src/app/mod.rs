mod geometry;
mod report;
mod runner;
mod tasks;

pub use geometry::build_molecule;
pub use runner::{build_loader, run_rhf};

use self::report::report_rhf_summary;
use self::tasks::{
    run_conversion_stage, run_hamiltonian_stage, run_integral_stage, run_operator_import_stage,
    run_state_stage,
};
use crate::config::{Args, Config};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

pub struct QchemApplication {
    args: Args,
    config: Config,
}

impl QchemApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn new(args: Args, config: Config) -> Self {
        Self { args, config }
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref()).wrap_err("Could not create the output file")?;
        info!("Reading configuration from: {}", self.args.config_file);

        let molecule = build_molecule(&self.config, &self.args)?;
        let loader = build_loader(&self.config, &self.args);
        info!("{}", molecule);

        if self.config.is_hamiltonian_enabled() {
            run_hamiltonian_stage(&molecule, &loader, &self.args, &self.config)?;
        }

        if self.config.is_operator_import_enabled() {
            run_operator_import_stage(&self.config)?;
        }

        if self.config.is_integrals_enabled() || self.config.is_state_enabled() {
            let rhf = run_rhf(&molecule, &loader, self.config.scf_settings(&self.args))?;
            report_rhf_summary(&rhf);

            if self.config.is_integrals_enabled() {
                run_integral_stage(&rhf, &self.config)?;
            }
            if self.config.is_state_enabled() {
                run_state_stage(&rhf, &self.config)?;
            }
        }

        if self.config.is_conversion_enabled() {
            run_conversion_stage(&self.config)?;
        }

        Ok(())
    }
}

pub fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
