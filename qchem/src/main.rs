//! Command-line interface: molecular Hamiltonians, integrals and state
//! import driven by a YAML configuration.

use color_eyre::eyre::Result;
use qchem::app::QchemApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    QchemApplication::from_cli()?.run()
}
