mod basis;
mod geometry;
mod report;
mod runner;

pub use basis::{BasisLoader, BasisRegistry, NwchemLoader};
pub use geometry::build_molecule;
pub use runner::{run_guess, run_integrals};

use self::report::{report_basis, report_guess, report_integrals};
use crate::config::{Args, Config};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

pub struct AoIntsApplication {
    args: Args,
    config: Config,
}

impl AoIntsApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded from {}", self.args.config_file);

        let charge = self.args.charge.or(self.config.charge).unwrap_or(0);
        let molecule = build_molecule(&self.config, charge)?;

        let mut registry = BasisRegistry::new(NwchemLoader::new(self.config.basis_dir()));
        let basis = registry.build_basis_set(self.config.basis_name(), &molecule)?;
        report_basis(self.config.basis_name(), &basis, &molecule);

        let (ints, checks) = run_integrals(&basis, &molecule, &self.args, &self.config)?;
        report_integrals(&ints, &molecule, &checks);

        let guess = self.config.guess.unwrap_or_default();
        let (fock, orbitals) = run_guess(guess, &ints, &molecule)?;
        report_guess(&ints, &molecule, &fock, &orbitals);

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
