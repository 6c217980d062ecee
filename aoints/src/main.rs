//! One-electron integral command-line interface
//!
//! Reads a YAML configuration, computes the AO one-electron matrices and the
//! orthonormalizing transformation, and forms the core Hamiltonian guess.

mod app;
mod config;
mod io;

use app::AoIntsApplication;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    AoIntsApplication::from_cli()?.run()
}
