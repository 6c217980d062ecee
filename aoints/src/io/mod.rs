//! Input/Output operations
//!
//! This module handles logging setup and basis set loading.

mod basis_loader;
mod output;

pub use basis_loader::fetch_basis;
pub use output::setup_output;
