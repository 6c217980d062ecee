//! One-electron AO integrals, orthonormalization and the core guess for
//! Gaussian basis sets.

pub mod guess;
pub mod hamiltonian;
pub mod integrals;
pub mod linalg;
pub mod molecule;
pub mod ortho;
