//! One-electron integrals over shell pairs.
//!
//! An [`Operator`] selects what is integrated, a [`OneBodyEngine`] computes
//! the block of a single shell pair, and [`one_e_driver`] assembles the full
//! symmetric matrices in parallel.

mod driver;
mod engine;
mod operator;

pub use driver::one_e_driver;
pub use engine::{OneBodyEngine, DEFAULT_PRECISION};
pub use operator::{multipole_powers, Operator};

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum IntegralError {
    EmptyShellList,
    UnknownOperator(String),
    UnsupportedAngularMomentum { l: i32, max: i32 },
    ShellExceedsEngine { shell: usize, l: i32, n_prim: usize },
}

impl fmt::Display for IntegralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IntegralError::EmptyShellList => write!(f, "cannot build integrals over an empty shell list"),
            IntegralError::UnknownOperator(name) => write!(f, "unknown one-electron operator '{}'", name),
            IntegralError::UnsupportedAngularMomentum { l, max } => {
                write!(f, "angular momentum {} exceeds the supported maximum {}", l, max)
            }
            IntegralError::ShellExceedsEngine { shell, l, n_prim } => write!(
                f,
                "shell {} (l = {}, {} primitives) exceeds the engine dimensions",
                shell, l, n_prim
            ),
        }
    }
}

impl std::error::Error for IntegralError {}
