//! Initial Fock matrices and orbitals for an SCF solve.

use crate::linalg::{gemm, hermitian_eigen, set_mat_im, set_mat_re, LinalgError, LinalgScalar, Op};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Starting-point strategy. Only the core Hamiltonian guess exists today;
/// new strategies are added as variants handled by [`form_guess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessType {
    #[default]
    Core,
}

impl fmt::Display for GuessType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GuessType::Core => f.write_str("core"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessError {
    NoFockComponents,
    ComponentMismatch { fock: usize, core: usize },
    DimensionMismatch { expected: usize, found: usize },
    TooManyElectrons { occupied: usize, n_orbitals: usize },
    Linalg(LinalgError),
}

impl fmt::Display for GuessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GuessError::NoFockComponents => write!(f, "no Fock matrix components to fill"),
            GuessError::ComponentMismatch { fock, core } => write!(
                f,
                "{} Fock components but only {} core Hamiltonian components",
                fock, core
            ),
            GuessError::DimensionMismatch { expected, found } => {
                write!(f, "matrix dimension {} does not match basis size {}", found, expected)
            }
            GuessError::TooManyElectrons {
                occupied,
                n_orbitals,
            } => write!(
                f,
                "{} occupied orbitals requested but only {} orbitals exist",
                occupied, n_orbitals
            ),
            GuessError::Linalg(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GuessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuessError::Linalg(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LinalgError> for GuessError {
    fn from(e: LinalgError) -> Self {
        GuessError::Linalg(e)
    }
}

/// Turns Fock matrices into new orbitals and densities.
pub trait OrbitalUpdate<T: LinalgScalar> {
    /// `history` is false on the first call, when there is no previous
    /// iteration to extrapolate from.
    fn get_new_orbitals(&mut self, fock: &[DMatrix<T>], history: bool) -> Result<(), GuessError>;
}

/// Fill `fock` according to `guess` and produce the first orbitals.
///
/// For the core guess every component is zeroed, `core_h[0]` is copied into
/// the real part of `fock[0]` and `core_h[i]` into the imaginary part of
/// `fock[i]` for 0 < i < core_h.len(). Fock components without a core
/// Hamiltonian counterpart (e.g. the second spin component of an
/// unrestricted reference) stay zero.
pub fn form_guess<T, U>(
    guess: GuessType,
    fock: &mut [DMatrix<T>],
    core_h: &[DMatrix<f64>],
    updater: &mut U,
) -> Result<(), GuessError>
where
    T: LinalgScalar,
    U: OrbitalUpdate<T>,
{
    if fock.is_empty() {
        return Err(GuessError::NoFockComponents);
    }
    if core_h.is_empty() || core_h.len() > fock.len() {
        return Err(GuessError::ComponentMismatch {
            fock: fock.len(),
            core: core_h.len(),
        });
    }
    let n = core_h[0].nrows();
    if let Some(m) = fock
        .iter()
        .map(|f| f.shape())
        .chain(core_h.iter().map(|h| h.shape()))
        .find(|&shape| shape != (n, n))
    {
        return Err(GuessError::DimensionMismatch {
            expected: n,
            found: if m.0 != n { m.0 } else { m.1 },
        });
    }

    match guess {
        GuessType::Core => {
            info!(
                "Forming core Hamiltonian guess ({} Fock components, {} core)",
                fock.len(),
                core_h.len()
            );
            for f in fock.iter_mut() {
                f.fill(T::zero());
            }
            for (i, (f, h)) in fock.iter_mut().zip(core_h).enumerate() {
                if i == 0 {
                    set_mat_re(n, n, 1.0, h.as_slice(), n, f.as_mut_slice(), n)?;
                } else {
                    set_mat_im(n, n, 1.0, h.as_slice(), n, f.as_mut_slice(), n)?;
                }
            }
        }
    }

    updater.get_new_orbitals(fock, false)
}

/// Closed-shell orbitals from a real Fock matrix in the basis orthonormalized
/// by `ortho1` (ortho1 S ortho1^T = I).
#[derive(Debug, Clone)]
pub struct RestrictedOrbitals {
    pub ortho1: DMatrix<f64>,
    pub n_occupied: usize,
    pub energies: DVector<f64>,
    pub coefficients: DMatrix<f64>,
    pub density: DMatrix<f64>,
}

impl RestrictedOrbitals {
    pub fn new(ortho1: DMatrix<f64>, n_electrons: usize) -> Self {
        let n = ortho1.nrows();
        Self {
            ortho1,
            n_occupied: n_electrons / 2,
            energies: DVector::zeros(n),
            coefficients: DMatrix::zeros(n, n),
            density: DMatrix::zeros(n, n),
        }
    }

    /// Electronic energy 1/2 tr[D (H + F)] for the current density.
    pub fn electronic_energy(&self, core_h: &DMatrix<f64>, fock: &DMatrix<f64>) -> f64 {
        0.5 * self.density.dot(&(core_h + fock))
    }
}

// Flip each eigenvector so its largest component is positive.
pub fn align_eigenvectors(mut eigvecs: DMatrix<f64>) -> DMatrix<f64> {
    for j in 0..eigvecs.ncols() {
        let max_val = eigvecs
            .column(j)
            .iter()
            .copied()
            .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
        if max_val < 0.0 {
            eigvecs.column_mut(j).neg_mut();
        }
    }
    eigvecs
}

impl OrbitalUpdate<f64> for RestrictedOrbitals {
    fn get_new_orbitals(&mut self, fock: &[DMatrix<f64>], history: bool) -> Result<(), GuessError> {
        let f = fock.first().ok_or(GuessError::NoFockComponents)?;
        let n = self.ortho1.nrows();
        if f.shape() != (n, n) {
            return Err(GuessError::DimensionMismatch {
                expected: n,
                found: f.nrows(),
            });
        }
        if self.n_occupied > n {
            return Err(GuessError::TooManyElectrons {
                occupied: self.n_occupied,
                n_orbitals: n,
            });
        }
        debug!("orbital update (history = {})", history);

        // F' = ortho1 F ortho1^T
        let mut tmp = DMatrix::zeros(n, n);
        gemm(Op::NoTrans, Op::NoTrans, 1.0, &self.ortho1, f, 0.0, &mut tmp)?;
        let mut f_prime = DMatrix::zeros(n, n);
        gemm(Op::NoTrans, Op::Trans, 1.0, &tmp, &self.ortho1, 0.0, &mut f_prime)?;

        let energies = hermitian_eigen(&mut f_prime)?;

        // C = ortho1^T U
        let mut coeffs = DMatrix::zeros(n, n);
        gemm(Op::Trans, Op::NoTrans, 1.0, &self.ortho1, &f_prime, 0.0, &mut coeffs)?;
        self.coefficients = align_eigenvectors(coeffs);
        self.energies = DVector::from_vec(energies);

        let occ = self.coefficients.columns(0, self.n_occupied);
        self.density = 2.0 * &occ * occ.transpose();
        Ok(())
    }
}
