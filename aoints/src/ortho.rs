//! Orthonormalizing transforms of the AO overlap matrix.
//!
//! Both routes produce a pair (ortho1, ortho2) with ortho1 ortho2 = I and
//! ortho1 S ortho1^T = I:
//!
//! * Löwdin: ortho1 = S^{-1/2}, ortho2 = S^{1/2} (both symmetric)
//! * Cholesky: S = L L^T, ortho1 = L^{-1}, ortho2 = L (both lower triangular)

use crate::linalg::{cholesky, cholesky_inv, gemm, hermitian_eigen, LinalgError, Op, Uplo};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const DEFAULT_LINEAR_DEPENDENCE_THRESHOLD: f64 = 1.0e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrthoType {
    #[default]
    Cholesky,
    Lowdin,
}

impl fmt::Display for OrthoType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrthoType::Cholesky => f.write_str("cholesky"),
            OrthoType::Lowdin => f.write_str("lowdin"),
        }
    }
}

impl FromStr for OrthoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cholesky" => Ok(OrthoType::Cholesky),
            "lowdin" | "löwdin" | "symmetric" => Ok(OrthoType::Lowdin),
            other => Err(format!(
                "unknown orthogonalization '{}', expected 'cholesky' or 'lowdin'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrthoError {
    Linalg {
        matrix: &'static str,
        source: LinalgError,
    },
    LinearDependence {
        index: usize,
        eigenvalue: f64,
        threshold: f64,
    },
}

impl fmt::Display for OrthoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrthoError::Linalg { matrix, source } => {
                write!(f, "orthogonalization of the {} matrix failed: {}", matrix, source)
            }
            OrthoError::LinearDependence {
                index,
                eigenvalue,
                threshold,
            } => write!(
                f,
                "overlap eigenvalue {} is {:e}, not above the linear dependence threshold {:e}",
                index, eigenvalue, threshold
            ),
        }
    }
}

impl std::error::Error for OrthoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrthoError::Linalg { source, .. } => Some(source),
            OrthoError::LinearDependence { .. } => None,
        }
    }
}

fn overlap_err(source: LinalgError) -> OrthoError {
    OrthoError::Linalg {
        matrix: "overlap",
        source,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrthoPair {
    pub ortho1: DMatrix<f64>,
    pub ortho2: DMatrix<f64>,
}

/// Build (ortho1, ortho2) from the overlap matrix along the requested route.
pub fn compute_ortho(
    overlap: &DMatrix<f64>,
    ortho_type: OrthoType,
    linear_dependence_threshold: f64,
) -> Result<OrthoPair, OrthoError> {
    debug!(
        "orthogonalizing {}x{} overlap via {}",
        overlap.nrows(),
        overlap.ncols(),
        ortho_type
    );
    match ortho_type {
        OrthoType::Lowdin => lowdin(overlap, linear_dependence_threshold),
        OrthoType::Cholesky => cholesky_route(overlap),
    }
}

fn lowdin(overlap: &DMatrix<f64>, threshold: f64) -> Result<OrthoPair, OrthoError> {
    let n = overlap.nrows();
    let mut vecs = overlap.clone();
    let vals = hermitian_eigen(&mut vecs).map_err(overlap_err)?;

    if let Some((index, &eigenvalue)) = vals.iter().enumerate().find(|&(_, &s)| s <= threshold) {
        return Err(OrthoError::LinearDependence {
            index,
            eigenvalue,
            threshold,
        });
    }
    if let (Some(min), Some(max)) = (vals.first(), vals.last()) {
        debug!("overlap eigenvalues in [{:.3e}, {:.3e}]", min, max);
    }

    // X = V s^{-1/2}
    let mut scaled = vecs.clone();
    for (j, &s) in vals.iter().enumerate() {
        scaled.column_mut(j).scale_mut(1.0 / s.sqrt());
    }
    let mut ortho1 = DMatrix::zeros(n, n);
    gemm(Op::NoTrans, Op::Trans, 1.0, &scaled, &vecs, 0.0, &mut ortho1).map_err(overlap_err)?;

    // X s = V s^{1/2}
    for (j, &s) in vals.iter().enumerate() {
        scaled.column_mut(j).scale_mut(s);
    }
    let mut ortho2 = DMatrix::zeros(n, n);
    gemm(Op::NoTrans, Op::Trans, 1.0, &scaled, &vecs, 0.0, &mut ortho2).map_err(overlap_err)?;

    Ok(OrthoPair { ortho1, ortho2 })
}

fn cholesky_route(overlap: &DMatrix<f64>) -> Result<OrthoPair, OrthoError> {
    let n = overlap.nrows();
    let mut scratch = overlap.clone();

    cholesky(Uplo::Lower, &mut scratch).map_err(overlap_err)?;
    let ortho2 = scratch.lower_triangle();

    // lower triangle of scratch now holds S^{-1}, the strict upper still S
    cholesky_inv(Uplo::Lower, &mut scratch).map_err(overlap_err)?;
    let mut ortho1 = DMatrix::zeros(n, n);
    gemm(Op::Trans, Op::NoTrans, 1.0, &ortho2, &scratch, 0.0, &mut ortho1).map_err(overlap_err)?;
    ortho1.fill_upper_triangle(0.0, 1);

    Ok(OrthoPair { ortho1, ortho2 })
}

/// Outcome of one identity checked by [`OrthoPair::verify`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCheck {
    pub name: &'static str,
    pub max_error: f64,
    pub passed: bool,
}

fn max_deviation(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    (a - b).amax()
}

fn strict_upper_amax(m: &DMatrix<f64>) -> f64 {
    let mut max: f64 = 0.0;
    for j in 1..m.ncols() {
        for i in 0..j.min(m.nrows()) {
            max = max.max(m[(i, j)].abs());
        }
    }
    max
}

impl OrthoPair {
    /// Check the identities the pair must satisfy for `ortho_type` and log
    /// each result.
    pub fn verify(
        &self,
        overlap: &DMatrix<f64>,
        ortho_type: OrthoType,
        tolerance: f64,
    ) -> Vec<OrthoCheck> {
        let n = overlap.nrows();
        let identity = DMatrix::<f64>::identity(n, n);
        let o1 = &self.ortho1;
        let o2 = &self.ortho2;

        let mut checks = vec![
            ("ortho1 * ortho2 = I", max_deviation(&(o1 * o2), &identity)),
            (
                "ortho1 * S * ortho1^T = I",
                max_deviation(&(o1 * overlap * o1.transpose()), &identity),
            ),
        ];
        match ortho_type {
            OrthoType::Lowdin => {
                checks.push((
                    "ortho2^T * ortho2 = S",
                    max_deviation(&(o2.transpose() * o2), overlap),
                ));
            }
            OrthoType::Cholesky => {
                checks.push((
                    "ortho2 * ortho2^T = S",
                    max_deviation(&(o2 * o2.transpose()), overlap),
                ));
                checks.push(("ortho1 lower triangular", strict_upper_amax(o1)));
            }
        }

        checks
            .into_iter()
            .map(|(name, max_error)| {
                let passed = max_error <= tolerance;
                if passed {
                    info!("  {:<28} max error {:.3e}", name, max_error);
                } else {
                    warn!("  {:<28} max error {:.3e} FAILED", name, max_error);
                }
                OrthoCheck {
                    name,
                    max_error,
                    passed,
                }
            })
            .collect()
    }
}
