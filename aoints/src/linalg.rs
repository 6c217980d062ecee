//! Dense linear-algebra primitives on column-major `DMatrix` storage.
//!
//! Every routine works for real (`f64`) and complex (`Complex<f64>`) scalars
//! and reports failures with LAPACK-style status codes: a negative `info`
//! names the offending argument, a positive one the failing pivot or column
//! (1-indexed).

use nalgebra::{Cholesky, ComplexField, DMatrix, SymmetricEigen};
use num_complex::Complex;
use std::borrow::Cow;
use std::fmt;

/// Scalar types the primitives are instantiated for.
pub trait LinalgScalar: ComplexField<RealField = f64> + Copy {
    /// Build a scalar from real and imaginary parts. Real scalars drop `im`.
    fn compose(re: f64, im: f64) -> Self;
}

impl LinalgScalar for f64 {
    fn compose(re: f64, _im: f64) -> Self {
        re
    }
}

impl LinalgScalar for Complex<f64> {
    fn compose(re: f64, im: f64) -> Self {
        Complex::new(re, im)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uplo {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    NoTrans,
    Trans,
    ConjTrans,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// info < 0: argument -info is invalid
    IllegalArgument { routine: &'static str, info: i32 },
    /// leading minor of order `info` is not positive definite
    NotPositiveDefinite { routine: &'static str, info: i32 },
    /// U(info, info) is exactly zero
    Singular { routine: &'static str, info: i32 },
    NoConvergence { routine: &'static str, info: i32 },
}

impl LinalgError {
    pub fn routine(&self) -> &'static str {
        match self {
            LinalgError::IllegalArgument { routine, .. }
            | LinalgError::NotPositiveDefinite { routine, .. }
            | LinalgError::Singular { routine, .. }
            | LinalgError::NoConvergence { routine, .. } => routine,
        }
    }

    pub fn info(&self) -> i32 {
        match self {
            LinalgError::IllegalArgument { info, .. }
            | LinalgError::NotPositiveDefinite { info, .. }
            | LinalgError::Singular { info, .. }
            | LinalgError::NoConvergence { info, .. } => *info,
        }
    }
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinalgError::IllegalArgument { routine, info } => {
                write!(f, "{}: argument {} has an illegal value (info = {})", routine, -info, info)
            }
            LinalgError::NotPositiveDefinite { routine, info } => write!(
                f,
                "{}: leading minor of order {} is not positive definite (info = {})",
                routine, info, info
            ),
            LinalgError::Singular { routine, info } => write!(
                f,
                "{}: matrix is singular, zero pivot at {} (info = {})",
                routine, info, info
            ),
            LinalgError::NoConvergence { routine, info } => {
                write!(f, "{}: failed to converge (info = {})", routine, info)
            }
        }
    }
}

impl std::error::Error for LinalgError {}

fn require_square<T: LinalgScalar>(
    routine: &'static str,
    arg: i32,
    a: &DMatrix<T>,
) -> Result<usize, LinalgError> {
    if a.nrows() != a.ncols() {
        return Err(LinalgError::IllegalArgument { routine, info: -arg });
    }
    Ok(a.nrows())
}

/// Cholesky factorization A = L L^H (`Lower`) or A = U^H U (`Upper`), in place.
///
/// Only the `uplo` triangle is referenced and overwritten; the opposite
/// triangle keeps its input values. On failure `a` is left unchanged and
/// `info` is the order of the first leading minor that is not positive
/// definite.
pub fn cholesky<T: LinalgScalar>(uplo: Uplo, a: &mut DMatrix<T>) -> Result<(), LinalgError> {
    const ROUTINE: &str = "cholesky";
    let n = require_square(ROUTINE, 2, a)?;

    let lower = match uplo {
        Uplo::Lower => a.lower_triangle(),
        Uplo::Upper => a.upper_triangle().adjoint(),
    };
    let l = match Cholesky::new(lower.clone()) {
        Some(chol) => chol.unpack(),
        None => {
            return Err(LinalgError::NotPositiveDefinite {
                routine: ROUTINE,
                info: failing_minor(&lower),
            })
        }
    };

    for j in 0..n {
        match uplo {
            Uplo::Lower => {
                for i in j..n {
                    a[(i, j)] = l[(i, j)];
                }
            }
            Uplo::Upper => {
                for i in 0..=j {
                    a[(i, j)] = l[(j, i)].conjugate();
                }
            }
        }
    }
    Ok(())
}

// 1-indexed order of the first leading minor of the Hermitian matrix stored
// in `lower` whose pivot is not positive
fn failing_minor<T: LinalgScalar>(lower: &DMatrix<T>) -> i32 {
    let n = lower.nrows();
    let mut l = lower.clone();
    for j in 0..n {
        let mut ljj = l[(j, j)].real();
        for k in 0..j {
            ljj -= l[(j, k)].modulus_squared();
        }
        if ljj <= 0.0 || ljj.is_nan() {
            return j as i32 + 1;
        }
        let ljj = ljj.sqrt();
        for i in j + 1..n {
            let mut s = l[(i, j)];
            for k in 0..j {
                s -= l[(i, k)] * l[(j, k)].conjugate();
            }
            l[(i, j)] = s.unscale(ljj);
        }
    }
    n as i32
}

/// Inverse of A from its Cholesky factor stored in the `uplo` triangle.
///
/// The inverse is written to the `uplo` triangle only; the other triangle
/// is left untouched.
pub fn cholesky_inv<T: LinalgScalar>(uplo: Uplo, a: &mut DMatrix<T>) -> Result<(), LinalgError> {
    const ROUTINE: &str = "cholesky_inv";
    let n = require_square(ROUTINE, 2, a)?;

    // work with the lower factor; A^{-1} = L^{-H} L^{-1}
    let l = match uplo {
        Uplo::Lower => a.lower_triangle(),
        Uplo::Upper => a.upper_triangle().adjoint(),
    };
    if let Some(j) = (0..n).find(|&j| l[(j, j)].is_zero()) {
        return Err(LinalgError::Singular {
            routine: ROUTINE,
            info: j as i32 + 1,
        });
    }

    let l_inv = l
        .solve_lower_triangular(&DMatrix::<T>::identity(n, n))
        .ok_or(LinalgError::Singular {
            routine: ROUTINE,
            info: 0,
        })?;
    let inv = l_inv.adjoint() * &l_inv;

    for j in 0..n {
        match uplo {
            Uplo::Lower => {
                for i in j..n {
                    a[(i, j)] = inv[(i, j)];
                }
            }
            Uplo::Upper => {
                for i in 0..=j {
                    a[(i, j)] = inv[(i, j)];
                }
            }
        }
    }
    Ok(())
}

/// LU factorization with partial pivoting, P A = L U, in place.
///
/// `ipiv[j]` receives the 1-indexed row interchanged with row j+1. A zero
/// pivot does not stop the factorization; it is reported once the factors
/// are complete, as LAPACK does.
pub fn lu<T: LinalgScalar>(a: &mut DMatrix<T>, ipiv: &mut [i32]) -> Result<(), LinalgError> {
    const ROUTINE: &str = "lu";
    let (m, n) = a.shape();
    let k = m.min(n);
    if ipiv.len() < k {
        return Err(LinalgError::IllegalArgument {
            routine: ROUTINE,
            info: -2,
        });
    }

    let mut info = 0;
    for j in 0..k {
        let mut p = j;
        let mut pmax = a[(j, j)].norm1();
        for i in j + 1..m {
            let v = a[(i, j)].norm1();
            if v > pmax {
                pmax = v;
                p = i;
            }
        }
        ipiv[j] = p as i32 + 1;

        if !a[(p, j)].is_zero() {
            if p != j {
                a.swap_rows(p, j);
            }
            let pivot = a[(j, j)];
            for i in j + 1..m {
                a[(i, j)] /= pivot;
            }
        } else if info == 0 {
            info = j as i32 + 1;
        }

        for c in j + 1..n {
            let ajc = a[(j, c)];
            for i in j + 1..m {
                let lij = a[(i, j)];
                a[(i, c)] -= lij * ajc;
            }
        }
    }

    if info > 0 {
        return Err(LinalgError::Singular {
            routine: ROUTINE,
            info,
        });
    }
    Ok(())
}

/// LU factorization that owns its pivot scratch; returns the pivots.
pub fn lu_with_scratch<T: LinalgScalar>(a: &mut DMatrix<T>) -> Result<Vec<i32>, LinalgError> {
    let mut ipiv = vec![0_i32; a.nrows().min(a.ncols())];
    lu(a, &mut ipiv)?;
    Ok(ipiv)
}

/// Inverse of A from the output of [`lu`], in place.
pub fn lu_inv<T: LinalgScalar>(a: &mut DMatrix<T>, ipiv: &[i32]) -> Result<(), LinalgError> {
    const ROUTINE: &str = "lu_inv";
    let n = require_square(ROUTINE, 1, a)?;
    if ipiv.len() < n {
        return Err(LinalgError::IllegalArgument {
            routine: ROUTINE,
            info: -2,
        });
    }
    if let Some(j) = (0..n).find(|&j| a[(j, j)].is_zero()) {
        return Err(LinalgError::Singular {
            routine: ROUTINE,
            info: j as i32 + 1,
        });
    }

    // A^{-1} = U^{-1} L^{-1} P
    let mut x = DMatrix::<T>::identity(n, n);
    for (j, &p) in ipiv.iter().take(n).enumerate() {
        let p = p as usize - 1;
        if p != j {
            x.swap_rows(p, j);
        }
    }
    let unit_lower_ok = a.solve_lower_triangular_with_diag_mut(&mut x, T::one());
    let upper_ok = a.solve_upper_triangular_mut(&mut x);
    if !(unit_lower_ok && upper_ok) {
        return Err(LinalgError::Singular {
            routine: ROUTINE,
            info: 0,
        });
    }

    a.copy_from(&x);
    Ok(())
}

/// Eigen-decomposition of a Hermitian matrix.
///
/// Eigenvalues are returned in ascending order; the matching orthonormal
/// eigenvectors overwrite the columns of `a`.
pub fn hermitian_eigen<T: LinalgScalar>(a: &mut DMatrix<T>) -> Result<Vec<f64>, LinalgError> {
    const ROUTINE: &str = "hermitian_eigen";
    let n = require_square(ROUTINE, 1, a)?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let max_iter = 1000 * n;
    let eig = SymmetricEigen::try_new(a.clone(), f64::EPSILON, max_iter).ok_or(
        LinalgError::NoConvergence {
            routine: ROUTINE,
            info: max_iter as i32,
        },
    )?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    for (dst, &src) in order.iter().enumerate() {
        a.set_column(dst, &eig.eigenvectors.column(src));
    }
    Ok(values)
}

fn apply_op<T: LinalgScalar>(op: Op, m: &DMatrix<T>) -> Cow<'_, DMatrix<T>> {
    match op {
        Op::NoTrans => Cow::Borrowed(m),
        Op::Trans => Cow::Owned(m.transpose()),
        Op::ConjTrans => Cow::Owned(m.adjoint()),
    }
}

/// C = alpha op(A) op(B) + beta C. With `beta == 0` the input C is ignored.
pub fn gemm<T: LinalgScalar>(
    transa: Op,
    transb: Op,
    alpha: T,
    a: &DMatrix<T>,
    b: &DMatrix<T>,
    beta: T,
    c: &mut DMatrix<T>,
) -> Result<(), LinalgError> {
    const ROUTINE: &str = "gemm";
    let opa = apply_op(transa, a);
    let opb = apply_op(transb, b);
    if opa.ncols() != opb.nrows() {
        return Err(LinalgError::IllegalArgument {
            routine: ROUTINE,
            info: -5,
        });
    }
    if c.shape() != (opa.nrows(), opb.ncols()) {
        return Err(LinalgError::IllegalArgument {
            routine: ROUTINE,
            info: -7,
        });
    }
    c.gemm(alpha, &*opa, &*opb, beta);
    Ok(())
}

fn check_block(
    routine: &'static str,
    m: usize,
    n: usize,
    len_a: usize,
    lda: usize,
    len_b: usize,
    ldb: usize,
) -> Result<(), LinalgError> {
    let needed = |ld: usize| if n == 0 || m == 0 { 0 } else { ld * (n - 1) + m };
    if lda < m.max(1) {
        return Err(LinalgError::IllegalArgument { routine, info: -5 });
    }
    if ldb < m.max(1) {
        return Err(LinalgError::IllegalArgument { routine, info: -7 });
    }
    if len_a < needed(lda) {
        return Err(LinalgError::IllegalArgument { routine, info: -4 });
    }
    if len_b < needed(ldb) {
        return Err(LinalgError::IllegalArgument { routine, info: -6 });
    }
    Ok(())
}

/// B(0..m, 0..n) = alpha A(0..m, 0..n) on column-major blocks with leading
/// dimensions `lda` and `ldb`.
pub fn set_mat<T: LinalgScalar>(
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<(), LinalgError> {
    check_block("set_mat", m, n, a.len(), lda, b.len(), ldb)?;
    for j in 0..n {
        let src = &a[j * lda..j * lda + m];
        let dst = &mut b[j * ldb..j * ldb + m];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = alpha * *s;
        }
    }
    Ok(())
}

/// Overwrite the real part of a block of B with alpha A, keeping Im(B).
pub fn set_mat_re<T: LinalgScalar>(
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<(), LinalgError> {
    check_block("set_mat_re", m, n, a.len(), lda, b.len(), ldb)?;
    for j in 0..n {
        for i in 0..m {
            let d = &mut b[j * ldb + i];
            *d = T::compose(alpha * a[j * lda + i], d.imaginary());
        }
    }
    Ok(())
}

/// Overwrite the imaginary part of a block of B with alpha A, keeping Re(B).
/// For real B this leaves the block unchanged.
pub fn set_mat_im<T: LinalgScalar>(
    m: usize,
    n: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<(), LinalgError> {
    check_block("set_mat_im", m, n, a.len(), lda, b.len(), ldb)?;
    for j in 0..n {
        for i in 0..m {
            let d = &mut b[j * ldb + i];
            *d = T::compose(d.real(), alpha * a[j * lda + i]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_spd(n: usize) -> DMatrix<f64> {
        let mut rng = rand::thread_rng();
        let m = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-1.0..1.0));
        &m * m.transpose() + DMatrix::identity(n, n) * n as f64
    }

    fn max_abs_diff<T: LinalgScalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (*x - *y).modulus())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_cholesky_lower_reconstructs() {
        let s = random_spd(5);
        let mut a = s.clone();
        cholesky(Uplo::Lower, &mut a).unwrap();
        let l = a.lower_triangle();
        assert!(max_abs_diff(&(&l * l.transpose()), &s) < 1e-12);
        // upper triangle still holds the input
        for j in 1..5 {
            for i in 0..j {
                assert_eq!(a[(i, j)], s[(i, j)]);
            }
        }
    }

    #[test]
    fn test_cholesky_upper_reconstructs() {
        let s = random_spd(4);
        let mut a = s.clone();
        cholesky(Uplo::Upper, &mut a).unwrap();
        let u = a.upper_triangle();
        assert!(max_abs_diff(&(u.transpose() * &u), &s) < 1e-12);
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let mut a = DMatrix::from_row_slice(3, 3, &[4.0, 2.0, 0.0, 2.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let err = cholesky(Uplo::Lower, &mut a).unwrap_err();
        assert_eq!(
            err,
            LinalgError::NotPositiveDefinite {
                routine: "cholesky",
                info: 2
            }
        );
        assert!(err.info() > 0);
        // input left as it was
        assert_eq!(a[(1, 1)], 1.0);
        assert_eq!(a[(1, 0)], 2.0);
    }

    #[test]
    fn test_cholesky_failing_minor_index() {
        // leading 2x2 block is positive definite, the full matrix is not
        let mut a = DMatrix::from_row_slice(
            3,
            3,
            &[2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, -3.0],
        );
        assert_eq!(cholesky(Uplo::Upper, &mut a).unwrap_err().info(), 3);
    }

    #[test]
    fn test_cholesky_inv_lower_triangle_only() {
        let s = random_spd(4);
        let mut a = s.clone();
        cholesky(Uplo::Lower, &mut a).unwrap();
        cholesky_inv(Uplo::Lower, &mut a).unwrap();

        let s_inv = s.clone().try_inverse().unwrap();
        for j in 0..4 {
            for i in 0..4 {
                if i >= j {
                    assert!((a[(i, j)] - s_inv[(i, j)]).abs() < 1e-10);
                } else {
                    assert_eq!(a[(i, j)], s[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_cholesky_complex_hermitian() {
        let h = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex::new(4.0, 0.0),
                Complex::new(1.0, -1.0),
                Complex::new(1.0, 1.0),
                Complex::new(3.0, 0.0),
            ],
        );
        let mut a = h.clone();
        cholesky(Uplo::Lower, &mut a).unwrap();
        let l = a.lower_triangle();
        assert!(max_abs_diff(&(&l * l.adjoint()), &h) < 1e-12);

        cholesky_inv(Uplo::Lower, &mut a).unwrap();
        let inv = h.clone().try_inverse().unwrap();
        assert!((a[(1, 0)] - inv[(1, 0)]).modulus() < 1e-12);
        assert!((a[(1, 1)] - inv[(1, 1)]).modulus() < 1e-12);
    }

    #[test]
    fn test_lu_and_inverse() {
        let a0 = DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 3.0, 0.5, 2.0],
        );
        let mut a = a0.clone();
        let mut ipiv = [0_i32; 3];
        lu(&mut a, &mut ipiv).unwrap();
        // the largest entry of column 1 sits on row 3
        assert_eq!(ipiv[0], 3);
        assert!(ipiv.iter().all(|&p| p >= 1 && p <= 3));

        lu_inv(&mut a, &ipiv).unwrap();
        let prod = &a0 * &a;
        assert!(max_abs_diff(&prod, &DMatrix::identity(3, 3)) < 1e-12);
    }

    #[test]
    fn test_lu_with_scratch_complex() {
        let a0 = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex::new(1.0, 1.0),
                Complex::new(2.0, 0.0),
                Complex::new(0.0, -1.0),
                Complex::new(3.0, 2.0),
            ],
        );
        let mut a = a0.clone();
        let ipiv = lu_with_scratch(&mut a).unwrap();
        lu_inv(&mut a, &ipiv).unwrap();
        let prod = &a0 * &a;
        assert!(max_abs_diff(&prod, &DMatrix::identity(2, 2)) < 1e-12);
    }

    #[test]
    fn test_lu_singular() {
        let mut a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let err = lu_with_scratch(&mut a).unwrap_err();
        assert_eq!(err, LinalgError::Singular { routine: "lu", info: 2 });
    }

    #[test]
    fn test_lu_bad_pivot_buffer() {
        let mut a = DMatrix::<f64>::identity(3, 3);
        let mut ipiv = [0_i32; 2];
        let err = lu(&mut a, &mut ipiv).unwrap_err();
        assert!(err.info() < 0);
    }

    #[test]
    fn test_hermitian_eigen_sorted() {
        let s = random_spd(6);
        let mut v = s.clone();
        let w = hermitian_eigen(&mut v).unwrap();
        assert!(w.windows(2).all(|p| p[0] <= p[1]));
        for (k, &lambda) in w.iter().enumerate() {
            let col = v.column(k);
            let r = &s * col - col * lambda;
            assert!(r.norm() < 1e-10, "eigenpair {} residual {}", k, r.norm());
        }
        assert!(max_abs_diff(&(v.transpose() * &v), &DMatrix::identity(6, 6)) < 1e-10);
    }

    #[test]
    fn test_gemm_transpose_flags() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 1.0, 1.0]);
        let mut c = DMatrix::from_element(3, 2, 7.0);
        gemm(Op::Trans, Op::NoTrans, 2.0, &a, &b, 0.0, &mut c).unwrap();
        let expected = 2.0 * a.transpose() * &b;
        assert!(max_abs_diff(&c, &expected) < 1e-14);

        let mut wrong = DMatrix::zeros(2, 2);
        assert!(gemm(Op::Trans, Op::NoTrans, 1.0, &a, &b, 0.0, &mut wrong).is_err());
    }

    #[test]
    fn test_gemm_conj_trans() {
        let a = DMatrix::from_row_slice(1, 1, &[Complex::new(1.0, 2.0)]);
        let mut c = DMatrix::from_element(1, 1, Complex::new(1.0, 0.0));
        gemm(
            Op::ConjTrans,
            Op::NoTrans,
            Complex::new(1.0, 0.0),
            &a,
            &a,
            Complex::new(1.0, 0.0),
            &mut c,
        )
        .unwrap();
        assert!((c[(0, 0)] - Complex::new(6.0, 0.0)).modulus() < 1e-14);
    }

    #[test]
    fn test_set_mat_strided_block() {
        // copy the leading 2x2 block of a 3x3 source into a 4x4 target
        let a: Vec<f64> = (0..9).map(|x| x as f64).collect();
        let mut b = vec![-1.0; 16];
        set_mat(2, 2, 2.0, &a, 3, &mut b, 4).unwrap();
        assert_eq!(&b[0..4], &[0.0, 2.0, -1.0, -1.0]);
        assert_eq!(&b[4..8], &[6.0, 8.0, -1.0, -1.0]);
        assert!(b[8..].iter().all(|&x| x == -1.0));
    }

    #[test]
    fn test_set_mat_re_im() {
        let re = [1.0, 2.0];
        let im = [3.0, 4.0];
        let mut b = vec![Complex::new(9.0, 9.0); 2];
        set_mat_re(2, 1, 1.0, &re, 2, &mut b, 2).unwrap();
        assert_eq!(b[0], Complex::new(1.0, 9.0));
        set_mat_im(2, 1, -1.0, &im, 2, &mut b, 2).unwrap();
        assert_eq!(b[1], Complex::new(2.0, -4.0));

        let mut real = vec![5.0, 6.0];
        set_mat_im(2, 1, 1.0, &im, 2, &mut real, 2).unwrap();
        assert_eq!(real, vec![5.0, 6.0]);
    }

    #[test]
    fn test_set_mat_rejects_short_buffer() {
        let a = [1.0; 3];
        let mut b = [0.0; 4];
        let err = set_mat(2, 2, 1.0, &a, 2, &mut b, 2).unwrap_err();
        assert_eq!(err.info(), -4);
    }
}
