#![allow(non_snake_case)]
extern crate nalgebra as na;

use crate::basis::Basis;
use crate::helper::{binomial, boys_function};
use itertools::iproduct;
use na::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO1d {
    pub alpha: f64,
    pub l: i32,
    pub center: f64,
    pub norm: f64,
}

fn factorial(n: i32) -> f64 {
    (1..=n).fold(1.0, |acc, x| acc * x as f64)
}

impl GTO1d {
    pub fn new(alpha: f64, l: i32, center: f64) -> Self {
        let norm = GTO1d::compute_norm(alpha, l);
        Self {
            alpha,
            l,
            center,
            norm,
        }
    }

    fn compute_norm(alpha: f64, l: i32) -> f64 {
        let pi = std::f64::consts::PI;

        // N^2 = (2^(3l) * l! * alpha^l * sqrt(2 alpha / pi)) / (2l)!
        let numerator = 2.0_f64.powi(3 * l) * factorial(l) * alpha.powi(l);
        let denominator = factorial(2 * l);
        let factor = (2.0 * alpha / pi).sqrt();

        (numerator * factor / denominator).sqrt()
    }

    pub(crate) fn evaluate(&self, x: f64) -> f64 {
        let x = x - self.center;
        self.norm * x.powi(self.l) * (-self.alpha * x.powi(2)).exp()
    }

    /// Hermite expansion coefficients E^{ij}_t of the Gaussian product
    /// (x-A)^i (x-B)^j exp(-a (x-A)^2 - b (x-B)^2), with `Qx = A - B`.
    pub fn Eab(i: i32, j: i32, t: i32, Qx: f64, a: f64, b: f64) -> f64 {
        let p = a + b;
        let q = a * b / p;

        if t < 0 || t > i + j || i < 0 || j < 0 {
            0.0
        } else if i == 0 && j == 0 && t == 0 {
            (-q * Qx.powi(2)).exp()
        } else if j == 0 {
            GTO1d::Eab(i - 1, j, t - 1, Qx, a, b) / (2.0 * p)
                - GTO1d::Eab(i - 1, j, t, Qx, a, b) * q * Qx / a
                + GTO1d::Eab(i - 1, j, t + 1, Qx, a, b) * ((t + 1) as f64)
        } else {
            GTO1d::Eab(i, j - 1, t - 1, Qx, a, b) / (2.0 * p)
                + GTO1d::Eab(i, j - 1, t, Qx, a, b) * q * Qx / b
                + GTO1d::Eab(i, j - 1, t + 1, Qx, a, b) * ((t + 1) as f64)
        }
    }

    // overlap integral
    pub(crate) fn Sab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha) * (PI / p).sqrt() * a.norm * b.norm
    }

    /// Cartesian moment <a| (x - origin)^e |b>. The moment is re-expanded around
    /// the center of `b`, so each term is an overlap with a raised `b` exponent.
    pub(crate) fn Mab(a: &GTO1d, b: &GTO1d, e: i32, origin: f64) -> f64 {
        if e == 0 {
            return GTO1d::Sab(a, b);
        }
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        let shift = b.center - origin;

        let val: f64 = (0..=e)
            .map(|k| {
                binomial(e, k)
                    * shift.powi(e - k)
                    * GTO1d::Eab(a.l, b.l + k, 0, Qx, a.alpha, b.alpha)
            })
            .sum();

        val * (PI / p).sqrt() * a.norm * b.norm
    }

    // for test only
    pub fn laplacian(&self, x: f64) -> f64 {
        let x = x - self.center;
        let l = self.l as f64;
        let term1 = if self.l >= 2 {
            l * (l - 1.0) * x.powi(self.l - 2)
        } else {
            0.0
        };
        let term2 = -2.0 * self.alpha * (2.0 * l + 1.0) * x.powi(self.l);
        let term3 = 4.0 * self.alpha.powi(2) * x.powi(self.l + 2);
        self.norm * (term1 + term2 + term3) * (-self.alpha * x.powi(2)).exp()
    }

    // kinetic integral, -1/2 <a|d^2/dx^2|b>
    pub(crate) fn Tab(a: &GTO1d, b: &GTO1d) -> f64 {
        let p = a.alpha + b.alpha;
        let Qx = a.center - b.center;
        let norm = a.norm * b.norm * (PI / p).sqrt();

        let term1 =
            b.l as f64 * (b.l as f64 - 1.0) * GTO1d::Eab(a.l, b.l - 2, 0, Qx, a.alpha, b.alpha);
        let term2 = -2.0
            * b.alpha
            * (2.0 * b.l as f64 + 1.0)
            * GTO1d::Eab(a.l, b.l, 0, Qx, a.alpha, b.alpha);
        let term3 = 4.0 * b.alpha.powi(2) * GTO1d::Eab(a.l, b.l + 2, 0, Qx, a.alpha, b.alpha);

        -0.5 * norm * (term1 + term2 + term3)
    }
}

/// Normalized Cartesian primitive x^lx y^ly z^lz exp(-alpha r^2) about `center`.
#[derive(Debug, Serialize, Deserialize, Copy, Clone)]
pub struct GTO {
    pub alpha: f64,
    pub l_xyz: Vector3<i32>,
    pub center: Vector3<f64>,
    pub norm: f64,
    pub gto1d: [GTO1d; 3],
}

impl GTO {
    pub fn new(alpha: f64, l_xyz: Vector3<i32>, center: Vector3<f64>) -> Self {
        let gto1d = [
            GTO1d::new(alpha, l_xyz.x, center.x),
            GTO1d::new(alpha, l_xyz.y, center.y),
            GTO1d::new(alpha, l_xyz.z, center.z),
        ];
        let norm = gto1d[0].norm * gto1d[1].norm * gto1d[2].norm;
        Self {
            alpha,
            l_xyz,
            center,
            norm,
            gto1d,
        }
    }

    pub fn laplacian(&self, r: &Vector3<f64>) -> f64 {
        let laplacian_x = self.gto1d[0].laplacian(r.x);
        let laplacian_y = self.gto1d[1].laplacian(r.y);
        let laplacian_z = self.gto1d[2].laplacian(r.z);

        laplacian_x * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
            + self.gto1d[0].evaluate(r.x) * laplacian_y * self.gto1d[2].evaluate(r.z)
            + self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * laplacian_z
    }

    /// Computes the Coulomb auxiliary Hermite integrals R^n_{tuv}.
    ///
    /// # Arguments
    ///
    /// * `t, u, v` - Orders of the Coulomb Hermite derivative in x, y, z directions, respectively
    /// * `n` - Order of the Boys function
    /// * `p` - Exponent of the Gaussian product distribution
    /// * `PCx, PCy, PCz` - Cartesian components of P - C
    /// * `RPC` - Distance between P and C
    ///
    /// Recursion from Helgaker, Jørgensen, and Olsen, eq. 9.9.18-9.9.20.
    pub fn hermite_coulomb(
        t: i32, u: i32, v: i32,
        n: i32, p: f64,
        PCx: f64, PCy: f64, PCz: f64, RPC: f64,
    ) -> f64 {
        let T = p * RPC * RPC;
        let mut val = 0.0;

        if t == 0 && u == 0 && v == 0 {
            val += (-2.0 * p).powi(n) * boys_function(n, T);
        } else if t == 0 && u == 0 {
            if v > 1 {
                val += (v as f64 - 1.0)
                    * GTO::hermite_coulomb(t, u, v - 2, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCz * GTO::hermite_coulomb(t, u, v - 1, n + 1, p, PCx, PCy, PCz, RPC);
        } else if t == 0 {
            if u > 1 {
                val += (u as f64 - 1.0)
                    * GTO::hermite_coulomb(t, u - 2, v, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCy * GTO::hermite_coulomb(t, u - 1, v, n + 1, p, PCx, PCy, PCz, RPC);
        } else {
            if t > 1 {
                val += (t as f64 - 1.0)
                    * GTO::hermite_coulomb(t - 2, u, v, n + 1, p, PCx, PCy, PCz, RPC);
            }
            val += PCx * GTO::hermite_coulomb(t - 1, u, v, n + 1, p, PCx, PCy, PCz, RPC);
        }

        val
    }
}

impl Basis for GTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.gto1d[0].evaluate(r.x) * self.gto1d[1].evaluate(r.y) * self.gto1d[2].evaluate(r.z)
    }

    fn Sab(a: &GTO, b: &GTO) -> f64 {
        GTO1d::Sab(&a.gto1d[0], &b.gto1d[0])
            * GTO1d::Sab(&a.gto1d[1], &b.gto1d[1])
            * GTO1d::Sab(&a.gto1d[2], &b.gto1d[2])
    }

    fn Tab(a: &GTO, b: &GTO) -> f64 {
        let sx = GTO1d::Sab(&a.gto1d[0], &b.gto1d[0]);
        let sy = GTO1d::Sab(&a.gto1d[1], &b.gto1d[1]);
        let sz = GTO1d::Sab(&a.gto1d[2], &b.gto1d[2]);

        GTO1d::Tab(&a.gto1d[0], &b.gto1d[0]) * sy * sz
            + GTO1d::Tab(&a.gto1d[1], &b.gto1d[1]) * sx * sz
            + GTO1d::Tab(&a.gto1d[2], &b.gto1d[2]) * sx * sy
    }

    fn Mab(a: &GTO, b: &GTO, order: Vector3<i32>, origin: Vector3<f64>) -> f64 {
        GTO1d::Mab(&a.gto1d[0], &b.gto1d[0], order.x, origin.x)
            * GTO1d::Mab(&a.gto1d[1], &b.gto1d[1], order.y, origin.y)
            * GTO1d::Mab(&a.gto1d[2], &b.gto1d[2], order.z, origin.z)
    }

    fn Vab(a: &GTO, b: &GTO, C: Vector3<f64>, charge: f64) -> f64 {
        let p = a.alpha + b.alpha;
        let P = (a.center * a.alpha + b.center * b.alpha) / p;
        let l_sum = a.l_xyz + b.l_xyz;
        let dr = P - C;
        let rpc = dr.norm();
        let dab = a.center - b.center;

        // the caller already parallelizes over shell pairs, so this stays serial
        let val: f64 = iproduct!(0..=l_sum.x, 0..=l_sum.y, 0..=l_sum.z)
            .map(|(t, u, v)| {
                let eab_x = GTO1d::Eab(a.l_xyz.x, b.l_xyz.x, t, dab.x, a.alpha, b.alpha);
                let eab_y = GTO1d::Eab(a.l_xyz.y, b.l_xyz.y, u, dab.y, a.alpha, b.alpha);
                let eab_z = GTO1d::Eab(a.l_xyz.z, b.l_xyz.z, v, dab.z, a.alpha, b.alpha);

                eab_x * eab_y * eab_z * GTO::hermite_coulomb(t, u, v, 0, p, dr.x, dr.y, dr.z, rpc)
            })
            .sum();

        // attraction between an electron and a positive point charge
        -a.norm * b.norm * val * 2.0 * PI * charge / p
    }
}
