#![allow(non_snake_case)]
use libm::{erf, sqrt};
use nalgebra::Vector3;
use num_complex::Complex;
use rayon::prelude::*;

// Simpson's rule integration
pub fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

// Helper function to determine Simpson's weight for a given index and max index
fn simpson_weight(i: usize, n: usize) -> f64 {
    if i == 0 || i == n {
        1.0
    } else if i % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

/// Parallel Simpson's rule integration in 3D.
///
/// Integrates f(x,y,z) over the box defined by [a.x,b.x] x [a.y,b.y] x [a.z,b.z].
/// Uses Simpson's rule with nx, ny, nz subdivisions (adjusted up if not even).
pub fn simpson_integration_3d<F>(
    f: F,
    a: Vector3<f64>,
    b: Vector3<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
) -> f64
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    let nx = if nx % 2 == 0 { nx } else { nx + 1 };
    let ny = if ny % 2 == 0 { ny } else { ny + 1 };
    let nz = if nz % 2 == 0 { nz } else { nz + 1 };

    let hx = (b.x - a.x) / nx as f64;
    let hy = (b.y - a.y) / ny as f64;
    let hz = (b.z - a.z) / nz as f64;

    let sum: f64 = (0..=nx)
        .into_par_iter()
        .map(|i| {
            let x = a.x + i as f64 * hx;
            let wx = simpson_weight(i, nx);
            let mut acc = 0.0;
            for j in 0..=ny {
                let y = a.y + j as f64 * hy;
                let wy = simpson_weight(j, ny);
                for k in 0..=nz {
                    let z = a.z + k as f64 * hz;
                    acc += wx * wy * simpson_weight(k, nz) * f(x, y, z);
                }
            }
            acc
        })
        .sum();

    // (hx*hy*hz/27) * weighted sum
    sum * (hx * hy * hz) / 27.0
}

/// Binomial coefficient C(n, k) as a float.
pub fn binomial(n: i32, k: i32) -> f64 {
    if k < 0 || k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

// Compute the Boys function F_n(x) for n = 0..12.
// see the paper by Gregory Beylkin; Sandeep Sharma
// https://doi.org/10.1063/5.0062444
pub fn boys_function(n: i32, x: f64) -> f64 {
    let n = n as usize;
    assert!(n <= 12, "n must be between 0 and 12");
    assert!(x >= 0.0, "x must be nonnegative");

    let tol: f64 = 1.0e-3;
    let sqrtpio2: f64 = 0.886226925452758014;
    let t: [f64; 12] = [
        2.0,
        0.66666666666666663,
        0.4,
        0.2857142857142857,
        0.22222222222222221,
        0.18181818181818182,
        0.15384615384615385,
        0.13333333333333333,
        0.11764705882352941,
        0.10526315789473684,
        0.09523809523809523,
        0.08695652173913043,
    ];

    let zz: [Complex<f64>; 10] = [
        Complex::new(64.3040206523305, 182.43694739308491),
        Complex::new(64.3040206523305, -182.43694739308491),
        Complex::new(-12.572081889410178, 141.21366415342502),
        Complex::new(-12.572081889410178, -141.21366415342502),
        Complex::new(-54.103079551670268, 104.57909575828442),
        Complex::new(-54.103079551670268, -104.57909575828442),
        Complex::new(-78.720025594983341, 69.309284623985663),
        Complex::new(-78.720025594983341, -69.309284623985663),
        Complex::new(-92.069621609035313, 34.559308619699376),
        Complex::new(-92.069621609035313, -34.559308619699376),
    ];

    let fact: [Complex<f64>; 10] = [
        Complex::new(0.0013249210991966042, 0.00091787356295447745),
        Complex::new(0.0013249210991966042, -0.00091787356295447745),
        Complex::new(0.055545905103006735, -3.5151540664451613),
        Complex::new(0.055545905103006735, 3.5151540664451613),
        Complex::new(-114.56407675096416, 192.13789620924834),
        Complex::new(-114.56407675096416, -192.13789620924834),
        Complex::new(2091.5556220686653, -1582.5742912360638),
        Complex::new(2091.5556220686653, 1582.5742912360638),
        Complex::new(-9477.9394228935325, 3081.4443710192086),
        Complex::new(-9477.9394228935325, -3081.4443710192086),
    ];

    let ww: [Complex<f64>; 10] = [
        Complex::new(-8.3418049867878959e-9, -7.0958810331788253e-9),
        Complex::new(-8.3418050437598581e-9, 7.0958810084577824e-9),
        Complex::new(8.2436739552884774e-8, -2.7704117936134414e-7),
        Complex::new(8.2436739547688584e-8, 2.7704117938414886e-7),
        Complex::new(1.9838416382728666e-6, 7.8321058613942770e-7),
        Complex::new(1.9838416382681279e-6, -7.8321058613180811e-7),
        Complex::new(-4.7372729839268780e-6, 5.8076919074212929e-6),
        Complex::new(-4.7372729839287016e-6, -5.8076919074154416e-6),
        Complex::new(-6.8186014282131608e-6, -1.3515261354290787e-5),
        Complex::new(-6.8186014282138385e-6, 1.3515261354295612e-5),
    ];

    let rzz: f64 = -96.32193429034384;
    let rfact: f64 = 152478.44519077540;
    let rww: f64 = 1.8995875677635889e-5;

    let y = (-x).exp();
    let mut vals = [0.0_f64; 13];

    // large x: downward-free upward recursion from F_0
    if x.abs() >= 4.5425955121971775 {
        let yy = sqrt(x);
        vals[0] = sqrtpio2 * erf(yy) / yy;
        let yy = y / 2.0;
        for n_i in 1..=12 {
            vals[n_i] = ((n_i as f64 - 0.5) * vals[n_i - 1] - yy) / x;
        }
        return vals[n];
    }

    // small x: pole expansion for F_12, then downward recursion.
    // Only the real part of each conjugate-pair term survives.
    let mut rtmp = 0.0_f64;
    for k_i in (0..10).step_by(2) {
        let numerator_c = Complex::new(1.0, 0.0) - fact[k_i] * y;
        let denominator_c = Complex::new(x, 0.0) + zz[k_i];
        rtmp += ((ww[k_i] * numerator_c) / denominator_c).re;
    }

    let q = x + rzz;
    let tmp = if q.abs() >= tol {
        rww * ((1.0 - rfact * y) / q)
    } else {
        let p = 1.0 - q / 2.0 + (q * q) / 6.0 - (q * q * q) / 24.0 + (q * q * q * q) / 120.0;
        rww * p
    };

    vals[12] = 2.0 * rtmp + tmp;
    let yy = y / 2.0;
    for n_i in (0..12).rev() {
        vals[n_i] = (x * vals[n_i + 1] + yy) * t[n_i];
    }

    vals[n]
}
