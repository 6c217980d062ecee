#![allow(non_snake_case)]

use crate::basis::Basis;
use crate::gto::{GTO1d, GTO};
use crate::helper::*;
use nalgebra::Vector3;
use rand::Rng;

#[test]
fn test_gto1d_normalization() {
    for l in 0..=4 {
        let gto = GTO1d::new(1.3, l, 0.4);
        let integral = simpson_integration(|x| gto.evaluate(x).powi(2), -10.0, 10.0, 10_000);
        assert!(
            (integral - 1.0).abs() < 1e-8,
            "l = {}: integral is not close to 1: got {}",
            l,
            integral
        );
    }
}

#[test]
fn test_gto1d_overlap() {
    let gto1 = GTO1d::new(1.2, 1, 1.0);
    let gto2 = GTO1d::new(0.8, 2, 3.0);
    let integral = simpson_integration(|x| gto1.evaluate(x) * gto2.evaluate(x), -10.0, 12.0, 10_000);
    let overlap = GTO1d::Sab(&gto1, &gto2);
    assert!(
        (integral - overlap).abs() < 1e-8,
        "Overlap is not close to integral: got {}, expected {}",
        overlap,
        integral
    );
}

#[test]
fn test_gto_overlap() {
    let gto1 = GTO::new(1.2, Vector3::new(1, 0, 1), Vector3::new(0.0, 0.0, 0.0));
    let gto2 = GTO::new(0.8, Vector3::new(0, 1, 1), Vector3::new(0.5, 0.5, 0.5));
    let integrand =
        |x, y, z| gto1.evaluate(&Vector3::new(x, y, z)) * gto2.evaluate(&Vector3::new(x, y, z));

    let lower = Vector3::new(-8.0, -8.0, -8.0);
    let upper = Vector3::new(8.0, 8.0, 8.0);
    let integral = simpson_integration_3d(integrand, lower, upper, 100, 100, 100);
    let overlap = GTO::Sab(&gto1, &gto2);
    assert!(
        (integral - overlap).abs() < 1e-5,
        "Overlap is not close to integral: got {}, expected {}",
        overlap,
        integral
    );
    // symmetric in its arguments
    assert!((GTO::Sab(&gto2, &gto1) - overlap).abs() < 1e-14);
}

#[test]
fn test_gto1d_laplacian() {
    for l in 0..=3 {
        let gto = GTO1d::new(0.8, l, 1.0);
        let x = 1.7;
        let h = 1e-4;
        let numerical =
            (gto.evaluate(x + h) - 2.0 * gto.evaluate(x) + gto.evaluate(x - h)) / h.powi(2);
        let analytical = gto.laplacian(x);
        assert!(
            (numerical - analytical).abs() < 1e-5,
            "l = {}: Laplacian mismatch: numerical = {}, analytical = {}",
            l,
            numerical,
            analytical
        );
    }
}

fn check_gto1d_kinetic(alpha1: f64, l1: i32, center1: f64, alpha2: f64, l2: i32, center2: f64) {
    let gto1 = GTO1d::new(alpha1, l1, center1);
    let gto2 = GTO1d::new(alpha2, l2, center2);

    let integrand = |x: f64| -0.5 * gto1.evaluate(x) * gto2.laplacian(x);
    let integral = simpson_integration(integrand, -12.0, 12.0, 20_000);
    let kinetic = GTO1d::Tab(&gto1, &gto2);

    assert!(
        (integral - kinetic).abs() < 1e-7,
        "Kinetic integral is not close: got {}, expected {}, \
         params: alpha1={}, l1={}, center1={}, alpha2={}, l2={}, center2={}",
        kinetic,
        integral,
        alpha1,
        l1,
        center1,
        alpha2,
        l2,
        center2
    );
}

#[test]
fn test_gto1d_kinetic() {
    check_gto1d_kinetic(1.2, 0, 0.0, 0.8, 0, 1.0);
    check_gto1d_kinetic(1.2, 1, 0.0, 0.8, 0, 1.0);
    check_gto1d_kinetic(0.5, 2, -0.3, 0.9, 1, 0.6);
    check_gto1d_kinetic(2.0, 3, 0.2, 0.7, 2, -0.4);
}

#[test]
fn test_gto_kinetic_hermitian() {
    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let ca = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let cb = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let a = GTO::new(rng.gen_range(0.2..3.0), Vector3::new(1, 0, 2), ca);
        let b = GTO::new(rng.gen_range(0.2..3.0), Vector3::new(0, 2, 0), cb);
        let tab = GTO::Tab(&a, &b);
        let tba = GTO::Tab(&b, &a);
        assert!(
            (tab - tba).abs() < 1e-12,
            "kinetic integral not symmetric: {} vs {}",
            tab,
            tba
        );
    }
}

#[test]
fn test_gto1d_moment() {
    let gto1 = GTO1d::new(1.1, 1, 0.3);
    let gto2 = GTO1d::new(0.6, 2, -0.5);
    for e in 0..=3 {
        for &origin in &[0.0, 0.7] {
            let integrand = |x: f64| gto1.evaluate(x) * (x - origin).powi(e) * gto2.evaluate(x);
            let integral = simpson_integration(integrand, -12.0, 12.0, 20_000);
            let moment = GTO1d::Mab(&gto1, &gto2, e, origin);
            assert!(
                (integral - moment).abs() < 1e-8,
                "moment e = {}, origin = {}: got {}, expected {}",
                e,
                origin,
                moment,
                integral
            );
        }
    }
}

#[test]
fn test_gto_moment_zero_order_is_overlap() {
    let a = GTO::new(0.9, Vector3::new(1, 1, 0), Vector3::new(0.1, 0.2, 0.3));
    let b = GTO::new(1.4, Vector3::new(0, 0, 2), Vector3::new(-0.4, 0.0, 0.8));
    let m = GTO::Mab(&a, &b, Vector3::zeros(), Vector3::zeros());
    assert!((m - GTO::Sab(&a, &b)).abs() < 1e-14);
}

#[test]
fn test_gto_dipole_of_centered_s() {
    // <s|x|s> of a normalized s function is its center coordinate
    let center = Vector3::new(0.3, -1.2, 2.0);
    let s = GTO::new(0.7, Vector3::zeros(), center);
    for (axis, expected) in center.iter().enumerate() {
        let mut order = Vector3::zeros();
        order[axis] = 1;
        let m = GTO::Mab(&s, &s, order, Vector3::zeros());
        assert!(
            (m - expected).abs() < 1e-12,
            "axis {}: got {}, expected {}",
            axis,
            m,
            expected
        );
    }
}

#[test]
fn test_nuclear_attraction_s_at_center() {
    // <s|1/r|s> for a normalized s function about the charge: 2 sqrt(2 alpha / pi)
    let alpha = 0.9;
    let s = GTO::new(alpha, Vector3::zeros(), Vector3::zeros());
    let v = GTO::Vab(&s, &s, Vector3::zeros(), 1.0);
    let expected = -2.0 * (2.0 * alpha / std::f64::consts::PI).sqrt();
    assert!(
        (v - expected).abs() < 1e-10,
        "nuclear attraction: got {}, expected {}",
        v,
        expected
    );
}

#[test]
fn test_nuclear_attraction_far_charge() {
    // a distant point charge sees the product distribution as a point
    let a = GTO::new(1.1, Vector3::new(1, 0, 0), Vector3::new(0.0, 0.0, 0.0));
    let b = GTO::new(0.7, Vector3::new(1, 0, 0), Vector3::new(0.0, 0.0, 0.3));
    let c = Vector3::new(0.0, 40.0, 0.0);
    let charge = 3.0;
    let v = GTO::Vab(&a, &b, c, charge);
    let s = GTO::Sab(&a, &b);
    let expected = -charge * s / 40.0;
    assert!(
        (v - expected).abs() < 1e-4,
        "far-field attraction: got {}, expected {}",
        v,
        expected
    );
}

#[test]
fn test_nuclear_attraction_symmetric() {
    let a = GTO::new(1.3, Vector3::new(2, 0, 0), Vector3::new(0.0, 0.1, 0.0));
    let b = GTO::new(0.4, Vector3::new(0, 1, 1), Vector3::new(0.5, -0.2, 0.9));
    let c = Vector3::new(0.2, 0.3, -0.4);
    let vab = GTO::Vab(&a, &b, c, 1.0);
    let vba = GTO::Vab(&b, &a, c, 1.0);
    assert!(
        (vab - vba).abs() < 1e-12,
        "nuclear attraction not symmetric: {} vs {}",
        vab,
        vba
    );
}
