#![allow(non_snake_case)]
use crate::gto::GTO;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Highest angular momentum the Boys tabulation supports for a shell pair.
pub const MAX_L: i32 = 6;

/// Cartesian exponents of a shell of angular momentum `l`, in the order
/// x^l, x^(l-1) y, x^(l-1) z, ..., z^l.
pub fn cartesian_components(l: i32) -> Vec<Vector3<i32>> {
    let mut comps = Vec::with_capacity(((l + 1) * (l + 2) / 2) as usize);
    for lx in (0..=l).rev() {
        for ly in (0..=l - lx).rev() {
            comps.push(Vector3::new(lx, ly, l - lx - ly));
        }
    }
    comps
}

/// A contracted Cartesian Gaussian shell.
///
/// All components share the exponents and contraction coefficients;
/// `norm_coefficients` are rescaled so every component has unit self-overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub l: i32,
    pub exponents: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub norm_coefficients: Vec<f64>,
    pub center: Vector3<f64>,
    pub components: Vec<Vector3<i32>>,
    // primitives[comp][k]
    pub primitives: Vec<Vec<GTO>>,
}

impl Shell {
    pub fn new(l: i32, exponents: Vec<f64>, coefficients: Vec<f64>, center: Vector3<f64>) -> Self {
        assert_eq!(
            exponents.len(),
            coefficients.len(),
            "every exponent needs a contraction coefficient"
        );

        let norm = Self::contraction_norm(l, &exponents, &coefficients);
        let norm_coefficients = coefficients.iter().map(|c| c * norm).collect();
        let components = cartesian_components(l);
        let primitives = components
            .iter()
            .map(|lxyz| {
                exponents
                    .iter()
                    .map(|&alpha| GTO::new(alpha, *lxyz, center))
                    .collect()
            })
            .collect();

        Self {
            l,
            exponents,
            coefficients,
            norm_coefficients,
            center,
            components,
            primitives,
        }
    }

    // Overlap of two unit-normalized primitives with the same center and total
    // angular momentum L is (2 sqrt(ai aj) / (ai + aj))^(L + 3/2) for every
    // Cartesian component, so one factor normalizes the whole shell.
    fn contraction_norm(l: i32, exponents: &[f64], coefficients: &[f64]) -> f64 {
        let power = l as f64 + 1.5;
        let mut self_overlap = 0.0;
        for (ai, ci) in exponents.iter().zip(coefficients) {
            for (aj, cj) in exponents.iter().zip(coefficients) {
                let ratio = 2.0 * (ai * aj).sqrt() / (ai + aj);
                self_overlap += ci * cj * ratio.powf(power);
            }
        }
        1.0 / self_overlap.sqrt()
    }

    /// Number of Cartesian functions, (l+1)(l+2)/2.
    pub fn size(&self) -> usize {
        ((self.l + 1) * (self.l + 2) / 2) as usize
    }

    pub fn n_prim(&self) -> usize {
        self.exponents.len()
    }

    /// Contract a primitive-pair functional over the primitives of component `ia`
    /// of `a` and component `ib` of `b`.
    pub fn contract<F>(a: &Shell, ia: usize, b: &Shell, ib: usize, f: F) -> f64
    where
        F: Fn(&GTO, &GTO) -> f64,
    {
        let mut val = 0.0;
        for (ga, ca) in a.primitives[ia].iter().zip(&a.norm_coefficients) {
            for (gb, cb) in b.primitives[ib].iter().zip(&b.norm_coefficients) {
                val += ca * cb * f(ga, gb);
            }
        }
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::Basis;

    #[test]
    fn test_component_order() {
        let d = cartesian_components(2);
        let expected = [
            [2, 0, 0],
            [1, 1, 0],
            [1, 0, 1],
            [0, 2, 0],
            [0, 1, 1],
            [0, 0, 2],
        ];
        assert_eq!(d.len(), 6);
        for (c, e) in d.iter().zip(expected.iter()) {
            assert_eq!([c.x, c.y, c.z], *e);
        }
        assert_eq!(cartesian_components(3).len(), 10);
        assert_eq!(cartesian_components(0)[0], Vector3::new(0, 0, 0));
    }

    #[test]
    fn test_every_component_normalized() {
        let shell = Shell::new(
            2,
            vec![2.5, 0.8, 0.2],
            vec![0.2, 0.5, 0.4],
            Vector3::new(0.1, -0.3, 0.7),
        );
        assert_eq!(shell.size(), 6);
        for comp in 0..shell.size() {
            let s = Shell::contract(&shell, comp, &shell, comp, GTO::Sab);
            assert!(
                (s - 1.0).abs() < 1e-12,
                "component {} self overlap = {}",
                comp,
                s
            );
        }
    }
}
