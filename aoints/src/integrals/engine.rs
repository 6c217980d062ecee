use super::operator::{multipole_powers, Operator};
use super::IntegralError;
use basis::basis::Basis;
use basis::gto::GTO;
use basis::shell::{Shell, MAX_L};
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Pairs whose magnitude estimate falls below this are skipped.
pub const DEFAULT_PRECISION: f64 = 1.0e-14;

/// Computes the integral block of one shell pair for a fixed operator.
///
/// An engine owns its output buffers, so each worker needs its own copy;
/// configure one template and clone it.
#[derive(Debug, Clone)]
pub struct OneBodyEngine {
    operator: Operator,
    max_l: i32,
    max_prim: usize,
    precision: f64,
    origin: Vector3<f64>,
    charges: Vec<(f64, Vector3<f64>)>,
    powers: Vec<Vector3<i32>>,
    // one row-major n1 x n2 block per component
    buffers: Vec<Vec<f64>>,
}

impl OneBodyEngine {
    pub fn new(operator: Operator, max_prim: usize, max_l: i32) -> Result<Self, IntegralError> {
        if !(0..=MAX_L).contains(&max_l) {
            return Err(IntegralError::UnsupportedAngularMomentum {
                l: max_l,
                max: MAX_L,
            });
        }
        let ncart = ((max_l + 1) * (max_l + 2) / 2) as usize;
        let powers = operator.multipole_order().map(multipole_powers).unwrap_or_default();
        let buffers = (0..operator.n_components())
            .map(|_| Vec::with_capacity(ncart * ncart))
            .collect();

        Ok(Self {
            operator,
            max_l,
            max_prim,
            precision: DEFAULT_PRECISION,
            origin: Vector3::zeros(),
            charges: Vec::new(),
            powers,
            buffers,
        })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn max_l(&self) -> i32 {
        self.max_l
    }

    pub fn max_prim(&self) -> usize {
        self.max_prim
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn set_precision(&mut self, precision: f64) {
        self.precision = precision.max(0.0);
    }

    /// Point charges (Z, position) seen by the nuclear operator.
    pub fn set_point_charges(&mut self, charges: Vec<(f64, Vector3<f64>)>) {
        self.charges = charges;
    }

    pub fn set_multipole_origin(&mut self, origin: Vector3<f64>) {
        self.origin = origin;
    }

    pub fn fits(&self, shell: &Shell) -> bool {
        shell.l <= self.max_l && shell.n_prim() <= self.max_prim
    }

    /// Magnitude estimate of the largest integral of the pair.
    ///
    /// Starts from the s-type Gaussian product prefactor of each primitive
    /// pair and scales it by the growth of the operator: angular factors
    /// (1 + sqrt(2p) R)^(la+lb), kinetic p (3 + 2 mu R^2), multipole
    /// (|P - O| + 1/sqrt(p) + 1)^order and nuclear 2 sqrt(p/pi) sum |Z|.
    pub fn estimate(&self, a: &Shell, b: &Shell) -> f64 {
        let r2 = (a.center - b.center).norm_squared();
        let r = r2.sqrt();
        let lsum = a.l + b.l;
        let zsum: f64 = self.charges.iter().map(|(z, _)| z.abs()).sum();

        let mut est: f64 = 0.0;
        for (&aa, ca) in a.exponents.iter().zip(&a.norm_coefficients) {
            for (&ab, cb) in b.exponents.iter().zip(&b.norm_coefficients) {
                let p = aa + ab;
                let mu = aa * ab / p;
                let na = (2.0 * aa / PI).powf(0.75);
                let nb = (2.0 * ab / PI).powf(0.75);
                let mut val = (ca * cb * na * nb).abs() * (PI / p).powf(1.5) * (-mu * r2).exp();
                val *= (1.0 + (2.0 * p).sqrt() * r).powi(lsum);

                match self.operator {
                    Operator::Kinetic => val *= (p * (3.0 + 2.0 * mu * r2)).max(1.0),
                    Operator::Nuclear => val *= (2.0 * (p / PI).sqrt()).max(1.0) * zsum,
                    op => {
                        if let Some(order) = op.multipole_order() {
                            let centre = (a.center * aa + b.center * ab) / p;
                            let reach = (centre - self.origin).norm() + 1.0 / p.sqrt() + 1.0;
                            val *= reach.powi(order);
                        }
                    }
                }
                est = est.max(val);
            }
        }
        est
    }

    /// Integral block for the pair (a, b): one row-major `a.size() x b.size()`
    /// block per operator component. `None` means the pair is negligible and
    /// nothing was computed.
    pub fn compute(&mut self, a: &Shell, b: &Shell) -> Option<&[Vec<f64>]> {
        if self.estimate(a, b) < self.precision {
            return None;
        }

        let (n1, n2) = (a.size(), b.size());
        for buf in self.buffers.iter_mut() {
            buf.clear();
            buf.resize(n1 * n2, 0.0);
        }

        for i in 0..n1 {
            for j in 0..n2 {
                let ij = i * n2 + j;
                match self.operator {
                    Operator::Kinetic => {
                        self.buffers[0][ij] = Shell::contract(a, i, b, j, GTO::Tab);
                    }
                    Operator::Nuclear => {
                        let charges = &self.charges;
                        self.buffers[0][ij] = Shell::contract(a, i, b, j, |ga, gb| {
                            charges
                                .iter()
                                .map(|(z, c)| GTO::Vab(ga, gb, *c, *z))
                                .sum()
                        });
                    }
                    _ => {
                        let origin = self.origin;
                        for (comp, power) in self.powers.iter().enumerate() {
                            self.buffers[comp][ij] = Shell::contract(a, i, b, j, |ga, gb| {
                                GTO::Mab(ga, gb, *power, origin)
                            });
                        }
                    }
                }
            }
        }

        Some(&self.buffers)
    }
}
