//! AO one-electron matrices of a molecule: overlap, multipoles, kinetic,
//! nuclear attraction, the core Hamiltonian and the orthonormalizing pair.

use crate::integrals::{one_e_driver, IntegralError, OneBodyEngine, Operator, DEFAULT_PRECISION};
use crate::molecule::Molecule;
use crate::ortho::{compute_ortho, OrthoError, OrthoPair, OrthoType, DEFAULT_LINEAR_DEPENDENCE_THRESHOLD};
use basis::basis::BasisSet;
use nalgebra::{DMatrix, Vector3};
use rayon::prelude::*;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

const CHUNK: usize = 4096;

#[derive(Debug, Clone)]
pub struct IntegralSettings {
    pub ortho_type: OrthoType,
    pub screening_threshold: f64,
    pub linear_dependence_threshold: f64,
    /// number of core-Hamiltonian components (1 for a scalar reference)
    pub n_components: usize,
}

impl Default for IntegralSettings {
    fn default() -> Self {
        Self {
            ortho_type: OrthoType::default(),
            screening_threshold: DEFAULT_PRECISION,
            linear_dependence_threshold: DEFAULT_LINEAR_DEPENDENCE_THRESHOLD,
            n_components: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AOIntegralsError {
    Integral(IntegralError),
    Ortho(OrthoError),
}

impl fmt::Display for AOIntegralsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AOIntegralsError::Integral(e) => write!(f, "{}", e),
            AOIntegralsError::Ortho(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AOIntegralsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AOIntegralsError::Integral(e) => Some(e),
            AOIntegralsError::Ortho(e) => Some(e),
        }
    }
}

impl From<IntegralError> for AOIntegralsError {
    fn from(e: IntegralError) -> Self {
        AOIntegralsError::Integral(e)
    }
}

impl From<OrthoError> for AOIntegralsError {
    fn from(e: OrthoError) -> Self {
        AOIntegralsError::Ortho(e)
    }
}

#[derive(Debug, Clone)]
pub struct AOIntegrals {
    pub settings: IntegralSettings,
    pub n_basis: usize,
    pub overlap: DMatrix<f64>,
    /// x, y, z
    pub dipole: Vec<DMatrix<f64>>,
    /// xx, xy, xz, yy, yz, zz
    pub quadrupole: Vec<DMatrix<f64>>,
    /// xxx, xxy, xxz, xyy, xyz, xzz, yyy, yyz, yzz, zzz
    pub octupole: Vec<DMatrix<f64>>,
    pub kinetic: DMatrix<f64>,
    pub potential: DMatrix<f64>,
    pub core_h: Vec<DMatrix<f64>>,
    pub ortho1: DMatrix<f64>,
    pub ortho2: DMatrix<f64>,
}

impl AOIntegrals {
    pub fn new(settings: IntegralSettings) -> Self {
        let empty = DMatrix::zeros(0, 0);
        Self {
            settings,
            n_basis: 0,
            overlap: empty.clone(),
            dipole: Vec::new(),
            quadrupole: Vec::new(),
            octupole: Vec::new(),
            kinetic: empty.clone(),
            potential: empty.clone(),
            core_h: Vec::new(),
            ortho1: empty.clone(),
            ortho2: empty,
        }
    }

    fn engine(&self, op: Operator, basis: &BasisSet) -> Result<OneBodyEngine, IntegralError> {
        let mut engine = OneBodyEngine::new(op, basis.max_prim, basis.max_l)?;
        engine.set_precision(self.settings.screening_threshold);
        Ok(engine)
    }

    /// Compute every one-electron matrix for `basis` in the field of the
    /// nuclei of `molecule`, then the orthonormalizing pair.
    pub fn compute_ao_one_e(
        &mut self,
        basis: &BasisSet,
        molecule: &Molecule,
    ) -> Result<(), AOIntegralsError> {
        let start = Instant::now();
        self.n_basis = basis.n_basis;
        info!(
            "Computing one-electron integrals: {} shells, {} basis functions",
            basis.n_shells(),
            basis.n_basis
        );

        // overlap and multipoles up to octupole in one pass
        let mut multipoles = one_e_driver(&self.engine(Operator::EMultipole3, basis)?, &basis.shells)?;
        self.octupole = multipoles.split_off(10);
        self.quadrupole = multipoles.split_off(4);
        self.dipole = multipoles.split_off(1);
        self.overlap = multipoles.remove(0);
        debug!("overlap and multipole matrices done ({:.2?})", start.elapsed());

        self.kinetic = one_e_driver(&self.engine(Operator::Kinetic, basis)?, &basis.shells)?.remove(0);
        debug!("kinetic matrix done ({:.2?})", start.elapsed());

        let mut nuclear = self.engine(Operator::Nuclear, basis)?;
        nuclear.set_point_charges(molecule.point_charges());
        self.potential = one_e_driver(&nuclear, &basis.shells)?.remove(0);
        debug!("nuclear attraction matrix done ({:.2?})", start.elapsed());

        self.core_h = self.form_core_hamiltonian();
        info!("One-electron integrals finished in {:.2?}", start.elapsed());

        self.compute_ortho()?;
        Ok(())
    }

    // H[0] = T + V, the remaining components are zero
    fn form_core_hamiltonian(&self) -> Vec<DMatrix<f64>> {
        let n = self.n_basis;
        let mut h = DMatrix::zeros(n, n);
        h.as_mut_slice()
            .par_chunks_mut(CHUNK)
            .zip(self.kinetic.as_slice().par_chunks(CHUNK))
            .zip(self.potential.as_slice().par_chunks(CHUNK))
            .for_each(|((h, t), v)| {
                for ((h, t), v) in h.iter_mut().zip(t).zip(v) {
                    *h = t + v;
                }
            });

        let mut core_h = Vec::with_capacity(self.settings.n_components.max(1));
        core_h.push(h);
        for _ in 1..self.settings.n_components {
            core_h.push(DMatrix::zeros(n, n));
        }
        core_h
    }

    /// Rebuild ortho1/ortho2 from the current overlap matrix.
    pub fn compute_ortho(&mut self) -> Result<(), OrthoError> {
        let start = Instant::now();
        let OrthoPair { ortho1, ortho2 } = compute_ortho(
            &self.overlap,
            self.settings.ortho_type,
            self.settings.linear_dependence_threshold,
        )?;
        self.ortho1 = ortho1;
        self.ortho2 = ortho2;
        info!(
            "{} orthogonalization finished in {:.2?}",
            self.settings.ortho_type,
            start.elapsed()
        );
        Ok(())
    }

    pub fn ortho_pair(&self) -> OrthoPair {
        OrthoPair {
            ortho1: self.ortho1.clone(),
            ortho2: self.ortho2.clone(),
        }
    }

    /// Electric dipole moment (atomic units, about the origin) of the
    /// electron density `density` plus the nuclei.
    pub fn dipole_moment(&self, density: &DMatrix<f64>, molecule: &Molecule) -> Vector3<f64> {
        let electronic = Vector3::from_fn(|axis, _| -density.dot(&self.dipole[axis]));
        electronic + molecule.nuclear_dipole()
    }
}
