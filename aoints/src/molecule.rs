use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use std::fmt;

pub const ANGSTROM_TO_BOHR: f64 = 1.889_726_124_565_062;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub symbol: String,
    pub atomic_number: u32,
    /// position in bohr
    pub coords: Vector3<f64>,
}

impl Atom {
    pub fn new(element: &Element, coords: Vector3<f64>) -> Self {
        Self {
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            coords,
        }
    }

    pub fn from_symbol(symbol: &str, coords: Vector3<f64>) -> Option<Self> {
        Element::from_symbol(symbol).map(|e| Self::new(&e, coords))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoleculeError {
    NoAtoms,
    ChargeExceedsElectrons { nuclear: i64, charge: i32 },
}

impl fmt::Display for MoleculeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MoleculeError::NoAtoms => write!(f, "molecule has no atoms"),
            MoleculeError::ChargeExceedsElectrons { nuclear, charge } => write!(
                f,
                "charge {} leaves no electrons (total nuclear charge {})",
                charge, nuclear
            ),
        }
    }
}

impl std::error::Error for MoleculeError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub charge: i32,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>, charge: i32) -> Result<Self, MoleculeError> {
        if atoms.is_empty() {
            return Err(MoleculeError::NoAtoms);
        }
        let nuclear: i64 = atoms.iter().map(|a| a.atomic_number as i64).sum();
        if nuclear - (charge as i64) < 0 {
            return Err(MoleculeError::ChargeExceedsElectrons { nuclear, charge });
        }
        Ok(Self { atoms, charge })
    }

    /// (Z, position) of every nucleus, in atom order.
    pub fn point_charges(&self) -> Vec<(f64, Vector3<f64>)> {
        self.atoms
            .iter()
            .map(|a| (a.atomic_number as f64, a.coords))
            .collect()
    }

    pub fn n_electrons(&self) -> usize {
        let nuclear: i64 = self.atoms.iter().map(|a| a.atomic_number as i64).sum();
        (nuclear - self.charge as i64).max(0) as usize
    }

    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for (i, a) in self.atoms.iter().enumerate() {
            for b in &self.atoms[i + 1..] {
                let r = (a.coords - b.coords).norm();
                energy += (a.atomic_number * b.atomic_number) as f64 / r;
            }
        }
        energy
    }

    /// Nuclear contribution to the dipole moment about the origin.
    pub fn nuclear_dipole(&self) -> Vector3<f64> {
        self.atoms
            .iter()
            .map(|a| a.coords * a.atomic_number as f64)
            .sum()
    }
}
