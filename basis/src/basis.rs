#![allow(non_snake_case)]
use crate::cgto::ElementBasis;
use crate::shell::Shell;
use nalgebra::Vector3;

/// One-electron integrals between two primitive functions.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;
    fn Sab(a: &Self, b: &Self) -> f64;
    fn Tab(a: &Self, b: &Self) -> f64;
    /// <a| (x-Ox)^i (y-Oy)^j (z-Oz)^k |b> with `order = (i, j, k)`.
    fn Mab(a: &Self, b: &Self, order: Vector3<i32>, origin: Vector3<f64>) -> f64;
    /// Attraction to a point charge `charge` located at `C`.
    fn Vab(a: &Self, b: &Self, C: Vector3<f64>, charge: f64) -> f64;
}

/// Ordered shell list of a molecule together with its indexing data.
#[derive(Debug, Clone)]
pub struct BasisSet {
    pub shells: Vec<Shell>,
    // first basis function of each shell
    pub shell_offsets: Vec<usize>,
    // atom index owning each shell
    pub shell_atoms: Vec<usize>,
    pub n_basis: usize,
    pub max_l: i32,
    pub max_prim: usize,
}

impl BasisSet {
    pub fn new(shells: Vec<Shell>, shell_atoms: Vec<usize>) -> Self {
        let mut shell_offsets = Vec::with_capacity(shells.len());
        let mut n_basis = 0;
        for sh in &shells {
            shell_offsets.push(n_basis);
            n_basis += sh.size();
        }
        let max_l = shells.iter().map(|s| s.l).max().unwrap_or(0);
        let max_prim = shells.iter().map(|s| s.n_prim()).max().unwrap_or(0);

        Self {
            shells,
            shell_offsets,
            shell_atoms,
            n_basis,
            max_l,
            max_prim,
        }
    }

    /// Place the element basis of every atom at its center, in atom order.
    pub fn from_atoms(atoms: &[(&ElementBasis, Vector3<f64>)]) -> Self {
        let mut shells = Vec::new();
        let mut shell_atoms = Vec::new();
        for (iatom, (element, center)) in atoms.iter().enumerate() {
            for sh in element.shells_at(*center) {
                shells.push(sh);
                shell_atoms.push(iatom);
            }
        }
        Self::new(shells, shell_atoms)
    }

    pub fn n_shells(&self) -> usize {
        self.shells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let c = Vector3::zeros();
        let shells = vec![
            Shell::new(0, vec![1.0], vec![1.0], c),
            Shell::new(1, vec![1.0, 0.3], vec![0.5, 0.5], c),
            Shell::new(2, vec![0.7], vec![1.0], c),
        ];
        let bs = BasisSet::new(shells, vec![0, 0, 1]);
        assert_eq!(bs.shell_offsets, vec![0, 1, 4]);
        assert_eq!(bs.n_basis, 10);
        assert_eq!(bs.max_l, 2);
        assert_eq!(bs.max_prim, 2);
    }
}
