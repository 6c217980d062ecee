use crate::io::fetch_basis;
use ::basis::basis::BasisSet;
use ::basis::cgto::ElementBasis;
use aoints::molecule::Molecule;
use color_eyre::eyre::Result;
use std::collections::HashMap;
use tracing::info;

/// Source of per-element basis definitions.
pub trait BasisLoader {
    fn load(&self, name: &str, symbol: &str) -> Result<ElementBasis>;
}

/// NWChem-format files in a local directory, with a Basis Set Exchange
/// fallback.
pub struct NwchemLoader {
    dir: String,
}

impl NwchemLoader {
    pub fn new(dir: &str) -> Self {
        Self {
            dir: dir.to_string(),
        }
    }
}

impl BasisLoader for NwchemLoader {
    fn load(&self, name: &str, symbol: &str) -> Result<ElementBasis> {
        fetch_basis(name, &self.dir, symbol)
    }
}

/// Caches loaded element bases so every element is fetched once.
pub struct BasisRegistry<L: BasisLoader> {
    loader: L,
    cache: HashMap<String, ElementBasis>,
}

impl<L: BasisLoader> BasisRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
        }
    }

    /// Place the `name` shells of each element on its atoms, in atom order.
    pub fn build_basis_set(&mut self, name: &str, molecule: &Molecule) -> Result<BasisSet> {
        for atom in &molecule.atoms {
            if self.cache.contains_key(&atom.symbol) {
                continue;
            }
            info!("Loading {} basis for {}", name, atom.symbol);
            let basis = self.loader.load(name, &atom.symbol)?;
            self.cache.insert(atom.symbol.clone(), basis);
        }

        let centers: Vec<(&ElementBasis, _)> = molecule
            .atoms
            .iter()
            .filter_map(|atom| self.cache.get(&atom.symbol).map(|b| (b, atom.coords)))
            .collect();
        Ok(BasisSet::from_atoms(&centers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoints::molecule::Atom;
    use nalgebra::Vector3;
    use std::cell::Cell;

    const H_STO3G: &str = "H    S
      3.42525091             0.15432897
      0.62391373             0.53532814
      0.16885540             0.44463454
";

    struct CountingLoader {
        calls: Cell<usize>,
    }

    impl BasisLoader for CountingLoader {
        fn load(&self, _name: &str, _symbol: &str) -> Result<ElementBasis> {
            self.calls.set(self.calls.get() + 1);
            Ok(ElementBasis::parse_nwchem(H_STO3G)?)
        }
    }

    #[test]
    fn test_registry_loads_each_element_once() {
        let h2 = Molecule::new(
            vec![
                Atom::from_symbol("H", Vector3::zeros()).unwrap(),
                Atom::from_symbol("H", Vector3::new(0.0, 0.0, 1.4)).unwrap(),
            ],
            0,
        )
        .unwrap();
        let mut registry = BasisRegistry::new(CountingLoader {
            calls: Cell::new(0),
        });
        let basis = registry.build_basis_set("sto-3g", &h2).unwrap();

        assert_eq!(registry.loader.calls.get(), 1);
        assert_eq!(basis.n_basis, 2);
        assert_eq!(basis.shell_atoms, vec![0, 1]);
        assert_eq!(basis.shells[1].center, Vector3::new(0.0, 0.0, 1.4));
    }
}
