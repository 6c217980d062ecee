use crate::config::{Config, Unit};
use aoints::molecule::{Atom, Molecule, ANGSTROM_TO_BOHR};
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::Vector3;
use tracing::info;

/// Build the molecule defined in the YAML configuration, converting the
/// coordinates to bohr.
pub fn build_molecule(config: &Config, charge: i32) -> Result<Molecule> {
    info!("Preparing geometry...");

    let scale = match config.unit.unwrap_or_default() {
        Unit::Bohr => 1.0,
        Unit::Angstrom => ANGSTROM_TO_BOHR,
    };

    let mut atoms = Vec::with_capacity(config.geometry.len());
    for atom in &config.geometry {
        let coords = Vector3::from(atom.coords) * scale;
        let atom = Atom::from_symbol(&atom.element, coords)
            .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
        atoms.push(atom);
    }

    Molecule::new(atoms, charge).wrap_err("Invalid molecule")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        serde_yml::from_str::<Config>(yaml).unwrap().with_defaults()
    }

    #[test]
    fn test_angstrom_coordinates_converted() {
        let cfg = config(
            r#"
geometry:
  - element: H
    coords: [0.0, 0.0, 0.0]
  - element: H
    coords: [0.0, 0.0, 0.74]
unit: angstrom
"#,
        );
        let mol = build_molecule(&cfg, 0).unwrap();
        assert_eq!(mol.atoms.len(), 2);
        assert!((mol.atoms[1].coords.z - 0.74 * ANGSTROM_TO_BOHR).abs() < 1e-12);
        assert_eq!(mol.n_electrons(), 2);
    }

    #[test]
    fn test_unknown_element_rejected() {
        let cfg = config(
            r#"
geometry:
  - element: Qq
    coords: [0.0, 0.0, 0.0]
"#,
        );
        assert!(build_molecule(&cfg, 0).is_err());
    }
}
