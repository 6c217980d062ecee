use ::basis::basis::BasisSet;
use aoints::guess::RestrictedOrbitals;
use aoints::hamiltonian::AOIntegrals;
use aoints::molecule::Molecule;
use aoints::ortho::OrthoCheck;
use nalgebra::DMatrix;
use tracing::info;

pub fn report_basis(name: &str, basis: &BasisSet, molecule: &Molecule) {
    info!("\nMolecule (bohr):");
    for (idx, atom) in molecule.atoms.iter().enumerate() {
        info!(
            "  Atom {:>2} {:>2}: [{:+.6}, {:+.6}, {:+.6}]",
            idx + 1,
            atom.symbol,
            atom.coords.x,
            atom.coords.y,
            atom.coords.z
        );
    }
    info!(
        "Charge {}, {} electrons",
        molecule.charge,
        molecule.n_electrons()
    );
    info!(
        "Basis {}: {} shells, {} functions, max l = {}, max primitives = {}",
        name,
        basis.n_shells(),
        basis.n_basis,
        basis.max_l,
        basis.max_prim
    );
}

pub fn report_integrals(ints: &AOIntegrals, molecule: &Molecule, checks: &[OrthoCheck]) {
    let n = ints.n_basis;
    let min_overlap_diag = ints.overlap.diagonal().min();
    info!("\nOne-electron integrals ({} x {})", n, n);
    info!("  min overlap diagonal: {:.10}", min_overlap_diag);
    info!("  tr(T) = {:.10}", ints.kinetic.trace());
    info!("  tr(V) = {:.10}", ints.potential.trace());
    info!("  Nuclear repulsion: {:.10} au", molecule.nuclear_repulsion());

    if !checks.is_empty() {
        info!("\n{} orthogonalization checks:", ints.settings.ortho_type);
        for check in checks {
            info!(
                "  {:<32} max error {:.3e} {}",
                check.name,
                check.max_error,
                if check.passed { "ok" } else { "FAILED" }
            );
        }
    }
}

pub fn report_guess(
    ints: &AOIntegrals,
    molecule: &Molecule,
    fock: &[DMatrix<f64>],
    orbitals: &RestrictedOrbitals,
) {
    info!("\nCore Hamiltonian guess orbital energies:");
    for (i, energy) in orbitals.energies.iter().enumerate() {
        let occ = if i < orbitals.n_occupied { 2 } else { 0 };
        info!("  Level {:>3}: {:>14.8} au  occ {}", i + 1, energy, occ);
    }

    let electronic = orbitals.electronic_energy(&ints.core_h[0], &fock[0]);
    let nuclear = molecule.nuclear_repulsion();
    info!("\nGuess electronic energy: {:.10} au", electronic);
    info!("Guess total energy:      {:.10} au", electronic + nuclear);

    let dipole = ints.dipole_moment(&orbitals.density, molecule);
    info!(
        "Guess dipole moment (au): [{:+.6}, {:+.6}, {:+.6}] |mu| = {:.6}",
        dipole.x,
        dipole.y,
        dipole.z,
        dipole.norm()
    );
}
