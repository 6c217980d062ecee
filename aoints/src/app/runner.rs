use crate::config::{Args, Config};
use ::basis::basis::BasisSet;
use aoints::guess::{form_guess, GuessType, RestrictedOrbitals};
use aoints::hamiltonian::{AOIntegrals, IntegralSettings};
use aoints::molecule::Molecule;
use aoints::ortho::{OrthoCheck, OrthoType};
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::DMatrix;
use tracing::{info, warn};

const VERIFY_TOLERANCE: f64 = 1.0e-8;

/// Compute the one-electron matrices and the orthonormalizing pair, and
/// optionally check the pair.
pub fn run_integrals(
    basis: &BasisSet,
    molecule: &Molecule,
    args: &Args,
    config: &Config,
) -> Result<(AOIntegrals, Vec<OrthoCheck>)> {
    let params = config.integral_params();

    if let Some(n) = args.num_threads.or(params.num_threads) {
        info!("Using {} worker threads", n);
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .wrap_err("Failed to configure the worker thread pool")?;
    }

    let settings = IntegralSettings {
        ortho_type: args
            .ortho_type
            .or(params.ortho_type)
            .unwrap_or(OrthoType::Cholesky),
        screening_threshold: params
            .screening_threshold
            .unwrap_or(IntegralSettings::default().screening_threshold),
        linear_dependence_threshold: params
            .linear_dependence_threshold
            .unwrap_or(IntegralSettings::default().linear_dependence_threshold),
        n_components: 1,
    };
    info!(
        "Integral settings: ortho = {}, screening = {:.1e}, linear dependence = {:.1e}",
        settings.ortho_type, settings.screening_threshold, settings.linear_dependence_threshold
    );

    let mut ints = AOIntegrals::new(settings);
    ints.compute_ao_one_e(basis, molecule)
        .wrap_err("One-electron integral evaluation failed")?;

    let checks = if args.verify_ortho || params.verify_ortho.unwrap_or(false) {
        let checks =
            ints.ortho_pair()
                .verify(&ints.overlap, ints.settings.ortho_type, VERIFY_TOLERANCE);
        if checks.iter().any(|c| !c.passed) {
            warn!("Orthogonalization check failed");
        }
        checks
    } else {
        Vec::new()
    };

    Ok((ints, checks))
}

/// Form the starting Fock matrices and the first closed-shell orbitals.
pub fn run_guess(
    guess: GuessType,
    ints: &AOIntegrals,
    molecule: &Molecule,
) -> Result<(Vec<DMatrix<f64>>, RestrictedOrbitals)> {
    let n_electrons = molecule.n_electrons();
    if n_electrons % 2 != 0 {
        return Err(eyre!(
            "Closed-shell guess needs an even electron count, got {}",
            n_electrons
        ));
    }

    let n = ints.n_basis;
    let mut fock = vec![DMatrix::zeros(n, n); ints.core_h.len()];
    let mut orbitals = RestrictedOrbitals::new(ints.ortho1.clone(), n_electrons);
    form_guess(guess, &mut fock, &ints.core_h, &mut orbitals)
        .wrap_err_with(|| format!("Failed to form the {} guess", guess))?;
    Ok((fock, orbitals))
}
