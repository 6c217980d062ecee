//! Basis set loading utilities

use basis::cgto::ElementBasis;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Fetch the `name` basis for one element, from `<dir>/<name>.<symbol>.nwchem`
/// when present and from the Basis Set Exchange otherwise.
pub fn fetch_basis(name: &str, dir: &str, atomic_symbol: &str) -> Result<ElementBasis> {
    let name = name.to_lowercase();
    let local_path = Path::new(dir).join(format!(
        "{}.{}.nwchem",
        name,
        atomic_symbol.to_lowercase()
    ));

    let basis_str = if local_path.exists() {
        debug!("Loading basis from local file: {}", local_path.display());
        fs::read_to_string(&local_path).wrap_err_with(|| {
            format!("Failed to read local basis set file: {}", local_path.display())
        })?
    } else {
        let url = format!(
            "https://www.basissetexchange.org/api/basis/{}/format/nwchem?elements={}",
            name, atomic_symbol
        );
        info!("Fetching {} basis for {} from {}", name, atomic_symbol, url);
        reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .wrap_err_with(|| format!("Failed to fetch basis set for {}", atomic_symbol))?
            .text()
            .wrap_err("Failed to get response text from basis set API")?
    };

    let parsed = ElementBasis::parse_nwchem(&basis_str)
        .wrap_err_with(|| format!("Invalid {} basis for {}", name, atomic_symbol))?;
    if !parsed.symbol.eq_ignore_ascii_case(atomic_symbol) {
        return Err(eyre!(
            "Basis file for {} describes element {}",
            atomic_symbol,
            parsed.symbol
        ));
    }
    Ok(parsed)
}
