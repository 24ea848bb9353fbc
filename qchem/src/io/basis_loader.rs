//! Basis set loading utilities

use crate::error::{QchemError, Result};
use basis::cgto::BasisSet;
use basis::library;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const BSE_URL: &str = "https://www.basissetexchange.org/api/basis";

/// Anything that can produce the basis family of one element.
pub trait BasisLoader {
    fn load(&self, basis_name: &str, atomic_symbol: &str) -> Result<BasisSet>;
}

impl<L: BasisLoader + ?Sized> BasisLoader for &L {
    fn load(&self, basis_name: &str, atomic_symbol: &str) -> Result<BasisSet> {
        (**self).load(basis_name, atomic_symbol)
    }
}

/// Looks in the embedded library, then in local NWChem files, and finally
/// downloads from the Basis Set Exchange.
#[derive(Debug, Clone)]
pub struct NwchemBasisLoader {
    pub search_dirs: Vec<PathBuf>,
    pub allow_download: bool,
}

impl Default for NwchemBasisLoader {
    fn default() -> Self {
        NwchemBasisLoader {
            search_dirs: vec![PathBuf::from("basis_sets"), PathBuf::from("tests/basis_sets")],
            allow_download: true,
        }
    }
}

impl NwchemBasisLoader {
    /// Embedded data and local files only.
    pub fn offline() -> Self {
        NwchemBasisLoader {
            allow_download: false,
            ..Self::default()
        }
    }
}

impl BasisLoader for NwchemBasisLoader {
    fn load(&self, basis_name: &str, atomic_symbol: &str) -> Result<BasisSet> {
        fetch_basis(basis_name, atomic_symbol, &self.search_dirs, self.allow_download)
    }
}

/// Fetch basis set from the embedded library, a local file or the online database
pub fn fetch_basis(
    basis_name: &str,
    atomic_symbol: &str,
    search_dirs: &[PathBuf],
    allow_download: bool,
) -> Result<BasisSet> {
    if let Some(text) = library::lookup(basis_name, atomic_symbol) {
        return Ok(BasisSet::parse_nwchem(basis_name, &text)?);
    }

    let file_name = format!(
        "{}.{}.nwchem",
        basis_name.to_lowercase(),
        atomic_symbol.to_lowercase()
    );
    for dir in search_dirs {
        let local_path = dir.join(&file_name);
        if Path::new(&local_path).exists() {
            info!("Loading {} basis for {} from {}", basis_name, atomic_symbol, local_path.display());
            let basis_str = fs::read_to_string(&local_path)?;
            return Ok(BasisSet::parse_nwchem(basis_name, &basis_str)?);
        }
    }

    if !allow_download {
        return Err(QchemError::BasisNotFound {
            basis: basis_name.to_string(),
            element: atomic_symbol.to_string(),
        });
    }

    let url = format!(
        "{}/{}/format/nwchem?elements={}",
        BSE_URL,
        basis_name.to_lowercase(),
        atomic_symbol
    );
    info!("Fetching {} basis for {} from {}", basis_name, atomic_symbol, url);
    let response = reqwest::blocking::get(&url)?;
    if !response.status().is_success() {
        return Err(QchemError::BasisNotFound {
            basis: basis_name.to_string(),
            element: atomic_symbol.to_string(),
        });
    }
    let basis_str = response.text()?;
    Ok(BasisSet::parse_nwchem(basis_name, &basis_str)?)
}

/// Caches loaded basis families per (basis, element).
pub struct BasisRegistry<L: BasisLoader> {
    loader: L,
    cache: HashMap<(String, String), BasisSet>,
}

impl<L: BasisLoader> BasisRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
        }
    }

    /// Basis map keyed by element symbol, as `SCF::init_basis` expects it.
    pub fn load_for_elements(
        &mut self,
        basis_name: &str,
        symbols: &[String],
    ) -> Result<HashMap<String, BasisSet>> {
        let mut map = HashMap::new();
        for symbol in symbols {
            if map.contains_key(symbol) {
                continue;
            }
            let key = (basis_name.to_lowercase(), symbol.clone());
            if !self.cache.contains_key(&key) {
                let basis = self.loader.load(basis_name, symbol)?;
                self.cache.insert(key.clone(), basis);
            }
            if let Some(basis) = self.cache.get(&key) {
                map.insert(symbol.clone(), basis.clone());
            }
        }
        Ok(map)
    }
}
