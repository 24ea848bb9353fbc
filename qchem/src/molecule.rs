//! Molecule descriptor: element symbols, Cartesian coordinates, charge,
//! spin multiplicity and the name of the Gaussian basis.

use crate::error::{QchemError, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bohr radius in Angstrom (CODATA 2018).
pub const BOHR_TO_ANGSTROM: f64 = 0.529177210903;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Bohr,
    Angstrom,
}

impl Unit {
    /// Factor converting a length in this unit to Bohr.
    pub fn to_bohr(self) -> f64 {
        match self {
            Unit::Bohr => 1.0,
            Unit::Angstrom => 1.0 / BOHR_TO_ANGSTROM,
        }
    }
}

impl FromStr for Unit {
    type Err = QchemError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bohr" | "au" => Ok(Unit::Bohr),
            "angstrom" | "ang" | "a" => Ok(Unit::Angstrom),
            other => Err(QchemError::InvalidMolecule(format!("unknown length unit '{}'", other))),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Bohr => write!(f, "bohr"),
            Unit::Angstrom => write!(f, "angstrom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub symbols: Vec<String>,
    pub atomic_numbers: Vec<u32>,
    /// Always stored in Bohr.
    pub coordinates: Vec<Vector3<f64>>,
    pub charge: i32,
    pub multiplicity: usize,
    pub basis_name: String,
}

impl Molecule {
    /// Neutral singlet in STO-3G.
    pub fn new(symbols: &[&str], coordinates: &[[f64; 3]], unit: Unit) -> Result<Self> {
        if symbols.len() != coordinates.len() {
            return Err(QchemError::InvalidMolecule(format!(
                "{} symbols but {} coordinates",
                symbols.len(),
                coordinates.len()
            )));
        }

        let mut normalized = Vec::with_capacity(symbols.len());
        let mut atomic_numbers = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let element = lookup_element(symbol)?;
            normalized.push(element.get_symbol().to_string());
            atomic_numbers.push(element.get_atomic_number() as u32);
        }

        let scale = unit.to_bohr();
        let coordinates = coordinates
            .iter()
            .map(|c| Vector3::new(c[0], c[1], c[2]) * scale)
            .collect();

        let molecule = Molecule {
            symbols: normalized,
            atomic_numbers,
            coordinates,
            charge: 0,
            multiplicity: 1,
            basis_name: "sto-3g".to_string(),
        };
        molecule.validate()?;
        Ok(molecule)
    }

    pub fn with_charge(mut self, charge: i32) -> Result<Self> {
        self.charge = charge;
        self.validate()?;
        Ok(self)
    }

    pub fn with_multiplicity(mut self, multiplicity: usize) -> Result<Self> {
        self.multiplicity = multiplicity;
        self.validate()?;
        Ok(self)
    }

    /// Sets charge and multiplicity together, so that e.g. a cation doublet
    /// can be reached from the neutral singlet.
    pub fn with_charge_and_multiplicity(mut self, charge: i32, multiplicity: usize) -> Result<Self> {
        self.charge = charge;
        self.multiplicity = multiplicity;
        self.validate()?;
        Ok(self)
    }

    pub fn with_basis(mut self, basis_name: &str) -> Self {
        self.basis_name = basis_name.to_lowercase();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(QchemError::InvalidMolecule("no atoms given".to_string()));
        }
        if self.coordinates.iter().any(|c| !c.iter().all(|x| x.is_finite())) {
            return Err(QchemError::InvalidMolecule("non-finite coordinate".to_string()));
        }
        for i in 0..self.num_atoms() {
            for j in (i + 1)..self.num_atoms() {
                if (self.coordinates[i] - self.coordinates[j]).norm() < 1e-8 {
                    return Err(QchemError::InvalidMolecule(format!(
                        "atoms {} and {} coincide",
                        i, j
                    )));
                }
            }
        }

        let nuclear_charge: i64 = self.atomic_numbers.iter().map(|&z| z as i64).sum();
        let electrons = nuclear_charge - self.charge as i64;
        if electrons < 0 {
            return Err(QchemError::InvalidMolecule(format!(
                "charge {} leaves a negative number of electrons",
                self.charge
            )));
        }
        if self.multiplicity == 0 {
            return Err(QchemError::InvalidMolecule("multiplicity must be at least 1".to_string()));
        }
        let unpaired = self.multiplicity as i64 - 1;
        if unpaired > electrons || (electrons - unpaired) % 2 != 0 {
            return Err(QchemError::InvalidMolecule(format!(
                "multiplicity {} is inconsistent with {} electrons",
                self.multiplicity, electrons
            )));
        }
        Ok(())
    }

    pub fn num_atoms(&self) -> usize {
        self.symbols.len()
    }

    pub fn num_electrons(&self) -> usize {
        let nuclear_charge: i64 = self.atomic_numbers.iter().map(|&z| z as i64).sum();
        (nuclear_charge - self.charge as i64).max(0) as usize
    }

    pub fn elements(&self) -> Vec<Element> {
        self.symbols
            .iter()
            .filter_map(|s| Element::from_symbol(s))
            .collect()
    }

    /// Coordinates converted to the requested unit.
    pub fn coordinates_in(&self, unit: Unit) -> Vec<Vector3<f64>> {
        let scale = 1.0 / unit.to_bohr();
        self.coordinates.iter().map(|c| c * scale).collect()
    }

    /// Σ_{i<j} Z_i Z_j / |R_i - R_j| in Hartree.
    pub fn nuclear_repulsion(&self) -> f64 {
        let mut energy = 0.0;
        for i in 0..self.num_atoms() {
            for j in (i + 1)..self.num_atoms() {
                let r = (self.coordinates[i] - self.coordinates[j]).norm();
                energy += (self.atomic_numbers[i] * self.atomic_numbers[j]) as f64 / r;
            }
        }
        energy
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Molecule ({} atoms, charge {}, multiplicity {}, basis {})",
            self.num_atoms(),
            self.charge,
            self.multiplicity,
            self.basis_name
        )?;
        for (symbol, c) in self.symbols.iter().zip(&self.coordinates) {
            writeln!(f, "  {:<2} {:>12.6} {:>12.6} {:>12.6}", symbol, c.x, c.y, c.z)?;
        }
        Ok(())
    }
}

pub(crate) fn lookup_element(symbol: &str) -> Result<Element> {
    let mut chars = symbol.trim().chars();
    let normalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    };
    Element::from_symbol(&normalized).ok_or_else(|| QchemError::UnknownElement(symbol.to_string()))
}
