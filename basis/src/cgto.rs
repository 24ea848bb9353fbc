/* Contracted gaussian type orbitals (CGTO) built on the primitives in
   gto.rs, plus per-element basis sets parsed from NWChem text.
*/
#![allow(non_snake_case)]

use crate::basis::{AOBasis, Basis, BasisError};
use crate::gto::GTO;
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // shell_type: 1s, 2s, 2px, 2py, 2pz, ...
    pub shell_type: String,
    pub l: i32,
}

impl ContractedGTO {
    pub fn new(primitives: Vec<GTO>, coefficients: Vec<f64>, shell_type: &str, l: i32) -> Self {
        let mut cgto = ContractedGTO {
            primitives,
            coefficients,
            shell_type: shell_type.to_string(),
            l,
        };
        cgto.normalize();
        cgto
    }

    // Rescale the contraction so that <χ|χ> = 1.
    fn normalize(&mut self) {
        let s = ContractedGTO::Sab(self, self);
        if s > 0.0 {
            let scale = 1.0 / s.sqrt();
            self.coefficients.iter_mut().for_each(|c| *c *= scale);
        }
    }

    pub fn center(&self) -> Option<Vector3<f64>> {
        self.primitives.first().map(|p| p.center)
    }

    fn recenter(&mut self, center: Vector3<f64>) {
        for primitive in self.primitives.iter_mut() {
            *primitive = primitive.recentered(center);
        }
    }

    fn contract<F>(a: &Self, b: &Self, f: F) -> f64
    where
        F: Fn(&GTO, &GTO) -> f64,
    {
        let mut val = 0.0;
        for (pa, ca) in a.primitives.iter().zip(&a.coefficients) {
            for (pb, cb) in b.primitives.iter().zip(&b.coefficients) {
                val += ca * cb * f(pa, pb);
            }
        }
        val
    }
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(p, c)| c * p.evaluate(r))
            .sum()
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract(a, b, GTO::Sab)
    }

    fn Tab(a: &Self, b: &Self) -> f64 {
        ContractedGTO::contract(a, b, GTO::Tab)
    }

    fn Vab(a: &Self, b: &Self, R: Vector3<f64>, Z: u32) -> f64 {
        ContractedGTO::contract(a, b, |pa, pb| GTO::Vab(pa, pb, R, Z))
    }

    fn JKabcd(a: &Self, b: &Self, c: &Self, d: &Self) -> f64 {
        let mut val = 0.0;
        for (pa, ca) in a.primitives.iter().zip(&a.coefficients) {
            for (pb, cb) in b.primitives.iter().zip(&b.coefficients) {
                let cab = ca * cb;
                for (pc, cc) in c.primitives.iter().zip(&c.coefficients) {
                    for (pd, cd) in d.primitives.iter().zip(&d.coefficients) {
                        val += cab * cc * cd * GTO::JKabcd(pa, pb, pc, pd);
                    }
                }
            }
        }
        val
    }
}

/// All contracted functions of one element in a named basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisSet {
    // name of the basis, e.g. sto-3g
    pub name: String,
    pub symbol: String,
    pub atomic_number: u32,
    pub basis_set: Vec<ContractedGTO>,
}

// Example of nwchem format:
// BASIS "ao basis" SPHERICAL PRINT
// #BASIS SET: (6s,3p) -> [2s,1p]
// O    S
//     130.7093200              0.15432897
//      23.8088610              0.53532814
//       6.4436083              0.44463454
// O    SP
//       5.0331513             -0.09996723             0.15591627
//       1.1695961              0.39951283             0.60768372
//       0.3803890              0.70011547             0.39195739
// END
struct ShellBlock<'a> {
    shell_type: &'a str,
    rows: Vec<(usize, &'a str)>,
}

impl BasisSet {
    /// Parses the NWChem text of a single element.
    pub fn parse_nwchem(name: &str, input: &str) -> Result<Self, BasisError> {
        let mut symbol: Option<String> = None;
        let mut blocks: Vec<ShellBlock> = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty()
                || line.starts_with('#')
                || line.to_uppercase().starts_with("BASIS")
                || line.eq_ignore_ascii_case("END")
            {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens[0].chars().all(char::is_alphabetic) {
                if tokens.len() < 2 {
                    return Err(BasisError::Parse {
                        line: idx + 1,
                        message: format!("shell header without shell type: '{}'", line),
                    });
                }
                if let Some(s) = &symbol {
                    if !s.eq_ignore_ascii_case(tokens[0]) {
                        return Err(BasisError::MixedElements(s.clone(), tokens[0].to_string()));
                    }
                }
                symbol.get_or_insert_with(|| tokens[0].to_string());
                blocks.push(ShellBlock {
                    shell_type: tokens[1],
                    rows: Vec::new(),
                });
            } else if let Some(block) = blocks.last_mut() {
                block.rows.push((idx + 1, line));
            } else {
                return Err(BasisError::Parse {
                    line: idx + 1,
                    message: "exponent line before any shell header".to_string(),
                });
            }
        }

        let symbol = symbol.ok_or_else(|| BasisError::Empty(name.to_string()))?;
        let element = lookup_element(&symbol)?;

        let origin = Vector3::zeros();
        let mut basis_set = Vec::new();
        let mut s_count = 0;
        let mut p_count = 1;
        for block in &blocks {
            let parsed = Self::parse_primitive_block(block, origin, &mut s_count, &mut p_count)?;
            basis_set.extend(parsed);
        }

        if basis_set.is_empty() {
            return Err(BasisError::Empty(symbol));
        }

        Ok(BasisSet {
            name: name.to_lowercase(),
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            basis_set,
        })
    }

    fn parse_primitive_block(
        block: &ShellBlock,
        center: Vector3<f64>,
        s_count: &mut usize,
        p_count: &mut usize,
    ) -> Result<Vec<ContractedGTO>, BasisError> {
        let shell = block.shell_type.to_uppercase();
        let (has_s, has_p) = match shell.as_str() {
            "S" => (true, false),
            "P" => (false, true),
            "SP" | "L" => (true, true),
            other => return Err(BasisError::UnsupportedShell(other.to_string())),
        };
        let columns = 1 + has_s as usize + has_p as usize;

        let mut alphas = Vec::new();
        let mut s_coeffs = Vec::new();
        let mut p_coeffs = Vec::new();
        for (line_no, row) in &block.rows {
            let numbers = row
                .split_whitespace()
                .map(parse_nwchem_float)
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| BasisError::Parse {
                    line: *line_no,
                    message: format!("invalid number in '{}'", row),
                })?;
            if numbers.len() < columns {
                return Err(BasisError::Parse {
                    line: *line_no,
                    message: format!("expected {} columns, found {}", columns, numbers.len()),
                });
            }
            alphas.push(numbers[0]);
            if has_s {
                s_coeffs.push(numbers[1]);
            }
            if has_p {
                p_coeffs.push(numbers[columns - 1]);
            }
        }

        let mut res = Vec::new();
        if has_s {
            *s_count += 1;
            let primitives = alphas
                .iter()
                .map(|&alpha| GTO::new(alpha, Vector3::new(0, 0, 0), center))
                .collect();
            res.push(ContractedGTO::new(
                primitives,
                s_coeffs,
                &format!("{}s", s_count),
                0,
            ));
        }
        if has_p {
            *p_count += 1;
            let components = [
                ("px", Vector3::new(1, 0, 0)),
                ("py", Vector3::new(0, 1, 0)),
                ("pz", Vector3::new(0, 0, 1)),
            ];
            for (label, l_xyz) in components {
                let primitives = alphas
                    .iter()
                    .map(|&alpha| GTO::new(alpha, l_xyz, center))
                    .collect();
                res.push(ContractedGTO::new(
                    primitives,
                    p_coeffs.clone(),
                    &format!("{}{}", p_count, label),
                    1,
                ));
            }
        }

        Ok(res)
    }
}

impl AOBasis for BasisSet {
    type BasisType = ContractedGTO;

    fn set_center(&mut self, center: Vector3<f64>) {
        for cgto in self.basis_set.iter_mut() {
            cgto.recenter(center);
        }
    }

    fn get_center(&self) -> Option<Vector3<f64>> {
        self.basis_set.first().and_then(|b| b.center())
    }

    fn basis_size(&self) -> usize {
        self.basis_set.len()
    }

    fn get_basis(&self) -> Vec<Arc<Self::BasisType>> {
        self.basis_set.iter().map(|b| Arc::new(b.clone())).collect()
    }
}

fn lookup_element(symbol: &str) -> Result<Element, BasisError> {
    let mut chars = symbol.chars();
    let normalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    };
    Element::from_symbol(&normalized).ok_or_else(|| BasisError::UnknownElement(symbol.to_string()))
}

// Fortran-style exponents (1.0D+01) show up in older basis files.
fn parse_nwchem_float(token: &str) -> Option<f64> {
    token.replace(|c| c == 'D' || c == 'd', "E").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;

    fn sto3g(symbol: &str) -> BasisSet {
        let text = library::lookup("sto-3g", symbol).unwrap();
        BasisSet::parse_nwchem("sto-3g", &text).unwrap()
    }

    #[test]
    fn test_parse_hydrogen() {
        let h = sto3g("H");
        assert_eq!(h.symbol, "H");
        assert_eq!(h.atomic_number, 1);
        assert_eq!(h.basis_size(), 1);
        assert_eq!(h.basis_set[0].primitives.len(), 3);
        assert_eq!(h.basis_set[0].shell_type, "1s");
    }

    #[test]
    fn test_parse_oxygen_shells() {
        let o = sto3g("O");
        assert_eq!(o.atomic_number, 8);
        let labels: Vec<&str> = o.basis_set.iter().map(|b| b.shell_type.as_str()).collect();
        assert_eq!(labels, vec!["1s", "2s", "2px", "2py", "2pz"]);
    }

    #[test]
    fn test_contracted_functions_are_normalized() {
        for symbol in ["H", "O", "N"] {
            for cgto in &sto3g(symbol).basis_set {
                let s = ContractedGTO::Sab(cgto, cgto);
                assert!((s - 1.0).abs() < 1e-12, "{} {} norm {}", symbol, cgto.shell_type, s);
            }
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let err = BasisSet::parse_nwchem("x", "H S\n1.0 abc\n").unwrap_err();
        assert!(matches!(err, BasisError::Parse { line: 2, .. }));

        let err = BasisSet::parse_nwchem("x", "H F\n1.0 1.0\n").unwrap_err();
        assert!(matches!(err, BasisError::UnsupportedShell(_)));

        let err = BasisSet::parse_nwchem("x", "H S\n1.0 1.0\nHe S\n1.0 1.0\n").unwrap_err();
        assert!(matches!(err, BasisError::MixedElements(_, _)));

        let err = BasisSet::parse_nwchem("x", "# nothing here\n").unwrap_err();
        assert!(matches!(err, BasisError::Empty(_)));
    }

    #[test]
    fn test_fortran_exponents() {
        let b = BasisSet::parse_nwchem("x", "H S\n 0.3425250914D+01 0.1543289673D+00\n").unwrap();
        assert!((b.basis_set[0].primitives[0].alpha - 3.425250914).abs() < 1e-12);
    }

    // Szabo & Ostlund, Modern Quantum Chemistry, section 3.5.2 (R = 1.4 bohr)
    #[test]
    fn test_h2_integrals_match_reference() {
        let mut h_a = sto3g("H");
        let mut h_b = sto3g("H");
        let ra = Vector3::new(0.0, 0.0, 0.0);
        let rb = Vector3::new(0.0, 0.0, 1.4);
        h_a.set_center(ra);
        h_b.set_center(rb);
        let a = &h_a.get_basis()[0];
        let b = &h_b.get_basis()[0];

        assert!((ContractedGTO::Sab(a, b) - 0.6593).abs() < 1e-4);
        assert!((ContractedGTO::Tab(a, a) - 0.7600).abs() < 1e-4);
        assert!((ContractedGTO::Tab(a, b) - 0.2365).abs() < 1e-4);
        assert!((ContractedGTO::Vab(a, a, ra, 1) + 1.2266).abs() < 1e-4);
        assert!((ContractedGTO::Vab(a, a, rb, 1) + 0.6538).abs() < 1e-4);
        assert!((ContractedGTO::Vab(a, b, ra, 1) + 0.5974).abs() < 1e-4);
        assert!((ContractedGTO::JKabcd(a, a, a, a) - 0.7746).abs() < 1e-4);
        assert!((ContractedGTO::JKabcd(a, a, b, b) - 0.5697).abs() < 1e-4);
        assert!((ContractedGTO::JKabcd(b, a, a, a) - 0.4441).abs() < 1e-4);
        assert!((ContractedGTO::JKabcd(b, a, b, a) - 0.2970).abs() < 1e-4);
    }

    #[test]
    fn test_set_center_moves_all_primitives() {
        let mut o = sto3g("O");
        let center = Vector3::new(1.0, -2.0, 0.5);
        o.set_center(center);
        assert_eq!(o.get_center(), Some(center));
        for cgto in o.get_basis() {
            for p in &cgto.primitives {
                assert_eq!(p.center, center);
                assert_eq!(p.gto1d[1].center, -2.0);
            }
        }
    }
}
