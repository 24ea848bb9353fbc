//! Basis sets shipped with the crate.
//!
//! STO-3G for H–Ne, in NWChem format as distributed by the Basis Set
//! Exchange (https://www.basissetexchange.org).

const STO3G_CORE: [f64; 3] = [0.15432897, 0.53532814, 0.44463454];
const STO3G_SP_S: [f64; 3] = [-0.09996723, 0.39951283, 0.70011547];
const STO3G_SP_P: [f64; 3] = [0.15591627, 0.60768372, 0.39195739];

// (symbol, 1s exponents, 2sp exponents)
const STO3G_EXPONENTS: [(&str, [f64; 3], Option<[f64; 3]>); 10] = [
    ("H", [3.42525091, 0.62391373, 0.16885540], None),
    ("He", [6.36242139, 1.15892300, 0.31364979], None),
    ("Li", [16.1195750, 2.9362007, 0.7946505], Some([0.6362897, 0.1478601, 0.0480887])),
    ("Be", [30.1678710, 5.4951153, 1.4871927], Some([1.3148331, 0.3055389, 0.0993707])),
    ("B", [48.7911130, 8.8873622, 2.4052670], Some([2.2369561, 0.5198205, 0.1690618])),
    ("C", [71.6168370, 13.0450960, 3.5305122], Some([2.9412494, 0.6834831, 0.2222899])),
    ("N", [99.1061690, 18.0523120, 4.8856602], Some([3.7804559, 0.8784966, 0.2857144])),
    ("O", [130.7093200, 23.8088610, 6.4436083], Some([5.0331513, 1.1695961, 0.3803890])),
    ("F", [166.6791300, 30.3608120, 8.2168207], Some([6.4648032, 1.5022812, 0.4885885])),
    ("Ne", [207.0156100, 37.7081510, 10.2052970], Some([8.2463151, 1.9162662, 0.6232293])),
];

/// Names of the basis sets available without touching the filesystem.
pub const EMBEDDED_BASIS_SETS: [&str; 1] = ["sto-3g"];

/// NWChem text of `symbol` in the named basis, if the crate ships it.
pub fn lookup(basis_name: &str, symbol: &str) -> Option<String> {
    match basis_name.to_lowercase().as_str() {
        "sto-3g" | "sto3g" => sto3g(symbol),
        _ => None,
    }
}

fn sto3g(symbol: &str) -> Option<String> {
    let (sym, core, valence) = STO3G_EXPONENTS
        .iter()
        .find(|(s, _, _)| s.eq_ignore_ascii_case(symbol))?;

    let mut text = String::from("BASIS \"ao basis\" SPHERICAL PRINT\n");
    text.push_str(&format!("{}    S\n", sym));
    for (alpha, c) in core.iter().zip(STO3G_CORE.iter()) {
        text.push_str(&format!("  {:>16.7}  {:>14.8}\n", alpha, c));
    }
    if let Some(valence) = valence {
        text.push_str(&format!("{}    SP\n", sym));
        for ((alpha, cs), cp) in valence.iter().zip(STO3G_SP_S.iter()).zip(STO3G_SP_P.iter()) {
            text.push_str(&format!("  {:>16.7}  {:>14.8}  {:>14.8}\n", alpha, cs, cp));
        }
    }
    text.push_str("END\n");
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(lookup("STO-3G", "o").is_some());
        assert!(lookup("sto-3g", "Ne").is_some());
        assert!(lookup("sto-3g", "Na").is_none());
        assert!(lookup("6-31g", "H").is_none());
    }

    #[test]
    fn test_hydrogen_has_single_shell() {
        let text = lookup("sto-3g", "H").unwrap();
        assert_eq!(text.matches("    S\n").count(), 1);
        assert!(!text.contains("SP"));
    }
}
