//! Chemical element symbols and atomic numbers.
//!
//! Readers usually know a structure by element symbols while the `elems` field
//! carries atomic numbers; these two lookups bridge the gap.

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Atomic number of an element symbol (`"Cu"` → 29). Symbols are case-sensitive.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|i| (i + 1) as u8)
}

/// Element symbol of an atomic number (29 → `"Cu"`).
pub fn symbol(z: u8) -> Option<&'static str> {
    SYMBOLS.get(usize::from(z).checked_sub(1)?).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coinage_metals() {
        assert_eq!(atomic_number("Cu"), Some(29));
        assert_eq!(atomic_number("Ag"), Some(47));
        assert_eq!(atomic_number("Au"), Some(79));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(symbol(0), None);
        assert_eq!(symbol(119), None);
        assert_eq!(symbol(8), Some("O"));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(atomic_number("cu"), None);
        assert_eq!(atomic_number("Xx"), None);
    }
}
