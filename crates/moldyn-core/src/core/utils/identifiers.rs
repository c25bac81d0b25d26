use phf::{Set, phf_set};

static AMINO_ACID_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    // Protonation and force-field variants
    "HID", "HIE", "HIP", "HSD", "HSE", "HSP", "CYX", "CYM", "ASH", "GLH",
    "LYN", "ARN", "MSE", "SEC", "PYL",
    // Terminal variants written by some force fields. Caps such as ACE and NME
    // lack a full N-CA-C backbone and are left out.
    "NALA", "CALA", "NGLY", "CGLY",
};

/// True if the residue name denotes an amino acid.
pub fn is_amino_acid(residue_name: &str) -> bool {
    let name = residue_name.trim();
    AMINO_ACID_NAMES.contains(name) || AMINO_ACID_NAMES.contains(name.to_ascii_uppercase().as_str())
}

/// Case-insensitive comparison of an atom label against a backbone name.
pub fn label_matches(label: &str, name: &str) -> bool {
    label.trim().eq_ignore_ascii_case(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_amino_acid_recognizes_standard_and_variant_names() {
        assert!(is_amino_acid("ALA"));
        assert!(is_amino_acid("ala"));
        assert!(is_amino_acid(" HSD "));
        assert!(!is_amino_acid("SOL"));
        assert!(!is_amino_acid("DA"));
    }

    #[test]
    fn terminal_caps_are_not_amino_acids() {
        assert!(!is_amino_acid("ACE"));
        assert!(!is_amino_acid("NME"));
        assert!(is_amino_acid("NALA"));
    }

    #[test]
    fn label_matches_ignores_case_and_padding() {
        assert!(label_matches(" ca", "CA"));
        assert!(!label_matches("CB", "CA"));
    }
}
