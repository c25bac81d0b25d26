use crate::core::coloring::rgb;
use std::fmt;

/// Chemical element of an atom.
///
/// Only the elements that routinely appear in biomolecular simulations are
/// enumerated; everything else collapses to [`Element::Unknown`], which has a
/// zero covalent radius and therefore never forms bonds during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Element {
    Hydrogen,
    Carbon,
    Nitrogen,
    Oxygen,
    Fluorine,
    Sodium,
    Magnesium,
    Phosphorus,
    Sulfur,
    Chlorine,
    Potassium,
    Calcium,
    Iron,
    Zinc,
    Selenium,
    Bromine,
    Iodine,
    #[default]
    Unknown,
}

impl Element {
    /// Parses an element symbol, ignoring case and surrounding whitespace.
    ///
    /// Unrecognized symbols map to [`Element::Unknown`].
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "H" | "D" => Self::Hydrogen,
            "C" => Self::Carbon,
            "N" => Self::Nitrogen,
            "O" => Self::Oxygen,
            "F" => Self::Fluorine,
            "NA" => Self::Sodium,
            "MG" => Self::Magnesium,
            "P" => Self::Phosphorus,
            "S" => Self::Sulfur,
            "CL" => Self::Chlorine,
            "K" => Self::Potassium,
            "CA" => Self::Calcium,
            "FE" => Self::Iron,
            "ZN" => Self::Zinc,
            "SE" => Self::Selenium,
            "BR" => Self::Bromine,
            "I" => Self::Iodine,
            _ => Self::Unknown,
        }
    }

    /// Guesses the element from an atom label such as `"CA"`, `"1HB"` or `"OXT"`.
    ///
    /// Leading digits are skipped and only the first letter is considered, which is
    /// the usual convention for protein atom names (`"CA"` is an alpha carbon, not
    /// calcium).
    pub fn from_atom_label(label: &str) -> Self {
        label
            .trim()
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| Self::from_symbol(c.encode_utf8(&mut [0; 4])))
            .unwrap_or_default()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Hydrogen => "H",
            Self::Carbon => "C",
            Self::Nitrogen => "N",
            Self::Oxygen => "O",
            Self::Fluorine => "F",
            Self::Sodium => "Na",
            Self::Magnesium => "Mg",
            Self::Phosphorus => "P",
            Self::Sulfur => "S",
            Self::Chlorine => "Cl",
            Self::Potassium => "K",
            Self::Calcium => "Ca",
            Self::Iron => "Fe",
            Self::Zinc => "Zn",
            Self::Selenium => "Se",
            Self::Bromine => "Br",
            Self::Iodine => "I",
            Self::Unknown => "X",
        }
    }

    /// Single-bond covalent radius in Ångström (Cordero et al., 2008).
    pub fn covalent_radius(&self) -> f32 {
        match self {
            Self::Hydrogen => 0.31,
            Self::Carbon => 0.76,
            Self::Nitrogen => 0.71,
            Self::Oxygen => 0.66,
            Self::Fluorine => 0.57,
            Self::Sodium => 1.66,
            Self::Magnesium => 1.41,
            Self::Phosphorus => 1.07,
            Self::Sulfur => 1.05,
            Self::Chlorine => 1.02,
            Self::Potassium => 2.03,
            Self::Calcium => 1.76,
            Self::Iron => 1.32,
            Self::Zinc => 1.22,
            Self::Selenium => 1.20,
            Self::Bromine => 1.20,
            Self::Iodine => 1.39,
            Self::Unknown => 0.0,
        }
    }

    /// Van der Waals radius in Ångström (Bondi, 1964).
    pub fn vdw_radius(&self) -> f32 {
        match self {
            Self::Hydrogen => 1.20,
            Self::Carbon => 1.70,
            Self::Nitrogen => 1.55,
            Self::Oxygen => 1.52,
            Self::Fluorine => 1.47,
            Self::Sodium => 2.27,
            Self::Magnesium => 1.73,
            Self::Phosphorus => 1.80,
            Self::Sulfur => 1.80,
            Self::Chlorine => 1.75,
            Self::Potassium => 2.75,
            Self::Calcium => 2.31,
            Self::Iron => 2.04,
            Self::Zinc => 1.39,
            Self::Selenium => 1.90,
            Self::Bromine => 1.85,
            Self::Iodine => 1.98,
            Self::Unknown => 1.0,
        }
    }

    /// Standard atomic weight in Dalton.
    pub fn atomic_mass(&self) -> f32 {
        match self {
            Self::Hydrogen => 1.008,
            Self::Carbon => 12.011,
            Self::Nitrogen => 14.007,
            Self::Oxygen => 15.999,
            Self::Fluorine => 18.998,
            Self::Sodium => 22.990,
            Self::Magnesium => 24.305,
            Self::Phosphorus => 30.974,
            Self::Sulfur => 32.06,
            Self::Chlorine => 35.45,
            Self::Potassium => 39.098,
            Self::Calcium => 40.078,
            Self::Iron => 55.845,
            Self::Zinc => 65.38,
            Self::Selenium => 78.971,
            Self::Bromine => 79.904,
            Self::Iodine => 126.904,
            Self::Unknown => 1.0,
        }
    }

    /// CPK colour (Jmol palette) packed as RGBA8.
    pub fn cpk_color(&self) -> u32 {
        match self {
            Self::Hydrogen => rgb(0xFFFFFF),
            Self::Carbon => rgb(0x909090),
            Self::Nitrogen => rgb(0x3050F8),
            Self::Oxygen => rgb(0xFF0D0D),
            Self::Fluorine => rgb(0x90E050),
            Self::Sodium => rgb(0xAB5CF2),
            Self::Magnesium => rgb(0x8AFF00),
            Self::Phosphorus => rgb(0xFF8000),
            Self::Sulfur => rgb(0xFFFF30),
            Self::Chlorine => rgb(0x1FF01F),
            Self::Potassium => rgb(0x8F40D4),
            Self::Calcium => rgb(0x3DFF00),
            Self::Iron => rgb(0xE06633),
            Self::Zinc => rgb(0x7D80B0),
            Self::Selenium => rgb(0xFFA100),
            Self::Bromine => rgb(0xA62929),
            Self::Iodine => rgb(0x940094),
            Self::Unknown => rgb(0xFF1493),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("c"), Element::Carbon);
        assert_eq!(Element::from_symbol(" Cl "), Element::Chlorine);
        assert_eq!(Element::from_symbol("FE"), Element::Iron);
    }

    #[test]
    fn from_symbol_maps_unrecognized_symbols_to_unknown() {
        assert_eq!(Element::from_symbol("Xx"), Element::Unknown);
        assert_eq!(Element::from_symbol(""), Element::Unknown);
    }

    #[test]
    fn from_atom_label_uses_first_letter_only() {
        assert_eq!(Element::from_atom_label("CA"), Element::Carbon);
        assert_eq!(Element::from_atom_label("1HB"), Element::Hydrogen);
        assert_eq!(Element::from_atom_label("OXT"), Element::Oxygen);
        assert_eq!(Element::from_atom_label("123"), Element::Unknown);
    }

    #[test]
    fn symbol_round_trips_through_from_symbol() {
        for element in [Element::Carbon, Element::Sodium, Element::Selenium] {
            assert_eq!(Element::from_symbol(element.symbol()), element);
        }
    }

    #[test]
    fn unknown_element_has_zero_covalent_radius() {
        assert_eq!(Element::Unknown.covalent_radius(), 0.0);
        assert!(Element::Unknown.vdw_radius() > 0.0);
    }

    #[test]
    fn cpk_color_is_fully_opaque() {
        assert_eq!(Element::Oxygen.cpk_color() >> 24, 0xFF);
        assert_eq!(Element::Oxygen.cpk_color() & 0xFF, 0xFF);
    }
}
