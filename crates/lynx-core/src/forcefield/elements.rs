use phf::{Map, phf_map};

/// Reference atomic masses (amu) used to sanity-check declared atom types.
///
/// Values are the NIST standard atomic weights for the elements that
/// appear in the hydrocarbon force fields shipped with the generator.
#[rustfmt::skip]
pub static REFERENCE_MASSES: Map<&'static str, f64> = phf_map! {
    "H"  => 1.00784,
    "He" => 4.00260,
    "C"  => 12.00960,
    "O"  => 15.99903,
};

/// Largest tolerated deviation from the reference mass, in amu.
pub const MASS_TOLERANCE: f64 = 0.1;

pub fn reference_mass(element: &str) -> Option<f64> {
    REFERENCE_MASSES.get(element).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_elements_have_reference_masses() {
        assert_eq!(reference_mass("C"), Some(12.00960));
        assert_eq!(reference_mass("He"), Some(4.00260));
    }

    #[test]
    fn unknown_elements_return_none() {
        assert_eq!(reference_mass("Mo"), None);
        assert_eq!(reference_mass("c"), None);
    }
}
