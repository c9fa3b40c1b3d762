use std::collections::BTreeSet;
use std::fmt;

/// Identifies the atoms a bonded or non-bonded record applies to.
///
/// Records can target either an atom *class* (shared by several atom types)
/// or a single atom *type* by name. An empty class string acts as a wildcard
/// and matches every atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomSelector {
    /// Matches every atom type whose `class` equals the given string.
    Class(String),
    /// Matches the single atom type with the given name.
    Type(String),
}

impl AtomSelector {
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    pub fn type_name(name: impl Into<String>) -> Self {
        Self::Type(name.into())
    }

    /// Returns `true` for the empty-class wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Class(c) if c.is_empty())
    }

    /// Returns `true` if this selector applies to the given atom type.
    pub fn matches(&self, atom_type: &AtomType) -> bool {
        match self {
            Self::Class(c) => c.is_empty() || *c == atom_type.class,
            Self::Type(t) => *t == atom_type.name,
        }
    }

    /// Returns `true` if this selector applies to atoms of the given class.
    ///
    /// Type selectors never match by class.
    pub fn matches_class(&self, class: &str) -> bool {
        match self {
            Self::Class(c) => c.is_empty() || c == class,
            Self::Type(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Class(s) | Self::Type(s) => s,
        }
    }
}

impl fmt::Display for AtomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(c) if c.is_empty() => write!(f, "*"),
            Self::Class(c) => write!(f, "{}", c),
            Self::Type(t) => write!(f, "type:{}", t),
        }
    }
}

/// A declared atom type.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    /// Unique name of the type (e.g., `opls_135`).
    pub name: String,
    /// The class shared by types with identical bonded parameters (e.g., `CT`).
    pub class: String,
    /// Chemical element symbol. Virtual sites may omit it.
    pub element: Option<String>,
    /// Atomic mass in amu.
    pub mass: f64,
    /// Definition pattern used by atom typers to match this type.
    pub definition: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Bibliographic reference for the parameters.
    pub doi: Option<String>,
    /// Comma-separated list of type names this type takes precedence over.
    pub overrides: Option<String>,
}

impl AtomType {
    pub fn new(name: impl Into<String>, class: impl Into<String>, mass: f64) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            element: None,
            mass,
            definition: None,
            description: None,
            doi: None,
            overrides: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    /// Iterates over the type names listed in `overrides`.
    pub fn overridden_types(&self) -> impl Iterator<Item = &str> {
        self.overrides
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Harmonic bond stretching parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BondParameter {
    pub atoms: [AtomSelector; 2],
    /// Equilibrium length in nm.
    pub length: f64,
    /// Force constant in kJ/mol/nm^2.
    pub k: f64,
}

/// Harmonic angle bending parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleParameter {
    pub atoms: [AtomSelector; 3],
    /// Equilibrium angle in radians.
    pub angle: f64,
    /// Force constant in kJ/mol/rad^2.
    pub k: f64,
}

/// Ryckaert-Bellemans proper torsion.
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionParameter {
    pub atoms: [AtomSelector; 4],
    /// Coefficients `c0..c5` in kJ/mol.
    pub coefficients: [f64; 6],
}

/// Per-atom non-bonded parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct NonbondedParameter {
    pub atom: AtomSelector,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Lennard-Jones distance scale in nm.
    pub sigma: f64,
    /// Lennard-Jones well depth in kJ/mol.
    pub epsilon: f64,
}

/// The non-bonded section together with its 1-4 scaling factors.
#[derive(Debug, Clone, PartialEq)]
pub struct NonbondedForce {
    pub coulomb14scale: f64,
    pub lj14scale: f64,
    pub atoms: Vec<NonbondedParameter>,
}

impl Default for NonbondedForce {
    fn default() -> Self {
        Self {
            coulomb14scale: 0.5,
            lj14scale: 0.5,
            atoms: Vec::new(),
        }
    }
}

/// A complete force-field parameter table.
///
/// Records are kept in file order. The table is loaded once and then only
/// read, so lookups are linear scans over the small record lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceField {
    pub name: Option<String>,
    pub version: Option<String>,
    pub combining_rule: Option<String>,
    pub atom_types: Vec<AtomType>,
    pub bonds: Vec<BondParameter>,
    pub angles: Vec<AngleParameter>,
    pub torsions: Vec<TorsionParameter>,
    pub nonbonded: Option<NonbondedForce>,
}

impl ForceField {
    pub fn atom_type(&self, name: &str) -> Option<&AtomType> {
        self.atom_types.iter().find(|t| t.name == name)
    }

    pub fn types_of_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a AtomType> {
        self.atom_types.iter().filter(move |t| t.class == class)
    }

    pub fn classes(&self) -> BTreeSet<&str> {
        self.atom_types.iter().map(|t| t.class.as_str()).collect()
    }

    pub fn find_bond(&self, a: &str, b: &str) -> Option<&BondParameter> {
        self.bonds
            .iter()
            .find(|p| matches_classes(&p.atoms, &[a, b]))
    }

    pub fn find_angle(&self, a: &str, b: &str, c: &str) -> Option<&AngleParameter> {
        self.angles
            .iter()
            .find(|p| matches_classes(&p.atoms, &[a, b, c]))
    }

    /// Finds the torsion for the given classes, preferring records without
    /// wildcards over wildcard records.
    pub fn find_torsion(&self, a: &str, b: &str, c: &str, d: &str) -> Option<&TorsionParameter> {
        let classes = [a, b, c, d];
        self.torsions
            .iter()
            .filter(|p| matches_classes(&p.atoms, &classes))
            .min_by_key(|p| p.atoms.iter().filter(|s| s.is_wildcard()).count())
    }

    /// Returns the non-bonded entry that applies to the named atom type.
    ///
    /// An entry keyed by type name wins over one keyed by the type's class.
    pub fn nonbonded_for(&self, type_name: &str) -> Option<&NonbondedParameter> {
        let nonbonded = self.nonbonded.as_ref()?;
        let atom_type = self.atom_type(type_name)?;
        nonbonded
            .atoms
            .iter()
            .find(|p| matches!(&p.atom, AtomSelector::Type(t) if *t == atom_type.name))
            .or_else(|| {
                nonbonded
                    .atoms
                    .iter()
                    .find(|p| matches!(&p.atom, AtomSelector::Class(c) if *c == atom_type.class))
            })
    }

    /// Total number of parameter records (excluding atom types).
    pub fn parameter_count(&self) -> usize {
        self.bonds.len()
            + self.angles.len()
            + self.torsions.len()
            + self.nonbonded.as_ref().map_or(0, |n| n.atoms.len())
    }
}

fn matches_classes(selectors: &[AtomSelector], classes: &[&str]) -> bool {
    let forward = selectors
        .iter()
        .zip(classes)
        .all(|(s, c)| s.matches_class(c));
    forward
        || selectors
            .iter()
            .rev()
            .zip(classes)
            .all(|(s, c)| s.matches_class(c))
}

/// Order-insensitive identity of a bonded record.
///
/// A record and its reverse (`a-b-c` and `c-b-a`) describe the same term.
pub(crate) fn canonical_key(selectors: &[AtomSelector]) -> Vec<AtomSelector> {
    let forward: Vec<AtomSelector> = selectors.to_vec();
    let reverse: Vec<AtomSelector> = selectors.iter().rev().cloned().collect();
    forward.min(reverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForceField {
        ForceField {
            atom_types: vec![
                AtomType::new("opls_135", "CT", 12.011).with_element("C"),
                AtomType::new("opls_140", "HC", 1.008).with_element("H"),
            ],
            bonds: vec![BondParameter {
                atoms: [AtomSelector::class("CT"), AtomSelector::class("HC")],
                length: 0.109,
                k: 284512.0,
            }],
            angles: vec![AngleParameter {
                atoms: [
                    AtomSelector::class("HC"),
                    AtomSelector::class("CT"),
                    AtomSelector::class("CT"),
                ],
                angle: 1.932,
                k: 313.8,
            }],
            torsions: vec![
                TorsionParameter {
                    atoms: [
                        AtomSelector::class(""),
                        AtomSelector::class("CT"),
                        AtomSelector::class("CT"),
                        AtomSelector::class(""),
                    ],
                    coefficients: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                },
                TorsionParameter {
                    atoms: [
                        AtomSelector::class("HC"),
                        AtomSelector::class("CT"),
                        AtomSelector::class("CT"),
                        AtomSelector::class("HC"),
                    ],
                    coefficients: [0.6276, 1.8828, 0.0, -2.5104, 0.0, 0.0],
                },
            ],
            nonbonded: Some(NonbondedForce {
                coulomb14scale: 0.5,
                lj14scale: 0.5,
                atoms: vec![
                    NonbondedParameter {
                        atom: AtomSelector::type_name("opls_135"),
                        charge: -0.18,
                        sigma: 0.35,
                        epsilon: 0.276144,
                    },
                    NonbondedParameter {
                        atom: AtomSelector::class("HC"),
                        charge: 0.06,
                        sigma: 0.25,
                        epsilon: 0.12552,
                    },
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn bond_lookup_is_order_insensitive() {
        let ff = sample();
        assert!(ff.find_bond("CT", "HC").is_some());
        assert!(ff.find_bond("HC", "CT").is_some());
        assert!(ff.find_bond("CT", "CT").is_none());
    }

    #[test]
    fn angle_lookup_matches_reverse_order() {
        let ff = sample();
        assert!(ff.find_angle("CT", "CT", "HC").is_some());
        assert!(ff.find_angle("CT", "HC", "CT").is_none());
    }

    #[test]
    fn torsion_lookup_prefers_specific_over_wildcard() {
        let ff = sample();
        let specific = ff.find_torsion("HC", "CT", "CT", "HC").unwrap();
        assert_eq!(specific.coefficients[0], 0.6276);
        let generic = ff.find_torsion("OH", "CT", "CT", "HC").unwrap();
        assert_eq!(generic.coefficients[0], 1.0);
    }

    #[test]
    fn nonbonded_lookup_falls_back_to_class() {
        let ff = sample();
        assert_eq!(ff.nonbonded_for("opls_135").unwrap().charge, -0.18);
        assert_eq!(ff.nonbonded_for("opls_140").unwrap().charge, 0.06);
        assert!(ff.nonbonded_for("missing").is_none());
    }

    #[test]
    fn classes_are_deduplicated() {
        let mut ff = sample();
        ff.atom_types.push(AtomType::new("opls_136", "CT", 12.011));
        let classes: Vec<_> = ff.classes().into_iter().collect();
        assert_eq!(classes, vec!["CT", "HC"]);
        assert_eq!(ff.types_of_class("CT").count(), 2);
    }

    #[test]
    fn canonical_key_identifies_reversed_records() {
        let a = [AtomSelector::class("HC"), AtomSelector::class("CT")];
        let b = [AtomSelector::class("CT"), AtomSelector::class("HC")];
        assert_eq!(canonical_key(&a), canonical_key(&b));
    }

    #[test]
    fn overridden_types_are_split_and_trimmed() {
        let mut t = AtomType::new("opls_999", "CT", 12.0);
        t.overrides = Some("opls_135, opls_136".to_string());
        let overridden: Vec<_> = t.overridden_types().collect();
        assert_eq!(overridden, vec!["opls_135", "opls_136"]);
    }

    #[test]
    fn selector_display_marks_wildcards_and_types() {
        assert_eq!(AtomSelector::class("").to_string(), "*");
        assert_eq!(AtomSelector::class("CT").to_string(), "CT");
        assert_eq!(AtomSelector::type_name("opls_135").to_string(), "type:opls_135");
    }
}
