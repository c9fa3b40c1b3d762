//! Data-integrity checks for force-field tables.
//!
//! Validation is a single pass over the loaded records. It never mutates the
//! table; it only reports what it finds as a list of [`Issue`]s, each marked
//! as an error (the table is unusable) or a warning (the table is usable but
//! suspicious).

use super::elements::{MASS_TOLERANCE, reference_mass};
use super::model::{AtomSelector, ForceField, canonical_key};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single finding of the validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    #[error("{record} references undeclared atom class '{class}'")]
    UndeclaredClass { record: String, class: String },

    #[error("{record} references undeclared atom type '{name}'")]
    UndeclaredType { record: String, name: String },

    #[error("{record} has non-finite value for '{field}': {value}")]
    NonFinite {
        record: String,
        field: &'static str,
        value: f64,
    },

    #[error("Atom type '{0}' is declared more than once")]
    DuplicateAtomType(String),

    #[error("{kind} parameters for {key} are declared more than once")]
    DuplicateParameter { kind: &'static str, key: String },

    #[error(
        "Atom type '{name}' has mass {mass} but element {element} weighs {expected}"
    )]
    MassMismatch {
        name: String,
        element: String,
        mass: f64,
        expected: f64,
    },

    #[error("Atom type '{0}' has no non-bonded parameters")]
    MissingNonbonded(String),

    #[error("{record} has negative '{field}': {value}")]
    Negative {
        record: String,
        field: &'static str,
        value: f64,
    },

    #[error("1-4 scale factor '{field}' = {value} is outside [0, 1]")]
    ScaleOutOfRange { field: &'static str, value: f64 },
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::UndeclaredClass { .. }
            | Issue::UndeclaredType { .. }
            | Issue::NonFinite { .. }
            | Issue::DuplicateAtomType(_)
            | Issue::DuplicateParameter { .. } => Severity::Error,
            Issue::MassMismatch { .. }
            | Issue::MissingNonbonded(_)
            | Issue::Negative { .. }
            | Issue::ScaleOutOfRange { .. } => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

struct Validator<'a> {
    ff: &'a ForceField,
    classes: HashSet<&'a str>,
    types: HashSet<&'a str>,
    issues: Vec<Issue>,
}

impl<'a> Validator<'a> {
    fn new(ff: &'a ForceField) -> Self {
        Self {
            ff,
            classes: ff.atom_types.iter().map(|t| t.class.as_str()).collect(),
            types: ff.atom_types.iter().map(|t| t.name.as_str()).collect(),
            issues: Vec::new(),
        }
    }

    fn check_selector(&mut self, record: &str, selector: &AtomSelector) {
        match selector {
            AtomSelector::Class(c) if c.is_empty() => {}
            AtomSelector::Class(c) => {
                if !self.classes.contains(c.as_str()) {
                    self.issues.push(Issue::UndeclaredClass {
                        record: record.to_string(),
                        class: c.clone(),
                    });
                }
            }
            AtomSelector::Type(t) => {
                if !self.types.contains(t.as_str()) {
                    self.issues.push(Issue::UndeclaredType {
                        record: record.to_string(),
                        name: t.clone(),
                    });
                }
            }
        }
    }

    fn check_finite(&mut self, record: &str, field: &'static str, value: f64) {
        if !value.is_finite() {
            self.issues.push(Issue::NonFinite {
                record: record.to_string(),
                field,
                value,
            });
        }
    }

    fn check_non_negative(&mut self, record: &str, field: &'static str, value: f64) {
        if value < 0.0 {
            self.issues.push(Issue::Negative {
                record: record.to_string(),
                field,
                value,
            });
        }
    }

    fn check_duplicates(&mut self, kind: &'static str, keys: Vec<Vec<AtomSelector>>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for key in keys {
            if !seen.insert(key.clone()) && reported.insert(key.clone()) {
                let key = key
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("-");
                self.issues.push(Issue::DuplicateParameter { kind, key });
            }
        }
    }

    fn atom_types(&mut self) {
        let ff = self.ff;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for t in &ff.atom_types {
            *counts.entry(t.name.as_str()).or_default() += 1;
        }
        let mut reported = HashSet::new();
        for t in &ff.atom_types {
            if counts[t.name.as_str()] > 1 && reported.insert(t.name.as_str()) {
                self.issues.push(Issue::DuplicateAtomType(t.name.clone()));
            }
            let record = format!("Atom type '{}'", t.name);
            self.check_finite(&record, "mass", t.mass);
            if let Some(element) = &t.element {
                if let Some(expected) = reference_mass(element) {
                    if t.mass.is_finite() && (t.mass - expected).abs() > MASS_TOLERANCE {
                        self.issues.push(Issue::MassMismatch {
                            name: t.name.clone(),
                            element: element.clone(),
                            mass: t.mass,
                            expected,
                        });
                    }
                }
            }
        }
    }

    fn bonded(&mut self) {
        let ff = self.ff;
        for b in &ff.bonds {
            let record = describe("Bond", &b.atoms);
            for s in &b.atoms {
                self.check_selector(&record, s);
            }
            self.check_finite(&record, "length", b.length);
            self.check_finite(&record, "k", b.k);
        }
        for a in &ff.angles {
            let record = describe("Angle", &a.atoms);
            for s in &a.atoms {
                self.check_selector(&record, s);
            }
            self.check_finite(&record, "angle", a.angle);
            self.check_finite(&record, "k", a.k);
        }
        const COEFFICIENT_NAMES: [&str; 6] = ["c0", "c1", "c2", "c3", "c4", "c5"];
        for t in &ff.torsions {
            let record = describe("Torsion", &t.atoms);
            for s in &t.atoms {
                self.check_selector(&record, s);
            }
            for (name, c) in COEFFICIENT_NAMES.into_iter().zip(t.coefficients) {
                self.check_finite(&record, name, c);
            }
        }

        self.check_duplicates(
            "Bond",
            ff.bonds.iter().map(|b| canonical_key(&b.atoms)).collect(),
        );
        self.check_duplicates(
            "Angle",
            ff.angles.iter().map(|a| canonical_key(&a.atoms)).collect(),
        );
        self.check_duplicates(
            "Torsion",
            ff.torsions.iter().map(|t| canonical_key(&t.atoms)).collect(),
        );
    }

    fn nonbonded(&mut self) {
        let ff = self.ff;
        let Some(nb) = &ff.nonbonded else {
            for t in &ff.atom_types {
                self.issues.push(Issue::MissingNonbonded(t.name.clone()));
            }
            return;
        };

        for (field, value) in [
            ("coulomb14scale", nb.coulomb14scale),
            ("lj14scale", nb.lj14scale),
        ] {
            self.check_finite("NonbondedForce", field, value);
            if value.is_finite() && !(0.0..=1.0).contains(&value) {
                self.issues.push(Issue::ScaleOutOfRange { field, value });
            }
        }

        for p in &nb.atoms {
            let record = format!("Non-bonded entry for {}", p.atom);
            self.check_selector(&record, &p.atom);
            self.check_finite(&record, "charge", p.charge);
            self.check_finite(&record, "sigma", p.sigma);
            self.check_finite(&record, "epsilon", p.epsilon);
            self.check_non_negative(&record, "sigma", p.sigma);
            self.check_non_negative(&record, "epsilon", p.epsilon);
        }

        for t in &ff.atom_types {
            let covered = nb.atoms.iter().any(|p| p.atom.matches(t) && !p.atom.is_wildcard());
            if !covered {
                self.issues.push(Issue::MissingNonbonded(t.name.clone()));
            }
        }
    }
}

fn describe(kind: &str, atoms: &[AtomSelector]) -> String {
    let key = atoms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-");
    format!("{} {}", kind, key)
}

impl ForceField {
    /// Checks referential consistency and numeric sanity of every record.
    pub fn validate(&self) -> ValidationReport {
        let mut validator = Validator::new(self);
        validator.atom_types();
        validator.bonded();
        validator.nonbonded();
        ValidationReport {
            issues: validator.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcefield::model::{
        AngleParameter, AtomType, BondParameter, NonbondedForce, NonbondedParameter,
        TorsionParameter,
    };

    fn valid_ff() -> ForceField {
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
                    AtomSelector::class("HC"),
                ],
                angle: 1.881,
                k: 276.144,
            }],
            torsions: vec![TorsionParameter {
                atoms: [
                    AtomSelector::class("HC"),
                    AtomSelector::class("CT"),
                    AtomSelector::class("CT"),
                    AtomSelector::class("HC"),
                ],
                coefficients: [0.6276, 1.8828, 0.0, -2.5104, 0.0, 0.0],
            }],
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
                        atom: AtomSelector::type_name("opls_140"),
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
    fn consistent_table_has_no_issues() {
        let report = valid_ff().validate();
        assert!(report.is_valid());
        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn undeclared_class_in_bonded_record_is_an_error() {
        let mut ff = valid_ff();
        ff.angles[0].atoms[2] = AtomSelector::class("OH");
        let report = ff.validate();
        assert!(!report.is_valid());
        assert!(report.errors().any(
            |i| matches!(i, Issue::UndeclaredClass { class, .. } if class == "OH")
        ));
    }

    #[test]
    fn undeclared_type_in_nonbonded_is_an_error() {
        let mut ff = valid_ff();
        ff.nonbonded.as_mut().unwrap().atoms[1].atom = AtomSelector::type_name("opls_999");
        let report = ff.validate();
        assert!(report.errors().any(
            |i| matches!(i, Issue::UndeclaredType { name, .. } if name == "opls_999")
        ));
        // opls_140 lost its entry as a side effect.
        assert!(report
            .warnings()
            .any(|i| matches!(i, Issue::MissingNonbonded(n) if n == "opls_140")));
    }

    #[test]
    fn wildcards_are_exempt_from_reference_checks() {
        let mut ff = valid_ff();
        ff.torsions[0].atoms[0] = AtomSelector::class("");
        ff.torsions[0].atoms[3] = AtomSelector::class("");
        assert!(ff.validate().is_valid());
    }

    #[test]
    fn non_finite_numbers_are_errors() {
        let mut ff = valid_ff();
        ff.bonds[0].k = f64::INFINITY;
        ff.torsions[0].coefficients[4] = f64::NAN;
        let report = ff.validate();
        let fields: Vec<_> = report
            .errors()
            .filter_map(|i| match i {
                Issue::NonFinite { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["k", "c4"]);
    }

    #[test]
    fn duplicate_type_names_are_errors() {
        let mut ff = valid_ff();
        ff.atom_types.push(AtomType::new("opls_135", "CT", 12.011));
        let report = ff.validate();
        let duplicates: Vec<_> = report
            .errors()
            .filter(|i| matches!(i, Issue::DuplicateAtomType(_)))
            .collect();
        assert_eq!(duplicates.len(), 1);
    }

    #[test]
    fn reversed_duplicate_bond_is_detected() {
        let mut ff = valid_ff();
        ff.bonds.push(BondParameter {
            atoms: [AtomSelector::class("HC"), AtomSelector::class("CT")],
            length: 0.11,
            k: 1.0,
        });
        let report = ff.validate();
        assert!(report.errors().any(
            |i| matches!(i, Issue::DuplicateParameter { kind: "Bond", .. })
        ));
    }

    #[test]
    fn mass_far_from_reference_is_a_warning() {
        let mut ff = valid_ff();
        ff.atom_types[0].mass = 14.0;
        let report = ff.validate();
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
        assert!(matches!(report.issues[0], Issue::MassMismatch { .. }));
    }

    #[test]
    fn united_atom_mass_is_flagged() {
        // A CH3 united atom typed as element C is heavier than carbon alone.
        let mut ff = valid_ff();
        ff.atom_types[0].mass = 15.035;
        assert_eq!(ff.validate().warning_count(), 1);
    }

    #[test]
    fn out_of_range_scale_and_negative_epsilon_are_warnings() {
        let mut ff = valid_ff();
        let nb = ff.nonbonded.as_mut().unwrap();
        nb.lj14scale = 1.5;
        nb.atoms[0].epsilon = -0.1;
        let report = ff.validate();
        assert!(report.is_valid());
        assert!(report
            .warnings()
            .any(|i| matches!(i, Issue::ScaleOutOfRange { field: "lj14scale", .. })));
        assert!(report
            .warnings()
            .any(|i| matches!(i, Issue::Negative { field: "epsilon", .. })));
    }

    #[test]
    fn missing_nonbonded_section_warns_for_every_type() {
        let mut ff = valid_ff();
        ff.nonbonded = None;
        let report = ff.validate();
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn class_keyed_nonbonded_entries_cover_their_types() {
        let mut ff = valid_ff();
        ff.nonbonded.as_mut().unwrap().atoms[1].atom = AtomSelector::class("HC");
        assert!(ff.validate().issues.is_empty());
    }

    #[test]
    fn issues_render_human_readable_messages() {
        let issue = Issue::UndeclaredClass {
            record: "Bond CT-ZZ".to_string(),
            class: "ZZ".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "Bond CT-ZZ references undeclared atom class 'ZZ'"
        );
        assert_eq!(issue.severity(), Severity::Error);
    }
}
