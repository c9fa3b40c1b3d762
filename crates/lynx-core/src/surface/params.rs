use super::error::SurfaceError;
use rand::distributions::WeightedIndex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Relative abundance of the metal species substituted for placeholder
/// atoms. Species keep their declaration order; a repeated species keeps
/// its first position and takes its last weight.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Stoichiometry {
    entries: Vec<(String, f64)>,
}

impl Stoichiometry {
    pub fn new(entries: Vec<(String, f64)>) -> Result<Self, SurfaceError> {
        if entries.is_empty() {
            return Err(SurfaceError::InvalidStoichiometry(
                "at least one species is required".to_string(),
            ));
        }
        for (species, weight) in &entries {
            if species.is_empty() {
                return Err(SurfaceError::InvalidStoichiometry(
                    "species names cannot be empty".to_string(),
                ));
            }
            if !weight.is_finite() || *weight < 0.0 {
                return Err(SurfaceError::InvalidStoichiometry(format!(
                    "weight of '{}' must be a finite non-negative number (got {})",
                    species, weight
                )));
            }
        }
        let mut unique: Vec<(String, f64)> = Vec::with_capacity(entries.len());
        for (species, weight) in entries {
            match unique.iter_mut().find(|(s, _)| *s == species) {
                Some(existing) => existing.1 = weight,
                None => unique.push((species, weight)),
            }
        }
        if unique.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
            return Err(SurfaceError::InvalidStoichiometry(
                "weights must not all be zero".to_string(),
            ));
        }
        Ok(Self { entries: unique })
    }

    pub fn weight_of(&self, species: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == species)
            .map(|(_, w)| *w)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    /// Probability of each species, in declaration order.
    pub fn probabilities(&self) -> Vec<f64> {
        let total: f64 = self.entries.iter().map(|(_, w)| w).sum();
        self.entries.iter().map(|(_, w)| w / total).collect()
    }

    /// A sampling distribution over species indices.
    pub fn distribution(&self) -> Result<WeightedIndex<f64>, SurfaceError> {
        WeightedIndex::new(self.entries.iter().map(|(_, w)| *w))
            .map_err(|e| SurfaceError::InvalidStoichiometry(e.to_string()))
    }
}

/// Two mixes are equal when they name the same species with the same
/// weights, whatever the declaration order.
impl PartialEq for Stoichiometry {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(species, weight)| other.weight_of(species) == Some(*weight))
    }
}

impl Default for Stoichiometry {
    fn default() -> Self {
        Self {
            entries: vec![
                ("Mo".to_string(), 1.0),
                ("V".to_string(), 0.3),
                ("Nb".to_string(), 0.15),
                ("Te".to_string(), 0.15),
            ],
        }
    }
}

/// Parses `{'Mo': 1, 'V': 0.3}`. Braces and quotes are optional, so
/// `Mo:1,V:0.3` is accepted too.
impl FromStr for Stoichiometry {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let body = body.strip_prefix('{').unwrap_or(body);
        let body = body.strip_suffix('}').unwrap_or(body);

        let mut entries = Vec::new();
        for cell in body.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let (key, value) = cell.split_once(':').ok_or_else(|| {
                SurfaceError::InvalidStoichiometry(format!("expected 'species: weight', got '{}'", cell))
            })?;
            let key = key.trim().trim_matches(|c| c == '\'' || c == '"').trim();
            let value: f64 = value.trim().parse().map_err(|_| {
                SurfaceError::InvalidStoichiometry(format!(
                    "invalid weight '{}' for '{}'",
                    value.trim(),
                    key
                ))
            })?;
            entries.push((key.to_string(), value));
        }
        Self::new(entries)
    }
}

impl TryFrom<String> for Stoichiometry {
    type Error = SurfaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Stoichiometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (species, weight)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", species, format_number(*weight))?;
        }
        write!(f, "}}")
    }
}

/// Number of unit cells along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Dimensions {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dimensions {
    pub fn new(x: usize, y: usize, z: usize) -> Result<Self, SurfaceError> {
        if x == 0 || y == 0 || z == 0 {
            return Err(SurfaceError::InvalidDimensions(format!(
                "{}x{}x{}: every dimension must be at least 1",
                x, y, z
            )));
        }
        Ok(Self { x, y, z })
    }

    pub fn cell_count(&self) -> usize {
        self.x * self.y * self.z
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

impl FromStr for Dimensions {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('x')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<usize>()
                    .map_err(|_| SurfaceError::InvalidDimensions(format!("'{}' in '{}'", p, s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [x, y, z] => Self::new(*x, *y, *z),
            _ => Err(SurfaceError::InvalidDimensions(format!(
                "expected AxBxC, got '{}'",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Dimensions {
    type Error = SurfaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Everything that shapes a generated catalyst/hydrocarbon system.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub stoichiometry: Stoichiometry,
    pub dimensions: Dimensions,
    /// Unit-cell template file.
    pub template: String,
    /// Hydrocarbon template file.
    pub organic: String,
    /// Separation between the bottom planes of the two plates, in Angstroms.
    pub crystal_separation: f64,
    /// Box length along z, in nm.
    pub z_box_size: f64,
    /// Whether neighbouring cells are bonded to each other.
    pub bonds_periodic: bool,
    pub number_of_organic_mols: usize,
    /// Force field name, if the output should be validated against one.
    pub forcefield: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            stoichiometry: Stoichiometry::default(),
            dimensions: Dimensions::default(),
            template: "templateM1.hoomdxml".to_string(),
            organic: "ethane.pdb".to_string(),
            crystal_separation: 25.0,
            z_box_size: 20.0,
            bonds_periodic: true,
            number_of_organic_mols: 200,
            forcefield: None,
        }
    }
}

impl GenerationParams {
    /// Validates the scalar parameters.
    pub fn check(&self) -> Result<(), SurfaceError> {
        if !self.crystal_separation.is_finite() || self.crystal_separation < 0.0 {
            return Err(SurfaceError::InvalidParameter(format!(
                "crystal separation must be non-negative (got {})",
                self.crystal_separation
            )));
        }
        if !self.z_box_size.is_finite() || self.z_box_size <= 0.0 {
            return Err(SurfaceError::InvalidParameter(format!(
                "z box size must be positive (got {})",
                self.z_box_size
            )));
        }
        Ok(())
    }
}

/// Formats a float the way the generated file names expect: integral
/// values keep one decimal place (`25.0`), others use the shortest form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn file_stem(path: &str) -> &str {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}

fn flag(name: &str, on: bool) -> String {
    format!("{}{}", initial(name), if on { "On" } else { "Off" })
}

fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default()
}

/// Derives an output file name from the parameters that differ from their
/// defaults, e.g. `out_C30.0_D2x2x1.hoomdxml`.
///
/// Parameters are visited in alphabetical order of their names.
pub fn output_file_name(params: &GenerationParams, extension: &str) -> String {
    let defaults = GenerationParams::default();
    let mut tokens: Vec<String> = Vec::new();

    if params.bonds_periodic != defaults.bonds_periodic {
        tokens.push(flag("bonds_periodic", params.bonds_periodic));
    }
    if params.crystal_separation != defaults.crystal_separation {
        tokens.push(format!(
            "{}{}",
            initial("crystal_separation"),
            format_number(params.crystal_separation)
        ));
    }
    if params.dimensions != defaults.dimensions {
        tokens.push(format!("D{}", params.dimensions));
    }
    if params.forcefield != defaults.forcefield {
        let name = params.forcefield.as_deref().unwrap_or("None");
        let name = name.strip_suffix(".xml").unwrap_or(name);
        tokens.push(format!("{}{}", initial("forcefield"), name));
    }
    if params.number_of_organic_mols != defaults.number_of_organic_mols {
        tokens.push(format!(
            "{}{}",
            initial("number_of_organic_mols"),
            params.number_of_organic_mols
        ));
    }
    if params.organic != defaults.organic {
        tokens.push(format!("{}{}", initial("organic"), params.organic));
    }
    if params.stoichiometry != defaults.stoichiometry {
        let body: String = params
            .stoichiometry
            .entries()
            .iter()
            .map(|(species, weight)| format!("{}{}", species, format_number(*weight)))
            .collect();
        tokens.push(format!("S{}", body));
    }
    if params.template != defaults.template {
        tokens.push(format!("T{}", file_stem(&params.template)));
    }
    if params.z_box_size != defaults.z_box_size {
        tokens.push(format!(
            "{}{}",
            initial("z_box_size"),
            format_number(params.z_box_size)
        ));
    }

    let mut name = String::from("out");
    for token in tokens {
        name.push('_');
        name.push_str(&token);
    }
    format!("{}.{}", name, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;

    #[test]
    fn stoichiometry_parses_dictionary_syntax() {
        let s: Stoichiometry = "{'Mo': 1, 'V': 0.3, 'Nb': 0.15, 'Te': 0.15}".parse().unwrap();
        assert_eq!(s, Stoichiometry::default());
        let s: Stoichiometry = r#"{"Mo": 2, "V": 1}"#.parse().unwrap();
        assert_eq!(s.entries()[0], ("Mo".to_string(), 2.0));
    }

    #[test]
    fn stoichiometry_accepts_bare_pairs() {
        let s: Stoichiometry = "Mo:1,V:1".parse().unwrap();
        assert_eq!(s.probabilities(), vec![0.5, 0.5]);
    }

    #[test]
    fn stoichiometry_rejects_bad_input() {
        assert!("{}".parse::<Stoichiometry>().is_err());
        assert!("{'Mo': abc}".parse::<Stoichiometry>().is_err());
        assert!("{'Mo': -1}".parse::<Stoichiometry>().is_err());
        assert!("{'Mo': 0, 'V': 0}".parse::<Stoichiometry>().is_err());
        assert!("{'Mo' 1}".parse::<Stoichiometry>().is_err());
    }

    #[test]
    fn stoichiometry_display_round_trips() {
        let s = Stoichiometry::default();
        assert_eq!(s.to_string(), "{'Mo': 1.0, 'V': 0.3, 'Nb': 0.15, 'Te': 0.15}");
        assert_eq!(s.to_string().parse::<Stoichiometry>().unwrap(), s);
    }

    #[test]
    fn repeated_species_keep_first_position_and_last_weight() {
        let s: Stoichiometry = "{'Mo': 1, 'V': 1, 'Mo': 3}".parse().unwrap();
        assert_eq!(
            s.entries(),
            &[("Mo".to_string(), 3.0), ("V".to_string(), 1.0)]
        );
        let s: Stoichiometry = "{'Mo': 1, 'Mo': 1, 'V': 1}".parse().unwrap();
        assert_eq!(s.probabilities(), vec![0.5, 0.5]);
    }

    #[test]
    fn stoichiometry_equality_ignores_declaration_order() {
        let permuted: Stoichiometry = "{'V': 0.3, 'Mo': 1, 'Nb': 0.15, 'Te': 0.15}".parse().unwrap();
        assert_eq!(permuted, Stoichiometry::default());
        let different: Stoichiometry = "{'V': 0.3, 'Mo': 1, 'Nb': 0.15, 'Te': 0.2}".parse().unwrap();
        assert_ne!(different, Stoichiometry::default());
        let subset: Stoichiometry = "{'Mo': 1, 'V': 0.3}".parse().unwrap();
        assert_ne!(subset, Stoichiometry::default());
    }

    #[test]
    fn sampling_only_yields_declared_species_with_positive_weight() {
        let s: Stoichiometry = "{'Mo': 1, 'V': 0, 'Te': 1}".parse().unwrap();
        let dist = s.distribution().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let species: Vec<&str> = s.species().collect();
        for _ in 0..500 {
            let picked = species[dist.sample(&mut rng)];
            assert!(picked == "Mo" || picked == "Te");
        }
    }

    #[test]
    fn dimensions_parse_and_display() {
        let d: Dimensions = "2x3x1".parse().unwrap();
        assert_eq!(d, Dimensions { x: 2, y: 3, z: 1 });
        assert_eq!(d.to_string(), "2x3x1");
        assert_eq!(d.cell_count(), 6);
    }

    #[test]
    fn dimensions_reject_bad_input() {
        assert!("2x2".parse::<Dimensions>().is_err());
        assert!("0x1x1".parse::<Dimensions>().is_err());
        assert!("ax1x1".parse::<Dimensions>().is_err());
    }

    #[test]
    fn default_parameters_give_plain_name() {
        let params = GenerationParams::default();
        assert_eq!(output_file_name(&params, "hoomdxml"), "out.hoomdxml");
    }

    #[test]
    fn non_default_parameters_appear_in_alphabetical_order() {
        let params = GenerationParams {
            z_box_size: 15.0,
            dimensions: "2x2x1".parse().unwrap(),
            crystal_separation: 30.0,
            bonds_periodic: false,
            template: "cells/M1UnitCell.hoomdxml".to_string(),
            stoichiometry: "{'Mo': 1, 'V': 0.5}".parse().unwrap(),
            number_of_organic_mols: 0,
            forcefield: Some("FF_opls_uff".to_string()),
            ..Default::default()
        };
        assert_eq!(
            output_file_name(&params, "hoomdxml"),
            "out_BOff_C30.0_D2x2x1_FFF_opls_uff_N0_SMo1.0V0.5_TM1UnitCell_Z15.0.hoomdxml"
        );
    }

    #[test]
    fn reordered_default_stoichiometry_gives_plain_name() {
        let params = GenerationParams {
            stoichiometry: "{'V': 0.3, 'Mo': 1, 'Nb': 0.15, 'Te': 0.15}".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(output_file_name(&params, "hoomdxml"), "out.hoomdxml");
    }

    #[test]
    fn forcefield_token_drops_xml_extension() {
        let params = GenerationParams {
            forcefield: Some("FF_opls_uff.xml".to_string()),
            ..Default::default()
        };
        assert_eq!(
            output_file_name(&params, "hoomdxml"),
            "out_FFF_opls_uff.hoomdxml"
        );
    }

    #[test]
    fn parameter_check_rejects_nonsense() {
        let params = GenerationParams {
            z_box_size: 0.0,
            ..Default::default()
        };
        assert!(params.check().is_err());
        assert!(GenerationParams::default().check().is_ok());
    }

    #[test]
    fn number_formatting_keeps_one_decimal_for_integers() {
        assert_eq!(format_number(25.0), "25.0");
        assert_eq!(format_number(0.15), "0.15");
    }
}
