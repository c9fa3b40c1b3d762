use super::error::ForceFieldError;
use super::model::{
    AngleParameter, AtomSelector, AtomType, BondParameter, ForceField, NonbondedForce,
    NonbondedParameter, TorsionParameter,
};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    AtomTypes,
    Bonds,
    Angles,
    Torsions,
    Nonbonded,
}

impl Section {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"AtomTypes" => Some(Self::AtomTypes),
            b"HarmonicBondForce" => Some(Self::Bonds),
            b"HarmonicAngleForce" => Some(Self::Angles),
            b"RBTorsionForce" => Some(Self::Torsions),
            b"NonbondedForce" => Some(Self::Nonbonded),
            _ => None,
        }
    }

    fn record_tag(self) -> &'static [u8] {
        match self {
            Self::AtomTypes => b"Type",
            Self::Bonds => b"Bond",
            Self::Angles => b"Angle",
            Self::Torsions => b"Proper",
            Self::Nonbonded => b"Atom",
        }
    }
}

/// Attributes of a single element, decoded and unescaped.
struct Attrs {
    element: &'static str,
    values: HashMap<String, String>,
}

impl Attrs {
    fn read(element: &'static str, start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut values = HashMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            values.insert(key, value);
        }
        Ok(Self { element, values })
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn required(&self, key: &str) -> Result<String, ForceFieldError> {
        self.optional(key)
            .ok_or_else(|| ForceFieldError::MissingAttribute {
                element: self.element,
                attribute: key.to_string(),
            })
    }

    fn number(&self, key: &str) -> Result<f64, ForceFieldError> {
        let raw = self.required(key)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| ForceFieldError::InvalidNumber {
                element: self.element,
                attribute: key.to_string(),
                value: raw,
            })
    }

    fn number_or(&self, key: &str, default: f64) -> Result<f64, ForceFieldError> {
        if self.values.contains_key(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    /// Reads the selector at 1-based `position`, e.g. `class2` or `type2`.
    fn selector(&self, position: usize) -> Result<AtomSelector, ForceFieldError> {
        let class_key = format!("class{}", position);
        let type_key = format!("type{}", position);
        if let Some(class) = self.optional(&class_key) {
            Ok(AtomSelector::Class(class))
        } else if let Some(type_name) = self.optional(&type_key) {
            Ok(AtomSelector::Type(type_name))
        } else {
            Err(ForceFieldError::MissingAttribute {
                element: self.element,
                attribute: class_key,
            })
        }
    }

    fn selectors<const N: usize>(&self) -> Result<[AtomSelector; N], ForceFieldError> {
        let mut selectors: [AtomSelector; N] =
            std::array::from_fn(|_| AtomSelector::Class(String::new()));
        for (i, slot) in selectors.iter_mut().enumerate() {
            *slot = self.selector(i + 1)?;
        }
        Ok(selectors)
    }
}

fn parse_atom_type(attrs: &Attrs) -> Result<AtomType, ForceFieldError> {
    Ok(AtomType {
        name: attrs.required("name")?,
        class: attrs.required("class")?,
        element: attrs.optional("element"),
        mass: attrs.number("mass")?,
        definition: attrs.optional("def"),
        description: attrs.optional("desc"),
        doi: attrs.optional("doi"),
        overrides: attrs.optional("overrides"),
    })
}

fn parse_bond(attrs: &Attrs) -> Result<BondParameter, ForceFieldError> {
    Ok(BondParameter {
        atoms: attrs.selectors()?,
        length: attrs.number("length")?,
        k: attrs.number("k")?,
    })
}

fn parse_angle(attrs: &Attrs) -> Result<AngleParameter, ForceFieldError> {
    Ok(AngleParameter {
        atoms: attrs.selectors()?,
        angle: attrs.number("angle")?,
        k: attrs.number("k")?,
    })
}

fn parse_torsion(attrs: &Attrs) -> Result<TorsionParameter, ForceFieldError> {
    let mut coefficients = [0.0; 6];
    for (n, c) in coefficients.iter_mut().enumerate() {
        *c = attrs.number(&format!("c{}", n))?;
    }
    Ok(TorsionParameter {
        atoms: attrs.selectors()?,
        coefficients,
    })
}

fn parse_nonbonded_atom(attrs: &Attrs) -> Result<NonbondedParameter, ForceFieldError> {
    let atom = if let Some(type_name) = attrs.optional("type") {
        AtomSelector::Type(type_name)
    } else if let Some(class) = attrs.optional("class") {
        AtomSelector::Class(class)
    } else {
        return Err(ForceFieldError::MissingAttribute {
            element: attrs.element,
            attribute: "type".to_string(),
        });
    };
    Ok(NonbondedParameter {
        atom,
        charge: attrs.number("charge")?,
        sigma: attrs.number("sigma")?,
        epsilon: attrs.number("epsilon")?,
    })
}

fn element_label(section: Section) -> &'static str {
    match section {
        Section::AtomTypes => "Type",
        Section::Bonds => "Bond",
        Section::Angles => "Angle",
        Section::Torsions => "Proper",
        Section::Nonbonded => "Atom",
    }
}

impl ForceField {
    /// Parses a force field from its XML text.
    pub fn from_xml_str(content: &str) -> Result<Self, ForceFieldError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let xml_err = |reader: &Reader<&[u8]>, source: quick_xml::Error| ForceFieldError::Xml {
            position: reader.buffer_position() as u64,
            source,
        };

        let mut ff = ForceField::default();
        let mut seen_root = false;
        let mut section: Option<Section> = None;

        loop {
            let event = reader.read_event().map_err(|e| xml_err(&reader, e))?;
            let (start, is_empty) = match event {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(e) => {
                    if section.is_some() && Section::from_tag(e.name().as_ref()) == section {
                        section = None;
                    }
                    continue;
                }
                Event::Eof => break,
                _ => continue,
            };

            let tag = start.name().as_ref().to_vec();
            if !seen_root {
                if tag != b"ForceField" {
                    return Err(ForceFieldError::UnexpectedRoot(
                        String::from_utf8_lossy(&tag).into_owned(),
                    ));
                }
                let attrs = Attrs::read("ForceField", &start).map_err(|e| xml_err(&reader, e))?;
                ff.name = attrs.optional("name");
                ff.version = attrs.optional("version");
                ff.combining_rule = attrs.optional("combining_rule");
                seen_root = true;
                if is_empty {
                    break;
                }
                continue;
            }

            match section {
                None => match Section::from_tag(&tag) {
                    Some(found) => {
                        if found == Section::Nonbonded {
                            let attrs = Attrs::read("NonbondedForce", &start)
                                .map_err(|e| xml_err(&reader, e))?;
                            let coulomb = attrs.number_or("coulomb14scale", 0.5)?;
                            let lj = attrs.number_or("lj14scale", 0.5)?;
                            match ff.nonbonded.as_ref() {
                                Some(nb) if nb.coulomb14scale != coulomb || nb.lj14scale != lj => {
                                    return Err(ForceFieldError::ConflictingNonbondedScales {
                                        first_coulomb: nb.coulomb14scale,
                                        first_lj: nb.lj14scale,
                                        coulomb,
                                        lj,
                                    });
                                }
                                Some(_) => {
                                    debug!("Merging repeated <NonbondedForce> section.");
                                }
                                None => {
                                    ff.nonbonded = Some(NonbondedForce {
                                        coulomb14scale: coulomb,
                                        lj14scale: lj,
                                        atoms: Vec::new(),
                                    });
                                }
                            }
                        }
                        if !is_empty {
                            section = Some(found);
                        }
                    }
                    None => {
                        warn!(
                            "Skipping unsupported force field section <{}>.",
                            String::from_utf8_lossy(&tag)
                        );
                        if !is_empty {
                            let end = start.to_end().into_owned();
                            reader
                                .read_to_end(end.name())
                                .map_err(|e| xml_err(&reader, e))?;
                        }
                    }
                },
                Some(current) if tag == current.record_tag() => {
                    let attrs = Attrs::read(element_label(current), &start)
                        .map_err(|e| xml_err(&reader, e))?;
                    match current {
                        Section::AtomTypes => ff.atom_types.push(parse_atom_type(&attrs)?),
                        Section::Bonds => ff.bonds.push(parse_bond(&attrs)?),
                        Section::Angles => ff.angles.push(parse_angle(&attrs)?),
                        Section::Torsions => ff.torsions.push(parse_torsion(&attrs)?),
                        Section::Nonbonded => {
                            let param = parse_nonbonded_atom(&attrs)?;
                            if let Some(nb) = ff.nonbonded.as_mut() {
                                nb.atoms.push(param);
                            }
                        }
                    }
                    if !is_empty {
                        let end = start.to_end().into_owned();
                        reader
                            .read_to_end(end.name())
                            .map_err(|e| xml_err(&reader, e))?;
                    }
                }
                Some(current) => {
                    warn!(
                        "Skipping unsupported element <{}> inside <{}>.",
                        String::from_utf8_lossy(&tag),
                        String::from_utf8_lossy(current.record_tag())
                    );
                    if !is_empty {
                        let end = start.to_end().into_owned();
                        reader
                            .read_to_end(end.name())
                            .map_err(|e| xml_err(&reader, e))?;
                    }
                }
            }
        }

        if !seen_root {
            return Err(ForceFieldError::MissingRoot);
        }
        debug!(
            atom_types = ff.atom_types.len(),
            bonds = ff.bonds.len(),
            angles = ff.angles.len(),
            torsions = ff.torsions.len(),
            "Parsed force field."
        );
        Ok(ff)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ForceFieldError> {
        let content = std::fs::read_to_string(path).map_err(|e| ForceFieldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_xml_str(&content)
    }

    /// Loads a force field and rejects it if validation reports errors.
    pub fn load_validated(path: &Path) -> Result<Self, ForceFieldError> {
        let ff = Self::load(path)?;
        let report = ff.validate();
        for issue in report.warnings() {
            warn!("{}", issue);
        }
        if report.is_valid() {
            Ok(ff)
        } else {
            Err(ForceFieldError::Invalid(report))
        }
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), ForceFieldError> {
        writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        let mut root = String::new();
        push_optional(&mut root, "name", &self.name);
        push_optional(&mut root, "version", &self.version);
        push_optional(&mut root, "combining_rule", &self.combining_rule);
        writeln!(writer, "<ForceField{}>", root)?;

        if !self.atom_types.is_empty() {
            writeln!(writer, "  <AtomTypes>")?;
            for t in &self.atom_types {
                let mut line = String::new();
                push_attr(&mut line, "name", &t.name);
                push_attr(&mut line, "class", &t.class);
                push_optional(&mut line, "element", &t.element);
                push_attr(&mut line, "mass", &t.mass.to_string());
                push_optional(&mut line, "def", &t.definition);
                push_optional(&mut line, "desc", &t.description);
                push_optional(&mut line, "doi", &t.doi);
                push_optional(&mut line, "overrides", &t.overrides);
                writeln!(writer, "    <Type{}/>", line)?;
            }
            writeln!(writer, "  </AtomTypes>")?;
        }

        if !self.bonds.is_empty() {
            writeln!(writer, "  <HarmonicBondForce>")?;
            for b in &self.bonds {
                let mut line = selectors_to_attrs(&b.atoms);
                push_attr(&mut line, "length", &b.length.to_string());
                push_attr(&mut line, "k", &b.k.to_string());
                writeln!(writer, "    <Bond{}/>", line)?;
            }
            writeln!(writer, "  </HarmonicBondForce>")?;
        }

        if !self.angles.is_empty() {
            writeln!(writer, "  <HarmonicAngleForce>")?;
            for a in &self.angles {
                let mut line = selectors_to_attrs(&a.atoms);
                push_attr(&mut line, "angle", &a.angle.to_string());
                push_attr(&mut line, "k", &a.k.to_string());
                writeln!(writer, "    <Angle{}/>", line)?;
            }
            writeln!(writer, "  </HarmonicAngleForce>")?;
        }

        if !self.torsions.is_empty() {
            writeln!(writer, "  <RBTorsionForce>")?;
            for t in &self.torsions {
                let mut line = selectors_to_attrs(&t.atoms);
                for (n, c) in t.coefficients.iter().enumerate() {
                    push_attr(&mut line, &format!("c{}", n), &c.to_string());
                }
                writeln!(writer, "    <Proper{}/>", line)?;
            }
            writeln!(writer, "  </RBTorsionForce>")?;
        }

        if let Some(nb) = &self.nonbonded {
            let mut header = String::new();
            push_attr(&mut header, "coulomb14scale", &nb.coulomb14scale.to_string());
            push_attr(&mut header, "lj14scale", &nb.lj14scale.to_string());
            if nb.atoms.is_empty() {
                writeln!(writer, "  <NonbondedForce{}/>", header)?;
            } else {
                writeln!(writer, "  <NonbondedForce{}>", header)?;
                for p in &nb.atoms {
                    let mut line = String::new();
                    match &p.atom {
                        AtomSelector::Type(t) => push_attr(&mut line, "type", t),
                        AtomSelector::Class(c) => push_attr(&mut line, "class", c),
                    }
                    push_attr(&mut line, "charge", &p.charge.to_string());
                    push_attr(&mut line, "sigma", &p.sigma.to_string());
                    push_attr(&mut line, "epsilon", &p.epsilon.to_string());
                    writeln!(writer, "    <Atom{}/>", line)?;
                }
                writeln!(writer, "  </NonbondedForce>")?;
            }
        }

        writeln!(writer, "</ForceField>")?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String, ForceFieldError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<(), ForceFieldError> {
        let file = File::create(path).map_err(|e| ForceFieldError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn push_attr(line: &mut String, key: &str, value: &str) {
    line.push(' ');
    line.push_str(key);
    line.push_str("=\"");
    line.push_str(&escape(value));
    line.push('"');
}

fn push_optional(line: &mut String, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        push_attr(line, key, v);
    }
}

fn selectors_to_attrs(selectors: &[AtomSelector]) -> String {
    let mut line = String::new();
    for (i, s) in selectors.iter().enumerate() {
        match s {
            AtomSelector::Class(c) => push_attr(&mut line, &format!("class{}", i + 1), c),
            AtomSelector::Type(t) => push_attr(&mut line, &format!("type{}", i + 1), t),
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ETHANE_FF: &str = r#"<?xml version="1.0"?>
<ForceField name="FF_opls_uff" version="0.0.1" combining_rule="geometric">
 <AtomTypes>
  <Type name="opls_135" class="CT" element="C" mass="12.01100" def="[C;X4](C)(H)(H)H" desc="alkane CH3" doi="10.1021/ja9621760"/>
  <Type name="opls_140" class="HC" element="H" mass="1.00800" def="H[C;X4]" desc="alkane H" doi="10.1021/ja9621760"/>
 </AtomTypes>
 <HarmonicBondForce>
  <Bond class1="CT" class2="CT" length="0.1529" k="224262.4"/>
  <Bond class1="CT" class2="HC" length="0.109" k="284512.0"/>
 </HarmonicBondForce>
 <HarmonicAngleForce>
  <Angle class1="CT" class2="CT" class3="HC" angle="1.932079482" k="313.8"/>
  <Angle class1="HC" class2="CT" class3="HC" angle="1.88146493365" k="276.144"/>
 </HarmonicAngleForce>
 <RBTorsionForce>
  <Proper class1="HC" class2="CT" class3="CT" class4="HC" c0="0.6276" c1="1.8828" c2="0.0" c3="-2.5104" c4="0.0" c5="0.0"/>
 </RBTorsionForce>
 <NonbondedForce coulomb14scale="0.5" lj14scale="0.5">
  <Atom type="opls_135" charge="-0.18" sigma="0.35" epsilon="0.276144"/>
  <Atom type="opls_140" charge="0.06" sigma="0.25" epsilon="0.12552"/>
 </NonbondedForce>
</ForceField>
"#;

    #[test]
    fn parses_all_record_kinds() {
        let ff = ForceField::from_xml_str(ETHANE_FF).unwrap();
        assert_eq!(ff.name.as_deref(), Some("FF_opls_uff"));
        assert_eq!(ff.combining_rule.as_deref(), Some("geometric"));
        assert_eq!(ff.atom_types.len(), 2);
        assert_eq!(ff.bonds.len(), 2);
        assert_eq!(ff.angles.len(), 2);
        assert_eq!(ff.torsions.len(), 1);

        let ct = ff.atom_type("opls_135").unwrap();
        assert_eq!(ct.class, "CT");
        assert_eq!(ct.element.as_deref(), Some("C"));
        assert_eq!(ct.mass, 12.011);
        assert_eq!(ct.definition.as_deref(), Some("[C;X4](C)(H)(H)H"));
        assert_eq!(ct.doi.as_deref(), Some("10.1021/ja9621760"));

        let torsion = &ff.torsions[0];
        assert_eq!(torsion.coefficients, [0.6276, 1.8828, 0.0, -2.5104, 0.0, 0.0]);

        let nb = ff.nonbonded.as_ref().unwrap();
        assert_eq!(nb.coulomb14scale, 0.5);
        assert_eq!(nb.lj14scale, 0.5);
        assert_eq!(nb.atoms[0].atom, AtomSelector::type_name("opls_135"));
        assert_eq!(nb.atoms[0].charge, -0.18);
    }

    #[test]
    fn reserialized_table_parses_to_equal_records() {
        let ff = ForceField::from_xml_str(ETHANE_FF).unwrap();
        let text = ff.to_xml_string().unwrap();
        let reparsed = ForceField::from_xml_str(&text).unwrap();
        assert_eq!(ff, reparsed);
    }

    #[test]
    fn special_characters_survive_serialization() {
        let mut ff = ForceField::from_xml_str(ETHANE_FF).unwrap();
        ff.atom_types[0].description = Some(r#"alkane "CH3" & <friends>"#.to_string());
        let text = ff.to_xml_string().unwrap();
        assert!(text.contains("&amp;"));
        let reparsed = ForceField::from_xml_str(&text).unwrap();
        assert_eq!(ff, reparsed);
    }

    #[test]
    fn type_selectors_and_wildcards_are_preserved() {
        let xml = r#"<ForceField>
            <AtomTypes><Type name="a" class="CA" element="C" mass="12.0"/></AtomTypes>
            <HarmonicBondForce><Bond type1="a" type2="a" length="0.14" k="1000"/></HarmonicBondForce>
            <RBTorsionForce><Proper class1="" class2="CA" class3="CA" class4="" c0="1" c1="0" c2="0" c3="0" c4="0" c5="0"/></RBTorsionForce>
        </ForceField>"#;
        let ff = ForceField::from_xml_str(xml).unwrap();
        assert_eq!(ff.bonds[0].atoms[0], AtomSelector::type_name("a"));
        assert!(ff.torsions[0].atoms[0].is_wildcard());

        let reparsed = ForceField::from_xml_str(&ff.to_xml_string().unwrap()).unwrap();
        assert_eq!(ff, reparsed);
    }

    #[test]
    fn unknown_sections_are_skipped() {
        let xml = r#"<ForceField>
            <AtomTypes><Type name="a" class="CA" mass="12.0"/></AtomTypes>
            <PeriodicTorsionForce><Proper class1="CA" class2="CA" class3="CA" class4="CA" periodicity1="2"/></PeriodicTorsionForce>
            <Residues/>
        </ForceField>"#;
        let ff = ForceField::from_xml_str(xml).unwrap();
        assert_eq!(ff.atom_types.len(), 1);
        assert!(ff.torsions.is_empty());
    }

    #[test]
    fn missing_attribute_is_reported_with_element() {
        let xml = r#"<ForceField><HarmonicBondForce><Bond class1="CT" length="0.1" k="1"/></HarmonicBondForce></ForceField>"#;
        let err = ForceField::from_xml_str(xml).unwrap_err();
        match err {
            ForceFieldError::MissingAttribute { element, attribute } => {
                assert_eq!(element, "Bond");
                assert_eq!(attribute, "class2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_number_is_reported_with_value() {
        let xml = r#"<ForceField><AtomTypes><Type name="a" class="CA" mass="twelve"/></AtomTypes></ForceField>"#;
        let err = ForceField::from_xml_str(xml).unwrap_err();
        assert!(matches!(
            err,
            ForceFieldError::InvalidNumber { element: "Type", ref value, .. } if value == "twelve"
        ));
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = ForceField::from_xml_str("<hoomd_xml/>").unwrap_err();
        assert!(matches!(err, ForceFieldError::UnexpectedRoot(ref tag) if tag == "hoomd_xml"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = ForceField::from_xml_str("").unwrap_err();
        assert!(matches!(err, ForceFieldError::MissingRoot));
    }

    #[test]
    fn unclosed_tag_is_an_xml_error() {
        let err = ForceField::from_xml_str("<ForceField><AtomTypes></ForceField>").unwrap_err();
        assert!(matches!(err, ForceFieldError::Xml { .. }));
    }

    #[test]
    fn empty_nonbonded_section_keeps_scales() {
        let xml = r#"<ForceField><NonbondedForce coulomb14scale="0.8333" lj14scale="0.5"/></ForceField>"#;
        let ff = ForceField::from_xml_str(xml).unwrap();
        let nb = ff.nonbonded.as_ref().unwrap();
        assert_eq!(nb.coulomb14scale, 0.8333);
        assert!(nb.atoms.is_empty());
        let reparsed = ForceField::from_xml_str(&ff.to_xml_string().unwrap()).unwrap();
        assert_eq!(ff, reparsed);
    }

    #[test]
    fn repeated_nonbonded_sections_are_merged() {
        let xml = r#"<ForceField>
            <NonbondedForce coulomb14scale="0.5" lj14scale="0.5">
                <Atom type="a" charge="0.1" sigma="0.3" epsilon="0.2"/>
            </NonbondedForce>
            <NonbondedForce coulomb14scale="0.5" lj14scale="0.5">
                <Atom type="b" charge="-0.1" sigma="0.3" epsilon="0.2"/>
            </NonbondedForce>
        </ForceField>"#;
        let ff = ForceField::from_xml_str(xml).unwrap();
        let nb = ff.nonbonded.as_ref().unwrap();
        assert_eq!(nb.atoms.len(), 2);
        assert_eq!(nb.atoms[0].atom, AtomSelector::type_name("a"));
        assert_eq!(nb.atoms[1].atom, AtomSelector::type_name("b"));
        let reparsed = ForceField::from_xml_str(&ff.to_xml_string().unwrap()).unwrap();
        assert_eq!(ff, reparsed);
    }

    #[test]
    fn repeated_nonbonded_sections_with_different_scales_are_rejected() {
        let xml = r#"<ForceField>
            <NonbondedForce coulomb14scale="0.5" lj14scale="0.5"/>
            <NonbondedForce coulomb14scale="0.8333" lj14scale="0.5"/>
        </ForceField>"#;
        let err = ForceField::from_xml_str(xml).unwrap_err();
        assert!(matches!(
            err,
            ForceFieldError::ConflictingNonbondedScales { coulomb, .. } if coulomb == 0.8333
        ));
    }

    #[test]
    fn save_and_load_through_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ff.xml");
        let ff = ForceField::from_xml_str(ETHANE_FF).unwrap();
        ff.save(&path).unwrap();
        let loaded = ForceField::load(&path).unwrap();
        assert_eq!(ff, loaded);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ForceField::load(&dir.path().join("missing.xml"));
        assert!(matches!(result, Err(ForceFieldError::Io { .. })));
    }

    #[test]
    fn load_validated_rejects_dangling_references() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        fs::write(
            &path,
            r#"<ForceField>
                <AtomTypes><Type name="a" class="CA" mass="12.0"/></AtomTypes>
                <HarmonicBondForce><Bond class1="CA" class2="ZZ" length="0.14" k="1"/></HarmonicBondForce>
            </ForceField>"#,
        )
        .unwrap();
        let result = ForceField::load_validated(&path);
        assert!(matches!(result, Err(ForceFieldError::Invalid(_))));
    }
}
