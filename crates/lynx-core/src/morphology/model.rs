use super::error::MorphologyError;
use nalgebra::{Point3, Vector3};

/// One child element of the configuration block, e.g. `<position>`.
///
/// The text content is stored line by line, each line split on whitespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub tag: String,
    /// Attributes in document order. Keys are lower-cased on read.
    pub attributes: Vec<(String, String)>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }
}

/// A bond record from the `<bond>` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondRecord {
    pub name: String,
    pub a: usize,
    pub b: usize,
}

/// A HOOMD-blue XML snapshot.
///
/// Sections are kept in document order so that unknown sections (masses,
/// charges, angles, ...) survive a read/write cycle untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Morphology {
    pub root_tag: String,
    pub root_attributes: Vec<(String, String)>,
    pub config_tag: String,
    pub config_attributes: Vec<(String, String)>,
    pub sections: Vec<Section>,
}

impl Default for Morphology {
    fn default() -> Self {
        Self {
            root_tag: "hoomd_xml".to_string(),
            root_attributes: vec![("version".to_string(), "1.6".to_string())],
            config_tag: "configuration".to_string(),
            config_attributes: vec![("time_step".to_string(), "0".to_string())],
            sections: Vec::new(),
        }
    }
}

impl Morphology {
    pub fn section(&self, tag: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.tag == tag)
    }

    pub fn section_mut(&mut self, tag: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.tag == tag)
    }

    /// Inserts a section, replacing any existing section with the same tag
    /// in place.
    pub fn set_section(&mut self, section: Section) {
        match self.section_mut(&section.tag) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    fn require(&self, tag: &str) -> Result<&Section, MorphologyError> {
        self.section(tag)
            .ok_or_else(|| MorphologyError::MissingSection(tag.to_string()))
    }

    pub fn atom_count(&self) -> usize {
        self.section("position").map_or(0, |s| s.rows.len())
    }

    /// Returns the box edge lengths `(lx, ly, lz)`.
    pub fn box_dimensions(&self) -> Result<Vector3<f64>, MorphologyError> {
        let section = self.require("box")?;
        let mut dims = [0.0; 3];
        for (slot, key) in dims.iter_mut().zip(["lx", "ly", "lz"]) {
            let raw = section
                .attribute(key)
                .ok_or_else(|| MorphologyError::MissingAttribute {
                    section: "box".to_string(),
                    attribute: key.to_string(),
                })?;
            let value: f64 = raw.trim().parse().map_err(|_| MorphologyError::InvalidValue {
                section: "box".to_string(),
                row: 0,
                value: raw.to_string(),
            })?;
            if !value.is_finite() || value <= 0.0 {
                return Err(MorphologyError::InvalidBox(value));
            }
            *slot = value;
        }
        Ok(Vector3::new(dims[0], dims[1], dims[2]))
    }

    pub fn set_box_dimensions(&mut self, dims: Vector3<f64>) {
        let mut section = self.section("box").cloned().unwrap_or_else(|| Section::new("box"));
        section.set_attribute("lx", dims.x.to_string());
        section.set_attribute("ly", dims.y.to_string());
        section.set_attribute("lz", dims.z.to_string());
        self.set_section(section);
    }

    pub fn positions(&self) -> Result<Vec<Point3<f64>>, MorphologyError> {
        let section = self.require("position")?;
        section
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let [x, y, z] = parse_triplet::<f64>("position", i, row)?;
                Ok(Point3::new(x, y, z))
            })
            .collect()
    }

    pub fn set_positions(&mut self, positions: &[Point3<f64>]) {
        let rows = positions
            .iter()
            .map(|p| vec![p.x.to_string(), p.y.to_string(), p.z.to_string()])
            .collect();
        self.replace_rows("position", rows);
    }

    /// Returns image flags, or all zeros when the morphology has no
    /// `<image>` section.
    pub fn images(&self) -> Result<Vec<[i32; 3]>, MorphologyError> {
        match self.section("image") {
            Some(section) => section
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| parse_triplet::<i32>("image", i, row))
                .collect(),
            None => Ok(vec![[0; 3]; self.atom_count()]),
        }
    }

    pub fn set_images(&mut self, images: &[[i32; 3]]) {
        let rows = images
            .iter()
            .map(|img| img.iter().map(ToString::to_string).collect())
            .collect();
        self.replace_rows("image", rows);
    }

    pub fn types(&self) -> Result<Vec<String>, MorphologyError> {
        let section = self.require("type")?;
        section
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.first()
                    .cloned()
                    .ok_or_else(|| MorphologyError::MalformedRow {
                        section: "type".to_string(),
                        row: i,
                    })
            })
            .collect()
    }

    pub fn set_types(&mut self, types: &[String]) {
        let rows = types.iter().map(|t| vec![t.clone()]).collect();
        self.replace_rows("type", rows);
    }

    /// Returns the bonds, or an empty list when there is no `<bond>` section.
    ///
    /// Bond indices are checked against the number of positions.
    pub fn bonds(&self) -> Result<Vec<BondRecord>, MorphologyError> {
        let Some(section) = self.section("bond") else {
            return Ok(Vec::new());
        };
        let natoms = self.atom_count();
        section
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() < 3 {
                    return Err(MorphologyError::MalformedRow {
                        section: "bond".to_string(),
                        row: i,
                    });
                }
                let index = |raw: &String| -> Result<usize, MorphologyError> {
                    let idx: usize = raw.parse().map_err(|_| MorphologyError::InvalidValue {
                        section: "bond".to_string(),
                        row: i,
                        value: raw.clone(),
                    })?;
                    if idx >= natoms {
                        return Err(MorphologyError::BondOutOfRange {
                            row: i,
                            index: idx,
                            natoms,
                        });
                    }
                    Ok(idx)
                };
                Ok(BondRecord {
                    name: row[0].clone(),
                    a: index(&row[1])?,
                    b: index(&row[2])?,
                })
            })
            .collect()
    }

    pub fn set_bonds(&mut self, bonds: &[BondRecord]) {
        let rows = bonds
            .iter()
            .map(|b| vec![b.name.clone(), b.a.to_string(), b.b.to_string()])
            .collect();
        self.replace_rows("bond", rows);
    }

    fn replace_rows(&mut self, tag: &str, rows: Vec<Vec<String>>) {
        let mut section = self.section(tag).cloned().unwrap_or_else(|| Section::new(tag));
        section.rows = rows;
        section.set_attribute("num", section.rows.len().to_string());
        self.set_section(section);
    }
}

fn parse_triplet<T: std::str::FromStr + Copy + Default>(
    section: &str,
    row_index: usize,
    row: &[String],
) -> Result<[T; 3], MorphologyError> {
    if row.len() < 3 {
        return Err(MorphologyError::MalformedRow {
            section: section.to_string(),
            row: row_index,
        });
    }
    let mut values = [T::default(); 3];
    for (slot, raw) in values.iter_mut().zip(row) {
        *slot = raw.parse().map_err(|_| MorphologyError::InvalidValue {
            section: section.to_string(),
            row: row_index,
            value: raw.clone(),
        })?;
    }
    Ok(values)
}
