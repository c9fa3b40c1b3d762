use super::error::SurfaceError;
use super::params::{Dimensions, Stoichiometry};
use crate::morphology::{BondRecord, Morphology, Section};
use nalgebra::{Point3, Rotation3, Vector3};
use rand::Rng;
use rand::distributions::Distribution;
use tracing::{debug, info, instrument};

/// Crystallographic unit-cell extents of the M1 phase, in nm
/// (DeSanto et al. 2006, doi:10.1007/s11244-006-0068-8).
pub const X_EXTENT: f64 = 2.148490;
pub const Y_EXTENT: f64 = 2.664721;
pub const Z_EXTENT: f64 = 0.400321;

/// Name of the template particles replaced according to the stoichiometry.
pub const PLACEHOLDER: &str = "X";

/// Bonds from a cell to its +x neighbour, as (this cell, neighbour) indices.
const X_BONDS: [(usize, usize); 7] = [
    (60, 21),
    (137, 13),
    (134, 16),
    (122, 16),
    (19, 119),
    (66, 33),
    (18, 65),
];

/// Bonds from a cell to its +y neighbour.
const Y_BONDS: [(usize, usize); 9] = [
    (72, 27),
    (1, 58),
    (1, 73),
    (4, 123),
    (4, 141),
    (6, 141),
    (6, 156),
    (114, 12),
    (159, 12),
];

/// Bonds from a cell to its +x+y diagonal neighbour.
const DIAGONAL_BONDS: [(usize, usize); 1] = [(61, 21)];

/// Smallest template that every inter-cell bond table can index into.
pub fn required_template_size() -> usize {
    X_BONDS
        .iter()
        .chain(&Y_BONDS)
        .chain(&DIAGONAL_BONDS)
        .flat_map(|&(a, b)| [a, b])
        .max()
        .map_or(0, |m| m + 1)
}

/// A flat collection of particles and the bonds between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    pub names: Vec<String>,
    /// Coordinates in nm.
    pub positions: Vec<Point3<f64>>,
    pub bonds: Vec<(usize, usize)>,
}

impl Compound {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add_particle(&mut self, name: impl Into<String>, position: Point3<f64>) -> usize {
        self.names.push(name.into());
        self.positions.push(position);
        self.names.len() - 1
    }

    pub fn add_bond(&mut self, a: usize, b: usize) {
        self.bonds.push((a, b));
    }

    /// Appends `other`, shifting its bond indices. Returns the index of its
    /// first particle in `self`.
    pub fn append(&mut self, other: Compound) -> usize {
        let offset = self.len();
        self.names.extend(other.names);
        self.positions.extend(other.positions);
        self.bonds
            .extend(other.bonds.into_iter().map(|(a, b)| (a + offset, b + offset)));
        offset
    }

    pub fn translate(&mut self, by: Vector3<f64>) {
        for p in &mut self.positions {
            *p += by;
        }
    }

    /// Geometric centre (unweighted mean of positions).
    pub fn center(&self) -> Point3<f64> {
        if self.positions.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.positions.len() as f64)
    }

    /// Rotates every particle about an axis through the origin.
    pub fn rotate(&mut self, rotation: &Rotation3<f64>) {
        for p in &mut self.positions {
            *p = rotation * *p;
        }
    }

    /// Replaces every placeholder particle with a species drawn from the
    /// stoichiometry. Returns the number of substitutions.
    pub fn substitute_placeholders<R: Rng + ?Sized>(
        &mut self,
        stoichiometry: &Stoichiometry,
        rng: &mut R,
    ) -> Result<usize, SurfaceError> {
        let distribution = stoichiometry.distribution()?;
        let species: Vec<&str> = stoichiometry.species().collect();
        let mut count = 0;
        for name in self.names.iter_mut().filter(|n| n.as_str() == PLACEHOLDER) {
            *name = species[distribution.sample(rng)].to_string();
            count += 1;
        }
        Ok(count)
    }

    /// Builds a compound from the types, positions and bonds of a morphology.
    pub fn from_morphology(morphology: &Morphology) -> Result<Self, SurfaceError> {
        let names = morphology.types()?;
        let positions = morphology.positions()?;
        if names.len() != positions.len() {
            return Err(SurfaceError::TemplateMismatch {
                section: "type",
                found: names.len(),
                expected: positions.len(),
            });
        }
        let bonds = morphology
            .bonds()?
            .into_iter()
            .map(|b| (b.a, b.b))
            .collect();
        Ok(Self {
            names,
            positions,
            bonds,
        })
    }

    /// Converts to a HOOMD morphology with zero image flags. Bonds are named
    /// after their sorted particle names, e.g. `C-H`.
    pub fn to_morphology(&self, box_dimensions: Vector3<f64>) -> Morphology {
        let mut morphology = Morphology::default();
        morphology
            .config_attributes
            .push(("dimensions".to_string(), "3".to_string()));
        morphology
            .config_attributes
            .push(("natoms".to_string(), self.len().to_string()));

        let mut box_section = Section::new("box");
        box_section.set_attribute("lx", box_dimensions.x.to_string());
        box_section.set_attribute("ly", box_dimensions.y.to_string());
        box_section.set_attribute("lz", box_dimensions.z.to_string());
        for tilt in ["xy", "xz", "yz"] {
            box_section.set_attribute(tilt, "0");
        }
        morphology.set_section(box_section);

        morphology.set_positions(&self.positions);
        morphology.set_images(&vec![[0; 3]; self.len()]);
        morphology.set_types(&self.names);
        let bonds: Vec<BondRecord> = self
            .bonds
            .iter()
            .map(|&(a, b)| {
                let mut pair = [self.names[a].as_str(), self.names[b].as_str()];
                pair.sort_unstable();
                BondRecord {
                    name: pair.join("-"),
                    a,
                    b,
                }
            })
            .collect();
        morphology.set_bonds(&bonds);
        morphology
    }
}

fn connect(surface: &mut Compound, first: usize, second: usize, table: &[(usize, usize)]) {
    for &(a, b) in table {
        surface.add_bond(first + a, second + b);
    }
}

/// Tiles the unit-cell template into a surface of `dimensions` cells.
///
/// Each cell gets its own random substitution of placeholder particles.
/// With `bonds_periodic` set, neighbouring cells are bonded along +x, +y
/// and the +x+y diagonal using the fixed inter-cell bond tables.
#[instrument(skip_all, fields(dimensions = %dimensions))]
pub fn build_surface<R: Rng + ?Sized>(
    template: &Compound,
    dimensions: Dimensions,
    stoichiometry: &Stoichiometry,
    bonds_periodic: bool,
    rng: &mut R,
) -> Result<Compound, SurfaceError> {
    let required = required_template_size();
    if bonds_periodic && template.len() < required {
        return Err(SurfaceError::TemplateTooSmall {
            required,
            found: template.len(),
        });
    }

    let mut surface = Compound::default();
    for z in 0..dimensions.z {
        let mut offsets = vec![vec![0usize; dimensions.x]; dimensions.y];
        for y in 0..dimensions.y {
            for x in 0..dimensions.x {
                debug!("Adding cell [{}, {}, {}] to surface.", x, y, z);
                let mut cell = template.clone();
                cell.substitute_placeholders(stoichiometry, rng)?;
                cell.translate(Vector3::new(
                    x as f64 * X_EXTENT,
                    y as f64 * Y_EXTENT,
                    z as f64 * Z_EXTENT,
                ));
                offsets[y][x] = surface.append(cell);
                if bonds_periodic && x > 0 {
                    connect(&mut surface, offsets[y][x - 1], offsets[y][x], &X_BONDS);
                }
            }
            if bonds_periodic && y > 0 {
                for x in 0..dimensions.x {
                    connect(&mut surface, offsets[y - 1][x], offsets[y][x], &Y_BONDS);
                }
            }
        }
        if bonds_periodic {
            for y in 0..dimensions.y.saturating_sub(1) {
                for x in 0..dimensions.x.saturating_sub(1) {
                    connect(
                        &mut surface,
                        offsets[y][x],
                        offsets[y + 1][x + 1],
                        &DIAGONAL_BONDS,
                    );
                }
            }
        }
    }
    info!(
        "Surface built: {} cells, {} particles, {} bonds.",
        dimensions.cell_count(),
        surface.len(),
        surface.bonds.len()
    );
    Ok(surface)
}

/// Two facing catalyst plates inside a periodic box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateSystem {
    pub compound: Compound,
    /// Box edge lengths in nm.
    pub box_dimensions: Vector3<f64>,
}

impl PlateSystem {
    pub fn to_morphology(&self) -> Morphology {
        self.compound.to_morphology(self.box_dimensions)
    }
}

/// Places two plates face to face.
///
/// Both plates are centred on the origin, the top plate is flipped by 180
/// degrees about x, and the plates are pushed apart along z so that their
/// bottom planes sit `crystal_separation` Angstroms apart. The box spans the
/// plate footprint in x and y and `z_box_size` nm in z.
pub fn assemble_system(
    mut bottom: Compound,
    mut top: Compound,
    crystal_separation: f64,
    z_box_size: f64,
    dimensions: Dimensions,
) -> PlateSystem {
    let bottom_centre = bottom.center();
    bottom.translate(-bottom_centre.coords);
    let top_centre = top.center();
    top.translate(-top_centre.coords);

    let flip = Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI);
    top.rotate(&flip);

    // Angstrom to nm, split evenly between the two plates.
    let half_gap = crystal_separation / 20.0;
    bottom.translate(Vector3::new(0.0, 0.0, half_gap));
    top.translate(Vector3::new(0.0, 0.0, -half_gap));

    let mut compound = bottom;
    compound.append(top);

    PlateSystem {
        compound,
        box_dimensions: Vector3::new(
            X_EXTENT * dimensions.x as f64,
            Y_EXTENT * dimensions.y as f64,
            z_box_size,
        ),
    }
}
