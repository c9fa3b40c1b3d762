use super::error::MorphologyError;
use super::model::Morphology;
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

/// Outcome of [`Morphology::fix_images`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageFixSummary {
    /// Bonds found spanning more than half the box.
    pub stretched_bonds: usize,
    /// Atom moves performed while unwrapping.
    pub moved_atoms: usize,
}

impl Morphology {
    /// Folds every position into `[-L/2, L/2]` on each axis and records the
    /// number of box lengths removed in the image flags.
    ///
    /// `position + image * L` is unchanged for every atom.
    pub fn wrap_positions(&mut self) -> Result<(), MorphologyError> {
        let dims = self.box_dimensions()?;
        let mut positions = self.positions()?;
        let mut images = self.images()?;
        if images.len() != positions.len() {
            return Err(MorphologyError::LengthMismatch {
                section: "image".to_string(),
                found: images.len(),
                expected: positions.len(),
            });
        }

        for (i, (position, image)) in positions.iter_mut().zip(images.iter_mut()).enumerate() {
            for axis in 0..3 {
                let length = dims[axis];
                let half = length / 2.0;
                let value = &mut position[axis];
                if !value.is_finite() {
                    return Err(MorphologyError::NonFinitePosition(i));
                }
                if *value > half {
                    let shift = ((*value - half) / length).ceil();
                    *value -= shift * length;
                    image[axis] += shift as i32;
                }
                if *value < -half {
                    let shift = ((-half - *value) / length).ceil();
                    *value += shift * length;
                    image[axis] -= shift as i32;
                }
                // Rounding in the jump above can leave a value a hair outside.
                while *value > half {
                    *value -= length;
                    image[axis] += 1;
                }
                while *value < -half {
                    *value += length;
                    image[axis] -= 1;
                }
            }
        }

        self.set_positions(&positions);
        self.set_images(&images);
        Ok(())
    }

    /// Resets every image flag to `0 0 0`.
    pub fn zero_images(&mut self) -> Result<(), MorphologyError> {
        let natoms = self.positions()?.len();
        self.set_images(&vec![[0; 3]; natoms]);
        Ok(())
    }

    /// Builds neighbour lists from the bond section.
    pub fn bond_adjacency(&self) -> Result<Vec<Vec<usize>>, MorphologyError> {
        let mut adjacency = vec![Vec::new(); self.atom_count()];
        for bond in self.bonds()? {
            adjacency[bond.a].push(bond.b);
            adjacency[bond.b].push(bond.a);
        }
        Ok(adjacency)
    }

    /// Repairs molecules broken across the periodic boundary.
    ///
    /// Images are zeroed first. Every bond longer than half the box on some
    /// axis triggers an unwrap of the bonded cluster around its first atom:
    /// each reachable atom is moved by whole box lengths to the image
    /// nearest the atom it was reached from. Saving the result re-wraps the
    /// positions and records consistent image flags.
    #[instrument(skip_all)]
    pub fn fix_images(&mut self) -> Result<ImageFixSummary, MorphologyError> {
        self.zero_images()?;
        let dims = self.box_dimensions()?;
        let adjacency = self.bond_adjacency()?;
        let bonds = self.bonds()?;
        let mut positions = self.positions()?;
        let mut summary = ImageFixSummary::default();

        for bond in &bonds {
            let delta = positions[bond.a] - positions[bond.b];
            if is_stretched(&delta, &dims) {
                debug!(
                    "Periodic bond found: {} {} {} (delta = {:?})",
                    bond.name, bond.a, bond.b, delta
                );
                summary.stretched_bonds += 1;
                summary.moved_atoms += unwrap_cluster(bond.a, &mut positions, &adjacency, &dims);
            }
        }

        self.set_positions(&positions);
        info!(
            "Fixed images: {} stretched bonds, {} atom moves.",
            summary.stretched_bonds, summary.moved_atoms
        );
        Ok(summary)
    }
}

fn is_stretched(delta: &Vector3<f64>, dims: &Vector3<f64>) -> bool {
    (0..3).any(|axis| delta[axis].abs() > dims[axis] / 2.0)
}

/// Walks the bonded cluster from `origin` with an explicit stack, moving each
/// newly reached atom next to its predecessor. Returns the number of moves.
fn unwrap_cluster(
    origin: usize,
    positions: &mut [Point3<f64>],
    adjacency: &[Vec<usize>],
    dims: &Vector3<f64>,
) -> usize {
    let mut visited = vec![false; positions.len()];
    let mut stack = vec![origin];
    visited[origin] = true;
    let mut moves = 0;

    while let Some(centre) = stack.pop() {
        for &neighbour in &adjacency[centre] {
            if visited[neighbour] {
                continue;
            }
            visited[neighbour] = true;
            let delta = positions[centre] - positions[neighbour];
            let mut moved = false;
            for axis in 0..3 {
                if delta[axis].abs() > dims[axis] / 2.0 {
                    let shift = (delta[axis] / dims[axis]).round();
                    positions[neighbour][axis] += shift * dims[axis];
                    moved = true;
                }
            }
            if moved {
                moves += 1;
            }
            stack.push(neighbour);
        }
    }
    moves
}
