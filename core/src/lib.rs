#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use clue::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use host::*;
pub use schedule::*;
pub use store::*;
pub use theme::*;
pub use tile::*;
pub use types::*;
pub use view::*;

mod clue;
mod config;
mod engine;
mod error;
mod game;
mod generator;
mod host;
mod schedule;
mod store;
mod theme;
mod tile;
mod types;
mod view;

/// Identifier of a hidden shape, its index in the layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u16);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type ShapeCells = SmallVec<[Coord2; 4]>;

/// A hidden target: trap door, escape hatch or criminal operation depending on the theme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub label: String,
    pub cells: ShapeCells,
    pub complete: bool,
}

impl Shape {
    pub fn size(&self) -> CellCount {
        self.cells.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        self.cells.contains(&coords)
    }
}

/// Where the hidden shapes sit on the grid, before any cell is revealed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeLayout {
    membership: Array2<Option<ShapeId>>,
    shapes: Vec<Shape>,
}

impl ShapeLayout {
    pub fn empty(side: Coord) -> Self {
        Self {
            membership: Array2::default((side, side).to_nd_index()),
            shapes: Vec::new(),
        }
    }

    /// Builds a layout from explicit coordinates, rejecting out of bounds or overlapping shapes.
    pub fn from_shapes(side: Coord, shapes: &[(&str, &[Coord2])]) -> Result<Self> {
        if side == 0 {
            return Err(GameError::InvalidGridSize);
        }

        let mut layout = Self::empty(side);
        for &(label, cells) in shapes {
            if cells.is_empty() {
                return Err(GameError::EmptyShape);
            }
            for &coords in cells {
                layout.validate_coords(coords)?;
            }
            if !layout.is_free(cells) {
                return Err(GameError::ShapeOverlap);
            }
            layout.insert(label, cells);
        }

        Ok(layout)
    }

    pub fn side(&self) -> Coord {
        self.membership.dim().0.try_into().unwrap_or(Coord::MAX)
    }

    pub fn size(&self) -> Coord2 {
        (self.side(), self.side())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn into_parts(self) -> (Array2<Option<ShapeId>>, Vec<Shape>) {
        (self.membership, self.shapes)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let side = self.side();
        if coords.0 < side && coords.1 < side {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn shape_at(&self, coords: Coord2) -> Option<ShapeId> {
        self[coords]
    }

    /// All `cells` are inside the grid and not yet claimed by a shape.
    pub(crate) fn is_free(&self, cells: &[Coord2]) -> bool {
        cells
            .iter()
            .all(|&coords| self.validate_coords(coords).is_ok() && self[coords].is_none())
    }

    /// Adds a shape without any checks; callers make sure [`Self::is_free`] holds.
    pub(crate) fn insert(&mut self, label: &str, cells: &[Coord2]) -> ShapeId {
        let id = ShapeId(self.shapes.len().try_into().unwrap_or(u16::MAX));
        for &coords in cells {
            self.membership[coords.to_nd_index()] = Some(id);
        }
        self.shapes.push(Shape {
            id,
            label: label.into(),
            cells: cells.iter().copied().collect(),
            complete: false,
        });
        id
    }
}

impl Index<Coord2> for ShapeLayout {
    type Output = Option<ShapeId>;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.membership[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActivateOutcome {
    NoChange,
    /// The cell is now pending; `on_shape` tells whether it secretly hides a shape cell.
    Pending { on_shape: bool },
}

impl ActivateOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Pending { .. } => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    Victory,
    Defeat,
}

impl Ending {
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Victory)
    }
}

/// What a resolved reveal did to the session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub coords: Coord2,
    /// The shape that was hit, `None` on a miss.
    pub hit: Option<ShapeId>,
    /// Set when this reveal completed `hit`.
    pub completed: bool,
    /// Set when this reveal ended the game.
    pub ending: Option<Ending>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shape_gets_its_own_id() {
        let dots: Vec<[Coord2; 1]> = (0..20)
            .flat_map(|row| (0..15).map(move |col| [(row, col)]))
            .collect();
        let shapes: Vec<(&str, &[Coord2])> = dots.iter().map(|dot| ("dot", &dot[..])).collect();

        let layout = ShapeLayout::from_shapes(20, &shapes).unwrap();

        assert_eq!(layout.shapes().len(), 300);
        assert_eq!(layout.shape_at((0, 0)), Some(ShapeId(0)));
        assert_eq!(layout.shape_at((17, 0)), Some(ShapeId(255)));
        assert_eq!(layout.shape_at((19, 14)), Some(ShapeId(299)));
    }

    #[test]
    fn from_shapes_tags_membership() {
        let layout = ShapeLayout::from_shapes(
            10,
            &[("hatch", &[(3, 3), (3, 4), (4, 3), (4, 4)]), ("crate", &[(0, 0)])],
        )
        .unwrap();

        assert_eq!(layout.shapes().len(), 2);
        assert_eq!(layout.shape_at((4, 4)), Some(ShapeId(0)));
        assert_eq!(layout.shape_at((0, 0)), Some(ShapeId(1)));
        assert_eq!(layout.shape_at((5, 5)), None);
        assert_eq!(layout.shapes()[0].size(), 4);
    }

    #[test]
    fn from_shapes_rejects_overlap_and_bounds() {
        let overlap = ShapeLayout::from_shapes(10, &[("a", &[(1, 1), (1, 2)]), ("b", &[(1, 2)])]);
        assert_eq!(overlap, Err(GameError::ShapeOverlap));

        let outside = ShapeLayout::from_shapes(10, &[("a", &[(9, 9), (9, 10)])]);
        assert_eq!(outside, Err(GameError::InvalidCoords));

        let empty = ShapeLayout::from_shapes(10, &[("a", &[])]);
        assert_eq!(empty, Err(GameError::EmptyShape));
    }
}
