use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single coordinate axis used for the grid side and positions.
pub type Coord = u8;

/// Count type used for cell counts and budgets.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Virtual time in milliseconds.
pub type Millis = u64;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

pub trait NeighborIterExt {
    /// Cells at Chebyshev distance `1..=radius` from `index` that lie inside the array.
    fn iter_within(&self, index: Coord2, radius: Coord) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_within(&self, index: Coord2, radius: Coord) -> NeighborIter {
        let dim = self.dim();
        let bounds = (
            dim.0.try_into().unwrap_or(Coord::MAX),
            dim.1.try_into().unwrap_or(Coord::MAX),
        );
        NeighborIter::new(index, radius, bounds)
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i16, i16), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (dr, dc) = delta;
    let (max_row, max_col) = bounds;

    let next_row = Coord::try_from(i16::from(row) + dr).ok()?;
    if next_row >= max_row {
        return None;
    }

    let next_col = Coord::try_from(i16::from(col) + dc).ok()?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

/// Walks the square neighborhood around a center cell in row-major order, skipping the center.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    radius: i16,
    dr: i16,
    dc: i16,
}

impl NeighborIter {
    fn new(center: Coord2, radius: Coord, bounds: Coord2) -> Self {
        let radius = i16::from(radius);
        Self {
            center,
            bounds,
            radius,
            dr: -radius,
            dc: -radius,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.dr > self.radius {
                return None;
            }

            let delta = (self.dr, self.dc);
            self.dc += 1;
            if self.dc > self.radius {
                self.dc = -self.radius;
                self.dr += 1;
            }

            if delta == (0, 0) {
                continue;
            }
            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}

/// Eight-way direction of a target relative to a reference cell, rows growing southward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Compass {
    /// Direction from `from` towards `to`, `None` when they coincide.
    pub fn between(from: Coord2, to: Coord2) -> Option<Self> {
        use core::cmp::Ordering::*;
        use Compass::*;

        Some(match (to.0.cmp(&from.0), to.1.cmp(&from.1)) {
            (Less, Less) => NorthWest,
            (Less, Greater) => NorthEast,
            (Greater, Less) => SouthWest,
            (Greater, Greater) => SouthEast,
            (Less, Equal) => North,
            (Greater, Equal) => South,
            (Equal, Less) => West,
            (Equal, Greater) => East,
            (Equal, Equal) => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::East => "east",
            Self::SouthEast => "southeast",
            Self::South => "south",
            Self::SouthWest => "southwest",
            Self::West => "west",
            Self::NorthWest => "northwest",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quarter of the grid a cell falls in, split at `side / 2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quadrant {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    pub fn of(coords: Coord2, side: Coord) -> Self {
        let north = u16::from(coords.0) * 2 < u16::from(side);
        let west = u16::from(coords.1) * 2 < u16::from(side);
        match (north, west) {
            (true, true) => Self::NorthWest,
            (true, false) => Self::NorthEast,
            (false, true) => Self::SouthWest,
            (false, false) => Self::SouthEast,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NorthWest => "northwest quadrant",
            Self::NorthEast => "northeast quadrant",
            Self::SouthWest => "southwest quadrant",
            Self::SouthEast => "southeast quadrant",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
