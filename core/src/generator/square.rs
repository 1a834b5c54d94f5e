use alloc::string::String;
use alloc::vec::Vec;

use super::*;

/// Places a single square block whose area is `size`, anchored uniformly at random where it fits.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareShapeGenerator {
    seed: u64,
    label: String,
    size: CellCount,
}

impl SquareShapeGenerator {
    pub fn new(seed: u64, label: String, size: CellCount) -> Self {
        Self { seed, label, size }
    }

    /// Side of the square, when `size` is a perfect square.
    pub fn dimension(size: CellCount) -> Result<Coord> {
        if size == 0 {
            return Err(GameError::EmptyShape);
        }
        let dim = size.isqrt();
        if dim * dim != size {
            return Err(GameError::ShapeNotSquare { size });
        }
        dim.try_into().map_err(|_| GameError::ShapeTooLarge {
            size,
            grid: Coord::MAX,
        })
    }
}

impl ShapeGenerator for SquareShapeGenerator {
    fn generate(self, side: Coord) -> Result<ShapeLayout> {
        use rand::prelude::*;

        if side == 0 {
            return Err(GameError::InvalidGridSize);
        }
        let dim = Self::dimension(self.size)?;
        if dim > side {
            return Err(GameError::ShapeTooLarge {
                size: self.size,
                grid: side,
            });
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let span = side - dim + 1;
        let anchor: Coord2 = (rng.random_range(0..span), rng.random_range(0..span));

        let cells: Vec<Coord2> = (0..dim)
            .flat_map(|dr| (0..dim).map(move |dc| (anchor.0 + dr, anchor.1 + dc)))
            .collect();

        let mut layout = ShapeLayout::empty(side);
        layout.insert(&self.label, &cells);
        log::debug!("Placed {} at {:?} ({}x{})", self.label, anchor, dim, dim);
        Ok(layout)
    }
}
