use alloc::vec::Vec;

use super::*;

/// Tries this many random anchors per shape before giving up on it.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

/// Best effort placement of straight horizontal or vertical runs, one request at a time.
///
/// A request that finds no free spot within [`MAX_PLACEMENT_ATTEMPTS`] is skipped, so the
/// resulting layout may hold fewer shapes than requested.
#[derive(Clone, Debug, PartialEq)]
pub struct LineShapeGenerator {
    seed: u64,
    requests: Vec<ShapeRequest>,
}

impl LineShapeGenerator {
    pub fn new(seed: u64, requests: Vec<ShapeRequest>) -> Self {
        Self { seed, requests }
    }
}

impl ShapeGenerator for LineShapeGenerator {
    fn generate(self, side: Coord) -> Result<ShapeLayout> {
        use rand::prelude::*;

        if side == 0 {
            return Err(GameError::InvalidGridSize);
        }
        if self.requests.iter().any(|request| request.size == 0) {
            return Err(GameError::EmptyShape);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut layout = ShapeLayout::empty(side);
        let mut cells = Vec::new();

        for request in &self.requests {
            let mut placed = false;

            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                let anchor: Coord2 = (rng.random_range(0..side), rng.random_range(0..side));
                let horizontal = rng.random_range(0..2u8) == 0;

                cells.clear();
                for i in 0..request.size {
                    let (row, col) = if horizontal {
                        (u16::from(anchor.0), u16::from(anchor.1) + i)
                    } else {
                        (u16::from(anchor.0) + i, u16::from(anchor.1))
                    };
                    // anything past the coordinate range is off the grid anyway
                    let row = Coord::try_from(row).unwrap_or(Coord::MAX);
                    let col = Coord::try_from(col).unwrap_or(Coord::MAX);
                    cells.push((row, col));
                }

                if layout.is_free(&cells) {
                    layout.insert(&request.label, &cells);
                    placed = true;
                    break;
                }
            }

            if !placed {
                log::warn!(
                    "Could not place {} of size {} after {} attempts",
                    request.label,
                    request.size,
                    MAX_PLACEMENT_ATTEMPTS
                );
            }
        }

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn request(label: &str, size: CellCount) -> ShapeRequest {
        ShapeRequest {
            label: label.into(),
            size,
        }
    }

    #[test]
    fn shapes_are_straight_disjoint_and_in_bounds() {
        for seed in 0..32 {
            let requests = vec![request("Drug Lab", 3), request("Safe House", 2), request("Front Company", 4)];
            let layout = LineShapeGenerator::new(seed, requests).generate(10).unwrap();

            let mut seen = Vec::new();
            for shape in layout.shapes() {
                for &(row, col) in &shape.cells {
                    assert!(row < 10 && col < 10);
                    assert!(!seen.contains(&(row, col)));
                    seen.push((row, col));
                    assert_eq!(layout.shape_at((row, col)), Some(shape.id));
                }

                let same_row = shape.cells.iter().all(|c| c.0 == shape.cells[0].0);
                let same_col = shape.cells.iter().all(|c| c.1 == shape.cells[0].1);
                assert!(same_row || same_col);
            }
        }
    }

    #[test]
    fn impossible_shape_is_skipped() {
        let requests = vec![request("Warehouse Lab", 11), request("Safe House", 2)];

        let layout = LineShapeGenerator::new(3, requests).generate(10).unwrap();

        assert_eq!(layout.shapes().len(), 1);
        assert_eq!(layout.shapes()[0].label, "Safe House");
        assert_eq!(layout.shapes()[0].id, ShapeId(0));
    }

    #[test]
    fn zero_sized_request_is_a_configuration_error() {
        let result = LineShapeGenerator::new(3, vec![request("Nothing", 0)]).generate(10);

        assert_eq!(result, Err(GameError::EmptyShape));
    }

    #[test]
    fn same_seed_same_layout() {
        let requests = vec![request("Server Farm", 3), request("Data Center", 3)];

        let a = LineShapeGenerator::new(11, requests.clone()).generate(10).unwrap();
        let b = LineShapeGenerator::new(11, requests).generate(10).unwrap();

        assert_eq!(a, b);
    }
}
