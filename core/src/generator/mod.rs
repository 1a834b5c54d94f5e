use crate::*;
pub use lines::*;
pub use square::*;

mod lines;
mod square;

pub trait ShapeGenerator {
    fn generate(self, side: Coord) -> Result<ShapeLayout>;
}

/// Places the shapes requested by `layout` with the matching generator.
pub fn generate_layout(layout: &LayoutConfig, side: Coord, seed: u64) -> Result<ShapeLayout> {
    match layout {
        LayoutConfig::Square { label, size } => {
            SquareShapeGenerator::new(seed, label.clone(), *size).generate(side)
        }
        LayoutConfig::Lines(requests) => LineShapeGenerator::new(seed, requests.clone()).generate(side),
    }
}
