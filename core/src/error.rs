use alloc::string::String;
use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Grid side must be at least one cell")]
    InvalidGridSize,
    #[error("Shapes must occupy at least one cell")]
    EmptyShape,
    #[error("Square shape size {size} is not a perfect square")]
    ShapeNotSquare { size: CellCount },
    #[error("Shape of size {size} does not fit a grid of side {grid}")]
    ShapeTooLarge { size: CellCount, grid: u8 },
    #[error("Shapes overlap")]
    ShapeOverlap,
    #[error("Budget must allow at least one attempt")]
    InvalidBudget,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures of the persistence collaborator, never surfaced past the engine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Stored data does not match the current puzzle: {0}")]
    Mismatch(&'static str),
}
