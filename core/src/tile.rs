use serde::{Deserialize, Serialize};

use crate::ShapeId;

/// Reveal progress of a single cell.
///
/// Ordering follows the only allowed progression, `Unrevealed < Pending < {Empty, PartialHit} < Resolved`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Unrevealed,
    /// Activated, waiting for the reveal delay to elapse.
    Pending,
    Empty,
    PartialHit,
    /// Part of a completed shape.
    Resolved,
}

impl CellStatus {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Unrevealed)
    }

    /// Counts towards completing a shape.
    pub const fn is_discovered(self) -> bool {
        matches!(self, Self::PartialHit | Self::Resolved)
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Unrevealed => 0,
            Self::Pending => 1,
            Self::Empty | Self::PartialHit => 2,
            Self::Resolved => 3,
        }
    }

    /// Whether moving from `self` to `next` is a forward step.
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Empty, Self::Resolved) => false,
            _ => next.rank() > self.rank(),
        }
    }
}

impl Default for CellStatus {
    fn default() -> Self {
        Self::Unrevealed
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub status: CellStatus,
    pub shape: Option<ShapeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_only_advance() {
        use CellStatus::*;

        assert!(Unrevealed.can_advance_to(Pending));
        assert!(Pending.can_advance_to(Empty));
        assert!(Pending.can_advance_to(PartialHit));
        assert!(PartialHit.can_advance_to(Resolved));
        assert!(!Empty.can_advance_to(Resolved));
        assert!(!Resolved.can_advance_to(PartialHit));
        assert!(!PartialHit.can_advance_to(Empty));
        assert!(!Pending.can_advance_to(Unrevealed));
    }
}
