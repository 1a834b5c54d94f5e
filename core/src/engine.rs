use alloc::string::String;
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Points added to the score for every reveal spent.
pub const SCORE_PER_ATTEMPT: u32 = 10;

/// The resource each resolved reveal consumes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Capped { cap: CellCount, used: CellCount },
    Pool { initial: CellCount, remaining: CellCount },
}

impl Budget {
    pub const fn new(config: BudgetConfig) -> Self {
        match config {
            BudgetConfig::Capped { cap } => Self::Capped { cap, used: 0 },
            BudgetConfig::Pool { initial } => Self::Pool {
                initial,
                remaining: initial,
            },
        }
    }

    fn spend(&mut self) {
        match self {
            Self::Capped { used, .. } => *used = used.saturating_add(1),
            Self::Pool { remaining, .. } => *remaining = remaining.saturating_sub(1),
        }
    }

    pub const fn is_exhausted(&self) -> bool {
        match *self {
            Self::Capped { cap, used } => used >= cap,
            Self::Pool { remaining, .. } => remaining == 0,
        }
    }

    /// What the score charges for: attempts used, or how far the pool dropped from its start.
    pub const fn spent(&self) -> CellCount {
        match *self {
            Self::Capped { used, .. } => used,
            Self::Pool { initial, remaining } => initial.saturating_sub(remaining),
        }
    }

    pub const fn remaining(&self) -> CellCount {
        match *self {
            Self::Capped { cap, used } => cap.saturating_sub(used),
            Self::Pool { remaining, .. } => remaining,
        }
    }

    pub const fn is_pool(&self) -> bool {
        matches!(self, Self::Pool { .. })
    }
}

/// Everything one game needs to be rendered, saved and resumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    shape_set: String,
    grid: Array2<Cell>,
    shapes: Vec<Shape>,
    budget: Budget,
    attempts: CellCount,
    elapsed: u32,
    clues: ClueLog,
    game_over: bool,
    victory: bool,
    score: Option<u32>,
    proximity_clues: bool,
}

impl Session {
    pub fn new(shape_set: impl Into<String>, layout: ShapeLayout, budget: BudgetConfig) -> Self {
        let (membership, shapes) = layout.into_parts();
        let grid = membership.mapv(|shape| Cell {
            status: CellStatus::Unrevealed,
            shape,
        });
        Self {
            shape_set: shape_set.into(),
            grid,
            shapes,
            budget: Budget::new(budget),
            attempts: 0,
            elapsed: 0,
            clues: ClueLog::default(),
            game_over: false,
            victory: false,
            score: None,
            proximity_clues: false,
        }
    }

    /// Builds the fresh session described by `config` on top of an already placed layout.
    pub fn from_config(config: &PuzzleConfig, layout: ShapeLayout) -> Self {
        let mut session = Self::new(config.id.clone(), layout, config.budget);
        session.clues = ClueLog::new(config.clue_retention);
        session.proximity_clues = config.is_multi_shape();
        session
    }

    pub fn shape_set(&self) -> &str {
        &self.shape_set
    }

    pub fn side(&self) -> Coord {
        self.grid.dim().0.try_into().unwrap_or(Coord::MAX)
    }

    pub fn grid(&self) -> &Array2<Cell> {
        &self.grid
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.grid[coords.to_nd_index()]
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(usize::from(id.0))
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Reveals resolved so far.
    pub fn attempts(&self) -> CellCount {
        self.attempts
    }

    /// Elapsed time units.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn clues(&self) -> &ClueLog {
        &self.clues
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_victory(&self) -> bool {
        self.victory
    }

    /// No more moves are accepted, either flag is set.
    pub fn is_finished(&self) -> bool {
        self.game_over || self.victory
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let side = self.side();
        if coords.0 < side && coords.1 < side {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Cells waiting for their reveal to resolve.
    pub fn pending_cells(&self) -> Vec<Coord2> {
        self.grid
            .indexed_iter()
            .filter(|(_, cell)| cell.status == CellStatus::Pending)
            .filter_map(|((row, col), _)| Some((row.try_into().ok()?, col.try_into().ok()?)))
            .collect()
    }

    /// First phase of a reveal: an unrevealed cell becomes pending.
    pub fn activate(&mut self, coords: Coord2) -> Result<ActivateOutcome> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.grid[coords.to_nd_index()];

        if self.game_over || self.victory || !cell.status.is_unrevealed() {
            return Ok(ActivateOutcome::NoChange);
        }

        cell.status = CellStatus::Pending;
        log::debug!("Activated {:?}", coords);
        Ok(ActivateOutcome::Pending {
            on_shape: cell.shape.is_some(),
        })
    }

    /// Second phase of a reveal, `None` when the cell is no longer pending or the game ended.
    pub fn resolve(
        &mut self,
        coords: Coord2,
        narrator: &mut Narrator<'_>,
    ) -> Result<Option<Resolution>> {
        let coords = self.validate_coords(coords)?;
        let index = coords.to_nd_index();

        if self.is_finished() || self.grid[index].status != CellStatus::Pending {
            log::debug!("Dropped stale resolution of {:?}", coords);
            return Ok(None);
        }

        self.budget.spend();
        self.attempts = self.attempts.saturating_add(1);

        let mut resolution = Resolution {
            coords,
            hit: self.grid[index].shape,
            completed: false,
            ending: None,
        };

        match resolution.hit {
            Some(id) => {
                self.grid[index].status = CellStatus::PartialHit;
                resolution.completed = self.check_completion(id);
                let message = if resolution.completed {
                    narrator.completion()
                } else {
                    narrator.partial_hit()
                };
                if let Some(message) = message {
                    self.clues.push(ClueCategory::PartialHitConfirmation, message);
                }
                if resolution.completed && self.shapes.iter().all(|shape| shape.complete) {
                    self.victory = true;
                    resolution.ending = Some(Ending::Victory);
                }
            }
            None => {
                self.grid[index].status = CellStatus::Empty;
                if let Some(message) = narrator.miss(self.attempts) {
                    self.clues.push(ClueCategory::Environmental, message);
                }
                if self.proximity_clues {
                    if let Some(message) = narrator.proximity(coords, &self.grid, &self.shapes) {
                        self.clues.push(ClueCategory::Environmental, message);
                    }
                }
            }
        }

        if !self.victory && self.budget.is_exhausted() {
            self.game_over = true;
            resolution.ending = Some(Ending::Defeat);
        }
        if resolution.ending.is_some() {
            self.settle_score();
        }

        log::debug!("Resolved {:?}: {:?}", coords, resolution);
        Ok(Some(resolution))
    }

    /// Marks `id` complete once all of its cells are discovered, resolving them.
    fn check_completion(&mut self, id: ShapeId) -> bool {
        let Some(shape) = self.shapes.get_mut(usize::from(id.0)) else {
            return false;
        };
        if shape.complete {
            return false;
        }

        let discovered = shape
            .cells
            .iter()
            .filter(|&&coords| self.grid[coords.to_nd_index()].status.is_discovered())
            .count();
        if discovered < shape.cells.len() {
            return false;
        }

        for &coords in &shape.cells {
            self.grid[coords.to_nd_index()].status = CellStatus::Resolved;
        }
        shape.complete = true;
        log::debug!("Shape {} ({}) complete", shape.id, shape.label);
        true
    }

    fn settle_score(&mut self) {
        if self.score.is_none() {
            let spent = u32::from(self.budget.spent());
            self.score = Some(self.elapsed + spent * SCORE_PER_ATTEMPT);
        }
    }

    /// Sets the terminal flag after a deferred victory; `false` if it was already set.
    pub fn finish(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.settle_score();
        true
    }

    /// Advances the elapsed time by one unit while the game is running.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed += 1;
        true
    }

    pub fn add_periodic_clue(&mut self, narrator: &mut Narrator<'_>) -> Option<ClueId> {
        if self.is_finished() {
            return None;
        }
        let message = narrator.periodic(self.side(), &self.shapes)?;
        Some(self.clues.push(ClueCategory::PeriodicUpdate, message))
    }

    /// Restarts the pool at `sanity`, as a host does when it initializes the game.
    pub fn seed_pool(&mut self, sanity: CellCount) -> bool {
        let finished = self.is_finished();
        match &mut self.budget {
            Budget::Pool { initial, remaining } if !finished => {
                *initial = sanity;
                *remaining = sanity;
                true
            }
            _ => false,
        }
    }

    /// Overwrites what is left of the pool.
    pub fn set_pool_remaining(&mut self, sanity: CellCount) -> bool {
        let finished = self.is_finished();
        match &mut self.budget {
            Budget::Pool { remaining, .. } if !finished => {
                *remaining = sanity;
                true
            }
            _ => false,
        }
    }

    /// Checks that a stored session belongs to `config` and is internally consistent.
    pub fn validate_for(&self, config: &PuzzleConfig) -> core::result::Result<(), StoreError> {
        if self.shape_set != config.id {
            return Err(StoreError::Mismatch("shape set"));
        }
        let side = usize::from(config.grid_size);
        if self.grid.dim() != (side, side) {
            return Err(StoreError::Mismatch("grid size"));
        }
        if self.budget.is_pool() != matches!(config.budget, BudgetConfig::Pool { .. }) {
            return Err(StoreError::Mismatch("budget"));
        }
        for shape in &self.shapes {
            let intact = shape.cells.iter().all(|&coords| {
                self.validate_coords(coords).is_ok()
                    && self.grid[coords.to_nd_index()].shape == Some(shape.id)
            });
            if !intact || self.shape(shape.id).map(|s| s.id) != Some(shape.id) {
                return Err(StoreError::Mismatch("shape cells"));
            }
        }
        Ok(())
    }
}
