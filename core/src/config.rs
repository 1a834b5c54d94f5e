use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Default side of the square grid.
pub const GRID_SIZE: Coord = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeRequest {
    pub label: String,
    pub size: CellCount,
}

/// How the hidden shapes are laid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutConfig {
    /// One square block of `size` cells; `size` must be a perfect square.
    Square { label: String, size: CellCount },
    /// Several straight runs placed best effort, in order.
    Lines(Vec<ShapeRequest>),
}

impl LayoutConfig {
    pub const fn is_multi_shape(&self) -> bool {
        matches!(self, Self::Lines(_))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetConfig {
    /// Attempts count up; the game is lost when `cap` is reached.
    Capped { cap: CellCount },
    /// A pool counts down from `initial`, which the host may replace.
    Pool { initial: CellCount },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub reveal_delay_ms: Millis,
    /// Delay between the winning reveal and the terminal flag, `None` to end right away.
    pub finish_delay_ms: Option<Millis>,
    pub tick_ms: Millis,
    /// Cadence of periodic clues, `None` disables them.
    pub periodic_clue_ms: Option<Millis>,
    pub host_init_timeout_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 2000,
            finish_delay_ms: None,
            tick_ms: 1000,
            periodic_clue_ms: None,
            host_init_timeout_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Running inside an embedding page, so the handshake has to happen.
    pub embedded: bool,
    pub minigame_type: String,
    pub default_sanity: CellCount,
    /// Only accept `UPDATE_SANITY` from the origin pinned by the first `INIT`.
    pub enforce_origin_pin: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            embedded: false,
            minigame_type: "puzzle".into(),
            default_sanity: 100,
            enforce_origin_pin: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    /// Identifies the shape set, used for saved games and the leaderboard.
    pub id: String,
    pub title: String,
    #[serde(default = "default_grid_size")]
    pub grid_size: Coord,
    pub layout: LayoutConfig,
    pub budget: BudgetConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub host: Option<HostConfig>,
    /// Tell the notifier whether a freshly activated cell hides a shape.
    #[serde(default)]
    pub probe_cue: bool,
    #[serde(default)]
    pub autosave: bool,
    /// Keep at most this many clues, oldest dropped first.
    #[serde(default)]
    pub clue_retention: Option<usize>,
    pub theme: Theme,
}

fn default_grid_size() -> Coord {
    GRID_SIZE
}

impl PuzzleConfig {
    /// Checks everything that would make the puzzle unplayable.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(GameError::InvalidGridSize);
        }

        match &self.layout {
            LayoutConfig::Square { size, .. } => {
                let dim = SquareShapeGenerator::dimension(*size)?;
                if dim > self.grid_size {
                    return Err(GameError::ShapeTooLarge {
                        size: *size,
                        grid: self.grid_size,
                    });
                }
            }
            LayoutConfig::Lines(requests) => {
                if requests.iter().any(|request| request.size == 0) {
                    return Err(GameError::EmptyShape);
                }
            }
        }

        match self.budget {
            BudgetConfig::Capped { cap: 0 } | BudgetConfig::Pool { initial: 0 } => {
                Err(GameError::InvalidBudget)
            }
            _ => Ok(()),
        }
    }

    pub fn is_multi_shape(&self) -> bool {
        self.layout.is_multi_shape()
    }

    pub fn from_json(raw: &str) -> core::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> core::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
