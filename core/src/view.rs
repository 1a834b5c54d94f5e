use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Formats elapsed seconds as `mm:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One line of the checklist: a shape label and whether any shape carrying it is complete.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub done: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetReadout {
    Used { used: CellCount, cap: CellCount },
    Remaining { remaining: CellCount },
}

impl From<Budget> for BudgetReadout {
    fn from(budget: Budget) -> Self {
        match budget {
            Budget::Capped { cap, used } => Self::Used { used, cap },
            Budget::Pool { remaining, .. } => Self::Remaining { remaining },
        }
    }
}

impl fmt::Display for BudgetReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Used { used, cap } => write!(f, "{}/{}", used, cap),
            Self::Remaining { remaining } => write!(f, "{}", remaining),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingScreen {
    pub ending: Ending,
    pub title: String,
    pub text: String,
    pub score: Option<u32>,
}

/// What a front end needs to draw the board and its side panels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub title: String,
    pub cells: Array2<CellStatus>,
    /// Shape label on every resolved cell.
    pub labels: Array2<Option<String>>,
    pub checklist: Vec<ChecklistItem>,
    pub latest_clue: Option<Clue>,
    pub clock: String,
    pub budget: BudgetReadout,
    pub game_over: bool,
    pub victory: bool,
    pub score: Option<u32>,
    /// Only once the terminal flag is set.
    pub ending: Option<EndingScreen>,
}

impl BoardView {
    pub fn from_game(game: &Game) -> Self {
        Self::from_session(game.session(), game.config())
    }

    pub fn from_session(session: &Session, config: &PuzzleConfig) -> Self {
        let grid = session.grid();
        let cells = grid.mapv(|cell| cell.status);
        let labels = grid.map(|cell| match (cell.status, cell.shape) {
            (CellStatus::Resolved, Some(id)) => session.shape(id).map(|shape| shape.label.clone()),
            _ => None,
        });

        let mut checklist: Vec<ChecklistItem> = Vec::new();
        for shape in session.shapes() {
            match checklist.iter_mut().find(|item| item.label == shape.label) {
                Some(item) => item.done |= shape.complete,
                None => checklist.push(ChecklistItem {
                    label: shape.label.clone(),
                    done: shape.complete,
                }),
            }
        }

        let ending = session.is_game_over().then(|| {
            let text = &config.theme.endings;
            if session.is_victory() {
                EndingScreen {
                    ending: Ending::Victory,
                    title: text.victory_title.clone(),
                    text: text.victory_text.clone(),
                    score: session.score(),
                }
            } else {
                EndingScreen {
                    ending: Ending::Defeat,
                    title: text.defeat_title.clone(),
                    text: text.defeat_text.clone(),
                    score: session.score(),
                }
            }
        });

        Self {
            title: config.title.clone(),
            cells,
            labels,
            checklist,
            latest_clue: session.clues().latest().cloned(),
            clock: format_clock(session.elapsed()),
            budget: session.budget().into(),
            game_over: session.is_game_over(),
            victory: session.is_victory(),
            score: session.score(),
            ending,
        }
    }
}
