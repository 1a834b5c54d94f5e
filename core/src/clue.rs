use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashSet;
use ndarray::Array2;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// How far from a missed cell proximity clues look for shapes.
pub const PROXIMITY_RADIUS: Coord = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueCategory {
    Environmental,
    PartialHitConfirmation,
    PeriodicUpdate,
}

impl ClueCategory {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Environmental => "Environmental",
            Self::PartialHitConfirmation => "Confirmed",
            Self::PeriodicUpdate => "Periodic Update",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClueId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: ClueId,
    pub category: ClueCategory,
    pub message: String,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category.tag(), self.message)
    }
}

pub(crate) fn unix_now() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Insertion ordered clue history. Entries are never edited; with a retention limit the oldest
/// ones are dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClueLog {
    entries: VecDeque<Clue>,
    next_id: u32,
    #[serde(default)]
    retention: Option<usize>,
}

impl ClueLog {
    pub fn new(retention: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 0,
            retention,
        }
    }

    pub fn push(&mut self, category: ClueCategory, message: String) -> ClueId {
        let id = ClueId(self.next_id);
        self.next_id += 1;
        self.entries.push_back(Clue {
            id,
            category,
            message,
            timestamp: unix_now(),
        });

        if let Some(retention) = self.retention {
            while self.entries.len() > retention {
                self.entries.pop_front();
            }
        }
        id
    }

    pub fn latest(&self) -> Option<&Clue> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of clues ever logged, including dropped ones.
    pub fn total(&self) -> u32 {
        self.next_id
    }
}

/// Picks clue text from a [`Theme`] using the game's random source.
pub struct Narrator<'a> {
    theme: &'a Theme,
    rng: &'a mut SmallRng,
}

impl<'a> Narrator<'a> {
    pub fn new(theme: &'a Theme, rng: &'a mut SmallRng) -> Self {
        Self { theme, rng }
    }

    fn pick<'p>(&mut self, pool: &'p [String]) -> Option<&'p String> {
        use rand::prelude::*;

        if pool.is_empty() {
            return None;
        }
        pool.get(self.rng.random_range(0..pool.len()))
    }

    pub fn miss(&mut self, attempts: CellCount) -> Option<String> {
        let theme = self.theme;
        self.pick(theme.miss.for_attempts(attempts)).cloned()
    }

    pub fn partial_hit(&mut self) -> Option<String> {
        let theme = self.theme;
        self.pick(&theme.partial_hit).cloned()
    }

    pub fn completion(&mut self) -> Option<String> {
        let theme = self.theme;
        self.pick(&theme.completion).cloned()
    }

    /// Hints at an incomplete shape within [`PROXIMITY_RADIUS`] of `coords`, if there is one.
    pub fn proximity(
        &mut self,
        coords: Coord2,
        grid: &Array2<Cell>,
        shapes: &[Shape],
    ) -> Option<String> {
        use rand::prelude::*;

        let mut seen = HashSet::new();
        let nearby: Vec<&Shape> = grid
            .iter_within(coords, PROXIMITY_RADIUS)
            .filter_map(|pos| grid[pos.to_nd_index()].shape)
            .filter(|&id| seen.insert(id))
            .filter_map(|id| shapes.get(usize::from(id.0)))
            .filter(|shape| !shape.complete)
            .collect();

        if nearby.is_empty() {
            return None;
        }
        let shape = nearby[self.rng.random_range(0..nearby.len())];
        let anchor = *shape.cells.first()?;

        let side = grid.dim().0.try_into().unwrap_or(Coord::MAX);
        let direction = match self.theme.proximity_bearing {
            Bearing::Compass => Compass::between(coords, anchor).map_or("nearby", Compass::name),
            Bearing::Quadrant => Quadrant::of(anchor, side).name(),
        };
        Some(Theme::render(
            self.theme.proximity_template(&shape.label),
            direction,
        ))
    }

    /// A general tip about a random incomplete shape, located only by quadrant.
    pub fn periodic(&mut self, side: Coord, shapes: &[Shape]) -> Option<String> {
        use rand::prelude::*;

        let open: Vec<&Shape> = shapes.iter().filter(|shape| !shape.complete).collect();
        if open.is_empty() {
            return None;
        }
        let shape = open[self.rng.random_range(0..open.len())];
        let target = *shape.cells.get(self.rng.random_range(0..shape.cells.len()))?;

        let theme = self.theme;
        let template = self.pick(&theme.periodic)?;
        Some(Theme::render(template, Quadrant::of(target, side).name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use rand::SeedableRng;

    fn grid_with(layout: &ShapeLayout) -> Array2<Cell> {
        let mut grid: Array2<Cell> = Array2::default(layout.size().to_nd_index());
        for shape in layout.shapes() {
            for &coords in &shape.cells {
                grid[coords.to_nd_index()].shape = Some(shape.id);
            }
        }
        grid
    }

    #[test]
    fn log_assigns_increasing_ids() {
        let mut log = ClueLog::new(None);

        let a = log.push(ClueCategory::Environmental, "first".into());
        let b = log.push(ClueCategory::PeriodicUpdate, "second".into());

        assert!(a < b);
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().map(|clue| clue.message.as_str()), Some("second"));
        assert_eq!(
            log.latest().map(|clue| clue.to_string()),
            Some("[Periodic Update] second".to_string())
        );
    }

    #[test]
    fn retention_drops_oldest() {
        let mut log = ClueLog::new(Some(2));

        for message in ["a", "b", "c"] {
            log.push(ClueCategory::Environmental, message.into());
        }

        let kept: Vec<_> = log.iter().map(|clue| clue.message.as_str()).collect();
        assert_eq!(kept, ["b", "c"]);
        assert_eq!(log.total(), 3);
    }

    #[test]
    fn miss_clue_comes_from_the_right_tier() {
        let theme = Theme::murder_castle();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut narrator = Narrator::new(&theme, &mut rng);

        let late = narrator.miss(25).unwrap();

        assert!(theme.miss.for_attempts(25).contains(&late));
        assert!(!theme.miss.for_attempts(1).contains(&late));
    }

    #[test]
    fn proximity_points_at_nearby_shape() {
        let layout = ShapeLayout::from_shapes(10, &[("Safe House", &[(2, 7), (3, 7)])]).unwrap();
        let grid = grid_with(&layout);
        let theme = Theme::shadow_network();
        let mut rng = SmallRng::seed_from_u64(9);
        let mut narrator = Narrator::new(&theme, &mut rng);

        let clue = narrator.proximity((4, 5), &grid, layout.shapes());

        assert_eq!(
            clue.as_deref(),
            Some("Known associates have been spotted frequenting a residence in the northeast neighborhood.")
        );
    }

    #[test]
    fn proximity_ignores_far_and_complete_shapes() {
        let layout = ShapeLayout::from_shapes(
            10,
            &[("Drug Lab", &[(0, 0), (0, 1)]), ("Safe House", &[(9, 8), (9, 9)])],
        )
        .unwrap();
        let grid = grid_with(&layout);
        let mut shapes = layout.shapes().to_vec();
        shapes[1].complete = true;
        let theme = Theme::shadow_network();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut narrator = Narrator::new(&theme, &mut rng);

        assert_eq!(narrator.proximity((5, 5), &grid, &shapes), None);
        assert_eq!(narrator.proximity((8, 7), &grid, &shapes), None);
        assert!(narrator.proximity((2, 2), &grid, &shapes).is_some());
    }

    #[test]
    fn periodic_names_a_quadrant_of_an_open_shape() {
        let layout = ShapeLayout::from_shapes(10, &[("Server Farm", &[(7, 1), (8, 1), (9, 1)])]).unwrap();
        let theme = Theme::shadow_network();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut narrator = Narrator::new(&theme, &mut rng);

        let clue = narrator.periodic(10, layout.shapes()).unwrap();

        assert!(clue.ends_with("southwest quadrant."));

        let mut done = layout.shapes().to_vec();
        done[0].complete = true;
        assert_eq!(narrator.periodic(10, &done), None);
    }
}
