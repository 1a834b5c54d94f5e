//! End-to-end games driven through the public API on a virtual clock.

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array2;
use trapgrid_core::*;

const HATCH: &[Coord2] = &[(3, 3), (3, 4), (4, 3), (4, 4)];
const REVEAL_DELAY: Millis = 2000;

type Events = Rc<RefCell<Vec<GameEvent>>>;

fn started(config: PuzzleConfig, layout: ShapeLayout) -> (Game, Events) {
    let events: Events = Rc::default();
    let sink = events.clone();
    let mut game = Game::with_layout(config, layout, 42)
        .unwrap()
        .with_notifier(Box::new(move |event: &GameEvent| sink.borrow_mut().push(event.clone())));
    game.start();
    (game, events)
}

fn reveal(game: &mut Game, coords: Coord2) {
    game.activate(coords).unwrap();
    game.advance(REVEAL_DELAY);
}

fn statuses(game: &Game) -> Array2<CellStatus> {
    game.session().grid().mapv(|cell| cell.status)
}

fn misses(layout: &ShapeLayout, count: usize) -> Vec<Coord2> {
    let side = layout.side();
    (0..side)
        .flat_map(|row| (0..side).map(move |col| (row, col)))
        .filter(|&coords| layout.shape_at(coords).is_none())
        .take(count)
        .collect()
}

fn endings(events: &Events) -> usize {
    events
        .borrow()
        .iter()
        .filter(|event| matches!(event, GameEvent::Victory { .. } | GameEvent::Defeat { .. }))
        .count()
}

#[test]
fn finding_the_hatch() {
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Trap Door", HATCH)]).unwrap();
    let (mut game, events) = started(PuzzleConfig::murder_castle(), layout);

    reveal(&mut game, (3, 3));
    assert_eq!(game.session().cell_at((3, 3)).status, CellStatus::PartialHit);
    assert_eq!(game.session().attempts(), 1);
    assert!(!game.session().is_game_over());

    for &coords in &[(4, 4), (3, 4), (4, 3)] {
        reveal(&mut game, coords);
    }

    assert!(game.session().is_victory());
    for &coords in HATCH {
        assert_eq!(game.session().cell_at(coords).status, CellStatus::Resolved);
    }
    assert!(game.session().shapes()[0].complete);

    game.advance(3000);
    assert!(game.session().is_game_over());
    assert_eq!(endings(&events), 1);
    assert_eq!(game.view().ending.map(|screen| screen.ending), Some(Ending::Victory));
}

#[test]
fn thirty_misses_lose_the_capped_game() {
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Trap Door", HATCH)]).unwrap();
    let cells = misses(&layout, 30);
    let (mut game, events) = started(PuzzleConfig::murder_castle(), layout);

    for coords in cells {
        reveal(&mut game, coords);
    }

    let session = game.session();
    assert!(session.is_game_over());
    assert!(!session.is_victory());
    assert_eq!(session.budget().spent(), 30);
    assert_eq!(session.score(), Some(session.elapsed() + 300));
    assert_eq!(endings(&events), 1);
}

#[test]
fn draining_the_pool_loses() {
    let layout = ShapeLayout::empty(GRID_SIZE);
    let cells = misses(&layout, 100);
    let (mut game, _) = started(PuzzleConfig::smart_building(), layout);

    for coords in cells {
        game.activate(coords).unwrap();
    }
    game.advance(REVEAL_DELAY);

    let session = game.session();
    assert_eq!(session.budget().remaining(), 0);
    assert!(session.is_game_over());
    assert!(!session.is_victory());
    assert_eq!(session.attempts(), 100);
}

#[test]
fn every_shape_must_fall_before_victory() {
    let case = Case::find("harbor-lights").unwrap();
    let layout = ShapeLayout::from_shapes(
        GRID_SIZE,
        &[
            ("Smuggling Route", &[(0, 0), (0, 1), (0, 2)]),
            ("Safe House", &[(7, 7), (8, 7)]),
        ],
    )
    .unwrap();
    let (mut game, events) = started(PuzzleConfig::shadow_network(&case), layout);

    reveal(&mut game, (8, 7));
    reveal(&mut game, (7, 7));
    assert!(game.session().shapes()[1].complete);
    assert!(!game.session().is_victory());

    reveal(&mut game, (0, 2));
    reveal(&mut game, (0, 0));
    assert!(!game.session().is_victory());
    reveal(&mut game, (0, 1));

    assert!(game.session().is_victory());
    assert!(game.session().is_game_over());
    let completions = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, GameEvent::ShapeComplete { .. }))
        .count();
    assert_eq!(completions, 2);
    assert_eq!(endings(&events), 1);
    assert_eq!(game.session().score(), Some(game.session().elapsed() + 50));

    let view = game.view();
    assert!(view.checklist.iter().all(|item| item.done));
}

#[test]
fn dead_activations_change_nothing() {
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Trap Door", HATCH)]).unwrap();
    let config = PuzzleConfig {
        budget: BudgetConfig::Capped { cap: 2 },
        ..PuzzleConfig::murder_castle()
    };
    let (mut game, _) = started(config, layout);

    reveal(&mut game, (3, 3));
    let before = game.session().clone();
    assert_eq!(game.activate((3, 3)).unwrap(), ActivateOutcome::NoChange);
    assert_eq!(game.session(), &before);

    reveal(&mut game, (0, 0));
    assert!(game.session().is_game_over());
    let before = game.session().clone();
    assert_eq!(game.activate((9, 9)).unwrap(), ActivateOutcome::NoChange);
    game.advance(60_000);
    assert_eq!(game.session(), &before);
}

#[test]
fn overlapping_reveals_resolve_independently() {
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Trap Door", HATCH)]).unwrap();
    let (mut game, _) = started(PuzzleConfig::murder_castle(), layout);

    game.activate((0, 0)).unwrap();
    game.advance(500);
    game.activate((3, 3)).unwrap();
    game.advance(1500);

    assert_eq!(game.session().cell_at((0, 0)).status, CellStatus::Empty);
    assert_eq!(game.session().cell_at((3, 3)).status, CellStatus::Pending);

    game.advance(500);
    assert_eq!(game.session().cell_at((3, 3)).status, CellStatus::PartialHit);
    assert_eq!(game.session().attempts(), 2);
}

#[test]
fn generated_layouts_stay_in_bounds_without_overlap() {
    let mut configs = vec![PuzzleConfig::murder_castle(), PuzzleConfig::smart_building()];
    configs.extend(Case::all().iter().map(PuzzleConfig::shadow_network));

    for config in &configs {
        for seed in 0..50 {
            let layout = generate_layout(&config.layout, config.grid_size, seed).unwrap();
            let mut seen = std::collections::HashSet::new();
            for shape in layout.shapes() {
                for &coords in &shape.cells {
                    assert!(coords.0 < GRID_SIZE && coords.1 < GRID_SIZE);
                    assert!(seen.insert(coords), "{:?} shared in {}", coords, config.id);
                    assert_eq!(layout.shape_at(coords), Some(shape.id));
                }
            }
        }
    }
}

#[test]
fn statuses_only_move_forward() {
    let case = Case::find("cartel-connection").unwrap();
    let mut game = Game::new(PuzzleConfig::shadow_network(&case), 9).unwrap();
    game.start();

    let mut order: Vec<Coord2> = (0..GRID_SIZE)
        .flat_map(|row| (0..GRID_SIZE).map(move |col| (row, col)))
        .collect();
    order.reverse();

    for (step, coords) in order.into_iter().enumerate() {
        let before = statuses(&game);
        game.activate(coords).unwrap();
        game.advance(if step % 3 == 0 { REVEAL_DELAY } else { 700 });
        let after = statuses(&game);

        for (old, new) in before.iter().zip(after.iter()) {
            assert!(old == new || old.can_advance_to(*new), "{:?} -> {:?}", old, new);
        }
        for shape in game.session().shapes() {
            let discovered = shape
                .cells
                .iter()
                .filter(|&&cell| game.session().cell_at(cell).status.is_discovered())
                .count();
            assert_eq!(shape.complete, discovered == shape.cells.len());
        }
        if game.session().is_game_over() {
            break;
        }
    }
}

fn clue_count(game: &Game, category: ClueCategory) -> usize {
    game.session()
        .clues()
        .iter()
        .filter(|clue| clue.category == category)
        .count()
}

#[test]
fn network_sweeps_get_periodic_and_proximity_clues() {
    let case = Case::find("harbor-lights").unwrap();
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Safe House", &[(5, 5), (5, 6)])]).unwrap();
    let (mut game, _) = started(PuzzleConfig::shadow_network(&case), layout);

    game.advance(30_000);
    assert_eq!(clue_count(&game, ClueCategory::PeriodicUpdate), 3);
    assert_eq!(game.session().clues().len(), 3);

    reveal(&mut game, (3, 5));
    assert_eq!(game.session().clues().len(), 5);
    assert_eq!(clue_count(&game, ClueCategory::Environmental), 2);

    reveal(&mut game, (5, 5));
    reveal(&mut game, (5, 6));
    assert!(game.session().is_game_over());
    let settled = game.session().clues().len();

    game.advance(30_000);
    assert_eq!(game.session().clues().len(), settled);
    assert_eq!(clue_count(&game, ClueCategory::PeriodicUpdate), 3);
}

#[test]
fn far_misses_get_no_proximity_clue() {
    let case = Case::find("harbor-lights").unwrap();
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Safe House", &[(5, 5), (5, 6)])]).unwrap();
    let (mut game, _) = started(PuzzleConfig::shadow_network(&case), layout);

    reveal(&mut game, (0, 0));

    assert_eq!(game.session().clues().len(), 1);
    assert_eq!(clue_count(&game, ClueCategory::Environmental), 1);
}

#[test]
fn single_shape_games_stay_quiet() {
    let layout = ShapeLayout::from_shapes(GRID_SIZE, &[("Trap Door", HATCH)]).unwrap();
    let (mut game, _) = started(PuzzleConfig::murder_castle(), layout);

    game.advance(30_000);
    assert!(game.session().clues().is_empty());

    reveal(&mut game, (2, 3));

    assert_eq!(game.session().clues().len(), 1);
    assert_eq!(clue_count(&game, ClueCategory::Environmental), 1);
    assert_eq!(clue_count(&game, ClueCategory::PeriodicUpdate), 0);
}
