use alloc::boxed::Box;
use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Keeps the clue stream independent from the placement stream of the same seed.
const CLUE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Sound cue for a freshly activated cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeCue {
    Plain,
    /// The cell hides part of a shape.
    Hollow,
}

/// Discrete notifications for audio and other observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A cell was activated; `cue` is only filled in when the puzzle gives probe cues away.
    Probe { coords: Coord2, cue: Option<ProbeCue> },
    Hit { coords: Coord2, shape: ShapeId },
    Miss { coords: Coord2 },
    ShapeComplete { shape: ShapeId },
    Victory { score: Option<u32> },
    Defeat { score: Option<u32> },
}

pub trait Notifier {
    fn notify(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> Notifier for F {
    fn notify(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// A running puzzle: the session plus its timers, randomness and collaborators.
pub struct Game {
    config: PuzzleConfig,
    session: Session,
    scheduler: Scheduler,
    rng: SmallRng,
    notifier: Option<Box<dyn Notifier>>,
    store: Option<Box<dyn KeyValueStore>>,
    host: Option<HostLink>,
    /// Last pool value the host asked for, reused when the game restarts.
    host_sanity: Option<CellCount>,
    running: bool,
}

impl Game {
    /// Places a fresh layout for `config`.
    pub fn new(config: PuzzleConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let layout = generate_layout(&config.layout, config.grid_size, seed)?;
        Self::with_layout(config, layout, seed)
    }

    /// Uses a layout placed by the caller.
    pub fn with_layout(config: PuzzleConfig, layout: ShapeLayout, seed: u64) -> Result<Self> {
        config.validate()?;
        if layout.side() != config.grid_size {
            return Err(GameError::InvalidGridSize);
        }
        let session = Session::from_config(&config, layout);
        Ok(Self {
            config,
            session,
            scheduler: Scheduler::new(),
            rng: SmallRng::seed_from_u64(seed ^ CLUE_SEED_SALT),
            notifier: None,
            store: None,
            host: None,
            host_sanity: None,
            running: false,
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_host_channel(mut self, channel: Box<dyn HostChannel>) -> Self {
        let host_config = self.config.host.clone().unwrap_or_default();
        self.host = Some(HostLink::new(host_config, channel));
        self
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> BoardView {
        BoardView::from_game(self)
    }

    pub fn host(&self) -> Option<&HostLink> {
        self.host.as_ref()
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Resumes a saved game when there is one, arms the timers and opens the host handshake.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        if self.config.autosave {
            if let Some(saved) = self.store.as_ref().and_then(|store| store.load_session(&self.config)) {
                log::info!("Resuming saved game of {}", self.config.id);
                self.session = saved;
            }
        }

        self.arm();

        if let Some(host) = self.host.as_mut() {
            match host.open() {
                Some(update) => self.apply_sanity(update),
                None => {
                    self.scheduler
                        .schedule(self.config.timing.host_init_timeout_ms, Task::HostInitTimeout);
                }
            }
        }
    }

    fn arm(&mut self) {
        self.running = true;
        let timing = &self.config.timing;

        for coords in self.session.pending_cells() {
            self.scheduler
                .schedule(timing.reveal_delay_ms, Task::ResolveReveal(coords));
        }
        if self.session.is_victory() && !self.session.is_game_over() {
            self.scheduler
                .schedule(timing.finish_delay_ms.unwrap_or_default(), Task::FinishGame);
        }
        self.scheduler.schedule(timing.tick_ms, Task::ElapsedTick);
        if let Some(cadence) = timing.periodic_clue_ms {
            if self.config.is_multi_shape() {
                self.scheduler.schedule(cadence, Task::PeriodicClue);
            }
        }
    }

    /// Drops the current session and its timers, then starts over on a new layout.
    pub fn restart(&mut self) -> Result<()> {
        self.scheduler.cancel_session();
        let seed = self.rng.random_range(0..u64::MAX);
        let layout = generate_layout(&self.config.layout, self.config.grid_size, seed)?;
        self.session = Session::from_config(&self.config, layout);
        if let Some(sanity) = self.host_sanity {
            self.session.seed_pool(sanity);
        }
        if let Some(store) = self.store.as_mut() {
            store.clear_session();
        }
        if let Some(host) = self.host.as_mut() {
            host.new_session();
        }
        self.arm();

        let waiting = self.host.as_ref().is_some_and(|host| !host.is_initialized());
        if waiting {
            self.scheduler
                .schedule(self.config.timing.host_init_timeout_ms, Task::HostInitTimeout);
        }
        Ok(())
    }

    /// Cancels every timer; the game ignores input afterwards.
    pub fn teardown(&mut self) {
        self.scheduler.cancel_session();
        self.running = false;
    }

    /// Player input: starts revealing `coords`.
    pub fn activate(&mut self, coords: Coord2) -> Result<ActivateOutcome> {
        if !self.running {
            self.session.validate_coords(coords)?;
            return Ok(ActivateOutcome::NoChange);
        }

        let outcome = self.session.activate(coords)?;
        if let ActivateOutcome::Pending { on_shape } = outcome {
            let cue = self.config.probe_cue.then_some(if on_shape {
                ProbeCue::Hollow
            } else {
                ProbeCue::Plain
            });
            self.emit(GameEvent::Probe { coords, cue });
            self.scheduler
                .schedule(self.config.timing.reveal_delay_ms, Task::ResolveReveal(coords));
            self.persist();
        }
        Ok(outcome)
    }

    /// Moves virtual time forward by `dt`, running everything that falls due.
    pub fn advance(&mut self, dt: Millis) {
        let until = self.scheduler.now().saturating_add(dt);
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run(task);
        }
        self.scheduler.advance_to(until);
    }

    /// Feeds a raw message received from the hosting page.
    pub fn receive_host_message(&mut self, origin: &str, raw: &str) {
        let update = self.host.as_mut().and_then(|host| host.receive(origin, raw));
        if let Some(update) = update {
            self.apply_sanity(update);
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::ResolveReveal(coords) => {
                let mut narrator = Narrator::new(&self.config.theme, &mut self.rng);
                match self.session.resolve(coords, &mut narrator) {
                    Ok(Some(resolution)) => self.on_resolved(resolution),
                    Ok(None) => {}
                    Err(err) => log::warn!("Could not resolve {:?}: {}", coords, err),
                }
            }
            Task::FinishGame => {
                if self.session.finish() {
                    self.on_game_over();
                }
            }
            Task::ElapsedTick => {
                if self.session.tick() {
                    self.persist();
                    self.scheduler
                        .schedule(self.config.timing.tick_ms, Task::ElapsedTick);
                }
            }
            Task::PeriodicClue => {
                if self.session.is_finished() {
                    return;
                }
                let mut narrator = Narrator::new(&self.config.theme, &mut self.rng);
                if self.session.add_periodic_clue(&mut narrator).is_some() {
                    self.persist();
                }
                if let Some(cadence) = self.config.timing.periodic_clue_ms {
                    self.scheduler.schedule(cadence, Task::PeriodicClue);
                }
            }
            Task::HostInitTimeout => {
                let update = self.host.as_mut().and_then(HostLink::init_timed_out);
                if let Some(update) = update {
                    self.apply_sanity(update);
                }
            }
        }
    }

    fn on_resolved(&mut self, resolution: Resolution) {
        let coords = resolution.coords;

        if let Some(host) = self.host.as_mut() {
            host.budget_spent(-1);
        }
        match resolution.hit {
            Some(shape) => {
                self.emit(GameEvent::Hit { coords, shape });
                if resolution.completed {
                    self.emit(GameEvent::ShapeComplete { shape });
                }
            }
            None => self.emit(GameEvent::Miss { coords }),
        }

        match resolution.ending {
            None => self.persist(),
            Some(ending) => {
                self.settle_storage(ending);
                match (ending, self.config.timing.finish_delay_ms) {
                    (Ending::Victory, Some(delay)) => {
                        self.scheduler.schedule(delay, Task::FinishGame);
                    }
                    (Ending::Victory, None) => {
                        self.session.finish();
                        self.on_game_over();
                    }
                    (Ending::Defeat, _) => self.on_game_over(),
                }
            }
        }
    }

    /// Called once when the terminal flag goes up.
    fn on_game_over(&mut self) {
        let victory = self.session.is_victory();
        let score = self.session.score();
        log::info!(
            "Game over for {}: victory {}, score {:?}",
            self.config.id,
            victory,
            score
        );

        if victory {
            self.emit(GameEvent::Victory { score });
        } else {
            self.emit(GameEvent::Defeat { score });
        }
        if let Some(host) = self.host.as_mut() {
            host.complete(victory, None);
        }
    }

    fn settle_storage(&mut self, ending: Ending) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if self.config.autosave {
            store.clear_session();
        }
        if let (Ending::Victory, Some(score)) = (ending, self.session.score()) {
            store.record_score(ScoreEntry {
                shape_set_id: self.config.id.clone(),
                score,
                timestamp: crate::clue::unix_now(),
            });
        }
    }

    fn persist(&mut self) {
        if !self.config.autosave || self.session.is_finished() {
            return;
        }
        if let Some(store) = self.store.as_mut() {
            store.save_session(&self.session);
        }
    }

    fn apply_sanity(&mut self, update: SanityUpdate) {
        let applied = match update {
            SanityUpdate::Seed(sanity) => {
                self.host_sanity = Some(sanity);
                self.session.seed_pool(sanity)
            }
            SanityUpdate::Set(sanity) => {
                self.host_sanity = Some(sanity);
                self.session.set_pool_remaining(sanity)
            }
        };
        if applied {
            self.persist();
        } else {
            log::debug!("Ignoring sanity update {:?}", update);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.notify(&event);
        }
    }
}
