//! The simulation core.
//!
//! [`Game`] is a single owned context. All mutation happens inside [`Game::update`]; the render
//! pass only reads. Deferred consequences go through the [`Scheduler`] instead of callbacks.

use circular_buffer::CircularBuffer;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::animation::effect::Anchor;
use crate::animation::warning::WarningWave;
use crate::audio::{AudioManager, Music, Mute};
use crate::config::{Difficulty, DifficultyProfile};
use crate::constants::INTENT_BUFFER;
use crate::grid::Grid;
use crate::input::commands::{GameCommand, Intent};
use crate::storage::{BestTimeStore, MemoryStore};

use self::events::GameEvent;
use self::scheduler::{Deferred, Scheduler};
use self::state::{GameStage, LossReason, Phase, Session};

pub mod events;
pub mod interact;
pub mod movement;
pub mod push;
pub mod scheduler;
pub mod spawn;
pub mod state;

pub struct Game {
    grid: Grid,
    difficulty: Difficulty,
    profile: DifficultyProfile,
    stage: GameStage,
    session: Session,
    scheduler: Scheduler,
    intents: CircularBuffer<INTENT_BUFFER, Intent>,
    rng: SmallRng,
    audio: AudioManager,
    store: Box<dyn BestTimeStore>,
    best_time: Option<u64>,
    events: Vec<GameEvent>,
    /// Timestamp of the most recent `update`.
    clock: u64,
}

impl Game {
    pub fn new(difficulty: Difficulty, profile: DifficultyProfile) -> Self {
        let grid = Grid::default();
        let session = Session::new(&grid, profile.speed_curve(), profile.spawn_interval_ms, 0);
        Self {
            grid,
            difficulty,
            profile,
            stage: GameStage::BeforeGame,
            session,
            scheduler: Scheduler::new(),
            intents: CircularBuffer::new(),
            rng: SmallRng::from_os_rng(),
            audio: AudioManager::silent(),
            store: Box::new(MemoryStore::default()),
            best_time: None,
            events: Vec::new(),
            clock: 0,
        }
    }

    /// Makes every random decision reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn with_audio(mut self, audio: AudioManager) -> Self {
        self.audio = audio;
        self
    }

    /// Uses `store` for best times, reading the current record for this difficulty.
    pub fn with_store(mut self, store: Box<dyn BestTimeStore>) -> Self {
        self.best_time = match store.load() {
            Ok(times) => times.get(self.difficulty),
            Err(e) => {
                warn!(error = %e, "Could not read best times, starting without a record");
                None
            }
        };
        self.store = store;
        self
    }

    pub fn stage(&self) -> GameStage {
        self.stage
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn best_time(&self) -> Option<u64> {
        self.best_time
    }

    pub fn mute(&self) -> Mute {
        self.audio.mute()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Takes every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Leaves the title state. Does nothing once a run is underway.
    pub fn start(&mut self) {
        if self.stage != GameStage::BeforeGame {
            return;
        }
        self.reset_session();
        self.stage = GameStage::Playing;
        info!(difficulty = %self.difficulty, "Run started");
        self.emit(GameEvent::Started);
    }

    /// Throws the current run away and begins a fresh one immediately.
    pub fn restart(&mut self) {
        self.scheduler.bump_generation();
        self.reset_session();
        self.stage = GameStage::Playing;
        info!(difficulty = %self.difficulty, generation = self.scheduler.generation(), "Run restarted");
        self.emit(GameEvent::Started);
    }

    pub fn back_to_menu(&mut self) {
        self.scheduler.bump_generation();
        self.reset_session();
        self.stage = GameStage::BeforeGame;
        self.audio.stop_music();
    }

    fn reset_session(&mut self) {
        self.session = Session::new(
            &self.grid,
            self.profile.speed_curve(),
            self.profile.spawn_interval_ms,
            self.clock,
        );
        self.intents.clear();
    }

    pub fn toggle_pause(&mut self) {
        match self.stage {
            GameStage::Playing => {
                self.stage = GameStage::Paused { since: self.clock };
                info!("Paused");
            }
            GameStage::Paused { since } => {
                let paused_ms = self.clock.saturating_sub(since);
                self.shift_deadlines(paused_ms);
                self.stage = GameStage::Playing;
                info!(paused_ms, "Unpaused");
            }
            _ => {}
        }
    }

    /// Delays every absolute deadline so nothing fires in a burst after a pause.
    fn shift_deadlines(&mut self, ms: u64) {
        let session = &mut self.session;
        session.player.shift_clock(ms);
        for enemy in session.enemies.iter_mut() {
            enemy.shift_clock(ms);
        }
        session.next_spawn_at = session.next_spawn_at.saturating_add(ms);
        self.scheduler.shift(ms);
    }

    pub fn handle_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::Intent(intent) => self.push_intent(intent),
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::ToggleSoundMute => self.audio.toggle(Mute::SOUND),
            GameCommand::ToggleMusicMute => self.audio.toggle(Mute::MUSIC),
            GameCommand::Restart => self.restart(),
            GameCommand::BackToMenu => self.back_to_menu(),
            // Handled by the host.
            GameCommand::Exit => {}
        }
    }

    /// Buffers an intent for the next tick. Outside of play, attack starts or restarts a run.
    pub fn push_intent(&mut self, intent: Intent) {
        match (self.stage, intent) {
            (GameStage::BeforeGame, Intent::Attack) => self.start(),
            (GameStage::Lost(_) | GameStage::Won { .. }, Intent::Attack) => self.restart(),
            (GameStage::Playing, intent) => {
                // A full buffer drops its oldest intent.
                self.intents.push_back(intent);
            }
            _ => {}
        }
    }

    /// Advances the simulation to `now` (milliseconds), `dt` seconds after the previous frame.
    pub fn update(&mut self, dt: f32, now: u64) {
        let previous = self.clock;
        self.clock = now;

        match self.stage {
            GameStage::Playing => {}
            GameStage::Paused { .. } => return,
            GameStage::BeforeGame | GameStage::Lost(_) | GameStage::Won { .. } => {
                self.animate(dt);
                return;
            }
        }

        self.session.elapsed_ms += now.saturating_sub(previous);
        self.session.player.begin_tick();
        for enemy in self.session.enemies.iter_mut() {
            enemy.body.begin_tick();
        }

        if let Some(intent) = self.intents.pop_front() {
            self.apply_intent(intent, now);
        }
        self.run_scheduled(now);

        let player_moved = self.step_player(now);
        if self.is_playing() {
            self.move_enemies(now);
        }
        if self.is_playing() {
            self.resolve_collisions(player_moved, now);
        }
        if self.is_playing() {
            self.check_victory_gate();
            self.run_spawns(now);
        }

        self.animate(dt);
    }

    fn is_playing(&self) -> bool {
        self.stage == GameStage::Playing
    }

    fn apply_intent(&mut self, intent: Intent, now: u64) {
        match intent {
            Intent::Move(direction) => {
                self.session.player.queue_direction(direction);
            }
            Intent::Attack => self.attack(now),
        }
    }

    fn run_scheduled(&mut self, now: u64) {
        for event in self.scheduler.drain_due(now) {
            match event {
                Deferred::AddFollower => {
                    // The chain is rebuilt on escort entry; late growth would corrupt it.
                    if self.session.phase != Phase::Collection {
                        continue;
                    }
                    self.session.player.add_follower();
                    self.maybe_warn_leader(now);
                }
                Deferred::SpawnLeader { column } => self.spawn_leader(column, now),
            }
        }
    }

    /// Ends the run. Only the first terminal outcome of a tick counts.
    fn lose(&mut self, reason: LossReason) {
        if !self.is_playing() {
            return;
        }
        self.stage = GameStage::Lost(reason);
        info!(%reason, elapsed_ms = self.session.elapsed_ms, "Run lost");
        let cell = self.session.player.body.cell;
        self.emit(GameEvent::Lost { reason, cell });
    }

    fn win(&mut self) {
        if !self.is_playing() {
            return;
        }
        let time_ms = self.session.elapsed_ms;
        let new_best = match self.store.submit(self.difficulty, time_ms) {
            Ok(improved) => improved,
            Err(e) => {
                warn!(error = %e, "Could not save best time");
                self.best_time.is_none_or(|best| time_ms < best)
            }
        };
        if new_best {
            self.best_time = Some(time_ms);
        }
        self.stage = GameStage::Won { time_ms };
        info!(time_ms, new_best, "Run won");
        self.emit(GameEvent::Won { time_ms, new_best });
    }

    /// Routes an event to its sound, effect and music change, then records it.
    fn emit(&mut self, event: GameEvent) {
        debug!(?event, "Game event");
        if let Some(sound) = event.sound() {
            self.audio.play(sound);
        }
        if let Some(effect) = event.effect() {
            self.session.animations.push(effect);
        }
        match event {
            GameEvent::Started => self.audio.play_music(Music::Collection),
            GameEvent::EscortStarted => self.audio.play_music(Music::Escort),
            GameEvent::Lost { .. } | GameEvent::Won { .. } => self.audio.stop_music(),
            GameEvent::LeaderWarning { column } => {
                self.session.warnings.push(WarningWave::column(column, self.grid.height()));
            }
            _ => {}
        }
        self.events.push(event);
    }

    /// Advances every cosmetic timer and eases render positions.
    fn animate(&mut self, dt: f32) {
        let Session {
            player,
            enemies,
            animations,
            warnings,
            ..
        } = &mut self.session;

        player.animate(dt);
        for enemy in enemies.iter_mut() {
            enemy.animate(dt);
        }

        for animation in animations.iter_mut() {
            animation.tick(dt, |anchor| match anchor {
                Anchor::Cell(cell) => Some(cell),
                Anchor::PlayerHead => Some(player.body.cell),
                Anchor::Enemy(id) => enemies.iter().find(|e| e.id == id).map(|e| e.cell()),
            });
        }
        animations.retain(|a| !a.finished());

        for wave in warnings.iter_mut() {
            wave.tick(dt);
        }
        warnings.retain(|w| !w.finished());
    }
}
