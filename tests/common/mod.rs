#![allow(dead_code)]

use glam::IVec2;
use tar_souls::config::{Difficulty, DifficultyProfile, DifficultyTable};
use tar_souls::entity::direction::Direction;
use tar_souls::entity::enemy::{EnemyId, EnemyKind};
use tar_souls::game::events::GameEvent;
use tar_souls::game::Game;

pub const SEED: u64 = 0x7A5;

/// Movement speed high enough that an enemy never moves during a test.
pub const FROZEN: u64 = 1_000_000;

pub fn profile(difficulty: Difficulty) -> DifficultyProfile {
    DifficultyTable::embedded()
        .expect("embedded difficulty table")
        .get(difficulty)
        .clone()
}

/// A started, seeded run at timestamp 0.
pub fn game(difficulty: Difficulty) -> Game {
    let mut game = Game::new(difficulty, profile(difficulty)).with_seed(SEED);
    game.start();
    game
}

/// A started run where the spawner never fires, so only hand-placed enemies exist.
pub fn quiet_game(difficulty: Difficulty) -> Game {
    let mut game = game(difficulty);
    game.session_mut().next_spawn_at = u64::MAX;
    game
}

/// Places an enemy with an explicit per-move speed.
pub fn place(game: &mut Game, kind: EnemyKind, cell: IVec2, direction: Direction, speed: u64, now: u64) -> EnemyId {
    let id = game.spawn_enemy(kind, cell, direction, now);
    let session = game.session_mut();
    let index = session.enemy_index(id).expect("just spawned");
    session.enemies[index].speed = speed;
    id
}

/// Runs a single tick at `now`, with a nominal frame delta.
pub fn tick(game: &mut Game, now: u64) {
    game.update(1.0 / 60.0, now);
}

pub fn head(game: &Game) -> IVec2 {
    game.session().player.body.cell
}

pub fn followers(game: &Game) -> Vec<IVec2> {
    game.session().player.follower_cells().to_vec()
}

pub fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

/// Puts the chain into the escort phase: the head runs into a leader waiting one cell to its right.
///
/// Returns the timestamp of the tick on which the leader was caught.
pub fn enter_escort(game: &mut Game) -> u64 {
    let start = head(game);
    place(game, EnemyKind::Leader, start + IVec2::X, Direction::Up, FROZEN, 0);
    let now = game.session().player.speed();
    tick(game, now);
    assert!(game.session().escort_active, "leader was not caught");
    // Hazards would make the rest of the test depend on the rng.
    game.session_mut().next_spawn_at = u64::MAX;
    now
}
