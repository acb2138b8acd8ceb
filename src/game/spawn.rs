//! Spawn timing and composition for both phases, plus the leader's staged arrival.

use glam::IVec2;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::animation::warning::WarningWave;
use crate::config::SpawnWeights;
use crate::constants::ESCORT_SPAWN_SPREAD;
use crate::entity::direction::Direction;
use crate::entity::enemy::{Enemy, EnemyId, EnemyKind};
use crate::game::events::GameEvent;
use crate::game::scheduler::Deferred;
use crate::game::state::Phase;
use crate::game::Game;

/// Weighted pick among the collection-phase kinds. Tar-Souls are only eligible when `tar_allowed`.
pub fn choose_collection_kind(weights: &SpawnWeights, tar_allowed: bool, rng: &mut impl Rng) -> EnemyKind {
    let tar = if tar_allowed { weights.tar } else { 0 };
    let total = weights.soul + weights.grime + tar;
    if total == 0 {
        return EnemyKind::Soul;
    }
    let roll = rng.random_range(0..total);
    if roll < weights.soul {
        EnemyKind::Soul
    } else if roll < weights.soul + weights.grime {
        EnemyKind::GrimeSoul
    } else {
        EnemyKind::TarSoul
    }
}

/// Escort-phase hazards: Grime or Tar by their relative weights.
pub fn choose_escort_kind(weights: &SpawnWeights, tar_allowed: bool, rng: &mut impl Rng) -> EnemyKind {
    let tar = if tar_allowed { weights.tar } else { 0 };
    let total = weights.grime + tar;
    if total == 0 || rng.random_range(0..total) < weights.grime {
        EnemyKind::GrimeSoul
    } else {
        EnemyKind::TarSoul
    }
}

impl Game {
    /// Adds an enemy with a freshly rolled speed. The caller is responsible for the cell being free.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, cell: IVec2, direction: Direction, now: u64) -> EnemyId {
        let enemy = self.roll_enemy(kind, cell, direction, now);
        self.insert_enemy(enemy)
    }

    fn roll_enemy(&mut self, kind: EnemyKind, cell: IVec2, direction: Direction, now: u64) -> Enemy {
        let id = self.session.next_id();
        let speed = kind.roll_speed(self.profile.enemy_speed_offset_ms, &mut self.rng);
        Enemy::new(id, kind, cell, direction, speed, now)
    }

    fn insert_enemy(&mut self, enemy: Enemy) -> EnemyId {
        trace!(kind = %enemy.kind, cell = ?enemy.cell(), direction = ?enemy.direction, speed = enemy.speed, "Spawned enemy");
        let id = enemy.id;
        self.session.enemies.push(enemy);
        id
    }

    pub(super) fn spawn_pursuer(&mut self, cell: IVec2, cooldown_until: Option<u64>, now: u64) -> EnemyId {
        let mut pursuer = self.roll_enemy(EnemyKind::Pursuer, cell, Direction::Up, now);
        if let Some(until) = cooldown_until {
            pursuer = pursuer.with_cooldown(until);
        }
        let id = self.insert_enemy(pursuer);
        self.session.pursuers_alive += 1;
        self.emit(GameEvent::PursuerSpawned { id, cell });
        id
    }

    fn is_free(&self, cell: IVec2) -> bool {
        self.session.enemy_at(cell).is_none()
            && !self.session.player_occupies(cell)
            && !self.session.markers.iter().any(|m| m.cell == cell && m.kind.blocks_movement())
    }

    pub(super) fn run_spawns(&mut self, now: u64) {
        if now < self.session.next_spawn_at {
            return;
        }
        let interval = match self.session.phase {
            Phase::Collection => self.profile.spawn_interval_ms,
            Phase::Escort => self.profile.spawn_interval_ms * 2,
        };
        self.session.next_spawn_at = now + interval;

        match self.session.phase {
            Phase::Collection => self.spawn_collectible(now),
            Phase::Escort => self.spawn_escort_hazard(now),
        }
    }

    fn tar_allowed(&self) -> bool {
        self.session.count_of(EnemyKind::TarSoul) < self.profile.max_tar_souls
    }

    fn spawn_collectible(&mut self, now: u64) {
        let in_grace = self.session.spawn_count < self.profile.grace_spawns;
        let tar_allowed = !in_grace && self.tar_allowed();
        let kind = choose_collection_kind(&self.profile.spawn_weights, tar_allowed, &mut self.rng);

        let row = self.grid.bottom_row();
        let free: SmallVec<[i32; 16]> = (0..self.grid.width())
            .filter(|&x| self.is_free(IVec2::new(x, row)))
            .collect();
        if free.is_empty() {
            trace!("Bottom row full, skipping spawn");
            return;
        }
        let x = free[self.rng.random_range(0..free.len())];

        self.spawn_enemy(kind, IVec2::new(x, row), Direction::Up, now);
        self.session.spawn_count += 1;
    }

    /// Hazards enter from a side edge, a couple of rows around the player, and cross horizontally.
    fn spawn_escort_hazard(&mut self, now: u64) {
        let tar_allowed = self.tar_allowed();
        let kind = choose_escort_kind(&self.profile.spawn_weights, tar_allowed, &mut self.rng);

        let (x, direction) = if self.rng.random_bool(0.5) {
            (0, Direction::Right)
        } else {
            (self.grid.width() - 1, Direction::Left)
        };
        let offset = self.rng.random_range(-ESCORT_SPAWN_SPREAD..=ESCORT_SPAWN_SPREAD);
        let y = self.grid.clamp_y(self.session.player.body.cell.y + offset);
        let cell = IVec2::new(x, y);

        if !self.is_free(cell) {
            trace!(?cell, "Escort spawn cell occupied, skipping");
            return;
        }
        self.spawn_enemy(kind, cell, direction, now);
        self.session.spawn_count += 1;
    }

    /// Starts the leader's arrival once the chain is long enough. Happens at most once per run.
    pub(super) fn maybe_warn_leader(&mut self, now: u64) {
        let session = &self.session;
        if session.leader_spawned
            || session.phase != Phase::Collection
            || session.player.follower_count() < self.profile.leader_threshold
        {
            return;
        }
        self.session.leader_spawned = true;

        let column = self.rng.random_range(1..self.grid.width() - 1);
        let sweep = WarningWave::column(column, self.grid.height()).sweep_duration();
        let due = now + (sweep * 1000.0).ceil() as u64;
        debug!(column, due, "Leader incoming");
        self.emit(GameEvent::LeaderWarning { column });
        self.scheduler.schedule(due, Deferred::SpawnLeader { column });
    }

    pub(super) fn spawn_leader(&mut self, column: i32, now: u64) {
        if self.session.phase != Phase::Collection {
            return;
        }
        let cell = IVec2::new(column, self.grid.bottom_row());
        if let Some(occupant) = self.session.enemy_at(cell) {
            self.retire_enemy(occupant);
        }
        self.spawn_enemy(EnemyKind::Leader, cell, Direction::Up, now);
        self.emit(GameEvent::LeaderSpawned { cell });
    }
}
