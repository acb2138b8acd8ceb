use glam::IVec2;
use strum_macros::{Display, IntoStaticStr};

use crate::animation::effect::GameAnimation;
use crate::animation::warning::WarningWave;
use crate::entity::direction::Direction;
use crate::entity::enemy::{Enemy, EnemyId, EnemyKind};
use crate::entity::marker::{MarkerKind, StaticSprite};
use crate::entity::player::{Player, SpeedCurve};
use crate::grid::Grid;

/// Top-level lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    BeforeGame,
    Playing,
    /// Simulation frozen since the given timestamp.
    Paused { since: u64 },
    Lost(LossReason),
    Won { time_ms: u64 },
}

/// Sub-state of [`GameStage::Playing`]. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Collection,
    Escort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum LossReason {
    #[strum(to_string = "Left through the top")]
    TopBoundary,
    #[strum(to_string = "Left through the bottom")]
    BottomBoundary,
    #[strum(to_string = "Hit the side wall")]
    SideWall,
    #[strum(to_string = "Strayed too deep")]
    SoftBoundary,
    #[strum(to_string = "Bit your own tail")]
    SelfCollision,
    #[strum(to_string = "Andy got away")]
    LeaderEscaped,
    #[strum(to_string = "A tar soul got away")]
    TarSoulEscaped,
    #[strum(to_string = "Caught by Nina")]
    CaughtByPursuer,
    #[strum(to_string = "Nina caught Andy")]
    EscortCaught,
    #[strum(to_string = "Pushed a soul into Andy")]
    PushedIntoLeader,
}

/// Everything one run mutates. Replaced wholesale on restart.
#[derive(Debug)]
pub struct Session {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub animations: Vec<GameAnimation>,
    pub warnings: Vec<WarningWave>,
    pub markers: Vec<StaticSprite>,
    pub phase: Phase,
    pub leader_spawned: bool,
    pub escort_active: bool,
    pub pursuers_alive: usize,
    pub portal_open: bool,
    pub spawn_count: u32,
    pub next_spawn_at: u64,
    pub souls_collected: u32,
    pub elapsed_ms: u64,
    next_enemy_id: u32,
}

impl Session {
    pub fn new(grid: &Grid, curve: SpeedCurve, spawn_interval_ms: u64, now: u64) -> Self {
        // Cosmetic markers on both edges of the soft boundary row.
        let markers = [0, grid.width() - 1]
            .into_iter()
            .map(|x| StaticSprite::new(MarkerKind::Boundary, IVec2::new(x, grid.soft_boundary_row)))
            .collect();

        Self {
            player: Player::new(grid.start, Direction::Right, curve, now),
            enemies: Vec::new(),
            animations: Vec::new(),
            warnings: Vec::new(),
            markers,
            phase: Phase::Collection,
            leader_spawned: false,
            escort_active: false,
            pursuers_alive: 0,
            portal_open: false,
            spawn_count: 0,
            next_spawn_at: now + spawn_interval_ms,
            souls_collected: 0,
            elapsed_ms: 0,
            next_enemy_id: 0,
        }
    }

    pub fn next_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        id
    }

    pub fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|e| e.id == id)
    }

    pub fn enemy_at(&self, cell: IVec2) -> Option<usize> {
        self.enemies.iter().position(|e| e.cell() == cell)
    }

    pub fn count_of(&self, kind: EnemyKind) -> usize {
        self.enemies.iter().filter(|e| e.kind == kind).count()
    }

    pub fn marker_at(&self, cell: IVec2, kind: MarkerKind) -> Option<usize> {
        self.markers.iter().position(|m| m.cell == cell && m.kind == kind)
    }

    /// Whether the head or any follower sits on `cell`.
    pub fn player_occupies(&self, cell: IVec2) -> bool {
        self.player.body.cell == cell || self.player.followers().iter().any(|f| f.body.cell == cell)
    }
}
