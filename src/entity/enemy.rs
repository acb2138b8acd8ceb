//! Enemy kinds, their immutable descriptors and per-instance runtime state.

use glam::IVec2;
use rand::Rng;
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::animation::sprite::SpriteAnimator;
use crate::constants::MIN_ENEMY_SPEED_MS;
use crate::entity::body::Body;
use crate::entity::direction::Direction;

/// Every enemy kind. Each dispatch site matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EnemyKind {
    /// The rescue target (Andy). Catching it starts the escort phase.
    Leader,
    /// A plain collectible. Eating one grows the chain.
    Soul,
    /// Pushable hazard that steals a single follower from the end of the chain.
    GrimeSoul,
    /// Pushable hazard that swallows the chain from the contact point onward.
    TarSoul,
    /// Escort-phase hunter (Nina).
    Pursuer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSpec {
    Fixed(u64),
    /// Uniformly sampled per instance, inclusive on both ends.
    Range(u64, u64),
}

/// Static, per-kind data. Never mutated at runtime.
#[derive(Debug)]
pub struct EnemyDescriptor {
    pub sheet: &'static str,
    pub speed: SpeedSpec,
    /// Whether a head collision displaces this enemy instead of consuming it.
    pub pushable: bool,
    /// Whether this kind waits instead of advancing into a follower.
    pub yields_to_tail: bool,
    pub walk_frames: &'static [u16],
}

static LEADER: EnemyDescriptor = EnemyDescriptor {
    sheet: "enemies/andy",
    speed: SpeedSpec::Fixed(700),
    pushable: false,
    yields_to_tail: true,
    walk_frames: &[0, 1],
};

static SOUL: EnemyDescriptor = EnemyDescriptor {
    sheet: "enemies/soul",
    speed: SpeedSpec::Fixed(620),
    pushable: false,
    yields_to_tail: true,
    walk_frames: &[0, 1, 2, 1],
};

static GRIME_SOUL: EnemyDescriptor = EnemyDescriptor {
    sheet: "enemies/grime_soul",
    speed: SpeedSpec::Fixed(520),
    pushable: true,
    yields_to_tail: false,
    walk_frames: &[0, 1, 2, 1],
};

static TAR_SOUL: EnemyDescriptor = EnemyDescriptor {
    sheet: "enemies/tar_soul",
    speed: SpeedSpec::Range(440, 660),
    pushable: true,
    yields_to_tail: false,
    walk_frames: &[0, 1, 2],
};

static PURSUER: EnemyDescriptor = EnemyDescriptor {
    sheet: "enemies/nina",
    speed: SpeedSpec::Fixed(420),
    pushable: false,
    yields_to_tail: false,
    walk_frames: &[0, 1],
};

impl EnemyKind {
    pub fn descriptor(self) -> &'static EnemyDescriptor {
        match self {
            EnemyKind::Leader => &LEADER,
            EnemyKind::Soul => &SOUL,
            EnemyKind::GrimeSoul => &GRIME_SOUL,
            EnemyKind::TarSoul => &TAR_SOUL,
            EnemyKind::Pursuer => &PURSUER,
        }
    }

    pub fn is_pushable(self) -> bool {
        self.descriptor().pushable
    }

    /// Samples a speed for a new instance, offset by the difficulty and clamped to the global floor.
    pub fn roll_speed(self, offset_ms: i64, rng: &mut impl Rng) -> u64 {
        let base = match self.descriptor().speed {
            SpeedSpec::Fixed(ms) => ms,
            SpeedSpec::Range(low, high) => rng.random_range(low..=high),
        };
        let adjusted = (base as i64).saturating_add(offset_ms);
        (adjusted.max(0) as u64).max(MIN_ENEMY_SPEED_MS)
    }
}

/// Stable handle for an enemy, valid until the enemy is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub body: Body,
    pub direction: Direction,
    pub speed: u64,
    last_move: u64,
    /// Movement is suppressed entirely until this timestamp.
    pub cooldown_until: Option<u64>,
    animator: SpriteAnimator,
}

impl Enemy {
    pub fn new(id: EnemyId, kind: EnemyKind, cell: IVec2, direction: Direction, speed: u64, now: u64) -> Self {
        Self {
            id,
            kind,
            body: Body::new(cell),
            direction,
            speed,
            last_move: now,
            cooldown_until: None,
            animator: SpriteAnimator::new(kind.descriptor().walk_frames, 0.15),
        }
    }

    pub fn with_cooldown(mut self, until: u64) -> Self {
        self.cooldown_until = Some(until);
        self
    }

    pub fn cell(&self) -> IVec2 {
        self.body.cell
    }

    /// Whether both the cooldown and the per-move timer have elapsed.
    pub fn ready(&self, now: u64) -> bool {
        if self.cooldown_until.is_some_and(|until| now < until) {
            return false;
        }
        now.saturating_sub(self.last_move) >= self.speed
    }

    /// Straight-line movers always head one cell along their direction.
    pub fn straight_target(&self) -> IVec2 {
        self.body.cell + self.direction.as_ivec2()
    }

    /// Greedy Manhattan step toward `target`, closing vertical distance first.
    pub fn chase_step(&self, target: IVec2) -> Option<Direction> {
        let delta = target - self.body.cell;
        if delta.y != 0 {
            Some(if delta.y < 0 { Direction::Up } else { Direction::Down })
        } else if delta.x != 0 {
            Some(if delta.x < 0 { Direction::Left } else { Direction::Right })
        } else {
            None
        }
    }

    /// Commits a move into `cell`, restarting the move timer.
    pub fn commit_move(&mut self, cell: IVec2, now: u64) {
        if let Some(direction) = Direction::from_delta(cell - self.body.cell) {
            self.direction = direction;
        }
        self.body.step_to(cell);
        self.last_move = now;
        self.cooldown_until = None;
    }

    /// Restarts the move timer without moving (used after being displaced).
    pub fn touch(&mut self, now: u64) {
        self.last_move = now;
    }

    pub fn sprite_frame(&self) -> u16 {
        self.direction.as_usize() as u16 * self.animator.frame_count() as u16 + self.animator.frame()
    }

    pub fn animate(&mut self, dt: f32) {
        self.animator.tick(dt);
        self.body.smooth(dt);
    }

    pub fn shift_clock(&mut self, ms: u64) {
        self.last_move = self.last_move.saturating_add(ms);
        if let Some(until) = self.cooldown_until.as_mut() {
            *until = until.saturating_add(ms);
        }
    }
}
