//! The player head and its trailing chain of followers.
//!
//! The head moves on a rate-limited timer. Every follower only ever takes the cell its
//! predecessor held before the move, so the chain reads like a classic snake.

use glam::IVec2;
use smallvec::SmallVec;
use tracing::trace;

use crate::animation::sprite::SpriteAnimator;
use crate::entity::body::Body;
use crate::entity::direction::Direction;

/// Milliseconds-per-cell as a function of chain length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedCurve {
    pub initial_ms: u64,
    pub decrease_per_follower_ms: u64,
    pub min_ms: u64,
}

impl SpeedCurve {
    /// `max(min, initial - followers * decrease)`: non-increasing in `followers`, bounded below by `min`.
    pub fn speed_for(&self, followers: usize) -> u64 {
        let decrease = self.decrease_per_follower_ms.saturating_mul(followers as u64);
        self.initial_ms.saturating_sub(decrease).max(self.min_ms)
    }
}

/// Which sheet layout the head draws from. Entering the escort phase swaps to the four-way set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteSet {
    /// Two rows: facing left, facing anything else.
    Sideways,
    /// One row per direction.
    FourWay,
}

impl SpriteSet {
    pub fn row(&self, facing: Direction) -> u16 {
        match self {
            SpriteSet::Sideways => u16::from(facing != Direction::Left),
            SpriteSet::FourWay => facing.as_usize() as u16,
        }
    }
}

/// A trailing chain segment. Never moves on its own; the player repositions it.
#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    pub body: Body,
    pub facing: Direction,
}

impl Follower {
    fn new(cell: IVec2, facing: Direction) -> Self {
        Self {
            body: Body::new(cell),
            facing,
        }
    }

    /// Takes over `cell`, re-orienting along the delta when it is a unit step.
    fn follow_to(&mut self, cell: IVec2) {
        if let Some(facing) = Direction::from_delta(cell - self.body.cell) {
            self.facing = facing;
        }
        self.body.step_to(cell);
    }
}

/// The result of a successful [`Player::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: IVec2,
    pub to: IVec2,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub facing: Direction,
    queued: Option<Direction>,
    followers: Vec<Follower>,
    curve: SpeedCurve,
    speed: u64,
    last_move: u64,
    sprite_set: SpriteSet,
    animator: SpriteAnimator,
}

impl Player {
    pub fn new(start: IVec2, facing: Direction, curve: SpeedCurve, now: u64) -> Self {
        Self {
            body: Body::new(start),
            facing,
            queued: None,
            followers: Vec::new(),
            curve,
            speed: curve.speed_for(0),
            last_move: now,
            sprite_set: SpriteSet::Sideways,
            animator: SpriteAnimator::new(&[0, 1, 2, 1], 0.12),
        }
    }

    /// Buffers a single direction change for the next move.
    ///
    /// Reversals are rejected so the head can never turn straight into its first follower.
    /// A later call overwrites an earlier, not yet consumed one.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if direction.is_reversal_of(self.facing) {
            trace!(?direction, facing = ?self.facing, "Rejected reversal");
            return false;
        }
        self.queued = Some(direction);
        true
    }

    pub fn queued_direction(&self) -> Option<Direction> {
        self.queued
    }

    /// Advances the head by one cell if the move timer allows it.
    ///
    /// With `manual_only`, the head stays put until a direction has been queued.
    /// The returned step may point off-grid; boundary policy belongs to the caller.
    pub fn step(&mut self, now: u64, manual_only: bool) -> Option<Step> {
        if now.saturating_sub(self.last_move) < self.speed {
            return None;
        }
        if manual_only && self.queued.is_none() {
            return None;
        }

        if let Some(direction) = self.queued.take() {
            self.facing = direction;
        }

        let from = self.body.cell;
        let to = from + self.facing.as_ivec2();
        self.last_move = now;

        // Snake propagation: each follower takes its predecessor's pre-move cell.
        let mut lead = from;
        for follower in self.followers.iter_mut() {
            let vacated = follower.body.cell;
            follower.follow_to(lead);
            lead = vacated;
        }
        self.body.step_to(to);

        Some(Step {
            from,
            to,
            direction: self.facing,
        })
    }

    pub fn followers(&self) -> &[Follower] {
        &self.followers
    }

    pub fn follower_cells(&self) -> SmallVec<[IVec2; 16]> {
        self.followers.iter().map(|f| f.body.cell).collect()
    }

    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }

    /// Appends a follower on the head's current cell.
    pub fn add_follower(&mut self) {
        self.followers.push(Follower::new(self.body.cell, self.facing));
        self.recompute_speed();
    }

    /// Attaches a follower on an explicit cell (used when the leader joins the chain).
    pub fn attach_follower(&mut self, cell: IVec2, facing: Direction) {
        self.followers.push(Follower::new(cell, facing));
        self.recompute_speed();
    }

    /// Drops the last follower, returning the cell it occupied.
    pub fn remove_last_follower(&mut self) -> Option<IVec2> {
        let removed = self.followers.pop().map(|f| f.body.cell);
        self.recompute_speed();
        removed
    }

    /// Drops every follower from `index` onward, returning how many were lost.
    pub fn truncate_followers(&mut self, index: usize) -> usize {
        let lost = self.followers.len().saturating_sub(index);
        self.followers.truncate(index);
        self.recompute_speed();
        lost
    }

    pub fn clear_followers(&mut self) {
        self.followers.clear();
        self.recompute_speed();
    }

    pub fn speed(&self) -> u64 {
        self.speed
    }

    pub fn curve(&self) -> SpeedCurve {
        self.curve
    }

    fn recompute_speed(&mut self) {
        self.speed = self.curve.speed_for(self.followers.len());
    }

    pub fn last_move(&self) -> u64 {
        self.last_move
    }

    pub fn sprite_set(&self) -> SpriteSet {
        self.sprite_set
    }

    pub fn set_sprite_set(&mut self, sprite_set: SpriteSet) {
        self.sprite_set = sprite_set;
    }

    pub fn sprite_frame(&self) -> u16 {
        self.sprite_set.row(self.facing) * self.animator.frame_count() as u16 + self.animator.frame()
    }

    /// Moves the head without stepping the chain, snapping its render position.
    pub fn teleport(&mut self, cell: IVec2) {
        self.body.teleport(cell);
    }

    pub fn face(&mut self, direction: Direction) {
        self.facing = direction;
        self.queued = None;
    }

    /// Turns the head around and mirrors every follower through the head's cell.
    pub fn flip(&mut self) {
        self.face(self.facing.opposite());
        let pivot = self.body.cell;
        for follower in self.followers.iter_mut() {
            let offset = follower.body.cell - pivot;
            follower.body.teleport(pivot - offset);
            follower.facing = follower.facing.opposite();
        }
    }

    /// Shifts the whole chain by `offset`, snapping every render position.
    pub fn translate(&mut self, offset: IVec2) {
        self.body.teleport(self.body.cell + offset);
        for follower in self.followers.iter_mut() {
            follower.body.teleport(follower.body.cell + offset);
        }
    }

    /// Pulls followers back onto legal cells after a flip or a pushback.
    pub fn confine_followers(&mut self, bound: impl Fn(IVec2) -> IVec2) {
        for follower in self.followers.iter_mut() {
            let cell = bound(follower.body.cell);
            if cell != follower.body.cell {
                follower.body.teleport(cell);
            }
        }
    }

    pub fn begin_tick(&mut self) {
        self.body.begin_tick();
        for follower in self.followers.iter_mut() {
            follower.body.begin_tick();
        }
    }

    pub fn animate(&mut self, dt: f32) {
        self.animator.tick(dt);
        self.body.smooth(dt);
        for follower in self.followers.iter_mut() {
            follower.body.smooth(dt);
        }
    }

    /// Pushes the move gate forward, used when resuming from a pause.
    pub fn shift_clock(&mut self, ms: u64) {
        self.last_move = self.last_move.saturating_add(ms);
    }
}
