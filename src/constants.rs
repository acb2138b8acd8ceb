//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::IVec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of the playfield, in cells.
pub const GRID_SIZE: IVec2 = IVec2::new(15, 18);
pub const GRID_WIDTH: i32 = GRID_SIZE.x;
pub const GRID_HEIGHT: i32 = GRID_SIZE.y;

/// The cell the player starts on, and the cell the portal opens on.
pub const PLAYER_START: IVec2 = IVec2::new(7, 2);

/// The lowest row the player may occupy during the collection phase.
pub const SOFT_BOUNDARY_ROW: i32 = 8;

/// Fraction of the remaining render distance closed per second (clamped to 1 per frame).
pub const SMOOTHING_RATE: f32 = 18.0;

/// Number of intents that can be buffered between ticks before the oldest is dropped.
pub const INTENT_BUFFER: usize = 4;

/// Speeds never drop below this many milliseconds per cell, regardless of difficulty offsets.
pub const MIN_ENEMY_SPEED_MS: u64 = 90;

/// Delay between each cell of a warning wave lighting up, in seconds.
pub const WARNING_STEP_DELAY: f32 = 0.06;
/// How long a single warning cell takes to fade out, in seconds.
pub const WARNING_FADE: f32 = 0.45;

/// How long the follower-count digit stays visible after an eat, in seconds.
pub const NUMBER_DISPLAY_SECS: f32 = 0.6;

/// How many times a push may re-derive its destination before being abandoned.
pub const MAX_PUSH_ATTEMPTS: usize = 4;

/// Rows (relative to the player) that escort-phase spawns may pick from.
pub const ESCORT_SPAWN_SPREAD: i32 = 2;
