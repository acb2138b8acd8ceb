//! The fixed integer lattice every entity lives on.

use glam::IVec2;

use crate::constants::{GRID_SIZE, PLAYER_START, SOFT_BOUNDARY_ROW};

/// Playfield geometry: dimensions, the start/portal cell and the collection-phase soft boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub size: IVec2,
    pub start: IVec2,
    pub soft_boundary_row: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            start: PLAYER_START,
            soft_boundary_row: SOFT_BOUNDARY_ROW,
        }
    }
}

impl Grid {
    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.contains_x(cell.x) && self.contains_y(cell.y)
    }

    pub fn contains_x(&self, x: i32) -> bool {
        (0..self.size.x).contains(&x)
    }

    pub fn contains_y(&self, y: i32) -> bool {
        (0..self.size.y).contains(&y)
    }

    pub fn bottom_row(&self) -> i32 {
        self.size.y - 1
    }

    /// Mirrors an off-grid column onto the opposite side.
    pub fn wrap_x(&self, x: i32) -> i32 {
        x.rem_euclid(self.size.x)
    }

    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(0, self.size.x - 1)
    }

    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(0, self.size.y - 1)
    }

    /// `count` columns spread evenly across the width, never touching the side walls.
    pub fn spread_columns(&self, count: usize) -> impl Iterator<Item = i32> + '_ {
        let slots = count as i32 + 1;
        (1..=count as i32).map(move |i| (i * self.size.x) / slots)
    }
}
