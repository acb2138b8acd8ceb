use glam::IVec2;

use crate::constants::{WARNING_FADE, WARNING_STEP_DELAY};

/// A column wipe announcing an incoming spawn.
///
/// Each cell lights up `step_delay` seconds after the one before it and then fades out over
/// `fade` seconds. Purely cosmetic; the simulation never reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningWave {
    cells: Vec<IVec2>,
    step_delay: f32,
    fade: f32,
    elapsed: f32,
}

impl WarningWave {
    pub fn new(cells: Vec<IVec2>) -> Self {
        Self::with_timing(cells, WARNING_STEP_DELAY, WARNING_FADE)
    }

    pub fn with_timing(cells: Vec<IVec2>, step_delay: f32, fade: f32) -> Self {
        Self {
            cells,
            step_delay,
            fade,
            elapsed: 0.0,
        }
    }

    /// A wave travelling down a single column, top row first.
    pub fn column(x: i32, height: i32) -> Self {
        Self::new((0..height).map(|y| IVec2::new(x, y)).collect())
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Seconds until the last cell has lit up.
    pub fn sweep_duration(&self) -> f32 {
        self.cells.len().saturating_sub(1) as f32 * self.step_delay
    }

    pub fn total_duration(&self) -> f32 {
        self.sweep_duration() + self.fade
    }

    pub fn finished(&self) -> bool {
        self.cells.is_empty() || self.elapsed >= self.total_duration()
    }

    /// Alpha of the cell at `index`: 0 before it lights, 1 on lighting, then linearly down to 0.
    pub fn alpha(&self, index: usize) -> f32 {
        let local = self.elapsed - index as f32 * self.step_delay;
        if local < 0.0 || self.fade <= 0.0 {
            return 0.0;
        }
        (1.0 - local / self.fade).clamp(0.0, 1.0)
    }

    /// Every currently visible cell with its alpha.
    pub fn visible(&self) -> impl Iterator<Item = (IVec2, f32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| (cell, self.alpha(i)))
            .filter(|&(_, alpha)| alpha > 0.0)
    }
}
