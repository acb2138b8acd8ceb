use glam::{IVec2, Vec2};

use crate::constants::SMOOTHING_RATE;

/// A grid-locked position with its previous-tick shadow and a smoothed render position.
///
/// `cell` is authoritative. `previous` is the cell held at the start of the current tick and feeds
/// the two-frame collision checks. `render` trails `cell` and is only ever read by the render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub cell: IVec2,
    pub previous: IVec2,
    pub render: Vec2,
}

impl Body {
    pub fn new(cell: IVec2) -> Self {
        Self {
            cell,
            previous: cell,
            render: cell.as_vec2(),
        }
    }

    /// Marks the start of a tick: whatever the body holds now becomes the previous cell.
    pub fn begin_tick(&mut self) {
        self.previous = self.cell;
    }

    /// Moves to a new cell, leaving the render position to catch up.
    pub fn step_to(&mut self, cell: IVec2) {
        self.cell = cell;
    }

    /// Moves to a new cell and snaps the render and previous positions along with it.
    ///
    /// A jump is never a step, so it must not read as a swap to the two-frame checks.
    pub fn teleport(&mut self, cell: IVec2) {
        self.cell = cell;
        self.previous = cell;
        self.render = cell.as_vec2();
    }

    /// Exponentially eases the render position toward the logical cell.
    ///
    /// The blend factor is clamped to 1, so the render position never passes its target.
    pub fn smooth(&mut self, dt: f32) {
        let factor = (dt * SMOOTHING_RATE).clamp(0.0, 1.0);
        self.render = self.render.lerp(self.cell.as_vec2(), factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_never_overshoots() {
        let mut body = Body::new(IVec2::ZERO);
        body.step_to(IVec2::new(3, 0));
        let mut last = body.render.x;
        for _ in 0..120 {
            body.smooth(1.0 / 60.0);
            assert!(body.render.x >= last);
            assert!(body.render.x <= 3.0);
            last = body.render.x;
        }
        assert!((body.render.x - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_teleport_leaves_no_swap_trail() {
        let mut body = Body::new(IVec2::new(14, 4));
        body.begin_tick();
        body.teleport(IVec2::new(0, 4));
        assert_eq!(body.previous, IVec2::new(0, 4));
        assert_eq!(body.render, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_huge_delta_lands_exactly() {
        let mut body = Body::new(IVec2::ZERO);
        body.step_to(IVec2::new(0, 5));
        body.smooth(10.0);
        assert_eq!(body.render, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_teleport_snaps() {
        let mut body = Body::new(IVec2::new(0, 4));
        body.teleport(IVec2::new(14, 4));
        assert_eq!(body.render, Vec2::new(14.0, 4.0));
    }
}
