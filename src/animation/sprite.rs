use smallvec::SmallVec;

/// Cycles a fixed list of sprite-sheet frame indices on a timer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimator {
    frames: SmallVec<[u16; 8]>,
    frame_duration: f32,
    current: usize,
    time_bank: f32,
}

impl SpriteAnimator {
    pub fn new(frames: &[u16], frame_duration: f32) -> Self {
        Self {
            frames: SmallVec::from_slice(frames),
            frame_duration,
            current: 0,
            time_bank: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.frames.len() < 2 || self.frame_duration <= 0.0 {
            return;
        }
        self.time_bank += dt;
        while self.time_bank >= self.frame_duration {
            self.time_bank -= self.frame_duration;
            self.current = (self.current + 1) % self.frames.len();
        }
    }

    /// The frame index to draw. An animator with no frames draws frame 0.
    pub fn frame(&self) -> u16 {
        self.frames.get(self.current).copied().unwrap_or(0)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_and_wraps() {
        let mut animator = SpriteAnimator::new(&[4, 5, 6], 0.1);
        assert_eq!(animator.frame(), 4);
        animator.tick(0.15);
        assert_eq!(animator.frame(), 5);
        animator.tick(0.1);
        assert_eq!(animator.frame(), 6);
        animator.tick(0.1);
        assert_eq!(animator.frame(), 4);
    }

    #[test]
    fn test_large_dt_skips_multiple_frames() {
        let mut animator = SpriteAnimator::new(&[0, 1, 2, 3], 0.1);
        animator.tick(0.25);
        assert_eq!(animator.frame(), 2);
    }

    #[test]
    fn test_single_frame_is_static() {
        let mut animator = SpriteAnimator::new(&[9], 0.1);
        animator.tick(5.0);
        assert_eq!(animator.frame(), 9);
    }
}
