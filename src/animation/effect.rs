//! One-shot and looping visual effects triggered by game events.

use glam::IVec2;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::animation::sprite::SpriteAnimator;
use crate::constants::NUMBER_DISPLAY_SECS;
use crate::entity::enemy::EnemyId;

/// Typed configuration for one kind of effect.
#[derive(Debug)]
pub struct AnimationSpec {
    pub sheet: &'static str,
    pub frames: &'static [u16],
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationSpec {
    /// Length of one pass over the frames, in seconds.
    pub fn duration(&self) -> f32 {
        self.frames.len() as f32 * self.frame_duration
    }

    pub fn duration_ms(&self) -> u64 {
        (self.duration() * 1000.0).round() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    Eat,
    Hit,
    Steal,
    Poof,
    Portal,
    Death,
}

impl EffectKind {
    pub fn spec(self) -> &'static AnimationSpec {
        match self {
            EffectKind::Eat => &AnimationSpec {
                sheet: "effects/eat",
                frames: &[0, 1, 2, 3, 4],
                frame_duration: 0.06,
                looping: false,
            },
            EffectKind::Hit => &AnimationSpec {
                sheet: "effects/hit",
                frames: &[0, 1, 2, 3],
                frame_duration: 0.05,
                looping: false,
            },
            EffectKind::Steal => &AnimationSpec {
                sheet: "effects/steal",
                frames: &[0, 1, 2],
                frame_duration: 0.08,
                looping: false,
            },
            EffectKind::Poof => &AnimationSpec {
                sheet: "effects/poof",
                frames: &[0, 1, 2, 3, 4, 5],
                frame_duration: 0.05,
                looping: false,
            },
            EffectKind::Portal => &AnimationSpec {
                sheet: "effects/portal",
                frames: &[0, 1, 2, 3],
                frame_duration: 0.1,
                looping: true,
            },
            EffectKind::Death => &AnimationSpec {
                sheet: "effects/death",
                frames: &[0, 1, 2, 3, 4, 5, 6, 7],
                frame_duration: 0.09,
                looping: false,
            },
        }
    }
}

/// Where an effect draws. Followed anchors re-resolve every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Cell(IVec2),
    Enemy(EnemyId),
    PlayerHead,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectState {
    Playing,
    /// The frames are done; a digit is flashed in place for a short while.
    ShowingNumber { value: u32, remaining: f32 },
    Finished,
}

#[derive(Debug, Clone)]
pub struct GameAnimation {
    pub kind: EffectKind,
    pub anchor: Anchor,
    /// Last resolved cell. Kept when a followed entity disappears.
    pub cell: IVec2,
    animator: SpriteAnimator,
    elapsed: f32,
    number_after: Option<u32>,
    state: EffectState,
}

impl GameAnimation {
    pub fn at(kind: EffectKind, cell: IVec2) -> Self {
        Self::new(kind, Anchor::Cell(cell), cell)
    }

    pub fn following(kind: EffectKind, anchor: Anchor, cell: IVec2) -> Self {
        Self::new(kind, anchor, cell)
    }

    fn new(kind: EffectKind, anchor: Anchor, cell: IVec2) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            anchor,
            cell,
            animator: SpriteAnimator::new(spec.frames, spec.frame_duration),
            elapsed: 0.0,
            number_after: None,
            state: EffectState::Playing,
        }
    }

    /// Flash `value` once the frames have played out.
    pub fn then_show_number(mut self, value: u32) -> Self {
        self.number_after = Some(value);
        self
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn finished(&self) -> bool {
        matches!(self.state, EffectState::Finished)
    }

    pub fn frame(&self) -> u16 {
        self.animator.frame()
    }

    /// Advances the effect. `resolve` maps the anchor to a live cell, or `None` if it is gone.
    pub fn tick(&mut self, dt: f32, resolve: impl Fn(Anchor) -> Option<IVec2>) {
        if let Some(cell) = resolve(self.anchor) {
            self.cell = cell;
        }

        match self.state {
            EffectState::Playing => {
                let spec = self.kind.spec();
                self.elapsed += dt;
                if spec.looping || self.elapsed < spec.duration() {
                    self.animator.tick(dt);
                    return;
                }
                let overflow = self.elapsed - spec.duration();
                self.state = match self.number_after {
                    Some(value) => EffectState::ShowingNumber {
                        value,
                        remaining: NUMBER_DISPLAY_SECS - overflow,
                    },
                    None => EffectState::Finished,
                };
            }
            EffectState::ShowingNumber { value, remaining } => {
                let remaining = remaining - dt;
                self.state = if remaining <= 0.0 {
                    EffectState::Finished
                } else {
                    EffectState::ShowingNumber { value, remaining }
                };
            }
            EffectState::Finished => {}
        }
    }

    /// Ends a looping effect.
    pub fn stop(&mut self) {
        self.state = EffectState::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(_: Anchor) -> Option<IVec2> {
        None
    }

    #[test]
    fn test_one_shot_finishes() {
        let mut anim = GameAnimation::at(EffectKind::Hit, IVec2::new(3, 3));
        anim.tick(0.1, fixed);
        assert!(!anim.finished());
        anim.tick(0.15, fixed);
        assert!(anim.finished());
    }

    #[test]
    fn test_number_follows_frames() {
        let mut anim = GameAnimation::at(EffectKind::Eat, IVec2::ZERO).then_show_number(4);
        anim.tick(EffectKind::Eat.spec().duration() + 0.01, fixed);
        assert!(matches!(anim.state(), EffectState::ShowingNumber { value: 4, .. }));
        anim.tick(NUMBER_DISPLAY_SECS, fixed);
        assert!(anim.finished());
    }

    #[test]
    fn test_looping_never_finishes_on_its_own() {
        let mut anim = GameAnimation::at(EffectKind::Portal, IVec2::ZERO);
        for _ in 0..600 {
            anim.tick(1.0 / 60.0, fixed);
        }
        assert!(!anim.finished());
        anim.stop();
        assert!(anim.finished());
    }

    #[test]
    fn test_follow_anchor_tracks_and_keeps_last_cell() {
        let mut anim = GameAnimation::following(EffectKind::Poof, Anchor::PlayerHead, IVec2::ZERO);
        anim.tick(0.01, |_| Some(IVec2::new(4, 2)));
        assert_eq!(anim.cell, IVec2::new(4, 2));
        anim.tick(0.01, |_| None);
        assert_eq!(anim.cell, IVec2::new(4, 2));
    }
}
