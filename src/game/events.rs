//! Notable things that happen during a tick, and the effects and sounds they trigger.

use glam::IVec2;

use crate::animation::effect::{Anchor, EffectKind, GameAnimation};
use crate::audio::Sound;
use crate::entity::enemy::{EnemyId, EnemyKind};
use crate::game::state::LossReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    SoulEaten { cell: IVec2, followers: usize },
    /// An enemy was crushed by a pushed enemy.
    EnemyDestroyed { kind: EnemyKind, cell: IVec2 },
    EnemyPushed { id: EnemyId, from: IVec2, to: IVec2 },
    /// A hazard bit the chain, taking `lost` followers.
    TailHit { kind: EnemyKind, cell: IVec2, lost: usize },
    LeaderWarning { column: i32 },
    LeaderSpawned { cell: IVec2 },
    EscortStarted,
    PursuerSpawned { id: EnemyId, cell: IVec2 },
    PursuerKilled { cell: IVec2 },
    GraveDestroyed { cell: IVec2 },
    PortalOpened { cell: IVec2 },
    Lost { reason: LossReason, cell: IVec2 },
    Won { time_ms: u64, new_best: bool },
}

impl GameEvent {
    pub fn sound(&self) -> Option<Sound> {
        match self {
            GameEvent::SoulEaten { .. } => Some(Sound::Eat),
            GameEvent::EnemyDestroyed { .. } => Some(Sound::Hit),
            GameEvent::EnemyPushed { .. } => Some(Sound::Push),
            GameEvent::TailHit { .. } => Some(Sound::Steal),
            GameEvent::LeaderWarning { .. } => Some(Sound::Warning),
            GameEvent::EscortStarted => Some(Sound::Escort),
            GameEvent::PursuerKilled { .. } => Some(Sound::Kill),
            GameEvent::GraveDestroyed { .. } => Some(Sound::Hit),
            GameEvent::PortalOpened { .. } => Some(Sound::Portal),
            GameEvent::Lost { .. } => Some(Sound::Lose),
            GameEvent::Won { .. } => Some(Sound::Win),
            GameEvent::Started | GameEvent::LeaderSpawned { .. } | GameEvent::PursuerSpawned { .. } => None,
        }
    }

    /// The one-shot (or looping) effect to play, if any.
    pub fn effect(&self) -> Option<GameAnimation> {
        match *self {
            GameEvent::SoulEaten { cell, followers } => {
                Some(GameAnimation::at(EffectKind::Eat, cell).then_show_number(followers as u32))
            }
            GameEvent::EnemyDestroyed { cell, .. } => Some(GameAnimation::at(EffectKind::Hit, cell)),
            GameEvent::TailHit { cell, .. } => Some(GameAnimation::at(EffectKind::Steal, cell)),
            GameEvent::PursuerSpawned { id, cell } => {
                Some(GameAnimation::following(EffectKind::Poof, Anchor::Enemy(id), cell))
            }
            GameEvent::PursuerKilled { cell } | GameEvent::GraveDestroyed { cell } => {
                Some(GameAnimation::at(EffectKind::Poof, cell))
            }
            GameEvent::PortalOpened { cell } => Some(GameAnimation::at(EffectKind::Portal, cell)),
            GameEvent::Lost { cell, .. } => Some(GameAnimation::at(EffectKind::Death, cell)),
            GameEvent::Started
            | GameEvent::EnemyPushed { .. }
            | GameEvent::LeaderWarning { .. }
            | GameEvent::LeaderSpawned { .. }
            | GameEvent::EscortStarted
            | GameEvent::Won { .. } => None,
        }
    }
}
