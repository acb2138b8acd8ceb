//! The read-only render pass.
//!
//! [`Game::render`] turns the current state into a flat, layered list of drawables positioned by
//! their interpolated render positions. Hosts draw it however they like.

use glam::Vec2;

use crate::animation::effect::EffectState;
use crate::audio::Mute;
use crate::config::Difficulty;
use crate::game::state::{GameStage, Phase};
use crate::game::Game;

/// Draw order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Markers,
    Warnings,
    Enemies,
    Player,
    Effects,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Sprite { sheet: &'static str, frame: u16 },
    /// A column-wipe cell.
    Warning,
    /// A digit flashed after an effect.
    Number(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub layer: Layer,
    pub visual: Visual,
    /// In cells, not pixels.
    pub position: Vec2,
    pub alpha: f32,
}

impl Drawable {
    fn sprite(layer: Layer, sheet: &'static str, frame: u16, position: Vec2) -> Self {
        Self {
            layer,
            visual: Visual::Sprite { sheet, frame },
            position,
            alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub stage: GameStage,
    pub phase: Phase,
    pub difficulty: Difficulty,
    pub souls: u32,
    pub followers: usize,
    pub pursuers_alive: usize,
    pub elapsed_ms: u64,
    pub best_ms: Option<u64>,
    pub mute: Mute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub drawables: Vec<Drawable>,
    pub hud: Hud,
}

impl Game {
    pub fn render(&self) -> RenderFrame {
        let session = self.session();
        let mut drawables = Vec::with_capacity(session.enemies.len() + session.player.follower_count() + 16);

        for marker in &session.markers {
            drawables.push(Drawable::sprite(
                Layer::Markers,
                marker.kind.sheet(),
                0,
                marker.cell.as_vec2(),
            ));
        }

        for wave in &session.warnings {
            drawables.extend(wave.visible().map(|(cell, alpha)| Drawable {
                layer: Layer::Warnings,
                visual: Visual::Warning,
                position: cell.as_vec2(),
                alpha,
            }));
        }

        for enemy in &session.enemies {
            drawables.push(Drawable::sprite(
                Layer::Enemies,
                enemy.kind.descriptor().sheet,
                enemy.sprite_frame(),
                enemy.body.render,
            ));
        }

        let player = &session.player;
        // The escorted follower is the leader; regular followers are chain segments.
        let follower_sheet = match session.phase {
            Phase::Collection => "player/follower",
            Phase::Escort => "enemies/andy",
        };
        for follower in player.followers() {
            drawables.push(Drawable::sprite(
                Layer::Player,
                follower_sheet,
                follower.facing.as_usize() as u16,
                follower.body.render,
            ));
        }
        drawables.push(Drawable::sprite(
            Layer::Player,
            "player/head",
            player.sprite_frame(),
            player.body.render,
        ));

        for animation in &session.animations {
            let position = animation.cell.as_vec2();
            match animation.state() {
                EffectState::Playing => drawables.push(Drawable::sprite(
                    Layer::Effects,
                    animation.kind.spec().sheet,
                    animation.frame(),
                    position,
                )),
                EffectState::ShowingNumber { value, .. } => drawables.push(Drawable {
                    layer: Layer::Effects,
                    visual: Visual::Number(value),
                    position,
                    alpha: 1.0,
                }),
                EffectState::Finished => {}
            }
        }

        drawables.sort_by_key(|d| d.layer);

        RenderFrame {
            drawables,
            hud: Hud {
                stage: self.stage(),
                phase: session.phase,
                difficulty: self.difficulty(),
                souls: session.souls_collected,
                followers: player.follower_count(),
                pursuers_alive: session.pursuers_alive,
                elapsed_ms: session.elapsed_ms,
                best_ms: self.best_time(),
                mute: self.mute(),
            },
        }
    }
}
