mod common;

use common::*;
use glam::IVec2;
use pretty_assertions::assert_eq;
use tar_souls::config::Difficulty;
use tar_souls::entity::direction::Direction;
use tar_souls::entity::marker::{MarkerKind, StaticSprite};
use tar_souls::game::state::{GameStage, LossReason};
use tar_souls::game::Game;
use tar_souls::input::commands::Intent;

/// Places the head on `cell` facing `facing` and lets it take exactly one step.
fn step_from(difficulty: Difficulty, cell: IVec2, facing: Direction) -> Game {
    let mut game = quiet_game(difficulty);
    let player = &mut game.session_mut().player;
    player.teleport(cell);
    player.face(facing);
    let speed = game.session().player.speed();
    tick(&mut game, speed);
    game
}

/// Escorting, the head on `cell` walks right into a grave and is knocked back toward the left wall.
fn knock_back_from(difficulty: Difficulty, cell: IVec2) -> Game {
    let mut game = quiet_game(difficulty);
    let caught_at = enter_escort(&mut game);
    game.session_mut().player.teleport(cell);
    game.session_mut()
        .markers
        .push(StaticSprite::new(MarkerKind::Grave, cell + IVec2::X));
    game.push_intent(Intent::Move(Direction::Right));
    tick(&mut game, caught_at + 1000);
    game
}

#[test]
fn test_teleport_wraps_to_the_other_side() {
    let game = step_from(Difficulty::Easy, IVec2::new(0, 2), Direction::Left);
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(head(&game), IVec2::new(14, 2));

    let game = step_from(Difficulty::Easy, IVec2::new(14, 5), Direction::Right);
    assert_eq!(head(&game), IVec2::new(0, 5));
}

#[test]
fn test_push_down_drops_a_row() {
    let game = step_from(Difficulty::Normal, IVec2::new(0, 2), Direction::Left);
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(head(&game), IVec2::new(0, 3));
}

#[test]
fn test_game_over_wall() {
    let game = step_from(Difficulty::Hard, IVec2::new(0, 2), Direction::Left);
    assert_eq!(game.stage(), GameStage::Lost(LossReason::SideWall));
}

#[test]
fn test_top_edge_loses_on_every_difficulty() {
    for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
        let game = step_from(difficulty, IVec2::new(7, 0), Direction::Up);
        assert_eq!(game.stage(), GameStage::Lost(LossReason::TopBoundary), "{difficulty}");
    }
}

#[test]
fn test_soft_boundary_in_collection() {
    let row = quiet_game(Difficulty::Normal).grid().soft_boundary_row;
    let game = step_from(Difficulty::Normal, IVec2::new(7, row), Direction::Down);
    assert_eq!(game.stage(), GameStage::Lost(LossReason::SoftBoundary));
}

#[test]
fn test_soft_boundary_row_itself_is_allowed() {
    let row = quiet_game(Difficulty::Normal).grid().soft_boundary_row;
    let game = step_from(Difficulty::Normal, IVec2::new(7, row - 1), Direction::Down);
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(head(&game), IVec2::new(7, row));
}

#[test]
fn test_wall_loss_emits_one_event() {
    let mut game = step_from(Difficulty::Hard, IVec2::new(0, 2), Direction::Left);
    let events = game.drain_events();
    assert_eq!(
        count_events(&events, |e| matches!(e, tar_souls::game::events::GameEvent::Lost { .. })),
        1
    );
    // Nothing moves once the run is over.
    tick(&mut game, 10_000);
    assert_eq!(game.stage(), GameStage::Lost(LossReason::SideWall));
}

#[test]
fn test_knock_back_past_the_wall_on_the_bottom_row_loses() {
    let bottom = quiet_game(Difficulty::Normal).grid().bottom_row();
    let game = knock_back_from(Difficulty::Normal, IVec2::new(0, bottom));
    assert_eq!(game.stage(), GameStage::Lost(LossReason::BottomBoundary));
}

#[test]
fn test_knock_back_into_a_game_over_wall_loses() {
    let game = knock_back_from(Difficulty::Hard, IVec2::new(1, 10));
    assert_eq!(game.stage(), GameStage::Lost(LossReason::SideWall));
}
