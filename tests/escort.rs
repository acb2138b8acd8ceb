mod common;

use common::*;
use glam::IVec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;
use std::collections::HashSet;
use tar_souls::config::Difficulty;
use tar_souls::entity::direction::Direction;
use tar_souls::entity::enemy::EnemyKind;
use tar_souls::entity::marker::{MarkerKind, StaticSprite};
use tar_souls::entity::player::SpriteSet;
use tar_souls::game::events::GameEvent;
use tar_souls::game::state::{GameStage, LossReason, Phase};
use tar_souls::game::Game;
use tar_souls::input::commands::Intent;

fn pursuer_cells(game: &Game) -> Vec<IVec2> {
    game.session()
        .enemies
        .iter()
        .filter(|e| e.kind == EnemyKind::Pursuer)
        .map(|e| e.cell())
        .collect()
}

#[test]
fn test_catching_the_leader_starts_the_escort() {
    let mut game = quiet_game(Difficulty::Normal);
    game.session_mut().player.add_follower();
    game.session_mut().player.add_follower();
    place(&mut game, EnemyKind::Soul, IVec2::new(3, 12), Direction::Up, FROZEN, 0);

    enter_escort(&mut game);

    let session = game.session();
    assert_eq!(session.phase, Phase::Escort);
    assert_eq!(session.player.sprite_set(), SpriteSet::FourWay);
    // The chain is replaced by the leader alone, right behind the head.
    assert_eq!(followers(&game), vec![IVec2::new(7, 2)]);
    assert_eq!(session.count_of(EnemyKind::Leader), 0);
    assert_eq!(session.count_of(EnemyKind::Soul), 0);
    assert_eq!(session.pursuers_alive, 3);
    let bottom = game.grid().bottom_row();
    assert_eq!(
        pursuer_cells(&game),
        vec![IVec2::new(3, bottom), IVec2::new(7, bottom), IVec2::new(11, bottom)]
    );
}

#[test]
fn test_escort_starts_once() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);

    // A second leader in reach must not rebuild the escort.
    place(&mut game, EnemyKind::Leader, IVec2::new(8, 3), Direction::Up, FROZEN, caught_at);
    game.push_intent(Intent::Move(Direction::Down));
    tick(&mut game, caught_at + 1000);

    let events = game.drain_events();
    assert_eq!(count_events(&events, |e| *e == GameEvent::EscortStarted), 1);
    assert_eq!(game.session().pursuers_alive, 3);
}

#[test]
fn test_head_waits_for_input_during_escort() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let at = head(&game);

    tick(&mut game, caught_at + 5000);
    assert_eq!(head(&game), at);

    game.push_intent(Intent::Move(Direction::Up));
    tick(&mut game, caught_at + 6000);
    assert_eq!(head(&game), at + IVec2::NEG_Y);
}

#[test]
fn test_pursuers_wait_out_their_cooldown() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let before = pursuer_cells(&game);

    let cooldown = game.profile().pursuer_respawn_cooldown_ms;
    tick(&mut game, caught_at + cooldown - 1);
    assert_eq!(pursuer_cells(&game), before);

    tick(&mut game, caught_at + cooldown);
    let after = pursuer_cells(&game);
    // Each one closes the vertical gap first.
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(*new, *old + IVec2::NEG_Y);
    }
}

#[test]
fn test_pursuer_on_head_loses() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let at = head(&game);
    game.session_mut().enemies[0].body.teleport(at);

    tick(&mut game, caught_at + 1);
    assert_eq!(game.stage(), GameStage::Lost(LossReason::CaughtByPursuer));
}

#[test]
fn test_pursuer_on_leader_loses() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let leader = followers(&game)[0];
    game.session_mut().enemies[0].body.teleport(leader);

    tick(&mut game, caught_at + 1);
    assert_eq!(game.stage(), GameStage::Lost(LossReason::EscortCaught));
}

#[test]
fn test_killing_every_pursuer_opens_the_portal_and_walking_in_wins() {
    let mut game = quiet_game(Difficulty::Normal);
    let mut now = enter_escort(&mut game);
    let target = head(&game) + IVec2::X;

    for _ in 0..3 {
        let index = game
            .session()
            .enemies
            .iter()
            .position(|e| e.kind == EnemyKind::Pursuer)
            .expect("pursuer left");
        game.session_mut().enemies[index].body.teleport(target);
        game.push_intent(Intent::Attack);
        now += 50;
        tick(&mut game, now);
        if game.session().pursuers_alive > 0 {
            assert!(!game.session().portal_open);
            assert!(game.session().marker_at(game.grid().start, MarkerKind::Portal).is_none());
        }
    }

    let session = game.session();
    assert_eq!(session.pursuers_alive, 0);
    assert!(session.portal_open);
    let start = game.grid().start;
    assert!(session.marker_at(start, MarkerKind::Portal).is_some());
    assert!(session.marker_at(target, MarkerKind::Grave).is_some());
    let events = game.drain_events();
    assert_eq!(count_events(&events, |e| matches!(e, GameEvent::PursuerKilled { .. })), 3);
    assert!(events.contains(&GameEvent::PortalOpened { cell: start }));

    // Around the leader and back onto the start cell.
    for direction in [Direction::Down, Direction::Left, Direction::Up] {
        game.push_intent(Intent::Move(direction));
        now += 500;
        tick(&mut game, now);
    }

    assert_eq!(head(&game), start);
    assert!(matches!(game.stage(), GameStage::Won { .. }));
    assert_that(&game.best_time()).is_some();
}

#[test]
fn test_grave_pushes_the_chain_back() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let at = head(&game);
    game.session_mut()
        .markers
        .push(StaticSprite::new(MarkerKind::Grave, at + IVec2::Y));

    game.push_intent(Intent::Move(Direction::Down));
    tick(&mut game, caught_at + 1000);

    let distance = game.profile().pushback_distance;
    assert_eq!(game.stage(), GameStage::Playing);
    // Stepped onto the grave, then knocked back against the facing.
    assert_eq!(head(&game), at + IVec2::Y - IVec2::Y * distance);
    assert_eq!(followers(&game), vec![at - IVec2::Y * distance]);
}

#[test]
fn test_tail_hazards_ignored_during_escort() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let leader = followers(&game)[0];
    place(
        &mut game,
        EnemyKind::TarSoul,
        leader + IVec2::Y,
        Direction::Up,
        100,
        caught_at,
    );

    tick(&mut game, caught_at + 100);

    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(game.session().player.follower_count(), 1);
}

#[test]
fn test_pushing_a_hazard_flips_the_escort() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let at = head(&game);
    let grime = place(&mut game, EnemyKind::GrimeSoul, at + IVec2::X, Direction::Left, FROZEN, caught_at);

    game.push_intent(Intent::Move(Direction::Right));
    tick(&mut game, caught_at + 1000);

    let session = game.session();
    let pushed = &session.enemies[session.enemy_index(grime).unwrap()];
    assert_eq!(pushed.cell(), at + IVec2::X + IVec2::Y);
    assert_eq!(head(&game), at + IVec2::X);
    assert_eq!(session.player.facing, Direction::Left);
    // The leader is mirrored through the head onto its new back side.
    assert_eq!(followers(&game), vec![at + IVec2::X * 2]);
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::EnemyPushed {
        id: grime,
        from: at + IVec2::X,
        to: at + IVec2::X + IVec2::Y,
    }));
}

#[test]
fn test_pursuer_stepping_onto_a_grave_raises_another() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let first = pursuer_cells(&game)[0];
    let grave = first + IVec2::NEG_Y;
    game.session_mut().markers.push(StaticSprite::new(MarkerKind::Grave, grave));
    game.drain_events();

    let cooldown = game.profile().pursuer_respawn_cooldown_ms;
    tick(&mut game, caught_at + cooldown);

    let session = game.session();
    assert_eq!(session.pursuers_alive, 4);
    assert!(session.marker_at(grave, MarkerKind::Grave).is_none());
    // The one that triggered it stays put; the new one sits out its own cooldown.
    assert!(pursuer_cells(&game).contains(&first));
    let raised = session.enemies.iter().find(|e| e.cell() == grave).unwrap();
    assert_eq!(raised.kind, EnemyKind::Pursuer);
    assert_eq!(raised.cooldown_until, Some(caught_at + cooldown * 2));
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::GraveDestroyed { cell: grave }));
    assert_eq!(
        count_events(&events, |e| matches!(e, GameEvent::PursuerSpawned { cell, .. } if *cell == grave)),
        1
    );
}

#[test]
fn test_grave_only_blocks_pursuers_without_marker_respawn() {
    let mut game = quiet_game(Difficulty::Easy);
    let caught_at = enter_escort(&mut game);
    let first = pursuer_cells(&game)[0];
    let grave = first + IVec2::NEG_Y;
    game.session_mut().markers.push(StaticSprite::new(MarkerKind::Grave, grave));
    game.drain_events();

    let cooldown = game.profile().pursuer_respawn_cooldown_ms;
    tick(&mut game, caught_at + cooldown);

    let session = game.session();
    assert_eq!(session.pursuers_alive, game.profile().pursuer_count);
    assert!(session.marker_at(grave, MarkerKind::Grave).is_some());
    assert!(pursuer_cells(&game).contains(&first));
    let events = game.drain_events();
    assert_eq!(count_events(&events, |e| matches!(e, GameEvent::GraveDestroyed { .. })), 0);
    assert_eq!(count_events(&events, |e| matches!(e, GameEvent::PursuerSpawned { .. })), 0);
}

#[test]
fn test_attacking_a_grave_raises_a_pursuer_with_marker_respawn() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let grave = head(&game) + IVec2::X;
    game.session_mut().markers.push(StaticSprite::new(MarkerKind::Grave, grave));

    game.push_intent(Intent::Attack);
    tick(&mut game, caught_at + 50);

    let session = game.session();
    assert!(session.marker_at(grave, MarkerKind::Grave).is_none());
    assert_eq!(session.pursuers_alive, 4);
    let raised = session.enemies.iter().find(|e| e.cell() == grave).unwrap();
    assert_eq!(raised.kind, EnemyKind::Pursuer);
    let cooldown = game.profile().pursuer_respawn_cooldown_ms;
    assert_eq!(raised.cooldown_until, Some(caught_at + 50 + cooldown));
}

#[test]
fn test_attacking_a_grave_clears_it_without_marker_respawn() {
    let mut game = quiet_game(Difficulty::Easy);
    let caught_at = enter_escort(&mut game);
    let grave = head(&game) + IVec2::X;
    game.session_mut().markers.push(StaticSprite::new(MarkerKind::Grave, grave));

    game.push_intent(Intent::Attack);
    tick(&mut game, caught_at + 50);

    let session = game.session();
    assert!(session.marker_at(grave, MarkerKind::Grave).is_none());
    assert_eq!(session.pursuers_alive, game.profile().pursuer_count);
    assert!(session.enemy_at(grave).is_none());
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::GraveDestroyed { cell: grave }));
}

#[test]
fn test_occupied_grave_never_stacks_a_pursuer() {
    let mut game = quiet_game(Difficulty::Normal);
    let caught_at = enter_escort(&mut game);
    let at = head(&game);
    let grave = at + IVec2::X + IVec2::Y;
    // A hazard shoved onto a pursuer crushes it and comes to rest on the new grave.
    game.session_mut().enemies[0].body.teleport(grave);
    game.session_mut().enemies[1].body.teleport(grave + IVec2::Y);
    place(&mut game, EnemyKind::GrimeSoul, at + IVec2::X, Direction::Left, FROZEN, caught_at);

    game.push_intent(Intent::Move(Direction::Right));
    tick(&mut game, caught_at + 1000);
    assert_eq!(game.session().pursuers_alive, 2);
    assert!(game.session().marker_at(grave, MarkerKind::Grave).is_some());
    game.drain_events();

    // The pursuer below chases up into the occupied grave.
    let cooldown = game.profile().pursuer_respawn_cooldown_ms;
    tick(&mut game, caught_at + cooldown + 1000);

    let session = game.session();
    assert_eq!(game.stage(), GameStage::Playing);
    assert_eq!(session.pursuers_alive, 2);
    assert!(session.marker_at(grave, MarkerKind::Grave).is_some());
    assert!(pursuer_cells(&game).contains(&(grave + IVec2::Y)));
    let on_grave: Vec<_> = session.enemies.iter().filter(|e| e.cell() == grave).collect();
    assert_eq!(on_grave.len(), 1);
    assert_eq!(on_grave[0].kind, EnemyKind::GrimeSoul);
    let cells: HashSet<IVec2> = session.enemies.iter().map(|e| e.cell()).collect();
    assert_eq!(cells.len(), session.enemies.len());
    let events = game.drain_events();
    assert_eq!(count_events(&events, |e| matches!(e, GameEvent::PursuerSpawned { .. })), 0);
}
