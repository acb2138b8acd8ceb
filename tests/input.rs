use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use speculoos::prelude::*;
use tar_souls::entity::direction::Direction;
use tar_souls::input::commands::{GameCommand, Intent};
use tar_souls::input::Bindings;

fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers,
        kind,
        state: KeyEventState::NONE,
    })
}

fn press(code: KeyCode) -> Event {
    key(code, KeyModifiers::NONE, KeyEventKind::Press)
}

#[test]
fn test_arrows_and_wasd_agree() {
    let bindings = Bindings::default();
    for (arrow, letter, direction) in [
        (KeyCode::Up, 'w', Direction::Up),
        (KeyCode::Down, 's', Direction::Down),
        (KeyCode::Left, 'a', Direction::Left),
        (KeyCode::Right, 'd', Direction::Right),
    ] {
        let expected = Some(GameCommand::Intent(Intent::Move(direction)));
        assert_that(&bindings.command_for(&press(arrow))).is_equal_to(expected);
        assert_that(&bindings.command_for(&press(KeyCode::Char(letter)))).is_equal_to(expected);
    }
}

#[test]
fn test_uppercase_letters_map_like_lowercase() {
    let bindings = Bindings::default();
    let shifted = key(KeyCode::Char('P'), KeyModifiers::SHIFT, KeyEventKind::Press);
    assert_that(&bindings.command_for(&shifted)).is_equal_to(Some(GameCommand::TogglePause));
}

#[test]
fn test_releases_and_repeats_ignored() {
    let bindings = Bindings::default();
    for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
        let event = key(KeyCode::Char(' '), KeyModifiers::NONE, kind);
        assert_that(&bindings.command_for(&event)).is_none();
    }
}

#[test]
fn test_ctrl_c_exits() {
    let bindings = Bindings::default();
    let event = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
    assert_that(&bindings.command_for(&event)).is_equal_to(Some(GameCommand::Exit));
}

#[test]
fn test_non_key_events_ignored() {
    let bindings = Bindings::default();
    assert_that(&bindings.command_for(&Event::FocusLost)).is_none();
    assert_that(&bindings.command_for(&Event::Resize(80, 24))).is_none();
    assert_that(&bindings.command_for(&press(KeyCode::F(5)))).is_none();
}
