//! Tar Souls: a real-time grid arcade minigame.
//!
//! The simulation lives in [`game`] and never touches a terminal, an audio device or the file
//! system directly. [`app`] is the terminal host that drives it.

pub mod animation;
pub mod app;
pub mod asset;
pub mod audio;
pub mod config;
pub mod constants;
pub mod entity;
pub mod error;
pub mod formatter;
pub mod formatting;
pub mod game;
pub mod grid;
pub mod input;
pub mod platform;
pub mod profiling;
pub mod render;
pub mod storage;
