pub mod effect;
pub mod sprite;
pub mod warning;
