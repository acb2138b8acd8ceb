//! Grid entities: the player chain, enemies, pinned markers and the predicates between them.

pub mod body;
pub mod collision;
pub mod direction;
pub mod enemy;
pub mod marker;
pub mod player;
