//! Collision predicates over grid cells.
//!
//! Everything here is a pure function of positions. The enemy checks compare two time-steps
//! (the cell held at the start of the tick and the cell held now) so entities that cross paths
//! between ticks still register as touching.
//!
//! Both time-step checks assume each entity moves at most one cell per tick. If multi-cell
//! moves are ever introduced, an exact swap stops being the only way to tunnel through an
//! entity and these checks will miss collisions.

use glam::IVec2;

use crate::grid::Grid;

/// The cell lies outside the playfield entirely.
pub fn hits_wall(grid: &Grid, cell: IVec2) -> bool {
    !grid.contains(cell)
}

/// The head has dropped below the collection-phase soft boundary.
pub fn crosses_soft_boundary(grid: &Grid, head: IVec2) -> bool {
    head.y > grid.soft_boundary_row
}

/// The head occupies one of its own followers.
pub fn hits_self(head: IVec2, followers: &[IVec2]) -> bool {
    followers.contains(&head)
}

/// Two-frame head/enemy collision: same cell now, or an exact swap since the last tick.
pub fn enemy_collision(player_now: IVec2, player_prev: IVec2, enemy_now: IVec2, enemy_prev: IVec2) -> bool {
    player_now == enemy_now || (player_now == enemy_prev && player_prev == enemy_now)
}

/// Same-cell-now only; crossing paths does not count.
pub fn strict_collision(a: IVec2, b: IVec2) -> bool {
    a == b
}

/// Index of the first follower sharing the enemy's cell.
pub fn tail_collision(enemy: IVec2, followers: &[IVec2]) -> Option<usize> {
    followers.iter().position(|&cell| cell == enemy)
}

/// Whether the cell one step along `step` is occupied by a follower.
pub fn blocked_by_tail(enemy: IVec2, step: IVec2, followers: &[IVec2]) -> bool {
    followers.contains(&(enemy + step))
}

/// The enemy has left through the top edge.
pub fn reached_top(cell: IVec2) -> bool {
    cell.y < 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_is_a_collision() {
        let player_prev = IVec2::new(1, 5);
        let player_now = IVec2::new(2, 5);
        let enemy_prev = IVec2::new(2, 5);
        let enemy_now = IVec2::new(1, 5);
        assert!(enemy_collision(player_now, player_prev, enemy_now, enemy_prev));
        assert!(!strict_collision(player_now, enemy_now));
    }

    #[test]
    fn test_following_is_not_a_swap() {
        // Enemy trails one cell behind the player in the same direction.
        assert!(!enemy_collision(
            IVec2::new(3, 5),
            IVec2::new(2, 5),
            IVec2::new(2, 5),
            IVec2::new(1, 5)
        ));
    }

    #[test]
    fn test_tail_collision_reports_first_index() {
        let followers = [IVec2::new(1, 1), IVec2::new(1, 2), IVec2::new(1, 2)];
        assert_eq!(tail_collision(IVec2::new(1, 2), &followers), Some(1));
        assert_eq!(tail_collision(IVec2::new(9, 9), &followers), None);
    }
}
