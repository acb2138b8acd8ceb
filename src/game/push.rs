//! Displacing a pushable enemy the head ran into.
//!
//! Horizontal movers are shoved down; vertical movers to a random side. Off-grid and blocked
//! destinations re-derive the direction, bounded by [`MAX_PUSH_ATTEMPTS`]. When no attempt
//! finds a cell the push is dropped and the enemy stays where it is.

use glam::IVec2;
use tracing::{debug, trace};

use crate::constants::MAX_PUSH_ATTEMPTS;
use crate::entity::collision::tail_collision;
use crate::entity::direction::Direction;
use crate::entity::enemy::{EnemyId, EnemyKind};
use crate::entity::marker::blocking_marker_at;
use crate::game::events::GameEvent;
use crate::game::interact::random_side;
use crate::game::state::LossReason;
use crate::game::Game;

impl Game {
    pub(super) fn push_enemy(&mut self, id: EnemyId, now: u64) {
        let Some(index) = self.session.enemy_index(id) else {
            return;
        };
        let (kind, origin, moving) = {
            let enemy = &self.session.enemies[index];
            (enemy.kind, enemy.cell(), enemy.direction)
        };
        if !kind.is_pushable() {
            return;
        }

        let mut push = if moving.is_horizontal() {
            Direction::Down
        } else {
            random_side(&mut self.rng)
        };
        let mut reversed = false;

        for attempt in 0..MAX_PUSH_ATTEMPTS {
            let dest = origin + push.as_ivec2();
            trace!(attempt, ?push, ?dest, "Resolving push");

            if !self.grid.contains_x(dest.x) {
                push = push.opposite();
                continue;
            }
            if !self.grid.contains_y(dest.y) {
                push = random_side(&mut self.rng);
                if !self.grid.contains_x(origin.x + push.as_ivec2().x) {
                    push = push.opposite();
                }
                continue;
            }

            if let Some(follower) = tail_collision(dest, &self.session.player.follower_cells()) {
                self.hit_tail(id, follower);
                return;
            }

            if let Some(occupant) = self.session.enemy_at(dest).filter(|&i| self.session.enemies[i].id != id) {
                if self.session.enemies[occupant].kind == EnemyKind::Leader {
                    self.lose(LossReason::PushedIntoLeader);
                    return;
                }
                let crushed = self.retire_enemy(occupant);
                debug!(kind = %crushed.kind, ?dest, "Pushed enemy crushed another");
                self.emit(GameEvent::EnemyDestroyed {
                    kind: crushed.kind,
                    cell: dest,
                });
                self.check_victory_gate();
                self.finish_push(id, origin, dest, now);
                return;
            }

            let blocked_by_head = dest == self.session.player.body.cell;
            if !blocked_by_head && blocking_marker_at(&self.session.markers, dest).is_none() {
                self.finish_push(id, origin, dest, now);
                return;
            }

            if reversed {
                break;
            }
            push = push.opposite();
            reversed = true;
        }

        trace!(?origin, "Push abandoned");
    }

    fn finish_push(&mut self, id: EnemyId, from: IVec2, to: IVec2, now: u64) {
        let Some(index) = self.session.enemy_index(id) else {
            return;
        };
        let enemy = &mut self.session.enemies[index];
        enemy.body.step_to(to);
        enemy.touch(now);
        self.emit(GameEvent::EnemyPushed { id, from, to });

        if self.session.escort_active {
            self.flip_escort();
        }
    }
}
