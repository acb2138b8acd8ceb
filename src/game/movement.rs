//! Per-tick movement of the head and the enemies, and the boundary rules applied to it.

use glam::IVec2;
use smallvec::SmallVec;
use tracing::trace;

use crate::config::WallPolicy;
use crate::entity::collision::{blocked_by_tail, crosses_soft_boundary, hits_self, hits_wall, reached_top};
use crate::entity::enemy::{EnemyId, EnemyKind};
use crate::entity::marker::blocking_marker_at;
use crate::game::state::{LossReason, Phase};
use crate::game::Game;

impl Game {
    /// Resolves a head position past a side edge according to the wall policy.
    pub(super) fn apply_wall_policy(&self, cell: IVec2) -> Result<IVec2, LossReason> {
        match self.profile.wall_policy {
            WallPolicy::Teleport => Ok(IVec2::new(self.grid.wrap_x(cell.x), cell.y)),
            WallPolicy::PushDown => {
                let y = cell.y + 1;
                if !self.grid.contains_y(y) {
                    return Err(LossReason::BottomBoundary);
                }
                Ok(IVec2::new(self.grid.clamp_x(cell.x), y))
            }
            WallPolicy::GameOver => Err(LossReason::SideWall),
        }
    }

    /// Boundary handling after a pushback: rows are clamped, columns follow the wall policy exactly
    /// as a regular step would.
    pub(super) fn pushback_boundary(&self, cell: IVec2) -> Result<IVec2, LossReason> {
        let cell = IVec2::new(cell.x, self.grid.clamp_y(cell.y));
        if self.grid.contains_x(cell.x) {
            return Ok(cell);
        }
        self.apply_wall_policy(cell)
    }

    /// Steps the head if its timer allows and applies every head-only rule. Returns whether it moved.
    pub(super) fn step_player(&mut self, now: u64) -> bool {
        let manual_only = self.session.escort_active;
        let Some(step) = self.session.player.step(now, manual_only) else {
            return false;
        };
        trace!(from = ?step.from, to = ?step.to, direction = ?step.direction, "Player stepped");

        let mut head = step.to;
        if !self.grid.contains_y(head.y) {
            self.lose(if head.y < 0 {
                LossReason::TopBoundary
            } else {
                LossReason::BottomBoundary
            });
            return true;
        }
        if !self.grid.contains_x(head.x) {
            match self.apply_wall_policy(head) {
                Ok(cell) => {
                    head = cell;
                    self.session.player.teleport(cell);
                }
                Err(reason) => {
                    self.lose(reason);
                    return true;
                }
            }
        }

        if !self.session.escort_active && crosses_soft_boundary(&self.grid, head) {
            self.lose(LossReason::SoftBoundary);
            return true;
        }
        if hits_self(head, &self.session.player.follower_cells()) {
            self.lose(LossReason::SelfCollision);
            return true;
        }

        if self.session.escort_active && blocking_marker_at(&self.session.markers, head).is_some() {
            self.push_back_from_marker(head);
            if !self.is_playing() {
                return true;
            }
        }

        if self.session.portal_open && self.session.player.body.cell == self.grid.start {
            self.win();
        }
        true
    }

    /// Knocks the whole chain back against its facing after walking into a grave.
    fn push_back_from_marker(&mut self, head: IVec2) {
        let distance = self.profile.pushback_distance;
        let raw = head - self.session.player.facing.as_ivec2() * distance;
        match self.pushback_boundary(raw) {
            Ok(target) => {
                trace!(?head, ?target, "Pushed back from grave");
                let grid = self.grid;
                let player = &mut self.session.player;
                player.translate(target - head);
                player.confine_followers(|cell| IVec2::new(grid.clamp_x(cell.x), grid.clamp_y(cell.y)));
            }
            Err(reason) => self.lose(reason),
        }
    }

    /// Moves every enemy whose timer has elapsed, in list order.
    pub(super) fn move_enemies(&mut self, now: u64) {
        let ids: SmallVec<[EnemyId; 16]> = self.session.enemies.iter().map(|e| e.id).collect();
        for id in ids {
            if !self.is_playing() {
                return;
            }
            let Some(index) = self.session.enemy_index(id) else {
                continue;
            };
            let enemy = &self.session.enemies[index];
            if !enemy.ready(now) {
                continue;
            }
            match enemy.kind {
                EnemyKind::Pursuer => self.move_pursuer(index, now),
                EnemyKind::Leader | EnemyKind::Soul | EnemyKind::GrimeSoul | EnemyKind::TarSoul => {
                    self.move_straight(index, now)
                }
            }
        }
    }

    fn move_straight(&mut self, index: usize, now: u64) {
        let enemy = &self.session.enemies[index];
        let (kind, cell, direction) = (enemy.kind, enemy.cell(), enemy.direction);
        let target = enemy.straight_target();

        if reached_top(target) {
            self.retire_enemy(index);
            match kind {
                EnemyKind::Leader if self.session.phase == Phase::Collection => self.lose(LossReason::LeaderEscaped),
                EnemyKind::TarSoul => self.lose(LossReason::TarSoulEscaped),
                _ => trace!(%kind, "Enemy left through the top"),
            }
            return;
        }
        if hits_wall(&self.grid, target) {
            trace!(%kind, ?target, "Enemy left the field");
            self.retire_enemy(index);
            return;
        }

        let followers = self.session.player.follower_cells();
        if kind.descriptor().yields_to_tail && blocked_by_tail(cell, direction.as_ivec2(), &followers) {
            return;
        }
        if self.session.enemy_at(target).is_some() || blocking_marker_at(&self.session.markers, target).is_some() {
            return;
        }
        self.session.enemies[index].commit_move(target, now);
    }

    fn move_pursuer(&mut self, index: usize, now: u64) {
        let head = self.session.player.body.cell;
        let enemy = &self.session.enemies[index];
        let Some(direction) = enemy.chase_step(head) else {
            return;
        };
        let target = enemy.cell() + direction.as_ivec2();

        if let Some(marker) = blocking_marker_at(&self.session.markers, target) {
            if self.profile.marker_respawn {
                self.session.enemies[index].touch(now);
                self.respawn_from_grave(marker, now);
            }
            return;
        }
        if self.session.enemy_at(target).is_some() {
            return;
        }
        self.session.enemies[index].commit_move(target, now);
    }
}
