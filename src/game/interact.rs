//! Collision resolution and the outcomes it triggers.
//!
//! Enemies are resolved one at a time in list order. The first terminal outcome (a loss or a
//! win) ends the tick; anything later in the list is not looked at.

use glam::IVec2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::animation::effect::EffectKind;
use crate::entity::collision::{enemy_collision, strict_collision, tail_collision};
use crate::entity::direction::Direction;
use crate::entity::enemy::{Enemy, EnemyId, EnemyKind};
use crate::entity::marker::{MarkerKind, StaticSprite};
use crate::entity::player::SpriteSet;
use crate::game::events::GameEvent;
use crate::game::scheduler::Deferred;
use crate::game::state::{LossReason, Phase};
use crate::game::Game;

impl Game {
    pub(super) fn resolve_collisions(&mut self, player_moved: bool, now: u64) {
        let ids: SmallVec<[EnemyId; 16]> = self.session.enemies.iter().map(|e| e.id).collect();
        for id in ids {
            if !self.is_playing() {
                return;
            }
            if let Some(index) = self.session.enemy_index(id) {
                self.collide(index, player_moved, now);
            }
        }
    }

    fn collide(&mut self, index: usize, player_moved: bool, now: u64) {
        let session = &self.session;
        let enemy = &session.enemies[index];
        let head = session.player.body;

        if enemy.kind == EnemyKind::Pursuer {
            if !session.escort_active {
                return;
            }
            if strict_collision(head.cell, enemy.cell()) {
                self.lose(LossReason::CaughtByPursuer);
            } else if session
                .player
                .followers()
                .iter()
                .any(|f| strict_collision(f.body.cell, enemy.cell()))
            {
                self.lose(LossReason::EscortCaught);
            }
            return;
        }

        // Contact only counts on the tick something moved; otherwise a resting overlap would
        // re-trigger every frame.
        if !player_moved && enemy.body.cell == enemy.body.previous {
            return;
        }

        let id = enemy.id;
        if enemy_collision(head.cell, head.previous, enemy.cell(), enemy.body.previous) {
            self.hit_head(id, now);
        } else if let Some(follower) = tail_collision(enemy.cell(), &session.player.follower_cells()) {
            self.hit_tail(id, follower);
        }
    }

    fn hit_head(&mut self, id: EnemyId, now: u64) {
        let Some(index) = self.session.enemy_index(id) else {
            return;
        };
        match self.session.enemies[index].kind {
            EnemyKind::Soul => self.eat(index, now),
            EnemyKind::Leader => {
                if self.session.phase == Phase::Collection {
                    self.enter_escort(index, now);
                }
            }
            EnemyKind::GrimeSoul | EnemyKind::TarSoul => self.push_enemy(id, now),
            EnemyKind::Pursuer => {}
        }
    }

    fn eat(&mut self, index: usize, now: u64) {
        let enemy = self.retire_enemy(index);
        self.session.souls_collected += 1;
        // Earlier eats may still be mid-animation; their followers count toward this digit.
        let followers =
            self.session.player.follower_count() + self.scheduler.pending(Deferred::AddFollower) + 1;
        self.scheduler
            .schedule(now + EffectKind::Eat.spec().duration_ms(), Deferred::AddFollower);
        self.emit(GameEvent::SoulEaten {
            cell: enemy.cell(),
            followers,
        });
    }

    /// Applies a hazard biting follower `follower`.
    pub(super) fn hit_tail(&mut self, id: EnemyId, follower: usize) {
        // The escorted leader shrugs off hazards; only pursuers threaten it.
        if self.session.escort_active {
            return;
        }
        let Some(index) = self.session.enemy_index(id) else {
            return;
        };
        let (kind, cell) = {
            let enemy = &self.session.enemies[index];
            (enemy.kind, enemy.cell())
        };

        match kind {
            EnemyKind::Leader | EnemyKind::Soul | EnemyKind::Pursuer => {}
            EnemyKind::GrimeSoul => {
                if self.session.player.remove_last_follower().is_some() {
                    debug!(remaining = self.session.player.follower_count(), "Grime soul stole a follower");
                    self.emit(GameEvent::TailHit { kind, cell, lost: 1 });
                }
            }
            EnemyKind::TarSoul => {
                let lost = self.session.player.truncate_followers(follower);
                self.retire_enemy(index);
                debug!(lost, remaining = self.session.player.follower_count(), "Tar soul swallowed the tail");
                self.emit(GameEvent::TailHit { kind, cell, lost });
            }
        }
    }

    /// Catching the leader: the chain is replaced by the leader alone and the pursuers arrive.
    fn enter_escort(&mut self, index: usize, now: u64) {
        if self.session.escort_active {
            return;
        }
        self.retire_enemy(index);

        let grid = self.grid;
        let session = &mut self.session;
        session.escort_active = true;
        session.phase = Phase::Escort;

        let player = &mut session.player;
        let head = player.body.cell;
        let behind = if player.body.previous != head {
            player.body.previous
        } else {
            let cell = head - player.facing.as_ivec2();
            IVec2::new(grid.clamp_x(cell.x), grid.clamp_y(cell.y))
        };
        let facing = player.facing;
        player.clear_followers();
        player.attach_follower(behind, facing);
        player.set_sprite_set(SpriteSet::FourWay);

        // Leftover collectibles have no purpose once the chain is gone.
        session.enemies.retain(|e| e.kind != EnemyKind::Soul);
        session.next_spawn_at = now + self.profile.spawn_interval_ms * 2;

        debug!(pursuers = self.profile.pursuer_count, "Escort phase started");
        self.emit(GameEvent::EscortStarted);

        let columns: SmallVec<[i32; 8]> = grid.spread_columns(self.profile.pursuer_count).collect();
        let cooldown = now + self.profile.pursuer_respawn_cooldown_ms;
        for x in columns {
            let cell = IVec2::new(x, grid.bottom_row());
            if let Some(occupant) = self.session.enemy_at(cell) {
                self.retire_enemy(occupant);
            }
            self.spawn_pursuer(cell, Some(cooldown), now);
        }
    }

    /// Strikes the cell in front of the head.
    pub(super) fn attack(&mut self, now: u64) {
        let player = &self.session.player;
        let target = player.body.cell + player.facing.as_ivec2();

        if let Some(index) = self
            .session
            .enemies
            .iter()
            .position(|e| e.kind == EnemyKind::Pursuer && e.cell() == target)
        {
            trace!(?target, "Attack hit a pursuer");
            self.kill_pursuer(index);
            return;
        }

        if let Some(marker) = self.session.marker_at(target, MarkerKind::Grave) {
            trace!(?target, "Attack hit a grave");
            if self.profile.marker_respawn {
                self.respawn_from_grave(marker, now);
            } else {
                self.session.markers.remove(marker);
                self.emit(GameEvent::GraveDestroyed { cell: target });
            }
        }
    }

    pub(super) fn kill_pursuer(&mut self, index: usize) {
        let enemy = self.retire_enemy(index);
        debug!(alive = self.session.pursuers_alive, "Pursuer killed");
        self.emit(GameEvent::PursuerKilled { cell: enemy.cell() });
        self.check_victory_gate();
    }

    /// Consumes a grave and raises a fresh pursuer on it after the respawn cooldown.
    ///
    /// A grave that something else is standing on stays put; the respawn waits until the cell clears.
    pub(super) fn respawn_from_grave(&mut self, marker: usize, now: u64) {
        let cell = self.session.markers[marker].cell;
        if let Some(occupant) = self.session.enemy_at(cell) {
            trace!(?cell, kind = %self.session.enemies[occupant].kind, "Grave occupied, respawn deferred");
            return;
        }
        let grave = self.session.markers.remove(marker);
        debug_assert_eq!(grave.kind, MarkerKind::Grave);
        self.emit(GameEvent::GraveDestroyed { cell: grave.cell });
        let cooldown = now + self.profile.pursuer_respawn_cooldown_ms;
        self.spawn_pursuer(grave.cell, Some(cooldown), now);
    }

    /// Removes an enemy, keeping the pursuer count and graves consistent.
    pub(super) fn retire_enemy(&mut self, index: usize) -> Enemy {
        let enemy = self.session.enemies.remove(index);
        if enemy.kind == EnemyKind::Pursuer {
            self.session.pursuers_alive = self.session.pursuers_alive.saturating_sub(1);
            self.session
                .markers
                .push(StaticSprite::new(MarkerKind::Grave, enemy.cell()));
        }
        enemy
    }

    /// Opens the portal the moment no pursuer is left.
    pub(super) fn check_victory_gate(&mut self) {
        let session = &self.session;
        if !session.escort_active || session.portal_open || session.pursuers_alive > 0 {
            return;
        }
        let cell = self.grid.start;
        self.session.portal_open = true;
        self.session.markers.push(StaticSprite::new(MarkerKind::Portal, cell));
        debug!(?cell, "Portal opened");
        self.emit(GameEvent::PortalOpened { cell });
    }

    /// Turns the head around and mirrors the escort through it, keeping it on the grid.
    pub(super) fn flip_escort(&mut self) {
        let grid = self.grid;
        let player = &mut self.session.player;
        player.flip();
        player.confine_followers(|cell| IVec2::new(grid.clamp_x(cell.x), grid.clamp_y(cell.y)));
        trace!(facing = ?player.facing, "Escort flipped");
    }
}

/// A random horizontal push direction.
pub(super) fn random_side(rng: &mut impl rand::Rng) -> Direction {
    if rng.random_bool(0.5) {
        Direction::Left
    } else {
        Direction::Right
    }
}
