use engine::{
    direction_from_yaw, yaw_from_direction, BoxSize, CollisionSystem, EntityId, InputSnapshot,
    PushableBody, Transform, TransformStore, Vec3,
};
use tracing::{debug, info};

use super::combat::{AttackState, AttackTuning, ConeQuery};
use super::destructible::{DestroyedProp, DestructibleSet};
use super::particles::ParticleSystem;

const FLASH_BASE_OPACITY: f32 = 0.7;
const FLASH_AMPLITUDE: f32 = 0.3;
const FLASH_FREQUENCY: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerTuning {
    pub(crate) speed: f32,
    pub(crate) size: BoxSize,
    pub(crate) max_health: f32,
    pub(crate) invincibility_seconds: f32,
    pub(crate) respawn_delay_seconds: f32,
    pub(crate) spawn_point: Vec3,
    /// How far ahead a pushed body is probed for walls before the player is
    /// allowed to shove it.
    pub(crate) push_probe_distance: f32,
    pub(crate) attack: AttackTuning,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            size: BoxSize::new(2.0, 4.0, 2.0),
            max_health: 100.0,
            invincibility_seconds: 1.5,
            respawn_delay_seconds: 2.0,
            spawn_point: Vec3::ZERO,
            push_probe_distance: 0.5,
            attack: AttackTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    Idle,
    Moved,
    /// Only some axes of the move were committed.
    Slid { x: bool, z: bool },
    Blocked,
    /// A pushable in the way could not be moved.
    PushBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    Rejected,
    Applied,
    Killed,
}

impl DamageOutcome {
    pub(crate) fn applied(self) -> bool {
        self != Self::Rejected
    }
}

/// Mutable world state the player touches during one update.
pub(crate) struct PlayerContext<'a> {
    pub(crate) collisions: &'a mut CollisionSystem,
    pub(crate) transforms: &'a mut TransformStore,
    pub(crate) pushables: &'a mut [PushableBody],
    pub(crate) destructibles: &'a mut DestructibleSet,
    pub(crate) particles: &'a mut ParticleSystem,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlayerFrame {
    pub(crate) movement: MoveOutcome,
    pub(crate) attack_started: bool,
    pub(crate) destroyed: Vec<DestroyedProp>,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    entity: EntityId,
    tuning: PlayerTuning,
    health: f32,
    invincible_remaining: Option<f32>,
    invincible_elapsed: f32,
    opacity: f32,
    dead: bool,
    attack: AttackState,
    clock_seconds: f64,
    last_attack_at: Option<f64>,
}

impl Player {
    pub(crate) fn spawn(transforms: &mut TransformStore, tuning: PlayerTuning) -> Self {
        let entity = transforms.spawn(Transform::at(tuning.spawn_point));
        Self {
            entity,
            tuning,
            health: tuning.max_health,
            invincible_remaining: None,
            invincible_elapsed: 0.0,
            opacity: 1.0,
            dead: false,
            attack: AttackState::default(),
            clock_seconds: 0.0,
            last_attack_at: None,
        }
    }

    pub(crate) fn entity(&self) -> EntityId {
        self.entity
    }

    pub(crate) fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub(crate) fn position(&self, transforms: &TransformStore) -> Vec3 {
        transforms
            .position(self.entity)
            .unwrap_or(self.tuning.spawn_point)
    }

    pub(crate) fn facing(&self, transforms: &TransformStore) -> Vec3 {
        let yaw = transforms
            .get(self.entity)
            .map_or(0.0, |transform| transform.yaw_radians);
        direction_from_yaw(yaw)
    }

    #[cfg(test)]
    pub(crate) fn health(&self) -> f32 {
        self.health
    }

    pub(crate) fn health_percent(&self) -> f32 {
        if self.tuning.max_health <= 0.0 {
            return 0.0;
        }
        (self.health * 100.0 / self.tuning.max_health).clamp(0.0, 100.0)
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.dead
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible_remaining.is_some()
    }

    pub(crate) fn opacity(&self) -> f32 {
        self.opacity
    }

    pub(crate) fn attack(&self) -> &AttackState {
        &self.attack
    }

    /// Movement, then attack, then the invincibility countdown. A dead player
    /// neither moves nor attacks until respawned.
    pub(crate) fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut PlayerContext<'_>,
    ) -> PlayerFrame {
        self.clock_seconds += f64::from(dt_seconds);
        let mut frame = PlayerFrame {
            movement: MoveOutcome::Idle,
            attack_started: false,
            destroyed: Vec::new(),
        };

        if !self.dead {
            frame.movement = self.move_with_collision(dt_seconds, input.movement_intent(), ctx);
            if input.attack_pressed() {
                if let Some(destroyed) = self.try_attack(ctx) {
                    frame.attack_started = true;
                    frame.destroyed = destroyed;
                }
            }
        }
        self.attack.advance(dt_seconds, &self.tuning.attack);
        self.update_invincibility(dt_seconds);
        frame
    }

    pub(crate) fn move_with_collision(
        &mut self,
        dt_seconds: f32,
        intent: Vec3,
        ctx: &mut PlayerContext<'_>,
    ) -> MoveOutcome {
        if intent.x == 0.0 && intent.z == 0.0 {
            return MoveOutcome::Idle;
        }
        let Some(transform) = ctx.transforms.get(self.entity).copied() else {
            return MoveOutcome::Idle;
        };
        let current = transform.position;
        let step = intent * (self.tuning.speed * dt_seconds);
        let candidate = current + step;
        let yaw = yaw_from_direction(intent.x, intent.z);

        let outcome = self.resolve_move(current, candidate, step, intent, ctx);
        if let Some(transform) = ctx.transforms.get_mut(self.entity) {
            transform.yaw_radians = yaw;
        }
        outcome
    }

    fn resolve_move(
        &self,
        current: Vec3,
        candidate: Vec3,
        step: Vec3,
        intent: Vec3,
        ctx: &mut PlayerContext<'_>,
    ) -> MoveOutcome {
        let size = self.tuning.size;

        for body in ctx.pushables.iter_mut() {
            if !body.check_player_collision(ctx.transforms, candidate, size) {
                continue;
            }
            body.push(intent, 1.0);
            if body.is_blocked_ahead(
                ctx.collisions,
                ctx.transforms,
                intent,
                self.tuning.push_probe_distance,
            ) {
                debug!(pushable = body.owner().0, "player_push_blocked");
                return MoveOutcome::PushBlocked;
            }
        }

        let hit = ctx
            .collisions
            .check_collision_excluding(&*ctx.transforms, candidate, size, Some(self.entity));
        if !hit.is_collision() {
            ctx.transforms.set_position(self.entity, candidate);
            return MoveOutcome::Moved;
        }

        let x_only = Vec3::new(current.x + step.x, current.y, current.z);
        let x_clear = step.x != 0.0
            && !ctx
                .collisions
                .check_collision_excluding(&*ctx.transforms, x_only, size, Some(self.entity))
                .is_collision();
        let mut resolved = if x_clear { x_only } else { current };

        let z_only = Vec3::new(resolved.x, current.y, current.z + step.z);
        let z_clear = step.z != 0.0
            && !ctx
                .collisions
                .check_collision_excluding(&*ctx.transforms, z_only, size, Some(self.entity))
                .is_collision();
        if z_clear {
            resolved = z_only;
        }

        if !x_clear && !z_clear {
            debug!(blocker = ?hit.name(), "player_move_blocked");
            return MoveOutcome::Blocked;
        }
        ctx.transforms.set_position(self.entity, resolved);
        MoveOutcome::Slid {
            x: x_clear,
            z: z_clear,
        }
    }

    fn cooldown_ready(&self) -> bool {
        self.last_attack_at.map_or(true, |started| {
            self.clock_seconds - started >= f64::from(self.tuning.attack.cooldown_seconds)
        })
    }

    /// Starts a swing and resolves its hits immediately. `None` when a swing
    /// is running or the cooldown has not elapsed.
    pub(crate) fn try_attack(&mut self, ctx: &mut PlayerContext<'_>) -> Option<Vec<DestroyedProp>> {
        if self.dead || self.attack.is_attacking() || !self.cooldown_ready() {
            return None;
        }
        if !self.attack.start() {
            return None;
        }
        self.last_attack_at = Some(self.clock_seconds);

        let tuning = self.tuning.attack;
        let cone = ConeQuery::new(
            self.position(ctx.transforms),
            self.facing(ctx.transforms),
            tuning.range,
            tuning.half_angle_radians(),
        );
        let destroyed =
            ctx.destructibles
                .destroy_in_cone(&cone, ctx.collisions, ctx.transforms, ctx.particles);
        info!(hits = destroyed.len(), "player_attacked");
        Some(destroyed)
    }

    pub(crate) fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || self.is_invincible() {
            return DamageOutcome::Rejected;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.tuning.max_health);
        self.invincible_remaining = Some(self.tuning.invincibility_seconds);
        self.invincible_elapsed = 0.0;
        info!(amount, health = self.health, "player_damaged");

        if self.health <= 0.0 {
            self.dead = true;
            self.attack.reset();
            info!("player_died");
            return DamageOutcome::Killed;
        }
        DamageOutcome::Applied
    }

    /// Ignored while dead; only a respawn brings the player back.
    pub(crate) fn heal(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(self.tuning.max_health);
        self.health > before
    }

    pub(crate) fn update_invincibility(&mut self, dt_seconds: f32) {
        let Some(remaining) = self.invincible_remaining else {
            return;
        };
        let remaining = remaining - dt_seconds;
        self.invincible_elapsed += dt_seconds;
        if remaining <= 0.0 {
            self.invincible_remaining = None;
            self.invincible_elapsed = 0.0;
            self.opacity = 1.0;
            debug!("player_invincibility_ended");
            return;
        }
        self.invincible_remaining = Some(remaining);
        self.opacity =
            FLASH_BASE_OPACITY + FLASH_AMPLITUDE * (FLASH_FREQUENCY * self.invincible_elapsed).sin();
    }

    pub(crate) fn respawn(&mut self, transforms: &mut TransformStore) {
        self.health = self.tuning.max_health;
        self.dead = false;
        self.invincible_remaining = None;
        self.invincible_elapsed = 0.0;
        self.opacity = 1.0;
        self.attack.reset();
        if let Some(transform) = transforms.get_mut(self.entity) {
            transform.position = self.tuning.spawn_point;
            transform.yaw_radians = 0.0;
        }
        info!(
            x = self.tuning.spawn_point.x,
            z = self.tuning.spawn_point.z,
            "player_respawned"
        );
    }
}

#[cfg(test)]
mod tests {
    use engine::{InputAction, PushableTuning};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        collisions: CollisionSystem,
        transforms: TransformStore,
        pushables: Vec<PushableBody>,
        destructibles: DestructibleSet,
        particles: ParticleSystem,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                collisions: CollisionSystem::default(),
                transforms: TransformStore::default(),
                pushables: Vec::new(),
                destructibles: DestructibleSet::default(),
                particles: ParticleSystem::default(),
            }
        }

        fn ctx(&mut self) -> PlayerContext<'_> {
            PlayerContext {
                collisions: &mut self.collisions,
                transforms: &mut self.transforms,
                pushables: &mut self.pushables,
                destructibles: &mut self.destructibles,
                particles: &mut self.particles,
            }
        }
    }

    fn assert_vec3_close(actual: Vec3, expected: Vec3) {
        let delta = actual - expected;
        assert!(
            delta.length() < 1e-4,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn free_move_commits_full_step_and_faces_motion() {
        let mut fixture = Fixture::new();
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ground(1.0, 0.0), &mut fixture.ctx());

        assert_eq!(outcome, MoveOutcome::Moved);
        assert_vec3_close(
            player.position(&fixture.transforms),
            Vec3::ground(1.5, 0.0),
        );
        assert_vec3_close(player.facing(&fixture.transforms), Vec3::ground(1.0, 0.0));
    }

    #[test]
    fn diagonal_intent_is_not_normalized() {
        let mut fixture = Fixture::new();
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        player.move_with_collision(0.1, Vec3::ground(1.0, 1.0), &mut fixture.ctx());

        assert_vec3_close(
            player.position(&fixture.transforms),
            Vec3::ground(1.5, 1.5),
        );
    }

    #[test]
    fn zero_intent_does_not_move_or_turn() {
        let mut fixture = Fixture::new();
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ZERO, &mut fixture.ctx());

        assert_eq!(outcome, MoveOutcome::Idle);
        assert_vec3_close(player.position(&fixture.transforms), Vec3::ZERO);
        assert_vec3_close(player.facing(&fixture.transforms), Vec3::ground(0.0, 1.0));
    }

    #[test]
    fn wall_on_x_axis_slides_along_z() {
        let mut fixture = Fixture::new();
        fixture.collisions.add_boundary(
            Vec3::new(1.2, -10.0, -50.0),
            Vec3::new(3.0, 10.0, 50.0),
            "east",
        );
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ground(1.0, 1.0), &mut fixture.ctx());

        assert_eq!(outcome, MoveOutcome::Slid { x: false, z: true });
        assert_vec3_close(
            player.position(&fixture.transforms),
            Vec3::ground(0.0, 1.5),
        );
    }

    #[test]
    fn corner_slide_tests_z_from_the_resolved_x() {
        let mut fixture = Fixture::new();
        fixture.collisions.add_boundary(
            Vec3::new(1.2, -10.0, 1.2),
            Vec3::new(5.0, 10.0, 5.0),
            "corner",
        );
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ground(1.0, 1.0), &mut fixture.ctx());

        // z alone from the origin is clear, but not from x = 1.5.
        assert_eq!(outcome, MoveOutcome::Slid { x: true, z: false });
        assert_vec3_close(
            player.position(&fixture.transforms),
            Vec3::ground(1.5, 0.0),
        );
        let hit = fixture.collisions.check_collision_excluding(
            &fixture.transforms,
            player.position(&fixture.transforms),
            player.tuning().size,
            Some(player.entity()),
        );
        assert!(!hit.is_collision());
    }

    #[test]
    fn boxed_in_player_does_not_move_but_still_turns() {
        let mut fixture = Fixture::new();
        fixture.collisions.add_boundary(
            Vec3::new(1.2, -10.0, -50.0),
            Vec3::new(3.0, 10.0, 50.0),
            "east",
        );
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ground(1.0, 0.0), &mut fixture.ctx());

        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_vec3_close(player.position(&fixture.transforms), Vec3::ZERO);
        assert_vec3_close(player.facing(&fixture.transforms), Vec3::ground(1.0, 0.0));
    }

    #[test]
    fn pushable_against_wall_vetoes_the_whole_move() {
        let mut fixture = Fixture::new();
        fixture.collisions.add_boundary(
            Vec3::new(3.2, -10.0, -50.0),
            Vec3::new(5.0, 10.0, 50.0),
            "east",
        );
        let rock = fixture.transforms.spawn(Transform::at(Vec3::ground(2.1, 0.0)));
        let size = BoxSize::new(2.0, 2.0, 2.0);
        fixture.collisions.add_collider(rock, size, "rock");
        fixture
            .pushables
            .push(PushableBody::new(rock, size, 1.5, PushableTuning::default()));
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        let outcome = player.move_with_collision(0.1, Vec3::ground(1.0, 1.0), &mut fixture.ctx());

        assert_eq!(outcome, MoveOutcome::PushBlocked);
        assert_vec3_close(player.position(&fixture.transforms), Vec3::ZERO);
        assert!(fixture.pushables[0].velocity().length() > 0.0);
    }

    #[test]
    fn free_pushable_gets_shoved() {
        let mut fixture = Fixture::new();
        let rock = fixture.transforms.spawn(Transform::at(Vec3::ground(2.5, 0.0)));
        let size = BoxSize::new(2.0, 2.0, 2.0);
        fixture
            .pushables
            .push(PushableBody::new(rock, size, 1.5, PushableTuning::default()));
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());

        player.move_with_collision(0.1, Vec3::ground(1.0, 0.0), &mut fixture.ctx());

        assert!(fixture.pushables[0].velocity().x > 0.0);
        assert_vec3_close(
            player.position(&fixture.transforms),
            Vec3::ground(1.5, 0.0),
        );
    }

    #[test]
    fn damage_grants_invincibility_window() {
        let mut player = Player::spawn(&mut TransformStore::default(), PlayerTuning::default());

        assert_eq!(player.take_damage(10.0), DamageOutcome::Applied);
        assert_eq!(player.health(), 90.0);
        assert_eq!(player.take_damage(10.0), DamageOutcome::Rejected);
        assert_eq!(player.health(), 90.0);

        for _ in 0..60 {
            player.update_invincibility(DT);
        }
        assert!(player.is_invincible());
        assert!((0.4..=1.0).contains(&player.opacity()));

        for _ in 0..31 {
            player.update_invincibility(DT);
        }
        assert!(!player.is_invincible());
        assert_eq!(player.opacity(), 1.0);
        assert!(player.take_damage(10.0).applied());
        assert_eq!(player.health(), 80.0);
    }

    #[test]
    fn lethal_damage_clamps_and_blocks_further_damage_until_respawn() {
        let mut transforms = TransformStore::default();
        let mut player = Player::spawn(&mut transforms, PlayerTuning::default());
        transforms.set_position(player.entity(), Vec3::ground(30.0, 30.0));

        assert_eq!(player.take_damage(250.0), DamageOutcome::Killed);
        assert_eq!(player.health(), 0.0);
        assert!(player.is_dead());
        assert!(!player.heal(50.0));

        player.update_invincibility(10.0);
        assert_eq!(player.take_damage(1.0), DamageOutcome::Rejected);

        player.respawn(&mut transforms);
        assert!(!player.is_dead());
        assert!(!player.is_invincible());
        assert_eq!(player.health(), 100.0);
        assert_vec3_close(player.position(&transforms), Vec3::ZERO);
    }

    #[test]
    fn heal_is_capped_at_max_health() {
        let mut player = Player::spawn(&mut TransformStore::default(), PlayerTuning::default());
        player.take_damage(30.0);
        assert!(player.heal(500.0));
        assert_eq!(player.health(), 100.0);
        assert!(!player.heal(1.0));
    }

    #[test]
    fn attack_waits_for_cooldown_measured_from_start() {
        let mut fixture = Fixture::new();
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());
        let attack = InputSnapshot::empty().with_attack_pressed(true);

        assert!(player.update(DT, &attack, &mut fixture.ctx()).attack_started);
        for _ in 0..26 {
            player.update(DT, &InputSnapshot::empty(), &mut fixture.ctx());
        }
        assert!(!player.attack().is_attacking());
        assert!(!player.update(DT, &attack, &mut fixture.ctx()).attack_started);

        for _ in 0..5 {
            player.update(DT, &InputSnapshot::empty(), &mut fixture.ctx());
        }
        assert!(player.update(DT, &attack, &mut fixture.ctx()).attack_started);
    }

    #[test]
    fn held_attack_key_does_not_retrigger() {
        let mut fixture = Fixture::new();
        let mut player = Player::spawn(&mut fixture.transforms, PlayerTuning::default());
        let held = InputSnapshot::empty().with_action_down(InputAction::Attack, true);

        for _ in 0..120 {
            assert!(!player.update(DT, &held, &mut fixture.ctx()).attack_started);
        }
    }
}
