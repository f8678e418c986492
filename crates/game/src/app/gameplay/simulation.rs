use engine::content::{AreaKind, WorldLayout};
use engine::{Aabb, CollisionSystem, InputSnapshot, PushableTuning, TransformStore, Vec3};
use tracing::{debug, info, trace, warn};

use super::events::{TimedEvent, UiEvent};
use super::particles::ParticleSystem;
use super::player::{DamageOutcome, Player, PlayerContext, PlayerFrame, PlayerTuning};
use super::timers::{TimerId, TimerQueue};
use super::world::{AreaNotifier, TouchEffect, TransitionTracker, World};

const HAZARD_DAMAGE: f32 = 10.0;
const SPRING_HEAL: f32 = 25.0;

/// The whole simulation of one loaded world. Nothing here is global; a
/// reload drops this and builds a fresh one.
#[derive(Debug)]
pub(crate) struct Simulation {
    collisions: CollisionSystem,
    transforms: TransformStore,
    player: Player,
    world: World,
    timers: TimerQueue<TimedEvent>,
    particles: ParticleSystem,
    notifier: AreaNotifier,
    transitions: TransitionTracker,
    pending_respawn: Option<TimerId>,
    /// Springs heal once per visit.
    in_spring: bool,
    accepted_transition: Option<AreaKind>,
    events: Vec<UiEvent>,
}

impl Simulation {
    pub(crate) fn new(
        layout: &WorldLayout,
        player_tuning: PlayerTuning,
        pushable_tuning: PushableTuning,
    ) -> Self {
        let mut collisions = CollisionSystem::default();
        let mut transforms = TransformStore::default();
        let world = World::build(layout, &mut collisions, &mut transforms, pushable_tuning);
        let player = Player::spawn(&mut transforms, player_tuning);

        let spawn = player_tuning.spawn_point;
        let blocker = collisions.check_collision_excluding(
            &transforms,
            spawn,
            player_tuning.size,
            Some(player.entity()),
        );
        if let Some(name) = blocker.name() {
            warn!(blocker = name, x = spawn.x, z = spawn.z, "spawn_point_obstructed");
        }

        let mut simulation = Self {
            collisions,
            transforms,
            player,
            world,
            timers: TimerQueue::default(),
            particles: ParticleSystem::default(),
            notifier: AreaNotifier::default(),
            transitions: TransitionTracker::default(),
            pending_respawn: None,
            in_spring: false,
            accepted_transition: None,
            events: Vec::new(),
        };
        simulation.events.push(UiEvent::HealthChanged {
            percent: simulation.player.health_percent(),
        });
        simulation
    }

    /// One fixed tick: pending confirmation, player, touch props, pushables,
    /// interactive proximity, particles, timers, area banner, transitions.
    pub(crate) fn step(&mut self, dt_seconds: f32, input: &InputSnapshot) {
        let mut attack_consumed = false;
        if self.transitions.has_pending_confirmation() {
            if let Some(event) = self.transitions.resolve(
                &self.world,
                input.attack_pressed(),
                input.menu_pressed(),
            ) {
                attack_consumed = input.attack_pressed();
                if let UiEvent::TransitionAccepted { kind, .. } = &event {
                    self.accepted_transition = Some(*kind);
                }
                self.events.push(event);
            }
        }

        let player_input = if attack_consumed {
            input.with_attack_pressed(false)
        } else {
            *input
        };
        let frame = self.update_player(dt_seconds, &player_input);
        trace!(
            movement = ?frame.movement,
            attack_started = frame.attack_started,
            hits = frame.destroyed.len(),
            "player_frame"
        );
        for prop in frame.destroyed {
            self.events.push(UiEvent::DestructibleDestroyed {
                kind: prop.kind,
                position: prop.position,
            });
        }
        self.apply_touch_props();

        for body in self.world.pushables_mut() {
            body.update(dt_seconds, &self.collisions, &mut self.transforms);
        }

        let position = self.player_position();
        let shown = self.world.update_interactives(&self.transforms, position);
        self.events.extend(shown);

        self.particles.update(dt_seconds);

        for event in self.timers.advance(dt_seconds) {
            self.handle_timer(event);
        }

        let zone = self.world.current_zone(position);
        if let Some(event) = self.notifier.observe(zone, &mut self.timers) {
            self.events.push(event);
        }

        let crossings = self.transitions.observe(&self.world, position);
        self.events.extend(crossings);
    }

    fn update_player(&mut self, dt_seconds: f32, input: &InputSnapshot) -> PlayerFrame {
        let (pushables, destructibles) = self.world.actors_mut();
        let mut ctx = PlayerContext {
            collisions: &mut self.collisions,
            transforms: &mut self.transforms,
            pushables,
            destructibles,
            particles: &mut self.particles,
        };
        self.player.update(dt_seconds, input, &mut ctx)
    }

    /// Hazards hurt on every tick of overlap, gated by invincibility.
    fn apply_touch_props(&mut self) {
        if self.player.is_dead() {
            self.in_spring = false;
            return;
        }
        let footprint =
            Aabb::from_center_size(self.player_position(), self.player.tuning().size);
        if self.world.touching(&self.transforms, &footprint, TouchEffect::Hurt)
            && self.damage_player(HAZARD_DAMAGE)
        {
            debug!(amount = HAZARD_DAMAGE, "hazard_hit");
        }
        let in_spring = self.world.touching(&self.transforms, &footprint, TouchEffect::Heal);
        if in_spring && !self.in_spring && self.heal_player(SPRING_HEAL) {
            debug!(amount = SPRING_HEAL, "spring_healed");
        }
        self.in_spring = in_spring;
    }

    fn handle_timer(&mut self, event: TimedEvent) {
        match event {
            TimedEvent::Respawn => {
                self.pending_respawn = None;
                self.player.respawn(&mut self.transforms);
                self.events.push(UiEvent::PlayerRespawned);
                self.events.push(UiEvent::HealthChanged {
                    percent: self.player.health_percent(),
                });
            }
            TimedEvent::AreaFade { .. } | TimedEvent::AreaReset { .. } => {
                if let Some(ui) = self.notifier.on_timer(event, &mut self.timers) {
                    self.events.push(ui);
                }
            }
        }
    }

    /// Applies damage from outside the player. Returns false while
    /// invincible or dead.
    pub(crate) fn damage_player(&mut self, amount: f32) -> bool {
        let outcome = self.player.take_damage(amount);
        if !outcome.applied() {
            return false;
        }
        self.events.push(UiEvent::HealthChanged {
            percent: self.player.health_percent(),
        });
        if outcome == DamageOutcome::Killed {
            if let Some(stale) = self.pending_respawn.take() {
                self.timers.cancel(stale);
            }
            let delay = self.player.tuning().respawn_delay_seconds;
            self.pending_respawn = Some(self.timers.schedule(delay, TimedEvent::Respawn));
            self.events.push(UiEvent::PlayerDied);
            info!(respawn_in = delay, "player_respawn_scheduled");
        }
        true
    }

    pub(crate) fn heal_player(&mut self, amount: f32) -> bool {
        if !self.player.heal(amount) {
            return false;
        }
        self.events.push(UiEvent::HealthChanged {
            percent: self.player.health_percent(),
        });
        true
    }

    pub(crate) fn respawn_pending(&self) -> bool {
        self.pending_respawn
            .is_some_and(|id| self.timers.is_pending(id))
    }

    pub(crate) fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Set once a confirmed transition has been accepted; the owner decides
    /// how to leave the current world.
    pub(crate) fn take_accepted_transition(&mut self) -> Option<AreaKind> {
        self.accepted_transition.take()
    }

    pub(crate) fn has_pending_confirmation(&self) -> bool {
        self.transitions.has_pending_confirmation()
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn player_position(&self) -> Vec3 {
        self.player.position(&self.transforms)
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn collisions(&self) -> &CollisionSystem {
        &self.collisions
    }

    pub(crate) fn transforms(&self) -> &TransformStore {
        &self.transforms
    }

    pub(crate) fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub(crate) fn area_banner(&self) -> Option<&str> {
        self.notifier.banner()
    }

    #[cfg(test)]
    pub(crate) fn transforms_mut(&mut self) -> &mut TransformStore {
        &mut self.transforms
    }
}
