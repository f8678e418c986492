use std::f32::consts::PI;

use engine::Vec3;
use tracing::debug;

/// Slack on the cone edge so a target at exactly the half-angle counts as hit
/// despite float error in `acos`.
const CONE_EDGE_EPSILON_RADIANS: f32 = 1e-4;
const WEAPON_ARC_RADIUS: f32 = 1.5;
const WEAPON_ARC_DEGREES: f32 = 120.0;
const WEAPON_HEIGHT: f32 = 1.5;
const WEAPON_REST_OFFSET: Vec3 = Vec3::new(1.2, WEAPON_HEIGHT, 0.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AttackTuning {
    /// Measured start to start, independent of the animation length.
    pub(crate) cooldown_seconds: f32,
    pub(crate) duration_seconds: f32,
    pub(crate) range: f32,
    pub(crate) cone_degrees: f32,
    pub(crate) swing_start_fraction: f32,
    pub(crate) return_start_fraction: f32,
}

impl Default for AttackTuning {
    fn default() -> Self {
        Self {
            cooldown_seconds: 0.5,
            duration_seconds: 0.4,
            range: 6.0,
            cone_degrees: 60.0,
            swing_start_fraction: 0.3,
            return_start_fraction: 0.8,
        }
    }
}

impl AttackTuning {
    pub(crate) fn half_angle_radians(&self) -> f32 {
        (self.cone_degrees * 0.5).to_radians()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum AttackPhase {
    #[default]
    Idle,
    Drawing,
    Swinging,
    Returning,
}

impl AttackPhase {
    fn next(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Drawing => Self::Swinging,
            Self::Swinging => Self::Returning,
            Self::Returning => Self::Idle,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Drawing => "drawing",
            Self::Swinging => "swinging",
            Self::Returning => "returning",
        }
    }
}

/// Cosmetic sword placement relative to the player, in the player's local
/// frame (x right, z forward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeaponPose {
    pub(crate) offset: Vec3,
    pub(crate) glowing: bool,
}

/// Melee swing timing. Damage is resolved by the caller when
/// [`AttackState::start`] succeeds; the phases only drive presentation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct AttackState {
    phase: AttackPhase,
    elapsed_seconds: f32,
}

impl AttackState {
    #[cfg(test)]
    pub(crate) fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub(crate) fn is_attacking(&self) -> bool {
        self.phase != AttackPhase::Idle
    }

    /// Returns false without touching state if a swing is already running.
    pub(crate) fn start(&mut self) -> bool {
        if self.is_attacking() {
            return false;
        }
        self.phase = AttackPhase::Drawing;
        self.elapsed_seconds = 0.0;
        true
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Steps through each phase boundary crossed by `dt_seconds` in order.
    pub(crate) fn advance(&mut self, dt_seconds: f32, tuning: &AttackTuning) {
        if !self.is_attacking() {
            return;
        }
        self.elapsed_seconds += dt_seconds;
        let progress = self.progress(tuning);
        loop {
            let boundary = match self.phase {
                AttackPhase::Idle => break,
                AttackPhase::Drawing => tuning.swing_start_fraction,
                AttackPhase::Swinging => tuning.return_start_fraction,
                AttackPhase::Returning => 1.0,
            };
            if progress < boundary {
                break;
            }
            let next = self.phase.next();
            debug!(from = self.phase.name(), to = next.name(), "attack_phase_changed");
            self.phase = next;
        }
        if self.phase == AttackPhase::Idle {
            self.elapsed_seconds = 0.0;
        }
    }

    fn progress(&self, tuning: &AttackTuning) -> f32 {
        if tuning.duration_seconds <= 0.0 {
            return 1.0;
        }
        self.elapsed_seconds / tuning.duration_seconds
    }

    pub(crate) fn weapon_pose(&self, tuning: &AttackTuning) -> WeaponPose {
        let progress = self.progress(tuning).clamp(0.0, 1.0);
        let half_arc = (WEAPON_ARC_DEGREES * 0.5).to_radians();
        let arc_point = |angle: f32| {
            Vec3::new(
                WEAPON_ARC_RADIUS * angle.sin(),
                WEAPON_HEIGHT,
                WEAPON_ARC_RADIUS * angle.cos(),
            )
        };
        let span = |start: f32, end: f32| {
            if end <= start {
                1.0
            } else {
                ((progress - start) / (end - start)).clamp(0.0, 1.0)
            }
        };

        match self.phase {
            AttackPhase::Idle => WeaponPose {
                offset: WEAPON_REST_OFFSET,
                glowing: false,
            },
            AttackPhase::Drawing => WeaponPose {
                offset: WEAPON_REST_OFFSET
                    .lerp(arc_point(half_arc), span(0.0, tuning.swing_start_fraction)),
                glowing: false,
            },
            AttackPhase::Swinging => {
                let t = span(tuning.swing_start_fraction, tuning.return_start_fraction);
                WeaponPose {
                    offset: arc_point(half_arc - t * 2.0 * half_arc),
                    glowing: true,
                }
            }
            AttackPhase::Returning => WeaponPose {
                offset: arc_point(-half_arc)
                    .lerp(WEAPON_REST_OFFSET, span(tuning.return_start_fraction, 1.0)),
                glowing: false,
            },
        }
    }
}

/// Ground-plane wedge in front of an attacker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConeQuery {
    origin: Vec3,
    facing: Vec3,
    range: f32,
    half_angle_radians: f32,
}

impl ConeQuery {
    pub(crate) fn new(origin: Vec3, facing: Vec3, range: f32, half_angle_radians: f32) -> Self {
        Self {
            origin,
            facing: facing.flattened().normalized(),
            range,
            half_angle_radians: half_angle_radians.clamp(0.0, PI),
        }
    }

    /// Range is inclusive and so is the cone edge. A target sitting exactly on
    /// the origin has no direction and is never hit.
    pub(crate) fn contains(&self, target: Vec3) -> bool {
        let to_target = (target - self.origin).flattened();
        let distance = to_target.length();
        if distance > self.range {
            return false;
        }
        let cos_angle = to_target.normalized().dot(self.facing).clamp(-1.0, 1.0);
        cos_angle.acos() <= self.half_angle_radians + CONE_EDGE_EPSILON_RADIANS
    }
}
