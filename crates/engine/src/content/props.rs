use serde::{Deserialize, Serialize};

use crate::physics::BoxSize;

/// Tag for every placeable prop. Simulation behavior comes from
/// [`PropKind::descriptor`]; presentation is keyed on the same tag elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    Grass,
    Crate,
    Log,
    Rock,
    Tree,
    Boulder,
    Bush,
    FlowerPatch,
    Signpost,
    Building,
    InfoFlower,
    InfoRock,
    InfoCrystal,
    Thorns,
    Spring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropRole {
    /// Breaks on a sword hit.
    Destructible,
    /// Slides when the player walks into it.
    Pushable,
    /// Shows a content card while the player is in range.
    Interactive,
    /// Hurts the player while they stand in its footprint.
    Hazard,
    /// Heals the player once each time they step in.
    Restorative,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropDescriptor {
    pub role: PropRole,
    /// Zero size means decorative only.
    pub collision_size: BoxSize,
    pub pushable_mass: Option<f32>,
    /// Added to the base radius of the single-target sword check.
    pub hit_radius_bonus: f32,
    /// Walk-through footprint that triggers a touch effect.
    pub touch_size: BoxSize,
}

impl PropDescriptor {
    const fn fixed(role: PropRole, collision_size: BoxSize) -> Self {
        Self {
            role,
            collision_size,
            pushable_mass: None,
            hit_radius_bonus: 0.0,
            touch_size: BoxSize::ZERO,
        }
    }

    const fn touch(role: PropRole, touch_size: BoxSize) -> Self {
        Self {
            touch_size,
            ..Self::fixed(role, BoxSize::ZERO)
        }
    }

    pub fn has_collision(&self) -> bool {
        !self.collision_size.is_empty()
    }
}

impl PropKind {
    pub const ALL: [PropKind; 15] = [
        PropKind::Grass,
        PropKind::Crate,
        PropKind::Log,
        PropKind::Rock,
        PropKind::Tree,
        PropKind::Boulder,
        PropKind::Bush,
        PropKind::FlowerPatch,
        PropKind::Signpost,
        PropKind::Building,
        PropKind::InfoFlower,
        PropKind::InfoRock,
        PropKind::InfoCrystal,
        PropKind::Thorns,
        PropKind::Spring,
    ];

    pub fn descriptor(self) -> PropDescriptor {
        match self {
            PropKind::Grass => PropDescriptor {
                hit_radius_bonus: 2.0,
                ..PropDescriptor::fixed(PropRole::Destructible, BoxSize::ZERO)
            },
            PropKind::Crate => PropDescriptor {
                hit_radius_bonus: 1.0,
                ..PropDescriptor::fixed(PropRole::Destructible, BoxSize::new(3.0, 3.0, 3.0))
            },
            PropKind::Log => PropDescriptor {
                pushable_mass: Some(2.0),
                ..PropDescriptor::fixed(PropRole::Pushable, BoxSize::new(4.0, 1.2, 1.2))
            },
            PropKind::Rock => PropDescriptor {
                pushable_mass: Some(1.5),
                ..PropDescriptor::fixed(PropRole::Pushable, BoxSize::new(2.0, 2.0, 2.0))
            },
            PropKind::Tree => PropDescriptor::fixed(PropRole::Static, BoxSize::new(2.0, 8.0, 2.0)),
            PropKind::Boulder => {
                PropDescriptor::fixed(PropRole::Static, BoxSize::new(4.0, 4.0, 4.0))
            }
            PropKind::Bush => PropDescriptor::fixed(PropRole::Static, BoxSize::new(2.5, 1.0, 2.5)),
            PropKind::FlowerPatch => PropDescriptor::fixed(PropRole::Static, BoxSize::ZERO),
            PropKind::Signpost => {
                PropDescriptor::fixed(PropRole::Static, BoxSize::new(2.0, 8.0, 2.0))
            }
            PropKind::Building => {
                PropDescriptor::fixed(PropRole::Static, BoxSize::new(8.0, 12.0, 8.0))
            }
            PropKind::InfoFlower | PropKind::InfoRock | PropKind::InfoCrystal => {
                PropDescriptor::fixed(PropRole::Interactive, BoxSize::ZERO)
            }
            PropKind::Thorns => {
                PropDescriptor::touch(PropRole::Hazard, BoxSize::new(3.0, 1.0, 3.0))
            }
            PropKind::Spring => {
                PropDescriptor::touch(PropRole::Restorative, BoxSize::new(3.0, 1.0, 3.0))
            }
        }
    }

    pub fn role(self) -> PropRole {
        self.descriptor().role
    }

    pub fn name(self) -> &'static str {
        match self {
            PropKind::Grass => "grass",
            PropKind::Crate => "crate",
            PropKind::Log => "log",
            PropKind::Rock => "rock",
            PropKind::Tree => "tree",
            PropKind::Boulder => "boulder",
            PropKind::Bush => "bush",
            PropKind::FlowerPatch => "flower_patch",
            PropKind::Signpost => "signpost",
            PropKind::Building => "building",
            PropKind::InfoFlower => "info_flower",
            PropKind::InfoRock => "info_rock",
            PropKind::InfoCrystal => "info_crystal",
            PropKind::Thorns => "thorns",
            PropKind::Spring => "spring",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushables_carry_mass_and_nothing_else_does() {
        for kind in PropKind::ALL {
            let descriptor = kind.descriptor();
            assert_eq!(
                descriptor.pushable_mass.is_some(),
                descriptor.role == PropRole::Pushable,
                "{kind:?}"
            );
            if let Some(mass) = descriptor.pushable_mass {
                assert!(mass > 0.0);
            }
        }
    }

    #[test]
    fn hit_bonus_only_on_destructibles() {
        for kind in PropKind::ALL {
            let descriptor = kind.descriptor();
            if descriptor.role != PropRole::Destructible {
                assert_eq!(descriptor.hit_radius_bonus, 0.0, "{kind:?}");
            }
        }
        assert_eq!(PropKind::Grass.descriptor().hit_radius_bonus, 2.0);
        assert_eq!(PropKind::Crate.descriptor().hit_radius_bonus, 1.0);
    }

    #[test]
    fn decorative_props_do_not_collide() {
        assert!(!PropKind::Grass.descriptor().has_collision());
        assert!(!PropKind::FlowerPatch.descriptor().has_collision());
        assert!(!PropKind::InfoCrystal.descriptor().has_collision());
        assert!(PropKind::Crate.descriptor().has_collision());
        assert!(PropKind::Tree.descriptor().has_collision());
    }

    #[test]
    fn only_touch_props_have_a_footprint_and_none_of_them_block() {
        for kind in PropKind::ALL {
            let descriptor = kind.descriptor();
            let touches = matches!(descriptor.role, PropRole::Hazard | PropRole::Restorative);
            assert_eq!(!descriptor.touch_size.is_empty(), touches, "{kind:?}");
            if touches {
                assert!(!descriptor.has_collision(), "{kind:?}");
            }
        }
        assert_eq!(PropKind::Thorns.role(), PropRole::Hazard);
        assert_eq!(PropKind::Spring.role(), PropRole::Restorative);
    }

    #[test]
    fn serde_names_match_display_names() {
        for kind in PropKind::ALL {
            let encoded = serde_json::to_string(&kind).expect("encode");
            assert_eq!(encoded, format!("\"{}\"", kind.name()));
        }
    }
}
