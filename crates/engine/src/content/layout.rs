//! World composition: walls, zones, transitions and prop placements loaded from JSON.

use std::f32::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::physics::{SimpleRng, Vec3};

use super::props::{PropKind, PropRole};

const DEFAULT_SCATTER_SEED: u64 = 0x5eed_c0de;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read world layout {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world layout {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid world layout {path}: {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Hub,
    About,
    Experience,
    Projects,
    Danger,
}

impl AreaKind {
    /// Entering a transition of this kind asks the player before leaving.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, AreaKind::Danger)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    pub x: f32,
    pub z: f32,
}

impl GroundPoint {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::ground(self.x, self.z)
    }
}

/// Square arena centered on the origin, fenced by four walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaSpec {
    pub half_size: f32,
    pub wall_thickness: f32,
    pub wall_height: f32,
}

impl ArenaSpec {
    /// `(name, min, max)` for the west, east, south and north walls.
    pub fn walls(&self) -> [(&'static str, Vec3, Vec3); 4] {
        let s = self.half_size;
        let t = self.wall_thickness;
        let h = self.wall_height;
        [
            ("west-wall", Vec3::new(-s, 0.0, -s), Vec3::new(-s + t, h, s)),
            ("east-wall", Vec3::new(s - t, 0.0, -s), Vec3::new(s, h, s)),
            ("south-wall", Vec3::new(-s, 0.0, -s), Vec3::new(s, h, -s + t)),
            ("north-wall", Vec3::new(-s, 0.0, s - t), Vec3::new(s, h, s)),
        ]
    }
}

/// Extra static no-go region given by corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryDef {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneDef {
    pub name: String,
    pub kind: AreaKind,
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionDef {
    pub name: String,
    pub kind: AreaKind,
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentCard {
    pub title: String,
    pub description: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropPlacement {
    pub kind: PropKind,
    pub x: f32,
    pub z: f32,
    /// Skip this prop when it lands closer than this to any clear point.
    #[serde(default)]
    pub clearance: Option<f32>,
    #[serde(default)]
    pub content: Option<ContentCard>,
}

/// `count` props of one kind dropped uniformly by angle and distance inside a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScatterGroup {
    pub kind: PropKind,
    pub x: f32,
    pub z: f32,
    pub radius: f32,
    pub count: u32,
    #[serde(default)]
    pub clearance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldLayout {
    pub arena: ArenaSpec,
    #[serde(default)]
    pub boundaries: Vec<BoundaryDef>,
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
    /// Points props keep away from, such as signposts.
    #[serde(default)]
    pub clear_points: Vec<GroundPoint>,
    #[serde(default)]
    pub props: Vec<PropPlacement>,
    #[serde(default)]
    pub scatter: Vec<ScatterGroup>,
    #[serde(default = "default_scatter_seed")]
    pub scatter_seed: u64,
}

fn default_scatter_seed() -> u64 {
    DEFAULT_SCATTER_SEED
}

/// A prop with its final position, ready to be spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProp {
    pub kind: PropKind,
    pub position: Vec3,
    pub content: Option<ContentCard>,
}

impl WorldLayout {
    pub fn is_position_clear(&self, position: Vec3, min_distance: f32) -> bool {
        self.clear_points
            .iter()
            .all(|point| point.to_vec3().ground_distance(position) >= min_distance)
    }

    /// Fixed placements first, in file order, then scatter groups. Anything
    /// that lands inside a clearance radius is dropped.
    pub fn resolve_props(&self) -> Vec<ResolvedProp> {
        let mut resolved = Vec::with_capacity(self.props.len());
        let mut skipped = 0usize;

        for placement in &self.props {
            let position = Vec3::ground(placement.x, placement.z);
            let clearance = placement.clearance.unwrap_or(0.0);
            if !self.is_position_clear(position, clearance) {
                skipped += 1;
                continue;
            }
            resolved.push(ResolvedProp {
                kind: placement.kind,
                position,
                content: placement.content.clone(),
            });
        }

        let mut rng = SimpleRng::new(self.scatter_seed);
        for group in &self.scatter {
            for _ in 0..group.count {
                let angle = rng.next_f32() * TAU;
                let distance = rng.next_f32() * group.radius;
                let position = Vec3::ground(
                    group.x + angle.cos() * distance,
                    group.z + angle.sin() * distance,
                );
                if !self.is_position_clear(position, group.clearance) {
                    skipped += 1;
                    continue;
                }
                resolved.push(ResolvedProp {
                    kind: group.kind,
                    position,
                    content: None,
                });
            }
        }

        debug!(
            placed = resolved.len(),
            skipped, "layout_props_resolved"
        );
        resolved
    }

    pub fn validate(&self, origin: &Path) -> Result<(), LayoutError> {
        let invalid = |field: String, message: &str| LayoutError::Invalid {
            path: origin.to_path_buf(),
            field,
            message: message.to_string(),
        };

        let arena = &self.arena;
        if !(arena.half_size.is_finite() && arena.half_size > 0.0) {
            return Err(invalid("arena.half_size".into(), "must be positive"));
        }
        if !(arena.wall_thickness > 0.0 && arena.wall_thickness < arena.half_size) {
            return Err(invalid(
                "arena.wall_thickness".into(),
                "must be positive and smaller than half_size",
            ));
        }
        if !(arena.wall_height.is_finite() && arena.wall_height > 0.0) {
            return Err(invalid("arena.wall_height".into(), "must be positive"));
        }

        for (index, boundary) in self.boundaries.iter().enumerate() {
            let field = |name: &str| format!("boundaries[{index}].{name}");
            if boundary.name.trim().is_empty() {
                return Err(invalid(field("name"), "must not be empty"));
            }
            if !(boundary.min.is_finite() && boundary.max.is_finite()) {
                return Err(invalid(field("min"), "corners must be finite"));
            }
            if boundary.min.x > boundary.max.x
                || boundary.min.y > boundary.max.y
                || boundary.min.z > boundary.max.z
            {
                return Err(invalid(field("max"), "corners are inverted"));
            }
        }

        if self.zones.is_empty() {
            return Err(invalid("zones".into(), "at least one zone is required"));
        }
        for (index, zone) in self.zones.iter().enumerate() {
            let field = |name: &str| format!("zones[{index}].{name}");
            if zone.name.trim().is_empty() {
                return Err(invalid(field("name"), "must not be empty"));
            }
            if !(zone.x.is_finite() && zone.z.is_finite()) {
                return Err(invalid(field("x"), "center must be finite"));
            }
            if !(zone.radius.is_finite() && zone.radius > 0.0) {
                return Err(invalid(field("radius"), "must be positive"));
            }
        }

        for (index, transition) in self.transitions.iter().enumerate() {
            let field = |name: &str| format!("transitions[{index}].{name}");
            if transition.name.trim().is_empty() {
                return Err(invalid(field("name"), "must not be empty"));
            }
            if !(transition.x.is_finite() && transition.z.is_finite()) {
                return Err(invalid(field("x"), "center must be finite"));
            }
            if !(transition.width >= 0.0 && transition.depth >= 0.0) {
                return Err(invalid(field("width"), "size must be non-negative"));
            }
        }

        for (index, point) in self.clear_points.iter().enumerate() {
            if !(point.x.is_finite() && point.z.is_finite()) {
                return Err(invalid(format!("clear_points[{index}]"), "must be finite"));
            }
        }

        for (index, prop) in self.props.iter().enumerate() {
            let field = |name: &str| format!("props[{index}].{name}");
            if !(prop.x.is_finite() && prop.z.is_finite()) {
                return Err(invalid(field("x"), "position must be finite"));
            }
            if prop.clearance.is_some_and(|clearance| clearance < 0.0) {
                return Err(invalid(field("clearance"), "must be non-negative"));
            }
            let interactive = prop.kind.role() == PropRole::Interactive;
            match (&prop.content, interactive) {
                (Some(_), false) => {
                    return Err(invalid(
                        field("content"),
                        "only interactive props carry content",
                    ))
                }
                (None, true) => {
                    return Err(invalid(field("content"), "interactive props need content"))
                }
                _ => {}
            }
        }

        for (index, group) in self.scatter.iter().enumerate() {
            let field = |name: &str| format!("scatter[{index}].{name}");
            if group.kind.role() == PropRole::Interactive {
                return Err(invalid(field("kind"), "interactive props cannot be scattered"));
            }
            if !(group.x.is_finite() && group.z.is_finite()) {
                return Err(invalid(field("x"), "center must be finite"));
            }
            if !(group.radius.is_finite() && group.radius >= 0.0) {
                return Err(invalid(field("radius"), "must be non-negative"));
            }
            if !(group.clearance >= 0.0) {
                return Err(invalid(field("clearance"), "must be non-negative"));
            }
        }

        Ok(())
    }
}

pub fn parse_layout(raw: &str, origin: &Path) -> Result<WorldLayout, LayoutError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let layout: WorldLayout =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            LayoutError::Parse {
                path: origin.to_path_buf(),
                json_path,
                source: error.into_inner(),
            }
        })?;
    layout.validate(origin)?;
    Ok(layout)
}

pub fn load_layout_file(path: &Path) -> Result<WorldLayout, LayoutError> {
    let raw = fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = parse_layout(&raw, path)?;
    info!(
        path = %path.display(),
        zones = layout.zones.len(),
        transitions = layout.transitions.len(),
        props = layout.props.len(),
        scatter_groups = layout.scatter.len(),
        "world_layout_loaded"
    );
    Ok(layout)
}
