mod layout;
mod props;

pub use layout::{
    load_layout_file, parse_layout, AreaKind, ArenaSpec, BoundaryDef, ContentCard, GroundPoint,
    LayoutError, PropPlacement, ResolvedProp, ScatterGroup, TransitionDef, WorldLayout, ZoneDef,
};
pub use props::{PropDescriptor, PropKind, PropRole};
