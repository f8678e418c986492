use engine::content::{AreaKind, ContentCard, PropKind};
use engine::Vec3;

/// Outbound notifications for the HUD and logs. The simulation never reads
/// these back.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiEvent {
    HealthChanged { percent: f32 },
    AreaEntered { name: String, description: String },
    AreaFaded,
    ContentShown(ContentCard),
    ContentHidden { title: String },
    TransitionEntered { name: String, kind: AreaKind },
    TransitionPrompt { name: String },
    TransitionAccepted { name: String, kind: AreaKind },
    TransitionDeclined { name: String },
    TransitionCancelled { name: String },
    PlayerDied,
    PlayerRespawned,
    DestructibleDestroyed { kind: PropKind, position: Vec3 },
}

/// Delayed work owned by the simulation's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimedEvent {
    Respawn,
    AreaFade { generation: u64 },
    AreaReset { generation: u64 },
}
