use engine::content::{AreaKind, WorldLayout};
use engine::{InputSnapshot, PushableTuning, Scene, SceneCommand, SceneWorld};
use tracing::info;

use super::events::UiEvent;
use super::player::PlayerTuning;
use super::simulation::Simulation;
use super::visuals::{area_color, build_draw_list};

/// The crossroads world as a loop-driven scene. Reloading rebuilds the
/// simulation from the layout it was created with.
pub(crate) struct CrossroadsScene {
    layout: WorldLayout,
    player_tuning: PlayerTuning,
    pushable_tuning: PushableTuning,
    simulation: Option<Simulation>,
    current_area: Option<(String, AreaKind)>,
}

impl CrossroadsScene {
    pub(crate) fn new(layout: WorldLayout) -> Self {
        Self {
            layout,
            player_tuning: PlayerTuning::default(),
            pushable_tuning: PushableTuning::default(),
            simulation: None,
            current_area: None,
        }
    }

    fn area_kind(&self, name: &str) -> AreaKind {
        self.layout
            .zones
            .iter()
            .find(|zone| zone.name == name)
            .map_or(AreaKind::Hub, |zone| zone.kind)
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::AreaEntered { name, description } => {
                info!(area = %name, description = %description, "area_banner_shown");
                let kind = self.area_kind(&name);
                self.current_area = Some((name, kind));
            }
            UiEvent::ContentShown(card) => {
                info!(
                    title = %card.title,
                    description = %card.description,
                    details = %card.details,
                    "content_card_shown"
                );
            }
            UiEvent::ContentHidden { title } => info!(title = %title, "content_card_hidden"),
            UiEvent::PlayerDied => info!("hud_player_died"),
            UiEvent::TransitionPrompt { name } => {
                info!(transition = %name, "confirm_with_attack_or_decline_with_menu");
            }
            UiEvent::HealthChanged { .. }
            | UiEvent::AreaFaded
            | UiEvent::TransitionEntered { .. }
            | UiEvent::TransitionAccepted { .. }
            | UiEvent::TransitionDeclined { .. }
            | UiEvent::TransitionCancelled { .. }
            | UiEvent::PlayerRespawned
            | UiEvent::DestructibleDestroyed { .. } => {}
        }
    }
}

impl Scene for CrossroadsScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let simulation = Simulation::new(&self.layout, self.player_tuning, self.pushable_tuning);
        world.camera_mut().follow(simulation.player_position());
        self.simulation = Some(simulation);
        self.current_area = None;
        info!("scene_loaded");
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(simulation) = self.simulation.as_mut() else {
            return SceneCommand::None;
        };

        let prompt_was_open = simulation.has_pending_confirmation();
        simulation.step(fixed_dt_seconds, input);
        let events = simulation.drain_events();
        let accepted = simulation.take_accepted_transition();

        let camera = world.camera_mut();
        camera.follow(simulation.player_position());
        camera.apply_zoom_steps(input.zoom_delta_steps());

        for event in events {
            self.apply_event(event);
        }

        if let Some(kind) = accepted {
            info!(kind = ?kind, "world_transition_reload");
            return SceneCommand::Reload;
        }
        if input.menu_pressed() && !prompt_was_open {
            return SceneCommand::Pause;
        }
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        let Some(simulation) = self.simulation.as_ref() else {
            return;
        };
        build_draw_list(simulation, world);

        let banner_kind = simulation.area_banner().and_then(|banner| {
            self.current_area
                .as_ref()
                .filter(|(name, _)| name == banner)
                .map(|(_, kind)| *kind)
        });
        let hud = world.hud_mut();
        hud.health_fraction = simulation.player().health_percent() / 100.0;
        hud.banner_color = banner_kind.map(area_color);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.simulation = None;
        info!("scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let simulation = self.simulation.as_ref()?;
        let mut title = self
            .current_area
            .as_ref()
            .map_or_else(|| "Wilderness".to_string(), |(name, _)| name.clone());
        let world = simulation.world();
        if let Some(element) = world.interactives().iter().find(|element| element.is_active()) {
            title.push_str(" - ");
            title.push_str(&element.content().title);
        }
        title.push_str(&format!(
            " | props {}/{}",
            world.destructibles().active_count(),
            world.destructibles().len()
        ));
        if simulation.respawn_pending() {
            title.push_str(" (respawning)");
        }
        Some(title)
    }
}
