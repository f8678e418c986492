mod combat;
mod destructible;
mod events;
mod particles;
mod player;
mod scene_impl;
mod simulation;
mod timers;
mod visuals;
mod world;

use engine::content::WorldLayout;
use engine::Scene;

pub(crate) fn build_scene(layout: WorldLayout) -> Box<dyn Scene> {
    Box::new(scene_impl::CrossroadsScene::new(layout))
}

#[cfg(test)]
mod tests;
