//! Projects the world into the renderer's scene.

use std::time::Duration;

use simon_core::Phase;
use simon_rendering::{Banner, Scene};
use simon_world::{query, World};

/// Refreshes `scene` from the world after a frame has been simulated.
pub(crate) fn populate(scene: &mut Scene, world: &World, dt: Duration) {
    scene.visuals.update(query::lit_buttons(world), dt);
    scene.score = query::score(world);
    scene.best_score = query::best_score(world);
    scene.banner = banner(world);
}

fn banner(world: &World) -> Option<Banner> {
    match query::phase(world) {
        Phase::Menu => Some(Banner::Start),
        Phase::MenuGameOver => Some(Banner::GameOver {
            score: query::last_score(world),
        }),
        Phase::Game | Phase::Waiting(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simon_core::{ButtonId, Command};
    use simon_world as world;

    #[test]
    fn menu_shows_start_banner() {
        let world = World::with_seed(1);
        let mut scene = Scene::default();
        scene.banner = None;
        populate(&mut scene, &world, Duration::from_millis(16));
        assert_eq!(scene.banner, Some(Banner::Start));
    }

    #[test]
    fn game_over_banner_carries_last_score() {
        let mut world = World::with_seed(2);
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartRun, &mut events);
        world::apply(&mut world, Command::FinishPlayback, &mut events);
        world::apply(&mut world, Command::CompleteRound, &mut events);
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        world::apply(&mut world, Command::FinishPlayback, &mut events);
        let expected = query::sequence(&world)[0];
        let wrong = ButtonId::ALL[(expected.index() + 1) % ButtonId::ALL.len()];
        world::apply(&mut world, Command::FailRun { pressed: wrong }, &mut events);

        let mut scene = Scene::default();
        populate(&mut scene, &world, Duration::from_millis(16));
        assert_eq!(scene.banner, None, "no banner while blinking");
        assert_eq!(scene.score, 0);
        assert_eq!(scene.best_score, 1);

        world::apply(&mut world, Command::FinishLoseAnimation, &mut events);
        populate(&mut scene, &world, Duration::from_millis(16));
        assert_eq!(scene.banner, Some(Banner::GameOver { score: 1 }));
    }
}
