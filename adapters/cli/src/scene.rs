use anyhow::{Context, Result};
use grid_sim_core::{InputEvent, SimConfig};
use grid_sim_rendering::{
    Color, FrameInput, FrameTime, GridPresentation, GridScene, Scene, SceneEntity, ScenePlan,
    WaypointScene,
};
use grid_sim_system_controller::Controller;
use grid_sim_system_waypoint::WaypointFollower;
use grid_sim_world::{query, World};

/// Window size of the waypoint demo.
pub(crate) const WAYPOINT_WINDOW: (u32, u32) = (1000, 600);

const GRID_LINE_COLOR: Color = Color::from_rgb_u8(50, 50, 50);
const FOLLOWER_COLOR: Color = Color::from_rgb_u8(230, 120, 40);
const FOLLOWER_RADIUS: f32 = 12.0;

/// Grid planning demo: the world plus its phase controller.
#[derive(Debug)]
pub(crate) struct GridDemo {
    world: World,
    controller: Controller,
    presentation: GridPresentation,
}

impl GridDemo {
    pub(crate) fn new(config: &SimConfig) -> Result<Self> {
        let world = World::new(config).context("failed to build the grid world")?;
        Self::from_world(world, Controller::new(config.step_interval()))
    }

    fn from_world(world: World, controller: Controller) -> Result<Self> {
        let size = query::grid_size(&world);
        let presentation = GridPresentation::new(
            size.columns(),
            size.rows(),
            world.cell_size() as f32,
            GRID_LINE_COLOR,
        )?;
        Ok(Self {
            world,
            controller,
            presentation,
        })
    }

    /// Applies the frame's input and playback, then refreshes the scene.
    pub(crate) fn frame(&mut self, time: FrameTime, input: &FrameInput, scene: &mut Scene) {
        self.controller
            .frame(&mut self.world, &input.events, time.elapsed);
        *scene = Scene::Grid(self.scene());
    }

    pub(crate) fn scene(&self) -> GridScene {
        let mut scene = GridScene::new(self.presentation);
        scene.entities = query::entity_view(&self.world)
            .iter()
            .map(|entity| SceneEntity::new(entity.cell, entity.color.into(), entity.selected))
            .collect();
        scene.plans = query::plan_view(&self.world)
            .into_iter()
            .map(|plan| ScenePlan::new(plan.color.into(), plan.planned_cells, plan.playback_index))
            .collect();
        scene.phase = self.controller.phase();
        scene.paused = self.controller.is_paused();
        scene
    }
}

/// Continuous waypoint demo.
#[derive(Debug, Default)]
pub(crate) struct WaypointDemo {
    follower: WaypointFollower,
}

impl WaypointDemo {
    /// Applies pause and reset keys, then advances the follower by the frame delta.
    pub(crate) fn frame(&mut self, time: FrameTime, input: &FrameInput, scene: &mut Scene) {
        for event in &input.events {
            match event {
                InputEvent::TogglePause => self.follower.toggle_pause(),
                InputEvent::Reset => self.follower.reset(),
                _ => {}
            }
        }
        self.follower.update(time.delta);
        *scene = Scene::Waypoint(self.scene());
    }

    pub(crate) fn scene(&self) -> WaypointScene {
        WaypointScene {
            path: self.follower.path().to_vec(),
            target: self.follower.target(),
            target_index: self.follower.target_index(),
            position: self.follower.position(),
            radius: FOLLOWER_RADIUS,
            color: FOLLOWER_COLOR,
            status: self.follower.status().name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_sim_core::{CellCoord, Direction, EntityColor, GridSize, Phase, PixelPosition};
    use std::time::Duration;

    fn demo() -> GridDemo {
        let mut world = World::empty(GridSize::new(6, 4), 10);
        assert!(world.add_wall(CellCoord::new(3, 3)));
        let _ = world
            .add_movable(EntityColor::from_rgb(255, 0, 0), CellCoord::new(1, 1))
            .expect("start inside grid");
        GridDemo::from_world(world, Controller::new(Duration::from_millis(50)))
            .expect("positive cell size")
    }

    fn at(millis: u64) -> FrameTime {
        FrameTime {
            delta: Duration::from_millis(16),
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn grid_scene_mirrors_world_and_controller() {
        let mut demo = demo();
        let mut scene = Scene::Grid(demo.scene());
        let input = FrameInput {
            events: vec![
                InputEvent::Click(PixelPosition::new(15.0, 15.0)),
                InputEvent::Plan(Direction::East),
                InputEvent::TogglePause,
            ],
        };
        demo.frame(at(0), &input, &mut scene);

        let Scene::Grid(grid) = scene else {
            panic!("grid demo must keep a grid scene");
        };
        assert_eq!(grid.grid.columns, 6);
        assert_eq!(grid.grid.cell_size, 10.0);
        assert_eq!(grid.entities.len(), 2);
        assert_eq!(grid.entities.iter().filter(|e| e.selected).count(), 1);
        assert_eq!(grid.plans.len(), 1);
        assert_eq!(grid.plans[0].cells, vec![CellCoord::new(2, 1)]);
        assert_eq!(grid.plans[0].color, Color::from_rgb_u8(255, 0, 0));
        assert_eq!(grid.phase, Phase::Planning);
        assert!(grid.paused);
    }

    #[test]
    fn grid_demo_plays_back_on_the_elapsed_clock() {
        let mut demo = demo();
        let mut scene = Scene::Grid(demo.scene());
        let plan = FrameInput {
            events: vec![
                InputEvent::Click(PixelPosition::new(15.0, 15.0)),
                InputEvent::Plan(Direction::South),
                InputEvent::Confirm,
            ],
        };
        demo.frame(at(100), &plan, &mut scene);
        demo.frame(at(150), &FrameInput::default(), &mut scene);

        let Scene::Grid(grid) = scene else {
            panic!("grid demo must keep a grid scene");
        };
        assert_eq!(grid.phase, Phase::Finished);
        assert!(grid
            .entities
            .iter()
            .any(|entity| entity.cell == CellCoord::new(1, 2)));
    }

    #[test]
    fn waypoint_demo_handles_pause_and_reset() {
        let mut demo = WaypointDemo::default();
        let start = demo.scene().position;
        let mut scene = Scene::Waypoint(demo.scene());

        demo.frame(at(0), &FrameInput::default(), &mut scene);
        assert_ne!(demo.scene().position, start);

        let pause = FrameInput {
            events: vec![InputEvent::TogglePause],
        };
        demo.frame(at(16), &pause, &mut scene);
        let paused_at = demo.scene().position;
        demo.frame(at(32), &FrameInput::default(), &mut scene);
        assert_eq!(demo.scene().position, paused_at);
        assert_eq!(demo.scene().status, "PAUSED");

        let reset = FrameInput {
            events: vec![InputEvent::Reset],
        };
        demo.frame(at(48), &reset, &mut scene);
        let Scene::Waypoint(waypoint) = scene else {
            panic!("waypoint demo must keep a waypoint scene");
        };
        assert_eq!(waypoint.status, "RUNNING");
        assert_eq!(waypoint.path.len(), 6);
        assert!(waypoint.target.is_some());
        assert_eq!(waypoint.target_index, 1);
        assert_eq!(waypoint.hud_lines()[1], "waypoint: 1/5   (end: 880, 420)");
    }
}
