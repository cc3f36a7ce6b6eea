use std::time::Duration;

use grid_sim_core::{CellCoord, Direction, EntityColor, GridSize, InputEvent, Phase, PixelPosition};
use grid_sim_system_controller::Controller;
use grid_sim_world::{query, World};

const INTERVAL: Duration = Duration::from_millis(50);
const CELL_SIZE: u32 = 20;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn click_on(cell: CellCoord) -> InputEvent {
    InputEvent::Click(PixelPosition::new(
        (cell.column() * CELL_SIZE + CELL_SIZE / 2) as f32,
        (cell.row() * CELL_SIZE + CELL_SIZE / 2) as f32,
    ))
}

fn world_with_movables(starts: &[CellCoord]) -> World {
    let mut world = World::empty(GridSize::new(20, 20), CELL_SIZE);
    for start in starts {
        let _ = world
            .add_movable(EntityColor::from_rgb(0, 0, 255), *start)
            .expect("start inside grid");
    }
    world
}

fn plan_three_steps(world: &mut World, controller: &mut Controller) {
    let start = CellCoord::new(5, 5);
    controller.frame(
        world,
        &[
            click_on(start),
            InputEvent::Plan(Direction::East),
            InputEvent::Plan(Direction::East),
            InputEvent::Plan(Direction::South),
        ],
        ms(0),
    );
    assert_eq!(world.movables()[0].planned_cells().len(), 3);
}

#[test]
fn confirm_plays_back_three_steps_then_finishes_paused() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);
    assert_eq!(controller.phase(), Phase::Planning);

    controller.frame(&mut world, &[InputEvent::Confirm], ms(100));
    assert_eq!(controller.phase(), Phase::Moving);
    assert_eq!(world.movables()[0].playback_index(), 0);

    let expected = [
        CellCoord::new(6, 5),
        CellCoord::new(7, 5),
        CellCoord::new(7, 6),
    ];
    for (tick, cell) in expected.iter().enumerate() {
        let now = ms(100 + 50 * (tick as u64 + 1));
        controller.frame(&mut world, &[], now);
        assert_eq!(
            world.movables()[0].position(world.grid()),
            *cell,
            "tick {tick} should advance exactly one cell"
        );
    }

    assert_eq!(controller.phase(), Phase::Finished);
    assert!(controller.is_paused(), "finishing forces the pause flag");
}

#[test]
fn playback_waits_for_the_interval() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);
    controller.frame(&mut world, &[InputEvent::Confirm], ms(1_000));

    for now in [1_000, 1_010, 1_049] {
        controller.frame(&mut world, &[], ms(now));
        assert_eq!(world.movables()[0].playback_index(), 0, "ticked early at {now}ms");
    }

    controller.frame(&mut world, &[], ms(1_050));
    assert_eq!(world.movables()[0].playback_index(), 1);
    controller.frame(&mut world, &[], ms(1_060));
    assert_eq!(
        world.movables()[0].playback_index(),
        1,
        "one tick per interval even when frames are frequent"
    );
    controller.frame(&mut world, &[], ms(5_000));
    assert_eq!(
        world.movables()[0].playback_index(),
        2,
        "a long frame still advances only one step"
    );
}

#[test]
fn pause_freezes_playback_until_toggled() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);
    controller.frame(&mut world, &[InputEvent::Confirm], ms(0));

    controller.frame(&mut world, &[InputEvent::TogglePause], ms(50));
    assert!(controller.is_paused());
    controller.frame(&mut world, &[], ms(500));
    assert_eq!(world.movables()[0].playback_index(), 0);

    controller.frame(&mut world, &[InputEvent::TogglePause], ms(550));
    assert_eq!(world.movables()[0].playback_index(), 1);
}

#[test]
fn paused_planning_ignores_edits_but_honours_confirm() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);

    controller.frame(
        &mut world,
        &[
            InputEvent::TogglePause,
            InputEvent::Plan(Direction::North),
            InputEvent::Undo,
            InputEvent::Clear,
            click_on(CellCoord::new(0, 0)),
        ],
        ms(10),
    );
    assert_eq!(world.movables()[0].planned_cells().len(), 3);
    assert!(world.movables()[0].is_selected());

    controller.frame(&mut world, &[InputEvent::Confirm], ms(20));
    assert_eq!(controller.phase(), Phase::Moving);
    assert!(controller.is_paused());
}

#[test]
fn edits_are_rejected_outside_planning() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);
    controller.frame(&mut world, &[InputEvent::Confirm], ms(0));

    controller.frame(
        &mut world,
        &[
            InputEvent::Plan(Direction::West),
            InputEvent::Undo,
            InputEvent::Clear,
        ],
        ms(10),
    );
    assert_eq!(world.movables()[0].planned_cells().len(), 3);
}

#[test]
fn reset_during_moving_returns_everyone_home() {
    let starts = [CellCoord::new(5, 5), CellCoord::new(10, 10)];
    let mut world = world_with_movables(&starts);
    let mut controller = Controller::new(INTERVAL);
    controller.frame(
        &mut world,
        &[
            click_on(starts[0]),
            InputEvent::Plan(Direction::South),
            InputEvent::Plan(Direction::South),
            click_on(starts[1]),
            InputEvent::Plan(Direction::North),
            InputEvent::Plan(Direction::West),
            InputEvent::Confirm,
        ],
        ms(0),
    );
    controller.frame(&mut world, &[], ms(50));
    assert_ne!(world.movables()[0].position(world.grid()), starts[0]);

    controller.frame(&mut world, &[InputEvent::Reset], ms(60));
    assert_eq!(controller.phase(), Phase::Planning);
    assert!(!controller.is_paused());
    for (movable, start) in world.movables().iter().zip(starts) {
        assert_eq!(movable.position(world.grid()), start);
        assert!(movable.planned_cells().is_empty());
        assert_eq!(movable.playback_index(), 0);
        assert!(!movable.is_selected());
    }
    assert_eq!(query::entity_view(&world).iter().count(), 2);
}

#[test]
fn reset_clears_forced_pause_after_finishing() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    controller.frame(&mut world, &[InputEvent::Confirm], ms(0));
    controller.frame(&mut world, &[], ms(50));
    assert_eq!(controller.phase(), Phase::Finished);
    assert!(controller.is_paused());

    controller.frame(&mut world, &[InputEvent::Reset], ms(60));
    assert_eq!(controller.phase(), Phase::Planning);
    assert!(!controller.is_paused());
}

#[test]
fn confirm_after_finishing_replays_the_same_plan() {
    let mut world = world_with_movables(&[CellCoord::new(5, 5)]);
    let mut controller = Controller::new(INTERVAL);
    plan_three_steps(&mut world, &mut controller);
    controller.frame(&mut world, &[InputEvent::Confirm], ms(0));
    for tick in 1..=3 {
        controller.frame(&mut world, &[], ms(50 * tick));
    }
    assert_eq!(controller.phase(), Phase::Finished);
    assert!(world.movables()[0].is_done());

    controller.frame(
        &mut world,
        &[InputEvent::TogglePause, InputEvent::Confirm],
        ms(1_000),
    );
    assert_eq!(controller.phase(), Phase::Moving);
    assert_eq!(world.movables()[0].playback_index(), 0);
    assert_eq!(world.movables()[0].planned_cells().len(), 3);

    controller.frame(&mut world, &[], ms(1_050));
    assert_eq!(world.movables()[0].playback_index(), 1);
    assert_eq!(
        world.movables()[0].position(world.grid()),
        CellCoord::new(6, 5)
    );
}

#[test]
fn stalled_mover_keeps_trying_each_tick() {
    let starts = [CellCoord::new(0, 0), CellCoord::new(4, 0)];
    let mut world = world_with_movables(&starts);
    let mut controller = Controller::new(INTERVAL);
    controller.frame(
        &mut world,
        &[
            click_on(starts[0]),
            InputEvent::Plan(Direction::East),
            InputEvent::Plan(Direction::East),
            click_on(starts[1]),
            InputEvent::Plan(Direction::West),
            InputEvent::Plan(Direction::West),
            InputEvent::Confirm,
        ],
        ms(0),
    );

    controller.frame(&mut world, &[], ms(50));
    controller.frame(&mut world, &[], ms(100));
    assert_eq!(world.movables()[0].position(world.grid()), CellCoord::new(2, 0));
    assert_eq!(world.movables()[1].position(world.grid()), CellCoord::new(3, 0));
    assert_eq!(world.movables()[1].playback_index(), 1);

    controller.frame(&mut world, &[], ms(150));
    assert_eq!(controller.phase(), Phase::Moving, "blocked mover never finishes");
}
