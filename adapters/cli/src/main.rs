#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the grid simulation demos.

mod config;
mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_sim_core::WELCOME_BANNER;
use grid_sim_rendering::{Color, FramePacer, Presentation, RenderingBackend, Scene};
use grid_sim_rendering_macroquad::MacroquadBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::config::{load_config, ConfigOverrides};
use self::scene::{GridDemo, WaypointDemo, WAYPOINT_WINDOW};

/// Demo selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Demo {
    /// Grid with random walls and planned movables.
    Walls,
    /// Single entity following a fixed waypoint path.
    Waypoints,
}

/// Grid simulation with planned, step-by-step playback.
#[derive(Debug, Parser)]
#[command(name = "grid-sim", version, long_about = None)]
struct Args {
    /// TOML file with simulation settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Demo to launch.
    #[arg(long, value_enum, default_value_t = Demo::Walls)]
    demo: Demo,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Side length of a cell in pixels.
    #[arg(long)]
    cell_size: Option<u32>,
    /// Milliseconds between playback steps.
    #[arg(long)]
    step_interval_ms: Option<u64>,
    /// Number of random walls.
    #[arg(long)]
    walls: Option<u32>,
    /// Frame rate cap.
    #[arg(long)]
    fps: Option<u32>,
    /// Seed for reproducible wall layouts.
    #[arg(long)]
    seed: Option<u64>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            columns: self.columns,
            rows: self.rows,
            cell_size: self.cell_size,
            step_interval_ms: self.step_interval_ms,
            wall_count: self.walls,
            frame_rate: self.fps,
            seed: self.seed,
        }
    }
}

/// Entry point for the grid simulation command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.overrides())?;
    info!(
        demo = ?args.demo,
        columns = config.columns,
        rows = config.rows,
        walls = config.wall_count,
        step_interval_ms = config.step_interval_ms,
        seed = ?config.seed,
        "starting grid simulation"
    );

    let pacer = FramePacer::new(config.frame_rate)?;
    let clear_color = Color::from_rgb_u8(0, 0, 0);
    let backend = MacroquadBackend::new().with_vsync(args.vsync);

    let outcome = match args.demo {
        Demo::Walls => {
            let mut demo = GridDemo::new(&config)?;
            let presentation = Presentation::new(
                WELCOME_BANNER,
                (config.window_width(), config.window_height()),
                clear_color,
                pacer,
                Scene::Grid(demo.scene()),
            );
            backend.run(presentation, move |time, input, scene| {
                demo.frame(time, &input, scene);
            })
        }
        Demo::Waypoints => {
            let mut demo = WaypointDemo::default();
            let presentation = Presentation::new(
                "Waypoint follow",
                WAYPOINT_WINDOW,
                clear_color,
                pacer,
                Scene::Waypoint(demo.scene()),
            );
            backend.run(presentation, move |time, input, scene| {
                demo.frame(time, &input, scene);
            })
        }
    };
    outcome.context("rendering backend failed")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_overrides() {
        let args = Args::try_parse_from([
            "grid-sim",
            "--demo",
            "waypoints",
            "--columns",
            "12",
            "--walls",
            "4",
            "--fps",
            "30",
            "--seed",
            "5",
        ])
        .expect("valid flags");

        assert_eq!(args.demo, Demo::Waypoints);
        assert_eq!(
            args.overrides(),
            ConfigOverrides {
                columns: Some(12),
                wall_count: Some(4),
                frame_rate: Some(30),
                seed: Some(5),
                ..ConfigOverrides::default()
            }
        );
    }

    #[test]
    fn demo_defaults_to_walls() {
        let args = Args::try_parse_from(["grid-sim"]).expect("no flags");
        assert_eq!(args.demo, Demo::Walls);
        assert!(!args.vsync);
        assert_eq!(args.overrides(), ConfigOverrides::default());
    }
}
