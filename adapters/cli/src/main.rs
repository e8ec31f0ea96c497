#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Spray Doom experience.

mod export;
mod logging;
mod simulation;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use spraydoom_rendering::{
    Color, FrameBuffer, FrameInput, FrameSimulationBreakdown, Hud, Presentation,
    ProceduralTextures, RaycastRenderer, RenderingBackend, Scene,
};
use spraydoom_rendering_macroquad::MacroquadBackend;
use spraydoom_system_bootstrap::Bootstrap;
use spraydoom_world::query;

use self::simulation::{FrameStep, Simulation};

/// Fixed step used by headless runs.
const HEADLESS_FRAME: Duration = Duration::from_nanos(16_666_667);

/// First-person graffiti runner set in a procedurally generated 90s New York.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Seed that determines the city and every AI decision; random when omitted.
    #[arg(long)]
    seed: Option<u32>,
    /// Width of the internal render target in pixels.
    #[arg(long, default_value_t = 320, value_parser = clap::value_parser!(u32).range(2..=4096))]
    width: u32,
    /// Height of the internal render target in pixels.
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(2..=4096))]
    height: u32,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
    /// Run this many fixed 1/60 s frames without a window and report the result.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,
    /// Write the generated city as JSON to this path and exit.
    #[arg(long, value_name = "PATH")]
    export_city: Option<PathBuf>,
}

/// Entry point for the Spray Doom command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose);

    let seed = args.seed.unwrap_or_else(rand::random);
    let session = Bootstrap
        .start(seed)
        .with_context(|| format!("failed to start a session for seed {seed}"))?;
    info!("{} (seed {seed})", Bootstrap.welcome_banner(&session.world));

    if let Some(path) = &args.export_city {
        return export::write_city(&session, path);
    }

    let simulation = Simulation::new(session);
    let renderer = RaycastRenderer::new(ProceduralTextures::new());
    let frame = FrameBuffer::new(args.width, args.height)
        .context("render target has an unusable size")?;
    let mut scene = Scene::new(
        frame,
        Hud::default(),
        query::player(simulation.world()),
        Vec::new(),
    );
    let _ = simulation
        .refresh_scene(&renderer, &mut scene, false)
        .context("failed to render the first frame")?;

    match args.headless {
        Some(frames) => run_headless(simulation, &renderer, scene, frames),
        None => run_windowed(&args, simulation, renderer, scene),
    }
}

fn run_headless(
    mut simulation: Simulation,
    renderer: &RaycastRenderer<ProceduralTextures>,
    mut scene: Scene,
    frames: u32,
) -> Result<()> {
    let started = Instant::now();
    let mut skipped_samples = 0_u64;
    let mut simulated = 0_u32;

    for _ in 0..frames {
        if simulation.advance(HEADLESS_FRAME, &FrameInput::default()) != FrameStep::Advanced {
            break;
        }
        simulated += 1;
        match simulation.refresh_scene(renderer, &mut scene, false) {
            Ok(stats) => skipped_samples += u64::from(stats.skipped_samples),
            Err(render_error) => error!("frame {simulated} skipped: {render_error}"),
        }
    }

    let player = query::player(simulation.world());
    let (completed, total) = query::tag_progress(simulation.world());
    info!(
        "headless run: {simulated} frames in {:.2?}, hp {:.1}, spray {:.1}, tags {completed}/{total}, outcome {:?}, skipped samples {skipped_samples}",
        started.elapsed(),
        player.health,
        player.spray,
        simulation.outcome(),
    );
    Ok(())
}

fn run_windowed(
    args: &CliArgs,
    mut simulation: Simulation,
    renderer: RaycastRenderer<ProceduralTextures>,
    scene: Scene,
) -> Result<()> {
    let presentation = Presentation::new(
        Bootstrap.welcome_banner(simulation.world()),
        Color::from_hex(0x000000),
        query::tile_map(simulation.world()).clone(),
        scene,
    );

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            let simulation_start = Instant::now();
            let step = simulation.advance(dt, &input);
            let simulation_time = simulation_start.elapsed();

            let raycast_start = Instant::now();
            if step == FrameStep::Advanced {
                if let Err(render_error) =
                    simulation.refresh_scene(&renderer, scene, input.spray)
                {
                    error!("frame skipped: {render_error}");
                }
            } else {
                scene.hud = simulation.hud();
            }

            FrameSimulationBreakdown {
                simulation: simulation_time,
                raycast: raycast_start.elapsed(),
            }
        })
        .context("window closed with an error")
}
