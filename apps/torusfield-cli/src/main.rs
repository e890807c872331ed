use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use torusfield_assets::{AssetError, LoadEvent, LoadedTexture, LoadingManager};
use torusfield_common::{NoopLoader, TextureLoader};
use torusfield_controls::{ControlValue, DebugPanel};
use torusfield_frame::{FixedStepClock, FrameError, FrameLoop, FrameTiming};
use torusfield_render::{DebugTextRenderer, RenderView, Renderer};
use torusfield_scene::{Scene, SceneBuilder, SceneConfig, Viewport};
use torusfield_tools::SceneInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "torusfield-cli", about = "CLI tool for the torus field scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory texture paths are resolved against
    #[arg(long, global = true, default_value = "static")]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the scene and print its nodes, meshes and panel controls
    Inspect {
        /// Show one node in detail
        #[arg(short, long)]
        node: Option<String>,
    },
    /// Run the frame loop headless and print each frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "3")]
        frames: u64,
        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Seed for the ring speed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Load every configured texture and report the result
    Assets {
        /// Seconds to wait for decoding
        #[arg(short, long, default_value = "30")]
        timeout: u64,
    },
}

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<SceneConfig> {
    let mut config = SceneConfig::load_or_default(path)?;
    if seed.is_some() {
        config.speed_seed = seed;
    }
    Ok(config)
}

fn build_scene(
    config: &SceneConfig,
    assets: &Path,
    loader: &mut dyn TextureLoader,
) -> anyhow::Result<Scene> {
    let scene = SceneBuilder::new(config, assets).build(
        Viewport::new(WIDTH, HEIGHT, 1.0),
        loader,
        &mut config.speed_rng(),
    )?;
    Ok(scene)
}

fn describe(value: Option<&ControlValue>) -> String {
    match value {
        Some(ControlValue::Color(c)) => c.to_string(),
        Some(ControlValue::Number(n)) => format!("{n:.4}"),
        Some(ControlValue::Trigger) | None => "-".to_string(),
    }
}

fn inspect(cli: &Cli, node: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), None)?;
    let scene = build_scene(&config, &cli.assets, &mut NoopLoader::default())?;

    if let Some(name) = node {
        let id = scene
            .graph
            .find_by_name(name)
            .with_context(|| format!("no node named {name:?}"))?;
        let info = SceneInspector::inspect_node(&scene, id)
            .with_context(|| format!("node {name:?} vanished"))?;
        println!("{info}");
        println!(
            "scale=({:.2}, {:.2}, {:.2}) children={}",
            info.scale[0], info.scale[1], info.scale[2], info.children
        );
        return Ok(());
    }

    println!("{}", SceneInspector::summary(&scene));
    println!();
    println!("Meshes:");
    for mesh in SceneInspector::list_meshes(&scene) {
        println!("  {mesh}");
    }
    println!();
    println!("Lights:");
    for (id, _) in scene.graph.lights() {
        if let Some(info) = SceneInspector::inspect_node(&scene, id) {
            println!("  {info}");
        }
    }
    println!();
    println!("Controls:");
    let panel = DebugPanel::standard(&scene, config.speed_rng())?;
    for spec in panel.controls() {
        println!(
            "  {:<20} {:<20} {:<7} {}",
            spec.key,
            spec.label,
            spec.kind.kind_name(),
            describe(panel.parameters().get(&spec.key))
        );
    }
    Ok(())
}

fn simulate(cli: &Cli, frames: u64, fps: f64, seed: Option<u64>) -> anyhow::Result<()> {
    if fps <= 0.0 {
        bail!("--fps must be positive, got {fps}");
    }
    let config = load_config(cli.config.as_deref(), seed)?;
    let mut scene = build_scene(&config, &cli.assets, &mut NoopLoader::default())?;
    println!("Simulating {frames} frame(s) at {fps} fps, speed={:.4}", scene.speed.get());
    if frames == 0 {
        return Ok(());
    }

    let mut frame_loop = FrameLoop::new(FixedStepClock::from_fps(fps));
    let stop = frame_loop.stop_handle();
    let renderer = DebugTextRenderer::new();
    let mut sink = |scene: &mut Scene, timing: FrameTiming| -> Result<(), FrameError> {
        let view = RenderView::from_scene(scene)?;
        println!("--- frame {} t={:.4}s ---", timing.frame, timing.elapsed);
        print!("{}", renderer.render(scene, &view));
        if timing.frame + 1 >= frames {
            stop.stop();
        }
        Ok(())
    };
    let ran = frame_loop.run(&mut scene, &mut sink)?;
    tracing::info!(frames = ran, "simulation finished");
    Ok(())
}

fn check_assets(cli: &Cli, timeout: u64) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), None)?;
    let mut loader = LoadingManager::new();
    build_scene(&config, &cli.assets, &mut loader)?;

    let (events, timed_out) = match loader.wait_all(Duration::from_secs(timeout)) {
        Ok(events) => (events, None),
        Err(AssetError::Timeout { pending }) => (loader.poll(), Some(pending)),
        Err(e) => return Err(e.into()),
    };
    for event in events {
        match event {
            LoadEvent::Loaded { handle, texture } => {
                let size = match &texture {
                    LoadedTexture::Flat { image, .. } => {
                        format!("{}x{}", image.width, image.height)
                    }
                    LoadedTexture::Cube(cube) => format!("6x{0}x{0}", cube.size),
                };
                println!("  ok     #{} {} {size}", handle.0, texture.kind());
            }
            LoadEvent::Failed { handle, error } => {
                println!("  FAILED #{} {error}", handle.0);
            }
            LoadEvent::Progress { source, progress } => {
                tracing::debug!(
                    finished = progress.finished,
                    total = progress.total,
                    "{source}"
                );
            }
            LoadEvent::AllLoaded(_) => {}
        }
    }

    let progress = loader.progress();
    println!(
        "{} of {} texture(s) loaded",
        progress.finished - progress.failed,
        progress.total
    );
    if let Some(pending) = timed_out {
        bail!("gave up after {timeout}s with {pending} texture(s) still loading");
    }
    if progress.failed > 0 {
        bail!("{} texture(s) failed to load", progress.failed);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Info => {
            println!("torusfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("frame: {}", torusfield_frame::crate_info());
            println!("controls: {}", torusfield_controls::crate_info());
            println!("assets: {}", torusfield_assets::crate_info());
            println!("render: {}", torusfield_render::crate_info());
            println!("tools: {}", torusfield_tools::crate_info());
        }
        Commands::Inspect { node } => inspect(&cli, node.as_deref())?,
        Commands::Simulate { frames, fps, seed } => simulate(&cli, *frames, *fps, *seed)?,
        Commands::Assets { timeout } => check_assets(&cli, *timeout)?,
    }

    Ok(())
}
