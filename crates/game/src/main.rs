mod camera;
mod config;
mod input;
mod overlay;

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::{prelude::*, time::TimeUpdateStrategy, window::WindowResolution};
use bevy_valley_world::{
  ForwardDrift, LightingPreset, StreamingCamera, StreamingStats, ValleyWorldPlugin,
};
use clap::{Parser, ValueEnum};

use crate::config::{CameraSettings, ConfigPlugin, DemoConfig};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
  /// One strip of chunks following the river.
  Strip,
  /// Square grid around the camera.
  Grid,
}

#[derive(Parser, Debug)]
#[command(name = "valley")]
#[command(about = "Fly over an endless procedurally generated river valley")]
struct Cli {
  /// Config file; hot-reloaded when it lives under `assets/`
  #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  #[arg(short, long, value_enum, default_value_t = Variant::Strip)]
  variant: Variant,

  /// Overrides `world.base_seed`
  #[arg(short, long)]
  seed: Option<u64>,

  /// Start with the day preset
  #[arg(long)]
  day: bool,

  /// Run this many frames without a window, then print streaming stats
  #[arg(long)]
  headless_ticks: Option<u32>,
}

impl Cli {
  fn apply(&self, config: &mut DemoConfig) {
    if let Some(seed) = self.seed {
      config.world.base_seed = seed;
    }
    if self.day {
      config.world.lighting = LightingPreset::Day;
    }
  }
}

/// Asset-relative path, if the config lives under the asset root.
fn asset_path(config: &Path) -> Option<String> {
  config
    .strip_prefix("assets")
    .ok()
    .map(|p| p.to_string_lossy().replace('\\', "/"))
}

fn main() {
  let cli = Cli::parse();

  let mut config = match config::load(&cli.config) {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{}", e);
      std::process::exit(1);
    }
  };
  cli.apply(&mut config);

  match cli.headless_ticks {
    Some(ticks) => run_headless(&cli, config, ticks),
    None => run_windowed(&cli, config),
  }
}

fn add_world(app: &mut App, variant: Variant, config: &DemoConfig, lighting: bool) {
  let world = config.world.clone();
  let debug = cfg!(feature = "visual_debug");
  match variant {
    Variant::Strip => app.add_plugins(
      ValleyWorldPlugin::strip(world)
        .with_lighting(lighting)
        .with_visual_debug(debug),
    ),
    Variant::Grid => app.add_plugins(
      ValleyWorldPlugin::grid(world)
        .with_lighting(lighting)
        .with_visual_debug(debug),
    ),
  };
}

fn run_windowed(cli: &Cli, config: DemoConfig) {
  let mut app = App::new();

  app
    .insert_resource(ClearColor(camera::clear_color(config.world.lighting)))
    .add_plugins(DefaultPlugins.set(WindowPlugin {
      primary_window: Some(Window {
        resolution: WindowResolution::new(config.window.width, config.window.height),
        title: config.window.title.clone(),
        ..default()
      }),
      ..default()
    }))
    .add_plugins(ConfigPlugin {
      camera: config.camera.clone(),
      asset_path: asset_path(&cli.config),
    })
    .add_plugins(input::InputPlugin)
    .add_plugins(camera::CameraPlugin {
      drift: cli.variant == Variant::Strip,
    })
    .add_plugins(overlay::OverlayPlugin);

  add_world(&mut app, cli.variant, &config, true);

  app.run();
}

/// Streams from a drifting camera with no window or renderer.
fn run_headless(cli: &Cli, config: DemoConfig, ticks: u32) {
  let mut app = App::new();
  app
    .add_plugins((
      MinimalPlugins,
      bevy::log::LogPlugin::default(),
      TransformPlugin,
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
      16,
    )));
  add_world(&mut app, cli.variant, &config, false);

  let camera = spawn_headless_camera(&mut app, cli.variant, &config.camera);
  info!("Headless run: {} frames from {:?}", ticks, camera);
  for _ in 0..ticks {
    app.update();
  }

  match app.world().get_resource::<StreamingStats>() {
    Some(stats) => info!(
      "Center {}, resident {}, spawned {}, despawned {}, failed {}, resyncs {}",
      stats.center,
      stats.resident,
      stats.spawned_total,
      stats.despawned_total,
      stats.failed_total,
      stats.resyncs
    ),
    None => warn!("Streaming never started"),
  }
}

fn spawn_headless_camera(app: &mut App, variant: Variant, settings: &CameraSettings) -> Entity {
  let start = Vec3::new(0.0, settings.start_height, 0.0);
  let mut camera = app.world_mut().spawn((
    Transform::from_translation(start),
    GlobalTransform::from_translation(start),
    StreamingCamera,
  ));
  if variant == Variant::Strip {
    camera.insert(ForwardDrift::along(settings.drift_speed));
  }
  camera.id()
}
