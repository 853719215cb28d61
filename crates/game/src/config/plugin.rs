use bevy::{asset::AssetEvent, ecs::message::MessageReader, prelude::*};
use bevy_common_assets::toml::TomlAssetPlugin;

use super::{CameraSettings, DemoConfig};

/// Inserts the startup camera settings and hot-reloads them from the asset
/// copy of the config file.
pub struct ConfigPlugin {
  pub camera: CameraSettings,
  /// Path relative to the asset root; `None` disables hot reload.
  pub asset_path: Option<String>,
}

#[derive(Resource)]
struct ConfigHandle(Handle<DemoConfig>);

impl Plugin for ConfigPlugin {
  fn build(&self, app: &mut App) {
    app.insert_resource(self.camera.clone());

    let Some(path) = self.asset_path.clone() else {
      return;
    };
    app
      .add_plugins(TomlAssetPlugin::<DemoConfig>::new(&["config.toml"]))
      .add_systems(
        PreStartup,
        move |mut commands: Commands, asset_server: Res<AssetServer>| {
          let handle: Handle<DemoConfig> = asset_server.load(path.clone());
          commands.insert_resource(ConfigHandle(handle));
        },
      )
      .add_systems(Update, watch_config_changes);
  }
}

fn watch_config_changes(
  config_handle: Option<Res<ConfigHandle>>,
  mut messages: MessageReader<AssetEvent<DemoConfig>>,
  configs: Res<Assets<DemoConfig>>,
  mut camera: ResMut<CameraSettings>,
) {
  let Some(config_handle) = config_handle else {
    return;
  };
  for event in messages.read() {
    if let AssetEvent::Modified { id } = event {
      if config_handle.0.id() == *id {
        if let Some(config) = configs.get(&config_handle.0) {
          if *camera != config.camera {
            info!("Camera settings reloaded; world settings apply on restart");
            *camera = config.camera.clone();
          }
        }
      }
    }
  }
}
