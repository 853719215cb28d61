//! On-screen streaming readout.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use bevy_valley_world::{ForwardDrift, LightingState, StreamingStats};

use crate::camera::FlyCamera;

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
  fn build(&self, app: &mut App) {
    if !app.is_plugin_added::<EguiPlugin>() {
      app.add_plugins(EguiPlugin::default());
    }
    app.add_systems(EguiPrimaryContextPass, draw_overlay);
  }
}

fn draw_overlay(
  mut contexts: EguiContexts,
  stats: Option<Res<StreamingStats>>,
  lighting: Option<Res<LightingState>>,
  cameras: Query<(&Name, &Camera, &ForwardDrift), With<FlyCamera>>,
) {
  let Ok(ctx) = contexts.ctx_mut() else {
    return;
  };

  egui::Window::new("Valley")
    .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
    .title_bar(false)
    .resizable(false)
    .movable(false)
    .frame(egui::Frame::NONE.fill(egui::Color32::from_rgba_unmultiplied(20, 20, 25, 200)))
    .show(ctx, |ui| {
      ui.set_min_width(220.0);
      let Some(stats) = stats else {
        ui.label("Streaming disabled");
        return;
      };

      ui.label(
        egui::RichText::new(format!("Chunk {}, {}", stats.center.x, stats.center.y))
          .color(egui::Color32::from_rgb(255, 255, 180)),
      );
      ui.label(format!("Resident: {}", stats.resident));
      ui.label(format!(
        "Spawned {} / despawned {}",
        stats.spawned_total, stats.despawned_total
      ));
      if stats.failed_total > 0 {
        ui.colored_label(
          egui::Color32::from_rgb(255, 150, 100),
          format!("Failed: {}", stats.failed_total),
        );
      }
      match stats.last_resync {
        Some(reason) => ui.label(format!("Resyncs: {} ({:?})", stats.resyncs, reason)),
        None => ui.label(format!("Resyncs: {}", stats.resyncs)),
      };

      ui.separator();
      if let Some(lighting) = lighting {
        ui.label(format!("Lighting: {:?}", lighting.preset));
      }
      for (name, camera, drift) in &cameras {
        if camera.is_active {
          let drift = if drift.enabled { "drifting" } else { "still" };
          ui.label(format!("{} ({})", name, drift));
        }
      }
      ui.label(
        egui::RichText::new("R resync  Tab camera  F drift  L light")
          .color(egui::Color32::from_rgb(180, 180, 180))
          .small(),
      );
    });
}
