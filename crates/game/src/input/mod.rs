pub mod actions;
mod bindings;

pub use actions::{
  Ascend, Descend, HandOff, Move, Resync, Sprint, ToggleDrift, ToggleLighting, ValleyInput,
};
use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;
use bindings::valley_input_actions;

pub struct InputPlugin;

impl Plugin for InputPlugin {
  fn build(&self, app: &mut App) {
    app
      .add_plugins(EnhancedInputPlugin)
      .add_input_context::<ValleyInput>()
      .add_systems(Startup, spawn_input_context);
  }
}

fn spawn_input_context(mut commands: Commands) {
  commands.spawn((ValleyInput, valley_input_actions()));
}

/// Edge detector turning a held action into single presses.
#[derive(Default)]
pub struct Latch {
  down: bool,
}

impl Latch {
  /// True only on the frame `held` goes from false to true.
  pub fn press(&mut self, held: bool) -> bool {
    let rising = held && !self.down;
    self.down = held;
    rising
  }
}

/// Whether any `A` action bound under [`ValleyInput`] is active.
pub fn held<A: InputAction>(
  contexts: &Query<&Actions<ValleyInput>>,
  states: &Query<&ActionState, With<Action<A>>>,
) -> bool {
  contexts.iter().any(|actions| {
    actions.iter().any(|entity| {
      matches!(
        states.get(entity),
        Ok(ActionState::Fired | ActionState::Ongoing)
      )
    })
  })
}

/// Direction in camera space from the fly actions; `-Z` is forward.
pub fn fly_direction(planar: Vec2, vertical: f32) -> Vec3 {
  Vec3::new(planar.x, vertical, -planar.y)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn latch_fires_once_per_press() {
    let mut latch = Latch::default();
    let presses: Vec<bool> = [false, true, true, true, false, true]
      .into_iter()
      .map(|held| latch.press(held))
      .collect();
    assert_eq!(presses, vec![false, true, false, false, false, true]);
  }

  #[test]
  fn forward_input_flies_towards_negative_z() {
    assert_eq!(fly_direction(Vec2::Y, 0.0), Vec3::NEG_Z);
    assert_eq!(fly_direction(Vec2::X, 0.0), Vec3::X);
    assert_eq!(fly_direction(Vec2::ZERO, -1.0), Vec3::NEG_Y);
  }
}
