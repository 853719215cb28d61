use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

use super::actions::{
  Ascend, Descend, HandOff, Move, Resync, Sprint, ToggleDrift, ToggleLighting, ValleyInput,
};

pub(super) fn valley_input_actions() -> impl Bundle {
  actions!(ValleyInput[
      (
          Action::<Move>::new(),
          Bindings::spawn(Cardinal::wasd_keys()),
      ),
      (
          Action::<Ascend>::new(),
          bindings![KeyCode::KeyE],
      ),
      (
          Action::<Descend>::new(),
          bindings![KeyCode::KeyQ],
      ),
      (
          Action::<Sprint>::new(),
          bindings![KeyCode::ShiftLeft, KeyCode::ShiftRight],
      ),
      (
          Action::<Resync>::new(),
          bindings![KeyCode::KeyR],
      ),
      (
          Action::<HandOff>::new(),
          bindings![KeyCode::Tab],
      ),
      (
          Action::<ToggleDrift>::new(),
          bindings![KeyCode::KeyF],
      ),
      (
          Action::<ToggleLighting>::new(),
          bindings![KeyCode::KeyL],
      ),
  ])
}
