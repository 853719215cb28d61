use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

/// Context holding the demo's camera controls and commands.
#[derive(Component)]
pub struct ValleyInput;

/// Horizontal fly direction; `y` is forward.
#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct Move;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Ascend;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Descend;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Sprint;

/// Regenerate every chunk in the window.
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Resync;

/// Switch streaming to the other camera.
#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct HandOff;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct ToggleDrift;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct ToggleLighting;
