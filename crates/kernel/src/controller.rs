use glam::{Vec2, Vec3};
use vantage_common::ViewerConfig;
use vantage_input::{Action, Axis, Direction, InputState, KeyBindings};
use vantage_render::Camera;

/// Turns held keys and drag deltas into camera motion.
///
/// Translation is time-scaled: each held direction moves
/// `move_speed * elapsed` along its local axis. Held directions add up
/// without normalization, so a diagonal is faster than a straight line.
///
/// Rotation is event-sourced: the accumulated drag delta is applied once,
/// independent of `elapsed` and of how many ticks the drag spanned.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub move_speed: f32,
    pub rotate_sensitivity: f32,
    bindings: KeyBindings,
    home_position: Vec3,
}

impl CameraController {
    pub fn new(move_speed: f32, rotate_sensitivity: f32) -> Self {
        Self {
            move_speed,
            rotate_sensitivity,
            bindings: KeyBindings::default(),
            home_position: Vec3::ZERO,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            home_position: config.initial_position,
            ..Self::new(config.move_speed, config.rotate_sensitivity)
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Advance the camera by one tick. A missing camera makes this a no-op
    /// that leaves the input untouched.
    pub fn tick<C: Camera>(&self, elapsed_seconds: f32, input: &mut InputState, camera: Option<&mut C>) {
        let Some(camera) = camera else {
            return;
        };

        if self.bindings.was_triggered(Action::ResetView, input) {
            camera.set_position(self.home_position);
            camera.set_rotation(Vec3::ZERO);
            tracing::debug!("camera reset to {:?}", self.home_position);
        }

        let step = self.move_speed * elapsed_seconds.max(0.0);
        if step != 0.0 {
            for direction in Direction::ALL {
                if !self.bindings.is_direction_held(direction, input) {
                    continue;
                }
                let (axis, sign) = direction.axis();
                let distance = step * sign;
                match axis {
                    Axis::Forward => camera.move_forward(distance),
                    Axis::Right => camera.move_right(distance),
                    Axis::Up => camera.move_up(distance),
                }
            }
        }

        let delta = input.take_rotation_delta();
        if delta != Vec2::ZERO {
            camera.rotate_yaw(delta.x * self.rotate_sensitivity);
            camera.rotate_pitch(delta.y * self.rotate_sensitivity);
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}
