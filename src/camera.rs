//! First-person walkthrough camera.
//!
//! The camera is advanced once per rendered frame by a fixed step, not by
//! elapsed time. Motion speed therefore follows the frame rate, which the shell
//! pins to the display refresh with a Fifo (vsync) present mode.

use glam::{Mat4, Vec3};

use crate::matrix;

/// World units travelled per tick while walking.
pub const WALK_STEP: f32 = 0.05;
/// Degrees the bob phase advances per walking tick.
pub const BOB_STEP: f32 = 10.0;
/// Degrees turned or tilted per tick.
pub const TURN_STEP: f32 = 1.0;
/// Change of the legacy depth scalar per look tick.
pub const DEPTH_STEP: f32 = 0.02;
/// Eye height above the floor before bobbing.
pub const EYE_HEIGHT: f32 = 0.25;

/// Directional inputs held during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldInput {
    pub forward: bool,
    pub back: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub look_up: bool,
    pub look_down: bool,
}

/// Navigation state for the walkthrough.
///
/// Angles are in degrees and are never range-reduced, except for the bob phase
/// which stays in `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    /// Yaw; grows when turning left.
    pub heading: f32,
    pub xpos: f32,
    pub zpos: f32,
    /// Vertical bob offset derived from `walkbiasangle`.
    pub walkbias: f32,
    pub walkbiasangle: f32,
    /// Pitch; grows when looking down.
    pub lookupdown: f32,
    /// Depth scalar moved by the look keys. Nothing reads it.
    pub z: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the camera by one tick for every held input.
    pub fn integrate(&mut self, input: &HeldInput) {
        let (sin, cos) = self.heading.to_radians().sin_cos();

        if input.forward {
            self.xpos -= sin * WALK_STEP;
            self.zpos -= cos * WALK_STEP;
            self.step_bob(BOB_STEP);
        }

        if input.back {
            self.xpos += sin * WALK_STEP;
            self.zpos += cos * WALK_STEP;
            self.step_bob(-BOB_STEP);
        }

        if input.turn_right {
            self.heading -= TURN_STEP;
        }

        if input.turn_left {
            self.heading += TURN_STEP;
        }

        if input.look_up {
            self.lookupdown -= TURN_STEP;
            self.z -= DEPTH_STEP;
        }

        if input.look_down {
            self.lookupdown += TURN_STEP;
            self.z += DEPTH_STEP;
        }
    }

    fn step_bob(&mut self, delta: f32) {
        self.walkbiasangle = (self.walkbiasangle + delta).rem_euclid(360.0);
        self.walkbias = self.walkbiasangle.to_radians().sin() / 20.0;
    }

    /// Alias of `heading`, kept for callers that think in scene rotation.
    pub fn yrot(&self) -> f32 {
        self.heading
    }

    /// World-to-eye transform: pitch, then yaw, then the inverse position.
    pub fn model_view(&self) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        matrix::rotate(&mut m, self.lookupdown, Vec3::X);
        matrix::rotate(&mut m, 360.0 - self.yrot(), Vec3::Y);
        matrix::translate(
            &mut m,
            -self.xpos,
            -self.walkbias - EYE_HEIGHT,
            -self.zpos,
        );
        m
    }
}
