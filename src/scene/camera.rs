use glam::{Mat4, Vec3};

use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::row_major;
use crate::script::codec::encode_matrix;
use crate::script::command::{CameraValue, Command, FocusPointValue, SetCamera, SetFocusPoint};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Perspective camera described by a look-at frame and a vertical field of view.
pub struct Camera {
    /// Eye position.
    pub center: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Approximate up direction.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Width / height of the viewport.
    pub aspect_ratio: f32,
    /// Near clip distance.
    pub near_crop_distance: f32,
    /// Far clip distance.
    pub far_crop_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 0.0, 4.0),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            aspect_ratio: 1.0,
            near_crop_distance: 0.01,
            far_crop_distance: 100.0,
        }
    }
}

impl Camera {
    /// Camera at `center` looking at `look_at`, other parameters at their defaults.
    pub fn looking_at(center: Vec3, look_at: Vec3) -> Self {
        Self {
            center,
            look_at,
            ..Self::default()
        }
    }

    /// Replace the vertical field of view.
    pub fn fov_y_degrees(mut self, fov: f32) -> Self {
        self.fov_y_degrees = fov;
        self
    }

    /// Replace the aspect ratio.
    pub fn aspect_ratio(mut self, aspect: f32) -> Self {
        self.aspect_ratio = aspect;
        self
    }

    /// Replace the up direction.
    pub fn up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    /// Check that the parameters describe a usable camera.
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(SceneError::validation(
                "camera fov_y_degrees must be in (0, 180)",
            ));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(SceneError::validation(
                "camera aspect_ratio must be finite and > 0",
            ));
        }
        if !(self.near_crop_distance > 0.0 && self.far_crop_distance > self.near_crop_distance) {
            return Err(SceneError::validation(
                "camera clip distances must satisfy 0 < near < far",
            ));
        }
        let forward = self.look_at - self.center;
        if forward.length_squared() <= f32::EPSILON {
            return Err(SceneError::validation(
                "camera center and look_at must differ",
            ));
        }
        if forward.cross(self.up).length_squared() <= f32::EPSILON {
            return Err(SceneError::validation(
                "camera up must not be parallel to the viewing direction",
            ));
        }
        Ok(())
    }

    /// World to camera transform (right-handed, camera looks down -z).
    pub fn world_to_camera(&self) -> Mat4 {
        Mat4::look_at_rh(self.center, self.look_at, self.up)
    }

    /// Camera to world transform.
    pub fn camera_to_world(&self) -> Mat4 {
        self.world_to_camera().inverse()
    }

    /// OpenGL-style perspective projection.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.near_crop_distance,
            self.far_crop_distance,
        )
    }

    pub(crate) fn to_command(self) -> SceneResult<Command> {
        self.validate()?;
        Ok(Command::SetCamera(SetCamera {
            value: CameraValue {
                world_to_camera: encode_matrix(&row_major(self.world_to_camera()), 4)?,
                projection: encode_matrix(&row_major(self.projection()), 4)?,
            },
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
/// Point the viewer orbits around, with an optional axis-angle orientation.
pub struct FocusPoint {
    /// Orbit center.
    pub position: Vec3,
    /// Orientation as an axis scaled by the angle in radians.
    pub orientation_axis_angle: Option<Vec3>,
}

impl FocusPoint {
    /// Focus point without orientation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation_axis_angle: None,
        }
    }

    pub(crate) fn to_command(self) -> Command {
        Command::SetFocusPoint(SetFocusPoint {
            value: FocusPointValue {
                position: self.position.to_array(),
                orientation_axis_angle: self.orientation_axis_angle.map(|v| v.to_array()),
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
