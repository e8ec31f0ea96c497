use std::f32::consts::PI;

use glam::Vec2;
use spraydoom_core::WorldPoint;

use crate::RenderingError;

/// Horizontal field of view in radians.
pub const FIELD_OF_VIEW: f32 = 0.66 * PI;

/// Pinhole camera described by a facing vector and a perpendicular view plane.
///
/// Screen column rays are `direction + plane * camera_x` with `camera_x`
/// spanning `-1.0..1.0` from the left edge to the right edge. The plane
/// points to the player's right, matching the strafe axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Vec2,
    direction: Vec2,
    plane: Vec2,
}

impl Camera {
    /// Creates a camera at `position` looking along `heading`.
    pub fn new(position: WorldPoint, heading: f32) -> Result<Self, RenderingError> {
        if !(position.x.is_finite() && position.y.is_finite() && heading.is_finite()) {
            return Err(RenderingError::NonFinitePose { position, heading });
        }
        let direction = Vec2::from_angle(heading);
        let plane = direction.perp() * (FIELD_OF_VIEW / 2.0).tan();
        Ok(Self {
            position: Vec2::new(position.x, position.y),
            direction,
            plane,
        })
    }

    /// World position of the eye.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit facing vector.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Half-width of the view plane at unit distance.
    #[must_use]
    pub const fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Unnormalised ray through screen column `column` of a `width` pixel frame.
    #[must_use]
    pub fn ray_for_column(&self, column: u32, width: u32) -> Vec2 {
        let camera_x = 2.0 * column as f32 / width.max(1) as f32 - 1.0;
        self.direction + self.plane * camera_x
    }

    /// Expresses a world point in camera space.
    ///
    /// `x` is the lateral offset in view-plane units and `y` the depth along
    /// the view axis. Points behind the eye have a non-positive depth.
    #[must_use]
    pub fn to_camera_space(&self, point: WorldPoint) -> Vec2 {
        let relative = Vec2::new(point.x, point.y) - self.position;
        let inverse_determinant =
            1.0 / (self.plane.x * self.direction.y - self.direction.x * self.plane.y);
        Vec2::new(
            inverse_determinant * (self.direction.y * relative.x - self.direction.x * relative.y),
            inverse_determinant * (-self.plane.y * relative.x + self.plane.x * relative.y),
        )
    }
}
