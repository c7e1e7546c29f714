use na::{Matrix3, Matrix4, Perspective3, Rotation3, Unit, Vector3};
use std::time::Duration;

pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.8;
pub const Z_FAR: f32 = 10.0;
pub const CAMERA_DISTANCE: f32 = 5.0;
pub const CUBE_SCALE: f32 = 3.0;

pub fn projection(width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width as f32 / height.max(1) as f32;
    Perspective3::new(aspect, FIELD_OF_VIEW_DEGREES.to_radians(), Z_NEAR, Z_FAR).to_homogeneous()
}

pub fn view() -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(0.0, 0.0, -CAMERA_DISTANCE))
}

/// Scales the unit cube up and moves its centre to the origin.
pub fn initial_model() -> Matrix4<f32> {
    Matrix4::new_scaling(CUBE_SCALE) * Matrix4::new_translation(&Vector3::new(-0.5, -0.5, -0.5))
}

/// Transpose of the inverse of the upper 3x3 of the model-view matrix.
pub fn normal_matrix(view: &Matrix4<f32>, model: &Matrix4<f32>) -> Matrix3<f32> {
    let model_view = view * model;
    let upper: Matrix3<f32> = model_view.fixed_view::<3, 3>(0, 0).into_owned();

    upper.try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix3::identity)
}

/// Model matrix of the spinning cube.
///
/// The total angle is kept instead of multiplying a fresh rotation into the model
/// every frame, so rounding error does not build up over long runs.
pub struct CubeTransform {
    base: Matrix4<f32>,
    axis: Unit<Vector3<f32>>,
    degrees_per_second: f32,
    angle_degrees: f32,
}

impl CubeTransform {
    pub fn new(degrees_per_second: f32) -> CubeTransform {
        CubeTransform {
            base: initial_model(),
            axis: Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0)),
            degrees_per_second,
            angle_degrees: 0.0,
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        let delta = elapsed.as_secs_f32() * self.degrees_per_second;
        self.angle_degrees = (self.angle_degrees + delta) % 360.0;
    }

    #[cfg(test)]
    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn model(&self) -> Matrix4<f32> {
        let rotation = Rotation3::from_axis_angle(&self.axis, self.angle_degrees.to_radians());
        rotation.to_homogeneous() * self.base
    }
}
