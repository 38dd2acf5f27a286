use glam::{Mat4, Vec3};

/// Look-at camera: an eye position and the point it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self { eye, target }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Perspective projection parameters.
///
/// The aspect ratio is deliberately not a field: `matrix` derives it from
/// the viewport passed in, so every render picks up the dimensions of
/// whatever target is active rather than a value cached at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(fov_y: f32, near: f32, far: f32) -> Self {
        Self { fov_y, near, far }
    }

    pub fn matrix(&self, viewport_width: u32, viewport_height: u32) -> Mat4 {
        let aspect = viewport_width as f32 / viewport_height.max(1) as f32;
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_follows_the_viewport() {
        let projection = Projection::new(std::f32::consts::FRAC_PI_3, 1.0, 1000.0);

        let square = projection.matrix(512, 512);
        let wide = projection.matrix(1024, 512);

        // Square viewports scale x and y identically; doubling the width
        // halves the x scale.
        assert_eq!(square.x_axis.x, square.y_axis.y);
        assert!((wide.x_axis.x - square.x_axis.x / 2.0).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_moves_the_eye_to_the_origin() {
        let camera = Camera::new(Vec3::new(0.0, 8.0, 25.0), Vec3::new(0.0, -1.0, 0.0));
        let eye_in_view = camera.view_matrix().transform_point3(camera.eye);
        assert!(eye_in_view.length() < 1e-5);
    }
}
