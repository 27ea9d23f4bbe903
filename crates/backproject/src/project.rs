use crate::calib::CameraCalibration;
use glam::{DMat3, DVec3};

/// One candidate point after transform and projection into a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Horizontal pixel coordinate.
    pub u: f64,
    /// Vertical pixel coordinate.
    pub v: f64,
    /// Camera-frame depth in meters (z before the homogeneous divide).
    pub depth: f64,
}

/// Moves an ego-frame point into the camera frame: translate, then rotate.
#[inline]
pub fn to_camera_frame(calib: &CameraCalibration, point: DVec3) -> DVec3 {
    calib.rotation * (point + calib.translation)
}

/// Projects a camera-frame point through the intrinsic matrix with a
/// homogeneous divide.
#[inline]
pub fn to_pixels(intrinsic: &DMat3, cam_point: DVec3) -> (f64, f64) {
    let h = *intrinsic * cam_point;
    (h.x / h.z, h.y / h.z)
}

/// Transforms and projects a batch of ego-frame points into one camera.
pub fn project_into(calib: &CameraCalibration, points: &[DVec3]) -> Vec<ProjectedPoint> {
    points
        .iter()
        .map(|&p| {
            let cam = to_camera_frame(calib, p);
            let (u, v) = to_pixels(&calib.intrinsic, cam);
            ProjectedPoint {
                u,
                v,
                depth: cam.z,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calib::{mat3_from_rows, CameraId};

    fn straight_ahead_camera() -> CameraCalibration {
        CameraCalibration {
            id: CameraId::Front,
            translation: DVec3::ZERO,
            rotation: DMat3::IDENTITY,
            intrinsic: mat3_from_rows([
                [1000.0, 0.0, 800.0],
                [0.0, 1000.0, 450.0],
                [0.0, 0.0, 1.0],
            ]),
        }
    }

    #[test]
    fn pinhole_projection_lands_where_expected() {
        let calib = straight_ahead_camera();
        let got = project_into(&calib, &[DVec3::new(1.0, 0.5, 10.0)]);

        assert_eq!(got.len(), 1);
        assert!((got[0].u - 900.0).abs() < 1e-9); // 1000 * 1/10 + 800
        assert!((got[0].v - 500.0).abs() < 1e-9); // 1000 * 0.5/10 + 450
        assert!((got[0].depth - 10.0).abs() < 1e-9);
    }

    #[test]
    fn translation_applies_before_rotation() {
        // A 90-degree yaw about y: camera z looks down ego -x.
        let calib = CameraCalibration {
            id: CameraId::Front,
            translation: DVec3::new(0.0, 0.0, -2.0),
            rotation: mat3_from_rows([
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0],
                [-1.0, 0.0, 0.0],
            ]),
            intrinsic: DMat3::IDENTITY,
        };

        let cam = to_camera_frame(&calib, DVec3::new(-5.0, 1.0, 2.0));
        // Translate first: (-5, 1, 0); then rotate.
        assert!((cam.x - 0.0).abs() < 1e-12);
        assert!((cam.y - 1.0).abs() < 1e-12);
        assert!((cam.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_intrinsic_recovers_the_view_ray() {
        let calib = straight_ahead_camera();
        let point = DVec3::new(2.0, -1.0, 8.0);
        let got = project_into(&calib, &[point])[0];

        // Un-project through the inverse intrinsic and compare direction
        // ratios; the divide discards scale, not the ray.
        let ray = calib.intrinsic.inverse() * DVec3::new(got.u, got.v, 1.0);
        assert!((ray.x / ray.z - point.x / point.z).abs() < 1e-9);
        assert!((ray.y / ray.z - point.y / point.z).abs() < 1e-9);
    }
}
