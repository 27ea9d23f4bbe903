use glam::{DMat3, DVec3};

/// Identifier of one camera in the six-camera ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraId {
    FrontLeft,
    Front,
    FrontRight,
    BackLeft,
    Back,
    BackRight,
}

impl CameraId {
    /// Fixed visibility-resolution order.
    ///
    /// This is a tie-break rule, not an aesthetic choice: the first camera in
    /// this order that sees a point wins, so reordering changes observable
    /// output.
    pub const RESOLUTION_ORDER: [CameraId; 6] = [
        CameraId::FrontLeft,
        CameraId::Front,
        CameraId::FrontRight,
        CameraId::BackLeft,
        CameraId::Back,
        CameraId::BackRight,
    ];

    /// Dataset-convention name, also used for camera image files on disk.
    pub fn name(self) -> &'static str {
        match self {
            CameraId::FrontLeft => "CAM_FRONT_LEFT",
            CameraId::Front => "CAM_FRONT",
            CameraId::FrontRight => "CAM_FRONT_RIGHT",
            CameraId::BackLeft => "CAM_BACK_LEFT",
            CameraId::Back => "CAM_BACK",
            CameraId::BackRight => "CAM_BACK_RIGHT",
        }
    }

    /// Position of this camera in [`Self::RESOLUTION_ORDER`].
    #[inline]
    pub fn ring_index(self) -> usize {
        match self {
            CameraId::FrontLeft => 0,
            CameraId::Front => 1,
            CameraId::FrontRight => 2,
            CameraId::BackLeft => 3,
            CameraId::Back => 4,
            CameraId::BackRight => 5,
        }
    }
}

/// Rigid extrinsics plus pinhole intrinsics for one ring camera.
///
/// `translation` and `rotation` move ego-frame points into the camera frame
/// (translate, then rotate, per the calibration convention of the source
/// dataset); `intrinsic` projects camera-frame points to pixels.
#[derive(Debug, Clone)]
pub struct CameraCalibration {
    pub id: CameraId,
    pub translation: DVec3,
    /// Orthonormal ego-to-camera rotation.
    pub rotation: DMat3,
    pub intrinsic: DMat3,
}

/// The six-camera calibration set, stored in resolution order.
///
/// Built once at process start and shared by reference; read-only afterwards,
/// so it needs no synchronization.
#[derive(Debug, Clone)]
pub struct CalibrationTable {
    cameras: [CameraCalibration; 6],
}

/// Calibration sources are row-major; glam stores columns.
pub(crate) fn mat3_from_rows(rows: [[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(&rows).transpose()
}

impl CalibrationTable {
    /// Builds a table from six records already in resolution order.
    pub fn new(cameras: [CameraCalibration; 6]) -> Self {
        debug_assert!(cameras
            .iter()
            .zip(CameraId::RESOLUTION_ORDER)
            .all(|(c, id)| c.id == id));
        Self { cameras }
    }

    /// The fixed calibration of the demo vehicle's camera ring.
    pub fn nuscenes_ring() -> Self {
        let entry = |id: CameraId, t: [f64; 3], r: [[f64; 3]; 3], k: [[f64; 3]; 3]| {
            CameraCalibration {
                id,
                translation: DVec3::from(t),
                rotation: mat3_from_rows(r),
                intrinsic: mat3_from_rows(k),
            }
        };

        Self::new([
            entry(
                CameraId::FrontLeft,
                [-1.57525595, -0.50051938, -1.50696033],
                [
                    [0.82254604, -0.56868433, -0.00401771],
                    [0.00647832, 0.01643407, -0.99984396],
                    [0.56866162, 0.82239167, 0.01720189],
                ],
                [
                    [1257.8625342125129, 0.0, 827.2410631095686],
                    [0.0, 1257.8625342125129, 450.915498205774],
                    [0.0, 0.0, 1.0],
                ],
            ),
            entry(
                CameraId::Front,
                [-1.72200568, -0.00475453, -1.49491292],
                [
                    [0.01026021, -0.99987258, -0.01222952],
                    [0.00843345, 0.01231626, -0.99988859],
                    [0.9999118, 0.01015593, 0.00855874],
                ],
                [
                    [1252.8131021185304, 0.0, 826.588114781398],
                    [0.0, 1252.8131021185304, 469.9846626224581],
                    [0.0, 0.0, 1.0],
                ],
            ),
            entry(
                CameraId::FrontRight,
                [-1.58082566, 0.49907871, -1.51749368],
                [
                    [-0.84397973, -0.53614138, -0.01583178],
                    [0.01645551, 0.00362107, -0.99985804],
                    [0.5361226, -0.84412044, 0.00576637],
                ],
                [
                    [1256.7485116440405, 0.0, 817.7887570959712],
                    [0.0, 1256.7485116440403, 451.9541780095127],
                    [0.0, 0.0, 1.0],
                ],
            ),
            entry(
                CameraId::BackLeft,
                [-1.035691, -0.48479503, -1.59097015],
                [
                    [0.94776036, 0.31896113, 0.00375564],
                    [0.00866572, -0.0139763, -0.99986478],
                    [-0.31886551, 0.94766474, -0.01601021],
                ],
                [
                    [1256.7414812095406, 0.0, 792.1125740759628],
                    [0.0, 1256.7414812095406, 492.7757465151356],
                    [0.0, 0.0, 1.0],
                ],
            ),
            entry(
                CameraId::Back,
                [-0.02832603, -0.00345137, -1.57910346],
                [
                    [0.00242171, 0.99998907, -0.00400023],
                    [-0.01675361, -0.00395911, -0.99985181],
                    [-0.99985672, 0.00248837, 0.01674384],
                ],
                [
                    [809.2209905677063, 0.0, 829.2196003259838],
                    [0.0, 809.2209905677063, 481.77842384512485],
                    [0.0, 0.0, 1.0],
                ],
            ),
            entry(
                CameraId::BackRight,
                [-1.0148781, 0.48056822, -1.56239545],
                [
                    [-0.93477554, 0.35507456, -0.01080503],
                    [0.01587584, 0.0113705, -0.99980932],
                    [-0.35488399, -0.93476883, -0.01626597],
                ],
                [
                    [1259.5137405846733, 0.0, 807.2529053838625],
                    [0.0, 1259.5137405846733, 501.19579884916527],
                    [0.0, 0.0, 1.0],
                ],
            ),
        ])
    }

    /// All six cameras, in resolution order.
    #[inline]
    pub fn in_resolution_order(&self) -> &[CameraCalibration; 6] {
        &self.cameras
    }

    #[inline]
    pub fn get(&self, id: CameraId) -> &CameraCalibration {
        &self.cameras[id.ring_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_rotations_are_orthonormal() {
        let table = CalibrationTable::nuscenes_ring();
        for calib in table.in_resolution_order() {
            let r = calib.rotation;
            let should_be_identity = r * r.transpose();
            for col in 0..3 {
                for row in 0..3 {
                    let expected = if col == row { 1.0 } else { 0.0 };
                    assert!(
                        (should_be_identity.col(col)[row] - expected).abs() < 1e-6,
                        "{}: R * R^T is not the identity",
                        calib.id.name()
                    );
                }
            }
            assert!(
                (r.determinant() - 1.0).abs() < 1e-6,
                "{}: det(R) = {}",
                calib.id.name(),
                r.determinant()
            );
        }
    }

    #[test]
    fn table_is_stored_in_resolution_order() {
        let table = CalibrationTable::nuscenes_ring();
        for (calib, id) in table
            .in_resolution_order()
            .iter()
            .zip(CameraId::RESOLUTION_ORDER)
        {
            assert_eq!(calib.id, id);
            assert_eq!(table.get(id).id, id);
        }
    }

    #[test]
    fn rotation_literals_keep_row_major_meaning() {
        let m = mat3_from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        // Row 0 of the literal must act as row 0 of the matrix.
        let v = m * glam::DVec3::new(1.0, 0.0, 0.0);
        assert_eq!((v.x, v.y, v.z), (1.0, 4.0, 7.0));
    }
}
