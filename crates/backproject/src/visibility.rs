use crate::calib::{CalibrationTable, CameraId};
use crate::project::{project_into, ProjectedPoint};
use glam::DVec3;

/// Native width of every ring camera image, in pixels.
pub const IMAGE_WIDTH: u32 = 1600;

/// Native height of every ring camera image, in pixels.
pub const IMAGE_HEIGHT: u32 = 900;

/// Points closer than this (or behind the camera) are never visible.
pub const MIN_DEPTH_M: f64 = 1.0;

/// Projections this close to the image edge are rejected.
pub const EDGE_MARGIN_PX: f64 = 1.0;

/// Outcome of visibility resolution for a set of candidate points.
#[derive(Debug, Clone)]
pub struct CameraSelection {
    pub camera: CameraId,
    /// The projections that passed the visibility test, or, when `found` is
    /// false, every candidate projected through the fallback camera with no
    /// filtering at all.
    pub pixels: Vec<ProjectedPoint>,
    /// True when some camera passed the visibility test.
    pub found: bool,
}

/// True when a projection lands inside the image bounds with usable depth.
#[inline]
pub fn is_visible(p: &ProjectedPoint) -> bool {
    p.depth > MIN_DEPTH_M
        && p.u > EDGE_MARGIN_PX
        && p.u < IMAGE_WIDTH as f64 - EDGE_MARGIN_PX
        && p.v > EDGE_MARGIN_PX
        && p.v < IMAGE_HEIGHT as f64 - EDGE_MARGIN_PX
}

/// Scans the ring in resolution order and selects the first camera that sees
/// at least one candidate, keeping only the passing projections.
///
/// This is a priority-ordered scan with short-circuit, not a best-camera
/// search; later cameras are never evaluated once one passes. When no camera
/// passes, the front camera is selected with `found = false` and every
/// candidate projected unfiltered. Those projections may land outside the
/// image; callers are expected to surface the low confidence rather than
/// re-check the predicate here.
pub fn resolve(table: &CalibrationTable, candidates: &[DVec3]) -> CameraSelection {
    for calib in table.in_resolution_order() {
        let passing: Vec<ProjectedPoint> = project_into(calib, candidates)
            .into_iter()
            .filter(is_visible)
            .collect();

        if !passing.is_empty() {
            return CameraSelection {
                camera: calib.id,
                pixels: passing,
                found: true,
            };
        }
    }

    let front = table.get(CameraId::Front);
    CameraSelection {
        camera: CameraId::Front,
        pixels: project_into(front, candidates),
        found: false,
    }
}
