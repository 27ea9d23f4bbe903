use crate::bev::{self, LabelSet};
use crate::calib::CalibrationTable;
use crate::cloud::{LidarCloud, LidarPoint};
use crate::error::{Error, Result};
use crate::visibility::{self, CameraSelection};
use glam::DVec3;
use image::RgbImage;

/// Everything the geometry stages determine for one click.
#[derive(Debug, Clone)]
pub struct ClickOutcome {
    /// Approximate ego-frame point under the click.
    pub target: DVec3,
    /// Label set chosen from the clicked pixel's colour.
    pub label_set: LabelSet,
    /// Nearest eligible LiDAR points, closest first.
    pub candidates: Vec<LidarPoint>,
    /// The camera that observes the candidates, with their projections.
    pub selection: CameraSelection,
}

/// Runs the geometric half of the pipeline for one BEV click: pixel to ego
/// target, label-filtered nearest neighbours, camera visibility resolution.
///
/// Segmentation and cropping stay with the caller; they involve the external
/// collaborator and the camera images, neither of which this crate owns.
pub fn resolve_click(
    bev_image: &RgbImage,
    cloud: &LidarCloud,
    table: &CalibrationTable,
    row: u32,
    col: u32,
    k: usize,
) -> Result<ClickOutcome> {
    let (width, height) = bev_image.dimensions();
    if col >= width || row >= height {
        return Err(Error::OutsideBev { row, col });
    }

    let label_set = LabelSet::for_pixel(bev_image.get_pixel(col, row).0);
    let target = bev::click_target(row, col);

    let candidates = cloud.k_closest(target, label_set, k)?;
    let positions: Vec<DVec3> = candidates.iter().map(|p| p.position()).collect();
    let selection = visibility::resolve(table, &positions);

    Ok(ClickOutcome {
        target,
        label_set,
        candidates,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calib::CameraId;
    use image::Rgb;

    fn bev_with_blue_pixel(row: u32, col: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([90, 90, 90]));
        img.put_pixel(col, row, Rgb([0, 0, 255]));
        img
    }

    fn cloud_around(x: f64, y: f64) -> LidarCloud {
        LidarCloud::new(vec![
            LidarPoint { x, y, z: 0.5, label: 14 },
            LidarPoint { x: x + 0.5, y, z: 0.4, label: 15 },
            LidarPoint { x: -x, y: -y, z: 0.3, label: 26 },
        ])
    }

    #[test]
    fn blue_click_snaps_to_a_segmentation_point_and_finds_a_camera() {
        // Click maps to ego (8, 8); the nearest segmentation-class point
        // sits right there and is visible front-left.
        let bev = bev_with_blue_pixel(116, 116);
        let cloud = cloud_around(8.0, 8.0);
        let table = CalibrationTable::nuscenes_ring();

        let outcome = resolve_click(&bev, &cloud, &table, 116, 116, 1).unwrap();
        assert_eq!(outcome.label_set, LabelSet::Segmentation);
        assert_eq!(outcome.target, DVec3::new(8.0, 8.0, 0.0));
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].label, 14);
        assert_eq!(outcome.selection.camera, CameraId::FrontLeft);
        assert!(outcome.selection.found);
    }

    #[test]
    fn non_blue_click_searches_hdmap_classes() {
        let bev = RgbImage::from_pixel(200, 200, Rgb([90, 90, 90]));
        let cloud = cloud_around(8.0, 8.0);
        let table = CalibrationTable::nuscenes_ring();

        let outcome = resolve_click(&bev, &cloud, &table, 116, 116, 1).unwrap();
        assert_eq!(outcome.label_set, LabelSet::HdMap);
        assert_eq!(outcome.candidates[0].label, 26);
    }

    #[test]
    fn click_outside_the_bev_image_is_rejected() {
        let bev = RgbImage::new(200, 200);
        let cloud = cloud_around(1.0, 1.0);
        let table = CalibrationTable::nuscenes_ring();

        let err = resolve_click(&bev, &cloud, &table, 5, 200, 1).unwrap_err();
        assert!(matches!(err, Error::OutsideBev { row: 5, col: 200 }));
    }

    #[test]
    fn empty_candidate_set_propagates() {
        let bev = bev_with_blue_pixel(116, 116);
        // Only HD-map labels present; a blue click wants segmentation ones.
        let cloud = LidarCloud::new(vec![LidarPoint { x: 8.0, y: 8.0, z: 0.0, label: 25 }]);
        let table = CalibrationTable::nuscenes_ring();

        let err = resolve_click(&bev, &cloud, &table, 116, 116, 1).unwrap_err();
        assert!(matches!(err, Error::EmptyCandidateSet(LabelSet::Segmentation)));
    }
}
