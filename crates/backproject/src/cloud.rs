use crate::bev::LabelSet;
use crate::error::{Error, Result};
use glam::DVec3;
use std::path::Path;

/// One LiDAR return: ego-frame position plus semantic class id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidarPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub label: u32,
}

impl LidarPoint {
    /// Ego-frame position.
    #[inline]
    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Distance to `target` in the ground plane.
    ///
    /// Map clicks carry no usable height, so z never contributes.
    #[inline]
    pub fn ground_distance(&self, target: DVec3) -> f64 {
        let dx = self.x - target.x;
        let dy = self.y - target.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An in-memory LiDAR frame, loaded fresh for every click.
#[derive(Debug, Clone, Default)]
pub struct LidarCloud {
    points: Vec<LidarPoint>,
}

impl LidarCloud {
    pub fn new(points: Vec<LidarPoint>) -> Self {
        Self { points }
    }

    /// Loads a cloud from a persisted `.npy` array.
    ///
    /// Rows are points; the first three columns are x, y, z and the last
    /// column is the integer semantic label. Extra columns in between
    /// (intensity, timestamps) are ignored.
    pub fn from_npy_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_array(&npy::read_file(path)?)
    }

    pub fn from_array(arr: &npy::NpyArray) -> Result<Self> {
        if arr.cols < 4 {
            return Err(Error::MalformedCloud { cols: arr.cols });
        }

        let points = arr
            .rows_iter()
            .map(|row| LidarPoint {
                x: row[0],
                y: row[1],
                z: row[2],
                label: row[arr.cols - 1] as u32,
            })
            .collect();

        Ok(Self { points })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` eligible points closest to `target` in the ground plane,
    /// nearest first.
    ///
    /// Filters to `labels`, fully sorts the remainder by 2-D distance and
    /// takes the prefix; the sort is stable, so equidistant points keep their
    /// scan order. Returns fewer than `k` points when fewer are eligible and
    /// [`Error::EmptyCandidateSet`] when none are. This runs once per click
    /// on at most a LiDAR frame's worth of points, so the full sort is fine.
    pub fn k_closest(&self, target: DVec3, labels: LabelSet, k: usize) -> Result<Vec<LidarPoint>> {
        let mut eligible: Vec<&LidarPoint> = self
            .points
            .iter()
            .filter(|p| labels.contains(p.label))
            .collect();

        if eligible.is_empty() {
            return Err(Error::EmptyCandidateSet(labels));
        }

        eligible.sort_by(|a, b| {
            a.ground_distance(target)
                .total_cmp(&b.ground_distance(target))
        });

        Ok(eligible.into_iter().take(k).copied().collect())
    }
}
