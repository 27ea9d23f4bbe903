use crate::bev::LabelSet;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong inside one click's geometry pipeline.
///
/// All of these are local to a single click and recoverable; none of them
/// invalidates the calibration table or any other shared state.
#[derive(Debug, Error)]
pub enum Error {
    /// No LiDAR point carries a label from the active eligibility set, so
    /// nearest-neighbour search has nothing to return.
    #[error("no LiDAR point carries an eligible {0:?} label near this click")]
    EmptyCandidateSet(LabelSet),

    /// The persisted cloud does not have x, y, z and a trailing label column.
    #[error("LiDAR array needs x, y, z and a label column; got {cols} columns")]
    MalformedCloud { cols: usize },

    /// The click landed outside the BEV image.
    #[error("click ({row}, {col}) is outside the BEV image")]
    OutsideBev { row: u32, col: u32 },

    /// The segmentation mask selects nothing, so the bounding-box crop is
    /// undefined.
    #[error("segmentation mask selects no pixels; nothing to crop")]
    EmptyMask,

    #[error("failed to read LiDAR cloud: {0}")]
    Io(#[from] std::io::Error),
}
