//! Back-projection of bird's-eye-view map clicks onto a six-camera ring.
//!
//! A click on the BEV map is turned into an ego-frame target, snapped to the
//! nearest semantically eligible LiDAR point, resolved to the first camera
//! that actually observes that point, and reprojected into that camera's
//! pixel space to seed a segmentation prompt. The final stage cuts the
//! camera image down to the mask the segmentation collaborator returns.
//!
//! Everything here is per-click and stateless; the only long-lived object is
//! the read-only [`calib::CalibrationTable`], built once at startup.

pub mod bev;
pub mod calib;
pub mod cloud;
pub mod crop;
pub mod error;
pub mod pipeline;
pub mod project;
pub mod prompt;
pub mod visibility;

pub use error::Error;
