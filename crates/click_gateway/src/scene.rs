use anyhow::{Context, Result};
use backproject::calib::CameraId;
use backproject::cloud::LidarCloud;
use backproject::visibility::{IMAGE_HEIGHT, IMAGE_WIDTH};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// The images of one scene, loaded at startup and shared read-only.
///
/// Only the LiDAR cloud goes back to disk per click; see
/// [`SceneStore::load_cloud`].
pub struct SceneStore {
    pub bev: RgbImage,
    cameras: [RgbImage; 6],
    lidar_path: PathBuf,
}

fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to load {}", path.display()))?
        .to_rgb8();
    Ok(img)
}

impl SceneStore {
    /// Loads `bev.png` and the six `CAM_*.png` images from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let bev = load_rgb(&dir.join("bev.png"))?;

        let mut cameras = Vec::with_capacity(6);
        for id in CameraId::RESOLUTION_ORDER {
            let img = load_rgb(&dir.join(format!("{}.png", id.name())))?;
            let (width, height) = img.dimensions();
            if (width, height) != (IMAGE_WIDTH, IMAGE_HEIGHT) {
                tracing::warn!(
                    camera = id.name(),
                    width,
                    height,
                    "Camera image is not the ring's native resolution"
                );
            }
            cameras.push(img);
        }
        let cameras: [RgbImage; 6] = cameras
            .try_into()
            .map_err(|_| anyhow::anyhow!("camera image set incomplete"))?;

        Ok(Self {
            bev,
            cameras,
            lidar_path: dir.join("lidar.npy"),
        })
    }

    /// The raw image for one ring camera.
    #[inline]
    pub fn camera(&self, id: CameraId) -> &RgbImage {
        &self.cameras[id.ring_index()]
    }

    /// Re-reads the LiDAR cloud from disk; called once per click.
    pub fn load_cloud(&self) -> backproject::error::Result<LidarCloud> {
        LidarCloud::from_npy_file(&self.lidar_path)
    }
}
