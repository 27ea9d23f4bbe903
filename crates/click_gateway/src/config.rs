use clap::Parser;
use std::path::PathBuf;

/// `click_gateway` - the BEV click resolution service of the visual-QA demo.
///
/// One gRPC call per user click on the bird's-eye-view map: the gateway
/// back-projects the click onto the six-camera ring, asks the external
/// segmentation collaborator for a mask seeded by the projected points, and
/// returns the cropped region of the chosen camera image.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// The listen address for the gateway's own gRPC service.
    #[arg(long, env = "GATEWAY_GRPC_LISTEN_ADDR")]
    pub grpc_listen_addr: String,

    /// The listen address for the gateway's Prometheus metrics server.
    ///
    /// Metrics are exposed in a format that can be scraped by a Prometheus
    /// instance.
    #[arg(long, env = "GATEWAY_METRICS_LISTEN_ADDR")]
    pub metrics_listen_addr: String,

    /// The gRPC address of the external segmentation collaborator.
    #[arg(long, env = "SEGMENTER_GRPC_ADDR")]
    pub segmenter_grpc_addr: String,

    /// Directory holding one scene: `bev.png`, the six `CAM_*.png` camera
    /// images and `lidar.npy`.
    ///
    /// The BEV and camera images are loaded once at startup. The LiDAR cloud
    /// is re-read for every click, so a newer frame can be dropped in while
    /// the service is running.
    #[arg(long, env = "SCENE_DIR")]
    pub scene_dir: PathBuf,

    /// Hard deadline for one segmentation call, in milliseconds.
    #[arg(long, env = "SEGMENT_TIMEOUT_MS", default_value_t = 30_000)]
    pub segment_timeout_ms: u64,

    /// Default number of nearest LiDAR points back-projected per click.
    ///
    /// Requests may override this per click.
    #[arg(long, env = "CLOSEST_POINTS", default_value_t = 1)]
    pub closest_points: usize,
}
