use std::time::Duration;

use api::gen::api::v1::{
    segmenter_client::SegmenterClient, PromptPoint as PbPromptPoint, SegmentParams, SegmentRequest,
};
use backproject::prompt::{PromptPoint, SEGMENT_CONFIDENCE, SEGMENT_IMAGE_SIZE, SEGMENT_IOU};
use image::{GrayImage, RgbImage};
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};

#[derive(Debug, Error)]
pub enum SegmenterError {
    #[error("segmentation call failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("segmentation did not answer within {0:?}")]
    Timeout(Duration),

    #[error("collaborator returned {got} mask bytes for a {width}x{height} mask")]
    BadMask { got: usize, width: u32, height: u32 },

    #[error("failed to encode camera image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Client handle for the external promptable segmentation service.
///
/// Cheap to clone; each call clones the underlying channel handle, so one
/// handle can serve concurrent clicks.
#[derive(Clone)]
pub struct Segmenter {
    client: SegmenterClient<Channel>,
    timeout: Duration,
}

impl Segmenter {
    pub async fn connect(grpc_addr: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Endpoint::from_shared(grpc_addr.to_owned())?
            .keep_alive_while_idle(true)
            .http2_keep_alive_interval(Duration::from_secs(30))
            .keep_alive_timeout(Duration::from_secs(20))
            .connect_timeout(Duration::from_secs(5));
        let channel = endpoint.connect().await?;
        Ok(Self {
            client: SegmenterClient::new(channel),
            timeout,
        })
    }

    /// Asks the collaborator for a mask on `image`, seeded by `prompts`.
    ///
    /// The call runs under the configured deadline; an overrun or transport
    /// failure is an error for this click only, never fatal to the service.
    pub async fn segment(
        &self,
        image: &RgbImage,
        prompts: &[PromptPoint],
    ) -> Result<GrayImage, SegmenterError> {
        let mut png = Vec::new();
        image.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )?;

        let request = SegmentRequest {
            image_png: png,
            points: prompts
                .iter()
                .map(|p| PbPromptPoint {
                    x: p.x,
                    y: p.y,
                    label: p.label,
                })
                .collect(),
            params: Some(SegmentParams {
                image_size: SEGMENT_IMAGE_SIZE,
                confidence: SEGMENT_CONFIDENCE,
                iou_threshold: SEGMENT_IOU,
            }),
            schema_version: 1,
        };

        let mut client = self.client.clone();
        let response = tokio::time::timeout(self.timeout, client.segment_points(request))
            .await
            .map_err(|_| SegmenterError::Timeout(self.timeout))??
            .into_inner();

        let (width, height) = (response.width, response.height);
        let got = response.mask.len();
        if got != width as usize * height as usize {
            return Err(SegmenterError::BadMask { got, width, height });
        }

        GrayImage::from_raw(width, height, response.mask)
            .ok_or(SegmenterError::BadMask { got, width, height })
    }
}
