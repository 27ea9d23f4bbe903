use std::sync::Arc;
use std::time::Instant;

use api::gen::api::v1::{
    click_gateway_server::ClickGateway, ClickRequest, ClickResponse, PromptPoint as PbPromptPoint,
};
use backproject::calib::CalibrationTable;
use backproject::crop::mask_crop;
use backproject::pipeline::resolve_click;
use backproject::prompt::prompt_points;
use backproject::Error as PipelineError;
use tonic::{Request, Response, Status};

use crate::metrics::GatewayMetrics;
use crate::scene::SceneStore;
use crate::segmenter::{Segmenter, SegmenterError};

pub struct GatewaySvc {
    pub table: Arc<CalibrationTable>,
    pub scene: Arc<SceneStore>,
    pub segmenter: Segmenter,
    pub metrics: Arc<GatewayMetrics>,
    pub default_closest_points: usize,
}

/// Maps a geometry-pipeline failure onto the wire.
///
/// Every variant is local to one click; nothing here is fatal to the service.
fn pipeline_status(err: &PipelineError) -> Status {
    match err {
        PipelineError::EmptyCandidateSet(_) => Status::failed_precondition(err.to_string()),
        PipelineError::OutsideBev { .. } => Status::invalid_argument(err.to_string()),
        PipelineError::EmptyMask => Status::not_found(err.to_string()),
        PipelineError::MalformedCloud { .. } | PipelineError::Io(_) => {
            Status::internal(err.to_string())
        }
    }
}

fn segmenter_status(err: &SegmenterError) -> Status {
    match err {
        SegmenterError::Encode(_) => Status::internal(err.to_string()),
        _ => Status::unavailable(err.to_string()),
    }
}

#[tonic::async_trait]
impl ClickGateway for GatewaySvc {
    async fn resolve_click(
        &self,
        req: Request<ClickRequest>,
    ) -> Result<Response<ClickResponse>, Status> {
        let started = Instant::now();
        self.metrics.clicks_total.inc();

        let req = req.into_inner();
        let click_id = uuid::Uuid::new_v4().to_string();
        // `tolerance` is accepted for interface parity with the UI slider but
        // not consumed by the resolver.
        let k = if req.closest_points == 0 {
            self.default_closest_points
        } else {
            req.closest_points as usize
        };

        tracing::debug!(click_id, row = req.row, col = req.col, k, "Resolving click");

        let cloud = self.scene.load_cloud().map_err(|e| {
            self.metrics.clicks_failed_total.inc();
            tracing::error!(click_id, error = %e, "Failed to load LiDAR cloud");
            pipeline_status(&e)
        })?;

        let outcome = resolve_click(&self.scene.bev, &cloud, &self.table, req.row, req.col, k)
            .map_err(|e| {
                self.metrics.clicks_failed_total.inc();
                tracing::warn!(click_id, error = %e, "Click did not resolve");
                pipeline_status(&e)
            })?;

        if !outcome.selection.found {
            self.metrics.camera_fallbacks_total.inc();
            tracing::warn!(
                click_id,
                camera = outcome.selection.camera.name(),
                "No camera passed the visibility test; using the front camera with low confidence"
            );
        }

        let prompts = prompt_points(&outcome.selection.pixels);
        let camera_image = self.scene.camera(outcome.selection.camera);

        let mask = self
            .segmenter
            .segment(camera_image, &prompts)
            .await
            .map_err(|e| {
                self.metrics.clicks_failed_total.inc();
                self.metrics.segmentation_errors_total.inc();
                tracing::warn!(click_id, error = %e, "Segmentation collaborator failed");
                segmenter_status(&e)
            })?;

        let crop = mask_crop(camera_image, &mask).map_err(|e| {
            self.metrics.clicks_failed_total.inc();
            tracing::warn!(click_id, error = %e, "Mask produced no croppable region");
            pipeline_status(&e)
        })?;

        let mut crop_png = Vec::new();
        crop.write_to(
            &mut std::io::Cursor::new(&mut crop_png),
            image::ImageOutputFormat::Png,
        )
        .map_err(|e| {
            self.metrics.clicks_failed_total.inc();
            Status::internal(format!("failed to encode crop: {e}"))
        })?;

        self.metrics
            .last_click_seconds
            .set(started.elapsed().as_secs_f64());
        tracing::info!(
            click_id,
            camera = outcome.selection.camera.name(),
            found = outcome.selection.found,
            candidates = outcome.candidates.len(),
            crop_bytes = crop_png.len(),
            "Click resolved"
        );

        Ok(Response::new(ClickResponse {
            camera: outcome.selection.camera.name().to_owned(),
            found: outcome.selection.found,
            prompts: prompts
                .iter()
                .map(|p| PbPromptPoint {
                    x: p.x,
                    y: p.y,
                    label: p.label,
                })
                .collect(),
            crop_png,
            schema_version: 1,
        }))
    }
}
