use crate::project::ProjectedPoint;

/// Square inference image side forwarded to the segmentation collaborator.
pub const SEGMENT_IMAGE_SIZE: u32 = 2048;

/// Detection confidence threshold for the segmentation collaborator.
pub const SEGMENT_CONFIDENCE: f32 = 0.4;

/// NMS IoU threshold for the segmentation collaborator.
pub const SEGMENT_IOU: f32 = 0.9;

/// Prompt label marking a point as foreground.
pub const POSITIVE_PROMPT: u32 = 1;

/// An integer pixel prompt for the promptable segmentation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPoint {
    pub x: i32,
    pub y: i32,
    pub label: u32,
}

/// Converts retained projections into positive point prompts.
///
/// Coordinates truncate toward zero, matching the integer cast the
/// segmentation side expects. Every prompt is positive; the mask is seeded
/// from the back-projected points only.
pub fn prompt_points(pixels: &[ProjectedPoint]) -> Vec<PromptPoint> {
    pixels
        .iter()
        .map(|p| PromptPoint {
            x: p.u as i32,
            y: p.v as i32,
            label: POSITIVE_PROMPT,
        })
        .collect()
}
