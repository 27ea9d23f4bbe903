use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, Rgb, RgbImage};

/// Zeroes `image` outside `mask`, then crops to the tight bounding box of
/// whatever survives.
///
/// The mask is resampled to the image's resolution with nearest-neighbour
/// interpolation when the collaborator returns a different size; any non-zero
/// mask value selects a pixel. Returns [`Error::EmptyMask`] when nothing
/// survives (either the mask is empty, or it only covers black pixels),
/// because a bounding box over nothing is undefined.
pub fn mask_crop(image: &RgbImage, mask: &GrayImage) -> Result<RgbImage> {
    let (width, height) = image.dimensions();

    let resized;
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        resized = imageops::resize(mask, width, height, FilterType::Nearest);
        &resized
    };

    let mut masked = image.clone();
    for (x, y, px) in masked.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == 0 {
            *px = Rgb([0, 0, 0]);
        }
    }

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;
    for (x, y, px) in masked.enumerate_pixels() {
        if px.0 != [0, 0, 0] {
            any = true;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return Err(Error::EmptyMask);
    }

    Ok(imageops::crop_imm(&masked, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image())
}
