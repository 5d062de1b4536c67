//! Image preprocessing ahead of recognition.
//!
//! Screen text is rendered at small pixel sizes; tesseract's accuracy on
//! raw screenshots is poor. Upscaling with a bicubic filter, plus the
//! optional invert / grayscale / hard-threshold transforms, matches what
//! the tool has always done.

use crate::config::OcrSettings;
use image::imageops::FilterType;
use image::{DynamicImage, Luma};

/// Apply the configured transforms to an image, returning the image that
/// will be handed to tesseract. Coordinates in the result are `scale_factor`
/// times the input coordinates.
pub fn preprocess(img: &DynamicImage, settings: &OcrSettings) -> DynamicImage {
    let width = img.width() * settings.scale_factor;
    let height = img.height() * settings.scale_factor;
    let mut out = img.resize_exact(width, height, FilterType::CatmullRom);

    if settings.invert {
        out.invert();
    }

    // black_white implies grayscale: thresholding operates on luma.
    if settings.grayscale || settings.black_white {
        out = DynamicImage::ImageLuma8(out.to_luma8());
    }

    if settings.black_white {
        let threshold = settings.black_white_threshold;
        let mut luma = out.to_luma8();
        for pixel in luma.pixels_mut() {
            *pixel = if pixel.0[0] > threshold { Luma([255]) } else { Luma([0]) };
        }
        out = DynamicImage::ImageLuma8(luma);
    }

    out
}
