//! Image cleanup ahead of OCR: grayscale, light blur, Otsu binarization.

use crate::config::PreprocessSettings;

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

pub fn preprocess(image: &DynamicImage, settings: &PreprocessSettings) -> GrayImage {
    let mut gray = image.to_luma8();
    debug!("image converted to grayscale ({}x{})", gray.width(), gray.height());

    if !settings.enabled {
        return gray;
    }

    if settings.blur_sigma > 0.0 {
        gray = gaussian_blur_f32(&gray, settings.blur_sigma);
        debug!("gaussian blur applied (sigma={})", settings.blur_sigma);
    }

    if settings.threshold {
        let level = otsu_level(&gray);
        gray = threshold(&gray, level, ThresholdType::Binary);
        debug!("otsu threshold applied (level={level})");
    }

    gray
}
