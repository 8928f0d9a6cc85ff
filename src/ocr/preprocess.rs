use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::path::Path;

/// Width every table screenshot is scaled to before OCR.
pub const TARGET_WIDTH: u32 = 3000;

/// Share of pixels clipped at each end of the histogram when stretching contrast.
const CLIP_FRACTION: f64 = 0.01;

/// Unsharp-mask blur radius.
const SHARPEN_SIGMA: f32 = 1.0;

/// Minimum brightness difference the unsharp mask will boost.
const SHARPEN_THRESHOLD: i32 = 2;

/// Loads a table screenshot and prepares it for Tesseract.
///
/// Returns the processed image encoded as PNG.
pub fn preprocess_image(path: &Path) -> Result<Vec<u8>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load image: {}", path.display()))?;
    let prepared = prepare_for_ocr(&img);
    encode_png(&prepared)
}

/// Greyscale, contrast stretch, sharpen, then scale to [`TARGET_WIDTH`].
pub fn prepare_for_ocr(img: &DynamicImage) -> GrayImage {
    let grey = img.to_luma8();
    let normalized = normalize_contrast(&grey);
    let sharpened = imageops::unsharpen(&normalized, SHARPEN_SIGMA, SHARPEN_THRESHOLD);
    resize_to_width(&sharpened, TARGET_WIDTH)
}

/// Stretches luminance so the 1st and 99th percentiles map to black and white.
///
/// Images with a single brightness level are returned unchanged.
pub fn normalize_contrast(img: &GrayImage) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    let clip = (total as f64 * CLIP_FRACTION) as u64;

    let low = percentile_bound(histogram.iter().enumerate(), clip);
    let high = percentile_bound(histogram.iter().enumerate().rev(), clip);

    let (Some(low), Some(high)) = (low, high) else {
        return img.clone();
    };
    if high <= low {
        return img.clone();
    }

    let range = (high - low) as f32;
    let mut output = img.clone();
    for pixel in output.pixels_mut() {
        let value = pixel[0].clamp(low, high);
        let stretched = ((value - low) as f32 * 255.0 / range).round();
        *pixel = Luma([stretched as u8]);
    }
    output
}

/// First brightness level at which the running pixel count exceeds `clip`.
fn percentile_bound<'a>(
    levels: impl Iterator<Item = (usize, &'a u64)>,
    clip: u64,
) -> Option<u8> {
    let mut seen = 0u64;
    for (level, count) in levels {
        seen += count;
        if seen > clip {
            return Some(level as u8);
        }
    }
    None
}

/// Scales to `width`, keeping the aspect ratio. Smaller images are enlarged.
pub fn resize_to_width(img: &GrayImage, width: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || w == width {
        return img.clone();
    }

    let height = ((h as u64 * width as u64 + w as u64 / 2) / w as u64).max(1) as u32;
    imageops::resize(img, width, height, FilterType::Lanczos3)
}

/// Encodes a greyscale image as PNG bytes.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .context("Failed to encode preprocessed image")?;
    Ok(buffer.into_inner())
}
