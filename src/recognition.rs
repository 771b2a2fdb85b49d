//! Detection and recognition collaborators consumed by the page pipeline.

use anyhow::Result;
use image::{DynamicImage, GrayImage};

use crate::region::{BBox, Detection};
use crate::text::is_japanese_char;

const MIN_TEXT_CHARS: usize = 2;
const MIN_LAPLACIAN_VARIANCE: f64 = 50.0;
const MIN_CONTRAST: u8 = 30;
const MIN_DARK_RATIO: f64 = 0.05;
const DARK_LUMA: u8 = 128;

pub trait Detector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Text recognition for one cropped region plus the checks that decide
/// whether its output is trusted.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, crop: &DynamicImage, bbox: &BBox) -> Result<String>;

    /// Rejects short output and crops that are blurry, flat or nearly empty.
    fn is_valid(&self, text: &str, crop: &DynamicImage) -> bool {
        if text.trim().chars().count() < MIN_TEXT_CHARS {
            return false;
        }
        let stats = CropStats::measure(crop);
        stats.laplacian_variance >= MIN_LAPLACIAN_VARIANCE
            && stats.contrast >= MIN_CONTRAST
            && stats.dark_ratio >= MIN_DARK_RATIO
    }

    fn is_plausible_script(&self, text: &str) -> bool {
        is_plausible_japanese(text)
    }
}

/// At least half the characters are Japanese and no single character makes up
/// more than 70% of the text.
pub fn is_plausible_japanese(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return false;
    }
    let total = chars.len() as f64;
    let japanese = chars.iter().filter(|ch| is_japanese_char(**ch)).count() as f64;
    if japanese < total * 0.5 {
        return false;
    }
    let mut counts = std::collections::HashMap::new();
    for ch in &chars {
        *counts.entry(*ch).or_insert(0usize) += 1;
    }
    counts.values().all(|count| (*count as f64) <= total * 0.7)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropStats {
    pub laplacian_variance: f64,
    pub contrast: u8,
    pub dark_ratio: f64,
}

impl CropStats {
    pub fn measure(crop: &DynamicImage) -> Self {
        let gray = grayscale(crop);
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Self {
                laplacian_variance: 0.0,
                contrast: 0,
                dark_ratio: 0.0,
            };
        }

        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let mut dark = 0usize;
        for pixel in gray.pixels() {
            let value = pixel[0];
            min = min.min(value);
            max = max.max(value);
            if value < DARK_LUMA {
                dark += 1;
            }
        }
        let total = (width as usize * height as usize) as f64;
        Self {
            laplacian_variance: laplacian_variance(&gray),
            contrast: max - min,
            dark_ratio: dark as f64 / total,
        }
    }
}

/// Luma of the crop composited over white.
fn grayscale(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut luma = GrayImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let r = r as f32 * alpha + 255.0 * (1.0 - alpha);
        let g = g as f32 * alpha + 255.0 * (1.0 - alpha);
        let b = b as f32 * alpha + 255.0 * (1.0 - alpha);
        let value = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
        luma.put_pixel(x, y, image::Luma([value]));
    }
    luma
}

/// Variance of the 4-neighbour Laplacian, edges replicated.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let at = |x: i64, y: i64| -> f64 {
        let x = x.clamp(0, width as i64 - 1) as u32;
        let y = y.clamp(0, height as i64 - 1) as u32;
        gray.get_pixel(x, y)[0] as f64
    };

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let value =
                at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += value;
            sum_sq += value * value;
        }
    }
    let count = (width as f64) * (height as f64);
    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}
