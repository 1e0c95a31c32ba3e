//! Fixed contrast and brightness adjustment applied before an image is saved.
//!
//! Both operations blend the image with a degenerate version of itself, the
//! way classic imaging libraries implement enhancement: contrast blends with
//! a flat image at the mean luminance, brightness blends with black.

use image::{DynamicImage, RgbaImage};

pub const CONTRAST_FACTOR: f32 = 2.0;
pub const BRIGHTNESS_FACTOR: f32 = 0.1;

/// Contrast ×2 then brightness ×0.1.
pub fn enhance(img: &DynamicImage) -> RgbaImage {
    let contrasted = adjust_contrast(&img.to_rgba8(), CONTRAST_FACTOR);
    adjust_brightness(&contrasted, BRIGHTNESS_FACTOR)
}

pub fn adjust_contrast(img: &RgbaImage, factor: f32) -> RgbaImage {
    let mean = mean_luminance(img) as f32;
    map_rgb(img, |c| blend(mean, c, factor))
}

pub fn adjust_brightness(img: &RgbaImage, factor: f32) -> RgbaImage {
    map_rgb(img, |c| blend(0.0, c, factor))
}

/// ITU-R 601 luma in 16-bit fixed point, averaged and rounded half-up.
fn mean_luminance(img: &RgbaImage) -> u8 {
    let count = u64::from(img.width()) * u64::from(img.height());
    if count == 0 {
        return 0;
    }
    let sum: u64 = img
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            (u64::from(r) * 19595 + u64::from(g) * 38470 + u64::from(b) * 7471 + 0x8000) >> 16
        })
        .sum();
    ((sum as f64 / count as f64) + 0.5) as u8
}

fn blend(degenerate: f32, channel: u8, factor: f32) -> u8 {
    (degenerate + factor * (f32::from(channel) - degenerate)).clamp(0.0, 255.0) as u8
}

fn map_rgb(img: &RgbaImage, f: impl Fn(u8) -> u8) -> RgbaImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        pixel.0 = [f(r), f(g), f(b), a];
    }
    out
}
