//! Tile background gradients
//!
//! Derives a two-color CSS gradient from a tile's icon. Icons with a
//! uniform outer color get that color paired with a brightened variant;
//! anything else goes through a median-cut quantization over the whole
//! image. Computed pairs are persisted per tile and never recomputed while
//! a record exists.

use crate::error::GradientError;
use crate::store::GradientStore;
use crate::types::{GradientPair, GradientRecord};
use image::GenericImageView;
use std::path::Path;
use tracing::{debug, warn};

/// Sentinel pair returned when an icon cannot be decoded at all.
pub const FALLBACK_GRADIENT: (&str, &str) = ("orange", "purple");

/// Alpha threshold below which a pixel is ignored during quantization.
const MIN_QUANTIZE_ALPHA: u8 = 125;

/// Derive a gradient pair from a readable icon image.
///
/// Never fails: an undecodable image yields the documented fallback pair,
/// and a degenerate palette falls back to the dominant color.
pub fn extract_gradient(icon_path: &Path) -> GradientPair {
    let image = match image::open(icon_path) {
        Ok(image) => image,
        Err(e) => {
            warn!(path = %icon_path.display(), error = %e, "icon not decodable, using fallback gradient");
            return GradientPair {
                left: FALLBACK_GRADIENT.0.to_string(),
                right: FALLBACK_GRADIENT.1.to_string(),
            };
        }
    };
    let rgba = image.to_rgba8();
    let (width, height) = image.dimensions();

    // Prefer a brightness gradient when the outer color is consistent.
    let probes = [
        *rgba.get_pixel(0, height / 2),          // left edge
        *rgba.get_pixel(width / 2, 0),           // top edge
        *rgba.get_pixel(width - 1, height / 2),  // right edge
        *rgba.get_pixel(width / 2, height - 1),  // bottom edge
    ];
    if probes.iter().all(|p| p.0 == probes[0].0) {
        let [r, g, b, a] = probes[0].0;
        let (br, bg, bb, ba) = brighten_color(r, g, b, a);
        return GradientPair {
            left: rgba_to_string(r, g, b, 255.0),
            right: rgba_to_string(br, bg, bb, ba),
        };
    }

    match palette_gradient(&rgba) {
        Ok(pair) => pair,
        Err(GradientError::EmptyPalette) => {
            warn!(path = %icon_path.display(), "no usable color data, using fallback gradient");
            GradientPair {
                left: FALLBACK_GRADIENT.0.to_string(),
                right: FALLBACK_GRADIENT.1.to_string(),
            }
        }
        Err(GradientError::Decode(e)) => {
            warn!(path = %icon_path.display(), error = %e, "using fallback gradient");
            GradientPair {
                left: FALLBACK_GRADIENT.0.to_string(),
                right: FALLBACK_GRADIENT.1.to_string(),
            }
        }
    }
}

fn palette_gradient(rgba: &image::RgbaImage) -> Result<GradientPair, GradientError> {
    let mut pixels = Vec::new();
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        // Ignore transparent and near-white pixels, like the quantizers
        // favicon palettes are usually built with.
        if a >= MIN_QUANTIZE_ALPHA && !(r > 250 && g > 250 && b > 250) {
            pixels.push([r, g, b]);
        }
    }
    if pixels.is_empty() {
        return Err(GradientError::EmptyPalette);
    }

    let dominant = average_color(&pixels);
    let palette = median_cut(&pixels, 2);

    let (left, right) = match palette.as_slice() {
        [] => return Err(GradientError::EmptyPalette),
        [only] => (dominant, *only),
        [first, second, ..] => (*first, *second),
    };

    Ok(GradientPair {
        left: rgba_to_string(left[0], left[1], left[2], 255.0),
        right: rgba_to_string(right[0], right[1], right[2], 255.0),
    })
}

/// Generate the brightened half of a uniform-color gradient.
///
/// Lightness is scaled by 1.5 from a floor of 1 and clamped to the color
/// model's bound, so brightening never darkens. A fully transparent source
/// keeps the result visible by forcing a mid alpha instead of full opacity.
pub fn brighten_color(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, f32) {
    let (h, l, s) = rgb_to_hls(r, g, b);
    let new_l = (l.max(1.0) * 1.5).min(255.0);
    let (nr, ng, nb) = hls_to_rgb(h, new_l, s);

    let alpha = if a == 0 { 0.5 } else { 255.0 };
    (nr, ng, nb, alpha)
}

/// RGB (0..255) to HLS with hue in turns and lightness/saturation on the
/// 0..255 scale.
pub fn rgb_to_hls(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f32::EPSILON {
        return (0.0, l * 255.0, 0.0);
    }

    let delta = max - min;
    let s = if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };
    let sector = if (max - r).abs() < f32::EPSILON {
        ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f32::EPSILON {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (sector / 6.0, l * 255.0, s * 255.0)
}

/// Inverse of [`rgb_to_hls`].
pub fn hls_to_rgb(h: f32, l: f32, s: f32) -> (u8, u8, u8) {
    let l = (l / 255.0).clamp(0.0, 1.0);
    let s = (s / 255.0).clamp(0.0, 1.0);

    if s < f32::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(1.0) * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;

    (
        ((r1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((g1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
        ((b1 + m).clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn average_color(pixels: &[[u8; 3]]) -> [u8; 3] {
    let mut sums = [0u64; 3];
    for pixel in pixels {
        for (sum, channel) in sums.iter_mut().zip(pixel) {
            *sum += *channel as u64;
        }
    }
    let count = pixels.len() as u64;
    [
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    ]
}

/// Median-cut quantization down to at most `max_colors` representatives.
///
/// Boxes with no channel spread cannot split, so an image with a single
/// distinct color yields a one-entry palette.
fn median_cut(pixels: &[[u8; 3]], max_colors: usize) -> Vec<[u8; 3]> {
    let mut boxes: Vec<Vec<[u8; 3]>> = vec![pixels.to_vec()];

    while boxes.len() < max_colors {
        // Split the box with the widest channel range.
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.len() >= 2)
            .map(|(i, b)| (i, widest_channel(b)))
            .filter(|(_, (_, range))| *range > 0)
            .max_by_key(|(_, (_, range))| *range);

        let Some((index, (channel, _))) = candidate else {
            break;
        };
        let mut pixels = boxes.swap_remove(index);
        pixels.sort_by_key(|p| p[channel]);
        let mid = pixels.len() / 2;
        let upper = pixels.split_off(mid);
        boxes.push(pixels);
        boxes.push(upper);
    }

    boxes
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| average_color(b))
        .collect()
}

fn widest_channel(pixels: &[[u8; 3]]) -> (usize, u8) {
    let mut min = [u8::MAX; 3];
    let mut max = [u8::MIN; 3];
    for pixel in pixels {
        for i in 0..3 {
            min[i] = min[i].min(pixel[i]);
            max[i] = max[i].max(pixel[i]);
        }
    }
    let ranges = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
    let channel = (0..3).max_by_key(|&i| ranges[i]).unwrap_or(0);
    (channel, ranges[channel])
}

/// Format a color as a renderer-consumable `rgba(r,g,b,a)` string.
///
/// Alpha is 255 for full opacity; a fractional alpha (the transparent-icon
/// case) keeps its decimal form.
pub fn rgba_to_string(r: u8, g: u8, b: u8, a: f32) -> String {
    if a.fract() == 0.0 {
        format!("rgba({},{},{},{})", r, g, b, a as u32)
    } else {
        format!("rgba({},{},{},{})", r, g, b, a)
    }
}

/// Gradient cache over a [`GradientStore`]
///
/// Recomputation only happens on cache miss; an existing record is always
/// returned as-is, and records marked fixed (or tiles with an explicit
/// configured background) are treated as immutable.
pub struct GradientCache<'a> {
    store: &'a dyn GradientStore,
}

impl<'a> GradientCache<'a> {
    pub fn new(store: &'a dyn GradientStore) -> Self {
        Self { store }
    }

    /// Return the gradient pair for a tile, computing and persisting it on
    /// first sight of the icon.
    pub fn get_or_compute(
        &self,
        tile_id: &str,
        icon_path: &Path,
        explicit_background: bool,
    ) -> GradientPair {
        match self.store.get(tile_id) {
            Ok(Some(record)) => {
                if record.fixed || explicit_background {
                    debug!(tile = tile_id, "gradient pinned, returning stored colors");
                } else {
                    debug!(tile = tile_id, "gradient cache hit");
                }
                GradientPair {
                    left: record.left,
                    right: record.right,
                }
            }
            Ok(None) => {
                let pair = extract_gradient(icon_path);
                let record = GradientRecord {
                    tile_id: tile_id.to_string(),
                    left: pair.left.clone(),
                    right: pair.right.clone(),
                    fixed: false,
                };
                if let Err(e) = self.store.put(&record) {
                    warn!(tile = tile_id, error = %e, "failed to persist gradient record");
                }
                pair
            }
            Err(e) => {
                // A broken store must not break the render; recompute without
                // persisting.
                warn!(tile = tile_id, error = %e, "gradient store read failed, recomputing");
                extract_gradient(icon_path)
            }
        }
    }
}
