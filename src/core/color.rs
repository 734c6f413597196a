//! Dominant colour extraction for store artwork.

use crate::errors::Result;
use image::Rgba;
use std::collections::HashMap;

/// Channel bits kept when grouping similar colours.
const QUANT_SHIFT: u8 = 3;

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

/// Finds the most common colour of an encoded image as `0xRRGGBB`.
///
/// Every `quality`-th pixel is sampled (1 samples all of them); higher values
/// are faster and coarser. Transparent and near-white pixels are ignored, and
/// the winner is the average of the pixels in the most populated quantised
/// bucket. Returns `None` when no pixel qualifies.
///
/// # Errors
/// Returns [`crate::errors::Error::Image`] if the bytes are not a supported image.
pub fn dominant_color(bytes: &[u8], quality: usize) -> Result<Option<u32>> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let step = quality.max(1);

    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();
    for Rgba([r, g, b, a]) in image.pixels().step_by(step).copied() {
        if a < 125 || (r > 250 && g > 250 && b > 250) {
            continue;
        }
        let bucket = buckets
            .entry((r >> QUANT_SHIFT, g >> QUANT_SHIFT, b >> QUANT_SHIFT))
            .or_default();
        bucket.count += 1;
        bucket.r += u64::from(r);
        bucket.g += u64::from(g);
        bucket.b += u64::from(b);
    }

    // Ties go to the lowest bucket key so the result does not depend on map order
    Ok(buckets
        .into_iter()
        .max_by(|(key_a, a), (key_b, b)| {
            a.count.cmp(&b.count).then_with(|| key_b.cmp(key_a))
        })
        .map(|(_, bucket)| {
            let avg = |sum: u64| u32::try_from(sum / bucket.count).unwrap_or(u32::from(u8::MAX));
            (avg(bucket.r) << 16) | (avg(bucket.g) << 8) | avg(bucket.b)
        }))
}

/// [`dominant_color`] on the blocking thread pool.
///
/// Decoding full-size artwork is CPU-bound and must not stall the runtime's
/// worker threads while other commands are in flight.
///
/// # Errors
/// As [`dominant_color`], plus [`crate::errors::Error::Task`] if the worker panics.
pub async fn dominant_color_in_background(bytes: Vec<u8>, quality: usize) -> Result<Option<u32>> {
    tokio::task::spawn_blocking(move || dominant_color(&bytes, quality)).await?
}
