//! Color frequency counting over RGB pixel data.
//!
//! This is the dominant-color source for analysis. Colors are first counted by
//! exact match, then near-duplicates are folded into the most frequent color
//! they are close to, so resampling halos around an edge do not show up as
//! extra colors.

use std::collections::HashMap;

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Frequency of every distinct color in an image.
#[derive(Debug, Clone, Default)]
pub struct ColorHistogram {
    counts: HashMap<Rgb, u32>,
    total: u64,
}

impl ColorHistogram {
    /// Number of distinct colors seen.
    pub fn distinct_colors(&self) -> usize {
        self.counts.len()
    }

    /// Number of pixels counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Occurrences of one color.
    pub fn count(&self, color: Rgb) -> u32 {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    /// The `n` most frequent colors, most frequent first, after merging
    /// near-duplicates.
    ///
    /// Colors are visited from most to least frequent. Each one joins the
    /// first already kept color whose channels all lie within `tolerance`,
    /// adding its count there; otherwise it is kept as a new color. A
    /// tolerance of 0 counts exact matches only.
    ///
    /// Equal counts are ordered by descending `[r, g, b]` so the result never
    /// depends on hash iteration order.
    pub fn dominant_colors(&self, n: usize, tolerance: u8) -> Vec<Rgb> {
        let mut entries: Vec<(Rgb, u64)> =
            self.counts.iter().map(|(color, count)| (*color, u64::from(*count))).collect();
        entries.sort_unstable_by(by_count_then_color);

        let mut clusters: Vec<(Rgb, u64)> = Vec::new();
        for (color, count) in entries {
            match clusters
                .iter_mut()
                .find(|(seed, _)| within(*seed, color, tolerance))
            {
                Some((_, total)) => *total += count,
                None => clusters.push((color, count)),
            }
        }

        clusters.sort_by(by_count_then_color);
        clusters.into_iter().take(n).map(|(color, _)| color).collect()
    }
}

fn by_count_then_color(a: &(Rgb, u64), b: &(Rgb, u64)) -> std::cmp::Ordering {
    b.1.cmp(&a.1).then(b.0.cmp(&a.0))
}

/// Chebyshev distance check.
fn within(a: Rgb, b: Rgb, tolerance: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// Count every color of an RGB buffer.
///
/// # Arguments
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
///
/// # Example
/// ```
/// use selic_core::histogram::compute_color_histogram;
///
/// let pixels = vec![255, 0, 0, 0, 255, 0, 255, 0, 0];
/// let hist = compute_color_histogram(&pixels);
/// assert_eq!(hist.dominant_colors(1, 0), vec![[255, 0, 0]]);
/// ```
pub fn compute_color_histogram(pixels: &[u8]) -> ColorHistogram {
    let mut hist = ColorHistogram::default();

    for chunk in pixels.chunks_exact(3) {
        *hist.counts.entry([chunk[0], chunk[1], chunk[2]]).or_insert(0) += 1;
        hist.total += 1;
    }

    hist
}
