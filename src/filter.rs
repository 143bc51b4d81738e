//! Separable box (moving-average) low-pass filter over a grid of vectors.
//!
//! The grid is a flat row-major buffer of `height * width` vectors of length
//! `dim`. Filtering runs a 1D moving average down every column (window
//! `size_y`) and then along every row (window `size_x`). Lines are independent
//! and are processed in parallel.
//!
//! Boundary handling:
//! - `Reflect`: mirror past the edge including the edge sample
//!   (`d c b a | a b c d | d c b a`), for bounded grids.
//! - `Wrap`: periodic extension, for toroidal grids.

use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::GridShape;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryMode {
    Reflect,
    Wrap,
}

impl BoundaryMode {
    pub fn for_toroidal(toroidal: bool) -> Self {
        if toroidal {
            BoundaryMode::Wrap
        } else {
            BoundaryMode::Reflect
        }
    }

    /// Maps a possibly out-of-range index onto `0..len`.
    #[inline]
    fn resolve(self, idx: isize, len: usize) -> usize {
        let len = len as isize;
        match self {
            BoundaryMode::Wrap => idx.rem_euclid(len) as usize,
            BoundaryMode::Reflect => {
                let period = 2 * len;
                let k = idx.rem_euclid(period);
                if k < len {
                    k as usize
                } else {
                    (period - 1 - k) as usize
                }
            }
        }
    }
}

/// Window size for one axis: `min(dim - 1, 2 * radius + 1)`, reduced to the
/// next odd value and never below 1.
pub fn filter_size(dim: usize, radius: usize) -> usize {
    let size = dim.saturating_sub(1).min(2 * radius + 1);
    if size == 0 {
        1
    } else if size % 2 == 0 {
        size - 1
    } else {
        size
    }
}

/// Moving average of a line of `len` vectors with an odd window `size`.
fn smooth_line(line: &[f64], len: usize, dim: usize, size: usize, mode: BoundaryMode) -> Vec<f64> {
    let half = (size / 2) as isize;
    let norm = 1.0 / size as f64;
    let mut out = vec![0.0; len * dim];
    let mut acc = vec![0.0; dim];

    for k in -half..=half {
        let src = mode.resolve(k, len) * dim;
        for (a, v) in acc.iter_mut().zip(&line[src..src + dim]) {
            *a += v;
        }
    }

    for i in 0..len {
        for (o, a) in out[i * dim..(i + 1) * dim].iter_mut().zip(&acc) {
            *o = a * norm;
        }
        if i + 1 < len {
            let enter = mode.resolve(i as isize + 1 + half, len) * dim;
            let leave = mode.resolve(i as isize - half, len) * dim;
            for c in 0..dim {
                acc[c] += line[enter + c] - line[leave + c];
            }
        }
    }
    out
}

/// Low-pass filters `grid` (`shape.height × shape.width × dim`, row-major).
///
/// # Panics
///
/// Panics if a window size is even or if `grid` has the wrong length.
pub fn low_pass_filter(
    grid: &[f64],
    shape: GridShape,
    dim: usize,
    size_x: usize,
    size_y: usize,
    mode: BoundaryMode,
) -> Vec<f64> {
    let (h, w) = (shape.height, shape.width);
    assert_eq!(grid.len(), h * w * dim, "grid buffer does not match shape");
    assert!(size_x % 2 == 1 && size_y % 2 == 1, "filter sizes must be odd");
    trace!(
        "Low-pass filter {}x{} (dim {}) with window {}x{}, {:?}",
        h,
        w,
        dim,
        size_y,
        size_x,
        mode
    );

    let mut out = grid.to_vec();

    if size_y > 1 {
        let columns: Vec<Vec<f64>> = (0..w)
            .into_par_iter()
            .map(|x| {
                let column: Vec<f64> = (0..h)
                    .flat_map(|y| grid[(y * w + x) * dim..(y * w + x + 1) * dim].iter().copied())
                    .collect();
                smooth_line(&column, h, dim, size_y, mode)
            })
            .collect();
        for (x, column) in columns.iter().enumerate() {
            for y in 0..h {
                let dst = (y * w + x) * dim;
                out[dst..dst + dim].copy_from_slice(&column[y * dim..(y + 1) * dim]);
            }
        }
    }

    if size_x > 1 {
        out.par_chunks_mut(w * dim).for_each(|row| {
            let smoothed = smooth_line(row, w, dim, size_x, mode);
            row.copy_from_slice(&smoothed);
        });
    }

    out
}
