//! Neighbourhood quality of a grid arrangement.
//!
//! Mean squared distance between each cell and its right and lower
//! neighbours; every 4-neighbour pair is counted once. On a toroidal grid the
//! wrap-around pairs count too. Lower is better.

use rayon::prelude::*;

use crate::core::GridShape;
use crate::distance::squared_distance;

#[inline]
fn cell_vector(vectors: &[f64], width: usize, dim: usize, y: usize, x: usize) -> &[f64] {
    let start = (y * width + x) * dim;
    &vectors[start..start + dim]
}

pub fn neighbour_quality(vectors: &[f64], shape: GridShape, dim: usize, toroidal: bool) -> f64 {
    let (h, w) = (shape.height, shape.width);
    let at = |y: usize, x: usize| cell_vector(vectors, w, dim, y, x);

    let per_row: Vec<(f64, usize)> = (0..h)
        .into_par_iter()
        .map(|y| {
            let mut sum = 0.0;
            let mut pairs = 0usize;
            for x in 0..w {
                let here = at(y, x);
                if x + 1 < w {
                    sum += squared_distance(here, at(y, x + 1));
                    pairs += 1;
                } else if toroidal && w > 2 {
                    sum += squared_distance(here, at(y, 0));
                    pairs += 1;
                }
                if y + 1 < h {
                    sum += squared_distance(here, at(y + 1, x));
                    pairs += 1;
                } else if toroidal && h > 2 {
                    sum += squared_distance(here, at(0, x));
                    pairs += 1;
                }
            }
            (sum, pairs)
        })
        .collect();
    // summed in row order so the score is reproducible
    let (sum, pairs) = per_row
        .iter()
        .fold((0.0, 0), |acc, &(s, p)| (acc.0 + s, acc.1 + p));

    if pairs == 0 {
        0.0
    } else {
        sum / pairs as f64
    }
}
