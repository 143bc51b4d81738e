//! Neighbourhood sampling on the grid.
//!
//! A sampler returns the cells of the `(2r+1)×(2r+1)` window around a cell,
//! optionally drawing a uniform subsample without replacement. Two variants:
//!
//! - `BoundedSampler`: the window is shifted (not shrunk) to stay inside the
//!   grid, so it keeps its full size whenever the axis is long enough.
//! - `ToroidalSampler`: windows wrap around the edges. Cell ids are read
//!   contiguously from an index grid replicated twice along each axis.
//!
//! A window never covers more than a full axis, so returned cells are
//! distinct in both variants.

use log::trace;
use rand::seq::index;
use rand::Rng;

use crate::core::GridShape;

pub trait NeighborhoodSampler {
    fn shape(&self) -> GridShape;

    /// All cells in the window of `radius` around `cell`, row-major.
    fn window(&self, cell: usize, radius: usize) -> Vec<usize>;

    /// Window cells, subsampled to at most `count` when given.
    fn sample<R: Rng + ?Sized>(
        &self,
        cell: usize,
        radius: usize,
        count: Option<usize>,
        rng: &mut R,
    ) -> Vec<usize> {
        let positions = self.window(cell, radius);
        match count {
            Some(count) => subsample(positions, count, rng),
            None => positions,
        }
    }
}

/// Uniform draw of `min(count, len)` entries without replacement.
pub fn subsample<R: Rng + ?Sized>(positions: Vec<usize>, count: usize, rng: &mut R) -> Vec<usize> {
    let amount = count.min(positions.len());
    index::sample(rng, positions.len(), amount)
        .into_iter()
        .map(|i| positions[i])
        .collect()
}

/// `[start, end)` of a window of `radius` around `center` on an axis of
/// length `len`, shifted back inside the axis when it runs off an edge.
pub fn window_bounds(center: usize, radius: usize, len: usize) -> (usize, usize) {
    let span = 2 * radius + 1;
    let mut start = center as isize - radius as isize;
    let mut end = center as isize + radius as isize + 1;
    if start < 0 {
        start = 0;
        end = span.min(len) as isize;
    }
    if end > len as isize {
        end = len as isize;
        start = (len as isize - span as isize).max(0);
    }
    (start as usize, end as usize)
}

#[derive(Clone, Debug)]
pub struct BoundedSampler {
    shape: GridShape,
}

impl BoundedSampler {
    pub fn new(shape: GridShape) -> Self {
        Self { shape }
    }
}

impl NeighborhoodSampler for BoundedSampler {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn window(&self, cell: usize, radius: usize) -> Vec<usize> {
        let (y, x) = self.shape.coords(cell);
        let (ys, ye) = window_bounds(y, radius, self.shape.height);
        let (xs, xe) = window_bounds(x, radius, self.shape.width);
        trace!("Bounded window at ({}, {}): rows {}..{}, cols {}..{}", y, x, ys, ye, xs, xe);

        (ys..ye)
            .flat_map(|yy| (xs..xe).map(move |xx| self.shape.cell(yy, xx)))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct ToroidalSampler {
    shape: GridShape,
    /// Cell ids of a `2H × 2W` tiling of the grid, row-major.
    extended: Vec<usize>,
}

impl ToroidalSampler {
    pub fn new(shape: GridShape) -> Self {
        let (h, w) = (shape.height, shape.width);
        let extended = (0..2 * h)
            .flat_map(|y| (0..2 * w).map(move |x| (y % h) * w + x % w))
            .collect();
        Self { shape, extended }
    }
}

impl NeighborhoodSampler for ToroidalSampler {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn window(&self, cell: usize, radius: usize) -> Vec<usize> {
        let (h, w) = (self.shape.height, self.shape.width);
        let (y, x) = self.shape.coords(cell);
        let span_y = (2 * radius + 1).min(h);
        let span_x = (2 * radius + 1).min(w);
        let ys = (y as isize - radius as isize).rem_euclid(h as isize) as usize;
        let xs = (x as isize - radius as isize).rem_euclid(w as isize) as usize;
        trace!("Toroidal window at ({}, {}): origin ({}, {}), span {}x{}", y, x, ys, xs, span_y, span_x);

        (ys..ys + span_y)
            .flat_map(|yy| {
                let row = &self.extended[yy * 2 * w..(yy + 1) * 2 * w];
                row[xs..xs + span_x].iter().copied()
            })
            .collect()
    }
}
