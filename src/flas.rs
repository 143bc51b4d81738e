//! Fast Linear Assignment Sorting: the multi-scale optimisation loop.
//!
//! State is a `GridState`: the site at every cell, that site's feature vector
//! and its labels, always permuted together. One outer *scale*:
//!
//! 1. `radius = floor(radius_f)`, window sizes from `filter_size`.
//! 2. Low-pass filter the current vectors into per-cell targets.
//! 3. Repeat `iteration_factor * (sites / candidate_count) + 1` times: pick a
//!    random cell, sample up to `candidate_count` cells around it, solve the
//!    assignment of their current vectors onto their targets, and move the
//!    vectors (and labels) accordingly.
//! 4. `radius_f *= radius_decay`; stop once `radius_f < 1`.
//!
//! The initial radius is `max(H, W) / 2 - 1` and the initial arrangement is a
//! uniformly random permutation. All randomness comes from one seeded
//! `ChaCha8Rng`, so a run is reproducible from its parameters.
//!
//! **SEQUENTIAL**: every inner step reads cells the previous one may have
//! just moved, so steps are never run concurrently.

use std::time::Instant;

use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::assignment::{solve, CostMatrix};
use crate::builder::{check_radius_decay, FlasParams};
use crate::core::{FeatureSet, GridShape, SortedGrid};
use crate::distance::{gather_rows, squared_l2_distance};
use crate::error::{SortError, SortResult};
use crate::filter::{filter_size, low_pass_filter, BoundaryMode};
use crate::quality::neighbour_quality;
use crate::sampling::{BoundedSampler, NeighborhoodSampler, ToroidalSampler};

/// Summary of one outer scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleReport {
    pub radius: usize,
    pub filter_size_x: usize,
    pub filter_size_y: usize,
    pub swap_radius: usize,
    pub iterations: usize,
    /// Neighbourhood quality at the end of the scale.
    pub quality: f64,
}

/// `max(H, W) / 2 - 1`
pub fn initial_radius(shape: GridShape) -> f64 {
    shape.max_side() as f64 / 2.0 - 1.0
}

/// Number of scales the loop runs: at least one, then until the radius
/// drops below 1. `decay` must lie in (0, 1).
pub fn scale_count(initial: f64, decay: f64) -> SortResult<usize> {
    check_radius_decay(decay)?;
    let mut radius_f = initial;
    let mut scales = 0;
    loop {
        scales += 1;
        radius_f *= decay;
        if radius_f < 1.0 {
            return Ok(scales);
        }
    }
}

/// Neighbourhood radius used for sampling: never smaller than the radius of
/// a square window holding `candidate_count` cells.
pub fn swap_radius(radius: usize, candidate_count: usize) -> usize {
    let floor = ((candidate_count as f64).sqrt() - 1.0) / 2.0;
    (radius as f64).max(floor).round() as usize
}

/// # Panics
///
/// If `candidate_count` is zero.
pub fn inner_iterations(sites: usize, candidate_count: usize, factor: usize) -> usize {
    factor * (sites / candidate_count) + 1
}

/// Single-writer grid state; cell `c` holds site `cells[c]`, whose vector is
/// `vectors[c*dim..(c+1)*dim]` and whose labels are `labels[c]`.
#[derive(Debug)]
pub struct GridState<L> {
    shape: GridShape,
    dim: usize,
    vectors: Vec<f64>,
    cells: Vec<usize>,
    labels: Vec<Vec<L>>,
}

impl<L> GridState<L> {
    /// Places the sites on the grid in a uniformly random order.
    pub fn new<R: Rng + ?Sized>(
        sites: &[f64],
        site_labels: Vec<Vec<L>>,
        shape: GridShape,
        dim: usize,
        rng: &mut R,
    ) -> SortResult<Self> {
        let n = site_labels.len();
        shape.check(n)?;
        if sites.len() != n * dim {
            return Err(SortError::DimensionMismatch {
                row: 0,
                expected: n * dim,
                actual: sites.len(),
            });
        }

        let mut cells: Vec<usize> = (0..n).collect();
        cells.shuffle(rng);

        let vectors = cells
            .iter()
            .flat_map(|&s| sites[s * dim..(s + 1) * dim].iter().copied())
            .collect();
        let mut pending: Vec<Option<Vec<L>>> = site_labels.into_iter().map(Some).collect();
        let labels = cells
            .iter()
            .map(|&s| pending[s].take().unwrap_or_default())
            .collect();

        Ok(Self {
            shape,
            dim,
            vectors,
            cells,
            labels,
        })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn vectors(&self) -> &[f64] {
        &self.vectors
    }

    pub fn labels(&self) -> &[Vec<L>] {
        &self.labels
    }

    pub fn quality(&self, toroidal: bool) -> f64 {
        neighbour_quality(&self.vectors, self.shape, self.dim, toroidal)
    }

    fn gather(&self, positions: &[usize]) -> DenseMatrix<f64> {
        gather_rows(&self.vectors, self.dim, positions)
    }

    /// Cell `positions[k]` receives the occupant of `positions[assignment[k]]`.
    /// `assignment` must be a permutation of `0..positions.len()`.
    pub fn apply(&mut self, positions: &[usize], assignment: &[usize]) {
        debug_assert_eq!(positions.len(), assignment.len());
        let dim = self.dim;

        let moved_cells: Vec<usize> = assignment.iter().map(|&a| self.cells[positions[a]]).collect();
        let moved_vectors: Vec<f64> = assignment
            .iter()
            .flat_map(|&a| self.vectors[positions[a] * dim..(positions[a] + 1) * dim].to_vec())
            .collect();
        let mut taken: Vec<Option<Vec<L>>> = positions
            .iter()
            .map(|&p| Some(std::mem::take(&mut self.labels[p])))
            .collect();

        for (k, &p) in positions.iter().enumerate() {
            self.cells[p] = moved_cells[k];
            self.vectors[p * dim..(p + 1) * dim]
                .copy_from_slice(&moved_vectors[k * dim..(k + 1) * dim]);
            self.labels[p] = taken[assignment[k]].take().unwrap_or_default();
        }
    }

    /// One inner iteration around a random cell. Returns the quantized cost
    /// of the committed local assignment.
    pub(crate) fn step<S: NeighborhoodSampler, R: Rng + ?Sized>(
        &mut self,
        targets: &[f64],
        sampler: &S,
        radius: usize,
        params: &FlasParams,
        rng: &mut R,
    ) -> SortResult<i64> {
        let center = rng.random_range(0..self.shape.n_cells());
        let positions = sampler.sample(center, radius, Some(params.candidate_count), rng);

        let actual = self.gather(&positions);
        let wanted = gather_rows(targets, self.dim, &positions);
        let distances = squared_l2_distance(&wanted, &actual);
        let costs = CostMatrix::quantize(&distances, params.cost_scale);
        let best = solve(&costs)?;

        trace!(
            "Step at cell {}: {} candidates, cost {}",
            center,
            positions.len(),
            best.cost
        );
        self.apply(&positions, &best.row_to_col);
        Ok(best.cost)
    }

    /// One outer scale at integer `radius`.
    pub(crate) fn run_scale<S: NeighborhoodSampler, R: Rng + ?Sized>(
        &mut self,
        sampler: &S,
        radius: usize,
        params: &FlasParams,
        rng: &mut R,
    ) -> SortResult<ScaleReport> {
        let size_x = filter_size(self.shape.width, radius);
        let size_y = filter_size(self.shape.height, radius);
        let mode = BoundaryMode::for_toroidal(params.toroidal);
        let targets = low_pass_filter(&self.vectors, self.shape, self.dim, size_x, size_y, mode);

        let n = self.shape.n_cells();
        let iterations = inner_iterations(n, params.candidate_count, params.iteration_factor);
        let swap = swap_radius(radius, params.candidate_count);

        for _ in 0..iterations {
            self.step(&targets, sampler, swap, params, rng)?;
        }

        let report = ScaleReport {
            radius,
            filter_size_x: size_x,
            filter_size_y: size_y,
            swap_radius: swap,
            iterations,
            quality: self.quality(params.toroidal),
        };
        debug!(
            "Scale radius={} filter={}x{} swap_radius={} iterations={} quality={:.6}",
            report.radius,
            report.filter_size_y,
            report.filter_size_x,
            report.swap_radius,
            report.iterations,
            report.quality
        );
        Ok(report)
    }

    /// Runs scales until the radius schedule is exhausted.
    pub fn optimise<S: NeighborhoodSampler, R: Rng + ?Sized>(
        &mut self,
        sampler: &S,
        params: &FlasParams,
        rng: &mut R,
    ) -> SortResult<Vec<ScaleReport>> {
        params.validate()?;
        let mut radius_f = initial_radius(self.shape);
        let mut reports = Vec::new();
        loop {
            let radius = radius_f.max(0.0) as usize;
            reports.push(self.run_scale(sampler, radius, params, rng)?);
            radius_f *= params.radius_decay;
            if radius_f < 1.0 {
                break;
            }
        }
        Ok(reports)
    }
}

/// Sorts `features` onto `shape`. Invalid `params` are rejected before any
/// state is built.
pub fn sort<L>(
    features: FeatureSet<L>,
    shape: GridShape,
    params: &FlasParams,
) -> SortResult<SortedGrid<L>> {
    params.validate()?;
    let site_size = params.site_size;
    let n_sites = features.n_sites(site_size)?;
    shape.check(n_sites)?;
    let site_dim = features.dim() * site_size;
    let sites = features.pack_sites(site_size)?;

    info!(
        "Sorting {} vectors ({} sites of {}) onto {}x{} grid, toroidal={}",
        features.len(),
        n_sites,
        site_size,
        shape.height,
        shape.width,
        params.toroidal
    );
    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let (rows, labels) = features.into_parts();
    let mut label_iter = labels.into_iter();
    let site_labels: Vec<Vec<L>> = (0..n_sites)
        .map(|_| label_iter.by_ref().take(site_size).collect())
        .collect();

    let mut state = GridState::new(&sites, site_labels, shape, site_dim, &mut rng)?;
    let initial_quality = state.quality(params.toroidal);
    debug!("Initial quality {:.6}", initial_quality);

    let scales = if params.toroidal {
        state.optimise(&ToroidalSampler::new(shape), params, &mut rng)?
    } else {
        state.optimise(&BoundedSampler::new(shape), params, &mut rng)?
    };

    let GridState { cells, labels, .. } = state;
    let order: Vec<usize> = cells
        .iter()
        .flat_map(|&s| s * site_size..(s + 1) * site_size)
        .collect();
    let mut pending: Vec<Option<Vec<f64>>> = rows.into_iter().map(Some).collect();
    let rows = order
        .iter()
        .map(|&i| pending[i].take().unwrap_or_default())
        .collect();
    let labels = labels.into_iter().flatten().collect();

    let duration = start.elapsed();
    let sorted = SortedGrid {
        shape,
        site_size,
        cells,
        order,
        labels,
        rows,
        initial_quality,
        scales,
        duration,
    };
    info!(
        "Sorted with FLAS in {:.3}s over {} scales, quality {:.6} -> {:.6}",
        duration.as_secs_f64(),
        sorted.scales.len(),
        sorted.initial_quality,
        sorted.final_quality()
    );
    Ok(sorted)
}
