use crate::assignment::DEFAULT_COST_SCALE;
use crate::core::{FeatureSet, GridShape, SortedGrid};
use crate::error::{SortError, SortResult};
use crate::flas;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Tunables of a sorting run.
///
/// `cost_scale` and `iteration_factor` are empirical defaults; they tune
/// speed against quality and are not needed for correctness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlasParams {
    /// Cells per local assignment problem
    pub candidate_count: usize,
    /// Radius multiplier per scale, in (0, 1)
    pub radius_decay: f64,
    /// Consecutive input vectors moved together as one site
    pub site_size: usize,
    pub toroidal: bool,
    pub seed: u64,
    /// Integer levels distances are quantized to before solving
    pub cost_scale: f64,
    /// Inner iterations per scale = factor * (sites / candidate_count) + 1
    pub iteration_factor: usize,
}

impl Default for FlasParams {
    fn default() -> Self {
        Self {
            candidate_count: 49,
            radius_decay: 0.9,
            site_size: 1,
            toroidal: false,
            seed: 7,
            cost_scale: DEFAULT_COST_SCALE,
            iteration_factor: 2,
        }
    }
}

impl FlasParams {
    pub fn validate(&self) -> SortResult<()> {
        if self.candidate_count == 0 {
            return Err(invalid("candidate_count", "must be at least 1"));
        }
        check_radius_decay(self.radius_decay)?;
        if self.site_size == 0 {
            return Err(invalid("site_size", "must be at least 1"));
        }
        if !(self.cost_scale.is_finite() && self.cost_scale > 0.0) {
            return Err(invalid(
                "cost_scale",
                format!("{} is not a positive finite value", self.cost_scale),
            ));
        }
        if self.iteration_factor == 0 {
            return Err(invalid("iteration_factor", "must be at least 1"));
        }
        Ok(())
    }
}

/// A decay outside (0, 1) (or NaN) never shrinks the radius below 1.
pub(crate) fn check_radius_decay(decay: f64) -> SortResult<()> {
    if decay > 0.0 && decay < 1.0 {
        Ok(())
    } else {
        Err(invalid("radius_decay", format!("{} is outside (0, 1)", decay)))
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> SortError {
    SortError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Entry point for sorting a feature set onto a grid.
///
/// ```
/// use gridsort::builder::FlasBuilder;
/// use gridsort::core::FeatureSet;
///
/// let rows: Vec<Vec<f64>> = (0..16).map(|i| vec![(i % 4) as f64, (i / 4) as f64]).collect();
/// let features = FeatureSet::unlabelled(rows).unwrap();
/// let sorted = FlasBuilder::new()
///     .with_grid(4, 4)
///     .with_candidates(4)
///     .build(features)
///     .unwrap();
/// assert_eq!(sorted.order.len(), 16);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FlasBuilder {
    params: FlasParams,
    shape: Option<GridShape>,
}

impl FlasBuilder {
    pub fn new() -> Self {
        info!("Initializing new FlasBuilder");
        Self::default()
    }

    // -------------------- Configuration --------------------

    /// Replace all tunables at once.
    pub fn with_params(mut self, params: FlasParams) -> Self {
        info!("Configuring parameters: {:?}", params);
        self.params = params;
        self
    }

    /// Explicit grid geometry in sites. If not called, the most square
    /// rectangle for the site count is used.
    pub fn with_grid(mut self, height: usize, width: usize) -> Self {
        info!("Setting grid: {}x{}", height, width);
        self.shape = Some(GridShape::new(height, width));
        self
    }

    pub fn with_candidates(mut self, candidate_count: usize) -> Self {
        info!("Setting candidate count: {}", candidate_count);
        self.params.candidate_count = candidate_count;
        self
    }

    pub fn with_radius_decay(mut self, decay: f64) -> Self {
        info!("Setting radius decay: {}", decay);
        self.params.radius_decay = decay;
        self
    }

    pub fn with_site_size(mut self, site_size: usize) -> Self {
        info!("Setting site size: {}", site_size);
        self.params.site_size = site_size;
        self
    }

    pub fn with_toroidal(mut self, toroidal: bool) -> Self {
        info!("Setting toroidal: {}", toroidal);
        self.params.toroidal = toroidal;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        info!("Setting seed: {}", seed);
        self.params.seed = seed;
        self
    }

    /// Quantization range of the local assignment costs.
    /// Higher is more precise and slower.
    pub fn with_cost_scale(mut self, scale: f64) -> Self {
        info!("Setting cost scale: {}", scale);
        self.params.cost_scale = scale;
        self
    }

    pub fn with_iteration_factor(mut self, factor: usize) -> Self {
        info!("Setting iteration factor: {}", factor);
        self.params.iteration_factor = factor;
        self
    }

    pub fn params(&self) -> &FlasParams {
        &self.params
    }

    // -------------------- Build --------------------

    /// Validate the configuration against `features` and run the sort.
    pub fn build<L>(self, features: FeatureSet<L>) -> SortResult<SortedGrid<L>> {
        self.params.validate()?;
        let n_sites = features.n_sites(self.params.site_size)?;
        let shape = match self.shape {
            Some(shape) => {
                shape.check(n_sites)?;
                shape
            }
            None => GridShape::fit(n_sites)?,
        };
        debug!(
            "Build configuration: {:?}, grid {}x{}",
            self.params, shape.height, shape.width
        );

        flas::sort(features, shape, &self.params)
    }
}
