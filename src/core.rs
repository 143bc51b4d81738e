//! Feature sets, grid geometry and sorted output.
//!
//! This module provides the data model shared by every stage of the sorter:
//!
//! - `FeatureSet`: an ordered list of equally sized feature vectors with one
//!   opaque label per vector. Validated once at construction.
//! - `GridShape`: the `height × width` rectangle of placement sites, with
//!   row-major cell addressing (`cell = y * width + x`).
//! - `SortedGrid`: the result of a run. Cells, flat vector order, labels and
//!   vectors are all reported in the same grid order.
//!
//! A *site* groups `site_size` consecutive input vectors. The sorter moves
//! whole sites; a site's feature is the concatenation of its members.
//!
//! # Examples
//!
//! ```
//! use gridsort::core::{FeatureSet, GridShape};
//!
//! let rows = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5], vec![1.0, 1.0]];
//! let features = FeatureSet::new(rows, vec!["a", "b", "c", "d"]).unwrap();
//! assert_eq!(features.dim(), 2);
//!
//! let shape = GridShape::fit(features.len()).unwrap();
//! assert_eq!((shape.height, shape.width), (2, 2));
//! ```

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{SortError, SortResult};
use crate::flas::ScaleReport;

/// Rectangle of placement sites, addressed row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub height: usize,
    pub width: usize,
}

impl GridShape {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Most square rectangle holding exactly `sites` cells: the height is the
    /// largest divisor of `sites` not above its square root.
    pub fn fit(sites: usize) -> SortResult<Self> {
        if sites == 0 {
            return Err(SortError::EmptyFeatureSet);
        }
        let mut height = (sites as f64).sqrt().floor() as usize;
        while height > 1 && sites % height != 0 {
            height -= 1;
        }
        let height = height.max(1);
        let shape = Self::new(height, sites / height);
        debug!(
            "Fitted grid {}x{} for {} sites",
            shape.height, shape.width, sites
        );
        Ok(shape)
    }

    /// Rows of a fixed `width`; `sites` must fill the last row completely.
    pub fn with_width(sites: usize, width: usize) -> SortResult<Self> {
        if sites == 0 {
            return Err(SortError::EmptyFeatureSet);
        }
        if width == 0 || sites % width != 0 {
            return Err(SortError::GridShapeMismatch {
                height: if width == 0 { 0 } else { sites / width },
                width,
                sites,
            });
        }
        Ok(Self::new(sites / width, width))
    }

    /// Fails unless the grid holds exactly `sites` cells.
    pub fn check(&self, sites: usize) -> SortResult<()> {
        if self.height == 0 || self.width == 0 || self.n_cells() != sites {
            return Err(SortError::GridShapeMismatch {
                height: self.height,
                width: self.width,
                sites,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.height * self.width
    }

    #[inline]
    pub fn max_side(&self) -> usize {
        self.height.max(self.width)
    }

    /// `(y, x)` of a row-major cell index.
    #[inline]
    pub fn coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.width, cell % self.width)
    }

    #[inline]
    pub fn cell(&self, y: usize, x: usize) -> usize {
        y * self.width + x
    }
}

/// Ordered feature vectors with one label per vector.
///
/// Invariants checked by `new`: at least one vector, all vectors share the
/// same non-zero dimension, every component is finite, and there are as many
/// labels as vectors.
#[derive(Clone, Debug)]
pub struct FeatureSet<L> {
    rows: Vec<Vec<f64>>,
    labels: Vec<L>,
    dim: usize,
}

impl<L> FeatureSet<L> {
    pub fn new(rows: Vec<Vec<f64>>, labels: Vec<L>) -> SortResult<Self> {
        let first = rows.first().ok_or(SortError::EmptyFeatureSet)?;
        let dim = first.len();
        if dim == 0 {
            return Err(SortError::InvalidParameter {
                name: "dimension",
                reason: "feature vectors need at least one component".to_string(),
            });
        }
        if labels.len() != rows.len() {
            return Err(SortError::LabelCountMismatch {
                expected: rows.len(),
                actual: labels.len(),
            });
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != dim {
                return Err(SortError::DimensionMismatch {
                    row,
                    expected: dim,
                    actual: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(SortError::NonFiniteValue { row });
            }
        }
        Ok(Self { rows, labels, dim })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<L>) {
        (self.rows, self.labels)
    }

    /// Number of sites when grouping `site_size` consecutive vectors.
    pub fn n_sites(&self, site_size: usize) -> SortResult<usize> {
        if site_size == 0 || self.len() % site_size != 0 {
            return Err(SortError::SiteSizeMismatch {
                n_vectors: self.len(),
                site_size,
            });
        }
        Ok(self.len() / site_size)
    }

    /// Flat row-major site features: site `i` is the concatenation of
    /// vectors `i*site_size .. (i+1)*site_size`.
    pub fn pack_sites(&self, site_size: usize) -> SortResult<Vec<f64>> {
        self.n_sites(site_size)?;
        Ok(self.rows.iter().flatten().copied().collect())
    }
}

impl FeatureSet<usize> {
    /// Feature set labelled by input position.
    pub fn unlabelled(rows: Vec<Vec<f64>>) -> SortResult<Self> {
        let labels = (0..rows.len()).collect();
        Self::new(rows, labels)
    }
}

/// Result of a sorting run.
///
/// `cells[c]` is the original site placed on cell `c`; `order`, `labels` and
/// `rows` list the original vectors in grid order, with every site expanded
/// into its `site_size` members.
#[derive(Clone, Debug)]
pub struct SortedGrid<L> {
    pub shape: GridShape,
    pub site_size: usize,
    pub cells: Vec<usize>,
    pub order: Vec<usize>,
    pub labels: Vec<L>,
    pub rows: Vec<Vec<f64>>,
    pub initial_quality: f64,
    pub scales: Vec<ScaleReport>,
    pub duration: Duration,
}

impl<L> SortedGrid<L> {
    /// Quality after the last scale (the initial quality if none ran).
    pub fn final_quality(&self) -> f64 {
        self.scales
            .last()
            .map(|s| s.quality)
            .unwrap_or(self.initial_quality)
    }

    /// Cell holding an original site.
    pub fn cell_of(&self, site: usize) -> Option<usize> {
        self.cells.iter().position(|&s| s == site)
    }

    /// Labels of the site placed at `(y, x)`, `None` outside the grid.
    pub fn labels_at(&self, y: usize, x: usize) -> Option<&[L]> {
        if y >= self.shape.height || x >= self.shape.width {
            return None;
        }
        let start = self.shape.cell(y, x) * self.site_size;
        self.labels.get(start..start + self.site_size)
    }
}
