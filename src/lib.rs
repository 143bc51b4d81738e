//! # gridsort
//!
//! Arrange feature vectors (image embeddings, colours, ...) on a rectangular
//! grid so that neighbouring cells hold similar vectors, with every vector
//! placed exactly once.
//!
//! The engine is Fast Linear Assignment Sorting: starting from a random
//! arrangement, each scale smooths the grid with a box filter and then
//! repeatedly re-solves small exact assignment problems between the vectors
//! in a random neighbourhood and their smoothed targets. The neighbourhood
//! radius shrinks geometrically from half the grid down to single cells.
//!
//! ```
//! use gridsort::builder::FlasBuilder;
//! use gridsort::core::FeatureSet;
//!
//! let rows: Vec<Vec<f64>> = (0..36)
//!     .map(|i| vec![(i * 7 % 36) as f64 / 36.0, (i * 11 % 36) as f64 / 36.0, 0.5])
//!     .collect();
//! let labels: Vec<String> = (0..36).map(|i| format!("img_{i}.jpg")).collect();
//!
//! let sorted = FlasBuilder::new()
//!     .with_candidates(9)
//!     .with_radius_decay(0.8)
//!     .build(FeatureSet::new(rows, labels).unwrap())
//!     .unwrap();
//!
//! assert_eq!((sorted.shape.height, sorted.shape.width), (6, 6));
//! assert_eq!(sorted.labels[0], format!("img_{}.jpg", sorted.order[0]));
//! ```

pub mod assignment;
pub mod builder;
pub mod core;
pub mod distance;
pub mod error;
pub mod filter;
pub mod flas;
pub mod quality;
pub mod sampling;

pub use crate::builder::{FlasBuilder, FlasParams};
pub use crate::core::{FeatureSet, GridShape, SortedGrid};
pub use crate::error::{SortError, SortResult};

#[cfg(test)]
mod tests;
