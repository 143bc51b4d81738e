//! Exact linear sum assignment on small integer cost matrices.
//!
//! The solver is a Jonker–Volgenant style shortest augmenting path method:
//! rows are first reduced to build feasible dual potentials, then each row
//! is added in turn by growing a Dijkstra-like alternating tree over the
//! reduced costs until a free column is reached, and the matching is flipped
//! along that path. Runs in O(n² m) for an n×m matrix with n ≤ m and is fully
//! deterministic: ties are broken by the lowest column index.
//!
//! Distances are quantized to integers before solving (`CostMatrix::quantize`).
//! The scale trades precision for speed; 2048 levels keep the optimum of the
//! float problem in all but near-tie cases.
//!
//! # Examples
//!
//! ```
//! use gridsort::assignment::{solve, CostMatrix};
//!
//! let costs = CostMatrix::from_rows(&[vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]]).unwrap();
//! let best = solve(&costs).unwrap();
//! assert_eq!(best.row_to_col, vec![1, 0, 2]);
//! assert_eq!(best.cost, 5);
//! ```

use log::{trace, warn};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{SortError, SortResult};

/// Default number of integer levels distances are rescaled to.
pub const DEFAULT_COST_SCALE: f64 = 2048.0;

const INF: i64 = i64::MAX / 4;

/// Dense row-major integer cost matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl CostMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<i64>) -> SortResult<Self> {
        if data.len() != rows * cols {
            return Err(SortError::InvalidParameter {
                name: "costs",
                reason: format!("{} values for a {}x{} matrix", data.len(), rows, cols),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_rows(rows: &[Vec<i64>]) -> SortResult<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(SortError::DimensionMismatch {
                row: bad,
                expected: cols,
                actual: rows[bad].len(),
            });
        }
        Self::new(rows.len(), cols, rows.iter().flatten().copied().collect())
    }

    /// Linearly rescales non-negative float costs to `0..=scale` and rounds.
    /// An all-zero matrix stays all zero.
    pub fn quantize(costs: &DenseMatrix<f64>, scale: f64) -> Self {
        let (rows, cols) = costs.shape();
        let max = (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .map(|pos| *costs.get(pos))
            .fold(0.0_f64, f64::max);

        let data = if max > 0.0 {
            let factor = scale / max;
            (0..rows)
                .flat_map(|i| (0..cols).map(move |j| (i, j)))
                .map(|pos| (costs.get(pos).max(0.0) * factor).round() as i64)
                .collect()
        } else {
            warn!("Degenerate {}x{} cost matrix (max = 0), skipping rescale", rows, cols);
            vec![0; rows * cols]
        };

        Self { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Optimal matching: row `i` is assigned column `row_to_col[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub row_to_col: Vec<usize>,
    pub cost: i64,
}

/// Minimum-cost assignment of every row to a distinct column.
///
/// Requires `rows <= cols`; anything else cannot be perfectly matched and is
/// reported as `AssignmentInfeasible`.
pub fn solve(costs: &CostMatrix) -> SortResult<Assignment> {
    let (n, m) = costs.shape();
    if n > m {
        return Err(SortError::AssignmentInfeasible { rows: n, cols: m });
    }
    if n == 0 {
        return Ok(Assignment {
            row_to_col: Vec::new(),
            cost: 0,
        });
    }

    // 1-based: row/column 0 is the virtual root of each augmenting tree.
    let mut u = vec![0_i64; n + 1];
    let mut v = vec![0_i64; m + 1];
    let mut owner = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    // Row reduction: every row ends up matched, so u[i] = min_j c(i, j) is a
    // feasible start even when n < m. Free columns must keep v = 0.
    for i in 1..=n {
        u[i] = (0..m).map(|j| costs.get(i - 1, j)).min().unwrap_or(0);
    }

    let mut min_slack = vec![INF; m + 1];
    let mut visited = vec![false; m + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut j0 = 0;
        min_slack.fill(INF);
        visited.fill(false);

        loop {
            visited[j0] = true;
            let i0 = owner[j0];
            let mut delta = INF;
            let mut j1 = 0;

            for j in 1..=m {
                if visited[j] {
                    continue;
                }
                let reduced = costs.get(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            if j1 == 0 {
                return Err(SortError::AssignmentInfeasible { rows: n, cols: m });
            }

            for j in 0..=m {
                if visited[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the alternating path back to the root.
        while j0 != 0 {
            let prev = way[j0];
            owner[j0] = owner[prev];
            j0 = prev;
        }
    }

    let mut row_to_col = vec![0; n];
    for j in 1..=m {
        if owner[j] != 0 {
            row_to_col[owner[j] - 1] = j - 1;
        }
    }
    let cost: i64 = row_to_col
        .iter()
        .enumerate()
        .map(|(i, &j)| costs.get(i, j))
        .sum();
    trace!("Solved {}x{} assignment, cost {}", n, m, cost);

    Ok(Assignment { row_to_col, cost })
}
