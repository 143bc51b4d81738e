use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smartcore::linalg::basic::arrays::Array2;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::assignment::{solve, CostMatrix, DEFAULT_COST_SCALE};
use crate::error::SortError;
use crate::tests::test_data::is_permutation;

/// Minimum over all injective row -> column maps.
fn brute_force(costs: &CostMatrix) -> i64 {
    fn search(costs: &CostMatrix, row: usize, used: &mut Vec<bool>) -> i64 {
        let (n, m) = costs.shape();
        if row == n {
            return 0;
        }
        let mut best = i64::MAX;
        for j in 0..m {
            if !used[j] {
                used[j] = true;
                let rest = search(costs, row + 1, used);
                used[j] = false;
                best = best.min(costs.get(row, j) + rest);
            }
        }
        best
    }
    search(costs, 0, &mut vec![false; costs.shape().1])
}

fn random_costs(n: usize, m: usize, max: i64, rng: &mut ChaCha8Rng) -> CostMatrix {
    let data = (0..n * m).map(|_| rng.random_range(0..=max)).collect();
    CostMatrix::new(n, m, data).unwrap()
}

#[test]
fn test_known_unique_optimum() {
    let costs = CostMatrix::from_rows(&[vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]]).unwrap();
    let best = solve(&costs).unwrap();
    assert_eq!(best.row_to_col, vec![1, 0, 2]);
    assert_eq!(best.cost, 5);
}

#[test]
fn test_identity_is_optimal_for_distance_costs() {
    let rows: Vec<Vec<i64>> = (0..6)
        .map(|i: i64| (0..6).map(|j: i64| (i - j).abs()).collect())
        .collect();
    let best = solve(&CostMatrix::from_rows(&rows).unwrap()).unwrap();
    assert_eq!(best.row_to_col, (0..6).collect::<Vec<_>>());
    assert_eq!(best.cost, 0);
}

#[test]
fn test_anti_diagonal() {
    let n = 5;
    let rows: Vec<Vec<i64>> = (0..n)
        .map(|i| (0..n).map(|j| if j == n - 1 - i { 0 } else { 10 }).collect())
        .collect();
    let best = solve(&CostMatrix::from_rows(&rows).unwrap()).unwrap();
    assert_eq!(best.row_to_col, vec![4, 3, 2, 1, 0]);
    assert_eq!(best.cost, 0);
}

#[test]
fn test_matches_brute_force_square() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for n in 1..=7 {
        for _ in 0..20 {
            let costs = random_costs(n, n, 50, &mut rng);
            let best = solve(&costs).unwrap();
            assert!(is_permutation(&best.row_to_col, n));
            assert_eq!(best.cost, brute_force(&costs));
        }
    }
}

#[test]
fn test_matches_brute_force_rectangular() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    for n in 1..=5 {
        for m in n..=7 {
            let costs = random_costs(n, m, 30, &mut rng);
            let best = solve(&costs).unwrap();
            let mut cols = best.row_to_col.clone();
            cols.sort_unstable();
            cols.dedup();
            assert_eq!(cols.len(), n);
            assert_eq!(best.cost, brute_force(&costs));
        }
    }
}

#[test]
fn test_rectangular_example() {
    let costs = CostMatrix::from_rows(&[vec![5, 1, 9], vec![1, 2, 9]]).unwrap();
    let best = solve(&costs).unwrap();
    assert_eq!(best.row_to_col, vec![1, 0]);
    assert_eq!(best.cost, 2);
}

#[test]
fn test_more_rows_than_columns_is_infeasible() {
    let costs = CostMatrix::from_rows(&[vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap();
    assert_eq!(
        solve(&costs).unwrap_err(),
        SortError::AssignmentInfeasible { rows: 3, cols: 2 }
    );
}

#[test]
fn test_all_equal_costs() {
    let costs = CostMatrix::new(4, 4, vec![0; 16]).unwrap();
    let best = solve(&costs).unwrap();
    assert!(is_permutation(&best.row_to_col, 4));
    assert_eq!(best.cost, 0);
}

#[test]
fn test_deterministic_on_large_problem() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let costs = random_costs(49, 49, 2048, &mut rng);
    let a = solve(&costs).unwrap();
    let b = solve(&costs).unwrap();
    assert_eq!(a, b);
    assert!(is_permutation(&a.row_to_col, 49));

    let identity: i64 = (0..49).map(|i| costs.get(i, i)).sum();
    assert!(a.cost <= identity);
}

#[test]
fn test_empty_problem() {
    let best = solve(&CostMatrix::new(0, 0, Vec::new()).unwrap()).unwrap();
    assert!(best.row_to_col.is_empty());
    assert_eq!(best.cost, 0);
}

#[test]
fn test_cost_matrix_validation() {
    assert!(CostMatrix::new(2, 2, vec![1, 2, 3]).is_err());
    assert!(CostMatrix::from_rows(&[vec![1, 2], vec![3]]).is_err());
}

// -------------------- Quantization --------------------

#[test]
fn test_quantize_scales_to_max() {
    let d = DenseMatrix::from_iterator([0.0, 1.0, 2.0, 4.0].into_iter(), 2, 2, 0);
    let q = CostMatrix::quantize(&d, DEFAULT_COST_SCALE);
    assert_eq!(q, CostMatrix::from_rows(&[vec![0, 512], vec![1024, 2048]]).unwrap());
}

#[test]
fn test_quantize_rounds() {
    let d = DenseMatrix::from_iterator([1.0, 3.0, 2.0, 0.2].into_iter(), 2, 2, 0);
    let q = CostMatrix::quantize(&d, 10.0);
    // 1/3*10 = 3.33, 2/3*10 = 6.67, 0.2/3*10 = 0.67
    assert_eq!(q, CostMatrix::from_rows(&[vec![3, 10], vec![7, 1]]).unwrap());
}

#[test]
fn test_quantize_zero_matrix() {
    let d = DenseMatrix::from_iterator(std::iter::repeat(0.0).take(9), 3, 3, 0);
    let q = CostMatrix::quantize(&d, DEFAULT_COST_SCALE);
    assert_eq!(q, CostMatrix::new(3, 3, vec![0; 9]).unwrap());
    let best = solve(&q).unwrap();
    assert!(is_permutation(&best.row_to_col, 3));
}
