use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::GridShape;
use crate::sampling::{
    subsample, window_bounds, BoundedSampler, NeighborhoodSampler, ToroidalSampler,
};

fn distinct(cells: &[usize]) -> bool {
    cells.iter().collect::<HashSet<_>>().len() == cells.len()
}

#[test]
fn test_window_bounds_shift() {
    assert_eq!(window_bounds(2, 1, 5), (1, 4));
    assert_eq!(window_bounds(0, 1, 5), (0, 3));
    assert_eq!(window_bounds(4, 1, 5), (2, 5));
    // wider than the axis: full axis
    assert_eq!(window_bounds(1, 3, 5), (0, 5));
    assert_eq!(window_bounds(0, 1, 2), (0, 2));
    assert_eq!(window_bounds(0, 0, 1), (0, 1));
}

#[test]
fn test_bounded_corner_window() {
    let sampler = BoundedSampler::new(GridShape::new(5, 5));
    let top_left = sampler.window(0, 1);
    assert_eq!(top_left, vec![0, 1, 2, 5, 6, 7, 10, 11, 12]);

    let bottom_right = sampler.window(24, 1);
    assert_eq!(bottom_right, vec![12, 13, 14, 17, 18, 19, 22, 23, 24]);
    assert!(distinct(&bottom_right));
}

#[test]
fn test_bounded_keeps_full_window_size() {
    let shape = GridShape::new(6, 8);
    let sampler = BoundedSampler::new(shape);
    for cell in 0..shape.n_cells() {
        let w = sampler.window(cell, 2);
        assert_eq!(w.len(), 25);
        assert!(distinct(&w));
        assert!(w.iter().all(|&c| c < shape.n_cells()));
    }
}

#[test]
fn test_bounded_large_radius_covers_grid() {
    let sampler = BoundedSampler::new(GridShape::new(4, 4));
    let mut w = sampler.window(5, 7);
    w.sort_unstable();
    assert_eq!(w, (0..16).collect::<Vec<_>>());
}

#[test]
fn test_toroidal_corner_window_wraps() {
    let sampler = ToroidalSampler::new(GridShape::new(5, 5));
    let w = sampler.window(0, 1);
    assert_eq!(w, vec![24, 20, 21, 4, 0, 1, 9, 5, 6]);
    assert!(distinct(&w));
}

#[test]
fn test_toroidal_windows_are_distinct() {
    let shape = GridShape::new(4, 7);
    let sampler = ToroidalSampler::new(shape);
    for radius in 0..6 {
        for cell in 0..shape.n_cells() {
            let w = sampler.window(cell, radius);
            let expected = (2 * radius + 1).min(4) * (2 * radius + 1).min(7);
            assert_eq!(w.len(), expected);
            assert!(distinct(&w));
            assert!(w.contains(&cell));
        }
    }
}

#[test]
fn test_toroidal_large_radius_covers_grid() {
    let sampler = ToroidalSampler::new(GridShape::new(4, 4));
    let mut w = sampler.window(10, 3);
    w.sort_unstable();
    assert_eq!(w, (0..16).collect::<Vec<_>>());
}

#[test]
fn test_sample_subset_without_replacement() {
    let sampler = BoundedSampler::new(GridShape::new(5, 5));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let window: HashSet<usize> = sampler.window(12, 1).into_iter().collect();

    let picked = sampler.sample(12, 1, Some(4), &mut rng);
    assert_eq!(picked.len(), 4);
    assert!(distinct(&picked));
    assert!(picked.iter().all(|c| window.contains(c)));
}

#[test]
fn test_sample_returns_all_when_short() {
    let sampler = ToroidalSampler::new(GridShape::new(5, 5));
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut picked = sampler.sample(0, 1, Some(20), &mut rng);
    picked.sort_unstable();
    let mut window = sampler.window(0, 1);
    window.sort_unstable();
    assert_eq!(picked, window);

    assert_eq!(sampler.sample(0, 1, None, &mut rng), sampler.window(0, 1));
}

#[test]
fn test_subsample_is_deterministic() {
    let cells: Vec<usize> = (100..149).collect();
    let a = subsample(cells.clone(), 10, &mut ChaCha8Rng::seed_from_u64(42));
    let b = subsample(cells, 10, &mut ChaCha8Rng::seed_from_u64(42));
    assert_eq!(a, b);
}
