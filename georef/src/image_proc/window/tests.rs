use super::*;
use approx::assert_relative_eq;
use ndarray::array;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Direct evaluation over the clipped window, for comparison.
fn naive<F>(input: &Array2<f32>, half: HalfWindow, reduce: F) -> Array2<f32>
where
    F: Fn(&[f32]) -> f32,
{
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let mut values = Vec::new();
        for rr in clipped(r, half.rows, rows) {
            for cc in clipped(c, half.cols, cols) {
                values.push(input[[rr, cc]]);
            }
        }
        reduce(&values)
    })
}

fn random_raster(seed: u64, rows: usize, cols: usize) -> Array2<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.random_range(-100.0..100.0))
}

#[test]
fn test_min_max_match_naive() {
    let input = random_raster(3, 17, 23);
    for half in [HalfWindow::square(0), HalfWindow::square(2), HalfWindow::new(5, 1)] {
        let min = naive(&input, half, |v| v.iter().copied().fold(f32::INFINITY, f32::min));
        let max = naive(&input, half, |v| v.iter().copied().fold(f32::NEG_INFINITY, f32::max));
        assert_eq!(window_min(input.view(), half), min);
        assert_eq!(window_max(input.view(), half), max);
    }
}

#[test]
fn test_bounds_and_non_negative_range() {
    let input = random_raster(11, 30, 12);
    let half = HalfWindow::square(3);
    let lo = window_min(input.view(), half);
    let hi = window_max(input.view(), half);
    let range = window_range(input.view(), half);

    Zip::from(&input)
        .and(&lo)
        .and(&hi)
        .and(&range)
        .for_each(|&v, &l, &h, &r| {
            assert!(l <= v && v <= h);
            assert!(r >= 0.0);
        });
}

#[test]
fn test_window_is_clipped_not_padded() {
    let input = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let min = window_min(input.view(), HalfWindow::square(1));
    // A zero pad would pull every border value down to 0
    assert_eq!(min, array![[1.0, 1.0, 2.0], [1.0, 1.0, 2.0]]);
}

#[test]
fn test_window_larger_than_raster() {
    let input = array![[3.0, -1.0], [7.0, 2.0]];
    let range = window_range(input.view(), HalfWindow::square(50));
    assert!(range.iter().all(|&r| r == 8.0));
}

#[test]
fn test_step_edge_range() {
    // Left half 0, right half 100, step between columns 9 and 10
    let input = Array2::from_shape_fn((12, 20), |(_, c)| if c < 10 { 0.0 } else { 100.0 });
    let range = window_range(input.view(), HalfWindow::square(2));

    for r in 0..12 {
        for c in 0..20 {
            let expected = if (8..=11).contains(&c) { 100.0 } else { 0.0 };
            assert_eq!(range[[r, c]], expected, "cell ({r}, {c})");
        }
    }
}

#[test]
fn test_range_of_range_is_range_applied_twice() {
    let input = random_raster(5, 15, 15);
    let half = HalfWindow::square(2);
    let once = window_range(input.view(), half);
    assert_eq!(
        window_range_of_range(input.view(), half),
        window_range(once.view(), half)
    );
}

#[test]
fn test_normalized_edge() {
    let edge = array![[10.0, 10.0, 10.0]];
    let distance = array![[5.0, 2.0, 4.0]];
    let out = normalized_edge(edge.view(), distance.view(), HalfWindow::new(0, 0));
    assert_eq!(out, array![[2.0, 5.0, 2.5]]);

    let out = normalized_edge(edge.view(), distance.view(), HalfWindow::new(0, 1));
    assert_eq!(out, array![[5.0, 5.0, 5.0]]);
}

#[test]
fn test_normalized_edge_zero_denominator_keeps_edge() {
    let edge = array![[7.0, 3.0], [1.0, 0.0]];
    let distance = array![[0.0, 5.0], [5.0, 5.0]];
    let out = normalized_edge(edge.view(), distance.view(), HalfWindow::square(0));
    assert_eq!(out[[0, 0]], 7.0);
    assert!(out.iter().all(|v| v.is_finite()));
}

#[test]
fn test_deviation_from_mean_matches_naive() {
    let input = random_raster(21, 9, 14);
    let half = HalfWindow::new(2, 4);
    let mean = naive(&input, half, |v| {
        (v.iter().map(|&x| f64::from(x)).sum::<f64>() / v.len() as f64) as f32
    });
    let deviation = deviation_from_mean(input.view(), half);

    for ((d, m), v) in deviation.iter().zip(mean.iter()).zip(input.iter()) {
        assert_relative_eq!(*d, v - m, epsilon = 1e-3);
    }
}

#[test]
fn test_deviation_of_constant_is_zero() {
    let input = Array2::from_elem((6, 8), 42.5f32);
    let deviation = deviation_from_mean(input.view(), HalfWindow::square(3));
    assert!(deviation.iter().all(|&d| d == 0.0));
}

#[test]
fn test_dilate_and_erode() {
    let mut mask = Array2::from_elem((7, 7), false);
    mask[[3, 3]] = true;

    let grown = dilate(mask.view(), HalfWindow::square(1));
    assert_eq!(grown.iter().filter(|&&m| m).count(), 9);
    assert!(grown[[2, 4]]);
    assert!(!grown[[1, 3]]);

    let shrunk = erode(grown.view(), HalfWindow::square(1));
    assert_eq!(shrunk.iter().filter(|&&m| m).count(), 1);
    assert!(shrunk[[3, 3]]);
}

#[test]
fn test_operators_leave_input_untouched() {
    let input = random_raster(8, 10, 10);
    let copy = input.clone();
    let half = HalfWindow::square(2);
    let _ = window_range_of_range(input.view(), half);
    let _ = deviation_from_mean(input.view(), half);
    let _ = normalized_edge(input.view(), input.view(), half);
    assert_eq!(input, copy);
}
