use super::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_integer_points(rng: &mut ChaCha8Rng, count: usize, extent: i32) -> Vec<[f64; 2]> {
    (0..count)
        .map(|_| {
            [
                rng.random_range(0..extent) as f64,
                rng.random_range(0..extent) as f64,
            ]
        })
        .collect()
}

#[test]
fn test_tree_matches_brute_force_with_ties() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    // Small extent forces duplicates and many equidistant candidates
    let points = random_integer_points(&mut rng, 400, 30);
    let index = PointIndex::new(&points);
    assert_eq!(index.len(), 400);

    for row in 0..30 {
        for col in 0..30 {
            let query = [row as f64 + 0.5, col as f64];
            let expected = brute_force_nearest(&points, query).unwrap();
            assert_eq!(index.nearest(query), Some(expected), "query {query:?}");
        }
    }
}

#[test]
fn test_tree_matches_brute_force_real_coordinates() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let points: Vec<[f64; 2]> = (0..1000)
        .map(|_| [rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)])
        .collect();
    let index = PointIndex::new(&points);

    for _ in 0..500 {
        let query = [rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0)];
        let expected = brute_force_nearest(&points, query).unwrap();
        let hit = index.nearest(query).unwrap();
        assert_eq!(hit.index, expected.index);
        assert_eq!(hit.distance_squared, expected.distance_squared);
    }
}

#[test]
fn test_equidistant_prefers_lowest_index() {
    // Four points around the origin, all at distance 1, plus filler to force the tree
    let mut points = vec![[0.0, 1.0], [1.0, 0.0], [0.0, -1.0], [-1.0, 0.0]];
    points.extend((0..40).map(|i| [100.0 + i as f64, 100.0]));
    let index = PointIndex::new(&points);

    let hit = index.nearest([0.0, 0.0]).unwrap();
    assert_eq!(hit.index, 0);
    assert_eq!(hit.distance(), 1.0);
}

#[test]
fn test_from_locatable() {
    struct Marker {
        col: f64,
        row: f64,
    }

    impl Locatable2d for Marker {
        fn x(&self) -> f64 {
            self.col
        }

        fn y(&self) -> f64 {
            self.row
        }
    }

    let markers = vec![
        Marker { col: 5.0, row: 5.0 },
        Marker { col: 0.0, row: 0.0 },
    ];
    let index = PointIndex::from_locatable(&markers);
    assert_eq!(index.nearest([1.0, 1.0]).unwrap().index, 1);
}

#[test]
fn test_empty_index() {
    let index = PointIndex::new(&[]);
    assert!(index.is_empty());
    assert!(index.nearest([0.0, 0.0]).is_none());
}
