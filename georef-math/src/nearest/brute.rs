//! Reference nearest-point search by linear scan.

/// Nearest point to `query` by scanning every point.
///
/// Strict `<` keeps the first of several equidistant points.
///
/// Time complexity: O(n).
pub fn brute_force_nearest(points: &[[f64; 2]], query: [f64; 2]) -> Option<super::NearestHit> {
    let mut best: Option<super::NearestHit> = None;

    for (index, point) in points.iter().enumerate() {
        let dx = point[0] - query[0];
        let dy = point[1] - query[1];
        let distance_squared = dx * dx + dy * dy;

        if best.map_or(true, |b| distance_squared < b.distance_squared) {
            best = Some(super::NearestHit {
                index,
                distance_squared,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let points = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        for (i, &p) in points.iter().enumerate() {
            let hit = brute_force_nearest(&points, p).unwrap();
            assert_eq!(hit.index, i);
            assert_eq!(hit.distance_squared, 0.0);
        }
    }

    #[test]
    fn test_many_to_one() {
        let target = vec![[0.0, 0.0], [100.0, 100.0]];
        for query in [[0.0, 0.0], [0.1, 0.0], [0.2, 0.0]] {
            assert_eq!(brute_force_nearest(&target, query).unwrap().index, 0);
        }
    }

    #[test]
    fn test_tie_keeps_first() {
        let target = vec![[2.0, 0.0], [0.0, 0.0], [1.0, 1.0]];
        let hit = brute_force_nearest(&target, [1.0, 0.0]).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.distance_squared, 1.0);
    }

    #[test]
    fn test_empty_target() {
        assert!(brute_force_nearest(&[], [0.0, 0.0]).is_none());
    }
}
