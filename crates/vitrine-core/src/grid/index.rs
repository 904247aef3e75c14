//! Square-spiral numbering of the integer plane.
//!
//! Each axis is folded onto the naturals with a zig-zag map
//! (`0, -1, 1, -2, 2, …` → `0, 1, 2, 3, 4, …`), then the folded pair is
//! numbered ring by ring outward from the origin:
//!
//! ```text
//! A = 2x        if x ≥ 0 else −2x − 1
//! B = 2y        if y ≥ 0 else −2y − 1
//! index = A² + A + B   if A ≥ B
//!         B² + A       otherwise
//! ```
//!
//! Ring `n` covers exactly `n² ..= n² + 2n`, so the map is a bijection
//! between ℤ² and ℕ. Cells near the origin get small, stable indices.
//!
//! All `i32` inputs fit: the largest folded value is `2³² − 1` and
//! `A² + A + B` then tops out at `u64::MAX`.

/// Fold a signed coordinate onto the naturals.
const fn fold(v: i32) -> u64 {
    if v >= 0 {
        2 * v as u64
    } else {
        // -2v - 1 computed without overflowing at i32::MIN.
        2 * (-(v as i64)) as u64 - 1
    }
}

/// Inverse of [`fold`].
const fn unfold(v: u64) -> i32 {
    if v % 2 == 0 {
        (v / 2) as i32
    } else {
        (-((v as i64 + 1) / 2)) as i32
    }
}

/// Map a grid position to its unique non-negative index.
pub const fn index_of(x: i32, y: i32) -> u64 {
    let a = fold(x);
    let b = fold(y);
    if a >= b { a * a + a + b } else { b * b + a }
}

/// Map an index back to the grid position that produced it.
pub fn position_of(index: u64) -> (i32, i32) {
    let ring = index.isqrt();
    let offset = index - ring * ring;
    let (a, b) = if offset < ring {
        (offset, ring)
    } else {
        (ring, offset - ring)
    };
    (unfold(a), unfold(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_origin_is_zero() {
        assert_eq!(index_of(0, 0), 0);
    }

    #[test]
    fn test_origin_neighbours_fill_first_ring() {
        let mut seen = HashSet::new();
        for x in -1..=1 {
            for y in -1..=1 {
                if x == 0 && y == 0 {
                    continue;
                }
                seen.insert(index_of(x, y));
            }
        }
        let expected: HashSet<u64> = (1..=8).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_origin_neighbour_order() {
        assert_eq!(index_of(0, -1), 1);
        assert_eq!(index_of(-1, 0), 2);
        assert_eq!(index_of(-1, -1), 3);
        assert_eq!(index_of(0, 1), 4);
        assert_eq!(index_of(-1, 1), 5);
        assert_eq!(index_of(1, 0), 6);
        assert_eq!(index_of(1, -1), 7);
        assert_eq!(index_of(1, 1), 8);
    }

    #[test]
    fn test_no_collisions_on_sampled_grid() {
        let mut seen = HashSet::new();
        for x in -40..=40 {
            for y in -40..=40 {
                assert!(seen.insert(index_of(x, y)), "collision at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_folded_square_covers_prefix_of_naturals() {
        // Folded values 0..2n map onto 0..(2n)^2 exactly when x,y span [-n, n).
        let n = 12;
        let mut indices: Vec<u64> = (-n..n)
            .flat_map(|x| (-n..n).map(move |y| index_of(x, y)))
            .collect();
        indices.sort_unstable();
        let expected: Vec<u64> = (0..(2 * n as u64).pow(2)).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn test_position_of_inverts_index_of() {
        for x in -25..=25 {
            for y in -25..=25 {
                assert_eq!(position_of(index_of(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        assert_eq!(index_of(i32::MIN, i32::MIN), u64::MAX);
        for (x, y) in [
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MAX),
            (i32::MAX, i32::MAX),
            (i32::MIN, 0),
        ] {
            assert_eq!(position_of(index_of(x, y)), (x, y));
        }
    }
}
