pub trait NumExt {
    /// Returns the base 2 logarithm of the number, rounding up to the next integer.
    fn ilog2_ceil(self) -> Self;
}

impl NumExt for usize {
    #[inline]
    fn ilog2_ceil(self) -> Self {
        match self {
            0 | 1 => 0,
            n => n.next_power_of_two().trailing_zeros() as Self,
        }
    }
}

/// Returns the seed indices of a bracket with `size` slots in standard bracket order. Adjacent
/// pairs of the returned list play each other in the first round. `size` must be a power of two.
///
/// For a size of 8 this is `[0, 7, 3, 4, 1, 6, 2, 5]` (1v8, 4v5, 2v7, 3v6).
pub fn bracket_order(size: usize) -> Vec<usize> {
    debug_assert!(size.is_power_of_two());

    let mut order = vec![0];
    while order.len() < size {
        let len = order.len() * 2;
        order = order.into_iter().flat_map(|s| [s, len - 1 - s]).collect();
    }

    order
}

#[cfg(test)]
mod tests {
    use super::{bracket_order, NumExt};

    #[test]
    fn test_ilog2() {
        assert_eq!(2_usize.ilog2_ceil(), 1);
        assert_eq!(3_usize.ilog2_ceil(), 2);
        assert_eq!(4_usize.ilog2_ceil(), 2);
        assert_eq!(5_usize.ilog2_ceil(), 3);
        assert_eq!(8_usize.ilog2_ceil(), 3);
        assert_eq!(9_usize.ilog2_ceil(), 4);
        assert_eq!(16_usize.ilog2_ceil(), 4);
        assert_eq!(17_usize.ilog2_ceil(), 5);
        assert_eq!(32_usize.ilog2_ceil(), 5);
    }

    #[test]
    fn test_bracket_order() {
        assert_eq!(bracket_order(1), [0]);
        assert_eq!(bracket_order(2), [0, 1]);
        assert_eq!(bracket_order(4), [0, 3, 1, 2]);
        assert_eq!(bracket_order(8), [0, 7, 3, 4, 1, 6, 2, 5]);
        assert_eq!(
            bracket_order(16),
            [0, 15, 7, 8, 3, 12, 4, 11, 1, 14, 6, 9, 2, 13, 5, 10]
        );
    }
}
