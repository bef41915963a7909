//! Engine-wide index bound and overflow-checked size arithmetic.

/// Largest legal count or dimension anywhere in the engine (2^60).
///
/// Allocation requests whose item count or item size exceeds this bound
/// are rejected before the byte size is even computed.
pub const INDEX_MAX: u64 = 1 << 60;

/// Multiply two sizes, returning `None` on `usize` overflow.
pub fn checked_mul(a: usize, b: usize) -> Option<usize> {
    a.checked_mul(b)
}

/// Raise zero to one.
///
/// Allocation treats a zero count or zero item size as one so that a
/// successful empty allocation still yields a real block; `None` then
/// always means failure.
pub fn at_least_one(n: usize) -> usize {
    n.max(1)
}

/// Whether `n` lies within `bound` (inclusive).
pub fn within_bound(n: usize, bound: u64) -> bool {
    u64::try_from(n).is_ok_and(|n| n <= bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_max_is_two_pow_sixty() {
        assert_eq!(INDEX_MAX, 1_152_921_504_606_846_976);
    }

    #[test]
    fn checked_mul_detects_overflow() {
        assert_eq!(checked_mul(3, 4), Some(12));
        assert_eq!(checked_mul(usize::MAX, 2), None);
        assert_eq!(checked_mul(usize::MAX, 1), Some(usize::MAX));
    }

    #[test]
    fn zero_raised_to_one() {
        assert_eq!(at_least_one(0), 1);
        assert_eq!(at_least_one(1), 1);
        assert_eq!(at_least_one(17), 17);
    }

    #[test]
    fn bound_is_inclusive() {
        assert!(within_bound(10, 10));
        assert!(!within_bound(11, 10));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn checked_mul_agrees_with_u128(a in any::<usize>(), b in any::<usize>()) {
                let wide = a as u128 * b as u128;
                match checked_mul(a, b) {
                    Some(p) => prop_assert_eq!(p as u128, wide),
                    None => prop_assert!(wide > usize::MAX as u128),
                }
            }
        }
    }
}
