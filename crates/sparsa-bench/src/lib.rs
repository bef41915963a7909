//! Benchmark profiles for the Sparsa session and allocation core.
//!
//! - [`request_profile`]: deterministic `(count, size)` allocation requests
//!   shaped like the sparse-kernel workloads the engine sees
//! - [`scratch_profile`]: deterministic scratch sizes with occasional spikes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use sparsa_core::INDEX_MAX;

const LCG_MUL: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

fn lcg(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
    *state >> 33
}

/// Generate `n` deterministic allocation requests.
///
/// Counts cover empty objects (count 0), small vectors, and larger column
/// arrays; sizes are the primitive element widths 1, 2, 4, 8, and 16.
/// Every request is within [`INDEX_MAX`] and fits in memory.
pub fn request_profile(n: usize, seed: u64) -> Vec<(usize, usize)> {
    const SIZES: [usize; 5] = [1, 2, 4, 8, 16];
    let mut state = seed;
    (0..n)
        .map(|_| {
            let r = lcg(&mut state);
            let count = match r % 10 {
                0 => 0,
                1..=6 => (r % 64) as usize,
                _ => (r % 4096) as usize,
            };
            let size = SIZES[(lcg(&mut state) % SIZES.len() as u64) as usize];
            debug_assert!((count as u64) < INDEX_MAX);
            (count, size)
        })
        .collect()
}

/// Generate `n` deterministic scratch requests in bytes.
///
/// Most requests fall below `base`; roughly one in sixteen is a spike up
/// to `4 * base`, forcing a regrowth.
pub fn scratch_profile(n: usize, base: usize, seed: u64) -> Vec<usize> {
    let base = base.max(1);
    let mut state = seed;
    (0..n)
        .map(|_| {
            let r = lcg(&mut state) as usize;
            if r % 16 == 0 {
                base + r % (3 * base)
            } else {
                r % base
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_profile_deterministic() {
        assert_eq!(request_profile(100, 7), request_profile(100, 7));
        assert_ne!(request_profile(100, 7), request_profile(100, 8));
    }

    #[test]
    fn request_profile_shape() {
        let reqs = request_profile(1000, 42);
        assert_eq!(reqs.len(), 1000);
        assert!(reqs.iter().any(|&(c, _)| c == 0));
        assert!(reqs.iter().all(|&(c, s)| c < 4096 && s.is_power_of_two() && s <= 16));
    }

    #[test]
    fn scratch_profile_bounded() {
        let sizes = scratch_profile(500, 256, 3);
        assert!(sizes.iter().all(|&s| s < 4 * 256));
        assert!(sizes.iter().any(|&s| s >= 256), "expected at least one spike");
    }
}
