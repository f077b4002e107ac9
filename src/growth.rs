//! Growth policy: prime bucket counts and the load-factor trigger.

/// Bucket counts the table moves through, in order. The last entry is the
/// ceiling; once reached, the table stops growing and chains get longer.
pub const PRIMES: [usize; 28] = [
    53,
    97,
    193,
    389,
    769,
    1_543,
    3_079,
    6_151,
    12_289,
    24_593,
    49_157,
    98_317,
    196_613,
    393_241,
    786_433,
    1_572_869,
    3_145_739,
    6_291_469,
    12_582_917,
    25_165_843,
    50_331_653,
    100_663_319,
    201_326_611,
    402_653_189,
    805_306_457,
    1_610_612_741,
    3_221_225_473,
    4_294_967_291,
];

/// Bucket count of a freshly constructed map.
pub const INITIAL_BUCKETS: usize = PRIMES[0];

/// Largest bucket count the table will ever use.
pub const MAX_BUCKETS: usize = PRIMES[PRIMES.len() - 1];

/// Maximum load factor tolerated after an insertion.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// First prime strictly greater than `current`, or the ceiling when there is
/// none.
pub fn next_size(current: usize) -> usize {
    PRIMES
        .iter()
        .copied()
        .find(|&p| p > current)
        .unwrap_or(MAX_BUCKETS)
}

/// True when `len / buckets` is above [`MAX_LOAD_FACTOR`].
///
/// Evaluated in integers (`2 * len > buckets`) so the boundary is exact.
#[inline]
pub fn exceeds_load(len: usize, buckets: usize) -> bool {
    (len as u128) * 2 > buckets as u128
}
