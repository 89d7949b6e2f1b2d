//! Optimal sizing formulas shared by the bloom filters.
//!
//! Both filters target a 1% false-positive rate when loaded with the
//! cardinality they were sized for:
//!
//! - slot count `m = ceil(-n * ln(0.01) / (ln 2)^2)`, about `9.585 * n`
//! - hash count `k = ceil((m / n) * ln 2)`

/// Number of filter slots for an expected cardinality of `n` distinct keys.
pub fn optimal_filter_size(cardinality: u32) -> usize {
    assert!(cardinality > 0, "filter cardinality must be greater than zero");
    let multiplier = -(0.01f64.ln()) / (2f64.ln() * 2f64.ln());
    (f64::from(cardinality) * multiplier).ceil() as usize
}

/// Number of hash functions for a filter of `filter_size` slots sized for
/// `cardinality` keys.
pub fn optimal_num_hashes(cardinality: u32, filter_size: usize) -> u32 {
    assert!(cardinality > 0, "filter cardinality must be greater than zero");
    ((filter_size as f64 / f64::from(cardinality)) * 2f64.ln()).ceil() as u32
}
