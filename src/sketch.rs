use std::f64::consts::LN_2;

mod bloom_filter;
mod counting_bloom_filter;
mod hyper_log_log;

pub use bloom_filter::RollingBloomFilter;
pub use counting_bloom_filter::RollingCountingBloomFilter;
pub use hyper_log_log::HyperLogLog;

/// Filter size and number of hashes minimizing the false positive rate for
/// `num_elements` keys at `bits_per_element`
pub fn optimal_parameters(num_elements: usize, bits_per_element: usize) -> (usize, usize) {
    let size = num_elements.max(1).saturating_mul(bits_per_element.max(1));
    let nhashes = ((LN_2 * bits_per_element as f64).round() as usize).max(1);
    (size, nhashes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn optimal() {
        assert_eq!(optimal_parameters(1000, 10), (10000, 7));
        assert_eq!(optimal_parameters(1, 1), (1, 1));
        assert_eq!(optimal_parameters(0, 16), (16, 11));
    }
}
