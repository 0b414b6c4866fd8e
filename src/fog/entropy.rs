//! Histogram and Shannon-entropy numeric kernel.
//!
//! Each packet is summarized as a 256-bin density-normalized histogram over
//! byte values and scored with its Shannon entropy in bits. With unit-width
//! bins the density normalization reduces to count / total, so the bins of a
//! nonempty packet sum to 1 and the entropy lies in [0, 8].

/// Number of histogram bins (one per byte value).
pub const HISTOGRAM_BINS: usize = 256;

/// Entropy substituted when the kernel produces a non-finite value.
pub const FALLBACK_ENTROPY_BITS: f64 = 5.0;

/// Density-normalized byte-value histogram of one packet.
///
/// Empty packets yield the zero vector.
pub fn byte_histogram(packet: &[u8]) -> [f64; HISTOGRAM_BINS] {
    let mut histogram = [0.0f64; HISTOGRAM_BINS];
    if packet.is_empty() {
        return histogram;
    }
    for &byte in packet {
        histogram[byte as usize] += 1.0;
    }
    let total = packet.len() as f64;
    for bin in histogram.iter_mut() {
        *bin /= total;
    }
    histogram
}

/// Shannon entropy in bits of a probability histogram: −Σ p·log₂ p over
/// bins with p > 0.
pub fn shannon_entropy(histogram: &[f64; HISTOGRAM_BINS]) -> f64 {
    -histogram
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

/// Entropy of one packet, with the neutral fallback applied if the kernel
/// output is not finite.
pub fn packet_entropy(histogram: &[f64; HISTOGRAM_BINS]) -> f64 {
    let entropy = shannon_entropy(histogram);
    if entropy.is_finite() {
        entropy
    } else {
        log::error!("Non-finite entropy from kernel, substituting {FALLBACK_ENTROPY_BITS} bits");
        FALLBACK_ENTROPY_BITS
    }
}

/// Arithmetic mean of the per-packet entropies of a window.
pub fn window_entropy(packet_entropies: &[f64]) -> f64 {
    if packet_entropies.is_empty() {
        return 0.0;
    }
    packet_entropies.iter().sum::<f64>() / packet_entropies.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn constant_bytes_have_zero_entropy() {
        let histogram = byte_histogram(&[0x41; 1000]);
        assert_eq!(packet_entropy(&histogram), 0.0);
        assert_eq!(histogram[0x41], 1.0);
    }

    #[test]
    fn empty_packet_is_the_zero_vector() {
        let histogram = byte_histogram(&[]);
        assert!(histogram.iter().all(|&p| p == 0.0));
        assert_eq!(packet_entropy(&histogram), 0.0);
    }

    #[test]
    fn uniform_bytes_reach_eight_bits() {
        // Every byte value exactly four times: a perfectly uniform distribution.
        let data: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();
        let entropy = packet_entropy(&byte_histogram(&data));
        assert!((entropy - 8.0).abs() < 1e-9, "entropy was {entropy}");
    }

    #[test]
    fn random_bytes_approach_eight_bits() {
        let mut rng = StdRng::seed_from_u64(42);
        let data: Vec<u8> = (0..1000).map(|_| rng.r#gen()).collect();
        let entropy = packet_entropy(&byte_histogram(&data));
        assert!(entropy > 7.5 && entropy <= 8.0, "entropy was {entropy}");
    }

    #[test]
    fn entropy_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1usize, 2, 17, 300] {
            let data: Vec<u8> = (0..len).map(|_| rng.r#gen()).collect();
            let histogram = byte_histogram(&data);
            let sum: f64 = histogram.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            let entropy = packet_entropy(&histogram);
            assert!((0.0..=8.0).contains(&entropy), "entropy was {entropy}");
        }
    }

    #[test]
    fn window_entropy_is_the_mean() {
        assert_eq!(window_entropy(&[2.0, 4.0, 6.0]), 4.0);
        assert_eq!(window_entropy(&[]), 0.0);
    }
}
