//! Network-coding parameter selection and the group XOR encoder.
//!
//! The coding scheme is a deterministic thresholding on the window entropy;
//! only the degree affects the encoding operation. Encoding partitions the
//! window into contiguous groups of up to `degree` packets and folds each
//! group with a bytewise exclusive-or after zero-padding every packet to the
//! group's maximum length.

use serde::{Deserialize, Serialize};

/// Coding family tag carried in the wire metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodingScheme {
    Simple,
    Fountain,
    #[serde(rename = "RLNC")]
    Rlnc,
}

impl std::fmt::Display for CodingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodingScheme::Simple => f.write_str("Simple"),
            CodingScheme::Fountain => f.write_str("Fountain"),
            CodingScheme::Rlnc => f.write_str("RLNC"),
        }
    }
}

/// Scheme tag plus coding degree chosen for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingDecision {
    pub scheme: CodingScheme,
    /// Packets combined into one codeword.
    pub degree: usize,
}

/// Select coding parameters from the window entropy.
///
/// The three threshold regions form a strict partition of the reals:
/// - entropy below `low` → (Simple, 2)
/// - entropy in [`low`, `med`) → (Fountain, 4)
/// - entropy at or above `med` → (RLNC, 6)
pub fn select_coding(entropy: f64, low: f64, med: f64) -> CodingDecision {
    if entropy < low {
        CodingDecision {
            scheme: CodingScheme::Simple,
            degree: 2,
        }
    } else if entropy < med {
        CodingDecision {
            scheme: CodingScheme::Fountain,
            degree: 4,
        }
    } else {
        CodingDecision {
            scheme: CodingScheme::Rlnc,
            degree: 6,
        }
    }
}

/// XOR-encode a window grouped by the coding degree.
///
/// Each contiguous group of up to `degree` packets is zero-padded on the
/// right to the group's maximum length and folded with a bytewise XOR; the
/// group codewords are concatenated in group order. A single-packet group
/// passes its packet through unchanged, and an empty window yields an empty
/// byte string.
pub fn xor_encode(packets: &[Vec<u8>], degree: usize) -> Vec<u8> {
    if packets.is_empty() {
        return Vec::new();
    }
    let group_count = packets.len().div_ceil(degree);
    log::debug!("Encoding {} packets in {} groups of degree {}", packets.len(), group_count, degree);

    let mut encoded = Vec::new();
    for group in packets.chunks(degree) {
        let max_length = group.iter().map(Vec::len).max().unwrap_or(0);
        let mut codeword = vec![0u8; max_length];
        codeword[..group[0].len()].copy_from_slice(&group[0]);
        for packet in &group[1..] {
            for (out, byte) in codeword.iter_mut().zip(packet.iter()) {
                *out ^= byte;
            }
        }
        encoded.extend_from_slice(&codeword);
    }
    encoded
}
