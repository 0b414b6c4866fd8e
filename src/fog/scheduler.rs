//! Priority-weighted two-constraint 0/1 knapsack scheduling.
//!
//! Each packet becomes one schedule item: a priority value derived from its
//! entropy and jittered energy cost, plus integer bandwidth and energy costs.
//! The scheduler maximizes the summed value subject to both cost budgets with
//! a dynamic program over `(item prefix, remaining bandwidth, remaining
//! energy)`. The prefix dimension is compressed to two value rows; take/skip
//! decisions are kept in a compact bitset and the selection is reconstructed
//! by back-walking from the full capacities.

use fixedbitset::FixedBitSet;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::config::FogConfig;

/// Integer scale applied to costs and capacities.
pub const COST_SCALE: u32 = 10;

/// Relative jitter applied to per-packet base costs.
const COST_JITTER: f64 = 0.1;

/// One packet's scheduling profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleItem {
    /// Priority value; non-positive items are never worth taking.
    pub value: f64,
    /// Scaled bandwidth cost.
    pub cost_bandwidth: u32,
    /// Scaled energy cost.
    pub cost_energy: u32,
}

/// Price every packet of a window into a schedule item.
///
/// Bandwidth and energy costs are the configured base costs with independent
/// ±10 % uniform jitter, scaled to integers; the value is
/// `γ₁·entropy − γ₂·energy` on the unscaled jittered energy.
pub fn priced_items<R: Rng>(packet_entropies: &[f64], config: &FogConfig, rng: &mut R) -> Vec<ScheduleItem> {
    let jitter = Uniform::new(-COST_JITTER, COST_JITTER);
    packet_entropies
        .iter()
        .map(|&entropy| {
            let bandwidth = config.base_bandwidth * (1.0 + jitter.sample(rng));
            let energy = config.base_energy * (1.0 + jitter.sample(rng));
            ScheduleItem {
                value: config.value_weight_entropy * entropy - config.value_weight_energy * energy,
                cost_bandwidth: (bandwidth * COST_SCALE as f64) as u32,
                cost_energy: (energy * COST_SCALE as f64) as u32,
            }
        })
        .collect()
}

/// Solve the two-constraint 0/1 knapsack.
///
/// Returns the strictly increasing indices of the selected items. Ties in the
/// objective prefer skipping (strict improvement is required to take), which
/// also keeps non-positive-value items out of the selection.
pub fn solve_knapsack(items: &[ScheduleItem], bandwidth_capacity: u32, energy_capacity: u32) -> Vec<usize> {
    let n = items.len();
    let cap_bw = bandwidth_capacity as usize;
    let cap_en = energy_capacity as usize;
    let row = cap_en + 1;
    let width = (cap_bw + 1) * row;
    log::debug!("Scheduling {n} items under capacities ({cap_bw}, {cap_en})");

    let mut previous = vec![0.0f64; width];
    let mut current = vec![0.0f64; width];
    let mut take = FixedBitSet::with_capacity(n * width);

    for (i, item) in items.iter().enumerate() {
        let cost_bw = item.cost_bandwidth as usize;
        let cost_en = item.cost_energy as usize;
        for c1 in 0..=cap_bw {
            for c2 in 0..=cap_en {
                let cell = c1 * row + c2;
                let mut best = previous[cell];
                if cost_bw <= c1 && cost_en <= c2 {
                    let candidate = previous[(c1 - cost_bw) * row + (c2 - cost_en)] + item.value;
                    if candidate > best {
                        best = candidate;
                        take.insert(i * width + cell);
                    }
                }
                current[cell] = best;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    // Back-walk the decisions from the full capacities.
    let mut selected = Vec::new();
    let mut c1 = cap_bw;
    let mut c2 = cap_en;
    for i in (0..n).rev() {
        if take.contains(i * width + c1 * row + c2) {
            selected.push(i);
            c1 -= items[i].cost_bandwidth as usize;
            c2 -= items[i].cost_energy as usize;
        }
    }
    selected.reverse();
    log::debug!("Selected {} of {n} items", selected.len());
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn item(value: f64, cost_bandwidth: u32, cost_energy: u32) -> ScheduleItem {
        ScheduleItem {
            value,
            cost_bandwidth,
            cost_energy,
        }
    }

    #[test]
    fn tight_fit_selects_the_best_pair() {
        let items = vec![item(10.0, 3, 3), item(8.0, 2, 2), item(7.0, 1, 4)];
        let selected = solve_knapsack(&items, 5, 5);
        assert_eq!(selected, vec![0, 1]);
    }

    #[test]
    fn selection_respects_both_capacities() {
        let mut rng = StdRng::seed_from_u64(11);
        let entropies: Vec<f64> = (0..40).map(|i| (i % 9) as f64).collect();
        let items = priced_items(&entropies, &FogConfig::default(), &mut rng);
        let selected = solve_knapsack(&items, 100, 100);

        assert!(selected.windows(2).all(|pair| pair[0] < pair[1]), "indices must be strictly increasing");
        let bandwidth: u32 = selected.iter().map(|&i| items[i].cost_bandwidth).sum();
        let energy: u32 = selected.iter().map(|&i| items[i].cost_energy).sum();
        assert!(bandwidth <= 100);
        assert!(energy <= 100);
    }

    #[test]
    fn non_positive_values_are_never_taken() {
        let items = vec![item(-1.0, 1, 1), item(0.0, 1, 1), item(3.0, 1, 1)];
        assert_eq!(solve_knapsack(&items, 10, 10), vec![2]);
    }

    #[test]
    fn ties_prefer_the_earlier_item() {
        // With room for only one of two equal items, taking the second never
        // strictly improves on the first.
        let items = vec![item(5.0, 1, 1), item(5.0, 1, 1)];
        assert_eq!(solve_knapsack(&items, 1, 1), vec![0]);
    }

    #[test]
    fn zero_capacity_selects_nothing() {
        let items = vec![item(9.0, 1, 1)];
        assert!(solve_knapsack(&items, 0, 0).is_empty());
        assert!(solve_knapsack(&[], 5, 5).is_empty());
    }

    #[test]
    fn priced_items_track_the_configuration() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = FogConfig::default();
        let items = priced_items(&[8.0, 0.0], &config, &mut rng);
        assert_eq!(items.len(), 2);
        for item in &items {
            // ±10 % of base 1.0, scaled by 10: the integer costs land in 9..=11.
            assert!((9..=11).contains(&item.cost_bandwidth));
            assert!((9..=11).contains(&item.cost_energy));
        }
        // γ₁·8 − γ₂·energy with energy near 1.0
        assert!(items[0].value > 7.0 && items[0].value < 8.0);
        // Zero-entropy packet prices negative
        assert!(items[1].value < 0.0);
    }
}
