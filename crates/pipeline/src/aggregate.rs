//! Latency overlap models, energy accounting and the area penalty.

use pimforge_design::{AggregationModel, EnergyModel, MaskingTable};

/// Per-layer inputs to aggregation, already extrapolated to full scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerMetrics {
    pub logic_cycles: f64,
    pub logic_energy_pj: f64,
    pub memory_cycles: f64,
    pub network_cycles: f64,
    pub network_energy_pj: f64,
    /// Off-chip accesses of the full layer.
    pub offchip_accesses: f64,
    /// On-chip reads per off-chip read.
    pub reuse_ratio: f64,
}

/// Aggregated latency and energy of one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTotals {
    pub cycles: f64,
    pub energy_pj: f64,
    pub masking_alpha: f64,
    pub memory_dynamic_pj: f64,
    pub memory_static_pj: f64,
}

/// Overlap credit for a reuse ratio: low reuse hides little memory latency.
pub fn masking_alpha(table: &MaskingTable, reuse_ratio: f64) -> f64 {
    table
        .thresholds
        .iter()
        .position(|&t| reuse_ratio < t)
        .and_then(|i| table.alphas.get(i))
        .or_else(|| table.alphas.last())
        .copied()
        .unwrap_or(0.0)
}

/// Total latency under `model`, plus the overlap credit that was applied.
///
/// Max-plus-overlap is `logic + memory - alpha * min(logic, memory) + network`;
/// with `alpha = 1` this is exactly `max(logic, memory) + network`. Without
/// masking `alpha` is 1, otherwise it comes from the reuse-ratio table.
/// Serial-discount is `logic + discount * memory + network`.
pub fn combine_latency(model: AggregationModel, table: &MaskingTable, m: &LayerMetrics) -> (f64, f64) {
    match model {
        AggregationModel::MaxPlusOverlap { masking } => {
            let alpha = if masking {
                masking_alpha(table, m.reuse_ratio)
            } else {
                1.0
            };
            let overlap = m.logic_cycles.min(m.memory_cycles) * alpha;
            (
                m.logic_cycles + m.memory_cycles - overlap + m.network_cycles,
                alpha,
            )
        }
        AggregationModel::SerialDiscount { discount } => (
            m.logic_cycles + discount * m.memory_cycles + m.network_cycles,
            0.0,
        ),
    }
}

pub fn aggregate_layer(
    model: AggregationModel,
    table: &MaskingTable,
    energy: &EnergyModel,
    m: &LayerMetrics,
) -> LayerTotals {
    let (cycles, masking_alpha) = combine_latency(model, table, m);
    let memory_dynamic_pj =
        m.offchip_accesses * energy.dram_bank_width_bits * energy.dram_energy_per_bit_pj;
    let memory_static_pj = energy.static_power_pj_per_cycle * cycles;
    LayerTotals {
        cycles,
        energy_pj: m.logic_energy_pj + memory_dynamic_pj + memory_static_pj + m.network_energy_pj,
        masking_alpha,
        memory_dynamic_pj,
        memory_static_pj,
    }
}

/// `1 + factor * (area - limit) / limit` above the limit, 1 otherwise.
pub fn area_penalty_factor(area_mm2: f64, limit_mm2: f64, factor: f64) -> f64 {
    if area_mm2 > limit_mm2 && limit_mm2 > 0.0 {
        1.0 + factor * (area_mm2 - limit_mm2) / limit_mm2
    } else {
        1.0
    }
}

pub fn edp(cycles: f64, energy_pj: f64) -> f64 {
    cycles * energy_pj
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(logic: f64, memory: f64, network: f64) -> LayerMetrics {
        LayerMetrics {
            logic_cycles: logic,
            memory_cycles: memory,
            network_cycles: network,
            ..LayerMetrics::default()
        }
    }

    #[test]
    fn test_masking_table_lookup() {
        let table = MaskingTable::default();
        assert_eq!(masking_alpha(&table, 0.0), 0.2);
        assert_eq!(masking_alpha(&table, 3.99), 0.2);
        assert_eq!(masking_alpha(&table, 4.0), 0.6);
        assert_eq!(masking_alpha(&table, 63.0), 0.6);
        assert_eq!(masking_alpha(&table, 64.0), 0.95);
        assert_eq!(masking_alpha(&table, 1e9), 0.95);
    }

    #[test]
    fn test_max_plus_without_masking_is_max() {
        let model = AggregationModel::MaxPlusOverlap { masking: false };
        let (total, alpha) = combine_latency(model, &MaskingTable::default(), &metrics(800.0, 300.0, 50.0));
        assert_eq!(total, 850.0);
        assert_eq!(alpha, 1.0);
    }

    #[test]
    fn test_max_plus_partial_overlap() {
        let model = AggregationModel::MaxPlusOverlap { masking: true };
        let mut m = metrics(1000.0, 500.0, 0.0);
        m.reuse_ratio = 10.0;
        let (total, alpha) = combine_latency(model, &MaskingTable::default(), &m);
        assert_eq!(alpha, 0.6);
        assert_eq!(total, 1000.0 + 500.0 - 300.0);
        assert!(total >= 1000.0);
    }

    #[test]
    fn test_serial_discount() {
        let model = AggregationModel::SerialDiscount { discount: 0.5 };
        let (total, _) = combine_latency(model, &MaskingTable::default(), &metrics(1000.0, 400.0, 0.0));
        assert_eq!(total, 1200.0);
    }

    #[test]
    fn test_energy_is_additive() {
        let energy = EnergyModel::default();
        let m = LayerMetrics {
            logic_cycles: 100.0,
            logic_energy_pj: 1000.0,
            offchip_accesses: 10.0,
            network_energy_pj: 7.0,
            ..LayerMetrics::default()
        };
        let totals = aggregate_layer(
            AggregationModel::SerialDiscount { discount: 1.0 },
            &MaskingTable::default(),
            &energy,
            &m,
        );
        assert_eq!(totals.cycles, 100.0);
        assert!((totals.memory_dynamic_pj - 10.0 * 128.0 * 1.2).abs() < 1e-9);
        assert_eq!(totals.memory_static_pj, 1100.0);
        assert!((totals.energy_pj - (1000.0 + 1536.0 + 1100.0 + 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_area_penalty() {
        assert_eq!(area_penalty_factor(60.0, 48.0, 10.0), 3.5);
        assert_eq!(area_penalty_factor(48.0, 48.0, 10.0), 1.0);
        assert_eq!(area_penalty_factor(10.0, 48.0, 10.0), 1.0);
        assert!(area_penalty_factor(61.0, 48.0, 10.0) > area_penalty_factor(60.0, 48.0, 10.0));
    }
}
