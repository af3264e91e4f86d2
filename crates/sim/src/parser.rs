//! Parsers for the timing/area simulator outputs.

use crate::error::ArtifactError;
use regex::Regex;
use serde::Serialize;
use serde_yaml::Value;
use std::sync::LazyLock;

/// Counts and totals read from the stats text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TimingStats {
    pub cycles: u64,
    pub energy_pj: f64,
    pub dram_reads: u64,
    pub dram_writes: u64,
    pub sram_reads: u64,
    pub sram_writes: u64,
}

impl TimingStats {
    pub fn offchip_accesses(&self) -> u64 {
        self.dram_reads + self.dram_writes
    }

    /// On-chip reads per off-chip read.
    pub fn reuse_ratio(&self) -> f64 {
        self.sram_reads as f64 / self.dram_reads.max(1) as f64
    }
}

static CYCLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cycles:\s+(\d+)").expect("Invalid cycles regex"));

static ENERGY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Energy:\s+([\d.]+(?:[eE][-+]?\d+)?)\s+(\w+)").expect("Invalid energy regex")
});

static DRAM_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)===\s*(?:DRAM|MainMemory|Offchip)\s*===(.*?)(?:Level|\z)")
        .expect("Invalid DRAM section regex")
});

static SRAM_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)===\s*(?:Node_SRAM|SRAM_Buffer|GlobalBuffer)\s*===(.*?)(?:Level|\z)")
        .expect("Invalid SRAM section regex")
});

static READS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Scalar reads|Reads)[^\n]*?:\s+(\d+)").expect("Invalid reads regex")
});

static DRAM_WRITES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Scalar updates|Updates|Writes)[^\n]*?:\s+(\d+)").expect("Invalid DRAM writes regex")
});

static SRAM_WRITES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Scalar updates|Updates|Writes|Scalar fills|Fills)[^\n]*?:\s+(\d+)")
        .expect("Invalid SRAM writes regex")
});

/// Instance range such as `[0..15]`.
static INSTANCE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\.\.(\d+)\]").expect("Invalid instance range regex"));

/// Convert an energy value with a unit suffix into picojoules.
pub fn energy_to_pj(value: f64, unit: &str) -> Option<f64> {
    let scale = match unit {
        "pJ" => 1.0,
        "nJ" => 1e3,
        "uJ" | "µJ" => 1e6,
        "mJ" => 1e9,
        "J" => 1e12,
        _ => return None,
    };
    Some(value * scale)
}

fn section_counts(content: &str, section: &Regex, writes: &Regex) -> Option<(u64, u64)> {
    let body = section.captures(content)?.get(1)?.as_str();
    let grab = |re: &Regex| -> u64 {
        re.captures(body)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    Some((grab(&READS), grab(writes)))
}

/// Parse the stats text. `Cycles` and `Energy` are required.
pub fn parse_timing_stats(content: &str) -> Result<TimingStats, ArtifactError> {
    let cycles = CYCLES
        .captures(content)
        .and_then(|c| c[1].parse::<u64>().ok())
        .ok_or_else(|| ArtifactError::Parse("no `Cycles:` line in timing stats".into()))?;

    let energy_caps = ENERGY
        .captures(content)
        .ok_or_else(|| ArtifactError::Parse("no `Energy:` line in timing stats".into()))?;
    let value: f64 = energy_caps[1]
        .parse()
        .map_err(|e| ArtifactError::Parse(format!("bad energy value {}: {}", &energy_caps[1], e)))?;
    let energy_pj = energy_to_pj(value, &energy_caps[2])
        .ok_or_else(|| ArtifactError::Parse(format!("unknown energy unit `{}`", &energy_caps[2])))?;

    let mut stats = TimingStats {
        cycles,
        energy_pj,
        ..TimingStats::default()
    };

    if let Some((reads, writes)) = section_counts(content, &DRAM_SECTION, &DRAM_WRITES) {
        stats.dram_reads = reads;
        stats.dram_writes = writes;
    }
    if let Some((reads, writes)) = section_counts(content, &SRAM_SECTION, &SRAM_WRITES) {
        stats.sram_reads = reads;
        stats.sram_writes = writes;
    }

    Ok(stats)
}

fn entry_area(entry: &Value) -> Option<f64> {
    match entry.get("area")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the area summary and return the die area in mm².
///
/// Entries are in µm². System totals and DRAM are skipped; every `[a..b]`
/// range in a name multiplies the entry by `b - a + 1` instances.
pub fn parse_area_summary(content: &str) -> Result<f64, ArtifactError> {
    let doc: Value = serde_yaml::from_str(content)?;
    let table = match &doc {
        Value::Sequence(entries) => entries,
        Value::Mapping(_) => match doc.get("ART_summary") {
            Some(Value::Sequence(entries)) => entries,
            Some(summary) => match summary.get("table_summary") {
                Some(Value::Sequence(entries)) => entries,
                _ => return Err(ArtifactError::Parse("ART_summary has no table_summary".into())),
            },
            None => return Err(ArtifactError::Parse("area summary has no ART_summary".into())),
        },
        _ => return Err(ArtifactError::Parse("area summary is neither a list nor a mapping".into())),
    };

    let mut total_um2 = 0.0;
    for entry in table {
        let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
        let lower = name.to_ascii_lowercase();
        if matches!(lower.as_str(), "system" | "total" | "system_top_level") || lower.contains("dram") {
            continue;
        }
        let area = match entry_area(entry) {
            Some(a) => a,
            None => continue,
        };
        let count: u64 = INSTANCE_RANGE
            .captures_iter(name)
            .filter_map(|c| {
                let lo: u64 = c[1].parse().ok()?;
                let hi: u64 = c[2].parse().ok()?;
                hi.checked_sub(lo).map(|d| d + 1)
            })
            .product();
        total_um2 += area * count as f64;
    }

    Ok(total_um2 / 1e6)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"
Summary Stats
-------------
GFLOPs (@1GHz): 120.45
Utilization: 0.87
Cycles: 123456
Energy: 42.5 uJ
EDP(J*cycle): 5.25e+00

=== DRAM ===
    Scalar reads (per-instance)                 : 1200
    Scalar updates (per-instance)               : 300

Level 2
=== Node_SRAM ===
    Scalar reads (per-instance)                 : 96000
    Scalar fills (per-instance)                 : 1200
"#;

    #[test]
    fn test_parse_stats() {
        let stats = parse_timing_stats(STATS).unwrap();
        assert_eq!(stats.cycles, 123456);
        assert!((stats.energy_pj - 42.5e6).abs() < 1e-3);
        assert_eq!(stats.dram_reads, 1200);
        assert_eq!(stats.dram_writes, 300);
        assert_eq!(stats.sram_reads, 96000);
        assert_eq!(stats.sram_writes, 1200);
        assert_eq!(stats.offchip_accesses(), 1500);
        assert_eq!(stats.reuse_ratio(), 80.0);
    }

    #[test]
    fn test_missing_cycles_is_parse_error() {
        assert!(matches!(
            parse_timing_stats("Energy: 1.0 pJ\n"),
            Err(ArtifactError::Parse(_))
        ));
        assert!(parse_timing_stats("Cycles: 10\n").is_err());
        assert!(parse_timing_stats("Cycles: 10\nEnergy: 1.0 furlongs\n").is_err());
    }

    #[test]
    fn test_sections_optional() {
        let stats = parse_timing_stats("Cycles: 10\nEnergy: 2 nJ\n").unwrap();
        assert_eq!(stats.energy_pj, 2000.0);
        assert_eq!(stats.offchip_accesses(), 0);
    }

    #[test]
    fn test_energy_units() {
        assert_eq!(energy_to_pj(1.0, "pJ"), Some(1.0));
        assert_eq!(energy_to_pj(1.0, "mJ"), Some(1e9));
        assert_eq!(energy_to_pj(2.0, "J"), Some(2e12));
        assert_eq!(energy_to_pj(1.0, "kJ"), None);
    }

    #[test]
    fn test_area_summary_table() {
        let yaml = r#"
ART_summary:
  version: 0.4
  table_summary:
    - name: system_top_level
      area: 999999999
    - name: system_top_level.PIM_Node[0..3].Node_SRAM
      area: 2000000
    - name: system_top_level.PIM_Node[0..3].MAC[0..195]
      area: 500
    - name: system_top_level.DRAM
      area: 100000000
"#;
        let area = parse_area_summary(yaml).unwrap();
        // 4 * 2 mm² + 4 * 196 * 500 µm²
        assert!((area - (8.0 + 0.392)).abs() < 1e-9, "area = {}", area);
    }

    #[test]
    fn test_area_summary_list() {
        let yaml = "- name: total\n  area: 5\n- name: PE\n  area: \"1500000\"\n";
        assert!((parse_area_summary(yaml).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_area_summary_unrecognised() {
        assert!(parse_area_summary("foo: bar\n").is_err());
        assert!(parse_area_summary("42\n").is_err());
    }
}
