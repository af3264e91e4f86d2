//! Design points and the integer domain they are drawn from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One bounded integer hardware parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dimension {
    pub name: String,
    pub low: i64,
    pub high: i64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, low: i64, high: i64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
        }
    }

    /// Width of the closed interval `[low, high]` in units.
    pub fn span(&self) -> i64 {
        self.high - self.low
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.low, self.high)
    }
}

/// The global search domain: an ordered list of integer dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignSpace {
    pub dimensions: Vec<Dimension>,
}

/// Dimension names the hardware mapping understands.
pub const DIM_NODES: &str = "nodes";
pub const DIM_PE: &str = "pe";
pub const DIM_SRAM_LOG2: &str = "sram_log2";

impl DesignSpace {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self { dimensions }
    }

    /// Node count, PE array dimension and on-chip memory capacity exponent.
    pub fn pim_default() -> Self {
        Self::new(vec![
            Dimension::new(DIM_NODES, 1, 16),
            Dimension::new(DIM_PE, 4, 32),
            Dimension::new(DIM_SRAM_LOG2, 18, 25),
        ])
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        point.len() == self.len()
            && self
                .dimensions
                .iter()
                .zip(point.coords())
                .all(|(dim, &v)| dim.contains(v))
    }

    /// Validate that the domain is usable for search.
    pub fn validate(&self) -> Result<(), String> {
        if self.dimensions.is_empty() {
            return Err("Design space has no dimensions".into());
        }
        for (i, dim) in self.dimensions.iter().enumerate() {
            if dim.name.is_empty() {
                return Err(format!("Dimension {} has an empty name", i));
            }
            if dim.low > dim.high {
                return Err(format!(
                    "Dimension {} has inverted bounds [{}, {}]",
                    dim.name, dim.low, dim.high
                ));
            }
            if self.dimensions[..i].iter().any(|d| d.name == dim.name) {
                return Err(format!("Duplicate dimension name: {}", dim.name));
            }
        }
        Ok(())
    }

    /// Parse a comma separated coordinate list such as `4,16,20`.
    pub fn parse_point(&self, text: &str) -> Result<DesignPoint, String> {
        let coords = text
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|e| format!("Invalid coordinate '{}': {}", part.trim(), e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let point = DesignPoint::new(coords);
        if point.len() != self.len() {
            return Err(format!(
                "Expected {} coordinates, got {}",
                self.len(),
                point.len()
            ));
        }
        if !self.contains(&point) {
            return Err(format!("Point {} lies outside the design space", point));
        }
        Ok(point)
    }
}

impl Default for DesignSpace {
    fn default() -> Self {
        Self::pim_default()
    }
}

/// An ordered tuple of integer hardware parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignPoint(Vec<i64>);

impl DesignPoint {
    pub fn new(coords: Vec<i64>) -> Self {
        Self(coords)
    }

    pub fn coords(&self) -> &[i64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact key used for directory names and log grouping.
    pub fn key(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for DesignPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

/// Concrete hardware parameters decoded from a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareParams {
    pub nodes: u32,
    pub pe_dim: u32,
    pub sram_bytes: u64,
}

impl HardwareParams {
    /// Decode a point using the dimension names of `space`.
    pub fn from_point(space: &DesignSpace, point: &DesignPoint) -> Result<Self, String> {
        let lookup = |name: &str| -> Result<i64, String> {
            let idx = space
                .index_of(name)
                .ok_or_else(|| format!("Design space has no '{}' dimension", name))?;
            point
                .get(idx)
                .ok_or_else(|| format!("Point {} has no coordinate {}", point, idx))
        };

        let nodes = lookup(DIM_NODES)?;
        let pe_dim = lookup(DIM_PE)?;
        let sram_log2 = lookup(DIM_SRAM_LOG2)?;

        if nodes < 1 {
            return Err(format!("Node count must be >= 1, got {}", nodes));
        }
        if pe_dim < 1 {
            return Err(format!("PE dimension must be >= 1, got {}", pe_dim));
        }
        if !(0..63).contains(&sram_log2) {
            return Err(format!("SRAM exponent out of range: {}", sram_log2));
        }

        Ok(Self {
            nodes: nodes as u32,
            pe_dim: pe_dim as u32,
            sram_bytes: 1u64 << sram_log2,
        })
    }

    /// SRAM depth in words, never below 64 entries.
    pub fn sram_depth(&self, word_bits: u32) -> u64 {
        let word_bytes = u64::from((word_bits / 8).max(1));
        (self.sram_bytes / word_bytes).max(64)
    }
}
