//! Network-on-chip configuration for the co-simulator.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Ring,
    Mesh,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Ring => "ring",
            Topology::Mesh => "mesh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub topology: Topology,
    /// Routers per dimension.
    pub k: u32,
    /// Dimensions.
    pub n: u32,
    pub channel_width: u32,
    pub num_vcs: u32,
    pub vc_buf_size: u32,
    pub warmup_periods: u32,
    pub sim_count: u32,
    pub sample_period: u32,
}

impl NetworkConfig {
    /// Ring up to eight nodes, square 2-D mesh above.
    pub fn for_nodes(nodes: u32) -> Self {
        let nodes = nodes.max(1);
        let (topology, k, n) = if nodes <= 8 {
            (Topology::Ring, nodes, 1)
        } else {
            (Topology::Mesh, (nodes as f64).sqrt().ceil() as u32, 2)
        };
        Self {
            topology,
            k,
            n,
            channel_width: 256,
            num_vcs: 2,
            vc_buf_size: 4,
            warmup_periods: 100,
            sim_count: 1000,
            sample_period: 1000,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let fields: [(&str, String); 15] = [
            ("topology", self.topology.as_str().to_string()),
            ("k", self.k.to_string()),
            ("n", self.n.to_string()),
            ("routing_function", "min_adapt".into()),
            ("traffic", "uniform".into()),
            ("packet_size", "1".into()),
            ("channel_width", self.channel_width.to_string()),
            ("num_vcs", self.num_vcs.to_string()),
            ("vc_buf_size", self.vc_buf_size.to_string()),
            ("wait_for_tail_credit", "1".into()),
            ("sim_type", "latency".into()),
            ("warmup_periods", self.warmup_periods.to_string()),
            ("sim_count", self.sim_count.to_string()),
            ("sample_period", self.sample_period.to_string()),
            ("use_read_write", "0".into()),
        ];
        for (key, value) in fields {
            let _ = writeln!(out, "{} = {};", key, value);
        }
        out
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())
    }
}
