//! Mapper and constraint artifact for one scheduling mode.

use crate::error::ArtifactError;
use pimforge_design::ScheduleMode;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

pub const MAPPER_ALGORITHM: &str = "random-pruned";
pub const MAPPER_VICTORY_CONDITION: u64 = 100;
pub const MAPPER_TIMEOUT: u64 = 60;

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn section<'a>(root: &'a mut Mapping, name: &str, default: Value) -> Result<&'a mut Mapping, ArtifactError> {
    let entry = root.entry(key(name)).or_insert(default);
    if entry.is_null() {
        *entry = Value::Mapping(Mapping::new());
    }
    entry
        .as_mapping_mut()
        .ok_or_else(|| ArtifactError::Malformed(format!("`{}` must be a mapping", name)))
}

/// Build the mapping document.
///
/// `base` is an optional user mapper file whose sections are kept; the search
/// knobs are always overwritten. Spatial mode appends a constraint that
/// partitions `M` across `nodes` at `node_level`.
pub fn build_mapping(
    base: Option<&str>,
    mode: ScheduleMode,
    nodes: u32,
    node_level: &str,
) -> Result<String, ArtifactError> {
    let mut root = match base {
        Some(text) => match serde_yaml::from_str::<Value>(text)? {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => return Err(ArtifactError::Malformed("mapper template is not a mapping".into())),
        },
        None => Mapping::new(),
    };

    if !root.contains_key("mapspace") {
        let mut mapspace = Mapping::new();
        mapspace.insert(key("template"), key("uber"));
        mapspace.insert(key("version"), Value::from(0.4));
        root.insert(key("mapspace"), Value::Mapping(mapspace));
    }

    let mapper = section(&mut root, "mapper", Value::Mapping(Mapping::new()))?;
    mapper.insert(key("victory-condition"), Value::from(MAPPER_VICTORY_CONDITION));
    mapper.insert(key("timeout"), Value::from(MAPPER_TIMEOUT));
    mapper.insert(key("algorithm"), key(MAPPER_ALGORITHM));

    let mut default_constraints = Mapping::new();
    default_constraints.insert(key("version"), Value::from(0.4));
    let constraints = section(&mut root, "constraints", Value::Mapping(default_constraints))?;
    let targets = constraints
        .entry(key("targets"))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    if targets.is_null() {
        *targets = Value::Sequence(Vec::new());
    }
    let targets = targets
        .as_sequence_mut()
        .ok_or_else(|| ArtifactError::Malformed("`constraints.targets` must be a list".into()))?;

    if mode == ScheduleMode::Spatial {
        let mut target = Mapping::new();
        target.insert(key("target"), key(node_level));
        target.insert(key("type"), key("spatial"));
        target.insert(key("factors"), Value::String(format!("M={}", nodes)));
        target.insert(key("permutation"), key("M"));
        targets.push(Value::Mapping(target));
    }

    Ok(serde_yaml::to_string(&Value::Mapping(root))?)
}

pub fn write_mapping(
    base: Option<&Path>,
    mode: ScheduleMode,
    nodes: u32,
    node_level: &str,
    output: &Path,
) -> Result<(), ArtifactError> {
    let base_text = match base {
        Some(path) => Some(
            fs::read_to_string(path).map_err(|_| ArtifactError::MissingTemplate(path.to_path_buf()))?,
        ),
        None => None,
    };
    let document = build_mapping(base_text.as_deref(), mode, nodes, node_level)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Value {
        serde_yaml::from_str(doc).unwrap()
    }

    #[test]
    fn test_baseline_has_no_spatial_constraint() {
        let doc = parse(&build_mapping(None, ScheduleMode::Baseline, 8, "PIM_Node").unwrap());
        assert_eq!(doc["mapper"]["algorithm"].as_str(), Some("random-pruned"));
        assert_eq!(doc["mapper"]["victory-condition"].as_u64(), Some(100));
        assert!(doc["constraints"]["targets"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_spatial_partitions_across_nodes() {
        let doc = parse(&build_mapping(None, ScheduleMode::Spatial, 8, "PIM_Node").unwrap());
        let targets = doc["constraints"]["targets"].as_sequence().unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0]["target"].as_str(), Some("PIM_Node"));
        assert_eq!(targets[0]["factors"].as_str(), Some("M=8"));
        assert_eq!(targets[0]["permutation"].as_str(), Some("M"));
    }

    #[test]
    fn test_base_sections_are_kept_and_knobs_overwritten() {
        let base = r#"
mapper:
  algorithm: exhaustive
  num-threads: 4
constraints:
  targets:
    - target: Node_SRAM
      type: bypass
"#;
        let doc = parse(&build_mapping(Some(base), ScheduleMode::Spatial, 2, "PIM_Node").unwrap());
        assert_eq!(doc["mapper"]["algorithm"].as_str(), Some("random-pruned"));
        assert_eq!(doc["mapper"]["num-threads"].as_u64(), Some(4));
        assert_eq!(doc["constraints"]["targets"].as_sequence().unwrap().len(), 2);
        assert_eq!(doc["mapspace"]["template"].as_str(), Some("uber"));
    }

    #[test]
    fn test_non_mapping_base_rejected() {
        assert!(build_mapping(Some("- a\n- b\n"), ScheduleMode::Baseline, 1, "PIM_Node").is_err());
    }
}
