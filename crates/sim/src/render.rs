//! Hardware description rendering from a flat parameter table.

use crate::error::ArtifactError;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Keys that must hold positive integers when present.
const POSITIVE_INT_KEYS: &[&str] = &[
    "NUM_NODES",
    "PE_DIM_X",
    "PE_DIM_Y",
    "SRAM_DEPTH",
    "WORD_BITS",
    "ACCUM_BITS",
    "DRAM_WIDTH",
    "SRAM_WIDTH",
];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("Invalid placeholder regex")
});

/// Turns a merged parameter table into an architecture artifact.
pub trait DesignRenderer: Send + Sync {
    /// Validate `params`, render and write to `output`. Nothing is written on error.
    fn render_to(&self, params: &BTreeMap<String, String>, output: &Path) -> Result<(), ArtifactError>;
}

/// `{{ KEY }}` substitution over a YAML template.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    source: PathBuf,
    template: String,
}

impl TemplateRenderer {
    pub fn new(source: impl Into<PathBuf>, template: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            template: template.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let template = fs::read_to_string(path)
            .map_err(|_| ArtifactError::MissingTemplate(path.to_path_buf()))?;
        Ok(Self::new(path, template))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Render to a string, rejecting unresolved placeholders and invalid YAML.
    pub fn render(&self, params: &BTreeMap<String, String>) -> Result<String, ArtifactError> {
        validate_params(params)?;

        let mut unresolved = Vec::new();
        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &regex::Captures<'_>| {
            let key = caps[1].to_ascii_uppercase();
            match params.get(&key) {
                Some(value) => value.clone(),
                None => {
                    unresolved.push(key);
                    String::new()
                }
            }
        });
        if !unresolved.is_empty() {
            unresolved.sort();
            unresolved.dedup();
            return Err(ArtifactError::Unresolved(unresolved));
        }

        let rendered = rendered.into_owned();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered)?;
        if !parsed.is_mapping() {
            return Err(ArtifactError::Malformed(format!(
                "{} does not render to a YAML mapping",
                self.source.display()
            )));
        }
        Ok(rendered)
    }
}

impl DesignRenderer for TemplateRenderer {
    fn render_to(&self, params: &BTreeMap<String, String>, output: &Path) -> Result<(), ArtifactError> {
        let rendered = self.render(params)?;
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, rendered)?;
        Ok(())
    }
}

/// Template read from disk on every render; a missing file fails that render only.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DesignRenderer for TemplateFile {
    fn render_to(&self, params: &BTreeMap<String, String>, output: &Path) -> Result<(), ArtifactError> {
        TemplateRenderer::from_file(&self.path)?.render_to(params, output)
    }
}

fn validate_params(params: &BTreeMap<String, String>) -> Result<(), ArtifactError> {
    for key in POSITIVE_INT_KEYS {
        if let Some(value) = params.get(*key) {
            match value.trim().parse::<u64>() {
                Ok(v) if v > 0 => {}
                _ => {
                    return Err(ArtifactError::InvalidParameter {
                        key: key.to_string(),
                        value: value.clone(),
                        reason: "expected a positive integer".into(),
                    })
                }
            }
        }
    }
    if let Some(value) = params.get("GLOBAL_CYCLE_SECONDS") {
        match value.trim().parse::<f64>() {
            Ok(v) if v > 0.0 && v.is_finite() => {}
            _ => {
                return Err(ArtifactError::InvalidParameter {
                    key: "GLOBAL_CYCLE_SECONDS".into(),
                    value: value.clone(),
                    reason: "expected a positive cycle time".into(),
                })
            }
        }
    }
    Ok(())
}
