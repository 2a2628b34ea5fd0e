//! Compliance specifications and their YAML loading.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUNDLED_SPECS: [(&str, &str); 2] = [
    ("cis-1.23.yaml", include_str!("../specs/cis-1.23.yaml")),
    ("nsa-1.0.yaml", include_str!("../specs/nsa-1.0.yaml")),
];

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read compliance spec {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse compliance spec {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid generation interval {0:?}")]
    InvalidInterval(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub generation_interval: Option<GenerationInterval>,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl Spec {
    /// Name of the report published for this spec.
    pub fn report_name(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    pub mapping: Mapping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub tool: String,
    #[serde(default)]
    pub checks: Vec<CheckRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRef {
    pub id: String,
}

/// How often a report is expected to be regenerated, written as a
/// Go-style duration such as `6h`, `90m` or `1h30m`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GenerationInterval {
    raw: String,
    duration: Duration,
}

impl GenerationInterval {
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl TryFrom<String> for GenerationInterval {
    type Error = SpecError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let invalid = || SpecError::InvalidInterval(raw.clone());
        let mut seconds: u64 = 0;
        let mut digits = String::new();
        for c in raw.trim().chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let unit = match c {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return Err(invalid()),
            };
            let value: u64 = digits.parse().map_err(|_| invalid())?;
            seconds = value
                .checked_mul(unit)
                .and_then(|v| seconds.checked_add(v))
                .ok_or_else(invalid)?;
            digits.clear();
        }
        if !digits.is_empty() || seconds == 0 {
            return Err(invalid());
        }
        Ok(Self {
            raw: raw.trim().to_string(),
            duration: Duration::from_secs(seconds),
        })
    }
}

impl From<GenerationInterval> for String {
    fn from(value: GenerationInterval) -> Self {
        value.raw
    }
}

impl Display for GenerationInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

pub fn parse_spec(source: &str, content: &str) -> Result<Spec, SpecError> {
    serde_yaml::from_str(content).map_err(|source_err| SpecError::Parse {
        path: source.to_string(),
        source: source_err,
    })
}

pub fn load_spec_file(path: &Path) -> Result<Spec, SpecError> {
    let content = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_spec(&path.display().to_string(), &content)
}

/// Specs shipped inside the binary.
pub fn load_bundled_specs() -> Result<Vec<Spec>, SpecError> {
    BUNDLED_SPECS
        .iter()
        .map(|(name, content)| parse_spec(name, content))
        .collect()
}
