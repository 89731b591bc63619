//! Parses catalog YAML files into typed structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aptitude::Aptitude;
use crate::error::CatalogError;
use crate::skills::{ProximityParams, RampParams, StatEffect};

/// Root of one `*.catalog.yaml` file (usually one file per aptitude).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub aptitudes: Vec<Aptitude>,
    #[serde(default)]
    pub skills: Vec<SkillDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub aptitude: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub behavior: SkillBehavior,
}

impl SkillDefinition {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Which plugin family implements a skill, with its parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillBehavior {
    Static {
        effects: Vec<StatEffect>,
    },
    AutoPoints {
        points: f64,
        #[serde(default)]
        effects: Vec<StatEffect>,
    },
    CombatRamp(RampParams),
    Proximity(ProximityParams),
    #[default]
    Inert,
}

impl SkillBehavior {
    pub fn family(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::AutoPoints { .. } => "auto_points",
            Self::CombatRamp(_) => "combat_ramp",
            Self::Proximity(_) => "proximity",
            Self::Inert => "inert",
        }
    }
}

pub fn parse_catalog(raw: &str, origin: &str) -> Result<CatalogFile, CatalogError> {
    serde_yaml::from_str(raw).map_err(|source| CatalogError::Yaml {
        path: origin.to_string(),
        source,
    })
}

/// Load a single catalog file.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<CatalogFile, CatalogError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_catalog(&raw, &path.display().to_string())
}

/// Load every `*.catalog.yaml` / `*.catalog.yml` under `dir`, in file name
/// order. Other files are ignored; a missing directory yields nothing.
pub fn load_catalog_dir(dir: impl AsRef<Path>) -> Result<Vec<CatalogFile>, CatalogError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_err = |source| CatalogError::Io {
        path: dir.display().to_string(),
        source,
    };
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let name = path.file_name().and_then(|n| n.to_str());
        let is_catalog =
            name.is_some_and(|n| n.ends_with(".catalog.yaml") || n.ends_with(".catalog.yml"));
        if path.is_file() && is_catalog {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(load_catalog_file).collect()
}
