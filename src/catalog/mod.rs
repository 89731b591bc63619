//! Skill and aptitude data: YAML parsing, validation, and plugin resolution.

pub mod parser;
pub mod resolver;
pub mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::aptitude::Aptitude;
use crate::config::EngineConfig;
use crate::error::{CatalogError, EngineError};
use crate::skills::SkillPlugin;

pub use parser::{
    load_catalog_dir, load_catalog_file, parse_catalog, CatalogFile, SkillBehavior,
    SkillDefinition,
};
pub use resolver::resolve_plugin;
pub use validate::{validate_catalog, ValidationDiagnostic, ValidationReport, ValidationSeverity};

pub const DEFAULT_CATALOG_DIR: &str = "data/catalog";

/// Builds a plugin for a skill whose behavior is provided in code rather than data.
pub type PluginFactory = Arc<dyn Fn(&EngineConfig) -> Box<dyn SkillPlugin> + Send + Sync>;

/// Every known aptitude and skill, keyed by id.
#[derive(Clone, Default)]
pub struct Catalog {
    aptitudes: BTreeMap<String, Aptitude>,
    skills: BTreeMap<String, SkillDefinition>,
    factories: BTreeMap<String, PluginFactory>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("aptitudes", &self.aptitudes.keys().collect::<Vec<_>>())
            .field("skills", &self.skills.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Catalog {
    /// Merge files without validating. Later duplicates replace earlier ones.
    pub fn from_files(files: Vec<CatalogFile>) -> Self {
        let mut catalog = Self::default();
        for file in files {
            for aptitude in file.aptitudes {
                catalog.aptitudes.insert(aptitude.id.clone(), aptitude);
            }
            for skill in file.skills {
                catalog.skills.insert(skill.id.clone(), skill);
            }
        }
        catalog
    }

    /// Validate, then merge. Diagnostics are logged; any error rejects the catalog.
    pub fn from_validated(files: Vec<CatalogFile>) -> Result<Self, CatalogError> {
        let report = validate_catalog(&files);
        for diag in &report.diagnostics {
            let context = diag.context.as_str();
            match diag.severity {
                ValidationSeverity::Error => error!(context, "{}", diag.message),
                ValidationSeverity::Warning => warn!(context, "{}", diag.message),
                ValidationSeverity::Info => debug!(context, "{}", diag.message),
            }
        }
        if report.has_errors() {
            return Err(CatalogError::Invalid(report.error_count()));
        }
        let catalog = Self::from_files(files);
        info!(
            aptitudes = catalog.aptitudes.len(),
            skills = catalog.skills.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_validated(load_catalog_dir(dir)?)
    }

    pub fn insert_aptitude(&mut self, aptitude: Aptitude) {
        self.aptitudes.insert(aptitude.id.clone(), aptitude);
    }

    pub fn insert_skill(&mut self, skill: SkillDefinition) {
        self.skills.insert(skill.id.clone(), skill);
    }

    /// Overrides the data-driven behavior of `skill_id` with a plugin built in code.
    pub fn register_plugin<F>(&mut self, skill_id: impl Into<String>, factory: F)
    where
        F: Fn(&EngineConfig) -> Box<dyn SkillPlugin> + Send + Sync + 'static,
    {
        self.factories.insert(skill_id.into(), Arc::new(factory));
    }

    pub fn aptitude(&self, id: &str) -> Option<&Aptitude> {
        self.aptitudes.get(id)
    }

    pub fn aptitudes(&self) -> &BTreeMap<String, Aptitude> {
        &self.aptitudes
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.values()
    }

    /// A fresh plugin instance for `skill_id`.
    pub fn instantiate(
        &self,
        skill_id: &str,
        config: &EngineConfig,
    ) -> Result<Box<dyn SkillPlugin>, EngineError> {
        let definition = self
            .skills
            .get(skill_id)
            .ok_or_else(|| EngineError::UnknownSkill(skill_id.to_string()))?;
        let plugin = match self.factories.get(skill_id) {
            Some(factory) => factory(config),
            None => resolve_plugin(definition, config),
        };
        if plugin.id() != skill_id {
            return Err(EngineError::PluginMismatch {
                skill: skill_id.to_string(),
                found: plugin.id().to_string(),
            });
        }
        if plugin.aptitude() != definition.aptitude {
            return Err(EngineError::SkillNotInAptitude {
                skill: skill_id.to_string(),
                aptitude: definition.aptitude.clone(),
            });
        }
        Ok(plugin)
    }
}
