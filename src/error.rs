//! Error types surfaced by the engine and its loaders.

use std::fmt;

use serde::Serialize;

/// Synchronous rejections. Every variant is raised before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("officer '{candidate}' shares aptitude '{aptitude}' with assigned officer '{existing}'")]
    DuplicateAptitudeAssignment {
        candidate: String,
        existing: String,
        aptitude: String,
    },

    #[error("officer '{candidate}' shares category '{category}' with assigned officer '{existing}'")]
    DuplicateCategoryAssignment {
        candidate: String,
        existing: String,
        category: String,
    },

    #[error("skill '{skill}' needs {required} active skill(s) in earlier sections, found {active}")]
    SectionGateNotMet {
        skill: String,
        required: u32,
        active: u32,
    },

    #[error("skill '{skill}' conflicts with '{active}', only one may be chosen in this section")]
    ChooseOnlyOneViolation { skill: String, active: String },

    #[error("officer '{officer}' is already assigned to slot {slot}")]
    DuplicateOfficer { officer: String, slot: usize },

    #[error("slot {slot} is out of range (fleet has {slots} slots)")]
    InvalidSlot { slot: usize, slots: usize },

    #[error("slot {slot} has no officer assigned")]
    SlotEmpty { slot: usize },

    #[error("unknown aptitude '{0}'")]
    UnknownAptitude(String),

    #[error("unknown skill '{0}'")]
    UnknownSkill(String),

    #[error("skill '{skill}' does not belong to aptitude '{aptitude}'")]
    SkillNotInAptitude { skill: String, aptitude: String },

    #[error("plugin registered for skill '{skill}' identifies itself as '{found}'")]
    PluginMismatch { skill: String, found: String },

    #[error("skill '{0}' is already active")]
    SkillAlreadyActive(String),

    #[error("skill '{0}' is not active")]
    SkillNotActive(String),

    #[error("origin skill '{0}' stays active while its officer is assigned")]
    OriginSkillLocked(String),

    #[error("skill '{skill}' cannot be removed while '{dependent}' depends on it")]
    DependentSkillActive { skill: String, dependent: String },

    #[error("officer '{officer}' has no skill points left ({used}/{available})")]
    SkillPointsExhausted {
        officer: String,
        used: u32,
        available: u32,
    },

    #[error("level {level} is outside 1..={max}")]
    InvalidLevel { level: u8, max: u8 },

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{0}' already exists")]
    DuplicateEntity(String),
}

impl EngineError {
    /// Stable machine-readable name, used by the HTTP API.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateAptitudeAssignment { .. } => "duplicate_aptitude_assignment",
            Self::DuplicateCategoryAssignment { .. } => "duplicate_category_assignment",
            Self::SectionGateNotMet { .. } => "section_gate_not_met",
            Self::ChooseOnlyOneViolation { .. } => "choose_only_one_violation",
            Self::DuplicateOfficer { .. } => "duplicate_officer",
            Self::InvalidSlot { .. } => "invalid_slot",
            Self::SlotEmpty { .. } => "slot_empty",
            Self::UnknownAptitude(_) => "unknown_aptitude",
            Self::UnknownSkill(_) => "unknown_skill",
            Self::SkillNotInAptitude { .. } => "skill_not_in_aptitude",
            Self::PluginMismatch { .. } => "plugin_mismatch",
            Self::SkillAlreadyActive(_) => "skill_already_active",
            Self::SkillNotActive(_) => "skill_not_active",
            Self::OriginSkillLocked(_) => "origin_skill_locked",
            Self::DependentSkillActive { .. } => "dependent_skill_active",
            Self::SkillPointsExhausted { .. } => "skill_points_exhausted",
            Self::InvalidLevel { .. } => "invalid_level",
            Self::UnknownEntity(_) => "unknown_entity",
            Self::DuplicateEntity(_) => "duplicate_entity",
        }
    }
}

/// Error returned by a skill plugin hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HookResult = Result<(), HookError>;

/// Which lifecycle hook a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Activation,
    Advance,
    Deactivation,
    BeforeEntityCreated,
    AfterEntityCreated,
}

impl HookKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Advance => "advance",
            Self::Deactivation => "deactivation",
            Self::BeforeEntityCreated => "before_entity_created",
            Self::AfterEntityCreated => "after_entity_created",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin hook that failed and was skipped. Its staged writes were discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookFailure {
    pub skill: String,
    pub hook: HookKind,
    pub tick: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub message: String,
}

/// A modifier still installed under a skill's namespace after that skill was deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifierLeak {
    pub skill: String,
    /// `"commander"` or the entity id.
    pub target: String,
    pub stat: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("catalog is invalid: {0} error(s)")]
    Invalid(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed durable state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported durable state version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("durable state has {saved} fleet slots but the engine is configured for {configured}")]
    SlotCountMismatch { saved: usize, configured: usize },

    #[error("durable state does not fit the catalog: {0}")]
    Rejected(#[from] EngineError),
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("scenario '{scenario}' setup rejected: {source}")]
    Setup {
        scenario: String,
        #[source]
        source: EngineError,
    },
}
