use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::aptitude::Aptitude;
use crate::catalog::parser::{CatalogFile, SkillBehavior, SkillDefinition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }
}

/// Cross-checks aptitudes and skill definitions across every loaded file.
pub fn validate_catalog(files: &[CatalogFile]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut aptitudes: BTreeMap<&str, &Aptitude> = BTreeMap::new();
    for aptitude in files.iter().flat_map(|file| file.aptitudes.iter()) {
        if aptitudes.insert(aptitude.id.as_str(), aptitude).is_some() {
            report.push(
                ValidationSeverity::Error,
                format!("aptitude '{}'", aptitude.id),
                "duplicate aptitude id",
            );
        }
    }

    let mut skills: BTreeMap<&str, &SkillDefinition> = BTreeMap::new();
    for skill in files.iter().flat_map(|file| file.skills.iter()) {
        if skills.insert(skill.id.as_str(), skill).is_some() {
            report.push(
                ValidationSeverity::Error,
                format!("skill '{}'", skill.id),
                "duplicate skill id",
            );
        }
    }

    let mut placed: HashSet<&str> = HashSet::new();
    for aptitude in aptitudes.values() {
        validate_aptitude(&mut report, aptitude, &skills, &mut placed);
    }

    for skill in skills.values() {
        let context = format!("skill '{}'", skill.id);
        if !aptitudes.contains_key(skill.aptitude.as_str()) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("unknown aptitude '{}'", skill.aptitude),
            );
        } else if !placed.contains(skill.id.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "not listed in any section or as an origin skill; it can never be activated",
            );
        }
        validate_behavior(&mut report, &context, &skill.behavior);
    }

    report
}

fn validate_aptitude<'a>(
    report: &mut ValidationReport,
    aptitude: &'a Aptitude,
    skills: &BTreeMap<&str, &SkillDefinition>,
    placed: &mut HashSet<&'a str>,
) {
    let context = format!("aptitude '{}'", aptitude.id);

    match aptitude.origin_skill.as_deref() {
        None => report.push(
            ValidationSeverity::Warning,
            context.clone(),
            "no origin skill declared",
        ),
        Some(origin) => {
            check_membership(report, &context, aptitude, origin, skills);
            placed.insert(origin);
            if aptitude.section_of(origin).is_some() {
                report.push(
                    ValidationSeverity::Error,
                    context.clone(),
                    format!("origin skill '{origin}' must not also appear in a section"),
                );
            }
        }
    }

    let mut previous_required = 0;
    let mut reachable = 0_u32;
    for (index, section) in aptitude.sections.iter().enumerate() {
        let section_context = format!("{context}.sections[{index}]");
        if section.skills.is_empty() {
            report.push(ValidationSeverity::Warning, section_context.clone(), "empty section");
        }
        if section.required_previous_skills < previous_required {
            report.push(
                ValidationSeverity::Warning,
                section_context.clone(),
                format!(
                    "gate {} is lower than the previous section's gate {previous_required}",
                    section.required_previous_skills
                ),
            );
        }
        if section.required_previous_skills > reachable {
            report.push(
                ValidationSeverity::Error,
                section_context.clone(),
                format!(
                    "gate {} can never be met; earlier sections hold at most {reachable} active skill(s)",
                    section.required_previous_skills
                ),
            );
        }
        previous_required = section.required_previous_skills;
        reachable += if section.choose_only_one {
            u32::from(!section.skills.is_empty())
        } else {
            section.skills.len() as u32
        };

        for skill in &section.skills {
            if !placed.insert(skill.as_str()) {
                report.push(
                    ValidationSeverity::Error,
                    section_context.clone(),
                    format!("skill '{skill}' is listed more than once"),
                );
            }
            check_membership(report, &section_context, aptitude, skill, skills);
        }
    }
}

fn check_membership(
    report: &mut ValidationReport,
    context: &str,
    aptitude: &Aptitude,
    skill: &str,
    skills: &BTreeMap<&str, &SkillDefinition>,
) {
    match skills.get(skill) {
        None => report.push(
            ValidationSeverity::Error,
            context,
            format!("skill '{skill}' has no definition"),
        ),
        Some(definition) if definition.aptitude != aptitude.id => report.push(
            ValidationSeverity::Error,
            context,
            format!(
                "skill '{skill}' is defined under aptitude '{}'",
                definition.aptitude
            ),
        ),
        Some(_) => {}
    }
}

fn validate_behavior(report: &mut ValidationReport, context: &str, behavior: &SkillBehavior) {
    match behavior {
        SkillBehavior::AutoPoints { points, .. } if *points < 0.0 => report.push(
            ValidationSeverity::Error,
            context,
            format!("negative points {points}"),
        ),
        SkillBehavior::CombatRamp(params) if params.ramp_seconds < 0.0 => report.push(
            ValidationSeverity::Error,
            context,
            "ramp_seconds must not be negative",
        ),
        SkillBehavior::Proximity(params) if params.radius <= 0.0 => report.push(
            ValidationSeverity::Error,
            context,
            "radius must be positive",
        ),
        SkillBehavior::Static { effects } if effects.is_empty() => report.push(
            ValidationSeverity::Info,
            context,
            "static skill without effects",
        ),
        _ => {}
    }
}
