use serde::Serialize;
use tracing::{debug, info_span};

use super::hooks::{invoke, FleetView};
use super::FleetEngine;
use crate::budget::{
    compute_maximum, compute_used, external_point_bonuses, BudgetSnapshot, PointsSource,
};
use crate::error::{HookFailure, HookKind};
use crate::ledger::{stats, ModifierId, ModifierKind};

pub const READINESS_LABEL: &str = "Automated ships budget";

/// Outcome of one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub elapsed: f64,
    pub dt: f64,
    pub skills_advanced: usize,
    pub budget: BudgetSnapshot,
    pub failures: Vec<HookFailure>,
}

impl FleetEngine {
    /// One simulation step.
    ///
    /// Every Active plugin advances against the same settled ledgers; their
    /// writes are then committed in skill id order, and only then is the
    /// budget read and the readiness offset re-applied.
    pub fn advance(&mut self, dt: f64) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.tick += 1;
        self.elapsed += dt;
        let span = info_span!("tick", session = %self.session, tick = self.tick);
        let _entered = span.enter();

        let view = FleetView {
            tick: self.tick,
            elapsed: self.elapsed,
            commander: &self.commander,
            entities: &self.entities,
        };
        let mut staged = Vec::new();
        let mut failures = Vec::new();
        for (skill, active) in self.active.iter_mut() {
            if !active.plugin.capabilities().handles(HookKind::Advance) {
                continue;
            }
            let label = active.plugin.name().to_string();
            match invoke(view, skill, &label, HookKind::Advance, None, |ctx| {
                active.plugin.advance(ctx, dt)
            }) {
                Ok(ops) => staged.push((skill.clone(), ops)),
                Err(failure) => failures.push(failure),
            }
        }

        let skills_advanced = staged.len();
        for (skill, ops) in staged {
            self.commit(&skill, ops);
        }
        for failure in &failures {
            self.record_failure(failure.clone());
        }

        let budget = self.budget();
        self.apply_readiness_offset(&budget);
        debug!(
            used = budget.used,
            maximum = budget.maximum,
            bonus_percent = budget.bonus_percent,
            skills_advanced,
            failed = failures.len(),
            "tick settled"
        );

        TickReport {
            tick: self.tick,
            elapsed: self.elapsed,
            dt,
            skills_advanced,
            budget,
            failures,
        }
    }

    /// Advances `ticks` steps of `config.default_tick_seconds` each.
    pub fn run_ticks(&mut self, ticks: u32) -> Vec<TickReport> {
        let dt = self.config.default_tick_seconds;
        (0..ticks).map(|_| self.advance(dt)).collect()
    }

    /// Used versus maximum points for the fleet as it stands right now.
    pub fn budget(&self) -> BudgetSnapshot {
        let used = compute_used(self.entities.values());
        let maximum = compute_maximum(
            self.active.values().map(|active| active.plugin.provided_points()),
            external_point_bonuses(&self.commander)
                .into_iter()
                .map(|bonus| bonus.points),
        );
        BudgetSnapshot::compute(used, maximum, &self.config.threshold)
    }

    /// Everything adding to the maximum, largest first.
    pub fn points_sources(&self) -> Vec<PointsSource> {
        let mut sources: Vec<PointsSource> = self
            .active
            .iter()
            .filter(|(_, active)| active.plugin.provided_points() > 0.0)
            .map(|(skill, active)| PointsSource {
                key: skill.clone(),
                label: active.plugin.name().to_string(),
                points: active.plugin.provided_points(),
            })
            .collect();
        sources.extend(external_point_bonuses(&self.commander));
        sources.sort_by(|a, b| b.points.total_cmp(&a.points).then_with(|| a.key.cmp(&b.key)));
        sources
    }

    /// One shared offset on every counted autonomous ship; none when no
    /// source provides points.
    fn apply_readiness_offset(&mut self, budget: &BudgetSnapshot) {
        let offset = budget.bonus_percent / 100.0;
        for entity in self.entities.values_mut() {
            if entity.counts_toward_budget() && !budget.is_inactive() {
                entity.stats.set(
                    stats::MAX_COMBAT_READINESS,
                    ModifierId::budget(),
                    ModifierKind::Flat,
                    offset,
                    READINESS_LABEL,
                );
            } else {
                entity
                    .stats
                    .clear(stats::MAX_COMBAT_READINESS, &ModifierId::budget());
            }
        }
    }
}
