use std::fmt::Write as _;

use serde::Serialize;

use crate::budget::{unit_points, PointsSource, UnitPoints};
use crate::engine::FleetEngine;

/// Ships listed individually before the rest are folded into one line.
pub const SHIP_LINES: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherShips {
    pub count: usize,
    pub points: f64,
}

/// Read-only projection of the automated points budget, as shown in a tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomatedPointsSummary {
    pub used: f64,
    pub maximum: f64,
    pub bonus_percent: f64,
    pub max_bonus: f64,
    /// No skill or external source provides points.
    pub inactive: bool,
    pub sources: Vec<PointsSource>,
    pub ships: Vec<UnitPoints>,
    pub other_ships: Option<OtherShips>,
}

pub fn summarize(engine: &FleetEngine) -> AutomatedPointsSummary {
    let budget = engine.budget();
    let mut ships: Vec<UnitPoints> = engine.entities().filter_map(unit_points).collect();
    ships.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| a.entity.cmp(&b.entity))
    });

    let other_ships = if ships.len() > SHIP_LINES {
        let rest = ships.split_off(SHIP_LINES);
        Some(OtherShips {
            count: rest.len(),
            points: rest.iter().map(|ship| ship.points).sum(),
        })
    } else {
        None
    };

    AutomatedPointsSummary {
        used: budget.used,
        maximum: budget.maximum,
        bonus_percent: budget.bonus_percent,
        max_bonus: budget.max_bonus,
        inactive: budget.is_inactive(),
        sources: engine.points_sources(),
        ships,
        other_ships,
    }
}

impl AutomatedPointsSummary {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.inactive {
            let _ = writeln!(out, "Automated points: inactive (no source provides points)");
        } else {
            let _ = writeln!(
                out,
                "Automated points: {:.0} / {:.0} used, readiness bonus {:.1}% of {:.1}%",
                self.used, self.maximum, self.bonus_percent, self.max_bonus
            );
        }

        if !self.sources.is_empty() {
            let _ = writeln!(out, "Sources:");
            for source in &self.sources {
                let _ = writeln!(out, "  {:<32} {:>8.0}", source.label, source.points);
            }
        }

        if !self.ships.is_empty() {
            let _ = writeln!(out, "Ships:");
            for ship in &self.ships {
                let _ = writeln!(out, "  {:<32} {:>8.0}", ship.name, ship.points);
            }
            if let Some(other) = &self.other_ships {
                let label = format!("Other ships ({})", other.count);
                let _ = writeln!(out, "  {:<32} {:>8.0}", label, other.points);
            }
        }
        out
    }
}
