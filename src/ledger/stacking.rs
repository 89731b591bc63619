use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    /// Added to the base value first.
    Flat,
    /// Percentage points, summed and applied to `base + flat`.
    Percent,
    /// Multiplicative factor, applied last.
    Mult,
}

impl ModifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Percent => "percent",
            Self::Mult => "mult",
        }
    }
}

/// Per-stat accumulator of every modifier kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotals {
    pub flat: f64,
    pub percent: f64,
    pub mult: f64,
}

impl Default for CategoryTotals {
    fn default() -> Self {
        Self {
            flat: 0.0,
            percent: 0.0,
            mult: 1.0,
        }
    }
}

impl CategoryTotals {
    pub fn apply(&mut self, kind: ModifierKind, value: f64) {
        match kind {
            ModifierKind::Flat => self.flat += value,
            ModifierKind::Percent => self.percent += value,
            ModifierKind::Mult => self.mult *= value,
        }
    }

    /// `(base + flat) * (1 + percent / 100) * mult`
    pub fn compose(self, base: f64) -> f64 {
        (base + self.flat) * (1.0 + self.percent / 100.0) * self.mult
    }
}
