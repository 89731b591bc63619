use serde::{Deserialize, Serialize};

/// What the bonus does once usage exceeds twice the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeyondDouble {
    /// Keep decaying along the same slope until the floor is reached.
    #[default]
    Linear,
    /// Hold at half of the maximum bonus.
    Plateau,
}

/// Clamped ramp from usage ratio to bonus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdCurve {
    /// Bonus granted while usage stays within the maximum.
    pub max_bonus: f64,
    pub beyond_double: BeyondDouble,
    /// Lowest bonus as a fraction of `max_bonus`.
    pub floor: f64,
}

impl Default for ThresholdCurve {
    fn default() -> Self {
        Self {
            max_bonus: 100.0,
            beyond_double: BeyondDouble::Linear,
            floor: 0.0,
        }
    }
}

impl ThresholdCurve {
    pub fn with_max_bonus(max_bonus: f64) -> Self {
        Self {
            max_bonus,
            ..Self::default()
        }
    }

    /// Fraction of `max_bonus` granted at `used / maximum`.
    ///
    /// 1.0 up to ratio 1, linear down to 0.5 at ratio 2, then either held at
    /// 0.5 or continued on the same slope, never below `floor`.
    pub fn fraction(&self, used: f64, maximum: f64) -> f64 {
        if maximum <= 0.0 {
            return 0.0;
        }
        let ratio = used.max(0.0) / maximum;
        let floor = self.floor.clamp(0.0, 1.0);
        if ratio <= 1.0 {
            return 1.0;
        }
        if ratio >= 2.0 && self.beyond_double == BeyondDouble::Plateau {
            return 0.5_f64.max(floor);
        }
        (1.0 - 0.5 * (ratio - 1.0)).max(floor)
    }
}

/// Bonus granted for `used` points against `maximum` under `curve`.
pub fn bonus_percent(used: f64, maximum: f64, curve: &ThresholdCurve) -> f64 {
    curve.max_bonus * curve.fraction(used, maximum)
}
