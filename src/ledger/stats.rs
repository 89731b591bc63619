//! Stat ids shared by the engine, the catalog and presentation layers.
//! Catalog files may target any other stat name; these are the ones the engine reads itself.

/// Maximum combat readiness of a ship, as a fraction (0.7 = 70%).
pub const MAX_COMBAT_READINESS: &str = "max_combat_readiness";
/// Commander stat holding externally injected automated-points bonuses.
pub const AUTOMATED_POINTS: &str = "automated_points";
/// Per-ship multiplier on the ship's automated-points cost (base 1.0).
pub const AUTO_POINTS_MULT: &str = "auto_points_mult";
/// Commander stat: minimum deployment points as a fraction of battle size.
pub const DEPLOYMENT_POINTS_MIN_FRACTION: &str = "deployment_points_min_fraction";
