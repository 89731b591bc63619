//! Fleet membership: officer slots with their exclusion rules, and the
//! materialized entities (ships) skills act on.

mod assignment;
mod entity;

pub use assignment::{can_assign, check_assignment, FleetSlots};
pub use entity::{Entity, EntitySpec, InstalledCore};
