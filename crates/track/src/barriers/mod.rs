//! Barrier gates: the planner decides one segment ahead whether a gate
//! appears and where its passable opening sits, then keeps the committed
//! sections and their safe zones until they fall behind the player.

pub mod planner;
pub mod types;

pub use planner::{compute_safe_zone, opening_bounds, BarrierPlanner, OPENING_WIDTHS};
pub use types::{BarrierDraft, BarrierPlan, BarrierSection};
