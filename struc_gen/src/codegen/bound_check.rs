/* Bound-check pass - fills the placeholder left by the final flush once a
   structure's layout is complete. */

use super::shared::ir::{ArenaError, LayoutPlan, Stmt};
use tracing::debug;

/// Fills the plan's pending slot with a check of the cursor against `limit`.
///
/// Returns `false` when the plan has no pending slot (already consumed).
pub fn apply_bound_check(plan: &mut LayoutPlan, limit: &str) -> Result<bool, ArenaError> {
    let Some(slot) = plan.bound_check.take() else {
        return Ok(false);
    };
    plan.arena.fill(
        slot,
        Stmt::BoundCheck {
            cursor: plan.cursor.clone(),
            limit: limit.to_string(),
        },
    )?;
    debug!(type_name = %plan.type_name, ?slot, limit, "filled bound check");
    Ok(true)
}
