//! Division assignment for content units.
//!
//! Every division is a cut point ordered by position; a unit belongs to the
//! last cut point at or before it. Deeper divisions declared at a later
//! position take over from their parent, so sections only replace a chapter
//! for content after the first section header.

use crate::divisions::DivisionTree;
use crate::error::{Result, StructurerError};
use crate::types::ContentUnit;

/// Assign every unit to its owning division.
///
/// A unit before the first cut point goes to the first cut point. Fails only
/// when the tree has no divisions at all.
pub fn assign_divisions(tree: &DivisionTree, units: &mut [ContentUnit]) -> Result<()> {
    let cut_points = tree.cut_points();
    let Some(first) = cut_points.first() else {
        if let Some(unit) = units.first() {
            return Err(StructurerError::AssignmentFailure {
                unit: unit.raw_number.clone(),
            });
        }
        return Ok(());
    };

    for unit in units.iter_mut() {
        // Cut points are sorted, so the owner is the last one not after the unit
        let owner = match cut_points.partition_point(|d| d.position <= unit.position) {
            0 => first,
            n => &cut_points[n - 1],
        };
        tracing::trace!(
            number = %unit.raw_number,
            division = owner.declared_order,
            kind = owner.kind.as_str(),
            "Content unit assigned"
        );
        unit.division_ref = Some(owner.declared_order);
    }

    tracing::info!(units = units.len(), "Content units assigned to divisions");
    Ok(())
}

/// Check that every unit references an existing division.
pub fn verify_assigned(tree: &DivisionTree, units: &[ContentUnit]) -> Result<()> {
    for unit in units {
        let assigned = unit
            .division_ref
            .is_some_and(|order| tree.get(order).is_some());
        if !assigned {
            return Err(StructurerError::AssignmentFailure {
                unit: unit.raw_number.clone(),
            });
        }
    }
    Ok(())
}
