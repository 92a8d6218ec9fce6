//! The flattened, parent-linked division tree.

use std::collections::BTreeMap;

use crate::types::{Division, DivisionKind};

/// Divisions in declaration order.
///
/// `parent_ref` values index into the same list, so a division never
/// outlives the tree that created it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivisionTree {
    divisions: Vec<Division>,
}

impl DivisionTree {
    /// Build a tree from divisions already sorted by declaration order.
    #[must_use]
    pub fn new(divisions: Vec<Division>) -> Self {
        Self { divisions }
    }

    #[must_use]
    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }

    #[must_use]
    pub fn get(&self, order: usize) -> Option<&Division> {
        self.divisions.get(order)
    }

    #[must_use]
    pub fn parent(&self, order: usize) -> Option<&Division> {
        self.get(order)
            .and_then(|d| d.parent_ref)
            .and_then(|p| self.get(p))
    }

    /// Direct children of a division, in declaration order.
    pub fn children(&self, order: usize) -> impl Iterator<Item = &Division> {
        self.divisions
            .iter()
            .filter(move |d| d.parent_ref == Some(order))
    }

    /// Ancestors of a division, root first, ending with the division itself.
    #[must_use]
    pub fn path(&self, order: usize) -> Vec<&Division> {
        let mut path = Vec::new();
        let mut current = self.get(order);
        while let Some(division) = current {
            path.push(division);
            // Parents always precede children, which bounds the walk
            current = division
                .parent_ref
                .filter(|p| *p < division.declared_order)
                .and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    /// Divisions ordered as assignment cut points: by position, then depth.
    #[must_use]
    pub fn cut_points(&self) -> Vec<&Division> {
        let mut points: Vec<&Division> = self.divisions.iter().collect();
        points.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.kind.depth().cmp(&b.kind.depth()))
        });
        points
    }

    /// Number of divisions per kind.
    #[must_use]
    pub fn count_by_kind(&self) -> BTreeMap<DivisionKind, usize> {
        let mut counts = BTreeMap::new();
        for division in &self.divisions {
            *counts.entry(division.kind).or_insert(0) += 1;
        }
        counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }
}
