//! Traversal state for the division tree builder.

use std::collections::BTreeMap;

use crate::types::DivisionKind;

/// Explicit "current title/chapter/section" state threaded through the scan.
///
/// Holds one last-seen slot per division kind. Entering a division clears the
/// slots of all deeper kinds, since those must be redeclared under the new
/// parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalContext {
    last_by_kind: BTreeMap<DivisionKind, usize>,
}

impl TraversalContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently declared division of a kind, by declared order.
    #[must_use]
    pub fn last(&self, kind: DivisionKind) -> Option<usize> {
        self.last_by_kind.get(&kind).copied()
    }

    /// Record a newly declared division and invalidate deeper slots.
    pub fn enter(&mut self, kind: DivisionKind, order: usize) {
        self.last_by_kind.retain(|k, _| k.depth() < kind.depth());
        self.last_by_kind.insert(kind, order);
    }

    /// The nearest non-empty slot shallower than `kind`, deepest first.
    #[must_use]
    pub fn nearest_above(&self, kind: DivisionKind) -> Option<usize> {
        self.last_by_kind
            .range(..kind)
            .next_back()
            .map(|(_, order)| *order)
    }

    #[must_use]
    pub fn current_title(&self) -> Option<usize> {
        self.last(DivisionKind::Title)
    }

    #[must_use]
    pub fn current_chapter(&self) -> Option<usize> {
        self.last(DivisionKind::Chapter)
    }

    #[must_use]
    pub fn current_section(&self) -> Option<usize> {
        self.last(DivisionKind::Section)
    }

    /// Whether no division has been declared yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_by_kind.is_empty()
    }
}
