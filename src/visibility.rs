use std::hash::Hash;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::TreeIndex;
use crate::matching::MatchSets;
use crate::selection::IdSet;

/// Toggles that decide how collapsing and matching hide rows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisibilityOptions {
    /// While matching hides unmatched rows, ignore collapsing.
    pub show_collapsed: bool,
    /// Hide rows that are neither matched nor admitted as parent/child.
    pub hide_unmatched: bool,
    /// Admit ancestors of matched rows.
    pub show_parents: bool,
    /// Admit descendants of matched rows.
    pub show_children: bool,
    /// Leave the selection out of matching.
    pub ignore_selection: bool,
    /// Leave the filter out of matching.
    pub ignore_filter: bool,
}

/// Per-row display flags handed to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowFlags {
    pub selected: bool,
    /// `None` for leaves, which cannot be collapsed.
    pub collapsed: Option<bool>,
    /// Shown but not matched while matching is active.
    pub dimmed: bool,
}

/// Visibility predicate over one snapshot: collapse gate AND match gate.
pub struct Visibility<'a, Id> {
    index: &'a TreeIndex<Id>,
    collapsed: &'a IdSet<Id>,
    sets: Option<&'a MatchSets>,
    options: VisibilityOptions,
}

impl<'a, Id: Copy + Eq + Hash> Visibility<'a, Id> {
    /// `sets` is `None` when no filter or selection is active.
    pub const fn new(
        index: &'a TreeIndex<Id>,
        collapsed: &'a IdSet<Id>,
        sets: Option<&'a MatchSets>,
        options: VisibilityOptions,
    ) -> Self {
        Self {
            index,
            collapsed,
            sets,
            options,
        }
    }

    /// Collapsing hides rows unless matching hides unmatched rows with
    /// `show_collapsed` on and something is actually being matched.
    #[inline]
    const fn collapse_gate(&self) -> bool {
        !self.options.hide_unmatched || !self.options.show_collapsed || self.sets.is_none()
    }

    #[inline]
    fn match_gate(&self, pos: usize) -> bool {
        match self.sets {
            Some(sets) if self.options.hide_unmatched => sets.admits(pos),
            _ => true,
        }
    }

    /// Returns `true` if the row at `pos` is eligible for display. O(depth).
    pub fn is_visible(&self, pos: usize) -> bool {
        if self.collapse_gate() && within_collapsed(self.index, self.collapsed, pos) {
            return false;
        }
        self.match_gate(pos)
    }

    /// Positions of every visible row in document order. One pass over the index.
    pub fn rows(&self) -> Vec<usize> {
        let items = self.index.items();
        let gate = self.collapse_gate() && !self.collapsed.is_empty();
        let mut hidden = if gate { vec![false; items.len()] } else { Vec::new() };
        let mut rows = Vec::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if gate && let Some(parent) = item.parent() {
                hidden[pos] = hidden[parent] || self.collapsed.contains(items[parent].id());
                if hidden[pos] {
                    continue;
                }
            }
            if self.match_gate(pos) {
                rows.push(pos);
            }
        }
        rows
    }

    /// Display flags for the row at `pos`.
    pub fn flags(&self, pos: usize, selected: &IdSet<Id>) -> RowFlags {
        let Some(item) = self.index.get(pos) else {
            return RowFlags::default();
        };
        RowFlags {
            selected: selected.contains(item.id()),
            collapsed: item
                .has_children()
                .then(|| self.collapsed.contains(item.id())),
            dimmed: self.sets.is_some_and(|sets| !sets.is_matched(pos)),
        }
    }
}

/// Returns `true` if any ancestor of `pos` is collapsed.
pub fn within_collapsed<Id: Copy + Eq + Hash>(
    index: &TreeIndex<Id>,
    collapsed: &IdSet<Id>,
    pos: usize,
) -> bool {
    if collapsed.is_empty() {
        return false;
    }
    let items = index.items();
    index
        .ancestors(pos)
        .any(|ancestor| collapsed.contains(items[ancestor].id()))
}
