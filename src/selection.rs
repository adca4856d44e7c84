use std::hash::Hash;

use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::index::TreeIndex;

/// Scope of a selection or collapse toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToggleMode {
    /// Flip the item only.
    #[default]
    SelfOnly,
    /// Add or remove the item together with its siblings.
    Siblings,
    /// Add or remove every item at the same depth.
    Level,
    /// Isolate the item's ancestor chain, or clear.
    Parents,
    /// Isolate the ancestor chain plus the item's subtree, or clear.
    Chain,
    /// Set to exactly this item, or clear.
    Reset,
}

/// Bulk modification driven from outside the inspector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetOp {
    /// Replace with the given ids.
    Reset,
    /// Replace with every indexed id except the given ones.
    Invert,
    Add,
    Remove,
}

/// Insertion-ordered id set with a change counter.
///
/// The revision works as the set's identity for memoized derivations: it
/// changes exactly when the contents change.
#[derive(Clone, Debug)]
pub struct IdSet<Id> {
    order: Vec<Id>,
    members: FxHashSet<Id>,
    revision: u64,
}

impl<Id: Copy + Eq + Hash> Default for IdSet<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + Eq + Hash> FromIterator<Id> for IdSet<Id> {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set.revision = 0;
        set
    }
}

impl<Id: Copy + Eq + Hash> IdSet<Id> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            members: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
            revision: 0,
        }
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.members.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids in insertion order.
    pub fn as_slice(&self) -> &[Id] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.order.iter().copied()
    }

    /// Position of `id` in insertion order.
    pub fn position(&self, id: Id) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.order.iter().position(|&other| other == id)
    }

    pub fn insert(&mut self, id: Id) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.order.push(id);
        self.revision += 1;
        true
    }

    pub fn remove(&mut self, id: Id) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.order.retain(|&other| other != id);
        self.revision += 1;
        true
    }

    pub fn clear(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.order.clear();
        self.members.clear();
        self.revision += 1;
    }

    /// Keeps the ids accepted by `keep`; returns `true` if anything was dropped.
    pub fn retain<F: FnMut(Id) -> bool>(&mut self, mut keep: F) -> bool {
        let before = self.order.len();
        let members = &mut self.members;
        self.order.retain(|&id| {
            let kept = keep(id);
            if !kept {
                members.remove(&id);
            }
            kept
        });
        if self.order.len() == before {
            return false;
        }
        self.revision += 1;
        true
    }

    /// Drops ids no longer present in the index; returns `true` if anything was dropped.
    pub fn prune(&mut self, index: &TreeIndex<Id>) -> bool {
        self.retain(|id| index.contains(id))
    }

    /// Replaces the contents, bumping the revision only on an actual change.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = Id>) -> bool {
        let next: Self = ids.into_iter().collect();
        if next.order == self.order {
            return false;
        }
        self.order = next.order;
        self.members = next.members;
        self.revision += 1;
        true
    }

    /// Set equality, ignoring order.
    pub fn same_members(&self, other: &[Id]) -> bool {
        other.len() == self.len() && other.iter().all(|&id| self.contains(id))
    }

    /// Computes the ids this set holds after toggling `pos` in `mode`.
    ///
    /// `in_scope` limits which items may be members (every item for selection,
    /// items with children for collapsing).
    pub fn toggled<F>(
        &self,
        index: &TreeIndex<Id>,
        pos: usize,
        mode: ToggleMode,
        in_scope: F,
    ) -> Vec<Id>
    where
        F: Fn(usize) -> bool,
    {
        let items = index.items();
        let Some(item) = items.get(pos) else {
            return self.order.clone();
        };
        let adding = !self.contains(item.id);

        let add_or_remove = |group: &mut dyn Iterator<Item = usize>| -> Vec<Id> {
            let ids: Vec<Id> = group
                .filter(|&p| in_scope(p))
                .map(|p| items[p].id)
                .collect();
            if adding {
                let mut next = self.order.clone();
                next.extend(ids.into_iter().filter(|&id| !self.contains(id)));
                next
            } else {
                let drop: FxHashSet<Id> = ids.into_iter().collect();
                self.iter().filter(|id| !drop.contains(id)).collect()
            }
        };

        match mode {
            ToggleMode::SelfOnly => {
                let mut next = self.order.clone();
                if adding {
                    next.push(item.id);
                } else {
                    next.retain(|&id| id != item.id);
                }
                next
            }
            ToggleMode::Siblings => {
                let own = [pos];
                let siblings = index.siblings(pos).unwrap_or(&own);
                add_or_remove(&mut siblings.iter().copied())
            }
            ToggleMode::Level => add_or_remove(&mut index.positions_at_level(item.level)),
            ToggleMode::Parents | ToggleMode::Chain => {
                let mut chain: FxHashSet<usize> =
                    FxHashSet::with_capacity_and_hasher(item.level as usize + 1, FxBuildHasher);
                chain.insert(pos);
                chain.extend(index.ancestors(pos));
                if mode == ToggleMode::Chain {
                    chain.extend(index.descendants(pos));
                }
                let others: Vec<Id> = (0..items.len())
                    .filter(|p| !chain.contains(p) && in_scope(*p))
                    .map(|p| items[p].id)
                    .collect();
                if self.same_members(&others) {
                    Vec::new()
                } else {
                    others
                }
            }
            ToggleMode::Reset => {
                if !adding && self.len() == 1 {
                    Vec::new()
                } else {
                    vec![item.id]
                }
            }
        }
    }

    /// Computes the ids this set holds after a bulk modification.
    /// Ids not present in the index are ignored.
    pub fn modified(&self, ids: &[Id], op: SetOp, index: &TreeIndex<Id>) -> Vec<Id> {
        match op {
            SetOp::Reset => ids.iter().copied().filter(|&id| index.contains(id)).collect(),
            SetOp::Invert => {
                let given: FxHashSet<Id> = ids.iter().copied().collect();
                index.ids().filter(|id| !given.contains(id)).collect()
            }
            SetOp::Add => {
                let mut next = self.order.clone();
                for &id in ids {
                    if index.contains(id) && !self.contains(id) && !next.contains(&id) {
                        next.push(id);
                    }
                }
                next
            }
            SetOp::Remove => {
                let given: FxHashSet<Id> = ids.iter().copied().collect();
                self.iter().filter(|id| !given.contains(id)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTree, NodeId};
    use crate::model::NodeKind;

    // r ─┬─ a ─┬─ a1
    //    │     └─ a2
    //    └─ b ─── b1
    fn sample() -> (TreeIndex<NodeId>, [NodeId; 6]) {
        let mut tree = MemoryTree::new();
        let r = tree.push(None, NodeKind::Root, "r", "").unwrap();
        let a = tree.push(Some(r), NodeKind::Component, "a", "").unwrap();
        let a1 = tree.push(Some(a), NodeKind::DomElement, "a1", "").unwrap();
        let a2 = tree.push(Some(a), NodeKind::DomElement, "a2", "").unwrap();
        let b = tree.push(Some(r), NodeKind::Component, "b", "").unwrap();
        let b1 = tree.push(Some(b), NodeKind::DomElement, "b1", "").unwrap();
        (TreeIndex::from_tree(&tree), [r, a, a1, a2, b, b1])
    }

    fn toggle(
        set: &mut IdSet<NodeId>,
        index: &TreeIndex<NodeId>,
        id: NodeId,
        mode: ToggleMode,
    ) -> Vec<NodeId> {
        let next = set.toggled(index, index.position(id).unwrap(), mode, |_| true);
        set.replace(next.iter().copied());
        next
    }

    #[test]
    fn self_flips_membership() {
        let (index, [_, a, ..]) = sample();
        let mut set = IdSet::new();

        assert_eq!(toggle(&mut set, &index, a, ToggleMode::SelfOnly), vec![a]);
        assert!(toggle(&mut set, &index, a, ToggleMode::SelfOnly).is_empty());
    }

    #[test]
    fn siblings_direction_follows_target() {
        let (index, [_, _, a1, a2, ..]) = sample();
        let mut set: IdSet<NodeId> = [a2].into_iter().collect();

        // a1 absent: add the whole group.
        assert_eq!(toggle(&mut set, &index, a1, ToggleMode::Siblings), vec![a2, a1]);
        // a1 present: remove the whole group.
        assert!(toggle(&mut set, &index, a1, ToggleMode::Siblings).is_empty());
    }

    #[test]
    fn siblings_of_root_is_root_alone() {
        let (index, [r, ..]) = sample();
        let mut set = IdSet::new();
        assert_eq!(toggle(&mut set, &index, r, ToggleMode::Siblings), vec![r]);
    }

    #[test]
    fn level_covers_whole_depth() {
        let (index, [_, _, a1, a2, _, b1]) = sample();
        let mut set = IdSet::new();

        assert_eq!(toggle(&mut set, &index, b1, ToggleMode::Level), vec![a1, a2, b1]);
        assert!(toggle(&mut set, &index, a2, ToggleMode::Level).is_empty());
    }

    #[test]
    fn parents_isolates_chain_then_clears() {
        let (index, [_, _, a1, a2, b, b1]) = sample();
        let mut set = IdSet::new();

        assert_eq!(toggle(&mut set, &index, a1, ToggleMode::Parents), vec![a2, b, b1]);
        assert!(toggle(&mut set, &index, a1, ToggleMode::Parents).is_empty());
    }

    #[test]
    fn chain_twice_restores_previous() {
        let (index, [_, a, ..]) = sample();
        let mut set: IdSet<NodeId> = IdSet::new();

        let first = toggle(&mut set, &index, a, ToggleMode::Chain);
        let second = toggle(&mut set, &index, a, ToggleMode::Chain);
        assert!(!first.is_empty());
        assert!(second.is_empty());

        // Starting from the complement goes through empty and back.
        toggle(&mut set, &index, a, ToggleMode::Chain);
        let complement = set.as_slice().to_vec();
        toggle(&mut set, &index, a, ToggleMode::Chain);
        toggle(&mut set, &index, a, ToggleMode::Chain);
        assert_eq!(set.as_slice(), complement.as_slice());
    }

    #[test]
    fn reset_sets_exactly_one_then_clears() {
        let (index, [_, a, _, _, b, _]) = sample();
        let mut set: IdSet<NodeId> = [a, b].into_iter().collect();

        assert_eq!(toggle(&mut set, &index, a, ToggleMode::Reset), vec![a]);
        assert!(toggle(&mut set, &index, a, ToggleMode::Reset).is_empty());
    }

    #[test]
    fn scope_limits_members() {
        let (index, [r, a, _, _, b, _]) = sample();
        let set = IdSet::new();
        let pos = index.position(a).unwrap();

        let collapsible = |p: usize| index.items()[p].has_children();
        let next = set.toggled(&index, pos, ToggleMode::Level, collapsible);
        assert_eq!(next, vec![a, b]);

        let chain = set.toggled(&index, pos, ToggleMode::Chain, collapsible);
        assert_eq!(chain, vec![b]);
        assert!(!chain.contains(&r));
    }

    #[test]
    fn prune_is_idempotent_on_same_snapshot() {
        let (index, [r, a, ..]) = sample();
        let mut set: IdSet<NodeId> = [r, a, 999].into_iter().collect();

        assert!(set.prune(&index));
        let revision = set.revision();
        assert!(!set.prune(&index));
        assert_eq!(set.revision(), revision);
        assert_eq!(set.as_slice(), &[r, a]);
    }

    #[test]
    fn replace_with_same_contents_keeps_revision() {
        let mut set: IdSet<u32> = [1, 2].into_iter().collect();
        let revision = set.revision();
        assert!(!set.replace([1, 2]));
        assert_eq!(set.revision(), revision);
        assert!(set.replace([2]));
        assert!(set.revision() > revision);
    }

    #[test]
    fn bulk_ops_respect_index() {
        let (index, [r, a, a1, a2, b, b1]) = sample();
        let set: IdSet<NodeId> = [a].into_iter().collect();

        assert_eq!(set.modified(&[b, 999], SetOp::Reset, &index), vec![b]);
        assert_eq!(set.modified(&[a, 999], SetOp::Add, &index), vec![a]);
        assert_eq!(set.modified(&[b], SetOp::Add, &index), vec![a, b]);
        assert!(set.modified(&[a], SetOp::Remove, &index).is_empty());
        assert_eq!(
            set.modified(&[r, a], SetOp::Invert, &index),
            vec![a1, a2, b, b1]
        );
    }
}
