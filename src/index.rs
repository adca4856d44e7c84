use std::hash::Hash;
use std::ops::Range;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::model::{HostTree, NodeKind, WalkControl};

/// Flattened projection of one host node.
///
/// Parent and children are positions in the owning [`TreeIndex`], so the
/// owning direction (parent to children) lives in the arena and the back
/// reference is a plain index.
#[derive(Clone, Debug)]
pub struct DebugTreeItem<Id> {
    pub(crate) id: Id,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<usize>,
    pub(crate) level: u32,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) children: SmallVec<[usize; 4]>,
    // Exclusive end of this item's subtree in pre-order.
    pub(crate) subtree_end: usize,
    pub(crate) search_name: String,
    pub(crate) search_description: String,
}

impl<Id: Copy> DebugTreeItem<Id> {
    /// Identity of the source node.
    #[inline]
    pub const fn id(&self) -> Id {
        self.id
    }
}

impl<Id> DebugTreeItem<Id> {
    #[inline]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Position of the parent item, `None` at roots.
    #[inline]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Depth, 0 at roots.
    #[inline]
    pub const fn level(&self) -> u32 {
        self.level
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Positions of the direct children, empty for leaves.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Pre-order arena of [`DebugTreeItem`]s rebuilt from the host tree on every update.
pub struct TreeIndex<Id> {
    items: Vec<DebugTreeItem<Id>>,
    positions: FxHashMap<Id, usize>,
    revision: u64,
}

impl<Id: Copy + Eq + Hash> Default for TreeIndex<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + Eq + Hash> TreeIndex<Id> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: FxHashMap::default(),
            revision: 0,
        }
    }

    /// Builds an index of the whole tree.
    pub fn from_tree<T: HostTree<Id = Id>>(model: &T) -> Self {
        let mut index = Self::new();
        index.flatten(model);
        index
    }

    /// Drops every item, as if the tree were detached.
    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
        self.revision += 1;
    }

    /// Rebuilds the index from every root of the model.
    pub fn flatten<T: HostTree<Id = Id>>(&mut self, model: &T) {
        self.flatten_with(model, model.roots(), |_, _, _| WalkControl::Continue);
    }

    /// Rebuilds the index from `roots`, asking `visit` for every node whether
    /// to walk into its children.
    ///
    /// The walk is iterative and visits each node once. A node id seen twice
    /// (malformed input) is ignored the second time.
    pub fn flatten_with<T, V>(&mut self, model: &T, roots: &[Id], mut visit: V)
    where
        T: HostTree<Id = Id>,
        V: FnMut(&T, Id, u32) -> WalkControl,
    {
        self.items.clear();
        self.positions.clear();
        self.revision += 1;

        let hint = model.size_hint();
        if hint > 0 {
            self.items.reserve(hint);
            self.positions.reserve(hint);
        }

        // Pending (node, parent position, level). Children are pushed in
        // reverse so popping keeps document order ahead of pending siblings.
        let mut pending: Vec<(Id, Option<usize>, u32)> =
            Vec::with_capacity(roots.len().max(16));
        pending.extend(roots.iter().rev().map(|&id| (id, None, 0)));

        while let Some((id, parent, level)) = pending.pop() {
            let pos = self.items.len();
            if self.positions.contains_key(&id) {
                continue;
            }
            self.positions.insert(id, pos);
            let kind = model.kind(id);
            let name = model.name(id).into_owned();
            let description = model.description(id).into_owned();
            let search_name = if name.is_empty() {
                kind.fallback_name().to_lowercase()
            } else {
                name.to_lowercase()
            };
            let search_description = description.to_lowercase();
            self.items.push(DebugTreeItem {
                id,
                kind,
                parent,
                level,
                name,
                description,
                children: SmallVec::new(),
                subtree_end: pos + 1,
                search_name,
                search_description,
            });
            if let Some(parent) = parent {
                self.items[parent].children.push(pos);
            }

            if visit(model, id, level) == WalkControl::SkipChildren {
                continue;
            }
            pending.extend(
                model
                    .children(id)
                    .iter()
                    .rev()
                    .map(|&child| (child, Some(pos), level + 1)),
            );
        }

        // Children sit after their parent, so a reverse pass sees them first.
        for pos in (0..self.items.len()).rev() {
            if let Some(&last) = self.items[pos].children.last() {
                self.items[pos].subtree_end = self.items[last].subtree_end;
            }
        }
    }

    /// Counter bumped on every rebuild; identifies the snapshot for caches.
    #[inline]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DebugTreeItem<Id>] {
        &self.items
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&DebugTreeItem<Id>> {
        self.items.get(pos)
    }

    #[inline]
    pub fn position(&self, id: Id) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn item(&self, id: Id) -> Option<&DebugTreeItem<Id>> {
        self.position(id).map(|pos| &self.items[pos])
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.positions.contains_key(&id)
    }

    /// Iterates ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.items.iter().map(|item| item.id)
    }

    /// Walks from the parent of `pos` up to the root.
    pub fn ancestors(&self, pos: usize) -> Ancestors<'_, Id> {
        Ancestors {
            items: &self.items,
            next: self.items.get(pos).and_then(|item| item.parent),
        }
    }

    /// Positions of all descendants of `pos`, contiguous in pre-order.
    pub fn descendants(&self, pos: usize) -> Range<usize> {
        self.items
            .get(pos)
            .map_or(0..0, |item| pos + 1..item.subtree_end)
    }

    /// Positions of `pos` and its siblings, `None` for roots.
    pub fn siblings(&self, pos: usize) -> Option<&[usize]> {
        let parent = self.items.get(pos)?.parent?;
        Some(&self.items[parent].children)
    }

    /// Positions of every item at `level`, in document order.
    pub fn positions_at_level(&self, level: u32) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| item.level == level)
            .map(|(pos, _)| pos)
    }

    /// Returns `true` if `pos` lies inside the subtree of `ancestor`.
    pub fn is_descendant_of(&self, pos: usize, ancestor: usize) -> bool {
        self.descendants(ancestor).contains(&pos)
    }
}

/// Iterator over ancestor positions, nearest first.
pub struct Ancestors<'a, Id> {
    items: &'a [DebugTreeItem<Id>],
    next: Option<usize>,
}

impl<Id> Iterator for Ancestors<'_, Id> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.items[current].parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTree, NodeId};
    use proptest::prelude::*;

    // root
    // ├── app (component)
    // │   ├── div
    // │   │   └── "text"
    // │   └── nested host
    // │       └── span
    // └── portal
    fn sample() -> (MemoryTree, [NodeId; 7]) {
        let mut tree = MemoryTree::new();
        let root = tree.push(None, NodeKind::Root, "Root", "<body>").unwrap();
        let app = tree.push(Some(root), NodeKind::Component, "", "function () {}").unwrap();
        let div = tree.push(Some(app), NodeKind::DomElement, "div", "<div class=\"a\">").unwrap();
        let text = tree.push(Some(div), NodeKind::DomText, "", "\"Hello\"").unwrap();
        let host = tree.push(Some(app), NodeKind::Host, "Host", "").unwrap();
        let span = tree.push(Some(host), NodeKind::DomElement, "span", "<span/>").unwrap();
        let portal = tree.push(Some(root), NodeKind::Portal, "Portal", "<body>").unwrap();
        (tree, [root, app, div, text, host, span, portal])
    }

    #[test]
    fn flattens_in_pre_order_with_levels() {
        let (tree, [root, app, div, text, host, span, portal]) = sample();
        let index = TreeIndex::from_tree(&tree);

        let ids: Vec<_> = index.ids().collect();
        let levels: Vec<_> = index.items().iter().map(DebugTreeItem::level).collect();

        assert_eq!(ids, vec![root, app, div, text, host, span, portal]);
        assert_eq!(levels, vec![0, 1, 2, 3, 2, 3, 1]);
    }

    #[test]
    fn parents_accumulate_children() {
        let (tree, [root, app, ..]) = sample();
        let index = TreeIndex::from_tree(&tree);

        let root_pos = index.position(root).unwrap();
        let app_pos = index.position(app).unwrap();
        let children: Vec<_> = index.items()[app_pos]
            .children()
            .iter()
            .map(|&pos| index.items()[pos].id())
            .collect();

        assert_eq!(index.items()[app_pos].parent(), Some(root_pos));
        assert_eq!(children.len(), 2);
        let first = index.position(tree.children(app)[0]).unwrap();
        assert!(!index.items()[first].children().is_empty());
    }

    #[test]
    fn skip_children_omits_descendants() {
        let (tree, [_, _, _, _, host, span, portal]) = sample();
        let mut index = TreeIndex::new();
        index.flatten_with(&tree, tree.roots(), |model, id, _| {
            if model.kind(id) == NodeKind::Host {
                WalkControl::SkipChildren
            } else {
                WalkControl::Continue
            }
        });

        assert!(index.contains(host));
        assert!(!index.contains(span));
        assert!(index.contains(portal));
        assert!(!index.item(host).unwrap().has_children());
    }

    #[test]
    fn descendants_and_ancestors() {
        let (tree, [root, app, div, text, host, span, _]) = sample();
        let index = TreeIndex::from_tree(&tree);
        let pos = |id| index.position(id).unwrap();

        let id_at = |p: usize| index.items()[p].id();
        let under_app: Vec<_> = index.descendants(pos(app)).map(id_at).collect();
        let above_span: Vec<_> = index.ancestors(pos(span)).map(id_at).collect();

        assert_eq!(under_app, vec![div, text, host, span]);
        assert_eq!(above_span, vec![host, app, root]);
        assert!(index.is_descendant_of(pos(text), pos(app)));
        assert!(!index.is_descendant_of(pos(app), pos(text)));
        assert_eq!(index.siblings(pos(root)), None);
        assert_eq!(index.siblings(pos(div)).map(<[usize]>::len), Some(2));
    }

    #[test]
    fn anonymous_component_gets_search_fallback() {
        let (tree, [_, app, ..]) = sample();
        let index = TreeIndex::from_tree(&tree);

        let item = index.item(app).unwrap();
        assert_eq!(item.name(), "");
        assert_eq!(item.search_name, "anonymous");
    }

    #[test]
    fn rebuild_bumps_revision_and_drops_removed() {
        let (mut tree, [_, app, div, ..]) = sample();
        let mut index = TreeIndex::from_tree(&tree);
        let first = index.revision();

        tree.remove(div);
        index.flatten(&tree);

        assert!(index.revision() > first);
        assert!(index.contains(app));
        assert!(!index.contains(div));
    }

    fn arb_tree() -> impl Strategy<Value = MemoryTree> {
        // Each entry picks a parent among the nodes created before it.
        prop::collection::vec(any::<prop::sample::Index>(), 0..120).prop_map(|parents| {
            let mut tree = MemoryTree::new();
            let mut ids = Vec::new();
            for (n, parent) in parents.into_iter().enumerate() {
                let parent = if ids.is_empty() || n % 17 == 0 {
                    None
                } else {
                    Some(ids[parent.index(ids.len())])
                };
                let id = tree
                    .push(parent, NodeKind::DomElement, format!("n{n}"), "")
                    .unwrap();
                ids.push(id);
            }
            tree
        })
    }

    proptest! {
        #[test]
        fn flatten_visits_every_node_once(tree in arb_tree()) {
            let index = TreeIndex::from_tree(&tree);
            prop_assert_eq!(index.len(), tree.len());

            for (pos, item) in index.items().iter().enumerate() {
                prop_assert_eq!(index.position(item.id()), Some(pos));
                let depth = index.ancestors(pos).count();
                prop_assert_eq!(item.level() as usize, depth);
                if let Some(parent) = item.parent() {
                    prop_assert!(parent < pos);
                    prop_assert_eq!(index.items()[parent].level() + 1, item.level());
                }
                for child in index.descendants(pos) {
                    prop_assert!(index.ancestors(child).any(|a| a == pos));
                }
            }
        }
    }
}
