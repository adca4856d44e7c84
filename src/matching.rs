use std::hash::Hash;

use crate::filter::{FilterExpr, FilterState};
use crate::index::TreeIndex;
use crate::selection::IdSet;

const MATCHED: u8 = 1;
const PARENT: u8 = 1 << 1;
const CHILD: u8 = 1 << 2;

/// Items kept by the current filter and selection, plus the optional
/// ancestor ("parents") and descendant ("children") sets around them.
///
/// All lists hold index positions in document order.
#[derive(Clone, Debug, Default)]
pub struct MatchSets {
    matched: Vec<usize>,
    parents: Option<Vec<usize>>,
    children: Option<Vec<usize>>,
    roles: Vec<u8>,
}

impl MatchSets {
    /// Derives the sets, or `None` when neither a selection nor a filter is active.
    pub fn derive<Id: Copy + Eq + Hash>(
        index: &TreeIndex<Id>,
        selection: Option<&IdSet<Id>>,
        filter: Option<&FilterExpr>,
        with_parents: bool,
        with_children: bool,
    ) -> Option<Self> {
        let matched = derive_matched(index, selection, filter)?;
        let mut roles = vec![0_u8; index.len()];
        for &pos in &matched {
            roles[pos] |= MATCHED;
        }
        let parents = with_parents.then(|| {
            let parents = derive_matched_parents(index, &matched, &roles);
            for &pos in &parents {
                roles[pos] |= PARENT;
            }
            parents
        });
        let children = with_children.then(|| {
            let children = derive_matched_children(index, &roles);
            for &pos in &children {
                roles[pos] |= CHILD;
            }
            children
        });
        Some(Self {
            matched,
            parents,
            children,
            roles,
        })
    }

    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    /// Ancestors of matched items that are not matched themselves,
    /// `None` unless derived with parents.
    pub fn parents(&self) -> Option<&[usize]> {
        self.parents.as_deref()
    }

    /// Descendants of matched items that are not matched themselves,
    /// `None` unless derived with children.
    pub fn children(&self) -> Option<&[usize]> {
        self.children.as_deref()
    }

    #[inline]
    pub fn is_matched(&self, pos: usize) -> bool {
        self.role(pos) & MATCHED != 0
    }

    #[inline]
    pub fn is_parent(&self, pos: usize) -> bool {
        self.role(pos) & PARENT != 0
    }

    #[inline]
    pub fn is_child(&self, pos: usize) -> bool {
        self.role(pos) & CHILD != 0
    }

    /// Matched, or admitted as a derived parent or child.
    #[inline]
    pub fn admits(&self, pos: usize) -> bool {
        self.role(pos) != 0
    }

    #[inline]
    fn role(&self, pos: usize) -> u8 {
        self.roles.get(pos).copied().unwrap_or(0)
    }
}

/// Positions of items that are selected or pass the filter, or `None` when
/// neither is given. Selection and filter are unioned.
pub fn derive_matched<Id: Copy + Eq + Hash>(
    index: &TreeIndex<Id>,
    selection: Option<&IdSet<Id>>,
    filter: Option<&FilterExpr>,
) -> Option<Vec<usize>> {
    if selection.is_none() && filter.is_none() {
        return None;
    }
    let matched = index
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            selection.is_some_and(|set| set.contains(item.id()))
                || filter.is_some_and(|expr| expr.matches(item))
        })
        .map(|(pos, _)| pos)
        .collect();
    Some(matched)
}

/// Ancestors of `matched` items that are not matched themselves, deduplicated.
///
/// `roles` must flag the matched positions.
pub fn derive_matched_parents<Id: Copy + Eq + Hash>(
    index: &TreeIndex<Id>,
    matched: &[usize],
    roles: &[u8],
) -> Vec<usize> {
    let mut seen = vec![false; index.len()];
    let mut parents = Vec::new();
    for &pos in matched {
        for ancestor in index.ancestors(pos) {
            // The rest of the chain was walked from an earlier item.
            if seen[ancestor] {
                break;
            }
            seen[ancestor] = true;
            if roles[ancestor] & MATCHED == 0 {
                parents.push(ancestor);
            }
        }
    }
    parents.sort_unstable();
    parents
}

/// Items below a matched item that are not matched themselves.
///
/// One pre-order pass: parents are decided before their children.
pub fn derive_matched_children<Id: Copy + Eq + Hash>(
    index: &TreeIndex<Id>,
    roles: &[u8],
) -> Vec<usize> {
    let items = index.items();
    let mut under_match = vec![false; items.len()];
    let mut children = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        let Some(parent) = item.parent() else {
            continue;
        };
        under_match[pos] = under_match[parent] || roles[parent] & MATCHED != 0;
        if under_match[pos] && roles[pos] & MATCHED == 0 {
            children.push(pos);
        }
    }
    children
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MatchKey {
    index: u64,
    filter: Option<u64>,
    selection: Option<u64>,
    with_parents: bool,
    with_children: bool,
}

/// One-entry memo of [`MatchSets`] keyed on the revisions of its inputs.
#[derive(Default)]
pub struct MatchCache {
    key: Option<MatchKey>,
    sets: Option<MatchSets>,
    derivations: u64,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached sets, deriving them again only if an input changed.
    ///
    /// Pass `None` for an input that is inactive (ignored or empty).
    pub fn get<Id: Copy + Eq + Hash>(
        &mut self,
        index: &TreeIndex<Id>,
        selection: Option<&IdSet<Id>>,
        filter: Option<&FilterState>,
        with_parents: bool,
        with_children: bool,
    ) -> Option<&MatchSets> {
        let filter = filter.and_then(|state| state.expr().map(|expr| (expr, state.revision())));
        let key = MatchKey {
            index: index.revision(),
            filter: filter.map(|(_, revision)| revision),
            selection: selection.map(IdSet::revision),
            with_parents,
            with_children,
        };
        if self.key != Some(key) {
            self.sets = MatchSets::derive(
                index,
                selection,
                filter.map(|(expr, _)| expr),
                with_parents,
                with_children,
            );
            self.key = Some(key);
            self.derivations += 1;
            tracing::trace!(
                matched = self.sets.as_ref().map_or(0, |sets| sets.matched.len()),
                derivations = self.derivations,
                "match sets derived"
            );
        }
        self.sets.as_ref()
    }

    /// Returns the last derived sets without checking inputs.
    pub const fn current(&self) -> Option<&MatchSets> {
        self.sets.as_ref()
    }

    /// Number of derivations performed so far.
    pub const fn derivations(&self) -> u64 {
        self.derivations
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
