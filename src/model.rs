use std::borrow::Cow;
use std::hash::Hash;

/// Read-only contract for the live tree under inspection.
///
/// The tree is owned by an external rendering engine and may change between
/// refreshes. Expectations:
/// - a proper tree (no cycles, each node reachable from exactly one parent);
/// - identifiers stay stable while a node keeps its structural position;
/// - identity, not position, is the key for selection and collapsing.
pub trait HostTree {
    /// Node identifier type.
    type Id: Copy + Eq + Hash;

    /// Returns the top-level nodes in document order.
    fn roots(&self) -> &[Self::Id];
    /// Returns the node's children in document order.
    fn children(&self, id: Self::Id) -> &[Self::Id];
    /// Returns the node's discriminant.
    fn kind(&self, id: Self::Id) -> NodeKind;
    /// Returns a short label (tag name, component name, ...). May be empty.
    fn name(&self, id: Self::Id) -> Cow<'_, str>;
    /// Returns a one-line rendering of the node's own content, excluding nested content.
    fn description(&self, id: Self::Id) -> Cow<'_, str>;
    /// Returns `true` if the node is still part of the tree.
    fn contains(&self, id: Self::Id) -> bool;
    /// Returns an approximate node count (not required to be exact).
    fn size_hint(&self) -> usize {
        0
    }
}

/// Discriminant of a host tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    DomElement,
    DomText,
    DomExternal,
    DomPseudo,
    Component,
    /// Content pass; `remote` when the content is passed from another component.
    Pass { remote: bool },
    Portal,
    /// Nested host whose own tree is only walked when included.
    Host,
    /// Root container of a host.
    Root,
    Empty,
}

impl NodeKind {
    /// Returns the category used for display and bracketed filter terms.
    pub const fn concept(self) -> Concept {
        match self {
            Self::DomElement => Concept::DomElement,
            Self::DomText => Concept::DomText,
            Self::DomExternal => Concept::DomExternal,
            Self::DomPseudo => Concept::DomPseudo,
            Self::Component => Concept::Component,
            Self::Pass { .. } => Concept::Pass,
            Self::Portal => Concept::Portal,
            Self::Host => Concept::Host,
            Self::Root => Concept::Root,
            Self::Empty => Concept::Empty,
        }
    }

    /// Returns `true` for any of the DOM kinds.
    pub const fn is_dom(self) -> bool {
        matches!(
            self,
            Self::DomElement | Self::DomText | Self::DomExternal | Self::DomPseudo
        )
    }

    /// Lower-case string an item of this kind is matched against for bracketed terms.
    ///
    /// DOM kinds carry both the broad `[dom]` and the narrow category.
    pub const fn filter_tag(self) -> &'static str {
        match self {
            Self::Component => "[component]",
            Self::Root => "[root] root container",
            Self::Host => "[host] nested host",
            Self::Pass { remote: false } => "[pass] content pass from",
            Self::Pass { remote: true } => "[pass] remote pass from",
            Self::Portal => "[portal] portal to",
            Self::Empty => "[empty]",
            Self::DomElement => "[dom] [dom-element]",
            Self::DomText => "[dom] [dom-text]",
            Self::DomExternal => "[dom] [dom-external]",
            Self::DomPseudo => "[dom] [dom-pseudo]",
        }
    }

    /// Name used for matching when the node has no name of its own.
    pub const fn fallback_name(self) -> &'static str {
        match self {
            Self::Component => "Anonymous",
            _ => "",
        }
    }
}

/// Item category, as toggled from the filter bar (`[component]`, `[dom]`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Concept {
    Component,
    Dom,
    DomElement,
    DomText,
    DomExternal,
    DomPseudo,
    Host,
    Pass,
    Portal,
    Root,
    Empty,
}

impl Concept {
    /// Every category, in toolbar order.
    pub const ALL: [Self; 11] = [
        Self::Component,
        Self::Dom,
        Self::DomElement,
        Self::DomText,
        Self::DomExternal,
        Self::DomPseudo,
        Self::Host,
        Self::Pass,
        Self::Portal,
        Self::Root,
        Self::Empty,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Dom => "dom",
            Self::DomElement => "dom-element",
            Self::DomText => "dom-text",
            Self::DomExternal => "dom-external",
            Self::DomPseudo => "dom-pseudo",
            Self::Host => "host",
            Self::Pass => "pass",
            Self::Portal => "portal",
            Self::Root => "root",
            Self::Empty => "empty",
        }
    }

    /// Returns the bracketed filter term, e.g. `[component]`.
    pub fn term(self) -> String {
        format!("[{}]", self.as_str())
    }
}

/// Return value of a flatten visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WalkControl {
    /// Walk into the node's children.
    #[default]
    Continue,
    /// Keep the node but do not allocate items for its descendants.
    SkipChildren,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_kinds_carry_broad_and_narrow_tags() {
        for kind in [
            NodeKind::DomElement,
            NodeKind::DomText,
            NodeKind::DomExternal,
            NodeKind::DomPseudo,
        ] {
            let tag = kind.filter_tag();
            assert!(tag.contains("[dom]"));
            assert!(tag.contains(&kind.concept().term()));
        }
    }

    #[test]
    fn every_kind_tag_contains_its_concept() {
        let kinds = [
            NodeKind::Component,
            NodeKind::Pass { remote: false },
            NodeKind::Pass { remote: true },
            NodeKind::Portal,
            NodeKind::Host,
            NodeKind::Root,
            NodeKind::Empty,
        ];
        for kind in kinds {
            assert!(kind.filter_tag().starts_with(&kind.concept().term()));
        }
    }

    #[test]
    fn anonymous_fallback_only_for_components() {
        assert_eq!(NodeKind::Component.fallback_name(), "Anonymous");
        assert_eq!(NodeKind::DomElement.fallback_name(), "");
    }
}
