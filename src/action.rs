use crate::model::Concept;
use crate::selection::ToggleMode;

/// Switches of [`VisibilityOptions`](crate::VisibilityOptions) addressable by actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InspectorOption {
    ShowCollapsed,
    HideUnmatched,
    ShowParents,
    ShowChildren,
    IgnoreSelection,
    IgnoreFilter,
}

/// Actions that a user or application can initiate on the inspector.
///
/// Row-scoped actions apply to the focused row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InspectorAction<Custom = ()> {
    /// Move focus to the previous visible row.
    FocusPrev,
    /// Move focus to the next visible row.
    FocusNext,
    /// Move focus to the parent row.
    FocusParent,
    /// Move focus to the first child row, expanding the row if needed.
    FocusChild,
    /// Move focus to the first visible row.
    FocusFirst,
    /// Move focus to the last visible row.
    FocusLast,
    /// Move focus one viewport up.
    PageUp,
    /// Move focus one viewport down.
    PageDown,
    /// Toggle selection of the focused row.
    ToggleSelected(ToggleMode),
    /// Toggle collapsing of the focused row.
    ToggleCollapsed(ToggleMode),
    /// Apply the current row mode to the focused row.
    Activate,
    /// Collapse every collapsible row, or expand everything.
    ToggleCollapseAll,
    /// Select or deselect the matched rows.
    ToggleSelectMatched { all_visible: bool },
    /// Scroll to the next matched row.
    NextMatch { include_collapsed: bool },
    /// Scroll to the previous matched row.
    PrevMatch { include_collapsed: bool },
    /// Toggle a `[category]` group in the filter text.
    ToggleConcept { concept: Concept, reset: bool },
    /// Flip a visibility option.
    ToggleOption(InspectorOption),
    /// Include or exclude the focused nested host.
    ToggleSubHost,
    /// Flip automatic inclusion of nested hosts.
    ToggleIncludeAllSubHosts,
    /// Empty the filter text.
    ClearFilter,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InspectorEvent<Custom = ()> {
    /// The action was handled internally and state was updated.
    Handled,
    /// The action was ignored (nothing focused, nothing to do).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(InspectorAction<Custom>),
}
