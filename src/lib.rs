//! Inspector engine for a live render tree, with a ratatui view.
//!
//! The host tree is flattened into a pre-order index; selection, collapsing and
//! a category/text filter decide which rows are visible, and a virtual window
//! keeps only the rows around the viewport materialized.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `TreeInspector::handle_key*` helpers.
//! - `serde`: serde support for `InspectorSettings`.

mod action;
mod config;
mod context;
mod cycler;
mod error;
mod filter;
mod glyphs;
mod index;
mod inspector;
#[cfg(feature = "keymap")]
mod keymap;
mod matching;
mod memory;
mod model;
pub mod prelude;
mod schedule;
mod selection;
mod style;
mod visibility;
mod widget;
mod window;

pub use action::{InspectorAction, InspectorEvent, InspectorOption};
pub use config::{InspectorConfig, InspectorSettings, RowMode};
pub use context::RowContext;
pub use cycler::MatchCycler;
pub use error::{InspectorError, Result};
pub use filter::{FilterExpr, FilterState, toggle_concept};
pub use glyphs::{
    DefaultRowRenderer, RowRenderer, TreeGlyphs, display_name, plain_row_line, row_label_line,
};
pub use index::{Ancestors, DebugTreeItem, TreeIndex};
pub use inspector::{InspectorNotice, TreeInspector};
#[cfg(feature = "keymap")]
pub use keymap::{InspectorKeyBindings, KeymapProfile};
pub use matching::{
    MatchCache, MatchSets, derive_matched, derive_matched_children, derive_matched_parents,
};
pub use memory::{MemoryTree, NodeId};
pub use model::{Concept, HostTree, NodeKind, WalkControl};
pub use schedule::{DEFAULT_COALESCE_DELAY, Scheduler, TimerId, TimerQueue, UpdateCoalescer};
pub use selection::{IdSet, SetOp, ToggleMode};
pub use style::InspectorStyle;
pub use visibility::{RowFlags, Visibility, VisibilityOptions, within_collapsed};
pub use widget::InspectorView;
pub use window::{
    DEFAULT_TOLERANCE, RowMetrics, ScrollBehavior, ScrollStatus, VirtualWindow, WindowRange,
    WindowState,
};
