pub use crate::{
    Concept, DebugTreeItem, DefaultRowRenderer, HostTree, InspectorAction, InspectorConfig,
    InspectorError, InspectorEvent, InspectorNotice, InspectorOption, InspectorSettings,
    InspectorStyle, InspectorView, MemoryTree, NodeId, NodeKind, RowContext, RowMode,
    RowRenderer, ScrollStatus, Scheduler, TimerQueue, ToggleMode, TreeGlyphs, TreeIndex,
    TreeInspector, VisibilityOptions, WalkControl,
};

#[cfg(feature = "keymap")]
pub use crate::{InspectorKeyBindings, KeymapProfile};
