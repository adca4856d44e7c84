use crate::model::NodeKind;
use crate::visibility::RowFlags;

/// Per-row data handed to a [`RowRenderer`](crate::RowRenderer).
#[derive(Clone, Copy, Debug)]
pub struct RowContext {
    pub level: u32,
    pub kind: NodeKind,
    pub flags: RowFlags,
    pub is_focused: bool,
    /// The row is the item whose details are shown.
    pub is_tip: bool,
}
