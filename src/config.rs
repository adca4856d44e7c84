use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::schedule::DEFAULT_COALESCE_DELAY;
use crate::visibility::VisibilityOptions;
use crate::window::DEFAULT_TOLERANCE;

/// Construction-time knobs of a [`TreeInspector`](crate::TreeInspector).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Row height in host units (terminal lines for the bundled view).
    pub row_height: u32,
    /// Extra rows rendered above and below the viewport.
    pub tolerance: u32,
    /// Delay between a render notification and the coalesced refresh.
    pub coalesce_delay: Duration,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            row_height: 1,
            tolerance: DEFAULT_TOLERANCE,
            coalesce_delay: DEFAULT_COALESCE_DELAY,
        }
    }
}

impl InspectorConfig {
    #[must_use]
    pub const fn with_row_height(mut self, row_height: u32) -> Self {
        self.row_height = if row_height == 0 { 1 } else { row_height };
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_coalesce_delay(mut self, delay: Duration) -> Self {
        self.coalesce_delay = delay;
        self
    }
}

/// What activating a row does.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RowMode {
    /// Toggle the row's selection.
    #[default]
    Select,
    /// Toggle selection and show the row's details.
    SelectTip,
    /// Show the row's details only.
    Tip,
}

/// Persistable user settings.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InspectorSettings {
    pub filter: String,
    pub options: VisibilityOptions,
    pub row_mode: RowMode,
    pub include_all_sub_hosts: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_row_height_is_bumped() {
        let config = InspectorConfig::default().with_row_height(0);
        assert_eq!(config.row_height, 1);
    }

    #[test]
    fn defaults() {
        let config = InspectorConfig::default();
        assert_eq!(config.tolerance, 2);
        assert_eq!(config.coalesce_delay, Duration::from_millis(1));
        assert_eq!(InspectorSettings::default().row_mode, RowMode::Select);
    }
}
