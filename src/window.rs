//! Windowed ("virtualized") row range over a list of fixed-height rows.
//!
//! The window never looks at row content. It maps a scroll offset and a
//! container height to the inclusive range of rows worth materializing, with
//! a few rows of tolerance above and below the viewport. Units are whatever
//! the host measures in: pixels in a browser, lines in a terminal.

use std::ops::Range;

/// Default number of extra rows rendered above and below the viewport.
pub const DEFAULT_TOLERANCE: u32 = 2;

/// Inputs that, when changed, force a recompute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowMetrics {
    /// Fixed row height; treated as at least 1.
    pub row_height: u32,
    pub row_count: usize,
    pub tolerance: u32,
    /// Opaque token; bump it to force a recompute with unchanged rows.
    pub refresh: u64,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            row_height: 1,
            row_count: 0,
            tolerance: DEFAULT_TOLERANCE,
            refresh: 0,
        }
    }
}

impl RowMetrics {
    #[inline]
    const fn row_height(&self) -> u64 {
        if self.row_height == 0 {
            1
        } else {
            self.row_height as u64
        }
    }

    /// Height of the simulated scrollable content.
    pub const fn total_height(&self) -> u64 {
        self.row_count as u64 * self.row_height()
    }
}

/// Inclusive range of materialized rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
}

impl WindowRange {
    /// Row indices as a half-open range, for slicing.
    pub const fn rows(&self) -> Range<usize> {
        self.start..self.end + 1
    }

    pub const fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    pub const fn is_empty(&self) -> bool {
        false
    }

    pub const fn contains(&self, row: usize) -> bool {
        self.start <= row && row <= self.end
    }
}

/// Last computed window state; compared shallowly to suppress no-op updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowState {
    /// `None` when there are no rows.
    pub range: Option<WindowRange>,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Instant,
    Smooth,
}

/// Outcome of [`VirtualWindow::scroll_to_index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollStatus {
    /// Nothing needs to be re-rendered; the row is in place now.
    Settled(usize),
    /// The window changed; the row settles on the next [`VirtualWindow::did_update`].
    Pending,
    /// No container is mounted; nothing happened.
    Unmounted,
}

/// Scroll-synchronized window over `row_count` fixed-height rows.
#[derive(Clone, Debug, Default)]
pub struct VirtualWindow {
    metrics: RowMetrics,
    mounted: bool,
    scroll_top: u64,
    height: u32,
    state: WindowState,
    dirty: bool,
    awaiting: Option<usize>,
    behavior: ScrollBehavior,
}

impl VirtualWindow {
    pub fn new(metrics: RowMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    #[inline]
    pub const fn metrics(&self) -> RowMetrics {
        self.metrics
    }

    #[inline]
    pub const fn state(&self) -> WindowState {
        self.state
    }

    /// Materialized rows, `None` when unmounted or empty.
    #[inline]
    pub const fn range(&self) -> Option<WindowRange> {
        self.state.range
    }

    #[inline]
    pub const fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    #[inline]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Behavior of the last scroll request, for hosts that animate.
    #[inline]
    pub const fn last_behavior(&self) -> ScrollBehavior {
        self.behavior
    }

    /// `true` if the state changed since the last [`Self::did_update`].
    #[inline]
    pub const fn needs_render(&self) -> bool {
        self.dirty
    }

    /// Number of whole rows that fit the viewport, at least 1.
    pub fn viewport_rows(&self) -> usize {
        let rows = u64::from(self.height) / self.metrics.row_height();
        usize::try_from(rows).unwrap_or(usize::MAX).max(1)
    }

    /// Offset at which a row is positioned.
    pub const fn row_top(&self, row: usize) -> u64 {
        row as u64 * self.metrics.row_height()
    }

    /// Largest reachable scroll offset.
    pub const fn max_scroll(&self) -> u64 {
        self.metrics.total_height().saturating_sub(self.height as u64)
    }

    /// Attaches to a container of the given height.
    pub fn mount(&mut self, height: u32) -> bool {
        self.mounted = true;
        self.height = height;
        self.recompute()
    }

    /// Detaches from the container and drops all pending work.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.state = WindowState::default();
        self.awaiting = None;
        self.dirty = false;
    }

    /// Handles a native scroll event.
    pub fn scroll(&mut self, scroll_top: u64) -> bool {
        self.scroll_top = scroll_top.min(self.max_scroll());
        self.recompute()
    }

    /// Scrolls by a signed number of rows, clamped to the content.
    pub fn scroll_by_rows(&mut self, rows: i64) -> bool {
        let delta = rows.unsigned_abs() * self.metrics.row_height();
        let target = if rows < 0 {
            self.scroll_top.saturating_sub(delta)
        } else {
            self.scroll_top.saturating_add(delta)
        };
        self.scroll(target)
    }

    /// Handles a container resize.
    pub fn resize(&mut self, height: u32) -> bool {
        if height == self.height {
            return false;
        }
        self.height = height;
        self.recompute()
    }

    /// Updates row height, count, tolerance or refresh token; recomputes on change.
    pub fn set_rows(&mut self, metrics: RowMetrics) -> bool {
        if metrics == self.metrics {
            return false;
        }
        self.metrics = metrics;
        self.scroll_top = self.scroll_top.min(self.max_scroll());
        self.recompute()
    }

    /// Recomputes the range; returns `true` if the state changed.
    ///
    /// Shallow-equal results are dropped so resize-driven scroll adjustments
    /// cannot loop. A no-op while unmounted.
    pub fn recompute(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let next = WindowState {
            range: self.compute_range(),
            height: self.height,
        };
        if next == self.state {
            return false;
        }
        tracing::trace!(
            start = next.range.map(|r| r.start),
            end = next.range.map(|r| r.end),
            height = next.height,
            "virtual window recomputed"
        );
        self.state = next;
        self.dirty = true;
        true
    }

    fn compute_range(&self) -> Option<WindowRange> {
        let last = self.metrics.row_count.checked_sub(1)?;
        let row_height = self.metrics.row_height();
        let tolerance = u64::from(self.metrics.tolerance);
        let first_row = self.scroll_top / row_height;
        let last_row = (self.scroll_top + u64::from(self.height)) / row_height;
        let start = usize::try_from(first_row.saturating_sub(tolerance)).unwrap_or(usize::MAX);
        let end = usize::try_from(last_row.saturating_add(tolerance)).unwrap_or(usize::MAX);
        Some(WindowRange {
            start: start.min(last),
            end: end.min(last),
        })
    }

    /// Returns `true` if the whole row lies inside the viewport.
    pub const fn is_row_in_view(&self, row: usize) -> bool {
        let top = self.row_top(row);
        top >= self.scroll_top
            && top + self.metrics.row_height() <= self.scroll_top + self.height as u64
    }

    /// Scrolls so that `row` is at the top of the viewport (clamped).
    ///
    /// With `only_if_needed`, rows already fully in view do not scroll. The
    /// returned status tells whether the row is in place now or after the next
    /// [`Self::did_update`].
    pub fn scroll_to_index(
        &mut self,
        row: usize,
        behavior: ScrollBehavior,
        only_if_needed: bool,
    ) -> ScrollStatus {
        if !self.mounted {
            return ScrollStatus::Unmounted;
        }
        let row = row.min(self.metrics.row_count.saturating_sub(1));
        self.behavior = behavior;
        let was = self.scroll_top;
        if !only_if_needed || !self.is_row_in_view(row) {
            self.scroll_top = self.row_top(row).min(self.max_scroll());
        }
        tracing::debug!(row, from = was, to = self.scroll_top, "scroll to index");
        if self.scroll_top == was {
            return ScrollStatus::Settled(row);
        }
        if self.recompute() {
            self.awaiting = Some(row);
            ScrollStatus::Pending
        } else {
            ScrollStatus::Settled(row)
        }
    }

    /// Completion hook, called by the host after it rendered the current state.
    ///
    /// Returns the row of a pending [`Self::scroll_to_index`] that is now in place.
    pub const fn did_update(&mut self) -> Option<usize> {
        self.dirty = false;
        self.awaiting.take()
    }
}
