use std::hash::Hash;

use rustc_hash::FxHashSet;

use crate::action::{InspectorAction, InspectorEvent, InspectorOption};
use crate::config::{InspectorConfig, InspectorSettings, RowMode};
use crate::cycler::MatchCycler;
use crate::error::{InspectorError, Result};
use crate::filter::{self, FilterState};
use crate::index::TreeIndex;
use crate::matching::{MatchCache, MatchSets};
use crate::model::{Concept, HostTree, NodeKind, WalkControl};
use crate::schedule::{Scheduler, TimerId, UpdateCoalescer};
use crate::selection::{IdSet, SetOp, ToggleMode};
use crate::visibility::{RowFlags, Visibility, VisibilityOptions, within_collapsed};
use crate::window::{RowMetrics, ScrollBehavior, ScrollStatus, VirtualWindow};

#[cfg(feature = "keymap")]
use crate::keymap::InspectorKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

/// Outgoing notifications, drained with [`TreeInspector::take_notices`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InspectorNotice<Id> {
    /// Whether the collapse set is empty; sent only when it flips.
    NoneCollapsedChanged(bool),
    /// Whether "select matched" would add rows; sent only when it flips.
    ShouldSelectChanged(bool),
    /// A nested host is now walked.
    SubHostAttached(Id),
    /// A nested host is no longer walked, or disappeared.
    SubHostDetached(Id),
    /// A scroll request settled; the row should receive keyboard focus.
    Focus(Id),
}

/// Inspector engine over a live host tree.
///
/// Holds identity-keyed selection and collapse state across rebuilds, derives
/// the filtered row list, and drives a [`VirtualWindow`] over it. The host tree
/// itself is only borrowed during [`Self::refresh`].
pub struct TreeInspector<Id> {
    config: InspectorConfig,
    index: TreeIndex<Id>,
    selected: IdSet<Id>,
    collapsed: IdSet<Id>,
    filter: FilterState,
    options: VisibilityOptions,
    row_mode: RowMode,
    include_all_sub_hosts: bool,
    included_hosts: Vec<Id>,
    matches: MatchCache,
    // Positions of visible rows, in document order.
    rows: Vec<usize>,
    cycler: MatchCycler,
    window: VirtualWindow,
    coalescer: UpdateCoalescer,
    focused: Option<Id>,
    tip: Option<Id>,
    // Scroll target waiting for the next render after an uncollapse.
    pending_scroll: Option<Id>,
    // Focus target waiting for the window to settle.
    pending_focus: Option<Id>,
    none_collapsed_was: bool,
    should_select_was: bool,
    notices: Vec<InspectorNotice<Id>>,
    updates: u64,
    #[cfg(feature = "keymap")]
    keymap: InspectorKeyBindings,
}

impl<Id: Copy + Eq + Hash> Default for TreeInspector<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + Eq + Hash> TreeInspector<Id> {
    pub fn new() -> Self {
        Self::with_config(InspectorConfig::default())
    }

    pub fn with_config(config: InspectorConfig) -> Self {
        let metrics = RowMetrics {
            row_height: config.row_height,
            tolerance: config.tolerance,
            ..RowMetrics::default()
        };
        Self {
            config,
            index: TreeIndex::new(),
            selected: IdSet::new(),
            collapsed: IdSet::new(),
            filter: FilterState::default(),
            options: VisibilityOptions::default(),
            row_mode: RowMode::default(),
            include_all_sub_hosts: false,
            included_hosts: Vec::new(),
            matches: MatchCache::new(),
            rows: Vec::new(),
            cycler: MatchCycler::new(),
            window: VirtualWindow::new(metrics),
            coalescer: UpdateCoalescer::new(config.coalesce_delay),
            focused: None,
            tip: None,
            pending_scroll: None,
            pending_focus: None,
            none_collapsed_was: true,
            should_select_was: true,
            notices: Vec::new(),
            updates: 0,
            #[cfg(feature = "keymap")]
            keymap: InspectorKeyBindings::new(),
        }
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut InspectorKeyBindings {
        &mut self.keymap
    }

    #[inline]
    pub const fn config(&self) -> &InspectorConfig {
        &self.config
    }

    #[inline]
    pub const fn index(&self) -> &TreeIndex<Id> {
        &self.index
    }

    #[inline]
    pub const fn selected(&self) -> &IdSet<Id> {
        &self.selected
    }

    #[inline]
    pub const fn collapsed(&self) -> &IdSet<Id> {
        &self.collapsed
    }

    pub fn filter_text(&self) -> &str {
        self.filter.text()
    }

    #[inline]
    pub const fn options(&self) -> VisibilityOptions {
        self.options
    }

    #[inline]
    pub const fn row_mode(&self) -> RowMode {
        self.row_mode
    }

    pub const fn set_row_mode(&mut self, mode: RowMode) {
        self.row_mode = mode;
    }

    #[inline]
    pub const fn include_all_sub_hosts(&self) -> bool {
        self.include_all_sub_hosts
    }

    /// Nested hosts currently walked, in inclusion order.
    pub fn included_sub_hosts(&self) -> &[Id] {
        &self.included_hosts
    }

    /// Current match sets, `None` while neither filter nor selection is active.
    pub const fn match_sets(&self) -> Option<&MatchSets> {
        self.matches.current()
    }

    #[inline]
    pub const fn is_matching(&self) -> bool {
        self.matches.current().is_some()
    }

    /// Index positions of every visible row.
    pub fn visible_rows(&self) -> &[usize] {
        &self.rows
    }

    /// Index positions of the rows inside the materialized window.
    pub fn window_rows(&self) -> &[usize] {
        self.window
            .range()
            .and_then(|range| self.rows.get(range.rows()))
            .unwrap_or(&[])
    }

    #[inline]
    pub const fn window(&self) -> &VirtualWindow {
        &self.window
    }

    #[inline]
    pub const fn window_mut(&mut self) -> &mut VirtualWindow {
        &mut self.window
    }

    /// Position of the match-cycling cursor among eligible matches.
    pub const fn match_cursor(&self) -> Option<usize> {
        self.cycler.cursor()
    }

    #[inline]
    pub const fn focused(&self) -> Option<Id> {
        self.focused
    }

    /// Item whose details are shown, if any.
    #[inline]
    pub const fn tip(&self) -> Option<Id> {
        self.tip
    }

    pub fn set_tip(&mut self, id: Option<Id>) {
        self.tip = id;
    }

    /// Number of refreshes performed.
    #[inline]
    pub const fn update_count(&self) -> u64 {
        self.updates
    }

    #[inline]
    pub const fn none_collapsed(&self) -> bool {
        self.none_collapsed_was
    }

    #[inline]
    pub const fn should_select(&self) -> bool {
        self.should_select_was
    }

    pub fn notices(&self) -> &[InspectorNotice<Id>] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<InspectorNotice<Id>> {
        std::mem::take(&mut self.notices)
    }

    /// Display flags for the item at `pos`.
    pub fn row_flags(&self, pos: usize) -> RowFlags {
        Visibility::new(
            &self.index,
            &self.collapsed,
            self.matches.current(),
            self.options,
        )
        .flags(pos, &self.selected)
    }

    // - Update cycle - //

    /// Records a "render finished" notification from the live tree.
    ///
    /// Returns `true` if a refresh timer was scheduled; bursts schedule once.
    pub fn on_render_finished<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        cancelled: bool,
    ) -> bool {
        self.coalescer.notify(scheduler, cancelled)
    }

    /// Runs the coalesced refresh if `timer` is the pending one.
    pub fn on_timer<T: HostTree<Id = Id>>(&mut self, timer: TimerId, model: &T) -> bool {
        if !self.coalescer.fire(timer) {
            return false;
        }
        self.refresh(model);
        true
    }

    /// Forgets the host tree and cancels pending work.
    pub fn detach<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.coalescer.cancel(scheduler);
        for id in self.included_hosts.drain(..) {
            self.notices.push(InspectorNotice::SubHostDetached(id));
        }
        self.index.clear();
        self.pending_scroll = None;
        self.pending_focus = None;
        self.focused = None;
        self.tip = None;
        self.selected.clear();
        self.collapsed.clear();
        self.cycler.reset();
        self.rebuild();
    }

    /// Rebuilds the index from the host tree and prunes state to it.
    pub fn refresh<T: HostTree<Id = Id>>(&mut self, model: &T) {
        let focus_row = self.focused_row();
        let include_all = self.include_all_sub_hosts;
        let mut stale: FxHashSet<Id> = self.included_hosts.iter().copied().collect();
        let mut attached = Vec::new();
        let included = &mut self.included_hosts;

        self.index.flatten_with(model, model.roots(), |tree, id, _| {
            if tree.kind(id) != NodeKind::Host {
                return WalkControl::Continue;
            }
            stale.remove(&id);
            if included.contains(&id) {
                WalkControl::Continue
            } else if include_all {
                included.push(id);
                attached.push(id);
                WalkControl::Continue
            } else {
                WalkControl::SkipChildren
            }
        });

        if !attached.is_empty() {
            tracing::debug!(count = attached.len(), "sub-hosts attached");
        }
        for id in attached {
            self.notices.push(InspectorNotice::SubHostAttached(id));
        }
        if !stale.is_empty() {
            let notices = &mut self.notices;
            self.included_hosts.retain(|id| {
                let keep = !stale.contains(id);
                if !keep {
                    notices.push(InspectorNotice::SubHostDetached(*id));
                }
                keep
            });
            tracing::debug!(count = stale.len(), "stale sub-hosts dropped");
        }

        let index = &self.index;
        let pruned_selected = if self.selected.iter().any(|id| !index.contains(id)) {
            let before = self.selected.as_slice().to_vec();
            self.selected.prune(index);
            self.cycler.follow_selection(&before, &self.selected);
            true
        } else {
            false
        };
        let pruned_collapsed = self.collapsed.prune(index);
        for slot in [&mut self.pending_scroll, &mut self.pending_focus, &mut self.tip] {
            if slot.is_some_and(|id| !index.contains(id)) {
                *slot = None;
            }
        }
        let focus_lost = self.focused.is_some_and(|id| !index.contains(id));

        self.updates += 1;
        tracing::debug!(
            items = self.index.len(),
            pruned_selected,
            pruned_collapsed,
            update = self.updates,
            "inspector refreshed"
        );
        self.rebuild();

        if focus_lost {
            // Keep the cursor on the same screen row.
            self.focused = focus_row
                .and_then(|row| self.rows.get(row.min(self.rows.len().saturating_sub(1))))
                .map(|&pos| self.index.items()[pos].id());
        }
    }

    /// Completion hook, called by the view after it drew the current window.
    pub fn did_update(&mut self) {
        if self.window.did_update().is_some()
            && let Some(id) = self.pending_focus.take()
        {
            self.notices.push(InspectorNotice::Focus(id));
        }
        if let Some(id) = self.pending_scroll.take()
            && let Err(err) = self.scroll_to_item(id)
        {
            tracing::debug!(%err, "deferred scroll dropped");
        }
    }

    fn rebuild(&mut self) {
        let selection = (!self.options.ignore_selection && !self.selected.is_empty())
            .then_some(&self.selected);
        let filter = (!self.options.ignore_filter).then_some(&self.filter);
        let sets = self.matches.get(
            &self.index,
            selection,
            filter,
            self.options.show_parents,
            self.options.show_children,
        );
        self.rows = Visibility::new(&self.index, &self.collapsed, sets, self.options).rows();

        let metrics = self.window.metrics();
        self.window.set_rows(RowMetrics {
            row_count: self.rows.len(),
            refresh: metrics.refresh.wrapping_add(1),
            ..metrics
        });
        self.publish_flags();
    }

    fn publish_flags(&mut self) {
        let none_collapsed = self.collapsed.is_empty();
        if none_collapsed != self.none_collapsed_was {
            self.none_collapsed_was = none_collapsed;
            self.notices
                .push(InspectorNotice::NoneCollapsedChanged(none_collapsed));
        }
        let should_select = self.wants_select(false);
        if should_select != self.should_select_was {
            self.should_select_was = should_select;
            self.notices
                .push(InspectorNotice::ShouldSelectChanged(should_select));
        }
    }

    /// With matching active: whether some matched row (plus derived parents
    /// and children with `all_visible`) is unselected. Otherwise: whether the
    /// selection is empty.
    fn wants_select(&self, all_visible: bool) -> bool {
        let Some(sets) = self.matches.current() else {
            return self.selected.is_empty();
        };
        let items = self.index.items();
        let unselected =
            |list: &[usize]| list.iter().any(|&pos| !self.selected.contains(items[pos].id()));
        unselected(sets.matched())
            || all_visible
                && (sets.parents().is_some_and(|list| unselected(list))
                    || sets.children().is_some_and(|list| unselected(list)))
    }

    // - Filter and options - //

    /// Sets the filter text; returns `true` if the parsed filter changed.
    pub fn set_filter(&mut self, text: &str) -> bool {
        if !self.filter.set(text) {
            return false;
        }
        tracing::debug!(filter = text, "filter changed");
        self.rebuild();
        true
    }

    /// Toggles a `[category]` group in the filter text.
    pub fn toggle_concept(&mut self, concept: Concept, reset: bool) -> bool {
        let text = filter::toggle_concept(self.filter.text(), concept, reset);
        self.set_filter(&text)
    }

    pub fn set_options(&mut self, options: VisibilityOptions) -> bool {
        if options == self.options {
            return false;
        }
        self.options = options;
        self.rebuild();
        true
    }

    pub fn set_option(&mut self, option: InspectorOption, value: bool) -> bool {
        let mut options = self.options;
        *option_slot(&mut options, option) = value;
        self.set_options(options)
    }

    pub fn toggle_option(&mut self, option: InspectorOption) -> bool {
        let mut options = self.options;
        let slot = option_slot(&mut options, option);
        *slot = !*slot;
        self.set_options(options)
    }

    pub fn settings(&self) -> InspectorSettings {
        InspectorSettings {
            filter: self.filter.text().to_owned(),
            options: self.options,
            row_mode: self.row_mode,
            include_all_sub_hosts: self.include_all_sub_hosts,
        }
    }

    /// Restores persisted settings. Sub-host inclusion applies on the next refresh.
    pub fn apply_settings(&mut self, settings: &InspectorSettings) {
        self.filter.set(&settings.filter);
        self.options = settings.options;
        self.row_mode = settings.row_mode;
        self.include_all_sub_hosts = settings.include_all_sub_hosts;
        self.rebuild();
    }

    // - Selection - //

    /// Toggles selection of `id` in `mode`.
    pub fn toggle_selected(&mut self, id: Id, mode: ToggleMode) -> Result<bool> {
        let pos = self
            .index
            .position(id)
            .ok_or(InspectorError::UnknownItem)?;
        let next = self.selected.toggled(&self.index, pos, mode, |_| true);
        Ok(self.set_selected(next))
    }

    /// Applies a bulk modification to the selection.
    pub fn modify_selected(&mut self, ids: &[Id], op: SetOp) -> bool {
        let next = self.selected.modified(ids, op, &self.index);
        self.set_selected(next)
    }

    /// Selects the matched rows, or deselects them if all are selected.
    ///
    /// With `all_visible`, matched parents and children count as matched.
    /// Without matching, selects everything when nothing is selected and
    /// clears the selection otherwise.
    pub fn toggle_select_matched(&mut self, all_visible: bool) -> bool {
        let next = match self.matches.current() {
            Some(sets) if self.options.hide_unmatched || !all_visible => {
                let items = self.index.items();
                let mut positions = sets.matched().to_vec();
                if all_visible {
                    positions.extend(sets.parents().unwrap_or_default());
                    positions.extend(sets.children().unwrap_or_default());
                }
                let ids: Vec<Id> = positions.iter().map(|&pos| items[pos].id()).collect();
                let select = if all_visible {
                    !ids.iter().any(|&id| self.selected.contains(id))
                } else {
                    self.wants_select(false)
                };
                if select {
                    ids
                } else {
                    let drop: FxHashSet<Id> = ids.into_iter().collect();
                    self.selected.iter().filter(|id| !drop.contains(id)).collect()
                }
            }
            _ if self.selected.is_empty() => self.index.ids().collect(),
            _ => Vec::new(),
        };
        self.set_selected(next)
    }

    fn set_selected(&mut self, ids: Vec<Id>) -> bool {
        let before = self.selected.as_slice().to_vec();
        if !self.selected.replace(ids) {
            return false;
        }
        self.cycler.follow_selection(&before, &self.selected);
        self.rebuild();
        true
    }

    // - Collapsing - //

    /// Toggles collapsing of `id` in `mode`. Leaves cannot be collapsed.
    pub fn toggle_collapsed(&mut self, id: Id, mode: ToggleMode) -> Result<bool> {
        let pos = self
            .index
            .position(id)
            .ok_or(InspectorError::UnknownItem)?;
        let items = self.index.items();
        if !items[pos].has_children() {
            return Err(InspectorError::NotCollapsible);
        }
        let next = self
            .collapsed
            .toggled(&self.index, pos, mode, |p| items[p].has_children());
        Ok(self.set_collapsed(next))
    }

    /// Collapses every collapsible item if none is collapsed, otherwise expands all.
    pub fn toggle_collapse_all(&mut self) -> bool {
        let next = if self.collapsed.is_empty() {
            self.index
                .items()
                .iter()
                .filter(|item| item.has_children())
                .map(|item| item.id())
                .collect()
        } else {
            Vec::new()
        };
        self.set_collapsed(next)
    }

    /// Applies a bulk modification to the collapse set.
    pub fn modify_collapsed(&mut self, ids: &[Id], op: SetOp) -> bool {
        let next = self.collapsed.modified(ids, op, &self.index);
        self.set_collapsed(next)
    }

    fn set_collapsed(&mut self, ids: Vec<Id>) -> bool {
        if !self.collapsed.replace(ids) {
            return false;
        }
        self.rebuild();
        true
    }

    // - Sub-hosts - //

    /// Includes or excludes a nested host, then refreshes.
    pub fn toggle_sub_host<T: HostTree<Id = Id>>(&mut self, model: &T, id: Id) -> Result<bool> {
        if !model.contains(id) {
            return Err(InspectorError::UnknownItem);
        }
        if model.kind(id) != NodeKind::Host {
            return Err(InspectorError::NotSubHost);
        }
        if let Some(at) = self.included_hosts.iter().position(|&other| other == id) {
            self.included_hosts.remove(at);
            // Otherwise the next walk includes it again.
            self.include_all_sub_hosts = false;
            self.notices.push(InspectorNotice::SubHostDetached(id));
        } else {
            self.included_hosts.push(id);
            self.notices.push(InspectorNotice::SubHostAttached(id));
        }
        self.refresh(model);
        Ok(true)
    }

    /// Turns automatic inclusion of nested hosts on or off.
    ///
    /// Turning it off also excludes every included host.
    pub fn set_include_all_sub_hosts<T: HostTree<Id = Id>>(&mut self, model: &T, include: bool) {
        if !include {
            for id in self.included_hosts.drain(..) {
                self.notices.push(InspectorNotice::SubHostDetached(id));
            }
        }
        self.include_all_sub_hosts = include;
        self.refresh(model);
    }

    /// Replaces the included hosts. Ids that are not nested hosts are ignored.
    pub fn set_included_sub_hosts<T: HostTree<Id = Id>>(&mut self, model: &T, ids: &[Id]) {
        let next: Vec<Id> = ids
            .iter()
            .copied()
            .filter(|&id| model.contains(id) && model.kind(id) == NodeKind::Host)
            .collect();
        for &id in &self.included_hosts {
            if !next.contains(&id) {
                self.notices.push(InspectorNotice::SubHostDetached(id));
            }
        }
        for &id in &next {
            if !self.included_hosts.contains(&id) {
                self.notices.push(InspectorNotice::SubHostAttached(id));
            }
        }
        self.included_hosts = next;
        self.refresh(model);
    }

    // - Scrolling - //

    /// Row of `id` among the visible rows.
    pub fn row_of(&self, id: Id) -> Option<usize> {
        self.index
            .position(id)
            .and_then(|pos| self.rows.binary_search(&pos).ok())
    }

    /// Cycles to the next (or previous) matched item and scrolls to it.
    ///
    /// Matches under a collapsed ancestor are skipped unless
    /// `include_collapsed` is set or collapsing is bypassed while matching.
    pub fn scroll_to_match(&mut self, backwards: bool, include_collapsed: bool) -> Option<Id> {
        let sets = self.matches.current()?;
        let eligible: Vec<usize> = if include_collapsed || self.options.show_collapsed {
            sets.matched().to_vec()
        } else {
            sets.matched()
                .iter()
                .copied()
                .filter(|&pos| !within_collapsed(&self.index, &self.collapsed, pos))
                .collect()
        };
        let cursor = self.cycler.next(eligible.len(), backwards)?;
        let id = self.index.items()[eligible[cursor]].id();
        tracing::debug!(cursor, eligible = eligible.len(), "cycling to match");
        self.scroll_to_item(id).ok()?;
        Some(id)
    }

    /// Scrolls `id` into view, expanding collapsed ancestors first.
    ///
    /// When ancestors had to be expanded, the scroll waits for the next
    /// [`Self::did_update`] so the window measures the new rows.
    pub fn scroll_to_item(&mut self, id: Id) -> Result<ScrollStatus> {
        let pos = self
            .index
            .position(id)
            .ok_or(InspectorError::UnknownItem)?;
        let items = self.index.items();
        let blocking: FxHashSet<Id> = self
            .index
            .ancestors(pos)
            .map(|ancestor| items[ancestor].id())
            .filter(|&ancestor| self.collapsed.contains(ancestor))
            .collect();
        if !blocking.is_empty() {
            let next = self
                .collapsed
                .iter()
                .filter(|ancestor| !blocking.contains(ancestor))
                .collect();
            self.pending_scroll = Some(id);
            self.set_collapsed(next);
            return Ok(ScrollStatus::Pending);
        }
        let row = self
            .rows
            .binary_search(&pos)
            .map_err(|_| InspectorError::Hidden)?;
        self.focused = Some(id);
        let status = self
            .window
            .scroll_to_index(row, ScrollBehavior::Instant, true);
        match status {
            ScrollStatus::Settled(_) => self.notices.push(InspectorNotice::Focus(id)),
            ScrollStatus::Pending => self.pending_focus = Some(id),
            ScrollStatus::Unmounted => {}
        }
        Ok(status)
    }

    /// Follows a link to `id`.
    ///
    /// Visible rows, and rows hidden only by collapsing, are scrolled to. A
    /// row hidden by matching is added to the selection first, then scrolled
    /// to once the view has re-rendered.
    pub fn focus_item(&mut self, id: Id) -> Result<ScrollStatus> {
        let pos = self
            .index
            .position(id)
            .ok_or(InspectorError::UnknownItem)?;
        if self.rows.binary_search(&pos).is_ok()
            || !self.is_matching()
            || !self.options.hide_unmatched
        {
            return self.scroll_to_item(id);
        }
        if !self.options.ignore_selection && !self.selected.contains(id) {
            let mut next = self.selected.as_slice().to_vec();
            next.push(id);
            self.pending_scroll = Some(id);
            self.set_selected(next);
            return Ok(ScrollStatus::Pending);
        }
        Err(InspectorError::Hidden)
    }

    // - Focus - //

    /// Row of the focused item, if it is visible.
    pub fn focused_row(&self) -> Option<usize> {
        self.focused.and_then(|id| self.row_of(id))
    }

    /// Focuses the item at `row` and keeps it in view.
    pub fn focus_row(&mut self, row: usize) -> bool {
        let Some(&pos) = self.rows.get(row) else {
            return false;
        };
        self.focused = Some(self.index.items()[pos].id());
        self.window
            .scroll_to_index(row, ScrollBehavior::Auto, true);
        true
    }

    // Nearest visible row to a focused item that got hidden.
    fn anchor_row(&self) -> usize {
        self.focused
            .and_then(|id| self.index.position(id))
            .map_or_else(
                || self.window.range().map_or(0, |range| range.start),
                |pos| self.rows.partition_point(|&row| row < pos),
            )
            .min(self.rows.len().saturating_sub(1))
    }

    fn focus_step(&mut self, delta: isize) -> bool {
        if self.rows.is_empty() {
            self.focused = None;
            return false;
        }
        let last = self.rows.len() - 1;
        let row = match self.focused_row() {
            Some(row) => row.saturating_add_signed(delta).min(last),
            None => self.anchor_row(),
        };
        self.focus_row(row)
    }

    fn focus_parent(&mut self) -> bool {
        let Some(pos) = self.focused.and_then(|id| self.index.position(id)) else {
            return false;
        };
        let Some(row) = self
            .index
            .ancestors(pos)
            .find_map(|ancestor| self.rows.binary_search(&ancestor).ok())
        else {
            return false;
        };
        self.focus_row(row)
    }

    fn focus_child(&mut self) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        let Some(pos) = self.index.position(id) else {
            return false;
        };
        if !self.index.items()[pos].has_children() {
            return false;
        }
        if self.collapsed.contains(id) {
            let next = self.collapsed.iter().filter(|&other| other != id).collect();
            self.set_collapsed(next);
        }
        let Some(row) = self.focused_row() else {
            return false;
        };
        match self.rows.get(row + 1) {
            Some(&next) if self.index.is_descendant_of(next, pos) => self.focus_row(row + 1),
            _ => true,
        }
    }

    fn activate(&mut self) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        if matches!(self.row_mode, RowMode::Select | RowMode::SelectTip) {
            let _ = self.toggle_selected(id, ToggleMode::SelfOnly);
        }
        match self.row_mode {
            RowMode::Select => {}
            RowMode::SelectTip => self.tip = Some(id),
            RowMode::Tip => self.tip = (self.tip != Some(id)).then_some(id),
        }
        true
    }

    // - Actions - //

    /// Handles an action against the focused row.
    pub fn handle_action<T: HostTree<Id = Id>, C>(
        &mut self,
        model: &T,
        action: InspectorAction<C>,
    ) -> InspectorEvent<C> {
        if matches!(&action, InspectorAction::Custom(_)) {
            return InspectorEvent::Action(action);
        }
        let handled = match action {
            InspectorAction::FocusPrev => self.focus_step(-1),
            InspectorAction::FocusNext => self.focus_step(1),
            InspectorAction::FocusParent => self.focus_parent(),
            InspectorAction::FocusChild => self.focus_child(),
            InspectorAction::FocusFirst => self.focus_row(0),
            InspectorAction::FocusLast => self.focus_row(self.rows.len().saturating_sub(1)),
            InspectorAction::PageUp => {
                let page = isize::try_from(self.window.viewport_rows()).unwrap_or(isize::MAX);
                self.focus_step(-page)
            }
            InspectorAction::PageDown => {
                let page = isize::try_from(self.window.viewport_rows()).unwrap_or(isize::MAX);
                self.focus_step(page)
            }
            InspectorAction::ToggleSelected(mode) => self
                .focused
                .is_some_and(|id| self.toggle_selected(id, mode).is_ok()),
            InspectorAction::ToggleCollapsed(mode) => self
                .focused
                .is_some_and(|id| self.toggle_collapsed(id, mode).is_ok()),
            InspectorAction::Activate => self.activate(),
            InspectorAction::ToggleCollapseAll => self.toggle_collapse_all(),
            InspectorAction::ToggleSelectMatched { all_visible } => {
                self.toggle_select_matched(all_visible)
            }
            InspectorAction::NextMatch { include_collapsed } => {
                self.scroll_to_match(false, include_collapsed).is_some()
            }
            InspectorAction::PrevMatch { include_collapsed } => {
                self.scroll_to_match(true, include_collapsed).is_some()
            }
            InspectorAction::ToggleConcept { concept, reset } => {
                self.toggle_concept(concept, reset)
            }
            InspectorAction::ToggleOption(option) => self.toggle_option(option),
            InspectorAction::ToggleSubHost => self
                .focused
                .is_some_and(|id| self.toggle_sub_host(model, id).is_ok()),
            InspectorAction::ToggleIncludeAllSubHosts => {
                self.set_include_all_sub_hosts(model, !self.include_all_sub_hosts);
                true
            }
            InspectorAction::ClearFilter => self.set_filter(""),
            InspectorAction::Custom(_) => false,
        };
        if handled {
            InspectorEvent::Handled
        } else {
            InspectorEvent::Unhandled
        }
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event into an action and handles it.
    pub fn handle_key<T: HostTree<Id = Id>>(
        &mut self,
        model: &T,
        key: KeyEvent,
    ) -> InspectorEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return InspectorEvent::Unhandled;
        };
        self.handle_action(model, action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event with a custom mapping and handles it.
    pub fn handle_key_with<T, C, F>(
        &mut self,
        model: &T,
        key: KeyEvent,
        custom: F,
    ) -> InspectorEvent<C>
    where
        T: HostTree<Id = Id>,
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return InspectorEvent::Unhandled;
        };
        self.handle_action(model, action)
    }
}

const fn option_slot(options: &mut VisibilityOptions, option: InspectorOption) -> &mut bool {
    match option {
        InspectorOption::ShowCollapsed => &mut options.show_collapsed,
        InspectorOption::HideUnmatched => &mut options.hide_unmatched,
        InspectorOption::ShowParents => &mut options.show_parents,
        InspectorOption::ShowChildren => &mut options.show_children,
        InspectorOption::IgnoreSelection => &mut options.ignore_selection,
        InspectorOption::IgnoreFilter => &mut options.ignore_filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryTree, NodeId};
    use crate::schedule::TimerQueue;
    use std::time::Duration;

    // root ─┬─ app ─┬─ div ─── "hello"
    //       │       └─ span
    //       └─ host ─── inner
    struct Fixture {
        tree: MemoryTree,
        root: NodeId,
        app: NodeId,
        div: NodeId,
        text: NodeId,
        span: NodeId,
        host: NodeId,
        inner: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = MemoryTree::new();
        let root = tree.push(None, NodeKind::Root, "Root", "<body>").unwrap();
        let app = tree
            .push(Some(root), NodeKind::Component, "App", "class App")
            .unwrap();
        let div = tree.push(Some(app), NodeKind::DomElement, "div", "<div>").unwrap();
        let text = tree.push(Some(div), NodeKind::DomText, "", "\"hello\"").unwrap();
        let span = tree
            .push(Some(app), NodeKind::DomElement, "span", "<span/>")
            .unwrap();
        let host = tree.push(Some(root), NodeKind::Host, "Host", "").unwrap();
        let inner = tree
            .push(Some(host), NodeKind::Component, "Inner", "")
            .unwrap();
        Fixture {
            tree,
            root,
            app,
            div,
            text,
            span,
            host,
            inner,
        }
    }

    fn mounted(f: &Fixture) -> TreeInspector<NodeId> {
        let mut inspector = TreeInspector::new();
        inspector.window_mut().mount(3);
        inspector.refresh(&f.tree);
        inspector.take_notices();
        inspector
    }

    fn row_ids(inspector: &TreeInspector<NodeId>) -> Vec<NodeId> {
        let items = inspector.index().items();
        inspector
            .visible_rows()
            .iter()
            .map(|&pos| items[pos].id())
            .collect()
    }

    #[test]
    fn sub_host_children_are_skipped_until_included() {
        let f = fixture();
        let mut inspector = mounted(&f);
        assert!(!inspector.index().contains(f.inner));
        assert!(!inspector.index().item(f.host).unwrap().has_children());

        inspector.toggle_sub_host(&f.tree, f.host).unwrap();
        assert!(inspector.index().contains(f.inner));
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::SubHostAttached(f.host)]
        );
        assert_eq!(
            inspector.toggle_sub_host(&f.tree, f.app),
            Err(InspectorError::NotSubHost)
        );
    }

    #[test]
    fn include_all_attaches_and_stale_hosts_detach() {
        let mut f = fixture();
        let mut inspector = mounted(&f);
        inspector.set_include_all_sub_hosts(&f.tree, true);
        assert_eq!(inspector.included_sub_hosts(), &[f.host]);
        assert!(inspector.index().contains(f.inner));
        inspector.take_notices();

        f.tree.remove(f.host);
        inspector.refresh(&f.tree);
        assert!(inspector.included_sub_hosts().is_empty());
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::SubHostDetached(f.host)]
        );
    }

    #[test]
    fn refresh_prunes_removed_ids() {
        let mut f = fixture();
        let mut inspector = mounted(&f);
        inspector.toggle_selected(f.span, ToggleMode::SelfOnly).unwrap();
        inspector.toggle_collapsed(f.div, ToggleMode::SelfOnly).unwrap();

        f.tree.remove(f.div);
        f.tree.remove(f.span);
        inspector.refresh(&f.tree);

        assert!(inspector.selected().is_empty());
        assert!(inspector.collapsed().is_empty());
        assert!(!row_ids(&inspector).contains(&f.text));
    }

    #[test]
    fn collapsing_a_leaf_is_rejected() {
        let f = fixture();
        let mut inspector = mounted(&f);
        let revision = inspector.collapsed().revision();
        assert_eq!(
            inspector.toggle_collapsed(f.text, ToggleMode::SelfOnly),
            Err(InspectorError::NotCollapsible)
        );
        assert_eq!(inspector.collapsed().revision(), revision);
        assert_eq!(
            inspector.toggle_collapsed(999, ToggleMode::SelfOnly),
            Err(InspectorError::UnknownItem)
        );
    }

    #[test]
    fn none_collapsed_notice_is_edge_triggered() {
        let f = fixture();
        let mut inspector = mounted(&f);

        inspector.toggle_collapsed(f.app, ToggleMode::SelfOnly).unwrap();
        inspector.toggle_collapsed(f.div, ToggleMode::SelfOnly).unwrap();
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::NoneCollapsedChanged(false)]
        );

        inspector.toggle_collapse_all();
        assert!(inspector.none_collapsed());
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::NoneCollapsedChanged(true)]
        );
    }

    #[test]
    fn pruning_collapsed_ids_notifies_once() {
        let mut f = fixture();
        let mut inspector = mounted(&f);
        inspector.toggle_collapsed(f.div, ToggleMode::SelfOnly).unwrap();
        inspector.take_notices();

        f.tree.remove(f.div);
        inspector.refresh(&f.tree);
        assert!(inspector.none_collapsed());
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::NoneCollapsedChanged(true)]
        );

        inspector.refresh(&f.tree);
        assert!(inspector.take_notices().is_empty());
    }

    #[test]
    fn pruning_the_selection_notifies_once() {
        let mut f = fixture();
        let mut inspector = mounted(&f);
        inspector.toggle_selected(f.span, ToggleMode::SelfOnly).unwrap();
        assert!(!inspector.should_select());
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::ShouldSelectChanged(false)]
        );

        f.tree.remove(f.span);
        inspector.refresh(&f.tree);
        assert!(inspector.should_select());
        assert_eq!(
            inspector.take_notices(),
            vec![InspectorNotice::ShouldSelectChanged(true)]
        );

        inspector.refresh(&f.tree);
        assert!(inspector.take_notices().is_empty());
    }

    #[test]
    fn should_select_follows_matched_and_selected() {
        let f = fixture();
        let mut inspector = mounted(&f);
        assert!(inspector.should_select());

        inspector.set_filter("div");
        assert!(inspector.should_select());
        assert!(inspector.toggle_select_matched(false));
        assert!(inspector.selected().contains(f.div));
        assert!(!inspector.should_select());
        assert!(
            inspector
                .take_notices()
                .contains(&InspectorNotice::ShouldSelectChanged(false))
        );

        // Second press removes the matched rows again.
        inspector.toggle_select_matched(false);
        assert!(inspector.selected().is_empty());
    }

    #[test]
    fn select_matched_without_matching_selects_all() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.toggle_select_matched(false);
        assert_eq!(inspector.selected().len(), inspector.index().len());
    }

    #[test]
    fn hide_unmatched_with_parents() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.set_options(VisibilityOptions {
            hide_unmatched: true,
            show_parents: true,
            ..VisibilityOptions::default()
        });
        inspector.set_filter("hello");
        assert_eq!(row_ids(&inspector), vec![f.root, f.app, f.div, f.text]);

        let flags = inspector.row_flags(inspector.index().position(f.app).unwrap());
        assert!(flags.dimmed);
    }

    #[test]
    fn scroll_to_match_expands_then_scrolls_after_update() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.toggle_collapsed(f.app, ToggleMode::SelfOnly).unwrap();
        inspector.set_filter("hello");

        assert_eq!(inspector.scroll_to_match(false, false), None);
        assert_eq!(inspector.scroll_to_match(false, true), Some(f.text));
        assert!(inspector.collapsed().is_empty());
        assert_eq!(inspector.focused(), None);

        inspector.did_update();
        assert_eq!(inspector.focused(), Some(f.text));
        while inspector.window().needs_render() {
            inspector.did_update();
        }
        assert!(
            inspector
                .take_notices()
                .contains(&InspectorNotice::Focus(f.text))
        );
        let row = inspector.row_of(f.text).unwrap();
        assert!(inspector.window().is_row_in_view(row));
    }

    #[test]
    fn focus_item_selects_row_hidden_by_matching() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.set_options(VisibilityOptions {
            hide_unmatched: true,
            ..VisibilityOptions::default()
        });
        inspector.set_filter("span");
        assert_eq!(inspector.row_of(f.text), None);

        assert_eq!(inspector.focus_item(f.text), Ok(ScrollStatus::Pending));
        assert!(inspector.selected().contains(f.text));
        inspector.did_update();
        assert_eq!(inspector.focused(), Some(f.text));
    }

    #[test]
    fn cursor_follows_selection_changes() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.modify_selected(&[f.div, f.span], SetOp::Reset);
        assert_eq!(inspector.scroll_to_match(false, false), Some(f.div));
        assert_eq!(inspector.scroll_to_match(false, false), Some(f.span));

        inspector.modify_selected(&[f.div], SetOp::Remove);
        assert_eq!(inspector.match_cursor(), Some(0));
    }

    #[test]
    fn coalesced_refresh_runs_once_per_burst() {
        let mut f = fixture();
        let mut inspector = mounted(&f);
        let mut timers = TimerQueue::new();
        let updates = inspector.update_count();

        for _ in 0..5 {
            f.tree.set_description(f.text, "\"bye\"");
            inspector.on_render_finished(&mut timers, false);
        }
        timers.advance(Duration::from_millis(1));
        for timer in timers.due() {
            inspector.on_timer(timer, &f.tree);
        }

        assert_eq!(inspector.update_count(), updates + 1);
        assert_eq!(
            inspector.index().item(f.text).unwrap().description(),
            "\"bye\""
        );
    }

    #[test]
    fn detach_cancels_pending_refresh() {
        let f = fixture();
        let mut inspector = mounted(&f);
        let mut timers = TimerQueue::new();
        inspector.on_render_finished(&mut timers, false);
        inspector.detach(&mut timers);

        assert!(timers.is_empty());
        assert!(inspector.index().is_empty());
        assert!(inspector.visible_rows().is_empty());
    }

    #[test]
    fn focus_moves_and_reexpands() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::FocusFirst);
        assert_eq!(inspector.focused(), Some(f.root));

        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::FocusNext);
        inspector.handle_action::<_, ()>(
            &f.tree,
            InspectorAction::ToggleCollapsed(ToggleMode::SelfOnly),
        );
        assert!(inspector.collapsed().contains(f.app));

        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::FocusChild);
        assert!(!inspector.collapsed().contains(f.app));
        assert_eq!(inspector.focused(), Some(f.div));

        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::FocusParent);
        assert_eq!(inspector.focused(), Some(f.app));
    }

    #[test]
    fn activate_respects_row_mode() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.focus_row(1);
        inspector.set_row_mode(RowMode::Tip);
        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::Activate);
        assert_eq!(inspector.tip(), Some(f.app));
        assert!(inspector.selected().is_empty());

        inspector.set_row_mode(RowMode::Select);
        inspector.handle_action::<_, ()>(&f.tree, InspectorAction::Activate);
        assert!(inspector.selected().contains(f.app));
    }

    #[test]
    fn settings_round_trip_through_apply() {
        let f = fixture();
        let mut inspector = mounted(&f);
        inspector.set_filter("[component]");
        inspector.toggle_option(InspectorOption::HideUnmatched);
        let settings = inspector.settings();

        let mut other = mounted(&f);
        other.apply_settings(&settings);
        assert_eq!(other.settings(), settings);
        assert_eq!(row_ids(&other), vec![f.app]);
    }

    #[test]
    fn custom_action_is_forwarded() {
        let f = fixture();
        let mut inspector = mounted(&f);
        let event = inspector.handle_action(&f.tree, InspectorAction::Custom(7_u8));
        assert_eq!(event, InspectorEvent::Action(InspectorAction::Custom(7)));
    }
}
