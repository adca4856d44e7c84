use std::hash::Hash;

use crate::selection::IdSet;

/// Wrap-around cursor for "jump to next/previous match".
///
/// `None` means "before the first match", so the first forward step lands
/// on index 0 and the first backward step on the last match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchCycler {
    cursor: Option<usize>,
}

impl MatchCycler {
    pub const fn new() -> Self {
        Self { cursor: None }
    }

    #[inline]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub const fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub const fn reset(&mut self) {
        self.cursor = None;
    }

    /// Advances over `count` eligible matches and returns the new cursor,
    /// or `None` (cursor untouched) if there is nothing to cycle through.
    pub const fn next(&mut self, count: usize, backwards: bool) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let next = if backwards {
            match self.cursor {
                Some(cursor) if cursor > 0 && cursor < count => cursor - 1,
                // Fresh, at zero, or stale past the end.
                _ => count - 1,
            }
        } else {
            match self.cursor {
                Some(cursor) if cursor + 1 < count => cursor + 1,
                _ => 0,
            }
        };
        self.cursor = Some(next);
        Some(next)
    }

    /// Best-effort correction after the selection changed.
    ///
    /// If the id the cursor pointed at (by position in the old selection)
    /// is still selected, follow its new position; otherwise step back by one.
    pub fn follow_selection<Id: Copy + Eq + Hash>(&mut self, before: &[Id], after: &IdSet<Id>) {
        let Some(cursor) = self.cursor else {
            return;
        };
        match before.get(cursor).and_then(|&id| after.position(id)) {
            Some(moved) => self.cursor = Some(moved),
            None => self.cursor = cursor.checked_sub(1),
        }
    }
}
