use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{InspectorAction, InspectorOption};
use crate::model::Concept;
use crate::selection::ToggleMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    #[default]
    Default,
    Vim,
    Arrows,
}

/// Maps key events to [`InspectorAction`]s.
///
/// Modifiers widen toggles: `Shift` applies to the whole level, `Ctrl` to
/// siblings, and `Alt` isolates (the ancestor chain for collapsing, the single
/// item for selection).
#[derive(Clone, Copy, Debug)]
pub struct InspectorKeyBindings {
    profile: KeymapProfile,
}

impl Default for InspectorKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve<C>(&self, key: KeyEvent) -> Option<InspectorAction<C>> {
        match key.code {
            KeyCode::Char(' ') => {
                return Some(InspectorAction::ToggleSelected(select_mode(key.modifiers)));
            }
            KeyCode::Enter => {
                return Some(InspectorAction::ToggleCollapsed(collapse_mode(
                    key.modifiers,
                )));
            }
            _ => {}
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => self.resolve_default_nav(key),
            KeymapProfile::Vim => self.resolve_vim_nav(key),
            KeymapProfile::Arrows => self.resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        self.resolve_common(key)
    }

    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<InspectorAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Some(action) = custom(key) {
            return Some(InspectorAction::Custom(action));
        }

        self.resolve(key)
    }

    const fn resolve_default_nav<C>(&self, key: KeyEvent) -> Option<InspectorAction<C>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(InspectorAction::FocusPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(InspectorAction::FocusNext),
            KeyCode::Left | KeyCode::Char('h') => Some(InspectorAction::FocusParent),
            KeyCode::Right | KeyCode::Char('l') => Some(InspectorAction::FocusChild),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(&self, key: KeyEvent) -> Option<InspectorAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(InspectorAction::FocusPrev),
            KeyCode::Char('j') => Some(InspectorAction::FocusNext),
            KeyCode::Char('h') => Some(InspectorAction::FocusParent),
            KeyCode::Char('l') => Some(InspectorAction::FocusChild),
            KeyCode::Char('g') => Some(InspectorAction::FocusFirst),
            KeyCode::Char('G') => Some(InspectorAction::FocusLast),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(&self, key: KeyEvent) -> Option<InspectorAction<C>> {
        match key.code {
            KeyCode::Up => Some(InspectorAction::FocusPrev),
            KeyCode::Down => Some(InspectorAction::FocusNext),
            KeyCode::Left => Some(InspectorAction::FocusParent),
            KeyCode::Right => Some(InspectorAction::FocusChild),
            _ => None,
        }
    }

    fn resolve_common<C>(&self, key: KeyEvent) -> Option<InspectorAction<C>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Home => Some(InspectorAction::FocusFirst),
            KeyCode::End => Some(InspectorAction::FocusLast),
            KeyCode::PageUp => Some(InspectorAction::PageUp),
            KeyCode::PageDown => Some(InspectorAction::PageDown),
            KeyCode::Tab => Some(InspectorAction::Activate),
            KeyCode::Esc => Some(InspectorAction::ClearFilter),
            KeyCode::Char('n') => Some(InspectorAction::NextMatch {
                include_collapsed: ctrl,
            }),
            KeyCode::Char('N') => Some(InspectorAction::PrevMatch {
                include_collapsed: ctrl,
            }),
            KeyCode::Char('a') => Some(InspectorAction::ToggleSelectMatched { all_visible: false }),
            KeyCode::Char('A') => Some(InspectorAction::ToggleSelectMatched { all_visible: true }),
            KeyCode::Char('c') => Some(InspectorAction::ToggleCollapseAll),
            KeyCode::Char('s') => option(InspectorOption::ShowCollapsed),
            KeyCode::Char('u') => option(InspectorOption::HideUnmatched),
            KeyCode::Char('p') => option(InspectorOption::ShowParents),
            KeyCode::Char('C') => option(InspectorOption::ShowChildren),
            KeyCode::Char('i') => option(InspectorOption::IgnoreSelection),
            KeyCode::Char('f') => option(InspectorOption::IgnoreFilter),
            KeyCode::Char('x') => Some(InspectorAction::ToggleSubHost),
            KeyCode::Char('X') => Some(InspectorAction::ToggleIncludeAllSubHosts),
            KeyCode::Char(digit @ '0'..='9') => {
                concept_for_digit(digit).map(|concept| InspectorAction::ToggleConcept {
                    concept,
                    reset: alt,
                })
            }
            _ => None,
        }
    }
}

const fn option<C>(option: InspectorOption) -> Option<InspectorAction<C>> {
    Some(InspectorAction::ToggleOption(option))
}

const fn select_mode(modifiers: KeyModifiers) -> ToggleMode {
    if modifiers.contains(KeyModifiers::ALT) {
        ToggleMode::Reset
    } else if modifiers.contains(KeyModifiers::CONTROL) {
        ToggleMode::Siblings
    } else if modifiers.contains(KeyModifiers::SHIFT) {
        ToggleMode::Level
    } else {
        ToggleMode::SelfOnly
    }
}

const fn collapse_mode(modifiers: KeyModifiers) -> ToggleMode {
    if modifiers.contains(KeyModifiers::ALT) {
        ToggleMode::Chain
    } else if modifiers.contains(KeyModifiers::CONTROL) {
        ToggleMode::Siblings
    } else if modifiers.contains(KeyModifiers::SHIFT) {
        ToggleMode::Level
    } else {
        ToggleMode::SelfOnly
    }
}

// `1`..`9` then `0` address the first ten categories in toolbar order.
fn concept_for_digit(digit: char) -> Option<Concept> {
    let slot = match digit.to_digit(10)? {
        0 => 9,
        n => n as usize - 1,
    };
    Concept::ALL.get(slot).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn modifiers_widen_toggles() {
        let bindings = InspectorKeyBindings::new();
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Char(' '))),
            Some(InspectorAction::ToggleSelected(ToggleMode::SelfOnly))
        );
        assert_eq!(
            bindings.resolve::<()>(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            Some(InspectorAction::ToggleCollapsed(ToggleMode::Level))
        );
        assert_eq!(
            bindings.resolve::<()>(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)),
            Some(InspectorAction::ToggleCollapsed(ToggleMode::Chain))
        );
        assert_eq!(
            bindings.resolve::<()>(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::ALT)),
            Some(InspectorAction::ToggleSelected(ToggleMode::Reset))
        );
    }

    #[test]
    fn profiles_differ_on_navigation() {
        let arrows = InspectorKeyBindings::with_profile(KeymapProfile::Arrows);
        assert_eq!(arrows.resolve::<()>(key(KeyCode::Char('j'))), None);
        assert_eq!(
            arrows.resolve::<()>(key(KeyCode::Down)),
            Some(InspectorAction::FocusNext)
        );

        let vim = InspectorKeyBindings::with_profile(KeymapProfile::Vim);
        assert_eq!(vim.resolve::<()>(key(KeyCode::Down)), None);
        assert_eq!(
            vim.resolve::<()>(key(KeyCode::Char('G'))),
            Some(InspectorAction::FocusLast)
        );
    }

    #[test]
    fn digits_toggle_concepts() {
        let bindings = InspectorKeyBindings::new();
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Char('1'))),
            Some(InspectorAction::ToggleConcept {
                concept: Concept::Component,
                reset: false,
            })
        );
        assert_eq!(
            bindings.resolve::<()>(KeyEvent::new(KeyCode::Char('2'), KeyModifiers::ALT)),
            Some(InspectorAction::ToggleConcept {
                concept: Concept::Dom,
                reset: true,
            })
        );
        assert_eq!(
            bindings.resolve::<()>(key(KeyCode::Char('0'))),
            Some(InspectorAction::ToggleConcept {
                concept: Concept::Root,
                reset: false,
            })
        );
    }

    #[test]
    fn custom_mapping_wins() {
        let bindings = InspectorKeyBindings::new();
        let action = bindings.resolve_with(key(KeyCode::Char('q')), |event| {
            (event.code == KeyCode::Char('q')).then_some("quit")
        });
        assert_eq!(action, Some(InspectorAction::Custom("quit")));
        assert_eq!(
            bindings.resolve_with(key(KeyCode::Char('n')), |_| None::<&str>),
            Some(InspectorAction::NextMatch {
                include_collapsed: false
            })
        );
    }
}
