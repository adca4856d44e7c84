// Custom keymap example: map keys to InspectorAction manually and call handle_action.
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;

use tui_treeinspect::{
    InspectorAction, InspectorEvent, InspectorOption, InspectorStyle, InspectorView, MemoryTree,
    NodeKind, ToggleMode, TreeInspector,
};

// Actions the host handles itself.
#[derive(Clone, Copy, Debug)]
enum HostAction {
    Highlight,
}

// Custom keymap: WASD + a few extra actions.
fn map_key(event: KeyEvent) -> Option<InspectorAction<HostAction>> {
    match (event.code, event.modifiers) {
        (KeyCode::Char('w'), KeyModifiers::NONE) => Some(InspectorAction::FocusPrev),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(InspectorAction::FocusNext),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(InspectorAction::FocusParent),
        (KeyCode::Char('d'), KeyModifiers::NONE) => Some(InspectorAction::FocusChild),
        (KeyCode::Char('x'), KeyModifiers::NONE) => {
            Some(InspectorAction::ToggleCollapsed(ToggleMode::SelfOnly))
        }
        (KeyCode::Char('m'), KeyModifiers::NONE) => {
            Some(InspectorAction::ToggleSelected(ToggleMode::SelfOnly))
        }
        (KeyCode::Char('u'), KeyModifiers::NONE) => Some(InspectorAction::ToggleOption(
            InspectorOption::HideUnmatched,
        )),
        (KeyCode::Char('h'), KeyModifiers::NONE) => {
            Some(InspectorAction::Custom(HostAction::Highlight))
        }
        _ => None,
    }
}

fn main() {
    let mut tree = MemoryTree::new();
    let Some(root) = tree.push(None, NodeKind::Root, "", "<body>") else {
        return;
    };
    for name in ["alpha", "beta", "gamma"] {
        tree.push(Some(root), NodeKind::Component, name, "");
    }

    let mut inspector = TreeInspector::new();
    inspector.refresh(&tree);
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);

    // Simulate a few key presses and apply actions manually.
    let demo_keys = [
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('u'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE),
    ];

    for key in demo_keys {
        if let Some(action) = map_key(key)
            && let InspectorEvent::Action(InspectorAction::Custom(HostAction::Highlight)) =
                inspector.handle_action(&tree, action)
        {
            inspector.set_tip(inspector.focused());
        }
        InspectorView::new(InspectorStyle::default()).render(area, &mut buffer, &mut inspector);
    }
}
