// Minimal example: mirror a tiny render tree and draw it into a buffer.
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;

use tui_treeinspect::{InspectorStyle, InspectorView, MemoryTree, NodeKind, TreeInspector};

fn main() {
    // Root -> App -> {div -> "hello", span}.
    let mut tree = MemoryTree::new();
    let Some(root) = tree.push(None, NodeKind::Root, "", "<body>") else {
        return;
    };
    let app = tree.push(Some(root), NodeKind::Component, "App", "");
    let div = app.and_then(|app| tree.push(Some(app), NodeKind::DomElement, "div", "<div>"));
    if let Some(div) = div {
        tree.push(Some(div), NodeKind::DomText, "", "\"hello\"");
    }
    if let Some(app) = app {
        tree.push(Some(app), NodeKind::DomElement, "span", "<span/>");
    }

    // The inspector keeps selection, collapsing and the filter across frames.
    let mut inspector = TreeInspector::new();
    inspector.refresh(&tree);
    inspector.set_filter("[component] app");

    // Render into an in-memory buffer (no terminal required for the example).
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);
    InspectorView::new(InspectorStyle::default()).render(area, &mut buffer, &mut inspector);
}
