use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::context::RowContext;
use crate::index::DebugTreeItem;
use crate::model::NodeKind;
use crate::style::InspectorStyle;

#[derive(Clone, Copy)]
pub struct TreeGlyphs<'a> {
    pub indent: &'a str,
    pub leaf: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
    pub selected: &'a str,
    pub unselected: &'a str,
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "  ",
            leaf: "•",
            expanded: "▼",
            collapsed: "▶",
            selected: "●",
            unselected: " ",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "  ",
            leaf: "*",
            expanded: "v",
            collapsed: ">",
            selected: "x",
            unselected: " ",
        }
    }
}

/// Builds the line shown for one row.
pub trait RowRenderer<Id> {
    fn line<'a>(
        &'a self,
        item: &'a DebugTreeItem<Id>,
        ctx: &RowContext,
        glyphs: &TreeGlyphs<'a>,
        style: &InspectorStyle<'a>,
    ) -> Line<'a>;
}

/// Indentation, expander, name and description.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRowRenderer;

impl<Id> RowRenderer<Id> for DefaultRowRenderer {
    fn line<'a>(
        &'a self,
        item: &'a DebugTreeItem<Id>,
        ctx: &RowContext,
        glyphs: &TreeGlyphs<'a>,
        style: &InspectorStyle<'a>,
    ) -> Line<'a> {
        row_label_line(item, ctx, glyphs, style)
    }
}

/// Label shown for an item: its own name, or one derived from its kind.
pub fn display_name<Id>(item: &DebugTreeItem<Id>) -> &str {
    if !item.name().is_empty() {
        return item.name();
    }
    match item.kind() {
        NodeKind::Component => "Anonymous",
        NodeKind::Pass { remote: true } => "Remote pass",
        NodeKind::Pass { remote: false } => "Pass",
        NodeKind::Portal => "Portal",
        NodeKind::Host => "Host",
        NodeKind::Root => "Root",
        NodeKind::Empty => "Empty",
        NodeKind::DomText => "text",
        NodeKind::DomElement | NodeKind::DomExternal | NodeKind::DomPseudo => "",
    }
}

pub fn row_label_line<'a, Id>(
    item: &'a DebugTreeItem<Id>,
    ctx: &RowContext,
    glyphs: &TreeGlyphs<'a>,
    style: &InspectorStyle<'a>,
) -> Line<'a> {
    let expander = match ctx.flags.collapsed {
        Some(true) => glyphs.collapsed,
        Some(false) => glyphs.expanded,
        None => glyphs.leaf,
    };
    let marker = if ctx.flags.selected {
        glyphs.selected
    } else {
        glyphs.unselected
    };

    let mut spans = Vec::with_capacity(ctx.level as usize + 6);
    spans.push(Span::styled(marker, style.selected_style));
    for _ in 0..ctx.level {
        spans.push(Span::raw(glyphs.indent));
    }
    spans.push(Span::raw(expander));
    spans.push(Span::raw(" "));

    let name = display_name(item);
    if !name.is_empty() {
        spans.push(Span::styled(name, style.kind_style(item.kind())));
    }
    if !item.description().is_empty() {
        if !name.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(item.description(), style.description_style));
    }

    let mut line = Line::from(spans);
    if ctx.flags.dimmed {
        line = line.patch_style(style.dimmed_style);
    }
    if ctx.is_tip {
        line = line.patch_style(style.tip_style);
    }
    line
}

/// Builds a plain-style line, for hosts that style rows themselves.
pub fn plain_row_line<'a, Id>(
    item: &'a DebugTreeItem<Id>,
    ctx: &RowContext,
    glyphs: &TreeGlyphs<'a>,
) -> Line<'a> {
    let style = InspectorStyle {
        selected_style: Style::default(),
        description_style: Style::default(),
        dimmed_style: Style::default(),
        tip_style: Style::default(),
        component_style: Style::default(),
        dom_style: Style::default(),
        ..InspectorStyle::default()
    };
    row_label_line(item, ctx, glyphs, &style)
}
