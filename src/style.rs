use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Borders;

use crate::model::NodeKind;

/// Visual settings of the inspector view.
#[derive(Clone)]
pub struct InspectorStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    pub focus_style: Style,
    pub selected_style: Style,
    pub dimmed_style: Style,
    pub description_style: Style,
    pub tip_style: Style,
    pub component_style: Style,
    pub dom_style: Style,
    pub focus_symbol: &'a str,
    pub borders: Borders,
    pub show_scrollbar: bool,
}

impl Default for InspectorStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            focus_style: Style::default().add_modifier(Modifier::REVERSED),
            selected_style: Style::default().fg(Color::Yellow),
            dimmed_style: Style::default().add_modifier(Modifier::DIM),
            description_style: Style::default().fg(Color::DarkGray),
            tip_style: Style::default().add_modifier(Modifier::UNDERLINED),
            component_style: Style::default().fg(Color::Cyan),
            dom_style: Style::default(),
            focus_symbol: "> ",
            borders: Borders::ALL,
            show_scrollbar: true,
        }
    }
}

impl InspectorStyle<'_> {
    /// Style of an item's name, by kind.
    pub fn kind_style(&self, kind: NodeKind) -> Style {
        if kind.is_dom() {
            self.dom_style
        } else {
            self.component_style
        }
    }
}
