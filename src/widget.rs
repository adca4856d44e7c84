use std::hash::Hash;
use std::marker::PhantomData;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::Span;
use ratatui::widgets::{
    Block, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
};

use crate::context::RowContext;
use crate::glyphs::{DefaultRowRenderer, RowRenderer, TreeGlyphs};
use crate::inspector::TreeInspector;
use crate::style::InspectorStyle;

/// Ratatui view over a [`TreeInspector`]. Only rows inside the virtual window are built.
pub struct InspectorView<'a, Id, R = DefaultRowRenderer>
where
    R: RowRenderer<Id>,
{
    renderer: &'a R,
    style: InspectorStyle<'a>,
    glyphs: TreeGlyphs<'a>,
    _id: PhantomData<Id>,
}

impl<'a, Id> InspectorView<'a, Id, DefaultRowRenderer> {
    pub const fn new(style: InspectorStyle<'a>) -> Self {
        Self {
            renderer: &DefaultRowRenderer,
            style,
            glyphs: TreeGlyphs::unicode(),
            _id: PhantomData,
        }
    }
}

impl<'a, Id, R> InspectorView<'a, Id, R>
where
    R: RowRenderer<Id>,
{
    pub const fn with_renderer(renderer: &'a R, style: InspectorStyle<'a>) -> Self {
        Self {
            renderer,
            style,
            glyphs: TreeGlyphs::unicode(),
            _id: PhantomData,
        }
    }

    #[must_use]
    pub fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    fn block(&self) -> Block<'a> {
        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block
            .style(self.style.block_style)
            .border_style(self.style.border_style)
    }
}

impl<Id, R> StatefulWidget for InspectorView<'_, Id, R>
where
    Id: Copy + Eq + Hash,
    R: RowRenderer<Id>,
{
    type State = TreeInspector<Id>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        let window = state.window_mut();
        if window.is_mounted() {
            window.resize(u32::from(inner.height));
        } else {
            window.mount(u32::from(inner.height));
        }

        let overflow = window.max_scroll() > 0;
        let (rows_area, scrollbar_area) = if self.style.show_scrollbar && overflow {
            (
                Rect {
                    width: inner.width.saturating_sub(1),
                    ..inner
                },
                Some(Rect {
                    x: inner.right().saturating_sub(1),
                    width: 1,
                    ..inner
                }),
            )
        } else {
            (inner, None)
        };

        render_rows(&self, rows_area, buf, state);

        if let Some(scrollbar_area) = scrollbar_area {
            let window = state.window();
            let content = usize::try_from(window.max_scroll()).unwrap_or(usize::MAX);
            let position = usize::try_from(window.scroll_top()).unwrap_or(usize::MAX);
            let mut scrollbar_state = ScrollbarState::new(content.saturating_add(1))
                .position(position)
                .viewport_content_length(usize::from(inner.height));
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .render(scrollbar_area, buf, &mut scrollbar_state);
        }

        state.did_update();
    }
}

fn render_rows<Id, R>(
    view: &InspectorView<'_, Id, R>,
    area: Rect,
    buf: &mut Buffer,
    state: &TreeInspector<Id>,
) where
    Id: Copy + Eq + Hash,
    R: RowRenderer<Id>,
{
    let window = state.window();
    let Some(range) = window.range() else {
        return;
    };
    let top = window.scroll_top();
    let bottom = top + u64::from(area.height);
    let items = state.index().items();
    let focused = state.focused();
    let symbol = Span::raw(view.style.focus_symbol);
    let symbol_width = u16::try_from(symbol.width()).unwrap_or(u16::MAX);

    for (offset, &pos) in state.window_rows().iter().enumerate() {
        let row_top = window.row_top(range.start + offset);
        // Tolerance rows outside the viewport.
        if row_top < top || row_top >= bottom {
            continue;
        }
        let Ok(dy) = u16::try_from(row_top - top) else {
            continue;
        };
        let item = &items[pos];
        let ctx = RowContext {
            level: item.level(),
            kind: item.kind(),
            flags: state.row_flags(pos),
            is_focused: focused == Some(item.id()),
            is_tip: state.tip() == Some(item.id()),
        };
        let y = area.y + dy;
        let line = view.renderer.line(item, &ctx, &view.glyphs, &view.style);
        if ctx.is_focused {
            let row = Rect {
                y,
                height: 1,
                ..area
            };
            buf.set_style(row, view.style.focus_style);
            buf.set_span(area.x, y, &symbol, area.width);
        }
        let x = area.x + symbol_width.min(area.width);
        buf.set_line(x, y, &line, area.width.saturating_sub(x - area.x));
    }
}
