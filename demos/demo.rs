use std::env;
use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{DefaultTerminal, Frame};
use tracing_subscriber::EnvFilter;

use tui_treeinspect::{
    InspectorEvent, InspectorNotice, InspectorStyle, InspectorView, MemoryTree, NodeId, NodeKind,
    TimerQueue, TreeInspector,
};

const TICK: Duration = Duration::from_secs(1);
const POLL: Duration = Duration::from_millis(200);

// A small render tree that keeps changing: a clock text node and a list
// whose items come and go.
struct LiveTree {
    tree: MemoryTree,
    clock: Option<NodeId>,
    list: Option<NodeId>,
    items: Vec<NodeId>,
    ticks: u64,
}

impl LiveTree {
    fn build(width: usize) -> Self {
        let mut tree = MemoryTree::new();
        let root = tree.push(None, NodeKind::Root, "", "<body>");
        let app = root.and_then(|root| tree.push(Some(root), NodeKind::Component, "App", ""));
        let header =
            app.and_then(|app| tree.push(Some(app), NodeKind::DomElement, "header", "<header>"));
        let clock = header.and_then(|header| {
            tree.push(Some(header), NodeKind::DomText, "", format!("\"{}\"", now_string()))
        });
        let list = app.and_then(|app| tree.push(Some(app), NodeKind::Component, "List", ""));

        // A nested host with its own subtree, hidden until included.
        let host = app.and_then(|app| tree.push(Some(app), NodeKind::Host, "Sidebar", ""));
        if let Some(host) = host
            && let Some(panel) = tree.push(Some(host), NodeKind::Component, "Panel", "")
        {
            tree.push(Some(panel), NodeKind::DomElement, "aside", "<aside>");
        }
        if let Some(app) = app {
            tree.push(Some(app), NodeKind::Portal, "", "");
            tree.push(Some(app), NodeKind::Pass { remote: true }, "", "");
        }

        let mut live = Self {
            tree,
            clock,
            list,
            items: Vec::new(),
            ticks: 0,
        };
        for _ in 0..width {
            live.push_item();
        }
        live
    }

    fn push_item(&mut self) {
        let Some(list) = self.list else {
            return;
        };
        let idx = self.tree.len();
        let Some(item) = self
            .tree
            .push(Some(list), NodeKind::Component, "Item", format!("{{ key: {idx} }}"))
        else {
            return;
        };
        if let Some(li) = self
            .tree
            .push(Some(item), NodeKind::DomElement, "li", "<li>")
        {
            self.tree
                .push(Some(li), NodeKind::DomText, "", format!("\"item {idx}\""));
        }
        self.items.push(item);
    }

    // One "render" of the live tree.
    fn tick(&mut self) {
        self.ticks += 1;
        if let Some(clock) = self.clock {
            self.tree
                .set_description(clock, format!("\"{}\"", now_string()));
        }
        if self.ticks % 3 == 0 && !self.items.is_empty() {
            let gone = self.items.remove(0);
            self.tree.remove(gone);
        }
        self.push_item();
    }
}

struct App {
    live: LiveTree,
    inspector: TreeInspector<NodeId>,
    timers: TimerQueue,
    filter: String,
    editing: bool,
    status: String,
}

impl App {
    fn new(width: usize) -> Self {
        let live = LiveTree::build(width);
        let mut inspector = TreeInspector::new();
        inspector.refresh(&live.tree);
        Self {
            live,
            inspector,
            timers: TimerQueue::new(),
            filter: String::new(),
            editing: false,
            status: String::new(),
        }
    }

    fn tick(&mut self) {
        self.live.tick();
        // Several renders may land before the timer fires; they coalesce.
        self.inspector.on_render_finished(&mut self.timers, false);
    }

    fn run_timers(&mut self) {
        self.timers.set_now(Instant::now());
        for timer in self.timers.due() {
            self.inspector.on_timer(timer, &self.live.tree);
        }
        for notice in self.inspector.take_notices() {
            self.status = match notice {
                InspectorNotice::NoneCollapsedChanged(none) => format!("none collapsed: {none}"),
                InspectorNotice::ShouldSelectChanged(select) => format!("should select: {select}"),
                InspectorNotice::SubHostAttached(id) => format!("sub-host {id} attached"),
                InspectorNotice::SubHostDetached(id) => format!("sub-host {id} detached"),
                InspectorNotice::Focus(id) => format!("focused {id}"),
            };
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter | KeyCode::Esc => self.editing = false,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(ch) => self.filter.push(ch),
            _ => return,
        }
        self.inspector.set_filter(&self.filter);
    }
}

fn now_string() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn render(frame: &mut Frame, app: &mut App, style: &InspectorStyle<'_>) {
    let [tree_area, filter_area, status_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let mut style = style.clone();
    style.title = Some(Line::from(format!(
        "render tree ({} nodes, update {})",
        app.live.tree.len(),
        app.inspector.update_count()
    )));
    frame.render_stateful_widget(InspectorView::new(style), tree_area, &mut app.inspector);

    let cursor = if app.editing { "_" } else { "" };
    let prompt = format!("/{}{cursor}", app.filter);
    frame.render_widget(Paragraph::new(prompt), filter_area);
    let status = Paragraph::new(app.status.as_str())
        .style(Style::default().fg(Color::Rgb(136, 192, 208)));
    frame.render_widget(status, status_area);
}

fn run_app(mut terminal: DefaultTerminal, mut app: App) -> io::Result<()> {
    let style = InspectorStyle {
        block_style: Style::default()
            .fg(Color::Rgb(221, 227, 235))
            .bg(Color::Rgb(24, 28, 36)),
        border_style: Style::default().fg(Color::Rgb(92, 110, 140)),
        selected_style: Style::default()
            .fg(Color::Rgb(229, 201, 133))
            .add_modifier(Modifier::BOLD),
        focus_style: Style::default()
            .fg(Color::Rgb(255, 255, 255))
            .bg(Color::Rgb(52, 66, 96))
            .add_modifier(Modifier::BOLD),
        ..InspectorStyle::default()
    };
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &mut app, &style))?;

        if last_tick.elapsed() >= TICK {
            last_tick = Instant::now();
            app.tick();
        }
        app.run_timers();

        let wait = app.timers.timeout().map_or(POLL, |timeout| timeout.min(POLL));
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.editing {
                        app.handle_filter_key(key.code);
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Char('/') => app.editing = true,
                        _ => {
                            let outcome = app.inspector.handle_key(&app.live.tree, key);
                            if matches!(outcome, InspectorEvent::Unhandled) {
                                app.status = format!("unbound: {:?}", key.code);
                            }
                            if app.inspector.filter_text() != app.filter {
                                app.filter = app.inspector.filter_text().to_string();
                            }
                        }
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

fn init_logging() {
    // Logs go to a file; the terminal belongs to the UI.
    let Ok(path) = env::var("INSPECTOR_LOG") else {
        return;
    };
    let Ok(file) = File::create(path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> io::Result<()> {
    init_logging();
    let width = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(50);

    let terminal = ratatui::init();
    let result = run_app(terminal, App::new(width));
    ratatui::restore();
    result
}
