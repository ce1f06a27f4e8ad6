pub mod graph_pane;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use graph_pane::GraphPane;
use rabbithole_core::graph::GraphView;
use rabbithole_core::page::{FetchOutcome, SearchPage};
use rabbithole_core::theme::{ColorMode, Palette};
use rabbithole_core::SearchResult;
use rabbithole_provider::ExaClient;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Completion of a background provider call, tagged with the sequence number
/// issued when the request was started.
#[derive(Debug)]
enum UiMessage {
    SearchFinished { seq: u64, outcome: FetchOutcome },
    SimilarFinished { seq: u64, outcome: FetchOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Input,
    Results,
}

pub struct App {
    page: SearchPage,
    graph: GraphView,
    palette: Palette,
    graph_pane: Box<dyn GraphPane>,

    input: String,
    // Byte offset into `input`, always on a char boundary.
    cursor_position: usize,
    focus: Focus,
    result_cursor: usize,
    results_scroll: usize,

    // Panel rectangles recorded during the last draw, for mouse hit-testing.
    results_area: Rect,
    graph_area: Rect,

    client: Arc<ExaClient>,
    runtime: Handle,
    tx: UnboundedSender<UiMessage>,
    rx: UnboundedReceiver<UiMessage>,

    should_quit: bool,
}

impl App {
    pub fn new(client: Arc<ExaClient>, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            page: SearchPage::new(),
            graph: GraphView::new(),
            palette: Palette::for_mode(ColorMode::detect()),
            graph_pane: graph_pane::detect(),
            input: String::new(),
            cursor_position: 0,
            focus: Focus::Input,
            result_cursor: 0,
            results_scroll: 0,
            results_area: Rect::default(),
            graph_area: Rect::default(),
            client,
            runtime,
            tx,
            rx,
            should_quit: false,
        }
    }

    /// Submit the current input as a new search. Blank input is ignored.
    fn submit_search(&mut self) {
        let Some(seq) = self.page.begin_search(&self.input) else {
            return;
        };
        self.graph.clear();
        self.result_cursor = 0;
        self.results_scroll = 0;

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let query = self.page.query().to_string();
        self.runtime.spawn(async move {
            let outcome = client
                .search(&query)
                .await
                .map_err(|_| "Failed to perform search".to_string());
            let _ = tx.send(UiMessage::SearchFinished { seq, outcome });
        });
    }

    /// Select a result and fetch its similar content.
    ///
    /// Re-selecting the current result, or selecting while a similarity
    /// request is already in flight, does nothing.
    fn select_result(&mut self, result: SearchResult) {
        let Some(seq) = self.page.begin_similar(&result) else {
            return;
        };
        self.graph.clear();

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let url = result.url.clone();
        self.runtime.spawn(async move {
            let outcome = client
                .find_similar(&url)
                .await
                .map_err(|_| "Failed to find similar content".to_string());
            let _ = tx.send(UiMessage::SimilarFinished { seq, outcome });
        });
    }

    /// Apply any completions that arrived since the last frame. Stale
    /// completions are dropped by the page's sequence checks.
    fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                UiMessage::SearchFinished { seq, outcome } => {
                    if self.page.complete_search(seq, outcome) {
                        self.result_cursor = 0;
                        self.results_scroll = 0;
                    }
                }
                UiMessage::SimilarFinished { seq, outcome } => {
                    if self.page.complete_similar(seq, outcome)
                        && let Some(selected) = self.page.selected()
                    {
                        self.graph.rebuild(selected, self.page.similar_results());
                    }
                }
            }
        }
    }

    fn select_cursor_result(&mut self) {
        if let Some(result) = self.page.search_results().get(self.result_cursor) {
            self.select_result(result.clone());
        }
    }

    /// Terminal column of the input cursor: chars before it, not bytes.
    fn cursor_column(&self) -> u16 {
        self.input[..self.cursor_position].chars().count() as u16
    }

    fn move_cursor(&mut self, delta: isize) {
        let count = self.page.search_results().len();
        if count == 0 {
            return;
        }
        let next = self.result_cursor as isize + delta;
        self.result_cursor = next.clamp(0, count as isize - 1) as usize;
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        if let Some(node_id) = self
            .graph_pane
            .hit_test(self.graph_area, &self.graph, column, row)
        {
            let result = self.page.resolve_node(&node_id);
            self.select_result(result);
            return;
        }

        // A click on a results row both moves the cursor and selects.
        let inner = inner_rect(self.results_area);
        if inner.width > 0
            && column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height
        {
            let index = (row - inner.y) as usize + self.results_scroll;
            if index < self.page.search_results().len() {
                self.focus = Focus::Results;
                self.result_cursor = index;
                self.select_cursor_result();
            }
        }
    }
}

/// Run the interactive search page until the user quits.
///
/// Must be called from inside a tokio runtime; provider calls are spawned
/// onto it while the UI loop itself blocks on terminal events.
pub fn run(client: Arc<ExaClient>) -> Result<()> {
    let runtime = Handle::current();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, runtime);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.drain_messages();
        terminal.draw(|f| ui(f, app))?;

        // Short poll so completed fetches repaint without a keypress.
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.should_quit = true;
                } else {
                    match app.focus {
                        Focus::Input => handle_input_key(app, key.code),
                        Focus::Results => handle_results_key(app, key.code),
                    }
                }
            }
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    app.handle_click(mouse.column, mouse.row);
                }
            }
            _ => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_input_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            app.input.insert(app.cursor_position, c);
            app.cursor_position += c.len_utf8();
        }
        KeyCode::Backspace => {
            if let Some(start) = prev_char_start(&app.input, app.cursor_position) {
                app.input.remove(start);
                app.cursor_position = start;
            }
        }
        KeyCode::Left => {
            if let Some(start) = prev_char_start(&app.input, app.cursor_position) {
                app.cursor_position = start;
            }
        }
        KeyCode::Right => {
            if let Some(c) = app.input[app.cursor_position..].chars().next() {
                app.cursor_position += c.len_utf8();
            }
        }
        KeyCode::Home => app.cursor_position = 0,
        KeyCode::End => app.cursor_position = app.input.len(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Tab | KeyCode::Down => app.focus = Focus::Results,
        KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_results_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => {
            if app.result_cursor == 0 {
                app.focus = Focus::Input;
            } else {
                app.move_cursor(-1);
            }
        }
        KeyCode::Down => app.move_cursor(1),
        KeyCode::PageUp => app.move_cursor(-10),
        KeyCode::PageDown => app.move_cursor(10),
        KeyCode::Enter => app.select_cursor_result(),
        KeyCode::Tab => app.focus = Focus::Input,
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => {
            app.focus = Focus::Input;
        }
        _ => {}
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(5),    // Results / detail / graph
            Constraint::Length(1), // Key hints
        ])
        .split(f.area());

    render_search_bar(f, chunks[0], app);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
        .split(chunks[1]);

    app.results_area = main[0];
    render_results(f, main[0], app);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main[1]);

    render_detail(f, right[0], app);

    app.graph_area = right[1];
    app.graph_pane.draw(f, right[1], &app.graph, &app.palette);

    render_hints(f, chunks[2]);
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.focus == Focus::Input {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Search "),
    );
    f.render_widget(input, area);

    if app.focus == Focus::Input {
        f.set_cursor_position((area.x + 1 + app.cursor_column(), area.y + 1));
    }
}

fn render_results(f: &mut Frame, area: Rect, app: &mut App) {
    let border_style = if app.focus == Focus::Results {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Results ");

    let results = app.page.search_results();

    if app.page.is_searching() {
        f.render_widget(
            Paragraph::new("Searching...").block(block),
            area,
        );
        return;
    }
    if let Some(error) = app.page.search_error() {
        f.render_widget(
            Paragraph::new(error.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }
    if results.is_empty() {
        let message = if app.page.query().is_empty() {
            "Type a query and press Enter"
        } else {
            "No results found"
        };
        f.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    // Keep the cursor row visible.
    let visible = area.height.saturating_sub(2) as usize;
    if visible > 0 {
        if app.result_cursor < app.results_scroll {
            app.results_scroll = app.result_cursor;
        } else if app.result_cursor >= app.results_scroll + visible {
            app.results_scroll = app.result_cursor + 1 - visible;
        }
    }

    let selected_id = app.page.selected().map(|r| r.id.clone());
    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .skip(app.results_scroll)
        .take(visible.max(1))
        .map(|(index, result)| {
            let mut style = Style::default();
            if selected_id.as_deref() == Some(result.id.as_str()) {
                style = style.fg(Color::Cyan);
            }
            if index == app.result_cursor && app.focus == Focus::Results {
                style = style.add_modifier(Modifier::REVERSED);
            }
            ListItem::new(Line::from(Span::styled(result.title.clone(), style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Content ");

    let Some(selected) = app.page.selected() else {
        f.render_widget(
            Paragraph::new("Select a result to view content")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            selected.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            selected.url.clone(),
            Style::default().fg(Color::Blue),
        )),
    ];

    let mut meta: Vec<String> = Vec::new();
    if let Some(date) = &selected.published_date {
        meta.push(format_published_date(date));
    }
    if let Some(author) = &selected.author {
        meta.push(author.clone());
    }
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            meta.join(" · "),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    if let Some(text) = &selected.text {
        lines.push(Line::from(text.clone()));
        lines.push(Line::from(""));
    }

    if app.page.is_loading_similar() {
        lines.push(Line::from(Span::styled(
            "Finding related content...",
            Style::default().fg(Color::DarkGray),
        )));
    } else if let Some(error) = app.page.similar_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_hints(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" switch focus | "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" search/select | "),
        Span::styled("↑↓", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" navigate | "),
        Span::styled("click", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" a node to explore | "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]);
    f.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Byte offset of the char preceding `at`, or `None` at the start.
fn prev_char_start(input: &str, at: usize) -> Option<usize> {
    input[..at].char_indices().next_back().map(|(start, _)| start)
}

/// Inner area of a bordered block.
fn inner_rect(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Render an RFC 3339 published date as e.g. "Apr 15, 2024". Unparseable
/// dates pass through as-is.
fn format_published_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%b %e, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
