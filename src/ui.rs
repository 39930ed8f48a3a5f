use color_eyre::eyre::Result;
use crossterm::event::{
    self,
    Event,
    KeyCode,
    KeyEvent,
    KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode,
    enable_raw_mode,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use slot_reels::{
    Icon,
    MatchKind,
    ReelId,
    Renderer,
    TransitionEnd,
    TransitionSignal,
};
use std::{
    collections::BTreeMap,
    io::stdout,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    time::Instant,
};
use unicode_width::{
    UnicodeWidthChar,
    UnicodeWidthStr,
};

pub enum UserEvent {
    Quit,
    Spin,
    Redraw,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<Event>;

#[derive(Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    QuitModal,
}

/// What the status panes show; rebuilt by the controller before each draw.
#[derive(Clone, Debug, Default)]
pub struct AppSnapshot {
    pub spin_number: u64,
    pub last_outcome: Option<(String, MatchKind)>,
    pub reels_in_motion: usize,
    pub forced_on_spin: Option<u64>,
    pub status: String,
}

struct Transition {
    from: f64,
    to: f64,
    started: Instant,
    duration: Duration,
    signal: TransitionSignal,
}

/// One reel pane: its cells and where the strip currently sits.
#[derive(Default)]
pub struct ReelScene {
    cells: Vec<Icon>,
    offset: f64,
    transition: Option<Transition>,
}

impl ReelScene {
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Cells around the one in the visible slot, top to bottom.
    fn window(&self) -> [Option<&Icon>; 3] {
        let center = self.offset.round() as isize;
        [center - 1, center, center + 1].map(|idx| {
            usize::try_from(idx).ok().and_then(|i| self.cells.get(i))
        })
    }

    fn advance(&mut self, now: Instant) {
        let Some(tr) = &self.transition else {
            return;
        };
        let elapsed = now.saturating_duration_since(tr.started);
        let t = if tr.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / tr.duration.as_secs_f64()).min(1.0)
        };
        self.offset = tr.from + (tr.to - tr.from) * ease_out(t);
        if t >= 1.0 {
            self.offset = tr.to;
            if let Some(tr) = self.transition.take() {
                tr.signal.fire();
            }
        }
    }
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Renders reels as terminal panes. Transitions progress on [`Self::tick`].
pub struct TerminalRenderer {
    scenes: BTreeMap<ReelId, ReelScene>,
}

impl TerminalRenderer {
    pub fn new<'a>(reel_ids: impl IntoIterator<Item = &'a ReelId>) -> Self {
        Self {
            scenes: reel_ids
                .into_iter()
                .map(|id| (id.clone(), ReelScene::default()))
                .collect(),
        }
    }

    pub fn scene(&self, reel: &ReelId) -> Option<&ReelScene> {
        self.scenes.get(reel)
    }

    /// Advance running transitions to `now`, firing the ones that finished.
    pub fn tick(&mut self, now: Instant) {
        for scene in self.scenes.values_mut() {
            scene.advance(now);
        }
    }

    fn scene_mut(&mut self, reel: &ReelId) -> Option<&mut ReelScene> {
        let scene = self.scenes.get_mut(reel);
        if scene.is_none() {
            tracing::warn!(%reel, "render call for a reel without a pane");
        }
        scene
    }
}

impl Renderer for TerminalRenderer {
    fn has_reel(&self, reel: &ReelId) -> bool {
        self.scenes.contains_key(reel)
    }

    fn show_cells(&mut self, reel: &ReelId, cells: &[Icon]) {
        if let Some(scene) = self.scene_mut(reel) {
            scene.cells = cells.to_vec();
        }
    }

    fn position(&mut self, reel: &ReelId, offset: usize) {
        if let Some(scene) = self.scene_mut(reel) {
            // a transition cut short by a jump never reports its end
            scene.transition = None;
            scene.offset = offset as f64;
        }
    }

    fn animate_to(
        &mut self,
        reel: &ReelId,
        offset: usize,
        duration: Duration,
    ) -> TransitionEnd {
        let (signal, end) = TransitionEnd::channel();
        if let Some(scene) = self.scene_mut(reel) {
            scene.transition = Some(Transition {
                from: scene.offset,
                to: offset as f64,
                started: Instant::now(),
                duration,
                signal,
            });
        }
        end
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Read terminal events on a dedicated thread so the async loop keeps
/// animating while waiting for keys.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "reading terminal event failed");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "polling terminal events failed");
                    break;
                }
            }
        }
    });
    rx
}

pub fn draw(
    state: &mut UiState,
    renderer: &TerminalRenderer,
    reel_ids: &[ReelId],
    snap: &AppSnapshot,
) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, renderer, reel_ids, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let k = match event {
        Event::Key(k) => k,
        Event::Resize(..) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if k.kind != KeyEventKind::Press {
        return None;
    }
    if is_ctrl_c(&k) {
        return Some(UserEvent::Quit);
    }
    if state.mode == Mode::QuitModal {
        return match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        };
    }
    match k.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserEvent::Spin),
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        _ => None,
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL)
}

fn ui(
    f: &mut Frame,
    state: &UiState,
    renderer: &TerminalRenderer,
    reel_ids: &[ReelId],
    snap: &AppSnapshot,
) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // status
            Constraint::Length(7), // reels
            Constraint::Length(3), // help
            Constraint::Min(0),
        ])
        .split(f.area());

    draw_top(f, chunks[0], snap);
    draw_reels(f, chunks[1], renderer, reel_ids);
    draw_help(f, chunks[2]);
    if state.mode == Mode::QuitModal {
        draw_quit_modal(f);
    }
}

fn draw_top(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let result = match &snap.last_outcome {
        None => String::from("-"),
        Some((_, _)) if snap.reels_in_motion > 0 => String::from("spinning..."),
        Some((icons, kind)) => format!("{} ({})", icons, match_label(*kind)),
    };
    let forced = snap
        .forced_on_spin
        .map_or_else(|| String::from("off"), |n| format!("spin {n}"));
    let status = Paragraph::new(format!(
        "Spin: {} | Result: {} | Forced: {}\n{}",
        snap.spin_number, result, forced, snap.status
    ))
    .block(Block::default().borders(Borders::ALL).title("Slot Machine"));
    f.render_widget(status, area);
}

fn draw_reels(f: &mut Frame, area: Rect, renderer: &TerminalRenderer, reel_ids: &[ReelId]) {
    let cols = reel_ids.len().max(1) as u16;
    let col_w = area.width / cols;
    for (i, id) in reel_ids.iter().enumerate() {
        let rect = Rect::new(area.x + i as u16 * col_w, area.y, col_w, area.height);
        let block = Block::default().borders(Borders::ALL).title(id.to_string());
        let inner = block.inner(rect);
        f.render_widget(&block, rect);
        let Some(scene) = renderer.scene(id) else {
            continue;
        };
        let moving = scene.is_animating();
        let lines: Vec<Line> = scene
            .window()
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let text = cell.map_or(String::new(), |icon| {
                    fit_label(icon.label(), inner.width as usize)
                });
                let style = match (row, moving) {
                    (1, false) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    (1, true) => Style::default(),
                    _ => Style::default().fg(Color::DarkGray),
                };
                Line::styled(text, style)
            })
            .collect();
        let pad = inner.height.saturating_sub(lines.len() as u16) / 2;
        let body = Rect::new(
            inner.x,
            inner.y + pad,
            inner.width,
            inner.height.saturating_sub(pad),
        );
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new("space/enter spin | q/Esc quit")
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_quit_modal(f: &mut Frame) {
    let area = centered_rect(40, 20, f.area());
    let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
    let p = Paragraph::new("Quit? (Y/N)");
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(p, block.inner(area));
}

fn match_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Triple => "three of a kind",
        MatchKind::Pair => "pair",
        MatchKind::Mixed => "no match",
    }
}

/// Truncate to `width` terminal columns, marking the cut with `~`.
fn fit_label(label: &str, width: usize) -> String {
    if label.width() <= width {
        return label.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('~');
    }
    out
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let vertical = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    vertical[1]
}
