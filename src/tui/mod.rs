//! Headless terminal wizard host.
//!
//! Owns the in-memory element store, builds the element tree from the wizard
//! configuration, renders each frame from the shared element state and maps
//! key events onto the core components.
//!
//! Note: Logging is file-only while the wizard runs (stdout logging is
//! disabled) to avoid corrupting the terminal UI.

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{debug, info};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;

use crate::config::{FieldDef, WizardConfig};
use crate::host::{
    build_dom, ops_scope, CatalogTranslator, ElementAccessor, MemoryDom, Translator,
};
use crate::wizard::{filter, ids, OpsToggle, PasswordValidator, StepController};

#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.len(),
            value: v,
        }
    }

    fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.value.insert(self.cursor, c);
                self.cursor = (self.cursor + 1).min(self.value.len());
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 && !self.value.is_empty() {
                    let idx = self.cursor - 1;
                    self.value.remove(idx);
                    self.cursor = idx;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() && !self.value.is_empty() {
                    self.value.remove(self.cursor);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.len());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel { confirm: bool },
    Message { title: String, body: String },
}

pub struct WizardApp {
    config: WizardConfig,
    dom: MemoryDom,
    translator: CatalogTranslator,
    controller: StepController,
    validator: PasswordValidator,
    ops: Option<OpsToggle>,
    inputs: HashMap<String, TextInput>,
    focus: FocusTarget,
    modal: Option<Modal>,
    finished: bool,
    quit: bool,
}

impl WizardApp {
    pub fn new(config: WizardConfig, translator: CatalogTranslator) -> Result<Self> {
        let mut dom = build_dom(&config);
        let mut controller = StepController::new(&config)?;
        controller.begin(&mut dom)?;

        let validator = PasswordValidator::new(
            config.password_pairs.clone(),
            config.per_step_error_scope,
        );

        // Advanced rows render visible; collapse them once at startup.
        let mut ops = ops_scope(&config).map(OpsToggle::new);
        if let Some(toggle) = ops.as_mut() {
            toggle.toggle(&mut dom, &translator)?;
        }

        let mut inputs = HashMap::new();
        for step in &config.steps {
            for field in &step.fields {
                inputs.insert(field.id.clone(), TextInput::new(""));
            }
        }

        let mut app = Self {
            config,
            dom,
            translator,
            controller,
            validator,
            ops,
            inputs,
            focus: FocusTarget::Button(ButtonFocus::Next),
            modal: None,
            finished: false,
            quit: false,
        };
        app.focus = app.default_focus();
        Ok(app)
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    fn current_step_fields(&self) -> &[FieldDef] {
        let index = self.controller.current_step() - 1;
        self.config
            .steps
            .get(index)
            .map(|s| s.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Fields of the current step whose row is visible, in form order.
    /// Collapsed advanced rows drop out of the focus ring.
    fn visible_field_ids(&self) -> Vec<String> {
        self.current_step_fields()
            .iter()
            .filter(|f| self.dom.is_visible(&f.id).unwrap_or(false))
            .map(|f| f.id.clone())
            .collect()
    }

    fn default_focus(&self) -> FocusTarget {
        if self.visible_field_ids().is_empty() {
            FocusTarget::Button(ButtonFocus::Next)
        } else {
            FocusTarget::Field(0)
        }
    }

    fn on_ops_panel(&self) -> bool {
        ops_scope(&self.config).as_deref()
            == Some(ids::panel_id(self.controller.current_step()).as_str())
    }

    /// Propagation can rewrite field values behind the inputs' back; pull the
    /// element state back into the edit buffers after every transition.
    fn sync_inputs_from_dom(&mut self) -> Result<()> {
        for (id, input) in self.inputs.iter_mut() {
            input.set(self.dom.get(id)?);
        }
        Ok(())
    }

    fn is_masked(&self, id: &str) -> bool {
        self.config
            .steps
            .iter()
            .flat_map(|s| s.fields.iter())
            .any(|f| f.id == id && f.masked)
    }

    fn commit_field(&mut self, id: &str) -> Result<()> {
        if id == "Username" {
            // The account form normalizes the username row on commit.
            let fixed = filter::fix_username(&self.dom.get(id)?)?;
            self.dom.set(id, &fixed)?;
        }
        let value = self.dom.get(id)?;
        let logged = if self.is_masked(id) {
            crate::utils::logging::mask_sensitive(&value)
        } else {
            value
        };
        debug!(
            "[STEP: {}] committed '{}' = '{}'",
            self.controller.current_step(),
            id,
            logged
        );
        self.controller.on_field_blur(id, &mut self.dom)?;
        self.sync_inputs_from_dom()?;
        Ok(())
    }

    fn advance_focus(&mut self, forward: bool) -> Result<()> {
        if let FocusTarget::Field(i) = self.focus {
            if let Some(id) = self.visible_field_ids().get(i).cloned() {
                self.commit_field(&id)?;
            }
        }

        let fields = self.visible_field_ids().len();
        let ring_len = fields + 3;
        let pos = match self.focus {
            FocusTarget::Field(i) => i.min(fields.saturating_sub(1)),
            FocusTarget::Button(ButtonFocus::Back) => fields,
            FocusTarget::Button(ButtonFocus::Next) => fields + 1,
            FocusTarget::Button(ButtonFocus::Cancel) => fields + 2,
        };
        let next = if forward {
            (pos + 1) % ring_len
        } else {
            (pos + ring_len - 1) % ring_len
        };
        self.focus = if next < fields {
            FocusTarget::Field(next)
        } else {
            match next - fields {
                0 => FocusTarget::Button(ButtonFocus::Back),
                1 => FocusTarget::Button(ButtonFocus::Next),
                _ => FocusTarget::Button(ButtonFocus::Cancel),
            }
        };
        Ok(())
    }

    fn go_prev(&mut self) -> Result<()> {
        self.controller.prev(&mut self.dom)?;
        self.sync_inputs_from_dom()?;
        self.focus = self.default_focus();
        Ok(())
    }

    fn go_next_or_save(&mut self) -> Result<()> {
        if !self.controller.state().is_last() {
            self.controller.next(&mut self.dom)?;
            self.sync_inputs_from_dom()?;
            self.focus = self.default_focus();
            return Ok(());
        }

        let step = self.controller.current_step();
        let submit_id = ids::submit_id_for(self.config.per_step_error_scope, step);
        if self.dom.contains(&submit_id) && !self.dom.is_disabled(&submit_id)? {
            self.controller.finish(&mut self.dom)?;
            self.finished = true;
            self.modal = Some(Modal::Message {
                title: "Setup".to_string(),
                body: self.translator.tr("Setup OK!"),
            });
            info!("enrollment data accepted");
        } else {
            debug!("save ignored, submit control is disabled");
        }
        Ok(())
    }

    fn activate(&mut self) -> Result<()> {
        match self.focus {
            FocusTarget::Field(_) => self.advance_focus(true),
            FocusTarget::Button(ButtonFocus::Back) => self.go_prev(),
            FocusTarget::Button(ButtonFocus::Next) => self.go_next_or_save(),
            FocusTarget::Button(ButtonFocus::Cancel) => {
                self.modal = Some(Modal::ConfirmCancel { confirm: false });
                Ok(())
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        // Modal handling
        if let Some(modal) = self.modal.clone() {
            match modal {
                Modal::ConfirmCancel { confirm } => match code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                        self.modal = Some(Modal::ConfirmCancel { confirm: !confirm });
                    }
                    KeyCode::Enter => {
                        self.modal = None;
                        if confirm {
                            self.quit = true;
                        }
                    }
                    KeyCode::Esc => {
                        self.modal = None;
                    }
                    _ => {}
                },
                Modal::Message { .. } => {
                    if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                        self.modal = None;
                        if self.finished {
                            self.quit = true;
                        }
                    }
                }
            }
            return Ok(());
        }

        if matches!(code, KeyCode::Esc) {
            self.modal = Some(Modal::ConfirmCancel { confirm: false });
            return Ok(());
        }

        // Text input handling (when a field is focused)
        if let FocusTarget::Field(i) = self.focus {
            if let Some(id) = self.visible_field_ids().get(i).cloned() {
                if let Some(input) = self.inputs.get_mut(&id) {
                    if input.handle_key(code) {
                        let value = input.value.clone();
                        self.dom.set(&id, &value)?;
                        if self.validator.watches(&id) {
                            let step = self.controller.current_step();
                            self.validator.on_password_input(
                                &id,
                                step,
                                &mut self.dom,
                                &self.translator,
                            )?;
                        }
                        return Ok(());
                    }
                }
            }
        }

        match code {
            KeyCode::Tab | KeyCode::Down => self.advance_focus(true)?,
            KeyCode::BackTab | KeyCode::Up => self.advance_focus(false)?,
            KeyCode::Enter => self.activate()?,
            // Only reachable with a button focused; a focused field consumes
            // the character above.
            KeyCode::Char('o') | KeyCode::Char('O') if self.on_ops_panel() => {
                if let Some(toggle) = self.ops.as_mut() {
                    toggle.toggle(&mut self.dom, &self.translator)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

pub fn run(config: WizardConfig, translator: CatalogTranslator) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, config, translator);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: WizardConfig,
    translator: CatalogTranslator,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut app = WizardApp::new(config, translator)?;

    while !app.quit {
        terminal.draw(|f| draw(f.size(), f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key.code)?,
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Render a single frame for the given step onto a test backend and print it.
/// Deterministic page rendering for CI/tooling; sample values are seeded so
/// the propagation behavior is visible on the later steps.
pub fn smoke(
    config: WizardConfig,
    translator: CatalogTranslator,
    step: Option<usize>,
) -> Result<()> {
    let mut app = WizardApp::new(config, translator)?;
    seed_smoke_values(&mut app);

    let target = step
        .unwrap_or(1)
        .clamp(1, app.controller.state().step_count());
    while app.controller.current_step() < target {
        app.controller.next(&mut app.dom)?;
    }
    app.sync_inputs_from_dom()?;
    app.focus = app.default_focus();

    for line in render_frame_lines(&app, 100, 30)? {
        println!("{}", line);
    }
    Ok(())
}

fn seed_smoke_values(app: &mut WizardApp) {
    let samples = [
        ("Username", "operator"),
        ("Fullname", "Demo Operator"),
        ("Email", "operator@example.org"),
        ("CA.CommonName", "Example Root CA"),
        ("CA.Locality", "Springfield"),
        ("CA.Country", "US"),
        ("Cert.CommonName", "portal.example.org"),
    ];
    for (id, value) in samples {
        if app.dom.contains(id) {
            let _ = app.dom.set(id, value);
        }
    }
    let _ = app.sync_inputs_from_dom();
}

fn render_frame_lines(app: &WizardApp, width: u16, height: u16) -> Result<Vec<String>> {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, app))?;

    let buffer = terminal.backend().buffer();
    let mut lines = Vec::new();
    for y in 0..buffer.area.height {
        let mut line = String::new();
        for x in 0..buffer.area.width {
            line.push_str(buffer.get(x, y).symbol());
        }
        lines.push(line.trim_end().to_string());
    }
    Ok(lines)
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, app: &WizardApp) {
    let window = centered_window(area, 100, 30);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Enrollment Setup");
    f.render_widget(outer_block, window);

    let inner = window.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    draw_step_header(f, rows[0], app);
    draw_body(f, rows[1], app);
    draw_notice(f, rows[2], app);
    draw_buttons(f, rows[3], app);

    if let Some(modal) = app.modal.as_ref() {
        draw_modal(f, window, modal);
    }
}

fn draw_step_header(f: &mut ratatui::Frame<'_>, area: Rect, app: &WizardApp) {
    let mut spans = Vec::new();
    for (index, step) in app.config.steps.iter().enumerate() {
        let step_no = index + 1;
        let activated = app
            .dom
            .class_of(&ids::marker_id(step_no))
            .map(|c| c == ids::ACTIVATED_CLASS)
            .unwrap_or(false);
        let style = if activated {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if index > 0 {
            spans.push(Span::raw("  >  "));
        }
        spans.push(Span::styled(format!("{} {}", step_no, step.title), style));
    }

    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn draw_body(f: &mut ratatui::Frame<'_>, area: Rect, app: &WizardApp) {
    let step_no = app.controller.current_step();
    let title = app
        .config
        .steps
        .get(step_no - 1)
        .map(|s| s.title.as_str())
        .unwrap_or("");

    let mut lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let mut visible_index = 0usize;
    for field in app.current_step_fields() {
        if !app.dom.is_visible(&field.id).unwrap_or(false) {
            continue;
        }
        let focused = app.focus == FocusTarget::Field(visible_index);
        let prefix = if focused { ">" } else { " " };
        let value = app.dom.get(&field.id).unwrap_or_default();
        let display = if field.masked {
            "*".repeat(value.chars().count())
        } else {
            value
        };
        lines.push(Line::from(format!(
            "{} {:<22} {}",
            prefix,
            format!("{}:", field.label),
            display
        )));
        visible_index += 1;
    }

    if app.on_ops_panel() && app.dom.contains(ids::TOGGLER_ID) {
        let label = app.dom.get(ids::TOGGLER_ID).unwrap_or_default();
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "  {}  (O toggles the advanced options)",
            label
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(
        "Tab/Shift-Tab move focus. Enter activates a button. Esc exits.",
    ));

    let p = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_notice(f: &mut ratatui::Frame<'_>, area: Rect, app: &WizardApp) {
    let step_no = app.controller.current_step();
    let per_step = app.config.per_step_error_scope;
    let notice_id = ids::notice_id_for(per_step, step_no);
    if !app.dom.contains(&notice_id) || !app.dom.is_visible(&notice_id).unwrap_or(false) {
        return;
    }

    let text = app
        .dom
        .get(&ids::notice_text_id_for(per_step, step_no))
        .unwrap_or_default();
    let p = Paragraph::new(Text::from(Line::from(Span::styled(
        text,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))));
    f.render_widget(p, area);
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, app: &WizardApp) {
    let back_enabled = app.dom.is_visible(ids::PREV_ID).unwrap_or(false);

    let on_last = app.controller.state().is_last();
    let (next_label, next_enabled) = if on_last {
        let submit_id = ids::submit_id_for(
            app.config.per_step_error_scope,
            app.controller.current_step(),
        );
        let enabled = app.dom.contains(&submit_id) && !app.dom.is_disabled(&submit_id).unwrap_or(true);
        ("Save", enabled)
    } else {
        ("Next", app.dom.is_visible(ids::NEXT_ID).unwrap_or(true))
    };

    let back = button_text(
        "Back",
        app.focus == FocusTarget::Button(ButtonFocus::Back),
        back_enabled,
    );
    let next = button_text(
        next_label,
        app.focus == FocusTarget::Button(ButtonFocus::Next),
        next_enabled,
    );
    let cancel = button_text(
        "Cancel",
        app.focus == FocusTarget::Button(ButtonFocus::Cancel),
        true,
    );

    let line = Line::from(vec![
        back,
        Span::raw(" "),
        next,
        Span::raw(" "),
        cancel,
    ]);

    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_modal(f: &mut ratatui::Frame<'_>, window: Rect, modal: &Modal) {
    let boxed = centered_window(window, 46, 7);
    f.render_widget(Clear, boxed);

    let (title, lines) = match modal {
        Modal::ConfirmCancel { confirm } => {
            let yes = if *confirm { "[ Yes ]" } else { "  Yes  " };
            let no = if *confirm { "  No  " } else { "[ No ]" };
            (
                "Exit Setup?".to_string(),
                vec![
                    Line::from("Abandon the enrollment setup?"),
                    Line::from(""),
                    Line::from(format!("     {}     {}", yes, no)),
                ],
            )
        }
        Modal::Message { title, body } => (
            title.clone(),
            vec![
                Line::from(body.clone()),
                Line::from(""),
                Line::from("        [ OK ]"),
            ],
        ),
    };

    let block = Block::default().borders(Borders::ALL).title(title);
    let p = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(p, boxed);
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::PasswordState;

    fn app() -> WizardApp {
        WizardApp::new(WizardConfig::default(), CatalogTranslator::new()).expect("app")
    }

    fn focus_field(app: &mut WizardApp, id: &str) {
        let index = app
            .visible_field_ids()
            .iter()
            .position(|f| f == id)
            .expect("field visible");
        app.focus = FocusTarget::Field(index);
    }

    fn type_str(app: &mut WizardApp, s: &str) {
        for c in s.chars() {
            app.handle_key(KeyCode::Char(c)).expect("key");
        }
    }

    #[test]
    fn starts_on_the_first_field_of_step_one() {
        let app = app();
        assert_eq!(app.controller.current_step(), 1);
        assert_eq!(app.focus, FocusTarget::Field(0));
        assert_eq!(app.visible_field_ids()[0], "Username");
    }

    #[test]
    fn typing_writes_through_to_the_element_state() {
        let mut app = app();
        type_str(&mut app, "Root");
        assert_eq!(app.dom.get("Username").unwrap(), "Root");
    }

    #[test]
    fn committing_the_username_normalizes_it() {
        let mut app = app();
        type_str(&mut app, "Root <Admin>");
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.dom.get("Username").unwrap(), "rootadmin");
    }

    #[test]
    fn password_keystrokes_drive_the_validator() {
        let mut app = app();
        focus_field(&mut app, "Password");
        type_str(&mut app, "abc");

        // Confirmation still empty: pair invalid, submit blocked.
        assert_eq!(app.validator.state_of("Password"), PasswordState::Error);
        assert!(app.dom.is_visible(ids::NOTICE_ID).unwrap());
        assert!(app.dom.is_disabled(ids::SUBMIT_ID).unwrap());

        focus_field(&mut app, "Password2");
        type_str(&mut app, "abc");
        assert_eq!(app.validator.state_of("Password"), PasswordState::Clean);
        assert!(!app.dom.is_visible(ids::NOTICE_ID).unwrap());
        assert!(!app.dom.is_disabled(ids::SUBMIT_ID).unwrap());
    }

    #[test]
    fn email_blur_fills_the_notification_user() {
        let mut app = app();
        focus_field(&mut app, "Email");
        type_str(&mut app, "a@b.com");
        app.handle_key(KeyCode::Tab).unwrap();

        assert_eq!(app.dom.get("M.User").unwrap(), "a@b.com");
        // The edit buffer follows the propagated value.
        assert_eq!(app.inputs.get("M.User").unwrap().value, "a@b.com");
    }

    #[test]
    fn next_button_advances_and_later_propagates_subject_fields() {
        let mut app = app();
        app.dom.set("CA.Locality", "Springfield").unwrap();
        app.dom.set("CA.Country", "US").unwrap();

        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.controller.current_step(), 2);

        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.controller.current_step(), 3);
        assert_eq!(app.dom.get("Cert.Locality").unwrap(), "Springfield");
        assert_eq!(app.dom.get("Cert.Country").unwrap(), "US");
    }

    #[test]
    fn ops_rows_are_collapsed_at_startup_and_o_toggles_them() {
        let mut app = app();
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.controller.current_step(), 3);

        // The startup collapse hid the advanced rows of the toggle's panel.
        assert!(!app.dom.is_visible("Cert.Locality").unwrap());
        assert!(app
            .visible_field_ids()
            .iter()
            .all(|id| id == "Cert.CommonName"));

        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Char('o')).unwrap();
        assert!(app.dom.is_visible("Cert.Locality").unwrap());
        assert!(app.visible_field_ids().contains(&"Cert.Duration".to_string()));

        app.handle_key(KeyCode::Char('o')).unwrap();
        assert!(!app.dom.is_visible("Cert.Locality").unwrap());
    }

    #[test]
    fn escape_opens_the_cancel_modal_and_enter_on_yes_quits() {
        let mut app = app();
        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(
            app.modal,
            Some(Modal::ConfirmCancel { confirm: false })
        ));

        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.is_quit());
    }

    #[test]
    fn save_is_gated_on_the_submit_control() {
        let mut app = app();
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.controller.state().is_last());

        // Passwords never validated: submit disabled, Save is a no-op.
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.modal.is_none());
        assert!(!app.finished);

        // Validate a pair, then Save succeeds and finish marks every step.
        app.dom.set("Password", "secret").unwrap();
        app.dom.set("Password2", "secret").unwrap();
        app.validator
            .on_password_input("Password", 3, &mut app.dom, &app.translator)
            .unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.finished);
        assert_eq!(
            app.dom.class_of("Step1").unwrap(),
            ids::ACTIVATED_CLASS
        );

        // Closing the confirmation ends the session.
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.is_quit());
    }

    #[test]
    fn rendered_frame_shows_the_current_step() {
        let app = app();
        let lines = render_frame_lines(&app, 100, 30).unwrap();
        let joined = lines.join("\n");
        assert!(joined.contains("First User & Mailer Configuration"));
        assert!(joined.contains("Username:"));
        assert!(joined.contains("[ Next ]"));
    }

    #[test]
    fn rendered_frame_masks_password_values() {
        let mut app = app();
        focus_field(&mut app, "Password");
        type_str(&mut app, "hunter2");

        let lines = render_frame_lines(&app, 100, 30).unwrap();
        let joined = lines.join("\n");
        assert!(!joined.contains("hunter2"), "password echoed in clear");
        assert!(joined.contains("*******"));
    }

    #[test]
    fn text_input_edits_at_the_cursor() {
        let mut input = TextInput::new("abc");
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Char('x'));
        assert_eq!(input.value, "abxc");
        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value, "abc");
        input.handle_key(KeyCode::Home);
        input.handle_key(KeyCode::Delete);
        assert_eq!(input.value, "bc");
    }
}
