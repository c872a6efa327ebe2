use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::widgets::{ListState, ScrollbarState};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::rename_engine::{CancelFlag, ConfigBuilder, PlanStatus, RenameConfig, RenamePlan, Session};
use crate::sanitize::DEFAULT_MAX_AUTHORS;

use super::TuiOptions;
use super::models::{ConfigInputMode, ConfigOption, FileItem, Phase, ProcessingStats, WorkerEvent};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct App {
    pub files: Vec<FileItem>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
    pub current_processing: Option<usize>,
    pub processing_progress: f64,
    pub show_help: bool,
    pub show_preview: bool,
    pub show_config: bool,
    pub config_input_mode: ConfigInputMode,
    pub focused_option: ConfigOption,
    pub directory_input: String,
    pub include_hidden: bool,
    pub guess_from_filename: bool,
    pub max_authors: usize,
    pub phase: Phase,
    pub stats: ProcessingStats,
    pub session: Option<Session>,
    pub cancel: CancelFlag,
    pub worker_rx: Option<UnboundedReceiver<WorkerEvent>>,
    pub start_time: Option<Instant>,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    /// Text being typed for the selected row's new name, while editing.
    pub edit_buffer: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            files: Vec::new(),
            list_state,
            scroll_state: ScrollbarState::default(),
            current_processing: None,
            processing_progress: 0.0,
            show_help: false,
            show_preview: true,
            show_config: true,
            config_input_mode: ConfigInputMode::Directory,
            focused_option: ConfigOption::IncludeHidden,
            directory_input: String::new(),
            include_hidden: false,
            guess_from_filename: false,
            max_authors: DEFAULT_MAX_AUTHORS,
            phase: Phase::Configuring,
            stats: ProcessingStats::default(),
            session: None,
            cancel: CancelFlag::new(),
            worker_rx: None,
            start_time: None,
            status_message: None,
            status_message_time: None,
            edit_buffer: None,
        }
    }

    pub fn with_options(options: TuiOptions) -> Self {
        let mut app = Self::new();
        app.include_hidden = options.include_hidden;
        app.guess_from_filename = options.guess_from_filename;
        app.max_authors = options.max_authors.max(1);
        if let Some(dir) = options.directory {
            app.directory_input = dir.to_string_lossy().into_owned();
            app.config_input_mode = ConfigInputMode::Confirm;
        }
        app
    }

    pub fn build_config(&self) -> anyhow::Result<RenameConfig> {
        ConfigBuilder::new()
            .directory(self.directory_input.trim())
            .include_hidden(self.include_hidden)
            .guess_from_filename(self.guess_from_filename)
            .max_authors(self.max_authors)
            .build()
    }

    /// Replaces the rows with a fresh plan and resets progress.
    pub fn load_plan(&mut self, plan: &RenamePlan) {
        self.files = plan.entries.iter().map(FileItem::from_entry).collect();
        self.edit_buffer = None;
        self.stats = ProcessingStats { total: self.files.len(), ..Default::default() };
        self.processing_progress = 0.0;
        self.current_processing = None;
        self.list_state.select(if self.files.is_empty() { None } else { Some(0) });
        self.scroll_state = ScrollbarState::new(self.files.len());
    }

    pub fn selected(&self) -> Option<&FileItem> {
        self.list_state.selected().and_then(|i| self.files.get(i))
    }

    pub fn rename_count(&self) -> usize {
        self.files.iter().filter(|f| f.will_rename()).count()
    }

    pub fn next(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.files.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn previous(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }

    /// Space on a row: flips whether a ready rename will be applied.
    pub fn toggle_selected(&mut self) {
        if self.phase != Phase::Reviewing {
            return;
        }
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let toggled = self
            .session
            .as_mut()
            .and_then(Session::plan_mut)
            .and_then(|plan| plan.toggle_approval(index));

        match toggled {
            Some(approved) => {
                if let Some(item) = self.files.get_mut(index) {
                    item.approved = approved;
                }
            }
            None => self.set_status_message("Only files with a proposed rename can be selected".to_string()),
        }
    }

    /// `e` on a row: starts typing a new name, prefilled with the current
    /// proposal or the file's own name.
    pub fn start_edit(&mut self) {
        if self.phase != Phase::Reviewing {
            return;
        }
        let Some(file) = self.selected() else {
            return;
        };
        if file.plan_status == PlanStatus::Hidden {
            self.set_status_message("Hidden files are skipped; enable them to edit".to_string());
            return;
        }
        self.edit_buffer = Some(file.proposed_name.clone().unwrap_or_else(|| file.original_name.clone()));
    }

    pub fn handle_edit_input(&mut self, c: char) {
        if let Some(buffer) = self.edit_buffer.as_mut() {
            match c {
                '\x08' => {
                    buffer.pop();
                }
                _ => buffer.push(c),
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer = None;
    }

    /// Applies the typed name to the plan. A rejected name keeps the editor
    /// open with the reason in the status bar.
    pub fn commit_edit(&mut self) {
        let (Some(index), Some(text)) = (self.list_state.selected(), self.edit_buffer.clone()) else {
            self.edit_buffer = None;
            return;
        };
        let Some(plan) = self.session.as_mut().and_then(Session::plan_mut) else {
            self.edit_buffer = None;
            return;
        };

        match plan.set_proposed_name(index, &text) {
            Ok(name) => {
                let item = FileItem::from_entry(&plan.entries[index]);
                if let Some(slot) = self.files.get_mut(index) {
                    *slot = item;
                }
                self.edit_buffer = None;
                self.set_status_message(format!("Will rename to {}", name));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_MESSAGE_TTL {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    pub fn handle_config_input(&mut self, c: char) {
        match self.config_input_mode {
            ConfigInputMode::Directory => match c {
                '\x08' => {
                    self.directory_input.pop();
                }
                _ => self.directory_input.push(c),
            },
            ConfigInputMode::Options => match c {
                ' ' => self.toggle_focused_option(true),
                '+' | '=' if self.focused_option == ConfigOption::MaxAuthors => self.max_authors += 1,
                '-' if self.focused_option == ConfigOption::MaxAuthors => {
                    self.max_authors = self.max_authors.saturating_sub(1).max(1)
                }
                _ => {}
            },
            ConfigInputMode::Confirm => {}
        }
    }

    fn toggle_focused_option(&mut self, increase: bool) {
        match self.focused_option {
            ConfigOption::IncludeHidden => self.include_hidden = !self.include_hidden,
            ConfigOption::GuessFromFilename => self.guess_from_filename = !self.guess_from_filename,
            ConfigOption::MaxAuthors if increase => self.max_authors += 1,
            ConfigOption::MaxAuthors => self.max_authors = self.max_authors.saturating_sub(1).max(1),
        }
    }

    pub fn advance_config_step(&mut self) {
        self.config_input_mode = match self.config_input_mode {
            ConfigInputMode::Directory => {
                if self.directory_input.trim().is_empty() {
                    self.set_status_message("Enter a folder to scan".to_string());
                    ConfigInputMode::Directory
                } else {
                    ConfigInputMode::Options
                }
            }
            ConfigInputMode::Options | ConfigInputMode::Confirm => ConfigInputMode::Confirm,
        };
    }

    pub fn go_back_config_step(&mut self) {
        self.config_input_mode = match self.config_input_mode {
            ConfigInputMode::Directory | ConfigInputMode::Options => ConfigInputMode::Directory,
            ConfigInputMode::Confirm => ConfigInputMode::Options,
        };
    }

    pub fn handle_config_navigation(&mut self, key: KeyCode) {
        match (self.config_input_mode, key) {
            (ConfigInputMode::Options, KeyCode::Down) => self.focused_option = self.focused_option.next(),
            (ConfigInputMode::Options, KeyCode::Up) => self.focused_option = self.focused_option.previous(),
            (ConfigInputMode::Options, KeyCode::Right) => self.toggle_focused_option(true),
            (ConfigInputMode::Options, KeyCode::Left) => self.toggle_focused_option(false),
            (ConfigInputMode::Confirm, KeyCode::Left | KeyCode::Backspace) => self.go_back_config_step(),
            (ConfigInputMode::Options, KeyCode::Backspace) => self.go_back_config_step(),
            (ConfigInputMode::Directory, KeyCode::Down | KeyCode::Tab) => self.advance_config_step(),
            (ConfigInputMode::Options, KeyCode::Tab) => self.advance_config_step(),
            _ => {}
        }
    }

    /// Back to the folder prompt, dropping the current session.
    pub fn reopen_config(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.session = None;
        self.files.clear();
        self.edit_buffer = None;
        self.phase = Phase::Configuring;
        self.show_config = true;
        self.config_input_mode = ConfigInputMode::Directory;
    }
}
