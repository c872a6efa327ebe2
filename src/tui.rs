//! Interactive preview: pick a folder, review proposed names, toggle rows and
//! rename.

use std::path::PathBuf;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

mod app;
mod events;
mod models;
mod processing;
mod rendering;

pub use app::App;
pub use events::run_tui;
pub use models::{ConfigInputMode, ConfigOption, FileItem, Phase, ProcessingStatus, WorkerEvent};

/// Startup values for the configuration screen, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct TuiOptions {
    pub directory: Option<PathBuf>,
    pub include_hidden: bool,
    pub guess_from_filename: bool,
    pub max_authors: usize,
}

/// A rectangle of `percent_x` by `percent_y` centered in `r`.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
