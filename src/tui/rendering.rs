use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, Wrap,
    },
};

use crate::rename_engine::PlanStatus;

use super::app::App;
use super::centered_rect;
use super::models::{ConfigInputMode, ConfigOption, FileItem, Phase, ProcessingStatus};

const TITLE: &str = "Book Rename";

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    if app.show_config {
        render_config_screen(f, size, app);
    } else {
        render_main_screen(f, size, app);
    }

    if app.show_help {
        render_help_popup(f, app);
    }
}

fn focus_style(focused: bool) -> (Style, Style) {
    if focused {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (Style::default().fg(Color::White), Style::default().fg(Color::Gray))
    }
}

pub fn render_config_screen(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(5)])
        .split(area);

    let header = Paragraph::new(format!("{} - Configuration", TITLE))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, chunks[0]);

    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(chunks[1]);

    let (text_style, border_style) = focus_style(app.config_input_mode == ConfigInputMode::Directory);
    let directory_display = if app.directory_input.is_empty() {
        "[Enter folder path]"
    } else {
        app.directory_input.as_str()
    };
    let directory = Paragraph::new(directory_display).style(text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Folder")
            .border_style(border_style),
    );
    f.render_widget(directory, form[0]);

    let options_focused = app.config_input_mode == ConfigInputMode::Options;
    let option_lines: Vec<Line> = ConfigOption::ALL
        .iter()
        .map(|&option| {
            let (label, value) = match option {
                ConfigOption::IncludeHidden => ("Include hidden files", checkbox(app.include_hidden)),
                ConfigOption::GuessFromFilename => {
                    ("Guess from filename when metadata is missing", checkbox(app.guess_from_filename))
                }
                ConfigOption::MaxAuthors => ("Authors before \"et al.\"", format!("< {} >", app.max_authors)),
            };
            let marker = if options_focused && option == app.focused_option { "> " } else { "  " };
            let style = if options_focused && option == app.focused_option {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{}{:<6} ", marker, value), style),
                Span::styled(label, style),
            ])
        })
        .collect();
    let (_, border_style) = focus_style(options_focused);
    let options = Paragraph::new(option_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Options")
            .border_style(border_style),
    );
    f.render_widget(options, form[1]);

    let (confirm_text, confirm_style) = match (app.phase, app.config_input_mode) {
        (Phase::Planning, _) => (
            format!("Reading files... {:.0}% (c to cancel)", app.processing_progress * 100.0),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        (_, ConfigInputMode::Confirm) => (
            "Press ENTER to scan the folder".to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        _ => ("Not ready".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let confirm = Paragraph::new(confirm_text)
        .style(confirm_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Scan")
                .border_style(confirm_style),
        );
    f.render_widget(confirm, form[2]);

    let instructions = match app.config_input_mode {
        ConfigInputMode::Directory => "Type the folder containing your documents, then press Enter",
        ConfigInputMode::Options => "↑/↓ choose, Space or ←/→ change, Enter continue (Backspace: back)",
        ConfigInputMode::Confirm => "Press Enter to read metadata and preview the renames (← Back)",
    };
    let status_line = match &app.status_message {
        Some(message) => Line::from(Span::styled(message.clone(), Style::default().fg(Color::Cyan))),
        None => Line::from(""),
    };
    let help_text = Paragraph::new(vec![
        Line::from(instructions),
        status_line,
        Line::from("Enter: Next/Confirm | Esc: Quit | F1: Help"),
    ])
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Instructions"));
    f.render_widget(help_text, chunks[2]);
}

fn checkbox(on: bool) -> String {
    if on { "[x]".to_string() } else { "[ ]".to_string() }
}

pub fn render_main_screen(f: &mut Frame, area: Rect, app: &App) {
    let chunks = if app.show_preview {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(area)
    };

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(3)])
        .split(chunks[0]);

    render_header(f, left_chunks[0], app);
    render_file_list(f, left_chunks[1], app);
    render_status_bar(f, left_chunks[2], app);

    if app.show_preview && chunks.len() > 1 {
        render_preview_panel(f, chunks[1], app);
    }
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let folder = app
        .session
        .as_ref()
        .map(|s| s.folder().display().to_string())
        .unwrap_or_default();
    let title = match app.phase {
        Phase::Finished => format!("{} - Completed! ({})", TITLE, folder),
        Phase::Executing => format!("{} - Renaming... ({})", TITLE, folder),
        Phase::Planning => format!("{} - Reading... ({})", TITLE, folder),
        _ => format!("{} - {}", TITLE, folder),
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn row_marker(file: &FileItem) -> (&'static str, Color) {
    match &file.status {
        ProcessingStatus::Processing => return ("[....]", Color::Blue),
        ProcessingStatus::Success => return ("[DONE]", Color::Green),
        ProcessingStatus::Error(_) => return ("[FAIL]", Color::Red),
        ProcessingStatus::Skipped if file.will_rename() => return ("[SKIP]", Color::DarkGray),
        ProcessingStatus::Pending | ProcessingStatus::Skipped => {}
    }
    match (&file.plan_status, file.approved) {
        (PlanStatus::Ready, true) => ("[x]   ", Color::Yellow),
        (PlanStatus::Ready, false) => ("[ ]   ", Color::Gray),
        (PlanStatus::Unchanged, _) => ("[SAME]", Color::Green),
        (PlanStatus::NoMetadata, _) => ("[NONE]", Color::DarkGray),
        (PlanStatus::Hidden, _) => ("[HIDE]", Color::DarkGray),
        (PlanStatus::Error(_), _) => ("[ERR] ", Color::Red),
    }
}

pub fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let (icon, color) = row_marker(file);
            let name_style = if app.current_processing == Some(i) {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let mut spans = vec![
                Span::styled(format!("{} ", icon), Style::default().fg(color)),
                Span::styled(file.original_name.clone(), name_style),
            ];
            if let (PlanStatus::Ready, Some(proposed)) = (&file.plan_status, &file.proposed_name) {
                spans.push(Span::styled(" → ", Style::default().fg(Color::DarkGray)));
                spans.push(Span::styled(proposed.clone(), Style::default().fg(color)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!("Files ({} to rename)", app.rename_count());
    let files_list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::Black).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    f.render_stateful_widget(files_list, area, &mut app.list_state.clone());

    if app.files.len() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let progress_label = if let Some(buffer) = &app.edit_buffer {
        format!("New name: {}_", buffer)
    } else if let Some(status_msg) = &app.status_message {
        status_msg.clone()
    } else {
        match app.phase {
            Phase::Finished => format!(
                "Complete! {} renamed, {} failed, {} skipped",
                app.stats.successful, app.stats.failed, app.stats.skipped
            ),
            Phase::Executing => format!("Renaming... {}/{}", app.stats.processed + 1, app.stats.total),
            Phase::Planning => "Reading metadata...".to_string(),
            _ => format!("{} of {} file(s) selected", app.rename_count(), app.stats.total),
        }
    };

    let progress_style = if app.edit_buffer.is_some() {
        Style::default().fg(Color::Yellow)
    } else if app.status_message.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Green)
    };

    let percent = (app.processing_progress.clamp(0.0, 1.0) * 100.0) as u16;
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(progress_style)
        .percent(if app.phase.is_busy() || app.phase == Phase::Finished { percent } else { 0 })
        .label(progress_label);
    f.render_widget(progress, chunks[0]);

    let controls_text = match app.phase {
        _ if app.edit_buffer.is_some() => "Enter save, Esc cancel",
        Phase::Planning | Phase::Executing => "c cancel, q quit",
        Phase::Finished => "r rescan, o folder, q quit",
        _ => "Space toggle, e edit, Enter rename",
    };
    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

pub fn render_preview_panel(f: &mut Frame, area: Rect, app: &App) {
    let Some(file) = app.selected() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let unknown = || Span::styled("(none)", Style::default().fg(Color::DarkGray));
    let original = Paragraph::new(Text::from(vec![
        Line::from("Original:"),
        Line::from(Span::styled(file.original_name.clone(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::raw("Author: "),
            file.author.clone().map(Span::raw).unwrap_or_else(unknown),
        ]),
        Line::from(vec![
            Span::raw("Title:  "),
            file.title.clone().map(Span::raw).unwrap_or_else(unknown),
        ]),
    ]))
    .block(
        Block::default()
            .title("Before")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(original, chunks[0]);

    let new_style = match file.status {
        ProcessingStatus::Success => Style::default().fg(Color::Green),
        ProcessingStatus::Error(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    };

    let mut new_lines = vec![Line::from("New:")];
    match &file.proposed_name {
        Some(name) => new_lines.push(Line::from(Span::styled(name.clone(), new_style))),
        None => new_lines.push(Line::from(unknown())),
    }
    new_lines.push(Line::from(""));
    new_lines.push(Line::from(format!("Plan: {}", file.plan_status)));
    if file.plan_status == PlanStatus::Ready && !file.approved {
        new_lines.push(Line::from(Span::styled("Deselected", Style::default().fg(Color::Gray))));
    }
    if let ProcessingStatus::Error(error) = &file.status {
        new_lines.push(Line::from(""));
        new_lines.push(Line::from(Span::styled(format!("Error: {}", error), Style::default().fg(Color::Red))));
    }

    let new = Paragraph::new(Text::from(new_lines))
        .block(
            Block::default()
                .title("After")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(new, chunks[1]);
}

pub fn render_help_popup(f: &mut Frame, _app: &App) {
    let popup_area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from(vec![Span::styled(
            format!("{} - Help", TITLE),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  Up/k    - Move up"),
        Line::from("  Down/j  - Move down"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  Space   - Select/deselect a rename"),
        Line::from("  e       - Type a new name for the row"),
        Line::from("  Enter   - Rename the selected files"),
        Line::from("  c       - Cancel after the current file"),
        Line::from("  r       - Re-read the folder"),
        Line::from("  o       - Choose another folder"),
        Line::from("  p       - Toggle preview panel"),
        Line::from("  h/F1    - Toggle this help"),
        Line::from("  q/Esc   - Quit application"),
        Line::from(""),
        Line::from("Names are built as \"Author - Title.ext\" from PDF, DOCX,"),
        Line::from("EPUB and TXT metadata. Existing files are never overwritten."),
        Line::from(""),
        Line::from(vec![Span::styled("Press Esc or h to close", Style::default().fg(Color::Gray))]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DocumentKind, Metadata};
    use crate::rename_engine::{FileEntry, Planner, plan_files};
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::Path;

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_config_screen_renders() {
        let mut app = App::new();
        app.directory_input = "/books".to_string();
        let text = screen_text(&app);
        assert!(text.contains("Configuration"));
        assert!(text.contains("/books"));
    }

    #[test]
    fn test_main_screen_shows_proposed_name() {
        let files = vec![FileEntry::new(
            "/d/scan.pdf",
            DocumentKind::Pdf,
            Some(Metadata::new(Some("Ann Lee"), Some("Notes"))),
        )];
        let plan = plan_files(Path::new("/d"), ["scan.pdf"], files, 3);
        let mut app = App::new();
        app.load_plan(&plan);
        app.show_config = false;
        app.phase = Phase::Reviewing;

        let text = screen_text(&app);
        assert!(text.contains("scan.pdf"));
        assert!(text.contains("Ann Lee - Notes.pdf"));
    }

    #[test]
    fn test_edit_buffer_and_hidden_rows_render() {
        let files = vec![
            FileEntry::new("/d/scan.pdf", DocumentKind::Pdf, None),
            FileEntry::new("/d/.draft.txt", DocumentKind::Txt, None),
        ];
        let mut plan = plan_files(Path::new("/d"), ["scan.pdf", ".draft.txt"], files, 3);
        plan.entries[1] = Planner::hidden(plan.entries[1].file.clone());
        let mut app = App::new();
        app.load_plan(&plan);
        app.show_config = false;
        app.phase = Phase::Reviewing;
        app.edit_buffer = Some("Typed Name".to_string());

        let text = screen_text(&app);
        assert!(text.contains("New name: Typed Name_"));
        assert!(text.contains("[HIDE]"));
    }
}
