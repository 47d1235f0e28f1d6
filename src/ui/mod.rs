mod theme;

use crate::app::{AppModel, Mode, StatusKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

const MIN_TABLE_WIDTH: usize = 75;
const TIMESTAMP_WIDTH: usize = 19;
const VERSION_WIDTH: usize = 8;
const LINES_WIDTH: usize = 6;
// indicator(4) + timestamp(19) + version(8) + lines(6) + column gaps(8)
const FIXED_COLUMNS_WIDTH: usize = 45;

const HELP_LINE: &str = "Up/Down/PgUp/PgDn:Nav | Home/End:Jump | Ctrl+U/D:Half | SPACE:Toggle (A:All) | C:Copy ID | D:Delete | R:Refresh | Q:Quit";

pub fn render(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    if model.sessions.is_empty() {
        render_empty(frame, area, model);
        return;
    }

    let widths = ColumnWidths::for_terminal(area.width as usize);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled(
        "ccsweep - Claude chat manager",
        Style::default().fg(theme::TITLE).bold(),
    ));
    lines.push(Line::styled(
        format!(
            "Total: {} | Selected: {}",
            model.sessions.len(),
            model.selected.len()
        ),
        Style::default().fg(theme::MUTED),
    ));

    lines.push(Line::styled(
        format!(
            "    {:<tsw$}  {:<vw$}  {:<lw$}  {:<tw$}  {:<pw$}",
            "TIMESTAMP",
            "VERSION",
            "LINES",
            "TITLE",
            "PROJECT",
            tsw = TIMESTAMP_WIDTH,
            vw = widths.version,
            lw = widths.lines,
            tw = widths.title,
            pw = widths.project,
        ),
        Style::default().fg(theme::MUTED),
    ));
    lines.push(Line::styled(
        "\u{2500}".repeat(widths.total),
        Style::default().fg(theme::DIM),
    ));

    let rows = model.page_rows();
    let start = model.scroll_offset;
    let end = (start + rows).min(model.sessions.len());

    for index in start..end {
        let session = &model.sessions[index];
        let selected = model.selected.contains(&session.uuid);
        let indicator = if selected { "[x]" } else { "[ ]" };

        let text = format!(
            "{indicator} {:<tsw$}  {:<vw$}  {:<lw$}  {:<tw$}  {:<pw$}",
            truncate_display(&session.timestamp, TIMESTAMP_WIDTH, ""),
            truncate_display(&session.version, widths.version.saturating_sub(1), ""),
            line_count_cell(session.line_count),
            truncate_display(
                &collapse_whitespace(&session.title),
                widths.title.saturating_sub(2),
                ".."
            ),
            truncate_display(
                &collapse_whitespace(&session.project),
                widths.project.saturating_sub(2),
                ".."
            ),
            tsw = TIMESTAMP_WIDTH,
            vw = widths.version,
            lw = widths.lines,
            tw = widths.title,
            pw = widths.project,
        );

        let style = if index == model.cursor {
            Style::default().fg(theme::FG).add_modifier(Modifier::REVERSED)
        } else if selected {
            Style::default().fg(theme::SELECTED).bold()
        } else {
            Style::default().fg(theme::FG)
        };
        lines.push(Line::styled(text, style));
    }

    if model.sessions.len() > rows {
        lines.push(Line::styled(
            format!("[{}-{}/{}]", start + 1, end, model.sessions.len()),
            Style::default().fg(theme::MUTED),
        ));
    }

    if let Some(status) = &model.status {
        let line = match status.kind {
            StatusKind::Success => Line::styled(
                format!("\u{2713} {}", status.text),
                Style::default().fg(theme::SUCCESS).bold(),
            ),
            StatusKind::Error => Line::styled(
                format!("Error: {}", status.text),
                Style::default().fg(theme::ERROR).bold(),
            ),
        };
        lines.push(line);
    } else if model.mode == Mode::Deleting {
        lines.push(Line::styled(
            "Deleting selected chats...",
            Style::default().fg(theme::MUTED),
        ));
    }

    match model.mode {
        Mode::ConfirmingDelete => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("Delete {} chat(s)?", model.selected.len()),
                    Style::default().fg(theme::ERROR).bold(),
                ),
                Span::raw(" "),
                Span::styled("[ENTER=Yes] [ESC=No]", Style::default().fg(theme::DIM)),
            ]));
        }
        _ => {
            lines.push(Line::styled(HELP_LINE, Style::default().fg(theme::DIM)));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_empty(frame: &mut Frame, area: Rect, model: &AppModel) {
    let mut lines = vec![
        Line::styled(
            "No chats found.",
            Style::default().fg(theme::TITLE).bold(),
        ),
        Line::raw(""),
    ];
    if let Some(status) = &model.status {
        let style = match status.kind {
            StatusKind::Success => Style::default().fg(theme::SUCCESS),
            StatusKind::Error => Style::default().fg(theme::ERROR),
        };
        lines.push(Line::styled(status.text.clone(), style));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
        "Press q to quit.",
        Style::default().fg(theme::DIM),
    ));
    frame.render_widget(Paragraph::new(lines), area);
}

struct ColumnWidths {
    total: usize,
    version: usize,
    lines: usize,
    title: usize,
    project: usize,
}

impl ColumnWidths {
    fn for_terminal(terminal_width: usize) -> Self {
        let total = terminal_width.max(MIN_TABLE_WIDTH);
        let remaining = total - FIXED_COLUMNS_WIDTH;
        // Preferred floors (30/10) yield when they would not fit, so a row
        // never exceeds the table width.
        let title = (remaining * 60 / 100)
            .max(30)
            .min(remaining.saturating_sub(10));
        let project = remaining - title;
        Self {
            total,
            version: VERSION_WIDTH,
            lines: LINES_WIDTH,
            title,
            project,
        }
    }
}

fn line_count_cell(count: usize) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        count.to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Display-width-aware truncation; the ellipsis fits inside `max_width`.
fn truncate_display(text: &str, max_width: usize, ellipsis: &str) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = UnicodeWidthStr::width(ellipsis);
    let budget = max_width.saturating_sub(ellipsis_width);
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push_str(ellipsis);
    out
}
