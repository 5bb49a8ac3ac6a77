//! Progress view rendering

use crate::tui::components::{render_hint, render_title_block, three_panel_layout, truncate_start};
use crate::tui::state::{ProgressState, RunOutcome};
use crate::tui::theme::theme;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Margin, Rect},
    text::Line,
    widgets::{Block, BorderType, Gauge, Paragraph, Wrap},
};

/// Draw the whole view
pub fn draw(frame: &mut Frame, area: Rect, state: &ProgressState) {
    let [header, body, footer] = three_panel_layout(area);

    let title = format!("{} {}", state.operation, state.root.display());
    render_title_block(&truncate_start(&title, header.width.saturating_sub(6) as usize), frame, header);

    let [gauge_area, stats_area, log_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(3),
    ])
    .areas(body);

    let gauge = Gauge::default()
        .block(
            Block::bordered()
                .title(" Progress ")
                .border_type(BorderType::Rounded)
                .border_style(theme().border()),
        )
        .gauge_style(theme().progress())
        .ratio(state.ratio())
        .label(format!("{:.0}%", state.percent));
    frame.render_widget(gauge, gauge_area);

    frame.render_widget(stats_widget(state), stats_area);
    draw_recent(frame, log_area, state);

    let hint = if state.is_finished() {
        "Press any key to exit"
    } else {
        "Organizing... the run cannot be interrupted"
    };
    render_hint(hint, frame, footer);
}

fn stats_widget(state: &ProgressState) -> Paragraph<'static> {
    let lines = match &state.outcome {
        None => vec![
            Line::styled(format!("Files visited: {}", state.events_seen), theme().normal()),
            Line::styled(format!("Errors encountered: {}", state.errors_seen), theme().error()),
        ],
        Some(RunOutcome::Completed { stats, dry_run }) => {
            let mut lines = vec![
                Line::styled("Operation completed", theme().title()),
                Line::styled(
                    format!(
                        "Files processed: {}   Files skipped: {}",
                        stats.processed, stats.skipped
                    ),
                    theme().success(),
                ),
                Line::styled(format!("Errors encountered: {}", stats.errored), theme().error()),
            ];
            if *dry_run {
                lines.push(Line::styled(
                    "Dry run: no files were moved or copied",
                    theme().warning(),
                ));
            }
            lines
        }
        Some(RunOutcome::Failed(message)) => vec![
            Line::styled("Operation failed", theme().title()),
            Line::styled(message.clone(), theme().error()),
        ],
    };

    Paragraph::new(lines)
        .style(theme().normal())
        .wrap(Wrap { trim: true })
}

fn draw_recent(frame: &mut Frame, area: Rect, state: &ProgressState) {
    let block = Block::bordered()
        .title(" Log ")
        .border_type(BorderType::Rounded)
        .border_style(theme().border());
    let inner = area.inner(Margin::new(1, 1));
    frame.render_widget(block, area);

    let log_line = state
        .log_path
        .as_ref()
        .filter(|_| state.is_finished())
        .map(|p| format!("Log file: {}", p.display()));

    let width = inner.width as usize;
    let visible = (inner.height as usize).saturating_sub(log_line.is_some() as usize);
    let skip = state.recent.len().saturating_sub(visible);

    let mut lines: Vec<Line> = state
        .recent
        .iter()
        .skip(skip)
        .map(|msg| Line::styled(truncate_start(msg, width), theme().for_message(msg)))
        .collect();
    if let Some(log_line) = log_line {
        lines.push(Line::styled(truncate_start(&log_line, width), theme().hint()));
    }

    frame.render_widget(Paragraph::new(lines).style(theme().normal()), inner);
}

/// Render the view to the terminal
pub fn render(terminal: &mut DefaultTerminal, state: &ProgressState) -> std::io::Result<()> {
    terminal.draw(|frame| draw(frame, frame.area(), state))?;
    Ok(())
}
