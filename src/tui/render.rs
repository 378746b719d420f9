use super::state::{Focus, UiState};
use crate::classify::LogCategory;
use crate::model::ExecutionState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(area: Rect, f: &mut Frame, state: &mut UiState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(46), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(14), Constraint::Length(5)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(columns[1]);

    draw_form(left[0], f, state);
    draw_frame_panel(left[1], f, state);
    draw_transcript(right[0], f, state);
    draw_status_bar(right[1], f, state);
}

fn field_line(state: &UiState, focus: Focus, label: &str, value: String) -> Line<'static> {
    let focused = state.focus == focus;
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let is_text_field = matches!(focus, Focus::Device | Focus::Custom | Focus::Goal);
    let cursor = if focused && is_text_field { "▏" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label:<10}"), label_style),
        Span::raw(" "),
        Span::raw(format!("{value}{cursor}")),
    ])
}

fn draw_form(area: Rect, f: &mut Frame, state: &UiState) {
    let mut lines = Vec::new();

    lines.push(field_line(state, Focus::Device, "Device", state.device.clone()));
    lines.push(field_line(
        state,
        Focus::Package,
        "Package",
        format!("◂ {} ▸", state.package.selected_label()),
    ));
    if state.package.custom_visible() {
        lines.push(field_line(
            state,
            Focus::Custom,
            "  custom",
            state.package.custom_text().to_string(),
        ));
    }
    let scenario_label = state
        .selected_scenario()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| {
            if state.scenarios.is_empty() {
                "(catalog empty)".to_string()
            } else {
                "(none)".to_string()
            }
        });
    lines.push(field_line(
        state,
        Focus::Scenario,
        "Scenario",
        format!("◂ {scenario_label} ▸"),
    ));
    lines.push(field_line(state, Focus::Goal, "Goal", state.goal.clone()));
    lines.push(field_line(
        state,
        Focus::Provider,
        "Provider",
        format!("◂ {} ▸", state.provider().to_uppercase()),
    ));
    lines.push(field_line(
        state,
        Focus::Mode,
        "Mode",
        format!("◂ {} ▸", state.mode.describe()),
    ));

    lines.push(Line::default());
    let trigger_focused = state.focus == Focus::Trigger;
    let trigger = if state.trigger_enabled() {
        Span::styled(
            "[ ▶ Execute ]",
            if trigger_focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green)
            },
        )
    } else {
        Span::styled("[ ⏳ Running… ]", Style::default().fg(Color::DarkGray))
    };
    lines.push(Line::from(trigger));

    let block = Block::default().borders(Borders::ALL).title(" Run Setup ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_frame_panel(area: Rect, f: &mut Frame, state: &UiState) {
    let lines = match &state.last_frame {
        Some(frame) => vec![
            Line::from(format!(
                "frame #{}  {:.1} KB  {}",
                frame.seq,
                frame.bytes as f64 / 1024.0,
                frame.at
            )),
            Line::from(Span::styled(
                frame.path.display().to_string(),
                Style::default().fg(Color::Gray),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "no frames yet",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let block = Block::default().borders(Borders::ALL).title(" Device Screen ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn category_style(category: LogCategory) -> Style {
    match category {
        LogCategory::Header => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        LogCategory::Success => Style::default().fg(Color::Green),
        LogCategory::Error => Style::default().fg(Color::Red),
        LogCategory::AiNote => Style::default().fg(Color::Yellow),
        LogCategory::Plain => Style::default(),
        LogCategory::Raw => Style::default().fg(Color::DarkGray),
    }
}

fn draw_transcript(area: Rect, f: &mut Frame, state: &mut UiState) {
    let lines: Vec<Line> = state
        .transcript
        .display_lines()
        .into_iter()
        .map(|(category, text)| {
            Line::from(Span::styled(text.to_string(), category_style(category)))
        })
        .collect();

    let viewport = area.height.saturating_sub(2) as usize;
    let total = lines.len();
    let top = state.transcript.top_offset(total, viewport);
    state.transcript_total = total;
    state.transcript_viewport = viewport;

    let title = if state.transcript.follows_tail() {
        " Transcript ".to_string()
    } else {
        format!(" Transcript (scrolled, {top}/{total}) ")
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(
        Paragraph::new(lines).block(block).scroll((top as u16, 0)),
        area,
    );
}

fn draw_status_bar(area: Rect, f: &mut Frame, state: &UiState) {
    let indicator_style = if state.liveness.online {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let state_style = match state.exec_state {
        ExecutionState::Idle => Style::default().fg(Color::Gray),
        ExecutionState::Running => Style::default().fg(Color::Yellow),
        ExecutionState::Done => Style::default().fg(Color::Green),
        ExecutionState::Error => Style::default().fg(Color::Red),
    };

    let mut spans = vec![
        Span::styled(state.liveness.indicator(), indicator_style),
        Span::raw("  │  "),
        Span::styled(state.exec_state.label(), state_style),
    ];
    if !state.info.is_empty() {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            state.info.clone(),
            Style::default().fg(Color::Gray),
        ));
    }

    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
