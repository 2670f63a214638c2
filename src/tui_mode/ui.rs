use super::app::App;
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use cybercalc::calculator::format_number;
use cybercalc::history::format_time;
use cybercalc::themes::Palette;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;
use super::helpers::{format_with_spaces, highlight_functions, rgb, wrap_text};
use crate::render_help::render_help;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 10;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.expire_flash();

        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('u') | KeyCode::Char('U') if ctrl => app.clear_input(),
        KeyCode::Char('p') if ctrl => app.insert_text("π"),
        KeyCode::Char(c) if !ctrl && !modifiers.contains(KeyModifiers::ALT) => {
            let mut buf = [0u8; 4];
            app.insert_text(c.encode_utf8(&mut buf));
        }
        KeyCode::Backspace => {
            if app.cursor_position > 0 {
                app.cursor_position -= 1;
                let byte_idx = App::char_index_to_byte_index(&app.input, app.cursor_position);
                let next_char = app.input[byte_idx..].chars().next();
                if let Some(c) = next_char {
                    let end = byte_idx + c.len_utf8();
                    app.input.drain(byte_idx..end);
                }
            }
        }
        KeyCode::Delete => {
            let byte_idx = App::char_index_to_byte_index(&app.input, app.cursor_position);
            let next_char = app.input[byte_idx..].chars().next();
            if let Some(c) = next_char {
                let end = byte_idx + c.len_utf8();
                app.input.drain(byte_idx..end);
            }
        }
        KeyCode::Left if ctrl => app.move_cursor_by_words(-1),
        KeyCode::Right if ctrl => app.move_cursor_by_words(1),
        KeyCode::Left => app.move_cursor(-1),
        KeyCode::Right => app.move_cursor(1),
        KeyCode::Home => {
            app.cursor_position = 0;
            app.input_scroll = 0;
        }
        KeyCode::End => {
            app.cursor_position = app.input.chars().count();
        }
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::Enter => app.submit(),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::F(2) => app.cycle_theme(),
        KeyCode::Esc => app.flash = None,
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: crossterm::event::MouseEvent) {
    let target = if app.show_help {
        &mut app.help_scroll
    } else {
        &mut app.history_scroll
    };
    match event.kind {
        MouseEventKind::ScrollDown => *target = target.saturating_add(3),
        MouseEventKind::ScrollUp => *target = target.saturating_sub(3),
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();
    let palette = app.theme().palette();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    frame.render_widget(
        Block::default().style(Style::default().bg(rgb(palette.bg_primary))),
        terminal_size,
    );

    if app.terminal_too_small {
        render_resize_message(frame, terminal_size, &palette);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(terminal_size);

    render_input(frame, app, layout[0], &palette);
    render_flash(frame, app, layout[1], &palette);
    render_status(frame, app, layout[2], &palette);
    render_history(frame, app, layout[3], &palette);
    app.list_height = layout[3].height as usize;
}

fn render_resize_message(frame: &mut Frame, area: Rect, palette: &Palette) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(rgb(palette.accent_danger)).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(rgb(palette.accent_secondary))
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(palette.accent_danger)))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(palette.border)))
        .title(" History ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(rgb(palette.bg_secondary)));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.history.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet. Enter an expression to see results here.")
            .style(Style::default().fg(rgb(palette.text_secondary)))
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;
    let now = Utc::now();
    let muted = Style::default().fg(rgb(palette.text_secondary));

    for (i, entry) in app.history.iter().enumerate() {
        app.item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default().fg(rgb(if is_selected {
            palette.accent_secondary
        } else {
            palette.text_primary
        }));

        let input = format_with_spaces(&entry.input);
        let input_lines = wrap_text(&input, wrap_width);

        for (line_idx, line) in input_lines.into_iter().enumerate() {
            let mut result_spans = vec![];

            if line_idx == 0 {
                result_spans.push(Span::styled("> ", Style::default().fg(rgb(palette.accent_primary))));
            } else {
                result_spans.push(Span::styled("  ", Style::default()));
            }

            result_spans.extend(highlight_functions(&line, base_style, palette));

            if line_idx == 0 {
                result_spans.push(Span::styled(" = ", muted));
                result_spans.push(Span::styled(
                    format_number(entry.result),
                    Style::default().fg(rgb(palette.accent_primary)).add_modifier(Modifier::BOLD)
                ));
                result_spans.push(Span::styled(
                    format!("  ({})", format_time(entry.timestamp, now)),
                    muted
                ));
            }

            items.push(ListItem::new(Line::from(result_spans)));
        }

        if entry.detailed_mode {
            for (j, step) in entry.detailed_steps.iter().enumerate() {
                let step_text = format!("Step {}: {} = {}", j + 1, step.operation, format_number(step.result));
                for (step_idx, line) in wrap_text(&step_text, wrap_width).into_iter().enumerate() {
                    let prefix = if step_idx == 0 { "    - " } else { "      " };
                    items.push(ListItem::new(Line::from(Span::styled(format!("{}{}", prefix, line), muted))));
                }
            }

            let time_str = format!("Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0);
            items.push(ListItem::new(Line::from(Span::styled(
                format!("    - {}", time_str),
                Style::default().fg(rgb(palette.accent_secondary))
            ))));
        }

        if i < app.history.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(rgb(palette.border))
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(rgb(palette.bg_tertiary)).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_flash(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let Some(flash) = &app.flash else {
        return;
    };
    let (prefix, color) = if flash.is_error {
        ("⚠ ", palette.accent_danger)
    } else {
        ("", palette.accent_secondary)
    };
    let line = Line::from(Span::styled(
        format!(" {}{}", prefix, flash.text),
        Style::default().fg(rgb(color)).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let keys = [
        ("Enter", "Calculate"),
        ("Up/Down", "History"),
        ("F1", "Help"),
        ("F2", "Theme"),
        ("Ctrl+P", "π"),
        ("Ctrl+U", "Clear"),
    ];

    let mut spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(rgb(palette.accent_primary))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(rgb(palette.text_secondary)),
                ),
            ]
        })
        .collect();

    spans.push(Span::styled(
        format!("[{}]", app.theme()),
        Style::default().fg(rgb(palette.accent_secondary)),
    ));
    if app.session.calculator.has_memory() {
        spans.push(Span::styled(
            " M",
            Style::default().fg(rgb(palette.accent_secondary)).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(palette.accent_primary)))
        .title(" Expression ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(rgb(palette.bg_secondary)).fg(rgb(palette.text_primary)));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let visible_width = (inner_area.width.saturating_sub(2)) as usize;
    let total_chars = app.input.chars().count();
    app.adjust_input_scroll(visible_width);

    let visible_input: String = app.input
        .chars()
        .skip(app.input_scroll)
        .take(visible_width)
        .collect();

    let input_line = format!("> {}", visible_input);
    frame.render_widget(Paragraph::new(input_line), inner_area);

    let visible_cursor = app.cursor_position.saturating_sub(app.input_scroll);
    let visible_prefix = visible_input.chars().take(visible_cursor).collect::<String>();
    let cursor_x = inner_area.x + 2 + visible_prefix.width() as u16;
    let cursor_y = inner_area.y;
    frame.set_cursor(cursor_x, cursor_y);

    let scroll_indicator_style = Style::default().fg(rgb(palette.text_secondary));

    if app.input_scroll > 0 {
        let left_indicator = Paragraph::new("<").style(scroll_indicator_style);
        frame.render_widget(left_indicator, Rect::new(inner_area.x, inner_area.y, 1, 1));
    }

    if total_chars > app.input_scroll + visible_width {
        let right_indicator = Paragraph::new(">").style(scroll_indicator_style);
        frame.render_widget(
            right_indicator,
            Rect::new(inner_area.x + inner_area.width - 1, inner_area.y, 1, 1),
        );
    }
}
