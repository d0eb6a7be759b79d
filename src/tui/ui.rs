//! UI rendering using ratatui
//!
//! One screen: board on the left, scores and rack on the right, message log
//! and command input underneath.

use crate::app::{App, GameOver, MessageKind, HUMAN};
use crate::game::board::{Bonus, Position, Square};
use crate::game::letter_value;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

/// Width of one board cell, in columns
const CELL_WIDTH: usize = 3;

/// Render the game screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Board and side panel
            Constraint::Length(8), // Messages
            Constraint::Length(3), // Input
        ])
        .split(area);

    render_header(frame, layout[0], app);

    let board_width = (app.board.size() * CELL_WIDTH + 4) as u16;
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width + 2), Constraint::Min(24)])
        .split(layout[1]);

    render_board(frame, middle[0], app);
    render_side_panel(frame, middle[1], app);
    render_messages(frame, layout[2], app);
    render_input(frame, layout[3], app);
}

/// Render the header: title, turn indicator, reserve count
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(14),
        ])
        .split(inner);

    let logo = Paragraph::new("SCRABBOT")
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Left);
    frame.render_widget(logo, header_layout[0]);

    let (status, color) = format_status(app);
    let status = Paragraph::new(status)
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(status, header_layout[1]);

    let reserve = Paragraph::new(format!("Reserve: {}", app.reserve_len()))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    frame.render_widget(reserve, header_layout[2]);
}

/// Render the board with row letters and column numbers
fn render_board(frame: &mut Frame, area: Rect, app: &App) {
    let size = app.board.size();
    let mut lines = Vec::with_capacity(size + 1);

    let columns: String = (1..=size).map(|x| format!("{:>width$}", x, width = CELL_WIDTH)).collect();
    lines.push(Line::from(Span::styled(
        format!("  {}", columns),
        Style::default().fg(Color::DarkGray),
    )));

    for y in 0..size {
        let mut spans = vec![Span::styled(
            format!("{} ", row_label(y)),
            Style::default().fg(Color::DarkGray),
        )];
        for x in 0..size {
            let Ok(square) = app.board.get(Position::new(x, y)) else {
                continue;
            };
            spans.push(Span::styled(format_square(square), square_style(square)));
        }
        lines.push(Line::from(spans));
    }

    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Board"),
    );
    frame.render_widget(board, area);
}

/// Render scores and the human's rack
fn render_side_panel(frame: &mut Frame, area: Rect, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2 + app.players.len() as u16),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let items: Vec<ListItem> = app
        .players
        .iter()
        .enumerate()
        .map(|(i, player)| {
            let marker = if app.game_over.is_none() && i == app.current { "> " } else { "  " };
            let style = if i == HUMAN {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{}{} - {}", marker, player.name, player.score)).style(style)
        })
        .collect();

    let scores = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Scores"),
    );
    frame.render_widget(scores, layout[0]);

    let rack = &app.players[HUMAN].rack;
    let rack_widget = Paragraph::new(vec![
        Line::from(format_rack(&rack.letters())),
        Line::from(Span::styled(
            format!("value {}", rack.value()),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .style(Style::default().fg(Color::Cyan).bold())
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Your rack"),
    );
    frame.render_widget(rack_widget, layout[1]);
}

/// Render the most recent messages, newest last
fn render_messages(frame: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let messages: Vec<_> = app.visible_messages().collect();
    let skip = messages.len().saturating_sub(visible);

    let items: Vec<ListItem> = messages
        .into_iter()
        .skip(skip)
        .map(|message| {
            let color = match message.kind {
                MessageKind::System => Color::White,
                MessageKind::Error => Color::Red,
                MessageKind::Debug => Color::DarkGray,
            };
            ListItem::new(message.text.as_str()).style(Style::default().fg(color))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Messages"),
    );
    frame.render_widget(list, area);
}

/// Render the input line with cursor indicator
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let (text, color) = if app.game_over.is_some() {
        ("Press Esc to quit".to_string(), Color::DarkGray)
    } else {
        (format!("> {}_", app.input), Color::White)
    };
    let input = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(input, area);
}

fn row_label(y: usize) -> char {
    (b'a' + y as u8) as char
}

/// Letters show uppercase; empty bonus squares show their abbreviation.
fn format_square(square: &Square) -> String {
    let text = match square.letter {
        Some(letter) => letter.to_ascii_uppercase().to_string(),
        None => match square.bonus {
            Bonus::None => ".".to_string(),
            Bonus::DoubleLetter => "2L".to_string(),
            Bonus::TripleLetter => "3L".to_string(),
            Bonus::DoubleWord => "2W".to_string(),
            Bonus::TripleWord => "3W".to_string(),
            Bonus::Center => "*".to_string(),
        },
    };
    format!("{:>width$}", text, width = CELL_WIDTH)
}

fn square_style(square: &Square) -> Style {
    match square.letter {
        // Resolved wildcards score nothing
        Some(letter) if letter_value(letter) == 0 => Style::default().fg(Color::Magenta).bold(),
        Some(_) => Style::default().fg(Color::White).bold(),
        None => match square.bonus {
            Bonus::None => Style::default().fg(Color::DarkGray),
            Bonus::DoubleLetter => Style::default().fg(Color::Cyan),
            Bonus::TripleLetter => Style::default().fg(Color::Blue),
            Bonus::DoubleWord | Bonus::Center => Style::default().fg(Color::LightRed),
            Bonus::TripleWord => Style::default().fg(Color::Red),
        },
    }
}

/// Format the rack for display
fn format_rack(letters: &[char]) -> String {
    if letters.is_empty() {
        return String::from("[ empty ]");
    }

    let letters_str: String = letters
        .iter()
        .map(|c| c.to_ascii_uppercase().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!("[ {} ]", letters_str)
}

fn format_status(app: &App) -> (String, Color) {
    match &app.game_over {
        Some(GameOver::RackOut { player }) => (format!("Game over: {} went out", player), Color::Yellow),
        Some(GameOver::TooManySkips) => ("Game over: too many passes".to_string(), Color::Yellow),
        None if app.is_human_turn() => ("Your turn".to_string(), Color::Green),
        None => (format!("{} is thinking...", app.players[app.current].name), Color::DarkGray),
    }
}
