use crate::tui_mode::app::App;
use crate::tui_mode::rgb;
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_help(frame: &mut Frame, app: &mut App) {
    let palette = app.theme().palette();
    let heading = Style::default()
        .fg(rgb(palette.accent_secondary))
        .add_modifier(Modifier::UNDERLINED);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(rgb(palette.accent_primary)))
        .title(" CyberCalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(rgb(palette.bg_primary)).fg(rgb(palette.text_primary)));

    let help_text = vec![
        Line::from(Span::styled("CyberCalc - Terminal Calculator", Style::default().fg(rgb(palette.accent_primary)).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Operators (highest precedence last):", heading)),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  * : Multiplication  (e.g., 6 * 7 = 42)  also ×"),
        Line::from("  / : Division        (e.g., 15 / 3 = 5)  also ÷"),
        Line::from("  ^ : Exponentiation  (e.g., 2 ^ 3 ^ 2 = 512, right to left)"),
        Line::from("  -x : Negation       (e.g., -2 ^ 2 = -4)"),
        Line::from(""),
        Line::from(Span::styled("Functions (argument in parentheses):", heading)),
        Line::from("  sin(x), cos(x), tan(x) : Trigonometry (x in radians)"),
        Line::from("  sqrt(x)  : Square root"),
        Line::from("  ln(x)    : Natural logarithm"),
        Line::from("  log(x)   : Base-10 logarithm"),
        Line::from("  abs(x)   : Absolute value"),
        Line::from(""),
        Line::from(Span::styled("Constants:", heading)),
        Line::from("  π : 3.14159... (Ctrl+P)"),
        Line::from(""),
        Line::from(Span::styled("Commands:", heading)),
        Line::from("  details <expression> : Show step-by-step evaluation with time"),
        Line::from("  m+ / mr / mc : Add last result to memory / recall / clear"),
        Line::from("  theme [name] : Switch theme (cyber, dark, light, nord)"),
        Line::from("  export <file> : Write history as JSON"),
        Line::from("  clear : Clear calculation history"),
        Line::from("  help : Show this help screen"),
        Line::from("  quit : Exit the calculator"),
        Line::from(""),
        Line::from(Span::styled("Navigation:", heading)),
        Line::from("  ← → : Move cursor left/right"),
        Line::from("  Ctrl+←/→ : Move cursor by words"),
        Line::from("  Home/End : Move to start/end of line"),
        Line::from("  ↑ ↓ : Navigate calculation history"),
        Line::from("  PgUp/PgDn : Page through history"),
        Line::from("  F2 : Next theme    Ctrl+U : Clear input    Esc : Dismiss message"),
        Line::from(""),
        Line::from(Span::styled("Examples:", heading)),
        Line::from("  (2 + 3) * 4"),
        Line::from("  sqrt(16) + log(1000)"),
        Line::from("  details 2 ^ 3 ^ 2"),
        Line::from("  -(10 - 15) / 2"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}
