use cybercalc::calc_engine::Function;
use cybercalc::themes::{Palette, Rgb};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec!["".to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            let mut remaining = word;
            while !remaining.is_empty() {
                let mut chunk = String::new();
                let mut chunk_width = 0;
                let mut chunk_byte_len = 0;

                for c in remaining.chars() {
                    let char_width = UnicodeWidthChar::width(c).unwrap_or(1);
                    if chunk_width + char_width > width {
                        break;
                    }
                    chunk.push(c);
                    chunk_width += char_width;
                    chunk_byte_len += c.len_utf8();
                }

                // A character wider than the whole line still has to go somewhere.
                if chunk_byte_len == 0 {
                    let c = remaining.chars().next().unwrap_or(' ');
                    chunk.push(c);
                    chunk_byte_len = c.len_utf8();
                }

                if !current_line.is_empty() {
                    lines.push(current_line.trim().to_string());
                    current_line.clear();
                    current_width = 0;
                }

                lines.push(chunk);
                remaining = &remaining[chunk_byte_len..];
            }
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(current_line.trim().to_string());
            current_line.clear();
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line.trim().to_string());
    }

    lines
}

/// Puts single spaces around binary operators: `2+3*4` → `2 + 3 * 4`.
pub fn format_with_spaces(expr: &str) -> String {
    let mut result = String::new();
    let mut prev: Option<char> = None;

    for c in expr.chars().filter(|c| !c.is_whitespace()) {
        let is_operator = matches!(c, '+' | '-' | '*' | '/' | '^' | '×' | '÷');
        // A minus with nothing to its left is a sign, not an operator.
        let is_sign = c == '-' && matches!(prev, None | Some('(') | Some('+' | '-' | '*' | '/' | '^' | '×' | '÷'));

        if is_operator && !is_sign {
            result.push(' ');
            result.push(c);
            result.push(' ');
        } else {
            result.push(c);
        }
        prev = Some(c);
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_math_function(word: &str) -> bool {
    Function::lookup(word).is_some()
}

pub fn highlight_functions(expr: &str, base_style: Style, palette: &Palette) -> Vec<Span<'static>> {
    let function_style = Style::default()
        .fg(rgb(palette.accent_secondary))
        .add_modifier(Modifier::BOLD);

    let operator_style = Style::default()
        .fg(rgb(palette.accent_primary))
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(rgb(palette.text_primary));

    let word_style = |word: &str| {
        if is_math_function(word) {
            function_style
        } else {
            base_style
        }
    };

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_number = false;

    for c in expr.chars() {
        if c.is_alphabetic() && c != 'π' {
            if in_number {
                spans.push(Span::styled(std::mem::take(&mut current), number_style));
                in_number = false;
            }
            current.push(c);
            in_word = true;
        } else if c.is_ascii_digit() || c == '.' || c == 'π' {
            if in_word {
                let style = word_style(&current);
                spans.push(Span::styled(std::mem::take(&mut current), style));
                in_word = false;
            }
            current.push(c);
            in_number = true;
        } else {
            if in_word {
                let style = word_style(&current);
                spans.push(Span::styled(std::mem::take(&mut current), style));
                in_word = false;
            } else if in_number {
                spans.push(Span::styled(std::mem::take(&mut current), number_style));
                in_number = false;
            }

            match c {
                '+' | '-' | '*' | '/' | '^' | '×' | '÷' => {
                    spans.push(Span::styled(c.to_string(), operator_style));
                }
                ' ' => spans.push(Span::raw(" ")),
                _ => spans.push(Span::styled(c.to_string(), base_style)),
            }
        }
    }

    if in_word {
        let style = word_style(&current);
        spans.push(Span::styled(current, style));
    } else if in_number {
        spans.push(Span::styled(current, number_style));
    }

    spans
}
