use anyhow::Result;
use cybercalc::calculator::format_number;
use cybercalc::session::{Reply, Session};
use std::io::{Write, stdin, stdout};
use termion::{
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
    cursor::{Goto, DetectCursorPos},
    clear::CurrentLine as ClearLine,
};

const PROMPT: &str = "Expression: ";

fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn remove_char_at(s: &mut String, char_index: usize) {
    let byte_idx = char_index_to_byte_index(s, char_index);
    if let Some(c) = s[byte_idx..].chars().next() {
        s.drain(byte_idx..byte_idx + c.len_utf8());
    }
}

pub fn run_line(mut session: Session) -> Result<()> {
    println!("CyberCalc");
    println!("Supports: + - * / ^, parentheses, sin cos tan sqrt ln log abs, π");
    println!("Navigation: ←/→, Backspace/Delete, Home/End, ↑/↓ for history");
    println!("Commands: quit, clear, theme <name>, m+ / mr / mc, export <file>");
    println!("\rAdd 'details' before expression for step-by-step evaluation\n");

    let mut stdout = stdout().into_raw_mode()?;
    // Oldest first, like a shell.
    let mut recall: Vec<String> = session
        .history
        .items()
        .iter()
        .rev()
        .map(|item| item.expression.clone())
        .collect();
    let mut recall_index = recall.len();
    let mut pending = String::new();

    loop {
        write!(stdout, "{}{}", ClearLine, PROMPT)?;
        stdout.flush()?;

        let mut expression = std::mem::take(&mut pending);
        let mut cursor_pos = expression.chars().count();
        let (_, initial_y) = stdout.cursor_pos()?;

        let stdin = stdin();
        let mut keys = stdin.keys();

        loop {
            write!(stdout, "{}{}{}{}", Goto(1, initial_y), ClearLine, PROMPT, expression)?;

            let prefix: String = expression.chars().take(cursor_pos).collect();
            let column = PROMPT.len() + unicode_width::UnicodeWidthStr::width(prefix.as_str()) + 1;
            write!(stdout, "{}", Goto(column as u16, initial_y))?;
            stdout.flush()?;

            let Some(key) = keys.next() else {
                return Ok(());
            };
            match key? {
                Key::Char('\n') => break,
                Key::Ctrl('c') | Key::Ctrl('d') => {
                    write!(stdout, "\r\n")?;
                    return Ok(());
                }
                Key::Ctrl('p') => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, 'π');
                    cursor_pos += 1;
                }
                Key::Char(c) => {
                    let byte_idx = char_index_to_byte_index(&expression, cursor_pos);
                    expression.insert(byte_idx, c);
                    cursor_pos += 1;
                }
                Key::Backspace if cursor_pos > 0 => {
                    cursor_pos -= 1;
                    remove_char_at(&mut expression, cursor_pos);
                }
                Key::Delete if cursor_pos < expression.chars().count() => {
                    remove_char_at(&mut expression, cursor_pos);
                }
                Key::Left if cursor_pos > 0 => cursor_pos -= 1,
                Key::Right if cursor_pos < expression.chars().count() => cursor_pos += 1,
                Key::Home => cursor_pos = 0,
                Key::End => cursor_pos = expression.chars().count(),
                Key::Up => {
                    if recall_index > 0 {
                        recall_index -= 1;
                        expression = recall[recall_index].clone();
                        cursor_pos = expression.chars().count();
                    }
                }
                Key::Down => {
                    if recall_index < recall.len().saturating_sub(1) {
                        recall_index += 1;
                        expression = recall[recall_index].clone();
                        cursor_pos = expression.chars().count();
                    } else {
                        recall_index = recall.len();
                        expression.clear();
                        cursor_pos = 0;
                    }
                }
                _ => {}
            }
        }

        let input = expression.trim().to_string();
        if input.is_empty() {
            write!(stdout, "\r\n")?;
            continue;
        }

        match session.submit(&input) {
            Reply::Nothing => {}
            Reply::Quit => {
                write!(stdout, "\r\nGoodbye!\r\n")?;
                return Ok(());
            }
            Reply::Cleared => {
                recall.clear();
                recall_index = 0;
                write!(stdout, "\r\nHistory cleared\r\n\n")?;
            }
            Reply::ShowHelp => {
                write!(stdout, "\r\n  Operators: + - * / ^ (right-assoc), unary -\r\n")?;
                write!(stdout, "  Functions: sin cos tan sqrt ln log abs\r\n\n")?;
            }
            Reply::ThemeChanged(theme) => {
                write!(stdout, "\r\n  Theme set to {}\r\n\n", theme)?;
            }
            Reply::Memory(value) => {
                write!(stdout, "\r\n  M = {}\r\n\n", format_number(value))?;
            }
            Reply::Insert(text) => {
                write!(stdout, "\r\n")?;
                pending = text;
            }
            Reply::Exported { path, count } => {
                write!(stdout, "\r\n  Exported {} entries to {}\r\n\n", count, path.display())?;
            }
            Reply::Error(message) => {
                write!(stdout, "\r\n  Error: {}\r\n\n", message)?;
                pending = input;
            }
            Reply::Evaluated(evaluation) => {
                recall.push(evaluation.input.clone());
                recall_index = recall.len();
                match evaluation.result {
                    Ok(result) => {
                        write!(stdout, "\r\n  {} = {}\r\n", evaluation.input, format_number(result))?;
                        if evaluation.detailed && !evaluation.steps.is_empty() {
                            write!(stdout, "\r\n  Step-by-step evaluation:\r\n")?;
                            for (i, step) in evaluation.steps.iter().enumerate() {
                                write!(stdout, "  Step {}: {} = {}\r\n", i + 1, step.operation, format_number(step.result))?;
                            }
                            write!(
                                stdout,
                                "  Time: {:.6} ms\r\n",
                                evaluation.duration.as_secs_f64() * 1000.0
                            )?;
                        }
                        write!(stdout, "\r\n")?;
                    }
                    Err(e) => {
                        write!(stdout, "\r\n  {} = Error: {}\r\n\n", evaluation.input, e)?;
                        // Keep the input so it can be corrected.
                        pending = input;
                    }
                }
            }
        }
    }
}
