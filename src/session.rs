//! Commands typed at the prompt, shared by the TUI and line front-ends.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::calc_engine::Step;
use crate::calculator::{format_number, Calculator};
use crate::config::{Paths, Settings};
use crate::history::HistoryManager;
use crate::themes::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Quit,
    Clear,
    Help,
    Theme(Option<&'a str>),
    MemoryClear,
    MemoryAdd,
    MemoryRecall,
    Export(&'a str),
    Evaluate { expression: &'a str, detailed: bool },
}

impl<'a> Command<'a> {
    /// `None` for blank input.
    pub fn parse(input: &'a str) -> Option<Command<'a>> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let lower = input.to_lowercase();
        let command = match lower.as_str() {
            "quit" | "exit" | "q" => Command::Quit,
            "clear" | "reset" => Command::Clear,
            "help" => Command::Help,
            "theme" => Command::Theme(None),
            "mc" => Command::MemoryClear,
            "m+" => Command::MemoryAdd,
            "mr" => Command::MemoryRecall,
            "details" => Command::Evaluate {
                expression: "",
                detailed: true,
            },
            _ if lower.starts_with("theme ") => Command::Theme(Some(input[6..].trim())),
            _ if lower.starts_with("export ") => Command::Export(input[7..].trim()),
            _ if lower.starts_with("details ") => Command::Evaluate {
                expression: input[8..].trim(),
                detailed: true,
            },
            _ if lower.ends_with(" details") => Command::Evaluate {
                expression: input[..input.len() - 7].trim(),
                detailed: true,
            },
            _ => Command::Evaluate {
                expression: input,
                detailed: false,
            },
        };
        Some(command)
    }
}

/// One evaluated line, as shown in the history pane.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub input: String,
    pub result: Result<f64, String>,
    pub steps: Vec<Step>,
    pub detailed: bool,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nothing,
    Quit,
    Cleared,
    ShowHelp,
    ThemeChanged(Theme),
    Memory(f64),
    /// Text for the front-end to insert at the cursor.
    Insert(String),
    Exported { path: PathBuf, count: usize },
    Evaluated(Evaluation),
    Error(String),
}

pub struct Session {
    pub calculator: Calculator,
    pub history: HistoryManager,
    pub settings: Settings,
    paths: Option<Paths>,
}

impl Session {
    pub fn open(paths: Paths, settings: Settings) -> Session {
        let history = if settings.persist_history {
            HistoryManager::open(&paths.history, settings.max_history)
        } else {
            HistoryManager::in_memory(settings.max_history)
        };
        Session {
            calculator: Calculator::new(),
            history,
            settings,
            paths: Some(paths),
        }
    }

    pub fn in_memory(settings: Settings) -> Session {
        Session {
            calculator: Calculator::new(),
            history: HistoryManager::in_memory(settings.max_history),
            settings,
            paths: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn submit(&mut self, input: &str) -> Reply {
        let Some(command) = Command::parse(input) else {
            return Reply::Nothing;
        };
        log::debug!("command: {:?}", command);

        match command {
            Command::Quit => Reply::Quit,
            Command::Clear => {
                self.calculator.clear();
                self.history.clear();
                Reply::Cleared
            }
            Command::Help => Reply::ShowHelp,
            Command::Theme(None) => Reply::ThemeChanged(self.cycle_theme()),
            Command::Theme(Some(name)) => match name.parse::<Theme>() {
                Ok(theme) => {
                    self.set_theme(theme);
                    Reply::ThemeChanged(theme)
                }
                Err(e) => Reply::Error(e.to_string()),
            },
            Command::MemoryClear => {
                self.calculator.memory_clear();
                Reply::Memory(self.calculator.memory())
            }
            Command::MemoryAdd => {
                self.calculator.memory_add();
                Reply::Memory(self.calculator.memory())
            }
            Command::MemoryRecall => Reply::Insert(format_number(self.calculator.memory())),
            Command::Export(path) => {
                let path = PathBuf::from(path);
                match self.history.export(&path) {
                    Ok(count) => Reply::Exported { path, count },
                    Err(e) => Reply::Error(format!("{:#}", e)),
                }
            }
            Command::Evaluate { expression, .. } if expression.is_empty() => {
                Reply::Error("Please enter a valid expression after 'details'".to_string())
            }
            Command::Evaluate { expression, detailed } => {
                Reply::Evaluated(self.evaluate(expression, detailed))
            }
        }
    }

    /// Runs `expression` through the calculator and records successes in
    /// history.
    pub fn evaluate(&mut self, expression: &str, detailed: bool) -> Evaluation {
        let start_time = Instant::now();
        self.calculator.set_expression(expression);
        let outcome = self.calculator.calculate(detailed);
        let duration = start_time.elapsed();

        match outcome {
            Ok(Some(outcome)) => {
                self.history.add(&outcome.expression, outcome.result);
                Evaluation {
                    input: outcome.expression,
                    result: Ok(outcome.result),
                    steps: outcome.steps,
                    detailed,
                    duration,
                }
            }
            Ok(None) => Evaluation {
                input: expression.to_string(),
                result: Err(crate::calc_engine::SyntaxError::InvalidExpression.to_string()),
                steps: Vec::new(),
                detailed,
                duration,
            },
            Err(e) => {
                log::info!("{:?}: {}", expression, e);
                Evaluation {
                    input: expression.to_string(),
                    result: Err(e.to_string()),
                    steps: Vec::new(),
                    detailed,
                    duration,
                }
            }
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        if let Some(paths) = &self.paths {
            if let Err(e) = self.settings.save(&paths.settings) {
                log::error!("Failed to save theme: {:#}", e);
            }
        }
    }

    pub fn cycle_theme(&mut self) -> Theme {
        let next = self.settings.theme.next();
        self.set_theme(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(Command::parse("QUIT"), Some(Command::Quit));
        assert_eq!(Command::parse(" Reset "), Some(Command::Clear));
        assert_eq!(Command::parse("M+"), Some(Command::MemoryAdd));
        assert_eq!(Command::parse("Theme Nord"), Some(Command::Theme(Some("Nord"))));
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("details"),
            Some(Command::Evaluate { expression: "", detailed: true })
        );
    }

    #[test]
    fn details_prefix_and_suffix() {
        assert_eq!(
            Command::parse("details 2+2"),
            Some(Command::Evaluate { expression: "2+2", detailed: true })
        );
        assert_eq!(
            Command::parse("3*3 DETAILS"),
            Some(Command::Evaluate { expression: "3*3", detailed: true })
        );
        assert_eq!(
            Command::parse("sqrt(2)"),
            Some(Command::Evaluate { expression: "sqrt(2)", detailed: false })
        );
    }

    #[test]
    fn evaluation_goes_to_history() {
        let mut session = Session::in_memory(Settings::default());
        let Reply::Evaluated(eval) = session.submit("details 2+3*4") else {
            panic!("expected an evaluation");
        };
        assert_eq!(eval.result, Ok(14.0));
        assert_eq!(eval.steps.len(), 2);
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.history.items()[0].expression, "2+3*4");
    }

    #[test]
    fn errors_stay_out_of_history() {
        let mut session = Session::in_memory(Settings::default());
        let Reply::Evaluated(eval) = session.submit("5/0") else {
            panic!("expected an evaluation");
        };
        assert_eq!(eval.result, Err("Division by zero".to_string()));
        assert!(session.history.is_empty());
        assert_eq!(session.calculator.expression(), "5/0");
    }

    #[test]
    fn bare_details_is_rejected() {
        let mut session = Session::in_memory(Settings::default());
        let expected = Reply::Error("Please enter a valid expression after 'details'".to_string());
        assert_eq!(session.submit("details "), expected);
        assert_eq!(session.submit("DETAILS"), expected);
        assert!(session.history.is_empty());
    }

    #[test]
    fn memory_commands() {
        let mut session = Session::in_memory(Settings::default());
        session.submit("6*7");
        assert_eq!(session.submit("m+"), Reply::Memory(42.0));
        assert_eq!(session.submit("mr"), Reply::Insert("42".to_string()));
        assert_eq!(session.submit("mc"), Reply::Memory(0.0));
    }

    #[test]
    fn theme_commands() {
        let mut session = Session::in_memory(Settings::default());
        assert_eq!(session.submit("theme light"), Reply::ThemeChanged(Theme::Light));
        assert_eq!(session.submit("theme"), Reply::ThemeChanged(Theme::Nord));
        assert!(matches!(session.submit("theme neon"), Reply::Error(_)));
        assert_eq!(session.theme(), Theme::Nord);
    }

    #[test]
    fn clear_empties_history() {
        let mut session = Session::in_memory(Settings::default());
        session.submit("1+1");
        assert_eq!(session.submit("clear"), Reply::Cleared);
        assert!(session.history.is_empty());
    }
}
