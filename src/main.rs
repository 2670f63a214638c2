use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, ValueEnum};
use cybercalc::calc_engine::parse;
use cybercalc::calculator::{format_number, normalize_expression, round_result};
use cybercalc::config::{Paths, Settings};
use cybercalc::session::Session;
use cybercalc::themes::Theme;
use log::LevelFilter;

#[cfg(feature = "line")]
mod line_mode;
#[cfg(feature = "tui")]
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Tui,
    Line,
}

#[derive(Parser)]
#[command(name = "cybercalc")]
#[command(about = "Terminal calculator with a shunting-yard expression evaluator")]
#[command(version)]
struct Cli {
    /// Evaluate EXPRESSION once, print the result and exit
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,
    /// Front-end to start
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,
    /// Directory for settings, history and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Color theme: cyber, dark, light or nord
    #[arg(long)]
    theme: Option<Theme>,
    /// Keep history in memory only
    #[arg(long)]
    no_persist: bool,
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = Paths::resolve(cli.data_dir);

    if let Some(expression) = cli.expression {
        init_logging(cli.verbose, None);
        return evaluate_once(&expression);
    }

    let mode = cli.mode.unwrap_or_else(default_mode);
    // The TUI owns the terminal, so its log goes to a file.
    let log_file = (mode == Mode::Tui).then(|| paths.log.clone());
    init_logging(cli.verbose, log_file.as_deref());
    log::info!("cybercalc v{} starting in {:?} mode", env!("CARGO_PKG_VERSION"), mode);

    let mut settings = Settings::load(&paths.settings);
    if let Some(theme) = cli.theme {
        settings.theme = theme;
    }
    if cli.no_persist {
        settings.persist_history = false;
    }

    start(mode, Session::open(paths, settings))
}

fn evaluate_once(expression: &str) -> Result<()> {
    match parse(&normalize_expression(expression)) {
        Ok(value) => {
            println!("{}", format_number(round_result(value)));
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}

fn default_mode() -> Mode {
    if cfg!(feature = "tui") {
        Mode::Tui
    } else {
        Mode::Line
    }
}

fn start(mode: Mode, session: Session) -> Result<()> {
    match mode {
        #[cfg(feature = "tui")]
        Mode::Tui => tui_mode::run_tui(session),
        #[cfg(feature = "line")]
        Mode::Line => line_mode::run_line(session),
        #[allow(unreachable_patterns)]
        other => {
            drop(session);
            bail!("this build does not include the {:?} front-end", other)
        }
    }
}

fn init_logging(verbosity: u8, log_file: Option<&Path>) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(path) = log_file {
        if let Some(dir) = path.parent() {
            let _ = fs::create_dir_all(dir);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Nowhere safe to write while the TUI is up.
            Err(_) => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }

    builder.init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn leading_minus_is_an_expression() {
        let cli = Cli::try_parse_from(["cybercalc", "-5+3"]).unwrap();
        assert_eq!(cli.expression.as_deref(), Some("-5+3"));

        let cli = Cli::try_parse_from(["cybercalc", "-(2+3)*4"]).unwrap();
        assert_eq!(cli.expression.as_deref(), Some("-(2+3)*4"));
    }

    #[test]
    fn flags_still_parse() {
        let cli = Cli::try_parse_from(["cybercalc", "-vv", "--no-persist"]).unwrap();
        assert_eq!(cli.expression, None);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_persist);
    }
}
