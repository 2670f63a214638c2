use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_MAX_ITEMS;
use crate::themes::Theme;

pub const DATA_DIR_ENV: &str = "CYBERCALC_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub max_history: usize,
    pub persist_history: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            theme: Theme::default(),
            max_history: DEFAULT_MAX_ITEMS,
            persist_history: true,
        }
    }
}

impl Settings {
    /// Missing file gives defaults; a broken one is logged and ignored.
    pub fn load(path: &Path) -> Settings {
        if !path.exists() {
            return Settings::default();
        }
        match read(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings: {:#}", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }
}

fn read(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Files kept in the data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub root: PathBuf,
    pub settings: PathBuf,
    pub history: PathBuf,
    pub log: PathBuf,
}

impl Paths {
    pub fn new(root: PathBuf) -> Paths {
        Paths {
            settings: root.join("settings.json"),
            history: root.join("history.json"),
            log: root.join("cybercalc.log"),
            root,
        }
    }

    /// `explicit`, then `$CYBERCALC_HOME`, then `$HOME/.cybercalc`, then
    /// `./.cybercalc`.
    pub fn resolve(explicit: Option<PathBuf>) -> Paths {
        Paths::new(resolve_root(
            explicit,
            std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        ))
    }
}

fn resolve_root(explicit: Option<PathBuf>, env_dir: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    explicit
        .or(env_dir)
        .or_else(|| home.map(|h| h.join(".cybercalc")))
        .unwrap_or_else(|| PathBuf::from(".cybercalc"))
}
