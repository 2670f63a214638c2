use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cyber,
    Dark,
    Light,
    Nord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg_primary: Rgb,
    pub bg_secondary: Rgb,
    pub bg_tertiary: Rgb,
    pub accent_primary: Rgb,
    pub accent_secondary: Rgb,
    pub accent_danger: Rgb,
    pub text_primary: Rgb,
    pub text_secondary: Rgb,
    /// Primary accent at 20% over the primary background.
    pub border: Rgb,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown theme: {0} (available: cyber, dark, light, nord)")]
pub struct UnknownTheme(pub String);

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Cyber, Theme::Dark, Theme::Light, Theme::Nord];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Cyber => "cyber",
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::Nord => "nord",
        }
    }

    pub fn next(self) -> Theme {
        let idx = Theme::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Cyber => Palette {
                bg_primary: (0x0a, 0x0e, 0x27),
                bg_secondary: (0x15, 0x19, 0x32),
                bg_tertiary: (0x1e, 0x25, 0x42),
                accent_primary: (0x00, 0xff, 0x88),
                accent_secondary: (0x00, 0xd4, 0xff),
                accent_danger: (0xff, 0x47, 0x57),
                text_primary: (0xff, 0xff, 0xff),
                text_secondary: (0xa0, 0xa8, 0xc0),
                border: (8, 62, 58),
            },
            Theme::Dark => Palette {
                bg_primary: (0x1a, 0x1a, 0x2e),
                bg_secondary: (0x16, 0x21, 0x3e),
                bg_tertiary: (0x0f, 0x34, 0x60),
                accent_primary: (0xe9, 0x45, 0x60),
                accent_secondary: (0xf3, 0x9c, 0x12),
                accent_danger: (0xe7, 0x4c, 0x3c),
                text_primary: (0xff, 0xff, 0xff),
                text_secondary: (0xbd, 0xc3, 0xc7),
                border: (67, 35, 56),
            },
            Theme::Light => Palette {
                bg_primary: (0xf0, 0xf0, 0xf0),
                bg_secondary: (0xff, 0xff, 0xff),
                bg_tertiary: (0xe8, 0xe8, 0xe8),
                accent_primary: (0x34, 0x98, 0xdb),
                accent_secondary: (0x9b, 0x59, 0xb6),
                accent_danger: (0xe7, 0x4c, 0x3c),
                text_primary: (0x2c, 0x3e, 0x50),
                text_secondary: (0x7f, 0x8c, 0x8d),
                border: (202, 222, 236),
            },
            Theme::Nord => Palette {
                bg_primary: (0x2e, 0x34, 0x40),
                bg_secondary: (0x3b, 0x42, 0x52),
                bg_tertiary: (0x43, 0x4c, 0x5e),
                accent_primary: (0x88, 0xc0, 0xd0),
                accent_secondary: (0x81, 0xa1, 0xc1),
                accent_danger: (0xbf, 0x61, 0x6a),
                text_primary: (0xec, 0xef, 0xf4),
                text_secondary: (0xd8, 0xde, 0xe9),
                border: (64, 80, 93),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| UnknownTheme(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_case_insensitively() {
        for theme in Theme::ALL {
            assert_eq!(theme.name().parse::<Theme>(), Ok(theme));
        }
        assert_eq!("NORD".parse::<Theme>(), Ok(Theme::Nord));
        assert_eq!(" light ".parse::<Theme>(), Ok(Theme::Light));
    }

    #[test]
    fn unknown_theme_lists_choices() {
        let err = "solarized".parse::<Theme>().unwrap_err();
        assert_eq!(err, UnknownTheme("solarized".into()));
        assert!(err.to_string().contains("cyber, dark, light, nord"));
    }

    #[test]
    fn next_cycles_through_all() {
        let mut theme = Theme::default();
        assert_eq!(theme, Theme::Cyber);
        for _ in 0..Theme::ALL.len() {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Cyber);
        assert_eq!(Theme::Nord.next(), Theme::Cyber);
    }

    #[test]
    fn palettes_differ() {
        let accents: Vec<_> = Theme::ALL.iter().map(|t| t.palette().accent_primary).collect();
        for (i, a) in accents.iter().enumerate() {
            assert!(!accents[i + 1..].contains(a));
        }
    }

    #[test]
    fn serialises_as_lowercase_name() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let theme: Theme = serde_json::from_str("\"nord\"").unwrap();
        assert_eq!(theme, Theme::Nord);
    }
}
