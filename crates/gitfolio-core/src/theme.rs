use gitfolio_cache::CacheManager;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Preference key in the cache store
pub const THEME_PREFERENCE_KEY: &str = "theme";

/// Which palette the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Dark,
    Light,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Dark => "dark",
            ThemePreference::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(ThemePreference::Dark),
            "light" => Some(ThemePreference::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    /// The terminal's own scheme, from `COLORFGBG` ("fg;bg")
    pub fn from_ambient() -> Self {
        Self::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
    }

    fn from_colorfgbg(value: Option<&str>) -> Self {
        // Background indices 7 and 9-15 are the light ANSI colours
        let background = value
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());

        match background {
            Some(7) | Some(9..=15) => ThemePreference::Light,
            _ => ThemePreference::Dark,
        }
    }

    /// Saved preference, else the ambient scheme
    pub fn load(cache: &CacheManager) -> Self {
        match cache
            .get_preference(THEME_PREFERENCE_KEY)
            .as_deref()
            .and_then(Self::parse)
        {
            Some(pref) => pref,
            None => {
                debug!("No saved theme, following terminal");
                Self::from_ambient()
            }
        }
    }

    pub fn save(&self, cache: &CacheManager) -> crate::Result<()> {
        cache.set_preference(THEME_PREFERENCE_KEY, self.as_str())?;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemePreference::Dark => Theme::dark(),
            ThemePreference::Light => Theme::light(),
        }
    }
}

/// Color palette for the gallery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeColors {
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    pub title: Color,
    pub subtitle: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,

    pub selected_bg: Color,
    pub tag_active: Color,
    pub fork_badge: Color,

    pub stars: Color,
    pub forks: Color,
}

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                background: Color::rgb(0x1e1e2e),
                foreground: Color::rgb(0xcdd6f4),
                border: Color::rgb(0x45475a),
                border_focused: Color::rgb(0x89b4fa),

                title: Color::rgb(0xcba6f7),
                subtitle: Color::rgb(0xa6adc8),
                muted: Color::rgb(0x6c7086),
                accent: Color::rgb(0x89b4fa),
                error: Color::rgb(0xf38ba8),

                selected_bg: Color::rgb(0x313244),
                tag_active: Color::rgb(0xf5c2e7),
                fork_badge: Color::rgb(0xfab387),

                stars: Color::rgb(0xf9e2af),
                forks: Color::rgb(0x94e2d5),
            },
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                background: Color::rgb(0xeff1f5),
                foreground: Color::rgb(0x4c4f69),
                border: Color::rgb(0xbcc0cc),
                border_focused: Color::rgb(0x1e66f5),

                title: Color::rgb(0x8839ef),
                subtitle: Color::rgb(0x6c6f85),
                muted: Color::rgb(0x9ca0b0),
                accent: Color::rgb(0x1e66f5),
                error: Color::rgb(0xd20f39),

                selected_bg: Color::rgb(0xdce0e8),
                tag_active: Color::rgb(0xea76cb),
                fork_badge: Color::rgb(0xfe640b),

                stars: Color::rgb(0xdf8e1d),
                forks: Color::rgb(0x04a5e5),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_roundtrip() {
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
        assert_eq!(ThemePreference::Light.toggled().toggled(), ThemePreference::Light);
    }

    #[test]
    fn test_saved_preference_wins() {
        let cache = CacheManager::in_memory().unwrap();
        ThemePreference::Light.save(&cache).unwrap();
        assert_eq!(ThemePreference::load(&cache), ThemePreference::Light);

        ThemePreference::Light.toggled().save(&cache).unwrap();
        assert_eq!(ThemePreference::load(&cache), ThemePreference::Dark);
        assert_eq!(cache.get_preference("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_colorfgbg_detection() {
        assert_eq!(ThemePreference::from_colorfgbg(Some("15;0")), ThemePreference::Dark);
        assert_eq!(ThemePreference::from_colorfgbg(Some("0;15")), ThemePreference::Light);
        assert_eq!(ThemePreference::from_colorfgbg(Some("0;default;7")), ThemePreference::Light);
        assert_eq!(ThemePreference::from_colorfgbg(None), ThemePreference::Dark);
        assert_eq!(ThemePreference::from_colorfgbg(Some("garbage")), ThemePreference::Dark);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(0x3a5ccc).to_hex(), "#3a5ccc");
        assert_eq!(Color { r: 255, g: 0, b: 16 }, Color::rgb(0xff0010));
    }
}
