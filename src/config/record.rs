//! Reading-display configuration record.
//!
//! This is the document stored as `readConfig.json` inside a bundle. Field
//! names follow the camelCase keys used by existing bundles; any key not
//! modelled here (text size, spacing, padding, ...) is carried through
//! untouched in [`ConfigRecord::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Background type discriminant meaning "custom image file".
pub const BG_TYPE_IMAGE: i32 = 2;

/// How a display mode's background string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgType {
    /// `bgStr` is a hex color such as `#EEEEEE`.
    Color,
    /// `bgStr` names a built-in background asset.
    Asset,
    /// `bgStr` is an absolute path to an image file.
    Image,
}

impl BgType {
    /// Map a raw discriminant to a type. Unknown values are treated as colors.
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Asset,
            BG_TYPE_IMAGE => Self::Image,
            _ => Self::Color,
        }
    }

    /// Raw discriminant as stored in the document.
    pub const fn raw(self) -> i32 {
        match self {
            Self::Color => 0,
            Self::Asset => 1,
            Self::Image => BG_TYPE_IMAGE,
        }
    }
}

/// Display modes that carry their own text color and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Day,
    Night,
    EInk,
}

impl DisplayMode {
    pub const ALL: [Self; 3] = [Self::Day, Self::Night, Self::EInk];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::EInk => "eink",
        }
    }
}

fn default_bg_str() -> String {
    "#EEEEEE".to_string()
}

fn default_bg_str_night() -> String {
    "#000000".to_string()
}

fn default_bg_str_eink() -> String {
    "#FFFFFF".to_string()
}

fn default_text_color() -> String {
    "#3E3D3B".to_string()
}

fn default_text_color_night() -> String {
    "#ADADAD".to_string()
}

fn default_text_color_eink() -> String {
    "#000000".to_string()
}

const fn default_true() -> bool {
    true
}

/// A reading-display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    /// Style label; may be empty.
    #[serde(default)]
    pub name: String,

    #[serde(default = "default_bg_str")]
    pub bg_str: String,
    #[serde(default = "default_bg_str_night")]
    pub bg_str_night: String,
    #[serde(default = "default_bg_str_eink", rename = "bgStrEInk")]
    pub bg_str_eink: String,

    #[serde(default)]
    pub bg_type: i32,
    #[serde(default)]
    pub bg_type_night: i32,
    #[serde(default, rename = "bgTypeEInk")]
    pub bg_type_eink: i32,

    #[serde(default = "default_true")]
    pub dark_status_icon: bool,
    #[serde(default)]
    pub dark_status_icon_night: bool,
    #[serde(default = "default_true", rename = "darkStatusIconEInk")]
    pub dark_status_icon_eink: bool,

    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_text_color_night")]
    pub text_color_night: String,
    #[serde(default = "default_text_color_eink", rename = "textColorEInk")]
    pub text_color_eink: String,

    /// Path of a custom font file; empty means the system font.
    #[serde(default, alias = "fontPath")]
    pub text_font: String,

    /// Layout fields this engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            bg_str: default_bg_str(),
            bg_str_night: default_bg_str_night(),
            bg_str_eink: default_bg_str_eink(),
            bg_type: 0,
            bg_type_night: 0,
            bg_type_eink: 0,
            dark_status_icon: true,
            dark_status_icon_night: false,
            dark_status_icon_eink: true,
            text_color: default_text_color(),
            text_color_night: default_text_color_night(),
            text_color_eink: default_text_color_eink(),
            text_font: String::new(),
            extra: Map::new(),
        }
    }
}

impl ConfigRecord {
    /// Create a record with the given name and default colors.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Background type and string for a display mode.
    pub fn background(&self, mode: DisplayMode) -> (BgType, &str) {
        match mode {
            DisplayMode::Day => (BgType::from_raw(self.bg_type), &self.bg_str),
            DisplayMode::Night => (BgType::from_raw(self.bg_type_night), &self.bg_str_night),
            DisplayMode::EInk => (BgType::from_raw(self.bg_type_eink), &self.bg_str_eink),
        }
    }

    /// Raw background discriminant for a display mode.
    pub const fn bg_type_raw(&self, mode: DisplayMode) -> i32 {
        match mode {
            DisplayMode::Day => self.bg_type,
            DisplayMode::Night => self.bg_type_night,
            DisplayMode::EInk => self.bg_type_eink,
        }
    }

    /// Set the background of a display mode.
    pub fn set_background(&mut self, mode: DisplayMode, ty: BgType, value: impl Into<String>) {
        let value = value.into();
        match mode {
            DisplayMode::Day => {
                self.bg_type = ty.raw();
                self.bg_str = value;
            }
            DisplayMode::Night => {
                self.bg_type_night = ty.raw();
                self.bg_str_night = value;
            }
            DisplayMode::EInk => {
                self.bg_type_eink = ty.raw();
                self.bg_str_eink = value;
            }
        }
    }

    /// Mutable reference to a mode's background string.
    pub fn bg_str_mut(&mut self, mode: DisplayMode) -> &mut String {
        match mode {
            DisplayMode::Day => &mut self.bg_str,
            DisplayMode::Night => &mut self.bg_str_night,
            DisplayMode::EInk => &mut self.bg_str_eink,
        }
    }

    /// Text color of a display mode.
    pub fn text_color(&self, mode: DisplayMode) -> &str {
        match mode {
            DisplayMode::Day => &self.text_color,
            DisplayMode::Night => &self.text_color_night,
            DisplayMode::EInk => &self.text_color_eink,
        }
    }

    pub fn set_text_color(&mut self, mode: DisplayMode, color: impl Into<String>) {
        let color = color.into();
        match mode {
            DisplayMode::Day => self.text_color = color,
            DisplayMode::Night => self.text_color_night = color,
            DisplayMode::EInk => self.text_color_eink = color,
        }
    }

    /// Name used for display and export, falling back when blank.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { fallback } else { &self.name }
    }

    /// Serialize to the settings document format.
    pub fn to_document(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a settings document.
    pub fn from_document(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Check a `#RRGGBB` or `#AARRGGBB` color string.
pub fn is_valid_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
