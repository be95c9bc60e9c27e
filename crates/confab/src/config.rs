//! Host-supplied widget configuration.
//!
//! Supplied once at mount time and immutable afterwards. Renderers read the
//! theme color; the frontend reads everything else.

use serde::{Deserialize, Serialize};

use crate::registry::RegistryVariant;

/// RGB theme color, parsed from a `#rrggbb` string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ThemeColor {
    /// The stock green applied when the host supplies no color.
    pub const DEFAULT: ThemeColor = ThemeColor {
        r: 0x2e,
        g: 0xcc,
        b: 0x71,
    };

    /// Parse a `#rrggbb` (or bare `rrggbb`) hex string.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let v = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        })
    }
}

impl Default for ThemeColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::str::FromStr for ThemeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("`{s}` is not a #rrggbb color"))
    }
}

/// Widget configuration record.
///
/// Unrecognized host options are simply not represented; every field has the
/// platform default so a host can override only what it cares about.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Display name for locally-originated messages.
    pub user_name: String,
    /// Display name shown in the widget header.
    pub agent_name: String,
    /// Accent color for the header, buttons, and affordances.
    pub theme_color: ThemeColor,
    /// Websocket address of the remote agent platform.
    pub ws_address: String,
    /// Placeholder shown in the empty message input.
    pub input_placeholder: String,
    /// Glyph shown on the floating launcher.
    pub icon: String,
    /// Glyph shown while a reply is awaited.
    pub typing_indicator: String,
    /// Which action-kind registry this widget speaks.
    pub registry: RegistryVariant,
    /// Whether the raw-HTML kind is rendered at all. Hosts that do not trust
    /// the remote agent turn this off; the kind then resolves to nothing and
    /// such frames are dropped.
    pub allow_raw_html: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            user_name: "Guest".into(),
            agent_name: "Agent".into(),
            theme_color: ThemeColor::DEFAULT,
            ws_address: "ws://localhost:8765".into(),
            input_placeholder: "Type a message...".into(),
            icon: "\u{2738}".into(),
            typing_indicator: "\u{2026}".into(),
            registry: RegistryVariant::Full,
            allow_raw_html: true,
        }
    }
}
