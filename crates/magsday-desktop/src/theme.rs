//! Theme configuration for the desktop app

use magsday_core::models::Theme;

/// Color palette for the application
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub bg_card: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub error: &'static str,
    pub success: &'static str,
}

/// Light theme colors
pub const LIGHT_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#eef2f7",
    bg_secondary: "#ffffff",
    bg_card: "rgba(255, 255, 255, 0.75)",
    text_primary: "#1a1a1a",
    text_secondary: "#5f6368",
    text_muted: "#9aa0a6",
    border: "#dadce0",
    accent: "#3b82f6",
    accent_text: "#ffffff",
    error: "#dc2626",
    success: "#16a34a",
};

/// Dark theme colors
pub const DARK_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#111318",
    bg_secondary: "#1f2229",
    bg_card: "rgba(255, 255, 255, 0.08)",
    text_primary: "#f1f3f4",
    text_secondary: "#9aa0a6",
    text_muted: "#5f6368",
    border: "rgba(255, 255, 255, 0.18)",
    accent: "#60a5fa",
    accent_text: "#111318",
    error: "#f87171",
    success: "#4ade80",
};

#[must_use]
pub const fn palette(theme: Theme) -> &'static ColorPalette {
    match theme {
        Theme::Light => &LIGHT_PALETTE,
        Theme::Dark => &DARK_PALETTE,
    }
}

/// Inline style for a card container.
#[must_use]
pub fn card_style(colors: &ColorPalette) -> String {
    format!(
        "background: {}; border: 1px solid {}; border-radius: 16px; padding: 16px; margin-bottom: 16px;",
        colors.bg_card, colors.border
    )
}

/// Inline style for text inputs.
#[must_use]
pub fn input_style(colors: &ColorPalette) -> String {
    format!(
        "width: 100%; box-sizing: border-box; padding: 8px 10px; margin-top: 4px; \
         background: {}; color: {}; border: 1px solid {}; border-radius: 8px;",
        colors.bg_secondary, colors.text_primary, colors.border
    )
}

/// Inline style for the primary action button.
#[must_use]
pub fn button_style(colors: &ColorPalette) -> String {
    format!(
        "padding: 8px 14px; background: {}; color: {}; border: none; border-radius: 8px; \
         font-weight: 600; cursor: pointer;",
        colors.accent, colors.accent_text
    )
}
