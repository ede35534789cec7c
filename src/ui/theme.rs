use ratatui::style::{Color, Modifier, Style};

use crate::core::config::ThemeConfig;
use crate::ui::ColorTag;

#[derive(Debug, Clone)]
pub struct Theme {
    pub user_style: Style,
    pub assistant_style: Style,
    pub system_style: Style,
    pub text_style: Style,
    pub border_style: Style,
    pub title_style: Style,
    pub status_style: Style,
    pub disabled_input_style: Style,
    pub picker_highlight_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    /// Colours that fail to parse fall back to the built-in ones.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = ThemeConfig::default();
        let color = |value: &str, fallback: &str| {
            parse_hex_color(value)
                .or_else(|| parse_hex_color(fallback))
                .unwrap_or(Color::Reset)
        };
        let user = color(&config.user, &defaults.user);
        let assistant = color(&config.assistant, &defaults.assistant);
        let system = color(&config.system, &defaults.system);
        let text = color(&config.text, &defaults.text);

        Self {
            user_style: Style::default().fg(user).add_modifier(Modifier::BOLD),
            assistant_style: Style::default().fg(assistant).add_modifier(Modifier::BOLD),
            system_style: Style::default().fg(system),
            text_style: Style::default().fg(text),
            border_style: Style::default().fg(Color::DarkGray),
            title_style: Style::default().fg(text).add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::DarkGray),
            disabled_input_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            picker_highlight_style: Style::default().fg(user).add_modifier(Modifier::REVERSED),
        }
    }

    pub fn sender_style(&self, tag: ColorTag) -> Style {
        match tag {
            ColorTag::User => self.user_style,
            ColorTag::Assistant => self.assistant_style,
            ColorTag::System => self.system_style,
        }
    }

    /// System lines are tinted throughout; other messages use the text colour.
    pub fn body_style(&self, tag: ColorTag) -> Style {
        match tag {
            ColorTag::System => self.system_style,
            ColorTag::User | ColorTag::Assistant => self.text_style,
        }
    }
}

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => Some(Color::Rgb(
            channel(&hex[0..1].repeat(2))?,
            channel(&hex[1..2].repeat(2))?,
            channel(&hex[2..3].repeat(2))?,
        )),
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}
