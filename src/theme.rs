use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub playing: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "dark",
    bg: Color::Rgb(9, 9, 11),
    fg: Color::Rgb(250, 250, 250),
    accent: Color::Rgb(239, 68, 68),
    muted: Color::Rgb(113, 113, 122),
    border: Color::Rgb(39, 39, 42),
    highlight_fg: Color::Rgb(250, 250, 250),
    highlight_bg: Color::Rgb(39, 39, 42),
    stripe_bg: Color::Rgb(18, 18, 21),
    status: Color::Rgb(250, 204, 21),
    error: Color::Rgb(248, 113, 113),
    playing: Color::Rgb(74, 222, 128),
    key_fg: Color::Rgb(9, 9, 11),
    key_bg: Color::Rgb(161, 161, 170),
  },
  Theme {
    name: "light",
    bg: Color::Rgb(255, 255, 255),
    fg: Color::Rgb(9, 9, 11),
    accent: Color::Rgb(220, 38, 38),
    muted: Color::Rgb(113, 113, 122),
    border: Color::Rgb(228, 228, 231),
    highlight_fg: Color::Rgb(9, 9, 11),
    highlight_bg: Color::Rgb(244, 244, 245),
    stripe_bg: Color::Rgb(250, 250, 250),
    status: Color::Rgb(202, 138, 4),
    error: Color::Rgb(220, 38, 38),
    playing: Color::Rgb(22, 163, 74),
    key_fg: Color::Rgb(255, 255, 255),
    key_bg: Color::Rgb(82, 82, 91),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Red,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::White,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::LightRed,
    playing: Color::Green,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];

/// Index of the theme called `name`, falling back to the first one.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|name| THEMES.iter().position(|t| t.name == name)).unwrap_or(0)
}
