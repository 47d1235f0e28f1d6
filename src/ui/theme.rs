use ratatui::style::Color;

// Small fixed palette; prefer adding roles here over scattering colors
// through the render code.
pub const FG: Color = Color::Rgb(229, 231, 235);
pub const MUTED: Color = Color::Rgb(156, 163, 175);
pub const DIM: Color = Color::Rgb(107, 114, 128);

pub const TITLE: Color = Color::Rgb(103, 232, 249);
pub const SELECTED: Color = Color::Rgb(250, 204, 21);

pub const SUCCESS: Color = Color::Rgb(134, 239, 172);
pub const ERROR: Color = Color::Rgb(248, 113, 113);
