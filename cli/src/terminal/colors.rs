use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::BrightBlue;
pub const IPV4_PREFIX: Color = Color::Blue;
pub const MAC_ADDR: Color = Color::Magenta;
pub const PORT: Color = Color::Cyan;
pub const HOSTNAME: Color = Color::BrightWhite;

pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const FAILURE: Color = Color::Red;
