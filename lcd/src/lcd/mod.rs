//! Character LCD support: the raw HD44780 command layer and the display model on top of it.

pub mod config;
pub mod display;
pub mod hd44780;
