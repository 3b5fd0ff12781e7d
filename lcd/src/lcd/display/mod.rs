//! Display model on top of the raw HD44780 driver.
//!
//! [CharLcd] is the driver proper. [CharacterDisplay] is the write contract it shares with the
//! peripheral decorators in [crate::peripheral], so those can be stacked around it.

mod char_lcd;

use crate::LcdResult;
pub use char_lcd::*;
use std::fmt::Debug;

/// Public surface of a character display.
///
/// Decorators implement it by delegating to an inner display and adding behaviour around
/// [CharacterDisplay::write_char].
pub trait CharacterDisplay: Debug {
    /// Clears the screen and moves the cursor home.
    fn clear(&mut self) -> LcdResult<()>;

    /// Moves the cursor to `(row, col)`.
    fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()>;

    /// Writes a single character at the cursor and advances it.
    fn write_char(&mut self, c: char) -> LcdResult<()>;

    /// Writes `text` character by character.
    fn write_str(&mut self, text: &str) -> LcdResult<()> {
        for c in text.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Flips the backlight.
    fn toggle_backlight(&mut self) -> LcdResult<()>;

    /// What the display shows, one line per row.
    fn render_to_text(&self) -> String;
}
