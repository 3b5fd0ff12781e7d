//! Peripherals that hook into the display's write path.
//!
//! Each one is a [CharacterDisplay](crate::lcd::display::CharacterDisplay) wrapping another one, so
//! they can be stacked in any order around a [CharLcd](crate::lcd::display::CharLcd).

mod buzzer;
mod switch;

pub use buzzer::*;
pub use switch::*;
