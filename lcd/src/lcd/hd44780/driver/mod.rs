mod i2c;

use crate::lcd::config::{DotFormat, TextDirection};
use crate::{LcdError, LcdResult};
pub use i2c::*;
use std::fmt::Debug;

/// Low-level HD44780 command set.
///
/// The helpers only compose the command byte; implementations provide [HD44780Driver::send_command]
/// and [HD44780Driver::send_data], which own the timing.
pub trait HD44780Driver: Debug {
    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(0b00000001)
    }

    /// Sets the direction the address counter moves after each data write.
    fn set_entry_mode(&mut self, direction: TextDirection, shift: bool) -> LcdResult<()> {
        let mut command = 0b00000100;
        if direction == TextDirection::LeftToRight {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> LcdResult<()> {
        let mut command = 0b00001000;
        if display_on {
            command |= 0b00000100;
        }
        if cursor_on {
            command |= 0b00000010;
        }
        if blink_on {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the data length, the number of lines and the font.
    fn function_set(
        &mut self,
        eight_bit: bool,
        two_lines: bool,
        dot_format: DotFormat,
    ) -> LcdResult<()> {
        let mut command = 0b00100000;
        if eight_bit {
            command |= 0b00010000;
        }
        if two_lines {
            command |= 0b00001000;
        }
        if dot_format == DotFormat::Dots5x10 {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets the DDRAM address, i.e. where the next data byte lands.
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b01111111 {
            return Err(LcdError::InvalidArgument);
        }
        let command = 0b10000000 | address;
        self.send_command(command)
    }

    /// Whether the backlight bit is currently merged into every frame.
    fn backlight(&self) -> bool;

    /// Sets the backlight bit. Takes effect with the next transaction, nothing is sent here.
    fn set_backlight(&mut self, on: bool);

    // Low-level commands, implemented by the transport.

    /// Sends a command to the HD44780 controller (RS = 0).
    fn send_command(&mut self, command: u8) -> LcdResult<()>;

    /// Sends data to the HD44780 controller (RS = 1).
    fn send_data(&mut self, data: u8) -> LcdResult<()>;
}
