use crate::i2c::I2cBus;
use crate::lcd::config::{CursorPosition, DisplayGeometry, LcdConfig, TextDirection};
use crate::lcd::display::CharacterDisplay;
use crate::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};
use crate::{LcdError, LcdResult};
use log::{debug, warn};
use std::thread::sleep;
use std::time::Duration;

/// Glyph the content buffer is filled with after a clear.
const BLANK: u8 = b' ';

/// Settle time after each step of the power-on sequence.
const INIT_SETTLE: Duration = Duration::from_millis(5);
/// The clear command takes a while on real hardware; nothing may follow it sooner.
const CLEAR_DELAY: Duration = Duration::from_millis(2);
const ADDRESS_SETTLE: Duration = Duration::from_micros(50);

/// A display that has been configured but not brought up yet.
///
/// The controller powers up in an unknown state, so the only thing that can be done with it is
/// [LcdUninit::initialize], which consumes it and returns the usable [CharLcd].
#[derive(Debug)]
pub struct LcdUninit<'a> {
    driver: I2cHD44780Driver<'a>,
    geometry: DisplayGeometry,
    text_direction: TextDirection,
    auto_linebreaks: bool,
}

impl<'a> LcdUninit<'a> {
    /// Validates `config` and binds the display to `bus`. Nothing is sent yet.
    pub fn new(bus: &'a mut dyn I2cBus, config: &LcdConfig) -> LcdResult<Self> {
        let geometry = config.geometry()?;
        Ok(LcdUninit {
            driver: I2cHD44780Driver::new(bus, config.backlight),
            geometry,
            text_direction: config.text_direction,
            auto_linebreaks: config.auto_linebreaks,
        })
    }

    /// Runs the power-on sequence.
    ///
    /// The first command is sent as if the controller were in 8-bit mode (`0011` twice), which
    /// flushes any half-received nibble, and the second one switches it to 4-bit mode. After that
    /// come function set, display control and a clear.
    pub fn initialize(self) -> LcdResult<CharLcd<'a>> {
        let geometry = self.geometry;
        debug!(
            "Initializing {}x{} LCD ({:?})...",
            geometry.rows(),
            geometry.cols(),
            geometry.dot_format()
        );

        let mut lcd = CharLcd {
            driver: self.driver,
            geometry,
            content: vec![vec![BLANK; geometry.cols()]; geometry.rows()],
            row: 0,
            col: 0,
            text_direction: self.text_direction,
            auto_linebreaks: self.auto_linebreaks,
            recent_auto_linebreak: false,
            swallowed_line_ending: None,
        };

        // Synchronize
        lcd.driver.send_command(0b00110011)?;
        sleep(INIT_SETTLE);
        lcd.driver.send_command(0b00110010)?;
        sleep(INIT_SETTLE);

        lcd.driver.function_set(false, true, geometry.dot_format())?;
        sleep(INIT_SETTLE);
        lcd.driver.set_display_control(true, false, false)?;
        sleep(INIT_SETTLE);
        lcd.clear()?;

        debug!("{:?} initialized.", lcd.driver);
        Ok(lcd)
    }
}

/// Character LCD with a shadow copy of its contents.
///
/// Tracks the cursor and every cell's character, so writing a character that is already shown
/// costs a cursor move instead of a data write, and wraps the cursor at the end of a line when
/// auto-linebreaks are on.
#[derive(Debug)]
pub struct CharLcd<'a> {
    driver: I2cHD44780Driver<'a>,
    geometry: DisplayGeometry,
    content: Vec<Vec<u8>>,
    row: usize,
    // Signed, as with auto-linebreaks off the cursor may run past either edge.
    col: isize,
    text_direction: TextDirection,
    auto_linebreaks: bool,
    recent_auto_linebreak: bool,
    swallowed_line_ending: Option<char>,
}

impl<'a> CharLcd<'a> {
    /// Validates `config` and initializes the display in one go.
    pub fn new(bus: &'a mut dyn I2cBus, config: &LcdConfig) -> LcdResult<Self> {
        LcdUninit::new(bus, config)?.initialize()
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    /// The cursor, or `None` if it ran off the edge of the display (only possible with
    /// auto-linebreaks disabled).
    pub fn cursor(&self) -> Option<CursorPosition> {
        let col = usize::try_from(self.col).ok()?;
        self.geometry
            .contains(self.row, col)
            .then(|| CursorPosition::new(self.row, col))
    }

    /// Whether the last character write wrapped the cursor onto another line.
    pub fn recent_auto_linebreak(&self) -> bool {
        self.recent_auto_linebreak
    }

    pub fn auto_linebreaks(&self) -> bool {
        self.auto_linebreaks
    }

    pub fn set_auto_linebreaks(&mut self, enabled: bool) {
        self.auto_linebreaks = enabled;
    }

    pub fn text_direction(&self) -> TextDirection {
        self.text_direction
    }

    /// Changes the text direction, including the controller's own address increment.
    pub fn set_text_direction(&mut self, direction: TextDirection) -> LcdResult<()> {
        self.driver.set_entry_mode(direction, false)?;
        self.text_direction = direction;
        Ok(())
    }

    pub fn backlight(&self) -> bool {
        self.driver.backlight()
    }

    /// Switches the backlight. The bit only travels with a transaction, so a no-op command
    /// (`0x00`) is sent to carry it.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<()> {
        self.driver.set_backlight(on);
        self.driver.send_command(0x00)
    }

    pub fn toggle_backlight(&mut self) -> LcdResult<()> {
        let on = !self.driver.backlight();
        debug!("Turning backlight {}", if on { "on" } else { "off" });
        self.set_backlight(on)
    }

    /// Clears the display, homes the cursor and blanks the content buffer.
    ///
    /// The controller's clear also resets its entry mode to incrementing, so the text direction is
    /// sent again afterwards.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.driver.clear_display()?;
        self.row = 0;
        self.col = 0;
        for line in &mut self.content {
            line.fill(BLANK);
        }
        self.recent_auto_linebreak = false;
        self.swallowed_line_ending = None;
        sleep(CLEAR_DELAY);
        self.driver.set_entry_mode(self.text_direction, false)
    }

    /// Moves the cursor to `(row, col)`.
    ///
    /// A line ending written after this is never swallowed, even if the last character wrapped.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()> {
        if !self.geometry.contains(row, col) {
            return Err(LcdError::InvalidPosition { row, col });
        }
        self.move_to(row, col as isize)?;
        self.recent_auto_linebreak = false;
        self.swallowed_line_ending = None;
        Ok(())
    }

    pub fn home(&mut self) -> LcdResult<()> {
        self.set_cursor(0, 0)
    }

    /// The character code last written to a cell, if the cell exists.
    pub fn cell(&self, row: usize, col: usize) -> Option<u8> {
        self.content.get(row)?.get(col).copied()
    }

    /// Writes a raw character code at the cursor and advances it.
    ///
    /// If the cell already shows `code`, nothing is written and the controller's cursor is moved
    /// explicitly instead. Otherwise the controller advances its cursor by itself, and only the
    /// model is updated.
    pub fn write_code(&mut self, code: u8) -> LcdResult<()> {
        let (row, col) = (self.row, self.col);

        let cell = usize::try_from(col)
            .ok()
            .filter(|&col| self.geometry.contains(row, col));
        let unchanged = match cell {
            Some(col) if self.content[row][col] == code => true,
            Some(col) => {
                self.driver.send_data(code)?;
                self.content[row][col] = code;
                false
            }
            None if self.auto_linebreaks => {
                return Err(LcdError::PositionOutOfRange {
                    row: row as isize,
                    col,
                });
            }
            None => {
                self.driver.send_data(code)?;
                false
            }
        };

        let (next_row, next_col, wrapped) = self.next_position(row, col);
        self.recent_auto_linebreak = wrapped;
        self.swallowed_line_ending = None;

        if unchanged {
            self.move_to(next_row, next_col)
        } else {
            self.row = next_row;
            self.col = next_col;
            Ok(())
        }
    }

    /// Writes a character at the cursor.
    ///
    /// `'\n'` moves a row down and `'\r'` to the start of the row, like a terminal. Right after an
    /// auto-linebreak the cursor already sits on a fresh line, so a line ending (`"\n"`, `"\r\n"`
    /// or `"\n\r"`) is swallowed instead of skipping a line. Anything that isn't printable ASCII
    /// is shown as `?`.
    pub fn write_char(&mut self, c: char) -> LcdResult<()> {
        match c {
            '\n' | '\r' => self.line_ending(c),
            ' '..='~' => self.write_code(c as u8),
            _ => {
                warn!("Non-ASCII character: {:?}", c);
                self.write_code(b'?')
            }
        }
    }

    pub fn write_str(&mut self, text: &str) -> LcdResult<()> {
        for c in text.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Moves to `(row, col)` and writes `text` from there.
    pub fn write_at(&mut self, row: usize, col: usize, text: &str) -> LcdResult<()> {
        self.set_cursor(row, col)?;
        self.write_str(text)
    }

    /// Renders the content buffer, one line per row. Does not touch the bus.
    pub fn render_to_text(&self) -> String {
        self.content
            .iter()
            .map(|line| {
                line.iter()
                    .map(|&code| match code {
                        b' '..=b'~' => code as char,
                        _ => '?',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line_ending(&mut self, c: char) -> LcdResult<()> {
        if self.recent_auto_linebreak {
            self.recent_auto_linebreak = false;
            self.swallowed_line_ending = Some(c);
            return Ok(());
        }
        if let Some(swallowed) = self.swallowed_line_ending.take() {
            if swallowed != c {
                // Second half of a CR LF pair that followed an auto-linebreak
                return Ok(());
            }
        }

        let rows = self.geometry.rows();
        let (row, col) = match c {
            '\n' => ((self.row + 1) % rows, self.col),
            _ => match self.text_direction {
                TextDirection::LeftToRight => (self.row, 0),
                TextDirection::RightToLeft => (self.row, self.geometry.cols() as isize - 1),
            },
        };
        self.move_to(row, col)
    }

    /// Where the cursor goes after a write at `(row, col)`, and whether that is an auto-linebreak.
    fn next_position(&self, row: usize, col: isize) -> (usize, isize, bool) {
        let rows = self.geometry.rows();
        let last_col = self.geometry.cols() as isize - 1;
        let next_row = if row < rows - 1 { row + 1 } else { 0 };

        match self.text_direction {
            TextDirection::LeftToRight => {
                if !self.auto_linebreaks || col < last_col {
                    (row, col + 1, false)
                } else {
                    (next_row, 0, true)
                }
            }
            TextDirection::RightToLeft => {
                if !self.auto_linebreaks || col > 0 {
                    (row, col - 1, false)
                } else {
                    (next_row, last_col, true)
                }
            }
        }
    }

    /// Points the controller at `(row, col)` and updates the model.
    ///
    /// Off-grid columns are sent as the address the controller's own increment would have reached,
    /// wrapped into the 7-bit DDRAM address space.
    fn move_to(&mut self, row: usize, col: isize) -> LcdResult<()> {
        let address = (self.geometry.row_offset(row) as isize + col).rem_euclid(0x80) as u8;
        self.driver.set_ddram_address(address)?;
        sleep(ADDRESS_SETTLE);
        self.row = row;
        self.col = col;
        Ok(())
    }
}

impl CharacterDisplay for CharLcd<'_> {
    fn clear(&mut self) -> LcdResult<()> {
        CharLcd::clear(self)
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()> {
        CharLcd::set_cursor(self, row, col)
    }

    fn write_char(&mut self, c: char) -> LcdResult<()> {
        CharLcd::write_char(self, c)
    }

    fn toggle_backlight(&mut self) -> LcdResult<()> {
        CharLcd::toggle_backlight(self)
    }

    fn render_to_text(&self) -> String {
        CharLcd::render_to_text(self)
    }
}
