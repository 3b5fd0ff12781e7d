//! Geometry and construction-time settings of a character display.

use crate::{LcdError, LcdResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Character cell font.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DotFormat {
    #[default]
    Dots5x8,
    Dots5x10,
}

/// Which way the cursor advances after writing a character.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// A cell on the display, zero-based.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
}

impl CursorPosition {
    pub fn new(row: usize, col: usize) -> Self {
        CursorPosition { row, col }
    }
}

/// Size and font of a display. Immutable once validated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DisplayGeometry {
    rows: usize,
    cols: usize,
    dot_format: DotFormat,
}

impl DisplayGeometry {
    /// Cells in one DDRAM line of the controller.
    pub const MAX_COLS: usize = 40;

    /// Validates and creates the geometry. Supported row counts are 1, 2 and 4.
    pub fn new(rows: usize, cols: usize, dot_format: DotFormat) -> LcdResult<Self> {
        if !matches!(rows, 1 | 2 | 4) {
            return Err(LcdError::InvalidConfiguration(format!(
                "unsupported number of rows: {}",
                rows
            )));
        }
        if cols < 1 || cols > Self::MAX_COLS {
            return Err(LcdError::InvalidConfiguration(format!(
                "unsupported number of columns: {}",
                cols
            )));
        }
        Ok(DisplayGeometry {
            rows,
            cols,
            dot_format,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dot_format(&self) -> DotFormat {
        self.dot_format
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// DDRAM address of the first cell of `row`.
    ///
    /// Rows 2 and 3 start right after the visible part of rows 0 and 1, which is how 4-line
    /// modules are wired on top of the 2-line controller.
    pub fn row_offset(&self, row: usize) -> usize {
        [0x00, 0x40, self.cols, 0x40 + self.cols][row % 4]
    }
}

/// Everything needed to bring up one display, as found in the application config.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LcdConfig {
    /// I2C bus number, i.e. the `N` in `/dev/i2c-N`.
    pub bus: u8,
    /// 7-bit address of the backpack.
    pub address: u8,
    pub rows: usize,
    pub cols: usize,
    pub dot_format: DotFormat,
    /// Backlight state right after initialization.
    pub backlight: bool,
    pub auto_linebreaks: bool,
    pub text_direction: TextDirection,
}

impl LcdConfig {
    pub fn geometry(&self) -> LcdResult<DisplayGeometry> {
        DisplayGeometry::new(self.rows, self.cols, self.dot_format)
    }
}

impl Default for LcdConfig {
    fn default() -> Self {
        LcdConfig {
            bus: 1,
            address: 0x27,
            rows: 2,
            cols: 16,
            dot_format: DotFormat::Dots5x8,
            backlight: true,
            auto_linebreaks: true,
            text_direction: TextDirection::LeftToRight,
        }
    }
}
