//! Driver for HD44780 character LCDs wired through a PCF8574 I2C backpack, plus the few GPIO
//! peripherals (buzzer, gate switch) that sit next to the display.
//!
//! The interesting part lives in [lcd::display]: [CharLcd](lcd::display::CharLcd) keeps a shadow
//! copy of the screen and a cursor model, and turns text into the minimal stream of 4-bit bus
//! transactions. Everything below it ([lcd::hd44780], [i2c]) is plumbing.

pub mod gpiod;
pub mod i2c;
pub mod lcd;
pub mod peripheral;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("cursor position ({row}, {col}) is outside of the display")]
    InvalidPosition { row: usize, col: usize },
    #[error("write at ({row}, {col}) is outside of the content buffer")]
    PositionOutOfRange { row: isize, col: isize },
    #[error("invalid argument")]
    InvalidArgument,
    #[error("transport error: {0}")]
    Transport(std::io::ErrorKind),
    #[error("GPIO error: {0}")]
    Gpio(String),
}

impl From<std::io::Error> for LcdError {
    fn from(err: std::io::Error) -> Self {
        LcdError::Transport(err.kind())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;

/// Specifies the active level of a GPIO pin.
///
/// By default, the active level is high. The buzzer on the cake board is wired active low.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum GpioActiveLevel {
    #[default] High,
    Low,
}

impl GpioActiveLevel {
    /// Gets the real state that will be outputted on the GPIO pin based on the active level and the value.
    pub fn get_state(&self, value: bool) -> bool {
        match self {
            GpioActiveLevel::High => value,
            GpioActiveLevel::Low => !value,
        }
    }
}

pub trait GpioInput: Debug {
    /// Reads the logical state of the GPIO pin (`true` is active).
    fn read(&self) -> LcdResult<bool>;
}

pub trait GpioOutput: Debug {
    /// Writes the logical state of the GPIO pin (`true` is active).
    fn write(&self, value: bool) -> LcdResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_level_inverts_low() {
        assert!(GpioActiveLevel::High.get_state(true));
        assert!(!GpioActiveLevel::Low.get_state(true));
        assert!(GpioActiveLevel::Low.get_state(false));
    }

    #[test]
    fn io_errors_become_transport_errors() {
        let err: LcdError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert_eq!(err, LcdError::Transport(std::io::ErrorKind::BrokenPipe));
    }
}
