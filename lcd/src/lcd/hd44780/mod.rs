//! HD44780 LCD module.
//!
//! Only the write path is implemented: the I2C backpack ties R/W to ground, so the busy flag and
//! DDRAM contents can't be read back. [driver::HD44780Driver] compensates with fixed delays.

pub mod driver;
