use crate::i2c::I2cBus;
use crate::lcd::hd44780::driver::HD44780Driver;
use crate::LcdResult;
use log::trace;
use std::thread::sleep;
use std::time::Duration;

/// HD44780 driver for the common PCF8574 I2C backpack.
///
/// The expander's 8 lines are wired as `D7 D6 D5 D4 BL EN RW RS`, so every nibble goes out as two
/// bus writes: one with EN high, one with EN low, which latches the nibble in the controller.
/// R/W is always low.
///
/// EN is held high for 2 ms on every nibble, commands and data alike. That is longer than anything
/// but the clear/home commands need, but without a busy flag it keeps every command safe.
#[derive(Debug)]
pub struct I2cHD44780Driver<'a> {
    bus: &'a mut dyn I2cBus,
    backlight: bool,
}

impl<'a> I2cHD44780Driver<'a> {
    pub const PIN_RS: u8 = 0b00000001;
    pub const PIN_RW: u8 = 0b00000010;
    pub const PIN_EN: u8 = 0b00000100;
    pub const PIN_BL: u8 = 0b00001000;

    const ENABLE_HOLD: Duration = Duration::from_millis(2);
    const ENABLE_RELEASE: Duration = Duration::from_micros(1);

    pub fn new(bus: &'a mut dyn I2cBus, backlight: bool) -> Self {
        I2cHD44780Driver { bus, backlight }
    }

    fn write_frame(&mut self, frame: u8) -> LcdResult<()> {
        let frame = if self.backlight {
            frame | Self::PIN_BL
        } else {
            frame & !Self::PIN_BL
        };
        trace!("Writing frame: {:08b}", frame);
        self.bus.write_byte(frame)
    }

    fn pulse_nibble(&mut self, nibble: u8, rs: bool) -> LcdResult<()> {
        let mut frame = nibble & 0xF0;
        if rs {
            frame |= Self::PIN_RS;
        }

        // Set E pin to high
        self.write_frame(frame | Self::PIN_EN)?;
        sleep(Self::ENABLE_HOLD);
        // Set E pin to low
        self.write_frame(frame)?;
        sleep(Self::ENABLE_RELEASE);
        Ok(())
    }

    fn send(&mut self, data: u8, rs: bool) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        let high_nibble = data & 0xF0;
        let low_nibble = (data & 0x0F) << 4;
        self.pulse_nibble(high_nibble, rs)?;
        self.pulse_nibble(low_nibble, rs)
    }
}

impl HD44780Driver for I2cHD44780Driver<'_> {
    fn backlight(&self) -> bool {
        self.backlight
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.send(data, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::mock::MockBus;
    use crate::lcd::config::{DotFormat, TextDirection};
    use crate::LcdError;

    type Driver<'a> = I2cHD44780Driver<'a>;

    #[test]
    fn command_is_framed_as_two_enable_pulses() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut driver = Driver::new(&mut bus, true);

        driver.send_command(0x28).unwrap();

        assert_eq!(probe.bytes(), vec![0x2C, 0x28, 0x8C, 0x88]);
    }

    #[test]
    fn data_keeps_rs_across_the_enable_edge() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut driver = Driver::new(&mut bus, true);

        driver.send_data(b'H').unwrap();

        // 'H' = 0x48
        assert_eq!(probe.bytes(), vec![0x4D, 0x49, 0x8D, 0x89]);
        for frame in probe.bytes() {
            assert_eq!(frame & Driver::PIN_RW, 0);
        }
    }

    #[test]
    fn backlight_change_applies_to_next_transaction_only() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut driver = Driver::new(&mut bus, false);

        driver.send_data(0xFF).unwrap();
        assert!(probe.bytes().iter().all(|b| b & Driver::PIN_BL == 0));

        driver.set_backlight(true);
        assert_eq!(probe.bytes().len(), 4);

        driver.send_command(0x00).unwrap();
        assert!(probe.bytes()[4..].iter().all(|b| b & Driver::PIN_BL != 0));
        assert!(driver.backlight());
    }

    #[test]
    fn command_helpers_compose_opcodes() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut driver = Driver::new(&mut bus, true);

        driver.function_set(false, true, DotFormat::Dots5x8).unwrap();
        driver.function_set(false, true, DotFormat::Dots5x10).unwrap();
        driver.set_display_control(true, false, false).unwrap();
        driver.set_entry_mode(TextDirection::LeftToRight, false).unwrap();
        driver.set_entry_mode(TextDirection::RightToLeft, false).unwrap();
        driver.set_ddram_address(0x45).unwrap();
        driver.clear_display().unwrap();

        assert_eq!(
            probe.commands(),
            vec![0x28, 0x2C, 0x0C, 0x06, 0x04, 0xC5, 0x01]
        );
    }

    #[test]
    fn ddram_address_out_of_range_is_rejected_without_traffic() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut driver = Driver::new(&mut bus, true);

        assert_eq!(driver.set_ddram_address(0x80), Err(LcdError::InvalidArgument));
        assert!(probe.bytes().is_empty());
    }

    #[test]
    fn bus_failure_propagates() {
        let mut bus = MockBus::failing_after(1);
        let mut driver = Driver::new(&mut bus, true);

        assert_eq!(
            driver.send_data(b'A'),
            Err(LcdError::Transport(std::io::ErrorKind::TimedOut))
        );
    }
}
