use crate::lcd::display::CharacterDisplay;
use crate::{GpioInput, LcdResult};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::Duration;

/// Holds every character back until a switch reads active.
///
/// Used to pace a message by hand: with the switch off, writing blocks, polling the switch every
/// [SwitchGatedDisplay::poll_interval].
pub struct SwitchGatedDisplay<'a> {
    inner: &'a mut dyn CharacterDisplay,
    switch: &'a dyn GpioInput,
    pub poll_interval: Duration,
}

impl<'a> SwitchGatedDisplay<'a> {
    pub fn new(inner: &'a mut dyn CharacterDisplay, switch: &'a dyn GpioInput) -> Self {
        Self {
            inner,
            switch,
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Blocks until the switch reads active.
    pub fn wait_for_switch(&self) -> LcdResult<()> {
        if self.switch.read()? {
            return Ok(());
        }
        debug!("Waiting for {:?}...", self.switch);
        while !self.switch.read()? {
            sleep(self.poll_interval);
        }
        Ok(())
    }
}

impl Debug for SwitchGatedDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(gated by {:?})", self.inner, self.switch)
    }
}

impl CharacterDisplay for SwitchGatedDisplay<'_> {
    fn clear(&mut self) -> LcdResult<()> {
        self.inner.clear()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()> {
        self.inner.set_cursor(row, col)
    }

    fn write_char(&mut self, c: char) -> LcdResult<()> {
        self.wait_for_switch()?;
        self.inner.write_char(c)
    }

    fn toggle_backlight(&mut self) -> LcdResult<()> {
        self.inner.toggle_backlight()
    }

    fn render_to_text(&self) -> String {
        self.inner.render_to_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::mock::MockBus;
    use crate::lcd::config::LcdConfig;
    use crate::lcd::display::CharLcd;
    use crate::peripheral::mock::{MockInput, MockOutput};
    use crate::peripheral::{BeepLength, BuzzerDisplay};

    #[test]
    fn waits_until_switch_is_active() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        probe.reset();
        let switch = MockInput::new(&[false, false, true]);

        let mut display =
            SwitchGatedDisplay::new(&mut lcd, &switch).with_poll_interval(Duration::ZERO);
        display.write_char('A').unwrap();

        assert_eq!(*switch.reads.borrow(), 3);
        assert_eq!(probe.data(), vec![b'A']);
    }

    #[test]
    fn open_switch_reads_once_per_character() {
        let mut bus = MockBus::new();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        let switch = MockInput::new(&[true]);

        let mut display = SwitchGatedDisplay::new(&mut lcd, &switch);
        display.write_str("abc").unwrap();
        display.set_cursor(1, 0).unwrap();

        assert_eq!(*switch.reads.borrow(), 3);
    }

    #[test]
    fn decorators_stack() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        probe.reset();
        let buzzer = MockOutput::default();
        let switch = MockInput::new(&[true]);

        {
            let mut buzzing = BuzzerDisplay::new(&mut lcd, &buzzer)
                .unwrap()
                .with_beep_length(BeepLength::Fixed(Duration::ZERO));
            let mut display = SwitchGatedDisplay::new(&mut buzzing, &switch);
            display.write_str("ok").unwrap();
        }

        assert_eq!(*switch.reads.borrow(), 2);
        assert_eq!(buzzer.writes.borrow().iter().filter(|&&on| on).count(), 2);
        assert_eq!(probe.data(), b"ok".to_vec());
        assert_eq!(lcd.render_to_text().lines().next(), Some("ok              "));
    }
}
