use crate::lcd::display::CharacterDisplay;
use crate::{GpioOutput, LcdResult};
use log::{trace, warn};
use std::fmt::{Debug, Formatter};
use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How long a single beep lasts. The buzzer then stays silent for the same time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BeepLength {
    Fixed(Duration),
    /// Picks a new length in `min..=max` for every beep, which sounds more like typing.
    Jittered { min: Duration, max: Duration },
}

impl Default for BeepLength {
    fn default() -> Self {
        BeepLength::Fixed(Duration::from_millis(100))
    }
}

/// Beeps before every character written to the inner display.
///
/// The buzzer is driven inactive when the decorator is created and again when it is dropped, so it
/// never stays on after the program bails out with an error.
pub struct BuzzerDisplay<'a> {
    inner: &'a mut dyn CharacterDisplay,
    buzzer: &'a dyn GpioOutput,
    beep_length: BeepLength,
    seed: u64,
}

impl<'a> BuzzerDisplay<'a> {
    pub fn new(inner: &'a mut dyn CharacterDisplay, buzzer: &'a dyn GpioOutput) -> LcdResult<Self> {
        buzzer.write(false)?;
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Ok(BuzzerDisplay {
            inner,
            buzzer,
            beep_length: BeepLength::default(),
            seed: seed | 1,
        })
    }

    pub fn with_beep_length(mut self, beep_length: BeepLength) -> Self {
        self.beep_length = beep_length;
        self
    }

    /// Sounds the buzzer once.
    pub fn beep(&mut self) -> LcdResult<()> {
        let length = self.next_length();
        trace!("Beep for {:?}", length);
        self.buzzer.write(true)?;
        sleep(length);
        self.buzzer.write(false)?;
        sleep(length);
        Ok(())
    }

    fn next_length(&mut self) -> Duration {
        match self.beep_length {
            BeepLength::Fixed(length) => length,
            BeepLength::Jittered { min, max } => {
                // xorshift64
                self.seed ^= self.seed << 13;
                self.seed ^= self.seed >> 7;
                self.seed ^= self.seed << 17;

                let span = max.saturating_sub(min).as_micros() as u64;
                min + Duration::from_micros(self.seed % (span + 1))
            }
        }
    }
}

impl Debug for BuzzerDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(buzzer: {:?})", self.inner, self.buzzer)
    }
}

impl CharacterDisplay for BuzzerDisplay<'_> {
    fn clear(&mut self) -> LcdResult<()> {
        self.inner.clear()
    }

    fn set_cursor(&mut self, row: usize, col: usize) -> LcdResult<()> {
        self.inner.set_cursor(row, col)
    }

    fn write_char(&mut self, c: char) -> LcdResult<()> {
        self.beep()?;
        self.inner.write_char(c)
    }

    fn toggle_backlight(&mut self) -> LcdResult<()> {
        self.inner.toggle_backlight()
    }

    fn render_to_text(&self) -> String {
        self.inner.render_to_text()
    }
}

impl Drop for BuzzerDisplay<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.buzzer.write(false) {
            warn!("Failed to silence the buzzer: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::mock::MockBus;
    use crate::lcd::config::LcdConfig;
    use crate::lcd::display::CharLcd;
    use crate::peripheral::mock::MockOutput;

    const SILENT: BeepLength = BeepLength::Fixed(Duration::ZERO);

    #[test]
    fn beeps_once_per_character() {
        let mut bus = MockBus::new();
        let probe = bus.clone();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        probe.reset();
        let buzzer = MockOutput::default();

        {
            let mut display = BuzzerDisplay::new(&mut lcd, &buzzer)
                .unwrap()
                .with_beep_length(SILENT);
            display.write_str("hi").unwrap();
            assert!(display.render_to_text().starts_with("hi "));
        }

        // Silenced on creation, two beeps, silenced on drop
        assert_eq!(
            *buzzer.writes.borrow(),
            vec![false, true, false, true, false, false]
        );
        assert_eq!(probe.data(), b"hi".to_vec());
    }

    #[test]
    fn other_operations_do_not_beep() {
        let mut bus = MockBus::new();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        let buzzer = MockOutput::default();

        {
            let mut display = BuzzerDisplay::new(&mut lcd, &buzzer).unwrap();
            display.set_cursor(1, 3).unwrap();
            display.toggle_backlight().unwrap();
            display.clear().unwrap();
        }

        assert_eq!(*buzzer.writes.borrow(), vec![false, false]);
        assert!(!lcd.backlight());
    }

    #[test]
    fn jittered_length_stays_in_range() {
        let mut bus = MockBus::new();
        let mut lcd = CharLcd::new(&mut bus, &LcdConfig::default()).unwrap();
        let buzzer = MockOutput::default();
        let min = Duration::from_millis(5);
        let max = Duration::from_millis(100);

        let mut display = BuzzerDisplay::new(&mut lcd, &buzzer)
            .unwrap()
            .with_beep_length(BeepLength::Jittered { min, max });

        for _ in 0..1000 {
            let length = display.next_length();
            assert!(length >= min && length <= max, "{:?}", length);
        }
    }
}
