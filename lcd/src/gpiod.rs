//! GPIO lines for the peripherals, requested from a GPIO character device with the gpiod library.
//!
//! Each pin owns its line request, and the kernel releases the line when the pin is dropped.
use crate::{GpioActiveLevel, GpioInput, GpioOutput, LcdError, LcdResult};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

/// Chip the Raspberry Pi header lines live on.
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// Opens the GPIO chip at `path`.
pub fn open_chip(path: &str) -> LcdResult<gpiod::Chip> {
    let chip = gpiod::Chip::new(path)
        .map_err(|e| LcdError::Gpio(format!("opening {} failed: {}", path, e)))?;
    debug!("Opened GPIO chip {} ({} lines)", chip.name(), chip.num_lines());
    Ok(chip)
}

impl From<GpioActiveLevel> for gpiod::Active {
    fn from(level: GpioActiveLevel) -> Self {
        match level {
            GpioActiveLevel::High => gpiod::Active::High,
            GpioActiveLevel::Low => gpiod::Active::Low,
        }
    }
}

fn check_index(chip: &gpiod::Chip, index: u32) -> LcdResult<()> {
    if index as usize >= chip.num_lines() as usize {
        return Err(LcdError::Gpio(format!(
            "{} has no line {}",
            chip.name(),
            index
        )));
    }
    Ok(())
}

/// An output line. Starts inactive.
pub struct GpiodOutput {
    chip_name: String,
    index: u32,
    active_level: GpioActiveLevel,
    line: gpiod::Lines<gpiod::Output>,
}

impl GpiodOutput {
    pub fn request(
        chip: &gpiod::Chip,
        index: u32,
        active_level: GpioActiveLevel,
    ) -> LcdResult<Self> {
        check_index(chip, index)?;
        let line = chip
            .request_lines(
                gpiod::Options::output([index])
                    .consumer(env!("CARGO_PKG_NAME"))
                    .active(active_level.into()),
            )
            .map_err(|e| LcdError::Gpio(format!("requesting output {} failed: {}", index, e)))?;

        Ok(GpiodOutput {
            chip_name: chip.name().to_string(),
            index,
            active_level,
            line,
        })
    }
}

impl Debug for GpiodOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}][output]", self.chip_name, self.index)
    }
}

impl GpioOutput for GpiodOutput {
    fn write(&self, value: bool) -> LcdResult<()> {
        trace!(
            "{:?} <- {} (line {})",
            self,
            value,
            if self.active_level.get_state(value) { "high" } else { "low" }
        );
        self.line
            .set_values([value])
            .map_err(|e| LcdError::Gpio(format!("writing {:?} failed: {}", self, e)))
    }
}

/// An input line.
pub struct GpiodInput {
    chip_name: String,
    index: u32,
    line: gpiod::Lines<gpiod::Input>,
}

impl GpiodInput {
    pub fn request(
        chip: &gpiod::Chip,
        index: u32,
        active_level: GpioActiveLevel,
    ) -> LcdResult<Self> {
        check_index(chip, index)?;
        let line = chip
            .request_lines(
                gpiod::Options::input([index])
                    .consumer(env!("CARGO_PKG_NAME"))
                    .active(active_level.into()),
            )
            .map_err(|e| LcdError::Gpio(format!("requesting input {} failed: {}", index, e)))?;

        Ok(GpiodInput {
            chip_name: chip.name().to_string(),
            index,
            line,
        })
    }
}

impl Debug for GpiodInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}][input]", self.chip_name, self.index)
    }
}

impl GpioInput for GpiodInput {
    fn read(&self) -> LcdResult<bool> {
        let values = self
            .line
            .get_values([false])
            .map_err(|e| LcdError::Gpio(format!("reading {:?} failed: {}", self, e)))?;
        Ok(values[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_level_maps_onto_line_flags() {
        assert!(matches!(gpiod::Active::from(GpioActiveLevel::High), gpiod::Active::High));
        assert!(matches!(gpiod::Active::from(GpioActiveLevel::Low), gpiod::Active::Low));
    }

    #[test]
    fn missing_chip_is_a_gpio_error() {
        let err = open_chip("/dev/gpiochip-missing").err().unwrap();
        assert!(matches!(err, LcdError::Gpio(_)));
    }
}
