//! The single-byte I2C write primitive the display is driven through.

use crate::{LcdError, LcdResult};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use linux_embedded_hal::I2cdev;
use log::debug;
use std::fmt::{Debug, Formatter};
use std::io;
use std::path::PathBuf;

/// A bus handle already bound to one device address.
///
/// The PCF8574 backpack has no registers, so the only operation needed is writing one byte, which
/// lands directly on the expander's 8 output lines.
pub trait I2cBus: Debug {
    /// Writes a single byte to the device. Fails with [LcdError::Transport] on bus errors.
    fn write_byte(&mut self, data: u8) -> LcdResult<()>;
}

/// [I2cBus] on top of any `embedded-hal` I2C peripheral, bound to a 7-bit `address`.
pub struct HalI2cBus<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> HalI2cBus<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit device address this handle is bound to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives the peripheral back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I> Debug for HalI2cBus<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalI2cBus(@ {:#04x})", self.address)
    }
}

impl<I: I2c> I2cBus for HalI2cBus<I> {
    fn write_byte(&mut self, data: u8) -> LcdResult<()> {
        self.i2c
            .write(self.address, &[data])
            .map_err(|e| LcdError::Transport(transport_kind(e.kind())))
    }
}

fn transport_kind(kind: ErrorKind) -> io::ErrorKind {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => io::ErrorKind::NotConnected,
        ErrorKind::NoAcknowledge(_) => io::ErrorKind::BrokenPipe,
        ErrorKind::ArbitrationLoss => io::ErrorKind::ResourceBusy,
        ErrorKind::Bus | ErrorKind::Overrun => io::ErrorKind::InvalidData,
        _ => io::ErrorKind::Other,
    }
}

/// [I2cBus] over the Linux `i2c-dev` interface (`/dev/i2c-N`).
///
/// The device is released when the handle is closed or dropped.
pub struct LinuxI2cBus {
    path: PathBuf,
    bus: HalI2cBus<I2cdev>,
}

impl LinuxI2cBus {
    /// Opens `/dev/i2c-{bus}` and binds it to the 7-bit `address`.
    pub fn open(bus: u8, address: u8) -> LcdResult<Self> {
        let path = PathBuf::from(format!("/dev/i2c-{}", bus));
        let i2c = I2cdev::new(&path).map_err(io::Error::from)?;

        debug!("Opened {:?} @ {:#04x}", path, address);

        Ok(LinuxI2cBus {
            path,
            bus: HalI2cBus::new(i2c, address),
        })
    }

    pub fn address(&self) -> u8 {
        self.bus.address()
    }

    /// Closes the device.
    pub fn close(self) {
        debug!("Closing {:?}", self.path);
        drop(self.bus.release());
    }
}

impl Debug for LinuxI2cBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LinuxI2cBus({:?} @ {:#04x})", self.path, self.address())
    }
}

impl I2cBus for LinuxI2cBus {
    fn write_byte(&mut self, data: u8) -> LcdResult<()> {
        self.bus.write_byte(data)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::I2cBus;
    use crate::{LcdError, LcdResult};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every byte written, so tests can look at the traffic while the display still
    /// borrows the bus.
    #[derive(Debug, Default, Clone)]
    pub struct MockBus {
        pub log: Rc<RefCell<Vec<u8>>>,
        pub fail_after: Option<usize>,
    }

    impl MockBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_after(writes: usize) -> Self {
            MockBus {
                fail_after: Some(writes),
                ..Self::default()
            }
        }

        pub fn bytes(&self) -> Vec<u8> {
            self.log.borrow().clone()
        }

        pub fn reset(&self) {
            self.log.borrow_mut().clear();
        }

        /// Decodes the recorded bytes back into `(rs, value)` pairs, four bytes per transaction.
        pub fn transactions(&self) -> Vec<(bool, u8)> {
            self.log
                .borrow()
                .chunks_exact(4)
                .map(|frame| {
                    let rs = frame[0] & 0x01 != 0;
                    (rs, (frame[0] & 0xF0) | (frame[2] >> 4))
                })
                .collect()
        }

        pub fn data(&self) -> Vec<u8> {
            self.transactions()
                .into_iter()
                .filter(|(rs, _)| *rs)
                .map(|(_, value)| value)
                .collect()
        }

        pub fn commands(&self) -> Vec<u8> {
            self.transactions()
                .into_iter()
                .filter(|(rs, _)| !*rs)
                .map(|(_, value)| value)
                .collect()
        }
    }

    impl I2cBus for MockBus {
        fn write_byte(&mut self, data: u8) -> LcdResult<()> {
            let mut log = self.log.borrow_mut();
            if self.fail_after.is_some_and(|limit| log.len() >= limit) {
                return Err(LcdError::Transport(std::io::ErrorKind::TimedOut));
            }
            log.push(data);
            Ok(())
        }
    }
}
