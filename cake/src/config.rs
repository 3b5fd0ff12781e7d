use cake_lcd::lcd::config::LcdConfig;
use cake_lcd::peripheral::BeepLength;
use serde::{Deserialize, Serialize};
use std::env::var_os;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub lcd: LcdConfig,
    /// GPIO character device the peripheral lines are requested from.
    pub gpio_chip: String,
    /// GPIO of the (active low) buzzer; no beeping if unset.
    pub buzzer_pin: Option<u32>,
    /// GPIO of the switch gating each character; no gating if unset.
    pub switch_pin: Option<u32>,
    pub beep_min_ms: u64,
    pub beep_max_ms: u64,
    pub message: String,
}

impl Config {
    fn path() -> PathBuf {
        let config_str = var_os("CONFIG_FILE");
        let config_str: &OsStr = config_str.as_deref().unwrap_or(OsStr::new("config.json"));
        Path::new(config_str).to_path_buf()
    }

    /// Loads the config file, or `None` if there is none.
    pub fn try_load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::path();
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let file = std::fs::File::create(Self::path())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn beep_length(&self) -> BeepLength {
        let min = Duration::from_millis(self.beep_min_ms);
        let max = Duration::from_millis(self.beep_max_ms);
        if min >= max {
            BeepLength::Fixed(min)
        } else {
            BeepLength::Jittered { min, max }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lcd: LcdConfig::default(),
            gpio_chip: cake_lcd::gpiod::DEFAULT_CHIP.to_string(),
            buzzer_pin: None,
            switch_pin: None,
            beep_min_ms: 5,
            beep_max_ms: 100,
            message: "Happy birthday!\r\nHave some cake".to_string(),
        }
    }
}
