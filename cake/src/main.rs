mod config;

use crate::config::Config;
use cake_lcd::gpiod::{GpiodInput, GpiodOutput, open_chip};
use cake_lcd::i2c::LinuxI2cBus;
use cake_lcd::lcd::display::{CharacterDisplay, LcdUninit};
use cake_lcd::peripheral::{BuzzerDisplay, SwitchGatedDisplay};
use cake_lcd::{GpioActiveLevel, LcdResult};
use dotenv::dotenv;
use log::{debug, info};

/// Writes the message through whichever peripherals are configured.
fn print_message(
    lcd: &mut dyn CharacterDisplay,
    buzzer: Option<&GpiodOutput>,
    switch: Option<&GpiodInput>,
    config: &Config,
) -> LcdResult<()> {
    match (buzzer, switch) {
        (Some(buzzer), Some(switch)) => {
            let mut buzzing = BuzzerDisplay::new(lcd, buzzer)?.with_beep_length(config.beep_length());
            let mut gated = SwitchGatedDisplay::new(&mut buzzing, switch);
            gated.write_str(&config.message)
        }
        (Some(buzzer), None) => {
            let mut buzzing = BuzzerDisplay::new(lcd, buzzer)?.with_beep_length(config.beep_length());
            buzzing.write_str(&config.message)
        }
        (None, Some(switch)) => SwitchGatedDisplay::new(lcd, switch).write_str(&config.message),
        (None, None) => lcd.write_str(&config.message),
    }
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("Cake starting...");

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };

    info!(
        "LCD @ /dev/i2c-{}, address {:#04x}, {}x{}",
        config.lcd.bus, config.lcd.address, config.lcd.cols, config.lcd.rows
    );
    info!("Buzzer @ {:?}, switch @ {:?}", config.buzzer_pin, config.switch_pin);

    debug!("Opening I2C bus...");
    let mut bus = LinuxI2cBus::open(config.lcd.bus, config.lcd.address)?;
    debug!("{:?} opened.", bus);

    debug!("Initializing LCD driver...");
    let mut lcd = LcdUninit::new(&mut bus, &config.lcd)?.initialize()?;

    let chip = if config.buzzer_pin.is_some() || config.switch_pin.is_some() {
        Some(open_chip(&config.gpio_chip)?)
    } else {
        None
    };
    let buzzer = match (&chip, config.buzzer_pin) {
        (Some(chip), Some(pin)) => Some(GpiodOutput::request(chip, pin, GpioActiveLevel::Low)?),
        _ => None,
    };
    let switch = match (&chip, config.switch_pin) {
        (Some(chip), Some(pin)) => Some(GpiodInput::request(chip, pin, GpioActiveLevel::High)?),
        _ => None,
    };

    print_message(&mut lcd, buzzer.as_ref(), switch.as_ref(), &config)?;

    debug!("Display:\n{}", lcd.render_to_text());
    info!("Message printed.");

    bus.close();
    Ok(())
}
