//! Raspberry Pi output lines through `rppal`.

use rppal::gpio::{Gpio, OutputPin};
use thiserror::Error;
use tracing::debug;

use super::{OutputDriver, OutputId};

#[derive(Debug, Error)]
pub enum GpioError {
    #[error("GPIO controller unavailable: {0}")]
    Init(#[source] rppal::gpio::Error),
    #[error("cannot claim BCM {pin}: {source}")]
    Pin {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },
}

pub struct GpioDriver {
    pins: [OutputPin; 3],
}

impl GpioDriver {
    /// Claim the given BCM lines (outputs 1, 2, 3 in order), all driven low.
    pub fn new(bcm_pins: [u8; 3]) -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(GpioError::Init)?;
        let claim = |pin: u8| {
            gpio.get(pin)
                .map(|p| p.into_output_low())
                .map_err(|source| GpioError::Pin { pin, source })
        };
        Ok(Self {
            pins: [claim(bcm_pins[0])?, claim(bcm_pins[1])?, claim(bcm_pins[2])?],
        })
    }
}

impl OutputDriver for GpioDriver {
    fn write(&mut self, id: OutputId, on: bool) {
        let pin = &mut self.pins[usize::from(id.get() - 1)];
        debug!("{} (BCM {}) -> {}", id, pin.pin(), if on { "high" } else { "low" });
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}
